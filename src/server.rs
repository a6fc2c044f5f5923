//! Fixture HTTP server.
//!
//! Provides an axum-based HTTP server that answers every request from a
//! fixture tree on disk.

use std::io::{self, ErrorKind};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::error::{FixtureError, Result};
use crate::resolver::{self, Resolution};

/// How long `stop` waits for open connections to drain before aborting.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A mock API server backed by a directory of JSON fixtures.
///
/// The server is created stopped. [`start`](Self::start) binds the port and
/// [`stop`](Self::stop) releases it; both take `&self` so an instance can be
/// shared through an [`Arc`], which is how the [`Registry`](crate::Registry)
/// hands out named instances. Calls to `start` and `stop` on the same
/// instance are expected to come one at a time.
///
/// Fixtures are read from disk on every request, so edits to the tree are
/// visible immediately.
pub struct FixtureServer {
    /// Registry name, `None` for anonymous instances.
    name: Option<String>,
    config: ServerConfig,
    /// Present only while listening.
    listener: Mutex<Option<ListenerHandle>>,
}

/// A running serve task.
struct ListenerHandle {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for FixtureServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureServer")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FixtureServer {
    /// Create an anonymous server. It is not started.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            name: None,
            config,
            listener: Mutex::new(None),
        }
    }

    /// Create a server that carries a registry name. It is not started.
    pub fn named(name: impl Into<String>, config: ServerConfig) -> Self {
        Self {
            name: Some(name.into()),
            config,
            listener: Mutex::new(None),
        }
    }

    /// The registry name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The configuration this server was created with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the configured port and start answering requests.
    ///
    /// Returns once the socket is listening, so requests can be sent as soon
    /// as this resolves. The returned address is the one actually bound,
    /// which differs from the configured port when that port is `0`.
    ///
    /// # Errors
    ///
    /// [`FixtureError::AlreadyStarted`] if the server is already listening,
    /// [`FixtureError::Bind`] if the port cannot be bound.
    #[tracing::instrument(skip(self), fields(name = ?self.name, port = self.config.port))]
    pub async fn start(&self) -> Result<SocketAddr> {
        let mut slot = self.listener.lock().await;
        if let Some(running) = slot.as_ref() {
            return Err(FixtureError::AlreadyStarted { addr: running.addr });
        }

        let port = self.config.port;
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port))
            .await
            .map_err(|source| FixtureError::Bind { port, source })?;
        let addr = listener
            .local_addr()
            .map_err(|source| FixtureError::Bind { port, source })?;

        let app = create_router(Arc::new(self.config.dir.clone()));
        let (shutdown, signal) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = signal.await;
                })
                .await;
            if let Err(e) = served {
                tracing::error!(error = %e, "fixture server stopped unexpectedly");
            }
        });

        tracing::info!(%addr, dir = %self.config.dir.display(), "fixture server listening");
        *slot = Some(ListenerHandle {
            addr,
            shutdown,
            task,
        });

        Ok(addr)
    }

    /// Stop listening and release the port.
    ///
    /// Open connections get a short grace period to finish before the serve
    /// task is aborted. Does nothing if the server is not running. A named
    /// server stays in its registry and can be started again.
    #[tracing::instrument(skip(self), fields(name = ?self.name, port = self.config.port))]
    pub async fn stop(&self) {
        let mut slot = self.listener.lock().await;
        let Some(running) = slot.take() else {
            return;
        };

        let ListenerHandle {
            addr,
            shutdown,
            mut task,
        } = running;
        let _ = shutdown.send(());

        if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
            tracing::warn!(%addr, "connections still open after grace period, aborting");
            task.abort();
            let _ = task.await;
        }

        tracing::info!(%addr, "fixture server stopped");
    }

    /// Reset per-test state.
    ///
    /// Fixtures are read fresh on every request, so there is nothing to
    /// clear. Kept so test setup hooks can treat every server alike.
    pub fn reset(&self) {
        tracing::debug!(name = ?self.name, "reset fixture server");
    }

    /// Whether the server currently holds a listening socket.
    pub async fn is_listening(&self) -> bool {
        self.listener.lock().await.is_some()
    }

    /// The bound address while listening.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.lock().await.as_ref().map(|running| running.addr)
    }

    /// The base URL while listening, e.g. `http://127.0.0.1:3000`.
    pub async fn url(&self) -> Option<String> {
        self.local_addr().await.map(|addr| format!("http://{}", addr))
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        if let Some(running) = self.listener.get_mut().take() {
            running.task.abort();
        }
    }
}

/// Create the axum router. Every path and method goes to the fixture handler.
fn create_router(root: Arc<PathBuf>) -> Router {
    Router::new().fallback(serve_fixture).with_state(root)
}

/// Answer a request with the fixture its path resolves to.
async fn serve_fixture(State(root): State<Arc<PathBuf>>, uri: Uri) -> Response {
    let request_path = uri.path().to_string();

    let lookup_path = request_path.clone();
    let resolution =
        tokio::task::spawn_blocking(move || resolver::resolve(&lookup_path, &root)).await;

    let response = match resolution {
        Ok(Resolution::FileMatch(path)) => fixture_response(tokio::fs::read(&path).await),
        Ok(Resolution::NotFound) => Err(ServeError::NotFound),
        Err(e) => Err(ServeError::Internal(e.to_string())),
    };

    match response {
        Ok(response) => response,
        Err(e) => {
            if let ServeError::Internal(message) = &e {
                tracing::warn!(%request_path, %message, "failed to serve fixture");
            }
            e.into_response()
        }
    }
}

/// Turn the result of reading a fixture into a response.
fn fixture_response(read: io::Result<Vec<u8>>) -> std::result::Result<Response, ServeError> {
    match read {
        Ok(body) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()),
        // Removed between resolution and read.
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ServeError::NotFound),
        Err(e) => Err(ServeError::Internal(e.to_string())),
    }
}

/// Failures surfaced to HTTP clients.
#[derive(Debug)]
enum ServeError {
    NotFound,
    /// Carries the cause for the log; clients only see a fixed message.
    Internal(String),
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound => (StatusCode::NOT_FOUND, "Fixture not found"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read fixture"),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
