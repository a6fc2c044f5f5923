//! Named fixture server registry.
//!
//! A [`Registry`] lets several test files share fixture servers by name. It
//! is an ordinary value: the test harness creates one, passes it to whatever
//! needs it, and tears it down at the end.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::ServerConfig;
use crate::error::{FixtureError, Result};
use crate::server::FixtureServer;

/// Create-or-fetch store of named [`FixtureServer`]s.
///
/// `setup` for a name that is already registered returns the existing
/// instance untouched, even when the configuration differs. The first setup
/// wins.
#[derive(Debug, Default)]
pub struct Registry {
    /// Servers indexed by name.
    servers: Mutex<HashMap<String, Arc<FixtureServer>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create-or-fetch the server registered under `name`.
    ///
    /// A new server is created stopped. For an existing name, `config` is
    /// ignored and the original instance is returned.
    pub fn setup(&self, name: &str, config: ServerConfig) -> Arc<FixtureServer> {
        let mut servers = self.lock();

        if let Some(existing) = servers.get(name) {
            if existing.config() != &config {
                tracing::warn!(
                    name,
                    existing = ?existing.config(),
                    ignored = ?config,
                    "fixture server already registered with a different configuration"
                );
            }
            return existing.clone();
        }

        tracing::debug!(name, ?config, "registering fixture server");
        let server = Arc::new(FixtureServer::named(name, config));
        servers.insert(name.to_string(), server.clone());
        server
    }

    /// Get the server registered under `name`.
    ///
    /// # Errors
    ///
    /// [`FixtureError::NotRegistered`] if `setup` was never called for `name`.
    pub fn get(&self, name: &str) -> Result<Arc<FixtureServer>> {
        self.lock()
            .get(name)
            .cloned()
            .ok_or_else(|| FixtureError::NotRegistered(name.to_string()))
    }

    /// Whether a server is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered servers.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no server is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Stop every registered server and empty the registry.
    pub async fn teardown(&self) {
        let servers: Vec<Arc<FixtureServer>> = self.lock().drain().map(|(_, s)| s).collect();

        for server in servers {
            server.stop().await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<FixtureServer>>> {
        // The map stays consistent even if a holder panicked.
        self.servers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
