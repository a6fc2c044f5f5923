//! File-backed JSON mock server for test suites.
//!
//! `fixturemock` answers HTTP requests with JSON files from a directory
//! tree, so tests can run against a fake API without a real backend. The
//! URL path space mirrors the tree: `/extensions/42` is answered by
//! `extensions/42.json`.
//!
//! # Quick Start
//!
//! ```no_run
//! use fixturemock::{Registry, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> fixturemock::Result<()> {
//!     // Anonymous server, owned by the caller
//!     let server = fixturemock::setup(ServerConfig::new(3000, "tests/mocks"));
//!     server.start().await?;
//!     // GET http://127.0.0.1:3000/42 now returns tests/mocks/42.json
//!     server.stop().await;
//!
//!     // Named servers, shared through a registry
//!     let registry = Registry::new();
//!     let api = registry.setup("api", ServerConfig::new(6000, "tests/mocks"));
//!     api.start().await?;
//!
//!     // Elsewhere in the suite: same instance, already running
//!     let api = registry.get("api")?;
//!     assert!(api.is_listening().await);
//!
//!     registry.teardown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Resolution
//!
//! See [`resolve`] for the exact lookup order. Requests that match no
//! fixture get `404`; fixtures that exist but cannot be read get `500`.
//! Paths containing `..` never leave the fixture root.
//!
//! # Configuration
//!
//! [`ServerConfig::from_env`] reads:
//!
//! - `FIXTURE_DIR` (required) - Fixture root directory
//! - `FIXTURE_PORT` (optional) - Port to listen on (defaults to `3000`)

pub mod cli;
mod config;
mod error;
mod registry;
mod resolver;
mod server;

pub use config::{ServerConfig, DEFAULT_PORT, DIR_ENV, PORT_ENV};
pub use error::{FixtureError, Result};
pub use registry::Registry;
pub use resolver::{resolve, Resolution};
pub use server::FixtureServer;

/// Create an anonymous fixture server.
///
/// The server is owned by the caller only and never registered. Use
/// [`Registry::setup`] for servers shared by name.
pub fn setup(config: ServerConfig) -> FixtureServer {
    FixtureServer::new(config)
}
