//! Error types for fixture server operations.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors that can occur while configuring or running a fixture server.
///
/// A request that matches no fixture is not an error: the resolver returns
/// [`Resolution::NotFound`](crate::Resolution::NotFound) and the server
/// answers `404`.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Configuration is missing or incomplete.
    #[error("fixture server configuration required: {0}")]
    ConfigMissing(String),

    /// Configuration is present but unusable.
    #[error("invalid fixture server configuration: {0}")]
    InvalidConfig(String),

    /// No instance is registered under this name.
    #[error("no fixture server registered under name '{0}'")]
    NotRegistered(String),

    /// `start` was called on a server that is already listening.
    #[error("fixture server is already listening on {addr}")]
    AlreadyStarted { addr: SocketAddr },

    /// The listening socket could not be bound.
    #[error("failed to bind fixture server to port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing error.
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Result type alias for fixture server operations.
pub type Result<T> = core::result::Result<T, FixtureError>;
