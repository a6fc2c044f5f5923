//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the
//! fixturemock binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{ServerConfig, DEFAULT_PORT, DIR_ENV, PORT_ENV};
use crate::error::{FixtureError, Result};

/// Serve a directory of JSON fixtures as a mock HTTP API.
#[derive(Parser, Debug)]
#[command(name = "fixturemock", about = "File-backed JSON mock server", version)]
pub struct Cli {
    /// Log every resolution at debug level.
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve fixtures until interrupted.
    Serve(ServeArgs),

    /// Print the fixture file a request path resolves to.
    Resolve {
        /// Fixture root directory.
        #[arg(long, env = DIR_ENV)]
        dir: PathBuf,

        /// Request path, e.g. `/extensions/42`.
        path: String,
    },
}

/// Arguments for `serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on.
    #[arg(long, env = PORT_ENV, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Fixture root directory.
    #[arg(long, env = DIR_ENV)]
    pub dir: Option<PathBuf>,

    /// JSON configuration file; replaces --port and --dir.
    #[arg(long, conflicts_with = "dir")]
    pub config: Option<PathBuf>,
}

impl ServeArgs {
    /// Build the server configuration from the file, flags or environment.
    pub fn server_config(&self) -> Result<ServerConfig> {
        if let Some(path) = &self.config {
            return ServerConfig::from_json_file(path);
        }

        let dir = self.dir.clone().ok_or_else(|| {
            FixtureError::ConfigMissing(format!("--dir, --config or {DIR_ENV} is required"))
        })?;
        let config = ServerConfig::new(self.port, dir);
        config.validate()?;
        Ok(config)
    }
}
