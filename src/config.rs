//! Fixture server configuration.
//!
//! A [`ServerConfig`] names the port to listen on and the fixture root to
//! serve. It can be built in code, read from the environment, or loaded
//! from a JSON file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FixtureError, Result};

/// Environment variable holding the listening port.
pub const PORT_ENV: &str = "FIXTURE_PORT";

/// Environment variable holding the fixture root directory.
pub const DIR_ENV: &str = "FIXTURE_DIR";

/// Port used when `FIXTURE_PORT` is not set.
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration for a single fixture server.
///
/// Two configurations are equal when every field matches. A port of `0`
/// asks the OS for any free port; the bound address is then available from
/// [`FixtureServer::local_addr`](crate::FixtureServer::local_addr).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Root of the fixture tree. Absolute, or relative to the working directory.
    pub dir: PathBuf,
}

impl ServerConfig {
    /// Create a configuration from a port and fixture root.
    pub fn new(port: u16, dir: impl Into<PathBuf>) -> Self {
        Self {
            port,
            dir: dir.into(),
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// Uses `FIXTURE_DIR` for the fixture root (required) and `FIXTURE_PORT`
    /// for the port (defaults to 3000).
    pub fn from_env() -> Result<Self> {
        let dir = env::var(DIR_ENV)
            .map_err(|_| FixtureError::ConfigMissing(format!("{DIR_ENV} not set")))?;

        let port = match env::var(PORT_ENV) {
            Ok(raw) => parse_port(&raw)?,
            Err(_) => DEFAULT_PORT,
        };

        let config = Self::new(port, dir);
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file such as
    /// `{"port": 3000, "dir": "tests/mocks"}`.
    ///
    /// A relative `dir` is resolved against the directory containing the file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&raw)?;

        if config.dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.dir = parent.join(&config.dir);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can be served.
    ///
    /// The fixture root only needs to be non-empty here; a root that does
    /// not exist simply answers every request with `404`.
    pub fn validate(&self) -> Result<()> {
        if self.dir.as_os_str().is_empty() {
            return Err(FixtureError::InvalidConfig(
                "fixture directory must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_port(raw: &str) -> Result<u16> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| FixtureError::InvalidConfig(format!("invalid port '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configs_compare_by_value() {
        let a = ServerConfig::new(6000, "/tmp/mocks");
        let b = ServerConfig::new(6000, PathBuf::from("/tmp/mocks"));
        let c = ServerConfig::new(6001, "/tmp/mocks");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("6000").unwrap(), 6000);
        assert_eq!(parse_port(" 80 ").unwrap(), 80);
        assert!(matches!(
            parse_port("70000"),
            Err(FixtureError::InvalidConfig(_))
        ));
        assert!(matches!(
            parse_port("abc"),
            Err(FixtureError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_env() {
        env::remove_var(DIR_ENV);
        env::remove_var(PORT_ENV);
        assert!(matches!(
            ServerConfig::from_env(),
            Err(FixtureError::ConfigMissing(_))
        ));

        env::set_var(DIR_ENV, "/tmp/mocks");
        assert_eq!(
            ServerConfig::from_env().unwrap(),
            ServerConfig::new(DEFAULT_PORT, "/tmp/mocks")
        );

        env::set_var(PORT_ENV, "6000");
        assert_eq!(ServerConfig::from_env().unwrap().port, 6000);

        env::set_var(PORT_ENV, "not-a-port");
        assert!(matches!(
            ServerConfig::from_env(),
            Err(FixtureError::InvalidConfig(_))
        ));

        env::remove_var(DIR_ENV);
        env::remove_var(PORT_ENV);
    }

    #[test]
    fn test_validate_rejects_empty_dir() {
        let config = ServerConfig::new(3000, "");
        assert!(matches!(
            config.validate(),
            Err(FixtureError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_json_file_resolves_relative_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("fixtures.json");
        fs::write(&path, r#"{"port": 6000, "dir": "mocks"}"#).unwrap();

        let config = ServerConfig::from_json_file(&path).unwrap();

        assert_eq!(config.port, 6000);
        assert_eq!(config.dir, tmp.path().join("mocks"));
    }

    #[test]
    fn test_from_json_file_keeps_absolute_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("elsewhere");
        let path = tmp.path().join("fixtures.json");
        let body = serde_json::json!({ "port": 6001, "dir": root });
        fs::write(&path, body.to_string()).unwrap();

        let config = ServerConfig::from_json_file(&path).unwrap();

        assert_eq!(config, ServerConfig::new(6001, root));
    }

    #[test]
    fn test_from_json_file_reports_bad_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("fixtures.json");
        fs::write(&path, r#"{"port": "not a number"}"#).unwrap();

        let result = ServerConfig::from_json_file(&path);

        assert!(matches!(result, Err(FixtureError::ParseError(_))));
    }

    #[test]
    fn test_from_json_file_missing_file() {
        let result = ServerConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(FixtureError::Io(_))));
    }
}
