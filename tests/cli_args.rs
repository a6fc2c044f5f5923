//! CLI argument parsing tests.

use std::path::PathBuf;

use clap::Parser;
use fixturemock::cli::{Cli, Command};
use fixturemock::{FixtureError, ServerConfig};

#[test]
fn test_cli_parses_serve_subcommand() {
    let cli = Cli::parse_from(["fixturemock", "serve", "--port", "6000", "--dir", "mocks"]);

    assert!(!cli.verbose);
    match cli.command {
        Command::Serve(args) => {
            assert_eq!(args.port, 6000);
            assert_eq!(
                args.server_config().unwrap(),
                ServerConfig::new(6000, "mocks")
            );
        }
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_cli_parses_resolve_subcommand() {
    let cli = Cli::parse_from(["fixturemock", "resolve", "--dir", "mocks", "/extensions/42"]);

    match cli.command {
        Command::Resolve { dir, path } => {
            assert_eq!(dir, PathBuf::from("mocks"));
            assert_eq!(path, "/extensions/42");
        }
        _ => panic!("Expected Resolve command"),
    }
}

#[test]
fn test_cli_verbose_is_global() {
    let cli = Cli::parse_from(["fixturemock", "serve", "--dir", "mocks", "--verbose"]);

    assert!(cli.verbose);
}

#[test]
fn test_cli_serve_from_config_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("fixtures.json");
    std::fs::write(&path, r#"{"port": 6001, "dir": "mocks-b"}"#).unwrap();

    let cli = Cli::parse_from(["fixturemock", "serve", "--config", path.to_str().unwrap()]);

    match cli.command {
        Command::Serve(args) => {
            let config = args.server_config().unwrap();
            assert_eq!(config.port, 6001);
            assert_eq!(config.dir, tmp.path().join("mocks-b"));
        }
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_cli_rejects_config_with_dir() {
    let result = Cli::try_parse_from([
        "fixturemock",
        "serve",
        "--config",
        "fixtures.json",
        "--dir",
        "mocks",
    ]);

    assert!(result.is_err());
}

#[test]
fn test_cli_rejects_invalid_port() {
    let result = Cli::try_parse_from(["fixturemock", "serve", "--port", "70000", "--dir", "mocks"]);

    assert!(result.is_err());
}

#[test]
fn test_cli_requires_subcommand() {
    let result = Cli::try_parse_from(["fixturemock"]);

    assert!(result.is_err());
}

#[test]
fn test_cli_serve_without_dir_is_config_missing() {
    if std::env::var_os(fixturemock::DIR_ENV).is_some() {
        return;
    }

    let cli = Cli::parse_from(["fixturemock", "serve"]);

    match cli.command {
        Command::Serve(args) => {
            assert!(matches!(
                args.server_config(),
                Err(FixtureError::ConfigMissing(_))
            ));
        }
        _ => panic!("Expected Serve command"),
    }
}
