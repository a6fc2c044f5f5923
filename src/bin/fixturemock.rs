//! Fixture mock server binary.
//!
//! Serves a fixture tree over HTTP, or explains how a request path resolves.

use clap::Parser;
use fixturemock::cli::{Cli, Command};
use fixturemock::{resolve, FixtureServer, Resolution};
use std::process::ExitCode;
use tracing::Level;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> fixturemock::Result<ExitCode> {
    match command {
        Command::Serve(args) => serve(FixtureServer::new(args.server_config()?)).await,
        Command::Resolve { dir, path } => match resolve(&path, &dir) {
            Resolution::FileMatch(file) => {
                println!("{}", file.display());
                Ok(ExitCode::SUCCESS)
            }
            Resolution::NotFound => {
                eprintln!("{path}: not found under {}", dir.display());
                Ok(ExitCode::FAILURE)
            }
        },
    }
}

async fn serve(server: FixtureServer) -> fixturemock::Result<ExitCode> {
    let addr = server.start().await?;
    println!("Serving {} at http://{}", server.config().dir.display(), addr);

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
    }

    server.stop().await;
    Ok(ExitCode::SUCCESS)
}
