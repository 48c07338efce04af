//! signoff service binary.
//!
//! `serve` runs the webhook server; `replay` handles one saved
//! `pull_request` payload (pair with `personal_access_token` for manual runs).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use signoff::server::{self, AppState};
use signoff::{Config, PullRequestEvent, PullRequestHandler};

/// Enforce commit sign-off and pull request descriptions on GitHub
#[derive(Parser)]
#[command(name = "signoff")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server (default)
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Handle a single pull_request payload read from a file
    Replay {
        /// Path to the webhook payload JSON
        payload: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("signoff=info,scm=info,tower_http=info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::default();
    info!(?config, "Loaded configuration");

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            let addr = format!("0.0.0.0:{}", config.port);
            let handler =
                PullRequestHandler::from_config(config).context("Failed to set up GitHub access")?;
            server::run_server(
                AppState {
                    handler: Arc::new(handler),
                },
                &addr,
            )
            .await
        }
        Commands::Replay { payload } => {
            let raw = std::fs::read(&payload)
                .with_context(|| format!("Failed to read {}", payload.display()))?;
            let event: PullRequestEvent = serde_json::from_slice(&raw)
                .with_context(|| format!("Invalid pull_request payload in {}", payload.display()))?;

            let handler =
                PullRequestHandler::from_config(config).context("Failed to set up GitHub access")?;
            let report = handler
                .handle(&event)
                .await
                .context("Failed to handle pull_request event")?;

            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
