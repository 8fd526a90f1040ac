//! Puzzle Warden binary entrypoint.
//!
//! Wires the chat and drive adapters, bootstraps the guild, and runs the
//! periodic maintenance loops. Slash-command dispatch lives in the embedding
//! host, which calls into [`commands::CommandSurface`]; this binary covers
//! everything the core can do on its own.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tokio::time::sleep;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod dao;
mod error;
mod services;
mod state;

use commands::CommandSurface;
use config::AppConfig;
use dao::chat::discord::{DiscordConfig, DiscordGateway};
use dao::drive::auth::{CredentialStore, FileCredentialStore, TokenBroker, UnattendedReauth};
use dao::drive::{DriveClient, DriveConfig};
use services::directory::ChannelDirectory;
use services::puzzle_service::PuzzleOrchestrator;
use state::AppState;

/// How often idle voice channels are swept.
const VOICE_SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    let discord_config = DiscordConfig::from_env().context("loading chat configuration")?;
    let gateway = DiscordGateway::connect(discord_config)
        .await
        .context("connecting to the chat platform")?;
    info!("connected to the chat platform");

    let drive_config = DriveConfig::from_env().context("loading drive configuration")?;
    let credential_store = Arc::new(FileCredentialStore::new(&drive_config.credentials_path));
    let credentials = credential_store
        .load()
        .context("reading persisted drive credentials")?
        .context("no drive credentials found; run the authentication flow first")?;
    let token_client = reqwest::Client::builder()
        .build()
        .context("building the token refresh client")?;
    let broker = Arc::new(TokenBroker::new(
        token_client,
        drive_config.token_url.clone(),
        drive_config.client_id.clone(),
        drive_config.client_secret.clone(),
        credentials,
        credential_store,
        Arc::new(UnattendedReauth),
    ));

    // A missing root folder is fatal: there is nowhere to put spreadsheets.
    let drive = DriveClient::connect(&drive_config, broker, &config.root_folder)
        .await
        .context("resolving the drive folders")?;
    info!(root_folder = %config.root_folder, "resolved drive folders");

    let state = AppState::new();
    let directory = ChannelDirectory::new(Arc::new(gateway));
    let orchestrator = Arc::new(PuzzleOrchestrator::new(
        directory,
        Arc::new(drive),
        state,
        config.hunt.clone(),
    ));

    orchestrator
        .bootstrap()
        .await
        .context("bootstrapping guild categories")?;
    info!("guild bootstrap complete");

    let surface = CommandSurface::new(orchestrator);
    tokio::spawn(run_voice_sweep(surface.clone()));

    shutdown_signal().await;
    info!("shutting down");

    Ok(())
}

/// Periodically sweep idle voice channels, logging failures and moving on.
async fn run_voice_sweep(surface: CommandSurface) {
    loop {
        sleep(VOICE_SWEEP_INTERVAL).await;
        match surface.orchestrator().voice_cleanup().await {
            Ok(0) => {}
            Ok(count) => info!(count, "voice sweep removed idle channels"),
            Err(err) => warn!(error = %err, "voice sweep failed"),
        }
    }
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the process down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
