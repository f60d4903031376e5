//! # ops-daemon
//!
//! HTTP API daemon for the operations-tracking backend.
//!
//! Wires the SQLite store, workflow engine, discussion service, media
//! store, and push transport together behind an axum router. Configuration
//! comes from `opsd.toml` (see [`config::DaemonConfig`]) with `OPSD_*`
//! environment overrides.
//!
//! ## Usage
//!
//! ```text
//! ops-daemon --config /etc/ops/opsd.toml
//! ```

mod config;
mod http;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ops_discussion::DiscussionService;
use ops_media::{MediaStore, MemoryMediaStore, RemoteMediaStore};
use ops_notify::{FcmTransport, HttpKeyTransport, NotificationService, PushTransport};
use ops_store::Store;
use ops_workflow::WorkflowEngine;

use crate::config::DaemonConfig;
use crate::state::AppState;

/// Operations-tracking backend daemon.
#[derive(Parser)]
#[command(name = "ops-daemon", about = "Operations-tracking HTTP API")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "opsd.toml")]
    config: PathBuf,

    /// Override the listen address from the config file.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("ops_daemon=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let mut config = DaemonConfig::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }

    tracing::info!(db = %config.db_path.display(), "opening store");
    let store = Store::open(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path.display()))?;

    let media: Arc<dyn MediaStore> = match &config.media {
        Some(media) => {
            tracing::info!(upload_url = %media.upload_url, "using remote media storage");
            Arc::new(RemoteMediaStore::new(
                media.upload_url.clone(),
                media.api_key.clone(),
            )?)
        }
        None => {
            tracing::warn!("no media storage configured; uploads held in process memory");
            Arc::new(MemoryMediaStore::new())
        }
    };

    let transport: Option<Arc<dyn PushTransport>> = if let Some(credential) =
        &config.push.fcm_credential
    {
        Some(Arc::new(FcmTransport::new(credential.clone())?))
    } else if let (Some(endpoint), Some(key)) =
        (&config.push.legacy_endpoint, &config.push.legacy_api_key)
    {
        Some(Arc::new(HttpKeyTransport::new(
            endpoint.clone(),
            key.clone(),
        )?))
    } else {
        None
    };

    let notifier = NotificationService::new(store.clone(), transport);
    let engine = WorkflowEngine::new(store.clone(), media);
    let discussion = DiscussionService::new(store.clone(), notifier);

    let app = http::router(AppState {
        store,
        engine,
        discussion,
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
