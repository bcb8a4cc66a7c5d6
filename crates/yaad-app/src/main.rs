//! Yaad application binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Open the durable store (or run session-only if it is unavailable)
//! 3. Build the skill and start the idle-session purge loop
//! 4. Serve the HTTP API

mod cli;

use std::sync::Arc;

use clap::Parser;

use yaad_api::state::AppState;
use yaad_core::config::YaadConfig;
use yaad_dialogue::Skill;
use yaad_storage::{open_backend, ItemStore};

use crate::cli::{expand_home, CliArgs};

/// Periodically drop ephemeral items of conversations that went quiet
/// without a session-ended request.
async fn session_purge_loop(store: Arc<ItemStore>, interval_secs: u64, idle_minutes: u32) {
    let idle_timeout = chrono::Duration::minutes(i64::from(idle_minutes));
    tracing::info!(interval_secs, idle_minutes, "Session purge loop started");

    let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(interval_secs.max(1)));
    loop {
        interval.tick().await;
        if let Err(e) = store.purge_idle(idle_timeout) {
            tracing::warn!(error = %e, "Session purge failed");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = YaadConfig::load_or_default(&config_file);
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    if let Some(ref level) = args.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(kind) = args.durable {
        config.durable.backend = kind;
    }
    config.server.port = args.resolve_port(config.server.port);

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Yaad v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    // Storage.
    let data_dir = expand_home(&config.general.data_dir);
    let durable = open_backend(&config.durable, &data_dir);

    // Skill.
    let skill = Skill::from_config(&config, durable)?;
    let store = Arc::clone(skill.item_store());
    tracing::info!(durable = store.backend_name(), "Skill ready");

    // === Background tasks ===

    let purge_interval = config.session.purge_interval_secs;
    let idle_minutes = config.session.idle_timeout_minutes;
    tokio::spawn(async move {
        session_purge_loop(store, purge_interval, idle_minutes).await;
    });

    // === API server ===

    let state = AppState::new(config.clone(), skill);
    if let Err(e) = yaad_api::start_server(&config, state).await {
        tracing::error!(error = %e, "API server stopped");
        tracing::error!(
            "Is another instance running? Try: YAAD_PORT={} yaad",
            config.server.port.saturating_add(1)
        );
        return Err(e.into());
    }

    Ok(())
}
