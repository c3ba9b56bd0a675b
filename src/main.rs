//! Points Ledger - HTTP server entry point
//!
//! ```text
//! config → logging → SQLite (migrate) → gateway
//!                                         │ ctrl-c / SIGTERM
//!                                         ▼
//!                              drain requests → close pool
//! ```

use std::sync::Arc;

use anyhow::Context;

use points_ledger::config::AppConfig;
use points_ledger::db::Database;
use points_ledger::gateway::{self, state::AppState};
use points_ledger::logging;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut config =
        AppConfig::load(&env).with_context(|| format!("loading config for env '{}'", env))?;
    if let Some(port) = get_port_override() {
        config.gateway.port = port;
    }

    let _log_guard = logging::init_logging(&config);
    tracing::info!(env = %env, version = env!("GIT_HASH"), "Starting points ledger");

    let db = Database::connect(&config.database)
        .await
        .with_context(|| format!("connecting to {}", config.database.url))?;
    db.migrate().await.context("applying schema")?;
    let db = Arc::new(db);

    let state = Arc::new(AppState::new(db.clone()));
    let served = gateway::run_server(&config.gateway, state, shutdown_signal()).await;

    // Any in-flight unit of work finishes (or rolls back) before the pool goes
    db.close().await;
    served
}
