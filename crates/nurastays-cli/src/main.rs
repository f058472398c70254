//! nurastays - command-line access to the Nura Stays catalog and admin
//! back-office.

mod commands;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nurastays_core::{ApiClient, Config, SessionManager};

use commands::Cli;

/// Directory for optional daily log files
const ENV_LOG_DIR: &str = "NURASTAYS_LOG_DIR";

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG to control the level (e.g. RUST_LOG=debug). When
/// NURASTAYS_LOG_DIR is set, logs are also written to a daily file there;
/// the returned guard must live until exit so buffered lines are flushed.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr = fmt::layer().with_writer(io::stderr);

    match std::env::var(ENV_LOG_DIR).ok().filter(|d| !d.is_empty()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "nurastays.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(stderr)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(stderr).with(filter).init();
            None
        }
    }
}

/// Printed when the stored session could not be refreshed
fn login_required(login_path: &str) {
    eprintln!(
        "Your session has expired ({}). Run `nurastays login <email>` to sign in again.",
        login_path
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing();

    let mut config = Config::load()?;
    if let Some(ref url) = cli.api_url {
        config.api_url = url.clone();
    }
    info!(api_url = %config.api_url, "nurastays starting");

    let tokens = config.open_token_store()?;
    let api = ApiClient::new(&config, tokens)?.with_redirect(Arc::new(login_required));
    let mut session = SessionManager::new(api);

    commands::run(cli.command, &mut session).await
}
