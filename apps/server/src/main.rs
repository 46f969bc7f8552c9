//! TransferDesk server
//!
//! Wires configuration, logging, the SQLite record store and the gateway,
//! then serves connection tests over HTTP.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{info, warn};
use transferdesk_gateway::{DependenciesBuilder, GatewayServer};
use transferdesk_storage::{generate_master_key, Database, FieldEncryptor, SqliteConnectionRepository};

mod config;

use config::{AppConfig, ENV_MASTER_KEY};

/// Log file prefix, e.g. transferdesk.2026-01-22.log
const LOG_PREFIX: &str = "transferdesk";

/// Initialize tracing with a console layer and, when `log_dir` is set, a
/// daily-rotating file layer.
///
/// The returned guard must be kept alive for file logs to be flushed.
fn init_tracing(log_dir: Option<&Path>) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    // RUST_LOG takes precedence, with debug for our own crates by default
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,transferdesk_core=debug,transferdesk_gateway=debug,transferdesk_storage=debug,transferdesk=debug,tower_http=info")
    });

    // Console layer: colored, compact
    let console_layer = fmt::layer()
        .with_ansi(true)
        .compact()
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {:?}", dir))?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_PREFIX)
                .filename_suffix("log")
                .build(dir)
                .context("Failed to create log file appender")?;
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            // File layer: no colors, include more detail
            let layer = fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn field_encryptor(master_key: Option<&str>) -> Result<FieldEncryptor> {
    match master_key {
        Some(key) => FieldEncryptor::from_hex_key(key)
            .with_context(|| format!("{} must be 64 hex characters", ENV_MASTER_KEY)),
        None => {
            warn!(
                "[Server] {} not set; using a random key. Secrets saved now cannot be read after a restart",
                ENV_MASTER_KEY
            );
            FieldEncryptor::new(&*generate_master_key()?)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for development)
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let _guard = init_tracing(config.log_dir.as_deref())?;

    info!("[Server] TransferDesk v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(dir) = &config.log_dir {
        info!("[Server] Writing logs to {:?}", dir);
    }

    let database = Database::open(&config.database_path)?;
    info!("[Server] Database: {:?}", config.database_path);

    let encryptor = field_encryptor(config.master_key.as_deref())?;
    let connections = Arc::new(SqliteConnectionRepository::new(
        Arc::new(Mutex::new(database)),
        Arc::new(encryptor),
    ));

    let http_client = reqwest::Client::builder()
        .user_agent(concat!("transferdesk/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let dependencies = DependenciesBuilder::new()
        .with_connection_repo(connections)
        .with_tester_config(config.tester.clone())
        .with_http_client(http_client)
        .build()
        .map_err(anyhow::Error::msg)?;

    GatewayServer::new(config.gateway, dependencies).run().await
}
