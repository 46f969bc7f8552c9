//! Server configuration from `TRANSFERDESK_*` environment variables

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use transferdesk_gateway::{GatewayConfig, TesterConfig};

pub const ENV_HOST: &str = "TRANSFERDESK_HOST";
pub const ENV_PORT: &str = "TRANSFERDESK_PORT";
pub const ENV_CORS: &str = "TRANSFERDESK_CORS";
pub const ENV_DATABASE_PATH: &str = "TRANSFERDESK_DATABASE_PATH";
pub const ENV_MASTER_KEY: &str = "TRANSFERDESK_MASTER_KEY";
pub const ENV_PROBE_TIMEOUT_SECS: &str = "TRANSFERDESK_PROBE_TIMEOUT_SECS";
pub const ENV_PERSIST_TIMEOUT_SECS: &str = "TRANSFERDESK_PERSIST_TIMEOUT_SECS";
pub const ENV_SALESFORCE_API_VERSION: &str = "TRANSFERDESK_SALESFORCE_API_VERSION";
pub const ENV_LOG_DIR: &str = "TRANSFERDESK_LOG_DIR";

pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub tester: TesterConfig,
    pub database_path: PathBuf,
    /// 64 hex chars; a random per-process key is used when absent
    pub master_key: Option<String>,
    /// Enables the rolling file log when set
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut gateway = GatewayConfig::default();
        if let Some(host) = get(ENV_HOST) {
            gateway.host = host;
        }
        if let Some(port) = parse::<u16>(ENV_PORT, get(ENV_PORT))? {
            gateway.port = port;
        }
        if let Some(cors) = get(ENV_CORS) {
            gateway.enable_cors = parse_bool(ENV_CORS, &cors)?;
        }

        let mut tester = TesterConfig::default();
        if let Some(secs) = parse::<u64>(ENV_PROBE_TIMEOUT_SECS, get(ENV_PROBE_TIMEOUT_SECS))? {
            tester.probe_timeout = non_zero_secs(ENV_PROBE_TIMEOUT_SECS, secs)?;
        }
        if let Some(secs) = parse::<u64>(ENV_PERSIST_TIMEOUT_SECS, get(ENV_PERSIST_TIMEOUT_SECS))? {
            tester.persist_timeout = non_zero_secs(ENV_PERSIST_TIMEOUT_SECS, secs)?;
        }
        if let Some(version) = get(ENV_SALESFORCE_API_VERSION) {
            tester.salesforce_api_version = version;
        }

        let database_path = match get(ENV_DATABASE_PATH) {
            Some(path) => PathBuf::from(path),
            None => transferdesk_storage::default_database_path().with_context(|| {
                format!("No platform data directory; set {}", ENV_DATABASE_PATH)
            })?,
        };

        Ok(Self {
            gateway,
            tester,
            database_path,
            master_key: get(ENV_MASTER_KEY),
            log_dir: get(ENV_LOG_DIR).map(PathBuf::from),
        })
    }
}

fn parse<T>(name: &str, value: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .map(|v| v.parse::<T>().with_context(|| format!("Invalid {}: {:?}", name, v)))
        .transpose()
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("Invalid {}: {:?} (expected true or false)", name, value),
    }
}

fn non_zero_secs(name: &str, secs: u64) -> Result<Duration> {
    if secs == 0 {
        anyhow::bail!("{} must be at least 1", name);
    }
    Ok(Duration::from_secs(secs))
}
