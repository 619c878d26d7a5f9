use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for the client
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST API, without trailing slash
    pub api_url: String,
    pub timeout: Duration,
    /// Directory backing the local key/value store
    pub storage_dir: PathBuf,
}

impl Config {
    /// Build configuration from `PROPERTY_HUB_*` environment variables
    pub fn from_env() -> Self {
        let api_url = std::env::var("PROPERTY_HUB_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = std::env::var("PROPERTY_HUB_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let storage_dir = storage_dir_from(std::env::var("PROPERTY_HUB_STORAGE_DIR").ok());

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
            storage_dir,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            storage_dir: default_storage_dir(),
        }
    }
}

/// Blank values fall back to the default location
fn storage_dir_from(raw: Option<String>) -> PathBuf {
    raw.filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_storage_dir)
}

/// `<data dir>/property-hub`, or `./.property-hub` when no data dir exists
pub fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("property-hub"))
        .unwrap_or_else(|| PathBuf::from(".property-hub"))
}
