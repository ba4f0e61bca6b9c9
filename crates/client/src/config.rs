//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PRODUCT_DESK_API_URL` - Catalog API base URL (default: <https://api.bitechx.com>)
//! - `PRODUCT_DESK_TOKEN_FILE` - Where the bearer token is persisted
//!   (default: `<config dir>/product-desk/token`)
//! - `PRODUCT_DESK_PAGE_SIZE` - Entries per page (default: 50)
//! - `PRODUCT_DESK_SEARCH_DEBOUNCE_MS` - Search input debounce (default: 400)
//! - `PRODUCT_DESK_HTTP_TIMEOUT_SECS` - Request timeout (default: none, the
//!   transport default applies)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::api::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_URL: &str = "https://api.bitechx.com";
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);
const MAX_PAGE_SIZE: u32 = 500;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Full client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Remote API settings
    pub api: ApiConfig,
    /// File holding the persisted bearer token
    pub token_file: PathBuf,
    /// Entries requested per page
    pub page_size: u32,
    /// Quiet period before a search input change is evaluated
    pub search_debounce: Duration,
}

/// Remote API connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint is resolved against
    pub base_url: Url,
    /// Per-request timeout; `None` leaves the transport default in place
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value, or if
    /// no token file is configured and the platform has no config directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url(&get_env_or_default("PRODUCT_DESK_API_URL", DEFAULT_API_URL))?;
        let timeout = get_optional_env("PRODUCT_DESK_HTTP_TIMEOUT_SECS")
            .map(|s| parse_timeout(&s))
            .transpose()?;
        let token_file = match get_optional_env("PRODUCT_DESK_TOKEN_FILE") {
            Some(path) => PathBuf::from(path),
            None => default_token_file()?,
        };
        let page_size = get_optional_env("PRODUCT_DESK_PAGE_SIZE")
            .map(|s| parse_page_size(&s))
            .transpose()?
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let search_debounce = get_optional_env("PRODUCT_DESK_SEARCH_DEBOUNCE_MS")
            .map(|s| parse_debounce(&s))
            .transpose()?
            .unwrap_or(DEFAULT_SEARCH_DEBOUNCE);

        Ok(Self {
            api: ApiConfig { base_url, timeout },
            token_file,
            page_size,
            search_debounce,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn default_token_file() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("product-desk").join("token"))
        .ok_or_else(|| ConfigError::MissingEnvVar("PRODUCT_DESK_TOKEN_FILE".to_string()))
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("PRODUCT_DESK_API_URL".to_string(), reason);

    let url = Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    Ok(url)
}

fn parse_page_size(value: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("PRODUCT_DESK_PAGE_SIZE".to_string(), reason);

    let size = value.trim().parse::<u32>().map_err(|e| invalid(e.to_string()))?;
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(invalid(format!("must be between 1 and {MAX_PAGE_SIZE}")));
    }
    Ok(size)
}

fn parse_debounce(value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| {
            ConfigError::InvalidEnvVar("PRODUCT_DESK_SEARCH_DEBOUNCE_MS".to_string(), e.to_string())
        })
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            "PRODUCT_DESK_HTTP_TIMEOUT_SECS".to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidEnvVar(
            "PRODUCT_DESK_HTTP_TIMEOUT_SECS".to_string(),
            e.to_string(),
        )),
    }
}
