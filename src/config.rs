use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_UPLOAD_MAX_RETRIES: u32 = 3;
const DEFAULT_UPLOAD_RETRY_DELAY_SECS: u64 = 5;
const DEFAULT_UPLOAD_CONCURRENCY: usize = 4;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the integration client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the service API, e.g. `https://ia.nebuia.com/api/v1`.
    pub base_url: String,
    /// API key sent in the `key` header.
    pub api_key: String,
    /// API secret sent in the `secret` header.
    pub api_secret: String,
    /// Per-request timeout applied by the HTTP client.
    pub http_timeout: Duration,
    /// Total upload attempts per file.
    pub upload_max_retries: u32,
    /// Fixed delay between upload attempts.
    pub upload_retry_delay: Duration,
    /// Number of files uploaded concurrently by the pipeline.
    pub upload_concurrency: usize,
}

impl Config {
    /// Build a configuration with default tuning for the given endpoint and credentials.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            upload_max_retries: DEFAULT_UPLOAD_MAX_RETRIES,
            upload_retry_delay: Duration::from_secs(DEFAULT_UPLOAD_RETRY_DELAY_SECS),
            upload_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
        }
    }

    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(
            load_env("NEBUIA_BASE_URL")?,
            load_env("NEBUIA_API_KEY")?,
            load_env("NEBUIA_API_SECRET")?,
        );

        if let Some(secs) = parse_optional::<u64>("NEBUIA_HTTP_TIMEOUT_SECS")? {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = parse_optional::<u32>("NEBUIA_UPLOAD_MAX_RETRIES")? {
            config.upload_max_retries = retries;
        }
        if let Some(secs) = parse_optional::<u64>("NEBUIA_UPLOAD_RETRY_DELAY_SECS")? {
            config.upload_retry_delay = Duration::from_secs(secs);
        }
        if let Some(concurrency) = parse_optional::<usize>("NEBUIA_UPLOAD_CONCURRENCY")? {
            if concurrency == 0 {
                return Err(ConfigError::InvalidValue(
                    "NEBUIA_UPLOAD_CONCURRENCY".to_string(),
                ));
            }
            config.upload_concurrency = concurrency;
        }

        Ok(config)
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    load_env_optional(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        base_url = %config.base_url,
        http_timeout = ?config.http_timeout,
        upload_max_retries = config.upload_max_retries,
        upload_retry_delay = ?config.upload_retry_delay,
        upload_concurrency = config.upload_concurrency,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
