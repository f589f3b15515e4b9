use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_VENDOR_URL: &str = "https://api.cloudconvert.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub vendor: VendorConfig,
    pub polling: PollingConfig,
    pub formats: FormatsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Empty means any origin is accepted.
    pub cors_allowed_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Clone)]
pub struct VendorConfig {
    pub api_key: String,
    pub base_url: String,
}

// Keep the bearer token out of startup logs.
impl std::fmt::Debug for VendorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub max_attempts: u32,
    pub timeout_secs: u64,
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct FormatsConfig {
    /// When set, every input may only be converted to this one format.
    pub single_target: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            server: ServerConfig {
                port: var_or("PORT", "3001")
                    .parse()
                    .context("PORT must be a valid port number")?,
                host: var_or("HOST", "0.0.0.0"),
                cors_allowed_origins: lookup("ALLOWED_ORIGINS")
                    .map(|origins| {
                        origins
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
                upload_dir: PathBuf::from(var_or("UPLOAD_DIR", "uploads")),
                max_upload_bytes: var_or("MAX_UPLOAD_BYTES", "104857600")
                    .parse()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
            },
            vendor: VendorConfig {
                api_key: lookup("CLOUDCONVERT_API_KEY")
                    .filter(|key| !key.trim().is_empty())
                    .context("CLOUDCONVERT_API_KEY must be set")?,
                base_url: var_or("CLOUDCONVERT_API_URL", DEFAULT_VENDOR_URL)
                    .trim_end_matches('/')
                    .to_string(),
            },
            polling: PollingConfig {
                interval_ms: var_or("POLL_INTERVAL_MS", "1000")
                    .parse()
                    .context("POLL_INTERVAL_MS must be a number of milliseconds")?,
                max_attempts: var_or("POLL_MAX_ATTEMPTS", "600")
                    .parse()
                    .context("POLL_MAX_ATTEMPTS must be a positive integer")?,
                timeout_secs: var_or("POLL_TIMEOUT_SECS", "900")
                    .parse()
                    .context("POLL_TIMEOUT_SECS must be a number of seconds")?,
            },
            formats: FormatsConfig {
                single_target: lookup("CONVERSION_TARGET")
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty()),
            },
        })
    }
}
