//! Client configuration, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use stockpanel_auth::NavFallback;
use thiserror::Error;

pub const ENV_API_URL: &str = "STOCKPANEL_API_URL";
pub const ENV_STATE_DB: &str = "STOCKPANEL_STATE_DB";
pub const ENV_HTTP_TIMEOUT: &str = "STOCKPANEL_HTTP_TIMEOUT_SECS";
pub const ENV_NAV_FALLBACK: &str = "STOCKPANEL_NAV_FALLBACK";

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash.
    pub api_url: String,
    /// SQLite file holding the persisted session. `None` resolves to the OS
    /// data directory.
    pub state_db: Option<PathBuf>,
    pub http_timeout: Duration,
    pub nav_fallback: NavFallback,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: normalize_api_url(&api_url.into())?,
            state_db: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            nav_fallback: NavFallback::default(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(api_url)?;

        if let Some(path) = lookup(ENV_STATE_DB).filter(|p| !p.trim().is_empty()) {
            config.state_db = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT) {
            let secs: u64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                var: ENV_HTTP_TIMEOUT,
                reason: format!("{e}"),
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: ENV_HTTP_TIMEOUT,
                    reason: "must be at least 1 second".into(),
                });
            }
            config.http_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(ENV_NAV_FALLBACK) {
            config.nav_fallback = raw.parse().map_err(|e| ConfigError::Invalid {
                var: ENV_NAV_FALLBACK,
                reason: format!("{e}"),
            })?;
        }

        Ok(config)
    }

    /// Resolve where the session database lives.
    pub fn state_db_path(&self) -> anyhow::Result<PathBuf> {
        match &self.state_db {
            Some(path) => Ok(path.clone()),
            None => default_state_db_path(),
        }
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed).map_err(|e| ConfigError::Invalid {
        var: ENV_API_URL,
        reason: format!("{e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            var: ENV_API_URL,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

/// `{app_data_dir}/stockpanel/session.db`.
fn default_state_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|mut h| {
            h.push(".local");
            h.push("share");
            h
        }))
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    let mut path = base;
    path.push("stockpanel");
    path.push("session.db");
    Ok(path)
}
