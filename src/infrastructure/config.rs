//! Settings from a TOML file and the environment.
//!
//! File: `--config <path>` or `~/.config/tgapply/config.toml`.
//! Env overrides: TGAPPLY_API_URL, TGAPPLY_POLL_INTERVAL_SECS, TGAPPLY_DEBUG,
//! TGAPPLY_LOG_FILE.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_API_URL: &str = "TGAPPLY_API_URL";
pub const ENV_POLL_INTERVAL: &str = "TGAPPLY_POLL_INTERVAL_SECS";
pub const ENV_DEBUG: &str = "TGAPPLY_DEBUG";
pub const ENV_LOG_FILE: &str = "TGAPPLY_LOG_FILE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("{key} is {value}, expected 1..={max}")]
    OutOfRange {
        key: &'static str,
        value: u64,
        max: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Status endpoint. Requests fail with a configuration error when unset.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Seconds between status refreshes while pending (default 10).
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Per-request timeout in seconds (default 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Show the debug panel.
    #[serde(default)]
    pub debug: bool,
    /// Where to write logs. No file, no logs.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Stay on the pending screen when a background refresh fails.
    #[serde(default)]
    pub keep_pending_on_poll_error: bool,
}

/// Upper bound for intervals and timeouts, in seconds.
pub const MAX_SECS: u64 = 86_400;

fn default_poll_interval_secs() -> u64 {
    10
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: None,
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            debug: false,
            log_file: None,
            keep_pending_on_poll_error: false,
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        check_range("poll_interval_secs", self.poll_interval_secs)?;
        check_range("request_timeout_secs", self.request_timeout_secs)?;
        Ok(self)
    }
}

fn check_range(key: &'static str, value: u64) -> Result<(), ConfigError> {
    if (1..=MAX_SECS).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { key, value, max: MAX_SECS })
    }
}

/// Load settings: defaults, then the config file (if any), then env vars.
///
/// An explicitly given path must exist; the default path is optional.
pub fn load(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    let settings = match explicit {
        Some(path) => load_file(path)?,
        None => match default_path().filter(|p| p.exists()) {
            Some(path) => load_file(&path)?,
            None => Settings::default(),
        },
    };
    apply_env(settings, |key| std::env::var(key).ok())?.validate()
}

pub fn default_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/tgapply/config.toml"))
}

pub fn load_file(path: &Path) -> Result<Settings, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Applies environment overrides using `lookup` to read variables.
pub fn apply_env<F>(mut settings: Settings, lookup: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL) {
        settings.api_url = Some(url.trim().to_string()).filter(|url| !url.is_empty());
    }
    if let Some(value) = lookup(ENV_POLL_INTERVAL) {
        settings.poll_interval_secs = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            key: ENV_POLL_INTERVAL,
            value: value.clone(),
        })?;
    }
    if let Some(value) = lookup(ENV_DEBUG) {
        settings.debug = match value.trim() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" | "" => false,
            _ => return Err(ConfigError::InvalidEnv { key: ENV_DEBUG, value: value.clone() }),
        };
    }
    if let Some(path) = lookup(ENV_LOG_FILE) {
        settings.log_file = Some(PathBuf::from(path)).filter(|p| !p.as_os_str().is_empty());
    }
    Ok(settings)
}
