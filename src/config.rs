//! Client configuration
//!
//! Everything is read from the environment once at start-up.

use std::time::Duration;
use thiserror::Error;

/// Base address of the document service when `RAGBOX_API_URL` is unset
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Shared timeout for every remote call, long enough for ingestion of a
/// large document
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const BASE_URL_VAR: &str = "RAGBOX_API_URL";
const TIMEOUT_VAR: &str = "RAGBOX_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    EmptyBaseUrl { var: &'static str },
}

/// Connection settings for the transport client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = match lookup(BASE_URL_VAR) {
            Some(url) => {
                let url = url.trim().trim_end_matches('/');
                if url.is_empty() {
                    return Err(ConfigError::EmptyBaseUrl { var: BASE_URL_VAR });
                }
                url.to_string()
            }
            None => DEFAULT_BASE_URL.to_string(),
        };

        let timeout = match lookup(TIMEOUT_VAR) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        var: TIMEOUT_VAR,
                        value,
                    })
                }
            },
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self { base_url, timeout })
    }
}
