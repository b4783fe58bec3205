//! Environment-driven configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `BASE_API_URL` | required |
//! | `API_TIMEOUT_SECS` | `30` |
//! | `API_MAX_RETRIES` | `3` |
//! | `API_RETRY_BASE_DELAY_MS` | `1000` |
//! | `API_RETRY_MODE` | `always` (or `transient`) |

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::retry::{RetryMode, RetryPolicy};
use crate::transport::DEFAULT_TIMEOUT;

pub const BASE_API_URL: &str = "BASE_API_URL";
pub const API_TIMEOUT_SECS: &str = "API_TIMEOUT_SECS";
pub const API_MAX_RETRIES: &str = "API_MAX_RETRIES";
pub const API_RETRY_BASE_DELAY_MS: &str = "API_RETRY_BASE_DELAY_MS";
pub const API_RETRY_MODE: &str = "API_RETRY_MODE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-attempt ceiling.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(BASE_API_URL)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing(BASE_API_URL))?;
        url::Url::parse(&base_url).map_err(|e| ConfigError::Invalid {
            key: BASE_API_URL,
            value: base_url.clone(),
            reason: e.to_string(),
        })?;

        let timeout_secs: u64 = parse_or(&lookup, API_TIMEOUT_SECS, DEFAULT_TIMEOUT.as_secs())?;
        let max_attempts: u32 = parse_or(&lookup, API_MAX_RETRIES, 3)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: API_MAX_RETRIES,
                value: "0".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }
        let base_delay_ms: u64 = parse_or(&lookup, API_RETRY_BASE_DELAY_MS, 1000)?;
        let mode = match lookup(API_RETRY_MODE).as_deref().map(str::trim) {
            None | Some("") | Some("always") => RetryMode::Always,
            Some("transient") => RetryMode::TransientOnly,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: API_RETRY_MODE,
                    value: other.to_string(),
                    reason: "expected `always` or `transient`".to_string(),
                })
            }
        };

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            retry: RetryPolicy {
                max_attempts,
                base_delay: Duration::from_millis(base_delay_ms),
                mode,
            },
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
