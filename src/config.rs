//! Environment-driven configuration for the price sync service

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Upper bound for a single product page request
    pub fetch_timeout: Duration,
    /// Pause between consecutive links in a batch
    pub request_delay: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    /// Cron expression (with seconds); `None` disables scheduled runs
    pub sync_schedule: Option<String>,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, so parsing can be tested without touching the process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let schedule: String = load(&lookup, "SYNC_SCHEDULE", "0 0 6 * * *")?;

        Ok(Self {
            database_url: load(&lookup, "DATABASE_URL", "sqlite:database/pharmacy_links.db")?,
            port: load(&lookup, "PORT", "8080")?,
            fetch_timeout: Duration::from_secs(load(&lookup, "FETCH_TIMEOUT_SECS", "10")?),
            request_delay: Duration::from_millis(load(&lookup, "REQUEST_DELAY_MS", "1000")?),
            max_retries: load(&lookup, "FETCH_MAX_RETRIES", "0")?,
            retry_backoff: Duration::from_millis(load(&lookup, "RETRY_BACKOFF_MS", "2000")?),
            sync_schedule: Some(schedule.trim().to_string()).filter(|s| !s.is_empty()),
            user_agent: load(&lookup, "SCRAPER_USER_AGENT", DEFAULT_USER_AGENT)?,
        })
    }
}

fn load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}
