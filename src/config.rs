//! Navigator configuration

use crate::lifecycle::RetryPolicy;
use crate::window::MediaPlaceholders;
use std::time::Duration;

const DEFAULT_MESSAGE_TTL_MINUTES: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavConfig {
    /// SQLite database backing the navigation store
    pub db_path: String,
    /// How long a created message lives before its cleanup job fires
    pub message_ttl: Duration,
    pub retry: RetryPolicy,
    pub placeholders: MediaPlaceholders,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            message_ttl: ttl_from_minutes(DEFAULT_MESSAGE_TTL_MINUTES),
            retry: RetryPolicy::default(),
            placeholders: MediaPlaceholders::default(),
        }
    }
}

impl NavConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let retry = RetryPolicy {
            max_attempts: env_parse("WINDOW_STACK_MAX_RENDER_ATTEMPTS")
                .filter(|n: &u32| *n > 0)
                .unwrap_or(defaults.retry.max_attempts),
            backoff: env_parse("WINDOW_STACK_RETRY_BACKOFF_MS")
                .map_or(defaults.retry.backoff, Duration::from_millis),
        };
        Self {
            db_path: std::env::var("WINDOW_STACK_DB_PATH").unwrap_or(defaults.db_path),
            message_ttl: env_parse("WINDOW_STACK_MESSAGE_TTL_MINUTES")
                .map_or(defaults.message_ttl, ttl_from_minutes),
            retry,
            placeholders: MediaPlaceholders {
                photo: std::env::var("WINDOW_STACK_PLACEHOLDER_PHOTO").ok(),
                voice: std::env::var("WINDOW_STACK_PLACEHOLDER_VOICE").ok(),
            },
        }
    }
}

/// Saturates instead of overflowing on absurd values
fn ttl_from_minutes(minutes: u64) -> Duration {
    Duration::from_secs(minutes.saturating_mul(60))
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    format!("{home}/.window-stack/nav.db")
}
