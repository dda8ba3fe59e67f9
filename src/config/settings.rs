//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::constants::{
    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS, DEFAULT_DATABASE_MAX_CONNECTIONS,
    DEFAULT_DATABASE_MIN_CONNECTIONS, DEFAULT_DATABASE_URL, DEFAULT_STORE_TIMEOUT_MS,
    DELETE_MODE_HARD, DELETE_MODE_SOFT,
};

/// How a delete is carried out by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Mark the row with `deleted_at`
    #[default]
    Soft,
    /// Remove the row
    Hard,
}

impl From<&str> for DeletePolicy {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            DELETE_MODE_HARD => DeletePolicy::Hard,
            _ => DeletePolicy::Soft,
        }
    }
}

impl std::fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeletePolicy::Soft => write!(f, "{}", DELETE_MODE_SOFT),
            DeletePolicy::Hard => write!(f, "{}", DELETE_MODE_HARD),
        }
    }
}

/// Application configuration
///
/// The bind address is not here; `serve` reads it from its own arguments.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    pub database_connect_timeout: Duration,
    pub store_timeout: Duration,
    pub delete_policy: DeletePolicy,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("database_min_connections", &self.database_min_connections)
            .field("database_connect_timeout", &self.database_connect_timeout)
            .field("store_timeout", &self.store_timeout)
            .field("delete_policy", &self.delete_policy)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            database_max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            database_min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
            database_connect_timeout: Duration::from_secs(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            delete_policy: DeletePolicy::Soft,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparseable values fall back to the defaults in
    /// [`crate::config`].
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
            database_min_connections: parse_env("DATABASE_MIN_CONNECTIONS")
                .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
            database_connect_timeout: Duration::from_secs(
                parse_env("DATABASE_CONNECT_TIMEOUT_SECS")
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
            ),
            store_timeout: Duration::from_millis(
                parse_env("STORE_TIMEOUT_MS").unwrap_or(DEFAULT_STORE_TIMEOUT_MS),
            ),
            delete_policy: env::var("USER_DELETE_MODE")
                .map(|v| DeletePolicy::from(v.as_str()))
                .unwrap_or_default(),
        }
    }
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
