//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ENCORE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `ENCORE_HOST` - Bind address (default: 127.0.0.1)
//! - `ENCORE_PORT` - Listen port (default: 3001)
//! - `ENCORE_VIP_SPEND_THRESHOLD` - Lifetime spend for VIP (default: 500)
//! - `ENCORE_LOYAL_ORDER_THRESHOLD` - Order count for Loyal (default: 5)
//! - `ENCORE_REGULAR_ORDER_THRESHOLD` - Order count for Regular (default: 2)
//! - `ENCORE_LOW_STOCK_THRESHOLD` - Low-stock alert boundary (default: 10)
//! - `ENCORE_QUERY_TIMEOUT_SECS` - Store query timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use encore_core::SegmentRules;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Customer classification thresholds
    pub segment_rules: SegmentRules,
    /// Products with 0 < quantity < this value raise a low-stock alert
    pub low_stock_threshold: i64,
    /// Upper bound for any single store query
    pub query_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ENCORE_DATABASE_URL")?;
        let host = get_env_or_default("ENCORE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ENCORE_HOST".to_string(), e.to_string()))?;
        let port = parse_env_or("ENCORE_PORT", 3001_u16)?;

        let segment_rules = SegmentRules {
            vip_spend: get_env_or_default("ENCORE_VIP_SPEND_THRESHOLD", "500")
                .parse::<Decimal>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "ENCORE_VIP_SPEND_THRESHOLD".to_string(),
                        e.to_string(),
                    )
                })?,
            loyal_orders: parse_env_or("ENCORE_LOYAL_ORDER_THRESHOLD", 5_u32)?,
            regular_orders: parse_env_or("ENCORE_REGULAR_ORDER_THRESHOLD", 2_u32)?,
        };

        let low_stock_threshold = parse_env_or("ENCORE_LOW_STOCK_THRESHOLD", 10_i64)?;
        let query_timeout = Duration::from_secs(parse_env_or("ENCORE_QUERY_TIMEOUT_SECS", 10_u64)?);

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            segment_rules,
            low_stock_threshold,
            query_timeout,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for AdminConfig {
    /// Defaults used by tests; production always loads from the environment.
    fn default() -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/encore_admin"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            segment_rules: SegmentRules::default(),
            low_stock_threshold: 10,
            query_timeout: Duration::from_secs(10),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable into `T`, using `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
