//! Server configuration module.
//!
//! This module provides configuration loading for the coffee shop server from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `COFFEE_SHOP_AUTH_DOMAIN`: Domain of the identity provider issuing tokens (required)
//! - `COFFEE_SHOP_API_AUDIENCE`: Expected `aud` claim of incoming tokens (required)
//! - `COFFEE_SHOP_DATABASE_URL`: SQLite connection URL (default: `sqlite://database.db?mode=rwc`)
//! - `COFFEE_SHOP_LISTEN_PORT`: Port to listen on (default: `5000`)
//! - `COFFEE_SHOP_JWKS_CACHE_TTL_SECS`: How long a fetched key set stays trusted (default: `600`)
//! - `COFFEE_SHOP_JWKS_MIN_REFRESH_SECS`: Minimum age of the cached key set before an unknown key id may trigger a refetch (default: `30`)
//! - `COFFEE_SHOP_RESET_DATABASE`: Drop, recreate and seed the drinks table at startup (default: `false`)
//!
//! # Invariants
//!
//! - `auth_domain` and `api_audience` are never empty
//! - `listen_port` is always a valid port number (1-65535)
//! - `jwks_cache_ttl` is never zero

use std::time::Duration;

use thiserror::Error;

const AUTH_DOMAIN: &str = "COFFEE_SHOP_AUTH_DOMAIN";
const API_AUDIENCE: &str = "COFFEE_SHOP_API_AUDIENCE";
const DATABASE_URL: &str = "COFFEE_SHOP_DATABASE_URL";
const LISTEN_PORT: &str = "COFFEE_SHOP_LISTEN_PORT";
const JWKS_CACHE_TTL_SECS: &str = "COFFEE_SHOP_JWKS_CACHE_TTL_SECS";
const JWKS_MIN_REFRESH_SECS: &str = "COFFEE_SHOP_JWKS_MIN_REFRESH_SECS";
const RESET_DATABASE: &str = "COFFEE_SHOP_RESET_DATABASE";

/// Server configuration.
///
/// Built once in `main` and handed to every component that needs it. Nothing
/// reads the environment after startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Identity provider domain, e.g. `tenant.us.auth0.com`.
    /// The JWKS endpoint and the expected issuer are both derived from it.
    pub auth_domain: String,
    /// Expected `aud` claim.
    pub api_audience: String,
    /// SQLite connection URL for the drinks table.
    pub database_url: String,
    /// Port to listen on for HTTP connections.
    pub listen_port: u16,
    /// Lifetime of a cached signing-key set.
    pub jwks_cache_ttl: Duration,
    /// How recently fetched a key set must be for an unknown `kid` to be
    /// rejected without refetching.
    pub jwks_min_refresh_interval: Duration,
    /// Drop and reseed the drinks table on startup.
    pub reset_database: bool,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

impl ServerConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 5000;
    /// Default database URL.
    pub const DEFAULT_DATABASE_URL: &'static str = "sqlite://database.db?mode=rwc";
    /// Default key-set cache lifetime in seconds.
    pub const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 600;
    /// Default minimum interval between forced key-set refreshes in seconds.
    pub const DEFAULT_JWKS_MIN_REFRESH_SECS: u64 = 30;

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `COFFEE_SHOP_AUTH_DOMAIN` or `COFFEE_SHOP_API_AUDIENCE` is not set or is empty
    /// - `COFFEE_SHOP_LISTEN_PORT` is set but not a valid port number
    /// - `COFFEE_SHOP_JWKS_CACHE_TTL_SECS` is set but not a positive integer
    /// - `COFFEE_SHOP_JWKS_MIN_REFRESH_SECS` is set but not an integer
    /// - `COFFEE_SHOP_RESET_DATABASE` is set but not a boolean
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `from_env` is this with `std::env::var`; tests pass a map instead.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_domain = required(&lookup, AUTH_DOMAIN)?;
        let api_audience = required(&lookup, API_AUDIENCE)?;
        let database_url =
            lookup(DATABASE_URL).unwrap_or_else(|| Self::DEFAULT_DATABASE_URL.to_string());
        let listen_port = Self::load_listen_port(&lookup)?;
        let jwks_cache_ttl = Self::load_jwks_cache_ttl(&lookup)?;
        let jwks_min_refresh_interval = Self::load_jwks_min_refresh_interval(&lookup)?;
        let reset_database = Self::load_reset_database(&lookup)?;

        Ok(Self {
            auth_domain,
            api_audience,
            database_url,
            listen_port,
            jwks_cache_ttl,
            jwks_min_refresh_interval,
            reset_database,
        })
    }

    /// URL of the identity provider's published signing-key set.
    #[must_use]
    pub fn jwks_url(&self) -> String {
        format!("https://{}/.well-known/jwks.json", self.auth_domain)
    }

    /// Expected `iss` claim. The trailing slash is part of the issuer.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.auth_domain)
    }

    fn load_listen_port<F>(lookup: &F) -> Result<u16, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(LISTEN_PORT) {
            Some(value) => match value.parse::<u16>() {
                Ok(port) if port > 0 => Ok(port),
                _ => Err(ConfigError::InvalidValue {
                    name: LISTEN_PORT.to_string(),
                    message: format!("'{value}' is not a valid port number (must be 1-65535)"),
                }),
            },
            None => Ok(Self::DEFAULT_PORT),
        }
    }

    fn load_jwks_cache_ttl<F>(lookup: &F) -> Result<Duration, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(JWKS_CACHE_TTL_SECS) {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                _ => Err(ConfigError::InvalidValue {
                    name: JWKS_CACHE_TTL_SECS.to_string(),
                    message: format!("'{value}' is not a positive number of seconds"),
                }),
            },
            None => Ok(Duration::from_secs(Self::DEFAULT_JWKS_CACHE_TTL_SECS)),
        }
    }

    /// Zero is allowed and means every unknown `kid` refetches.
    fn load_jwks_min_refresh_interval<F>(lookup: &F) -> Result<Duration, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(JWKS_MIN_REFRESH_SECS) {
            Some(value) => value
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue {
                    name: JWKS_MIN_REFRESH_SECS.to_string(),
                    message: format!("'{value}' is not a number of seconds"),
                }),
            None => Ok(Duration::from_secs(Self::DEFAULT_JWKS_MIN_REFRESH_SECS)),
        }
    }

    fn load_reset_database<F>(lookup: &F) -> Result<bool, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(value) = lookup(RESET_DATABASE) else {
            return Ok(false);
        };
        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name: RESET_DATABASE.to_string(),
                message: format!("'{value}' is not a boolean"),
            }),
        }
    }
}

/// Load a variable that must be present and non-empty.
fn required<F>(lookup: &F, name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))?;

    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            message: "must not be empty".to_string(),
        });
    }

    Ok(value)
}
