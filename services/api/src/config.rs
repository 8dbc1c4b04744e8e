//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup; the
//! station code and backend credentials that used to live as literals in
//! the handlers are explicit fields here. A `.env` file is used for local
//! development.

use std::net::SocketAddr;
use std::str::FromStr;

use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which storage backend the service runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-process tables, the default for local use and tests.
    Memory,
    /// A Supabase/PostgREST endpoint.
    Postgrest,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgrest" => Ok(StorageBackend::Postgrest),
            other => Err(format!("'{}' is not a valid storage backend", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub backend: StorageBackend,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    /// Station code used when a request does not name one.
    pub station: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to ensure
    /// tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let backend_str =
            std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "memory".to_string());
        let backend = backend_str
            .parse::<StorageBackend>()
            .map_err(|e| ConfigError::InvalidValue("STORAGE_BACKEND".to_string(), e))?;

        let supabase_url = std::env::var("SUPABASE_URL").ok();
        let supabase_anon_key = std::env::var("SUPABASE_ANON_KEY").ok();

        // The PostgREST backend cannot run without its endpoint.
        if backend == StorageBackend::Postgrest {
            if supabase_url.is_none() {
                return Err(ConfigError::MissingVar("SUPABASE_URL".to_string()));
            }
            if supabase_anon_key.is_none() {
                return Err(ConfigError::MissingVar("SUPABASE_ANON_KEY".to_string()));
            }
        }

        let station = std::env::var("DEFAULT_STATION").unwrap_or_else(|_| "OMA".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            backend,
            supabase_url,
            supabase_anon_key,
            station,
            log_level,
        })
    }
}
