//! Server configuration from environment variables.
//!
//!   UDYAM_BIND_ADDR          - listen address (default: 0.0.0.0:4000)
//!   PORT                     - port only, used when UDYAM_BIND_ADDR is unset
//!   UDYAM_SCHEMA_PATH        - schema artifact path, or `builtin`
//!                              (default: shared/schemas/udyam-steps.json)
//!   DATABASE_URL             - Postgres connection string (optional; in-memory store when unset)
//!   UDYAM_DB_MAX_CONNECTIONS - pool size (default: 5)
//!   UDYAM_RUN_MIGRATIONS     - apply bundled migrations at startup (default: true)

use std::net::SocketAddr;

use thiserror::Error;
use udyam_core::SchemaSource;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub schema_source: SchemaSource,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub run_migrations: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            schema_source: SchemaSource::default(),
            database_url: None,
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            run_migrations: true,
        }
    }
}

impl ServerConfig {
    /// Read the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = get("UDYAM_BIND_ADDR") {
            config.bind_addr = parse("UDYAM_BIND_ADDR", &addr)?;
        } else if let Some(port) = get("PORT") {
            config.bind_addr.set_port(parse("PORT", &port)?);
        }

        if let Some(path) = get("UDYAM_SCHEMA_PATH") {
            config.schema_source = SchemaSource::parse(&path);
        }

        config.database_url = get("DATABASE_URL");

        if let Some(max) = get("UDYAM_DB_MAX_CONNECTIONS") {
            config.db_max_connections = parse("UDYAM_DB_MAX_CONNECTIONS", &max)?;
            if config.db_max_connections == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "UDYAM_DB_MAX_CONNECTIONS",
                    value: max,
                    reason: "must be at least 1".into(),
                });
            }
        }

        if let Some(flag) = get("UDYAM_RUN_MIGRATIONS") {
            config.run_migrations = parse_bool("UDYAM_RUN_MIGRATIONS", &flag)?;
        }

        Ok(config)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected a boolean".into(),
        }),
    }
}
