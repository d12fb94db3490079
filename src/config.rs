//! Process settings read from the environment.

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            other => Err(ConfigError::UnknownStore(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store: StoreKind,
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub body_limit: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build settings from a variable lookup; unset variables take their defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            store: var("BOOKS_STORE")
                .map(|s| s.parse::<StoreKind>())
                .transpose()?
                .unwrap_or(StoreKind::Postgres),
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost/books".into()),
            max_connections: parsed(&var, "BOOKS_DB_MAX_CONNECTIONS", 5)?,
            bind_addr: parsed(&var, "BOOKS_BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            body_limit: parsed(&var, "BOOKS_BODY_LIMIT", 64 * 1024)?,
        })
    }
}

fn parsed<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var: key, value: raw }),
    }
}
