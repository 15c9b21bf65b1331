//! Environment-derived configuration and the per-call operation context.
//!
//! # Responsibility
//! - Resolve remote base address, local store location, server port and
//!   logging settings from `MAPP_*` environment variables.
//! - Provide `OperationContext`, the endpoint bundle every backend call takes.
//!
//! # Invariants
//! - Missing or unparsable values fall back to documented defaults.
//! - Relative store files resolve under `data/`.

use std::path::{Path, PathBuf};

pub const CLIENT_HOST_ENV: &str = "MAPP_CLIENT_HOST";
pub const DB_FILE_ENV: &str = "MAPP_DB_FILE";
pub const SERVER_PORT_ENV: &str = "MAPP_SERVER_PORT";
pub const LOG_LEVEL_ENV: &str = "MAPP_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "MAPP_LOG_DIR";

pub const DEFAULT_CLIENT_HOST: &str = "http://localhost:5005";
pub const DEFAULT_DB_FILE: &str = "db.sqlite3";
pub const DEFAULT_SERVER_PORT: u16 = 5005;

const DATA_DIR: &str = "data";
const MEMORY_LOCATION: &str = ":memory:";

/// Where the local backend keeps its rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

impl StoreLocation {
    /// Parses a configured store location; relative files live under `data/`.
    pub fn resolve(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == MEMORY_LOCATION {
            return Self::Memory;
        }
        let path = Path::new(trimmed);
        if path.is_absolute() {
            Self::File(path.to_path_buf())
        } else {
            Self::File(Path::new(DATA_DIR).join(path))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Memory => MEMORY_LOCATION.to_string(),
        }
    }
}

/// External endpoints available to a record operation.
///
/// Owned by the caller and passed by reference; backends never mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    /// Base address of the remote CRUD service, without trailing slash.
    pub client_host: String,
    pub store: StoreLocation,
}

impl OperationContext {
    pub fn new(client_host: impl Into<String>, store: StoreLocation) -> Self {
        let client_host = client_host.into();
        Self {
            client_host: client_host.trim_end_matches('/').to_string(),
            store,
        }
    }

    /// Context backed by a private in-memory store.
    pub fn in_memory() -> Self {
        Self::new(DEFAULT_CLIENT_HOST, StoreLocation::Memory)
    }
}

/// Process-level configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub context: OperationContext,
    pub server_port: u16,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, treating empty values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let client_host = get(CLIENT_HOST_ENV).unwrap_or_else(|| DEFAULT_CLIENT_HOST.to_string());
        let db_file = get(DB_FILE_ENV).unwrap_or_else(|| DEFAULT_DB_FILE.to_string());
        let server_port = get(SERVER_PORT_ENV)
            .and_then(|value| parse_port(&value))
            .unwrap_or(DEFAULT_SERVER_PORT);

        Self {
            context: OperationContext::new(client_host, StoreLocation::resolve(&db_file)),
            server_port,
            log_level: get(LOG_LEVEL_ENV),
            log_dir: get(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}

/// Accepts ports in `1..=65535`.
pub fn parse_port(value: &str) -> Option<u16> {
    value.trim().parse::<u16>().ok().filter(|port| *port != 0)
}

#[cfg(test)]
mod tests {
    use super::{
        parse_port, AppConfig, OperationContext, StoreLocation, DEFAULT_CLIENT_HOST,
        DEFAULT_SERVER_PORT,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_from(&[]);
        assert_eq!(config.context.client_host, DEFAULT_CLIENT_HOST);
        assert_eq!(
            config.context.store,
            StoreLocation::File(PathBuf::from("data").join("db.sqlite3"))
        );
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert!(config.log_level.is_none());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn overrides_are_read_and_bad_port_falls_back() {
        let config = config_from(&[
            ("MAPP_CLIENT_HOST", "http://remote:9000/"),
            ("MAPP_DB_FILE", ":memory:"),
            ("MAPP_SERVER_PORT", "not-a-port"),
            ("MAPP_LOG_LEVEL", "warn"),
        ]);
        assert_eq!(config.context.client_host, "http://remote:9000");
        assert_eq!(config.context.store, StoreLocation::Memory);
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(config.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn absolute_store_paths_are_kept() {
        let absolute = std::env::temp_dir().join("mapp.sqlite3");
        let location = StoreLocation::resolve(absolute.to_str().unwrap());
        assert_eq!(location, StoreLocation::File(absolute));
    }

    #[test]
    fn port_range_is_enforced() {
        assert_eq!(parse_port("8080"), Some(8080));
        assert_eq!(parse_port("0"), None);
        assert_eq!(parse_port("65536"), None);
        assert_eq!(parse_port("-1"), None);
    }

    #[test]
    fn in_memory_context_uses_default_host() {
        let ctx = OperationContext::in_memory();
        assert_eq!(ctx.store, StoreLocation::Memory);
        assert_eq!(ctx.client_host, DEFAULT_CLIENT_HOST);
    }
}
