//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable holding the listen address.
pub const ADDR_VAR: &str = "SUBWAY_ADDR";

/// Environment variable holding the snapshot file path.
pub const SNAPSHOT_VAR: &str = "SUBWAY_SNAPSHOT";

/// Error returned when a configuration value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}: {message}")]
pub struct ConfigError {
    var: &'static str,
    message: String,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub addr: SocketAddr,

    /// Where to keep the directory snapshot.
    /// `None` keeps everything in memory.
    pub snapshot_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from a variable lookup.
    ///
    /// Unset or empty variables fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = lookup(ADDR_VAR).filter(|v| !v.trim().is_empty()) {
            config.addr = addr.trim().parse().map_err(|e| ConfigError {
                var: ADDR_VAR,
                message: format!("{e}: {addr}"),
            })?;
        }

        if let Some(path) = lookup(SNAPSHOT_VAR).filter(|v| !v.trim().is_empty()) {
            config.snapshot_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            snapshot_path: None,
        }
    }
}
