//! Server configuration
//!
//! Values come from the environment first, then command-line flags
//! override them in `main`.

use crate::error::ConfigError;
use pme_core::{BenchmarkCatalog, BenchmarkError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable holding the shared API key.
pub const ENV_API_KEY: &str = "API_KEY";
/// Environment variable holding the bind address.
pub const ENV_BIND: &str = "PME_BIND";
/// Environment variable holding the benchmark dataset path.
pub const ENV_BENCHMARKS: &str = "PME_BENCHMARKS";
/// Environment variable holding the request body limit.
pub const ENV_MAX_BODY_BYTES: &str = "PME_MAX_BODY_BYTES";
/// Environment variable selecting the log format.
pub const ENV_LOG_FORMAT: &str = "PME_LOG_FORMAT";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind_addr: SocketAddr,
    /// Shared secret expected in `x-api-key`; `None` rejects every diagnostic
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// JSON benchmark dataset; `None` serves an empty catalog
    pub benchmarks_path: Option<PathBuf>,
    /// Largest accepted request body
    pub max_body_bytes: usize,
    /// Log output format
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidVar`] if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// Unset and blank variables keep their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidVar`] if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(key) = get(ENV_API_KEY) {
            config.api_key = Some(key);
        }
        if let Some(addr) = get(ENV_BIND) {
            config.bind_addr = parse_var(ENV_BIND, &addr)?;
        }
        if let Some(path) = get(ENV_BENCHMARKS) {
            config.benchmarks_path = Some(PathBuf::from(path));
        }
        if let Some(limit) = get(ENV_MAX_BODY_BYTES) {
            config.max_body_bytes = parse_var(ENV_MAX_BODY_BYTES, &limit)?;
        }
        if let Some(format) = get(ENV_LOG_FORMAT) {
            config.log_format = parse_var(ENV_LOG_FORMAT, &format)?;
        }
        Ok(config)
    }

    /// With bind address
    #[inline]
    #[must_use]
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// With API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// With benchmark dataset path
    #[inline]
    #[must_use]
    pub fn with_benchmarks_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.benchmarks_path = Some(path.into());
        self
    }

    /// With request body limit
    #[inline]
    #[must_use]
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// With log format
    #[inline]
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Load the configured benchmark dataset, or an empty one.
    ///
    /// # Errors
    ///
    /// Propagates read and parse failures of the dataset file.
    pub fn load_benchmarks(&self) -> Result<BenchmarkCatalog, BenchmarkError> {
        match &self.benchmarks_path {
            Some(path) => BenchmarkCatalog::from_path(path),
            None => Ok(BenchmarkCatalog::empty()),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            api_key: None,
            benchmarks_path: None,
            max_body_bytes: 64 * 1024,
            log_format: LogFormat::Text,
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidVar {
        name,
        value: value.to_string(),
    })
}
