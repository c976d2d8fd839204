//! Shared, read-only state handed to every request

use crate::config::ServerConfig;
use crate::error::ApiError;
use pme_core::BenchmarkSource;
use std::sync::Arc;

/// Per-process state. Never mutated after startup.
#[derive(Clone)]
pub struct AppState {
    api_key: Option<String>,
    benchmarks: Arc<dyn BenchmarkSource>,
    max_body_bytes: usize,
}

impl AppState {
    /// Build state from configuration and a loaded benchmark dataset
    #[must_use]
    pub fn new(config: &ServerConfig, benchmarks: Arc<dyn BenchmarkSource>) -> Self {
        Self {
            api_key: config.api_key.clone(),
            benchmarks,
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Benchmark dataset
    #[must_use]
    pub fn benchmarks(&self) -> &dyn BenchmarkSource {
        self.benchmarks.as_ref()
    }

    /// Largest accepted request body
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Check a presented `x-api-key`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] if the key is missing, wrong, or no key
    /// is configured at all.
    pub fn authorize(&self, presented: Option<&str>) -> Result<(), ApiError> {
        match (self.api_key.as_deref(), presented) {
            (Some(expected), Some(key)) if !key.is_empty() && key == expected => Ok(()),
            _ => Err(ApiError::Unauthorized),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("benchmarks", &self.benchmarks.entries().len())
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pme_core::BenchmarkCatalog;

    fn state(key: Option<&str>) -> AppState {
        let mut config = ServerConfig::new();
        config.api_key = key.map(str::to_string);
        AppState::new(&config, Arc::new(BenchmarkCatalog::empty()))
    }

    #[test]
    fn authorize_requires_matching_key() {
        let state = state(Some("secret"));
        assert!(state.authorize(Some("secret")).is_ok());
        assert!(state.authorize(Some("wrong")).is_err());
        assert!(state.authorize(None).is_err());
    }

    #[test]
    fn no_configured_key_rejects_everything() {
        let state = state(None);
        assert!(state.authorize(Some("anything")).is_err());
        assert!(state.authorize(Some("")).is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", state(Some("secret")));
        assert!(!rendered.contains("secret"));
    }
}
