//! PME Server - HTTP surface for the diagnostic calculator
//!
//! Two endpoints:
//! - `GET /api/benchmarks?setor=&pais=&tipo=` - curated sector ranges
//! - `POST /api/diagnostico` - financial health diagnostic (needs `x-api-key`)
//!
//! Handlers are thin: they check the verb and the key, parse the body and
//! hand over to [`pme_core`].

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::{LogFormat, ServerConfig};
pub use error::{ApiError, ConfigError};
pub use routes::routes;
pub use state::AppState;
