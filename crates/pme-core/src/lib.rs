//! PME Core - financial health diagnostic for small businesses
//!
//! Pure, synchronous building blocks behind the two HTTP endpoints:
//! - Lenient input normalization with sector-specific defaults
//! - The diagnostic calculator (margins, breakeven, runway, LTV/CAC, score)
//! - The JSON report shape returned to callers
//! - Read-only sector benchmark lookup
//!
//! # Example
//!
//! ```rust
//! use pme_core::{diagnose, BusinessInput, CalcTrace, RawBusinessInput};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let raw = RawBusinessInput::from_json(br#"{"setor":"varejo","receita_mensal":10000}"#)?;
//! let mut trace = CalcTrace::new();
//! let input = BusinessInput::normalize(&raw, &mut trace);
//! let diagnostic = diagnose(&input, &mut trace)?;
//!
//! assert_eq!(diagnostic.score, 75);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(unreachable_pub)]

pub mod benchmarks;
pub mod diagnostic;
pub mod error;
pub mod input;
pub mod number;
pub mod percent;
pub mod report;
pub mod thresholds;
pub mod trace;
pub mod types;

pub use benchmarks::{
    BenchmarkCatalog, BenchmarkEntry, BenchmarkFilters, BenchmarkLookup, BenchmarkQuery,
    BenchmarkSource, BenchmarkSummary,
};
pub use diagnostic::{
    diagnose, BaseMetrics, Diagnostic, Indicators, RecurringMetrics, RiskFlags, Runway,
};
pub use error::{BenchmarkError, DiagnosticError, InputError};
pub use input::{BusinessInput, RawBusinessInput};
pub use percent::PercentLike;
pub use report::DiagnosticReport;
pub use trace::{CalcTrace, TraceEntry};
pub use types::{Sector, Severity};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
