//! Curated sector benchmarks
//!
//! The dataset is injected read-only through [`BenchmarkSource`]; lookups
//! filter by sector, country and metric type and aggregate the matching
//! ranges. An empty dataset is valid and answers every query with the
//! "no curated data" shape.

use crate::error::BenchmarkError;
use crate::types::Sector;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Message returned when `setor` is missing.
pub const MSG_MISSING_SECTOR: &str = "informe ?setor=";
/// Message returned when `setor` is not a known sector.
pub const MSG_INVALID_SECTOR: &str = "setor inválido";
/// Message returned when no entry matches the filters.
pub const MSG_NO_DATA: &str = "Sem dados curados neste endpoint. Use Web Browsing no GPT para buscar pares comparáveis e cite as fontes.";

/// One curated benchmark range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkEntry {
    /// Sector the range applies to
    pub setor: Sector,
    /// Country code, e.g. `BR`
    #[serde(default)]
    pub pais: Option<String>,
    /// Metric type: `margem_bruta`, `ebitda`, `liquida`, `contribuicao`
    #[serde(default)]
    pub tipo: Option<String>,
    /// Period label, e.g. `2019-2024`
    #[serde(default)]
    pub period: Option<String>,
    /// Lower bound, in percent
    #[serde(default)]
    pub range_min: Option<f64>,
    /// Upper bound, in percent
    #[serde(default)]
    pub range_max: Option<f64>,
    /// Median, in percent
    #[serde(default)]
    pub median: Option<f64>,
    /// Whether the range is published
    #[serde(default)]
    pub available: bool,
    /// Citation
    #[serde(default)]
    pub source: Option<String>,
}

/// Read-only provider of benchmark entries
pub trait BenchmarkSource: Send + Sync {
    /// All entries, in dataset order
    fn entries(&self) -> &[BenchmarkEntry];
}

/// In-memory benchmark dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkCatalog {
    entries: Vec<BenchmarkEntry>,
}

impl BenchmarkCatalog {
    /// Catalog with no curated data
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog over the given entries
    #[must_use]
    pub fn new(entries: Vec<BenchmarkEntry>) -> Self {
        Self { entries }
    }

    /// Parse a JSON array of entries.
    ///
    /// # Errors
    ///
    /// [`BenchmarkError::Parse`] if the text is not an array of entries.
    pub fn from_json_str(json: &str) -> Result<Self, BenchmarkError> {
        let entries: Vec<BenchmarkEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    /// Load a JSON dataset from disk.
    ///
    /// # Errors
    ///
    /// [`BenchmarkError::Io`] if the file cannot be read,
    /// [`BenchmarkError::Parse`] if its content is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BenchmarkError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| BenchmarkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        tracing::info!("Loaded {} benchmark entries from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BenchmarkSource for BenchmarkCatalog {
    fn entries(&self) -> &[BenchmarkEntry] {
        &self.entries
    }
}

/// Query string of the benchmark endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BenchmarkQuery {
    /// Sector name (required)
    pub setor: Option<String>,
    /// Country filter
    pub pais: Option<String>,
    /// Metric type filter
    pub tipo: Option<String>,
}

/// Filters echoed back in the response. Blank filters are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BenchmarkFilters {
    /// Upper-cased country
    pub pais: Option<String>,
    /// Lower-cased metric type
    pub tipo: Option<String>,
}

/// Aggregate over the matching entries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkSummary {
    /// Sector queried
    pub sector: Sector,
    /// Filters applied
    pub filters: BenchmarkFilters,
    /// Any matching entry is available
    pub available: bool,
    /// Period labels joined with `, `
    pub period: Option<String>,
    /// Lowest lower bound
    pub range_min: Option<f64>,
    /// Highest upper bound
    pub range_max: Option<f64>,
    /// Mean of medians, two decimals
    pub median: Option<f64>,
    /// Citations
    pub sources: Vec<String>,
}

/// Result of a benchmark lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BenchmarkLookup {
    /// Query rejected before searching (missing or unknown sector)
    Rejected {
        /// Always `false`
        available: bool,
        /// Human-readable reason
        message: &'static str,
    },
    /// Valid query with no matching entry
    NoData {
        /// Always `false`
        available: bool,
        /// Sector queried
        sector: Sector,
        /// Filters applied
        filters: BenchmarkFilters,
        /// Human-readable hint
        message: &'static str,
    },
    /// Aggregated ranges
    Found(BenchmarkSummary),
}

impl BenchmarkLookup {
    fn rejected(message: &'static str) -> Self {
        Self::Rejected {
            available: false,
            message,
        }
    }

    /// Whether curated data was found
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

fn normalized(value: Option<&str>, upper: bool) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    Some(if upper {
        value.to_uppercase()
    } else {
        value.to_lowercase()
    })
}

fn matches_filter(field: Option<&str>, filter: Option<&str>, upper: bool) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    let field = field.unwrap_or_default();
    if upper {
        field.to_uppercase() == filter
    } else {
        field.to_lowercase() == filter
    }
}

impl BenchmarkQuery {
    /// Run the query against `source`.
    #[must_use]
    pub fn lookup(&self, source: &dyn BenchmarkSource) -> BenchmarkLookup {
        let Some(name) = normalized(self.setor.as_deref(), false) else {
            return BenchmarkLookup::rejected(MSG_MISSING_SECTOR);
        };
        let Some(sector) = Sector::parse(&name) else {
            tracing::debug!("Benchmark lookup for unknown sector {:?}", name);
            return BenchmarkLookup::rejected(MSG_INVALID_SECTOR);
        };
        let filters = BenchmarkFilters {
            pais: normalized(self.pais.as_deref(), true),
            tipo: normalized(self.tipo.as_deref(), false),
        };

        let rows: Vec<&BenchmarkEntry> = source
            .entries()
            .iter()
            .filter(|e| e.setor == sector)
            .filter(|e| matches_filter(e.pais.as_deref(), filters.pais.as_deref(), true))
            .filter(|e| matches_filter(e.tipo.as_deref(), filters.tipo.as_deref(), false))
            .collect();

        tracing::debug!("Benchmark lookup {} matched {} entries", sector, rows.len());

        if rows.is_empty() {
            return BenchmarkLookup::NoData {
                available: false,
                sector,
                filters,
                message: MSG_NO_DATA,
            };
        }

        BenchmarkLookup::Found(summarize(sector, filters, &rows))
    }
}

#[allow(clippy::cast_precision_loss)]
fn summarize(sector: Sector, filters: BenchmarkFilters, rows: &[&BenchmarkEntry]) -> BenchmarkSummary {
    let finite = |f: fn(&BenchmarkEntry) -> Option<f64>| -> Vec<f64> {
        rows.iter().filter_map(|&r| f(r)).filter(|n| n.is_finite()).collect()
    };
    let mins = finite(|r| r.range_min);
    let maxs = finite(|r| r.range_max);
    let medians = finite(|r| r.median);

    let periods: Vec<&str> = rows
        .iter()
        .filter_map(|r| r.period.as_deref())
        .filter(|p| !p.is_empty())
        .collect();

    BenchmarkSummary {
        sector,
        filters,
        available: rows.iter().any(|r| r.available),
        period: (!periods.is_empty()).then(|| periods.join(", ")),
        range_min: mins.iter().copied().reduce(f64::min),
        range_max: maxs.iter().copied().reduce(f64::max),
        median: (!medians.is_empty())
            .then(|| round_cents(medians.iter().sum::<f64>() / medians.len() as f64)),
        sources: rows
            .iter()
            .filter_map(|r| r.source.clone())
            .filter(|s| !s.is_empty())
            .collect(),
    }
}

/// Half-up to two decimals on the raw value, without the epsilon nudge of
/// [`crate::number::round_to`].
fn round_cents(x: f64) -> f64 {
    (x * 100.0 + 0.5).floor() / 100.0
}
