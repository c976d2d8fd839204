//! Testing utilities for the PME workspace
//!
//! Shared payload fixtures and benchmark datasets.

#![allow(missing_docs)]

use pme_core::{BenchmarkCatalog, BenchmarkEntry, Sector};
use serde_json::{json, Value};

/// API key used by server tests.
pub const TEST_API_KEY: &str = "test-key";

pub fn benchmark_entry(sector: Sector, pais: &str, tipo: &str, range: (f64, f64), median: f64) -> BenchmarkEntry {
    BenchmarkEntry {
        setor: sector,
        pais: Some(pais.to_string()),
        tipo: Some(tipo.to_string()),
        period: Some("2019-2024".to_string()),
        range_min: Some(range.0),
        range_max: Some(range.1),
        median: Some(median),
        available: true,
        source: Some(format!("Fixture {sector} {pais} {tipo}")),
    }
}

/// Two retail gross-margin ranges (BR, US) and one services EBITDA range.
pub fn sample_catalog() -> BenchmarkCatalog {
    BenchmarkCatalog::new(vec![
        benchmark_entry(Sector::Varejo, "BR", "margem_bruta", (35.0, 52.0), 43.0),
        benchmark_entry(Sector::Varejo, "US", "margem_bruta", (30.0, 48.0), 40.0),
        benchmark_entry(Sector::Servicos, "BR", "ebitda", (10.0, 22.0), 15.0),
    ])
}

/// Retail business with revenue only.
pub fn retail_payload() -> Value {
    json!({ "setor": "varejo", "receita_mensal": 10000 })
}

/// Subscription business with customers and CAC, churn left to default.
pub fn recurring_payload() -> Value {
    json!({
        "setor": "recorrencia",
        "receita_mensal": 5000,
        "clientes_ativos": 100,
        "cac": 50
    })
}

/// Services business burning cash with a short runway.
pub fn burning_payload() -> Value {
    json!({
        "setor": "servicos",
        "receita_mensal": 10000,
        "despesas_fixas": 8000,
        "caixa": 2000
    })
}

/// Merge `extra` fields into `payload`.
pub fn with_fields(mut payload: Value, extra: Value) -> Value {
    if let (Some(target), Value::Object(extra)) = (payload.as_object_mut(), extra) {
        target.extend(extra);
    }
    payload
}
