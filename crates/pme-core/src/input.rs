//! Business input: the raw JSON payload and its normalized form
//!
//! Normalization is permissive. Missing or garbage fields fall back to
//! sector defaults or zero and every fallback is recorded in the trace.
//! Steps run in a fixed order because later ones read earlier results.

#![allow(clippy::cast_precision_loss)]

use crate::error::InputError;
use crate::number::{coerce_number, is_truthy, non_negative};
use crate::percent::PercentLike;
use crate::thresholds;
use crate::trace::CalcTrace;
use crate::types::Sector;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Payload as received. Every field is optional and untyped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBusinessInput {
    /// Sector name
    pub setor: Option<Value>,
    /// Monthly revenue
    pub receita_mensal: Option<Value>,
    /// Direct (variable) cost, fraction or percentage
    pub custo_direto_pct: Option<Value>,
    /// Monthly fixed expenses, absolute or percentage of revenue
    pub despesas_fixas: Option<Value>,
    /// Cash on hand
    pub caixa: Option<Value>,
    /// Active customers
    pub clientes_ativos: Option<Value>,
    /// Average ticket
    pub ticket_medio: Option<Value>,
    /// Monthly churn, fraction or percentage
    pub churn_pct: Option<Value>,
    /// Customer acquisition cost
    pub cac: Option<Value>,
    /// Return the calculation trace in the response
    pub debug: Option<Value>,
}

impl RawBusinessInput {
    /// Parse a request body.
    ///
    /// # Errors
    ///
    /// [`InputError::Malformed`] if the body is not JSON,
    /// [`InputError::NotAnObject`] if it is JSON but not an object.
    pub fn from_json(body: &[u8]) -> Result<Self, InputError> {
        let value: Value = serde_json::from_slice(body)?;
        let kind = match &value {
            Value::Object(_) => return Ok(serde_json::from_value(value)?),
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
        };
        Err(InputError::NotAnObject(kind))
    }

    /// Whether the caller asked for the calculation trace
    #[must_use]
    pub fn debug_enabled(&self) -> bool {
        is_truthy(self.debug.as_ref())
    }

    fn sector(&self) -> Sector {
        match self.setor.as_ref() {
            Some(Value::String(name)) if !name.is_empty() => Sector::parse(name).unwrap_or_else(|| {
                tracing::debug!("Unrecognized sector {:?}, falling back to varejo", name);
                Sector::default()
            }),
            _ => Sector::default(),
        }
    }
}

/// Normalized input. Every field holds a usable, non-negative value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessInput {
    /// Sector
    pub sector: Sector,
    /// Monthly revenue
    pub revenue: f64,
    /// Direct-cost ratio in `[0, 0.999999]`
    pub direct_cost_ratio: f64,
    /// Monthly fixed expenses
    pub fixed_expenses: f64,
    /// Cash on hand
    pub cash: f64,
    /// Active customers
    pub active_customers: u64,
    /// Average ticket, estimated from revenue when missing
    pub average_ticket: f64,
    /// Monthly churn fraction; only set for recurring revenue
    pub churn: Option<f64>,
    /// Customer acquisition cost
    pub cac: f64,
}

impl BusinessInput {
    /// Normalize a raw payload, recording every default in `trace`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn normalize(raw: &RawBusinessInput, trace: &mut CalcTrace) -> Self {
        trace.record("payload_recebido");

        let sector = raw.sector();
        let revenue = non_negative(raw.receita_mensal.as_ref());
        trace.record_with(
            "inputs_basicos_normalizados",
            json!({ "setor": sector, "receita": revenue }),
        );

        let direct_cost_ratio = match raw
            .custo_direto_pct
            .as_ref()
            .and_then(PercentLike::from_value)
        {
            Some(pct) => pct.fraction(),
            None => {
                let ratio = sector.default_direct_cost_ratio();
                trace.record_with("custo_direto_default_setor", json!({ "custoDiretoPct": ratio }));
                ratio
            }
        };

        let fixed_expenses = Self::fixed_expenses(raw, sector, revenue, trace);

        let cash = non_negative(raw.caixa.as_ref());
        let active_customers = non_negative(raw.clientes_ativos.as_ref()).floor() as u64;
        let mut average_ticket = non_negative(raw.ticket_medio.as_ref());

        let churn = if sector.is_recurring() {
            let parsed = raw
                .churn_pct
                .as_ref()
                .and_then(PercentLike::from_value)
                .map(PercentLike::fraction);
            Some(parsed.unwrap_or_else(|| {
                trace.record_with("churn_default", json!({ "churn": thresholds::DEFAULT_CHURN }));
                thresholds::DEFAULT_CHURN
            }))
        } else {
            None
        };

        let cac = non_negative(raw.cac.as_ref());

        if average_ticket == 0.0 && active_customers > 0 {
            average_ticket = revenue / active_customers as f64;
            trace.record_with(
                "ticket_estimado_por_receita_clientes",
                json!({ "ticketMedio": average_ticket }),
            );
        }

        let input = Self {
            sector,
            revenue,
            direct_cost_ratio,
            fixed_expenses,
            cash,
            active_customers,
            average_ticket,
            churn,
            cac,
        };
        tracing::debug!(?input, "Normalized business input");
        input
    }

    /// A positive number is absolute. Zero, negative or non-numeric values
    /// go through the percentage parser and scale revenue. Anything else
    /// falls back to the sector's share of revenue.
    fn fixed_expenses(
        raw: &RawBusinessInput,
        sector: Sector,
        revenue: f64,
        trace: &mut CalcTrace,
    ) -> f64 {
        let supplied = raw.despesas_fixas.as_ref();
        let absolute = supplied.and_then(coerce_number).unwrap_or(0.0);
        if absolute > 0.0 {
            return absolute;
        }

        let estimated = match supplied.and_then(PercentLike::from_value) {
            Some(pct) => revenue * pct.fraction(),
            None => (revenue * sector.default_fixed_expense_ratio()).max(0.0),
        };
        trace.record_with("despesas_fixas_estimadas", json!({ "fixos": estimated }));
        estimated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(payload: Value) -> (BusinessInput, CalcTrace) {
        let raw: RawBusinessInput = serde_json::from_value(payload).unwrap();
        let mut trace = CalcTrace::new();
        let input = BusinessInput::normalize(&raw, &mut trace);
        (input, trace)
    }

    #[test]
    fn from_json_distinguishes_malformed_and_non_object() {
        assert!(matches!(
            RawBusinessInput::from_json(b"{not json"),
            Err(InputError::Malformed(_))
        ));
        assert!(matches!(
            RawBusinessInput::from_json(b"[1, 2]"),
            Err(InputError::NotAnObject("array"))
        ));
        assert!(matches!(
            RawBusinessInput::from_json(b"null"),
            Err(InputError::NotAnObject("null"))
        ));
        let raw = RawBusinessInput::from_json(br#"{"setor":"servicos","extra":1}"#).unwrap();
        assert_eq!(raw.setor, Some(json!("servicos")));
    }

    #[test]
    fn empty_payload_defaults_to_retail_zeroes() {
        let (input, trace) = normalize(json!({}));
        assert_eq!(input.sector, Sector::Varejo);
        assert_eq!(input.revenue, 0.0);
        assert_eq!(input.direct_cost_ratio, 0.62);
        assert_eq!(input.fixed_expenses, 0.0);
        assert_eq!(input.churn, None);
        assert!(trace.contains("custo_direto_default_setor"));
        assert!(trace.contains("despesas_fixas_estimadas"));
    }

    #[test]
    fn unknown_or_non_string_sector_falls_back_to_retail() {
        assert_eq!(normalize(json!({ "setor": "industria" })).0.sector, Sector::Varejo);
        assert_eq!(normalize(json!({ "setor": 7 })).0.sector, Sector::Varejo);
        assert_eq!(normalize(json!({ "setor": " Servicos " })).0.sector, Sector::Servicos);
    }

    #[test]
    fn fixed_expenses_rules() {
        let absolute = normalize(json!({ "receita_mensal": 10000, "despesas_fixas": 2500 })).0;
        assert_eq!(absolute.fixed_expenses, 2500.0);

        let percent = normalize(json!({ "receita_mensal": 10000, "despesas_fixas": "30%" })).0;
        assert!((percent.fixed_expenses - 3000.0).abs() < 1e-9);

        let zero = normalize(json!({ "receita_mensal": 10000, "despesas_fixas": 0 })).0;
        assert_eq!(zero.fixed_expenses, 0.0);

        let garbage = normalize(json!({ "receita_mensal": 10000, "despesas_fixas": "n/a" })).0;
        assert_eq!(garbage.fixed_expenses, 3000.0);

        let services = normalize(json!({ "setor": "servicos", "receita_mensal": 10000 })).0;
        assert!((services.fixed_expenses - 3500.0).abs() < 1e-9);
    }

    #[test]
    fn churn_only_kept_for_recurring() {
        let (recurring, trace) = normalize(json!({ "setor": "recorrencia" }));
        assert_eq!(recurring.churn, Some(0.05));
        assert!(trace.contains("churn_default"));

        let supplied = normalize(json!({ "setor": "recorrencia", "churn_pct": 8 })).0;
        assert_eq!(supplied.churn, Some(0.08));

        let retail = normalize(json!({ "setor": "varejo", "churn_pct": 8 })).0;
        assert_eq!(retail.churn, None);
    }

    #[test]
    fn ticket_is_estimated_from_revenue_per_customer() {
        let (input, trace) = normalize(json!({ "receita_mensal": 5000, "clientes_ativos": 100.9 }));
        assert_eq!(input.active_customers, 100);
        assert_eq!(input.average_ticket, 50.0);
        assert!(trace.contains("ticket_estimado_por_receita_clientes"));

        let given = normalize(json!({ "receita_mensal": 5000, "clientes_ativos": 100, "ticket_medio": 80 })).0;
        assert_eq!(given.average_ticket, 80.0);
    }

    #[test]
    fn debug_flag_uses_truthiness() {
        let raw: RawBusinessInput = serde_json::from_value(json!({ "debug": 1 })).unwrap();
        assert!(raw.debug_enabled());
        assert!(!RawBusinessInput::default().debug_enabled());
    }
}
