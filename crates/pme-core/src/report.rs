//! JSON body returned by the diagnostic endpoint.
//!
//! Field names are the public contract consumed by existing clients, so
//! they stay in Portuguese. Values are rounded here and nowhere else.

#![allow(missing_docs)]

use crate::diagnostic::{Diagnostic, Indicators, RiskFlags, Runway};
use crate::number::round_to;
use crate::trace::{CalcTrace, TraceEntry};
use crate::types::{Sector, Severity};
use serde::Serialize;

/// Diagnostic response body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticReport {
    /// Sector
    pub setor: Sector,
    /// Inputs after normalization
    pub inputs_normalizados: NormalizedInputs,
    /// Health score
    pub score: u8,
    /// Traffic lights
    pub semaforos: Semaforos,
    /// Headline metrics
    pub metricas: Metricas,
    /// Risk flags
    pub etapa2_flags: Flags,
    /// Recommended actions
    pub acoes_iniciais: Vec<String>,
    /// Intermediate values
    pub calc_steps: CalcSteps,
    /// Calculation trace, debug mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<TraceEntry>>,
}

/// Normalized inputs; zero or unset optional fields are omitted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedInputs {
    pub receita_mensal: f64,
    pub custo_direto_pct: f64,
    pub despesas_fixas: f64,
    pub caixa: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clientes_ativos: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_medio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub churn_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cac: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Semaforos {
    pub receita: Severity,
    pub custos: Severity,
    pub caixa: Severity,
    pub clientes: Severity,
}

impl From<Indicators> for Semaforos {
    fn from(i: Indicators) -> Self {
        Self {
            receita: i.revenue,
            custos: i.costs,
            caixa: i.cash,
            clientes: i.customers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metricas {
    pub ponto_equilibrio: Option<f64>,
    pub margem_contrib_pct: f64,
    pub ebitda: f64,
    pub runway_meses: Runway,
    pub ltv: Option<f64>,
    pub ltv_cac: Option<f64>,
    pub payback_meses: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Flags {
    pub caixa_apertado: bool,
    pub margem_baixa: bool,
    pub ltv_cac_fraco: bool,
    pub churn_alto: bool,
}

impl From<RiskFlags> for Flags {
    fn from(f: RiskFlags) -> Self {
        Self {
            caixa_apertado: f.tight_cash,
            margem_baixa: f.low_margin,
            ltv_cac_fraco: f.weak_unit_economics,
            churn_alto: f.high_churn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalcSteps {
    pub mc_pct: f64,
    pub mc: f64,
    pub ebitda: f64,
    pub burn: f64,
    pub runway: Runway,
    pub recorrencia: Option<RecurringSteps>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecurringSteps {
    pub ticket_efetivo: f64,
    pub margem_cliente: f64,
    pub churn_safe: f64,
}

fn positive(x: f64) -> Option<f64> {
    (x > 0.0).then_some(x)
}

fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

impl DiagnosticReport {
    /// Build the response body. Pass the trace to include it under `logs`.
    #[must_use]
    pub fn new(diagnostic: &Diagnostic, trace: Option<&CalcTrace>) -> Self {
        let input = &diagnostic.input;
        let base = &diagnostic.base;
        let recurring = diagnostic.recurring.as_ref();

        let inputs_normalizados = NormalizedInputs {
            receita_mensal: input.revenue,
            custo_direto_pct: round_to(input.direct_cost_ratio, 4),
            despesas_fixas: round_to(input.fixed_expenses, 2),
            caixa: round_to(input.cash, 2),
            clientes_ativos: (input.active_customers > 0).then_some(input.active_customers),
            ticket_medio: positive(input.average_ticket).map(|t| round_to(t, 2)),
            churn_pct: input
                .sector
                .is_recurring()
                .then(|| round_to(input.churn.unwrap_or(0.0), 4)),
            cac: positive(input.cac),
        };

        let metricas = Metricas {
            ponto_equilibrio: base.breakeven.map(|b| round_to(b, 2)).and_then(finite),
            margem_contrib_pct: round_to(base.contribution_ratio, 4),
            ebitda: round_to(base.ebitda, 2),
            runway_meses: base.runway.map(|m| round_to(m, 1)),
            ltv: recurring.map(|r| round_to(r.ltv, 2)).and_then(finite),
            ltv_cac: recurring
                .and_then(|r| r.ltv_cac)
                .map(|v| round_to(v, 2))
                .and_then(finite),
            payback_meses: recurring
                .and_then(|r| r.payback_months)
                .map(|v| round_to(v, 1))
                .and_then(finite),
        };

        let calc_steps = CalcSteps {
            mc_pct: round_to(base.contribution_ratio, 4),
            mc: round_to(base.contribution_margin, 2),
            ebitda: round_to(base.ebitda, 2),
            burn: round_to(base.burn, 2),
            runway: base.runway.map(|m| round_to(m, 2)),
            recorrencia: recurring.map(|r| RecurringSteps {
                ticket_efetivo: round_to(r.effective_ticket, 2),
                margem_cliente: round_to(r.customer_contribution, 2),
                churn_safe: round_to(r.churn_floor, 4),
            }),
        };

        Self {
            setor: input.sector,
            inputs_normalizados,
            score: diagnostic.score,
            semaforos: diagnostic.indicators.into(),
            metricas,
            etapa2_flags: diagnostic.flags.into(),
            acoes_iniciais: diagnostic.actions.iter().map(|a| (*a).to_string()).collect(),
            calc_steps,
            logs: trace.map(|t| t.entries().to_vec()),
        }
    }
}
