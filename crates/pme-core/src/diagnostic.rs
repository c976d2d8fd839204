//! Diagnostic calculator
//!
//! Pure function from a normalized [`BusinessInput`] to a [`Diagnostic`]:
//! 1. Base metrics (contribution margin, EBITDA, breakeven, burn, runway)
//! 2. Unit economics for recurring revenue (LTV, LTV/CAC, payback)
//! 3. Score, traffic-light indicators, risk flags and recommended actions
//!
//! Identical inputs always produce identical diagnostics.

use crate::error::DiagnosticError;
use crate::input::BusinessInput;
use crate::thresholds;
use crate::trace::CalcTrace;
use crate::types::{Sector, Severity};
use serde::{Serialize, Serializer};
use serde_json::json;

/// Action recommended when runway is short.
pub const ACTION_TIGHT_CASH: &str = "Negociar prazos/aluguel e avaliar crédito de giro.";
/// Action recommended when contribution margin is low.
pub const ACTION_LOW_MARGIN: &str = "Teste de preço +8% e 3 cotações para insumo-chave.";
/// Action recommended when LTV/CAC is weak.
pub const ACTION_WEAK_UNIT_ECONOMICS: &str = "Onboarding/upsell para elevar LTV e reduzir payback.";
/// Action recommended when nothing is flagged.
pub const ACTION_MAINTAIN: &str = "Mantenha disciplina de CAC e revise preço/mix trimestralmente.";

/// Months of cash left at the current burn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Runway {
    /// Cash runs out after this many months
    Finite(f64),
    /// Not burning cash
    Infinite,
}

impl Runway {
    /// Literal used for [`Runway::Infinite`] on the wire.
    pub const INFINITE_MARKER: &'static str = "∞";

    /// Infinite, or finite and at least `months`
    #[must_use]
    pub fn at_least(self, months: f64) -> bool {
        self.is_infinite() || matches!(self, Runway::Finite(m) if m >= months)
    }

    /// Finite and strictly below `months`
    #[must_use]
    pub fn below(self, months: f64) -> bool {
        matches!(self, Runway::Finite(m) if m < months)
    }

    /// Whether cash never runs out
    #[inline]
    #[must_use]
    pub fn is_infinite(self) -> bool {
        matches!(self, Runway::Infinite)
    }

    /// Apply `f` to the finite month count
    #[must_use]
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Runway::Finite(m) => Runway::Finite(f(m)),
            Runway::Infinite => Runway::Infinite,
        }
    }
}

impl Serialize for Runway {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Runway::Finite(m) => serializer.serialize_f64(*m),
            Runway::Infinite => serializer.serialize_str(Self::INFINITE_MARKER),
        }
    }
}

/// Metrics computed for every sector
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaseMetrics {
    /// `1 - direct_cost_ratio`, floored at zero
    pub contribution_ratio: f64,
    /// Revenue times the contribution ratio
    pub contribution_margin: f64,
    /// Contribution margin minus fixed expenses
    pub ebitda: f64,
    /// Revenue at which EBITDA is zero; `None` when the ratio is zero
    pub breakeven: Option<f64>,
    /// Monthly cash consumption, `max(0, -ebitda)`
    pub burn: f64,
    /// Months of cash left
    pub runway: Runway,
}

/// Unit economics, only for [`Sector::Recorrencia`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecurringMetrics {
    /// Ticket used for per-customer contribution
    pub effective_ticket: f64,
    /// Monthly contribution per customer
    pub customer_contribution: f64,
    /// Churn after applying [`thresholds::CHURN_FLOOR`]
    pub churn_floor: f64,
    /// Lifetime value
    pub ltv: f64,
    /// `ltv / cac`; `None` without a CAC
    pub ltv_cac: Option<f64>,
    /// Months to recover CAC
    pub payback_months: Option<f64>,
}

/// Traffic-light indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Indicators {
    /// Revenue trend (not modeled, always yellow)
    pub revenue: Severity,
    /// Cost structure, from the contribution ratio
    pub costs: Severity,
    /// Cash position, from the runway
    pub cash: Severity,
    /// Customer retention, from churn (recurring only)
    pub customers: Severity,
}

/// Independent risk flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RiskFlags {
    /// Finite runway under six months
    pub tight_cash: bool,
    /// Contribution ratio under 0.35
    pub low_margin: bool,
    /// LTV/CAC known and under 3
    pub weak_unit_economics: bool,
    /// Recurring revenue with churn above 6%
    pub high_churn: bool,
}

impl RiskFlags {
    /// Recommended actions in fixed order. Never empty.
    ///
    /// `high_churn` has no action of its own.
    #[must_use]
    pub fn actions(&self) -> Vec<&'static str> {
        let mut actions = Vec::with_capacity(3);
        if self.tight_cash {
            actions.push(ACTION_TIGHT_CASH);
        }
        if self.low_margin {
            actions.push(ACTION_LOW_MARGIN);
        }
        if self.weak_unit_economics {
            actions.push(ACTION_WEAK_UNIT_ECONOMICS);
        }
        if actions.is_empty() {
            actions.push(ACTION_MAINTAIN);
        }
        actions
    }
}

/// Full diagnostic for one business
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Normalized input the diagnostic was computed from
    pub input: BusinessInput,
    /// Health score in `[0, 100]`
    pub score: u8,
    /// Traffic lights
    pub indicators: Indicators,
    /// Base metrics
    pub base: BaseMetrics,
    /// Unit economics, recurring revenue only
    pub recurring: Option<RecurringMetrics>,
    /// Risk flags
    pub flags: RiskFlags,
    /// Recommended actions
    pub actions: Vec<&'static str>,
}

impl Diagnostic {
    /// Sector of the diagnosed business
    #[inline]
    #[must_use]
    pub fn sector(&self) -> Sector {
        self.input.sector
    }

    /// LTV/CAC when computable
    #[must_use]
    pub fn ltv_cac(&self) -> Option<f64> {
        self.recurring.and_then(|r| r.ltv_cac)
    }
}

/// Compute the diagnostic for a normalized input.
///
/// # Errors
///
/// [`DiagnosticError::NotANumber`] if a metric is NaN. Overflow is not an
/// error: an unbounded runway is [`Runway::Infinite`] and other unbounded
/// metrics stay infinite, which the report renders as `null`.
pub fn diagnose(input: &BusinessInput, trace: &mut CalcTrace) -> Result<Diagnostic, DiagnosticError> {
    let base = base_metrics(input)?;
    trace.record_with(
        "calc_base",
        json!({
            "mc_pct": base.contribution_ratio,
            "mc": base.contribution_margin,
            "ebitda": base.ebitda,
            "breakeven": base.breakeven,
            "burn": base.burn,
            "runway": base.runway,
        }),
    );
    tracing::debug!(?base, "Computed base metrics");

    let recurring = if input.sector.is_recurring() {
        let metrics = recurring_metrics(input, &base)?;
        trace.record_with(
            "calc_recorrencia",
            json!({
                "ticketEfetivo": metrics.effective_ticket,
                "margemCliente": metrics.customer_contribution,
                "churnSafe": metrics.churn_floor,
                "ltv": metrics.ltv,
                "ltv_cac": metrics.ltv_cac,
                "payback": metrics.payback_months,
            }),
        );
        tracing::debug!(?metrics, "Computed recurring metrics");
        Some(metrics)
    } else {
        None
    };

    let ltv_cac = recurring.and_then(|r| r.ltv_cac);
    let score = score(&base, ltv_cac);
    let indicators = indicators(input, &base);
    let flags = risk_flags(input, &base, ltv_cac);
    let actions = flags.actions();

    Ok(Diagnostic {
        input: input.clone(),
        score,
        indicators,
        base,
        recurring,
        flags,
        actions,
    })
}

fn ensure_defined(metric: &'static str, value: f64) -> Result<f64, DiagnosticError> {
    if value.is_nan() {
        tracing::error!("Metric {} is not a number", metric);
        Err(DiagnosticError::NotANumber { metric })
    } else {
        Ok(value)
    }
}

fn base_metrics(input: &BusinessInput) -> Result<BaseMetrics, DiagnosticError> {
    let contribution_ratio = (1.0 - input.direct_cost_ratio).max(0.0);
    let contribution_margin = ensure_defined("mc", input.revenue * contribution_ratio)?;
    let ebitda = ensure_defined("ebitda", contribution_margin - input.fixed_expenses)?;
    let breakeven = if contribution_ratio > 0.0 {
        Some(ensure_defined("ponto_equilibrio", input.fixed_expenses / contribution_ratio)?)
    } else {
        None
    };
    let burn = (-ebitda).max(0.0);
    let runway = if burn > 0.0 {
        match ensure_defined("runway", input.cash / burn)? {
            months if months.is_finite() => Runway::Finite(months),
            _ => Runway::Infinite,
        }
    } else {
        Runway::Infinite
    };

    Ok(BaseMetrics {
        contribution_ratio,
        contribution_margin,
        ebitda,
        breakeven,
        burn,
        runway,
    })
}

#[allow(clippy::cast_precision_loss)]
fn recurring_metrics(
    input: &BusinessInput,
    base: &BaseMetrics,
) -> Result<RecurringMetrics, DiagnosticError> {
    let effective_ticket = if input.average_ticket > 0.0 {
        input.average_ticket
    } else if input.active_customers > 0 {
        input.revenue / input.active_customers as f64
    } else {
        0.0
    };
    let customer_contribution = effective_ticket * base.contribution_ratio;
    let churn_floor = input
        .churn
        .unwrap_or(thresholds::CHURN_FLOOR)
        .max(thresholds::CHURN_FLOOR);
    let ltv = ensure_defined("ltv", customer_contribution / churn_floor)?;
    let ltv_cac = if input.cac > 0.0 {
        Some(ensure_defined("ltv_cac", ltv / input.cac)?)
    } else {
        None
    };
    let payback_months = if customer_contribution > 0.0 && input.cac > 0.0 {
        Some(ensure_defined("payback_meses", input.cac / customer_contribution)?)
    } else {
        None
    };

    Ok(RecurringMetrics {
        effective_ticket,
        customer_contribution,
        churn_floor,
        ltv,
        ltv_cac,
        payback_months,
    })
}

fn score(base: &BaseMetrics, ltv_cac: Option<f64>) -> u8 {
    let mut score = thresholds::BASE_SCORE;

    score += if base.ebitda >= 0.0 { 10 } else { -10 };

    if base.runway.at_least(thresholds::COMFORTABLE_RUNWAY_MONTHS) {
        score += 15;
    } else if base.runway.below(thresholds::TIGHT_RUNWAY_MONTHS) {
        score -= 10;
    }

    if let Some(ratio) = ltv_cac {
        if ratio >= thresholds::HEALTHY_LTV_CAC {
            score += 15;
        } else if ratio < thresholds::LOSING_LTV_CAC {
            score -= 10;
        }
    }

    u8::try_from(score.clamp(0, 100)).unwrap_or(0)
}

fn indicators(input: &BusinessInput, base: &BaseMetrics) -> Indicators {
    let costs = if base.contribution_ratio >= thresholds::HEALTHY_MARGIN {
        Severity::Green
    } else if base.contribution_ratio >= thresholds::LOW_MARGIN {
        Severity::Yellow
    } else {
        Severity::Red
    };

    let cash = if base.runway.at_least(thresholds::COMFORTABLE_RUNWAY_MONTHS) {
        Severity::Green
    } else if base.runway.at_least(thresholds::TIGHT_RUNWAY_MONTHS) {
        Severity::Yellow
    } else {
        Severity::Red
    };

    let customers = if input.sector.is_recurring() {
        if input.churn.unwrap_or(0.0) <= thresholds::HEALTHY_CHURN {
            Severity::Green
        } else {
            Severity::Red
        }
    } else {
        Severity::Yellow
    };

    Indicators {
        revenue: Severity::Yellow,
        costs,
        cash,
        customers,
    }
}

fn risk_flags(input: &BusinessInput, base: &BaseMetrics, ltv_cac: Option<f64>) -> RiskFlags {
    RiskFlags {
        tight_cash: base.runway.below(thresholds::TIGHT_RUNWAY_MONTHS),
        low_margin: base.contribution_ratio < thresholds::LOW_MARGIN,
        weak_unit_economics: ltv_cac.is_some_and(|r| r < thresholds::HEALTHY_LTV_CAC),
        high_churn: input.sector.is_recurring()
            && input.churn.unwrap_or(0.0) > thresholds::HIGH_CHURN,
    }
}
