//! Core types shared by the calculator and the benchmark lookup

use crate::thresholds;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Business sector. Each one carries its own cost defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    /// Retail (`varejo`)
    #[default]
    Varejo,
    /// Services (`servicos`)
    Servicos,
    /// Recurring revenue / subscriptions (`recorrencia`)
    Recorrencia,
}

impl Sector {
    /// All recognized sectors
    pub const ALL: [Sector; 3] = [Sector::Varejo, Sector::Servicos, Sector::Recorrencia];

    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Varejo => "varejo",
            Sector::Servicos => "servicos",
            Sector::Recorrencia => "recorrencia",
        }
    }

    /// Parse a caller-supplied name: trimmed, case-insensitive
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    /// Whether LTV/CAC and churn apply
    #[inline]
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        matches!(self, Sector::Recorrencia)
    }

    /// Direct-cost ratio used when the caller gives none
    #[must_use]
    pub fn default_direct_cost_ratio(&self) -> f64 {
        match self {
            Sector::Varejo => thresholds::RETAIL_DIRECT_COST,
            Sector::Servicos => thresholds::SERVICES_DIRECT_COST,
            Sector::Recorrencia => thresholds::RECURRING_DIRECT_COST,
        }
    }

    /// Fixed expenses as a share of revenue when the caller gives none
    #[must_use]
    pub fn default_fixed_expense_ratio(&self) -> f64 {
        match self {
            Sector::Servicos => thresholds::SERVICES_FIXED_EXPENSE_RATIO,
            Sector::Varejo | Sector::Recorrencia => thresholds::DEFAULT_FIXED_EXPENSE_RATIO,
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traffic-light severity of an indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// On track
    #[serde(rename = "verde")]
    Green,
    /// Watch
    #[serde(rename = "amarelo")]
    Yellow,
    /// At risk
    #[serde(rename = "vermelho")]
    Red,
}
