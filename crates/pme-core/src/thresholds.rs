//! Fixed defaults and cut-offs used by normalization and scoring.
//!
//! Changing a value here moves both the score and the traffic-light
//! indicators, since they share the same cut-offs.

/// Default direct-cost ratio for retail.
pub const RETAIL_DIRECT_COST: f64 = 0.62;

/// Default direct-cost ratio for services.
pub const SERVICES_DIRECT_COST: f64 = 0.30;

/// Default direct-cost ratio for recurring revenue.
pub const RECURRING_DIRECT_COST: f64 = 0.22;

/// Fixed expenses as a share of revenue when nothing usable was supplied.
pub const DEFAULT_FIXED_EXPENSE_RATIO: f64 = 0.30;

/// Services carry heavier fixed structure.
pub const SERVICES_FIXED_EXPENSE_RATIO: f64 = 0.35;

/// Monthly churn assumed for recurring revenue when none was supplied.
pub const DEFAULT_CHURN: f64 = 0.05;

/// Lower bound applied to churn before dividing by it.
pub const CHURN_FLOOR: f64 = 0.0001;

/// Score every diagnostic starts from.
pub const BASE_SCORE: i32 = 50;

/// Runway at or above this many months counts as comfortable.
pub const COMFORTABLE_RUNWAY_MONTHS: f64 = 9.0;

/// Runway below this many months counts as tight.
pub const TIGHT_RUNWAY_MONTHS: f64 = 6.0;

/// LTV/CAC at or above this is healthy unit economics.
pub const HEALTHY_LTV_CAC: f64 = 3.0;

/// LTV/CAC below this loses money on every customer.
pub const LOSING_LTV_CAC: f64 = 1.0;

/// Contribution margin ratio at or above this is green.
pub const HEALTHY_MARGIN: f64 = 0.45;

/// Contribution margin ratio below this is red and flagged as low.
pub const LOW_MARGIN: f64 = 0.35;

/// Churn at or below this keeps the customer indicator green.
pub const HEALTHY_CHURN: f64 = 0.05;

/// Churn above this raises the high-churn flag.
pub const HIGH_CHURN: f64 = 0.06;
