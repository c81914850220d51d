//! Textbook valuation models: Dividend Discount Model and a finite-horizon
//! Discounted Cash Flow with terminal value.
//!
//! Both are pure functions of the company profile plus the assumption rates
//! from [`ValuationConfig`]. Each is guarded by an applicability check and
//! reports a typed skip reason instead of producing a nonsense figure.

use crate::config::ValuationConfig;
use crate::models::CompanyProfile;
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// Why a model could not be applied to this company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// No dividend in the metadata, or dividend <= 0
    MissingDividend,
    /// Cost of equity does not exceed the dividend growth rate
    RateOrderingInvalid,
    /// No free cash flow in the metadata, or fcf <= 0
    MissingFreeCashFlow,
    /// Shares outstanding absent or non-positive
    MissingSharesOutstanding,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SkipReason::MissingDividend => "missing dividend",
            SkipReason::RateOrderingInvalid => "invalid growth/discount rates",
            SkipReason::MissingFreeCashFlow => "missing or invalid free cash flow data",
            SkipReason::MissingSharesOutstanding => "missing shares outstanding",
        };
        f.write_str(msg)
    }
}

/// Result of one valuation model: a per-share figure, or inapplicable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ModelOutcome {
    Applicable { per_share: f64 },
    NotApplicable { reason: SkipReason },
}

impl ModelOutcome {
    pub fn per_share(&self) -> Option<f64> {
        match self {
            ModelOutcome::Applicable { per_share } => Some(*per_share),
            ModelOutcome::NotApplicable { .. } => None,
        }
    }
}

/// Both model outcomes for one company, reported independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub ddm: ModelOutcome,
    pub dcf: ModelOutcome,
}

// ── Models ────────────────────────────────────────────────────────────────────

/// Gordon growth DDM: `d*(1+g)/(r-g)`.
///
/// Applicable only for a positive dividend and `r > g`.
pub fn dividend_discount(dividend: Option<f64>, assumptions: &ValuationConfig) -> ModelOutcome {
    let d = match dividend {
        Some(d) if d > 0.0 => d,
        _ => {
            return ModelOutcome::NotApplicable {
                reason: SkipReason::MissingDividend,
            }
        }
    };

    let g = assumptions.ddm_growth;
    let r = assumptions.cost_of_equity;
    if r <= g {
        return ModelOutcome::NotApplicable {
            reason: SkipReason::RateOrderingInvalid,
        };
    }

    ModelOutcome::Applicable {
        per_share: d * (1.0 + g) / (r - g),
    }
}

/// Finite-horizon DCF: projected free cash flows discounted over
/// `projection_years`, plus a perpetuity-growth terminal value, divided by
/// shares outstanding.
///
/// Applicable only for positive free cash flow and positive shares
/// outstanding; absent shares report `MissingSharesOutstanding` instead of
/// defaulting the divisor.
pub fn discounted_cash_flow(
    free_cash_flow: Option<f64>,
    shares_outstanding: Option<f64>,
    assumptions: &ValuationConfig,
) -> ModelOutcome {
    let fcf = match free_cash_flow {
        Some(f) if f > 0.0 => f,
        _ => {
            return ModelOutcome::NotApplicable {
                reason: SkipReason::MissingFreeCashFlow,
            }
        }
    };

    let shares = match shares_outstanding {
        Some(s) if s > 0.0 => s,
        _ => {
            return ModelOutcome::NotApplicable {
                reason: SkipReason::MissingSharesOutstanding,
            }
        }
    };

    let gf = assumptions.fcf_growth;
    let r = assumptions.discount_rate;
    let gt = assumptions.terminal_growth;
    let n = assumptions.projection_years;

    let mut total = 0.0;
    for t in 1..=n {
        total += fcf * (1.0 + gf).powi(t as i32) / (1.0 + r).powi(t as i32);
    }

    let terminal = fcf * (1.0 + gf).powi(n as i32) * (1.0 + gt)
        / ((r - gt) * (1.0 + r).powi(n as i32));

    ModelOutcome::Applicable {
        per_share: (total + terminal) / shares,
    }
}

/// Evaluate both models against one company profile.
pub fn evaluate(profile: &CompanyProfile, assumptions: &ValuationConfig) -> ValuationSummary {
    ValuationSummary {
        ddm: dividend_discount(profile.dividend_rate, assumptions),
        dcf: discounted_cash_flow(
            profile.free_cash_flow,
            profile.shares_outstanding,
            assumptions,
        ),
    }
}
