use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Price history ─────────────────────────────────────────────────────────────

/// One daily observation: date and closing price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// One year of daily closes for a single symbol, in provider order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceHistory {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceHistory {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Last close in the series, shown as the report's current price.
    pub fn latest_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }

    /// Inclusive (first, last) dates of the series.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) => Some((a.date, b.date)),
            _ => None,
        }
    }

    /// (min, max) close over the series, for chart axis bounds.
    pub fn close_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.points.iter().map(|p| p.close);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c)));
        Some((min, max))
    }
}

// ── Company metadata ──────────────────────────────────────────────────────────

/// Provider snapshot of descriptive and fundamental figures for a security.
///
/// Every field the provider may omit is an Option so that "absent" stays
/// distinguishable from "present and zero" all the way to the report.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompanyProfile {
    pub symbol: String,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub business_summary: Option<String>,
    /// Annual dividend per share
    pub dividend_rate: Option<f64>,
    /// Most recent free cash flow
    pub free_cash_flow: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub total_revenue: Option<f64>,
}

impl CompanyProfile {
    /// Title line for the report: "<name> (<SYMBOL>)", symbol alone if the
    /// provider gave no name.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", name, self.symbol),
            None => self.symbol.clone(),
        }
    }
}
