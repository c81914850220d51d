//! Wire format of the provider's quote-summary endpoint.
//!
//! Numeric fields arrive wrapped in `{"raw": ..., "fmt": "..."}` envelopes;
//! only the raw value matters here. Absent modules or fields map to None.

use crate::models::CompanyProfile;
use serde::Deserialize;

/// Modules requested from the quote-summary endpoint.
pub const MODULES: &str = "price,summaryProfile,summaryDetail,financialData,defaultKeyStatistics";

#[derive(Debug, Deserialize)]
pub struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummaryBody {
    #[serde(default)]
    pub result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteSummaryResult {
    #[serde(default)]
    pub price: Option<PriceModule>,
    #[serde(rename = "summaryProfile", default)]
    pub summary_profile: Option<SummaryProfileModule>,
    #[serde(rename = "summaryDetail", default)]
    pub summary_detail: Option<SummaryDetailModule>,
    #[serde(rename = "financialData", default)]
    pub financial_data: Option<FinancialDataModule>,
    #[serde(rename = "defaultKeyStatistics", default)]
    pub key_statistics: Option<KeyStatisticsModule>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PriceModule {
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
    #[serde(rename = "exchangeName")]
    pub exchange_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryProfileModule {
    #[serde(rename = "longBusinessSummary")]
    pub long_business_summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryDetailModule {
    #[serde(rename = "dividendRate")]
    pub dividend_rate: Option<RawNum>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FinancialDataModule {
    #[serde(rename = "freeCashflow")]
    pub free_cashflow: Option<RawNum>,
    #[serde(rename = "totalRevenue")]
    pub total_revenue: Option<RawNum>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeyStatisticsModule {
    #[serde(rename = "sharesOutstanding")]
    pub shares_outstanding: Option<RawNum>,
}

/// Provider number envelope; `raw` can itself be null.
#[derive(Debug, Default, Deserialize)]
pub struct RawNum {
    #[serde(default)]
    pub raw: Option<f64>,
}

fn raw(num: Option<RawNum>) -> Option<f64> {
    num.and_then(|n| n.raw)
}

impl QuoteSummaryResult {
    /// Flatten the module tree into the profile the rest of the pipeline
    /// consumes. Missing modules and fields stay None.
    pub fn into_profile(self, symbol: &str) -> CompanyProfile {
        let price = self.price.unwrap_or_default();
        let profile = self.summary_profile.unwrap_or_default();
        let detail = self.summary_detail.unwrap_or_default();
        let financial = self.financial_data.unwrap_or_default();
        let stats = self.key_statistics.unwrap_or_default();

        CompanyProfile {
            symbol: symbol.to_string(),
            name: price.short_name,
            exchange: price.exchange_name,
            business_summary: profile.long_business_summary,
            dividend_rate: raw(detail.dividend_rate),
            free_cash_flow: raw(financial.free_cashflow),
            shares_outstanding: raw(stats.shares_outstanding),
            total_revenue: raw(financial.total_revenue),
        }
    }
}
