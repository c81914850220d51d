//! Pipeline orchestrator: ties fetcher → chart → valuation → assembler
//! together.
//!
//! One call to `run()` is one complete report: fetch the year of closes and
//! the metadata record, rasterize the chart, evaluate both models, assemble
//! the document, and hand back the serialized artifact. Steps run strictly
//! in order; a failing step surfaces its typed error and nothing is retried
//! or cached.

use crate::chart::render_price_chart;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::fetcher::{MarketDataSource, YahooSource};
use crate::report::{build_report, ReportInputs, DOCX_CONTENT_TYPE};
use crate::valuation;
use chrono::{NaiveDate, Utc};
use tracing::info;

/// The finished, downloadable report.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub struct ReportPipeline {
    config: AppConfig,
}

impl ReportPipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Analysis date shown in the report: the configured override, or today.
    fn analysis_date(&self) -> Result<NaiveDate> {
        match &self.config.report.analysis_date {
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| Error::Config(format!("bad analysis_date {s:?}: {e}"))),
            None => Ok(Utc::now().date_naive()),
        }
    }

    pub async fn run(&self, ticker: &str) -> Result<ReportArtifact> {
        let symbol = ticker.trim().to_uppercase();
        let analysis_date = self.analysis_date()?;
        let source = YahooSource::new(&self.config.fetcher)?;

        info!("=== Step 1: Fetching market data for {} ===", symbol);
        let history = source.fetch_price_history(&symbol).await?;
        let profile = source.fetch_profile(&symbol).await?;
        info!(
            "{}: {} price points, exchange {:?}",
            symbol,
            history.points.len(),
            profile.exchange
        );

        info!("=== Step 2: Rendering price chart ===");
        let chart_png = render_price_chart(&history, &self.config.report)?;

        info!("=== Step 3: Evaluating valuation models ===");
        let summary = valuation::evaluate(&profile, &self.config.valuation);
        info!(
            "{}: DDM {:?} | DCF {:?}",
            symbol, summary.ddm, summary.dcf
        );

        info!("=== Step 4: Assembling document ===");
        let inputs = ReportInputs {
            profile: &profile,
            history: &history,
            valuation: &summary,
            chart_png: &chart_png,
            analysis_date,
        };
        let bytes = build_report(&inputs, &self.config.report, &self.config.valuation)?;

        let artifact = ReportArtifact {
            file_name: format!("Stock_Report_{}.docx", symbol),
            content_type: DOCX_CONTENT_TYPE,
            bytes,
        };
        info!(
            "=== Done: {} ({} bytes) ===",
            artifact.file_name,
            artifact.bytes.len()
        );
        Ok(artifact)
    }

    /// Metadata + model outcomes only, for the console valuation view.
    pub async fn valuation_only(&self, ticker: &str) -> Result<ValuationView> {
        let symbol = ticker.trim().to_uppercase();
        let source = YahooSource::new(&self.config.fetcher)?;
        let profile = source.fetch_profile(&symbol).await?;
        let summary = valuation::evaluate(&profile, &self.config.valuation);
        Ok(ValuationView { profile, summary })
    }
}

#[derive(Debug, Clone)]
pub struct ValuationView {
    pub profile: crate::models::CompanyProfile,
    pub summary: valuation::ValuationSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_date_override() {
        let mut config = AppConfig::default();
        config.report.analysis_date = Some("2024-12-31".to_string());
        let pipeline = ReportPipeline::new(config);
        assert_eq!(
            pipeline.analysis_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_bad_analysis_date_is_a_config_error() {
        let mut config = AppConfig::default();
        config.report.analysis_date = Some("31/12/2024".to_string());
        let pipeline = ReportPipeline::new(config);
        assert!(matches!(
            pipeline.analysis_date().unwrap_err(),
            Error::Config(_)
        ));
    }

    #[test]
    fn test_artifact_file_name() {
        // File name derives from the upper-cased ticker.
        let artifact = ReportArtifact {
            file_name: format!("Stock_Report_{}.docx", "nee".trim().to_uppercase()),
            content_type: DOCX_CONTENT_TYPE,
            bytes: vec![],
        };
        assert_eq!(artifact.file_name, "Stock_Report_NEE.docx");
        assert!(artifact.content_type.contains("wordprocessingml"));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_full_pipeline_live() {
        let pipeline = ReportPipeline::new(AppConfig::default());
        let artifact = pipeline.run("AAPL").await.unwrap();
        assert_eq!(artifact.file_name, "Stock_Report_AAPL.docx");
        assert_eq!(&artifact.bytes[..4], b"PK\x03\x04");
    }
}
