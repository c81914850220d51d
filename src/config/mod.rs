use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub fetcher: FetcherConfig,
    pub report: ReportConfig,
    pub valuation: ValuationConfig,
    pub server: ServerConfig,
}

/// Data fetcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetcherConfig {
    #[serde(default = "default_quote_summary_url")]
    pub quote_summary_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Report assembly configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Optional .docx template whose first paragraph holds the title
    /// placeholder. When unset, the report starts from a blank document.
    #[serde(default)]
    pub template_path: Option<PathBuf>,

    /// Analysis date shown in the report header (YYYY-MM-DD).
    /// Defaults to today when unset.
    #[serde(default)]
    pub analysis_date: Option<String>,

    #[serde(default = "default_chart_width")]
    pub chart_width: u32,

    #[serde(default = "default_chart_height")]
    pub chart_height: u32,

    /// Display width of the embedded chart, in EMU (914400 per inch).
    #[serde(default = "default_chart_display_emu")]
    pub chart_display_emu: u32,
}

/// Valuation model assumptions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValuationConfig {
    #[serde(default = "default_ddm_growth")]
    pub ddm_growth: f64,

    #[serde(default = "default_cost_of_equity")]
    pub cost_of_equity: f64,

    #[serde(default = "default_fcf_growth")]
    pub fcf_growth: f64,

    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,

    #[serde(default = "default_terminal_growth")]
    pub terminal_growth: f64,

    #[serde(default = "default_projection_years")]
    pub projection_years: u32,
}

/// Delivery surface configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_quote_summary_url() -> String {
    "https://query1.finance.yahoo.com/v10/finance/quoteSummary".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "equity-report-engine/0.1 (single-ticker analysis reports)".to_string()
}
fn default_chart_width() -> u32 {
    600
}
fn default_chart_height() -> u32 {
    300
}
fn default_chart_display_emu() -> u32 {
    // 4.5 inches
    4_114_800
}
fn default_ddm_growth() -> f64 {
    0.05
}
fn default_cost_of_equity() -> f64 {
    0.08
}
fn default_fcf_growth() -> f64 {
    0.04
}
fn default_discount_rate() -> f64 {
    0.08
}
fn default_terminal_growth() -> f64 {
    0.03
}
fn default_projection_years() -> u32 {
    5
}
fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("EQR").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|_| AppConfig::default());
        Ok(app_cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetcher: FetcherConfig {
                quote_summary_url: default_quote_summary_url(),
                timeout_secs: default_timeout_secs(),
                user_agent: default_user_agent(),
            },
            report: ReportConfig {
                template_path: None,
                analysis_date: None,
                chart_width: default_chart_width(),
                chart_height: default_chart_height(),
                chart_display_emu: default_chart_display_emu(),
            },
            valuation: ValuationConfig::default(),
            server: ServerConfig {
                bind: default_bind(),
            },
        }
    }
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            ddm_growth: default_ddm_growth(),
            cost_of_equity: default_cost_of_equity(),
            fcf_growth: default_fcf_growth(),
            discount_rate: default_discount_rate(),
            terminal_growth: default_terminal_growth(),
            projection_years: default_projection_years(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_assumptions() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.valuation.ddm_growth, 0.05);
        assert_eq!(cfg.valuation.cost_of_equity, 0.08);
        assert_eq!(cfg.valuation.fcf_growth, 0.04);
        assert_eq!(cfg.valuation.discount_rate, 0.08);
        assert_eq!(cfg.valuation.terminal_growth, 0.03);
        assert_eq!(cfg.valuation.projection_years, 5);
        assert!(cfg.report.template_path.is_none());
        assert_eq!(cfg.report.chart_display_emu, 4_114_800);
    }
}
