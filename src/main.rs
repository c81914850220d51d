mod chart;
mod config;
mod error;
mod fetcher;
mod models;
mod pipeline;
mod report;
mod server;
mod utils;
mod valuation;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::pipeline::ReportPipeline;
use crate::valuation::ModelOutcome;

#[derive(Parser)]
#[command(name = "equity-report", about = "Single-ticker equity analysis report generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a report for one ticker and write it to disk
    Generate {
        /// Ticker symbol, e.g. NEE
        #[arg(short, long)]
        ticker: String,

        /// Output path (default: Stock_Report_<TICKER>.docx in the cwd)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch metadata and print both valuation model outcomes
    Valuation {
        /// Ticker symbol, e.g. NEE
        #[arg(short, long)]
        ticker: String,
    },

    /// Start the web delivery surface
    Serve {
        /// Bind address override, e.g. 0.0.0.0:8080
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "equity_report_engine=info,warn",
        1 => "equity_report_engine=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Generate { ticker, output } => {
            let _t = utils::Timer::start("Report generation");
            let artifact = ReportPipeline::new(config).run(&ticker).await?;

            let path = output.unwrap_or_else(|| PathBuf::from(&artifact.file_name));
            std::fs::write(&path, &artifact.bytes)
                .with_context(|| format!("Could not write {:?}", path))?;
            info!("Wrote {:?} ({} bytes)", path, artifact.bytes.len());
        }

        Command::Valuation { ticker } => {
            let view = ReportPipeline::new(config).valuation_only(&ticker).await?;
            let profile = &view.profile;

            println!("─────────────────────────────────");
            println!("  Valuation — {}", profile.display_name());
            println!("─────────────────────────────────");
            println!("  Dividend : {}", money_or_dash(profile.dividend_rate));
            println!("  FCF      : {}", amount_or_dash(profile.free_cash_flow));
            println!("  Shares   : {}", amount_or_dash(profile.shares_outstanding));
            println!("  DDM      : {}", outcome_line(&view.summary.ddm));
            println!("  DCF      : {}", outcome_line(&view.summary.dcf));
            println!("─────────────────────────────────");
        }

        Command::Serve { bind } => {
            let mut config = config;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            server::serve(config).await?;
        }
    }

    Ok(())
}

fn outcome_line(outcome: &ModelOutcome) -> String {
    match outcome {
        ModelOutcome::Applicable { per_share } => format!("${per_share:.2} per share"),
        ModelOutcome::NotApplicable { reason } => format!("not applicable ({reason})"),
    }
}

fn money_or_dash(value: Option<f64>) -> String {
    value.map(|v| format!("${v:.2}")).unwrap_or_else(|| "—".into())
}

fn amount_or_dash(value: Option<f64>) -> String {
    value
        .map(|v| utils::fmt_number(v as i64))
        .unwrap_or_else(|| "—".into())
}
