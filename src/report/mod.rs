//! Document assembly: fills a .docx template (or a blank document) with the
//! report narrative, the financials table, the chart image, and both
//! valuation paragraphs, then serializes to an in-memory buffer.
//!
//! Mutation order is fixed: title → exchange → date → current price → chart
//! → business description → financials table → valuation paragraphs.

use crate::config::{ReportConfig, ValuationConfig};
use crate::error::{Error, Result};
use crate::models::{CompanyProfile, PriceHistory};
use crate::utils::fmt_number;
use crate::valuation::{ModelOutcome, ValuationSummary};
use chrono::{Datelike, NaiveDate};
use docx_rs::{
    read_docx, Docx, DocumentChild, Paragraph, Pic, Run, Style, StyleType, Table, TableCell,
    TableRow,
};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// MIME type of the produced artifact.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Everything the assembler consumes; all produced by earlier pipeline steps.
pub struct ReportInputs<'a> {
    pub profile: &'a CompanyProfile,
    pub history: &'a PriceHistory,
    pub valuation: &'a ValuationSummary,
    pub chart_png: &'a [u8],
    pub analysis_date: NaiveDate,
}

/// Assemble and serialize the report document.
pub fn build_report(
    inputs: &ReportInputs<'_>,
    config: &ReportConfig,
    assumptions: &ValuationConfig,
) -> Result<Vec<u8>> {
    let mut docx = assemble(inputs, config, assumptions)?;

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| Error::Assembly(e.to_string()))?;

    let bytes = cursor.into_inner();
    debug!(
        "{}: assembled report ({} bytes)",
        inputs.profile.symbol,
        bytes.len()
    );
    Ok(bytes)
}

/// Build the document tree without serializing; the unit tests inspect it.
pub(crate) fn assemble(
    inputs: &ReportInputs<'_>,
    config: &ReportConfig,
    assumptions: &ValuationConfig,
) -> Result<Docx> {
    let profile = inputs.profile;

    let current_price = inputs
        .history
        .latest_close()
        .ok_or_else(|| Error::Assembly(format!("no price history for {}", profile.symbol)))?;

    let mut docx = base_document(config.template_path.as_deref())?;
    set_title(
        &mut docx,
        &format!("Stock Analysis Report: {}", profile.display_name()),
    )?;

    let exchange = profile.exchange.as_deref().unwrap_or("N/A");
    let docx = docx
        .add_paragraph(text_paragraph(&format!("Exchange: {exchange}")))
        .add_paragraph(text_paragraph(&format!(
            "Analysis Date: {}",
            inputs.analysis_date
        )))
        .add_paragraph(text_paragraph(&format!("Current Price: ${current_price:.2}")))
        .add_paragraph(chart_paragraph(inputs.chart_png, config))
        .add_paragraph(heading("Business Description"))
        .add_paragraph(text_paragraph(
            profile
                .business_summary
                .as_deref()
                .unwrap_or("No summary available."),
        ))
        .add_paragraph(heading("Key Financials"))
        .add_table(financials_table(profile, inputs.analysis_date))
        .add_paragraph(heading("Valuation"))
        .add_paragraph(text_paragraph(&ddm_line(
            &inputs.valuation.ddm,
            profile.dividend_rate,
            assumptions,
        )))
        .add_paragraph(text_paragraph(&dcf_line(
            &inputs.valuation.dcf,
            profile.free_cash_flow,
            assumptions,
        )));

    Ok(docx)
}

// ── Document scaffolding ──────────────────────────────────────────────────────

/// Load the operator-supplied template, or start from a blank document with
/// a title placeholder and heading styles.
fn base_document(template_path: Option<&Path>) -> Result<Docx> {
    match template_path {
        Some(path) => {
            let buf = std::fs::read(path)
                .map_err(|e| Error::Template(format!("cannot read {path:?}: {e}")))?;
            read_docx(&buf).map_err(|e| Error::Template(format!("cannot parse {path:?}: {e:?}")))
        }
        None => Ok(Docx::new()
            .add_style(
                Style::new("Heading1", StyleType::Paragraph)
                    .name("Heading 1")
                    .size(28)
                    .bold(),
            )
            .add_paragraph(Paragraph::new())),
    }
}

/// Overwrite the first paragraph with the report title. A template without
/// any paragraph has no title placeholder to fill.
fn set_title(docx: &mut Docx, title: &str) -> Result<()> {
    for child in &mut docx.document.children {
        if let DocumentChild::Paragraph(_) = child {
            *child = DocumentChild::Paragraph(Box::new(text_paragraph(title)));
            return Ok(());
        }
    }
    Err(Error::Template("template has no paragraphs".to_string()))
}

// ── Content pieces ────────────────────────────────────────────────────────────

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn heading(text: &str) -> Paragraph {
    Paragraph::new()
        .style("Heading1")
        .add_run(Run::new().add_text(text))
}

fn chart_paragraph(png: &[u8], config: &ReportConfig) -> Paragraph {
    // Keep the configured display width, scale height with the raster's
    // aspect ratio.
    let display_w = config.chart_display_emu;
    let display_h =
        (config.chart_display_emu as u64 * config.chart_height as u64 / config.chart_width as u64)
            as u32;
    let pic = Pic::new(png).size(display_w, display_h);
    Paragraph::new().add_run(Run::new().add_image(pic))
}

/// 2×3 table: Metric/Value/Year header and a single Revenue row.
fn financials_table(profile: &CompanyProfile, analysis_date: NaiveDate) -> Table {
    let revenue = profile
        .total_revenue
        .map(|r| fmt_number(r as i64))
        .unwrap_or_else(|| "N/A".to_string());

    Table::new(vec![
        TableRow::new(vec![
            cell("Metric"),
            cell("Value"),
            cell("Year"),
        ]),
        TableRow::new(vec![
            cell("Revenue"),
            cell(&revenue),
            cell(&analysis_date.year().to_string()),
        ]),
    ])
}

fn cell(text: &str) -> TableCell {
    TableCell::new().add_paragraph(text_paragraph(text))
}

fn ddm_line(
    outcome: &ModelOutcome,
    dividend: Option<f64>,
    assumptions: &ValuationConfig,
) -> String {
    match outcome {
        ModelOutcome::Applicable { per_share } => format!(
            "DDM Valuation: ${:.2} per share (Dividend: ${:.2}, Growth: {:.1}%, Cost of Equity: {:.1}%)",
            per_share,
            dividend.unwrap_or_default(),
            assumptions.ddm_growth * 100.0,
            assumptions.cost_of_equity * 100.0,
        ),
        ModelOutcome::NotApplicable { reason } => {
            format!("DDM Valuation: Not applicable ({reason})")
        }
    }
}

fn dcf_line(
    outcome: &ModelOutcome,
    free_cash_flow: Option<f64>,
    assumptions: &ValuationConfig,
) -> String {
    match outcome {
        ModelOutcome::Applicable { per_share } => format!(
            "DCF Valuation: ${:.2} per share (FCF: ${:.2}, Growth: {:.1}%, Discount Rate: {:.1}%)",
            per_share,
            free_cash_flow.unwrap_or_default(),
            assumptions.fcf_growth * 100.0,
            assumptions.discount_rate * 100.0,
        ),
        ModelOutcome::NotApplicable { reason } => {
            format!("DCF Valuation: Not applicable ({reason})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use crate::valuation;
    use docx_rs::{ParagraphChild, RunChild, TableChild, TableRowChild};

    fn profile() -> CompanyProfile {
        CompanyProfile {
            symbol: "NEE".to_string(),
            name: Some("NextEra Energy, Inc.".to_string()),
            exchange: Some("NYSE".to_string()),
            business_summary: Some("Generates, transmits, and sells electricity.".to_string()),
            dividend_rate: Some(2.0),
            free_cash_flow: Some(1_000_000_000.0),
            shares_outstanding: Some(500_000_000.0),
            total_revenue: Some(28_114_000_000.0),
        }
    }

    fn history() -> PriceHistory {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let points = (0..5)
            .map(|i| PricePoint {
                date: start + chrono::Days::new(i),
                close: 70.0 + i as f64,
            })
            .collect();
        PriceHistory::new("NEE", points)
    }

    // Tiny valid 1x1 PNG so Pic::new can read dimensions.
    fn png_fixture() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(1, 1, image::Rgb([255, 255, 255]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn assemble_default(config: &ReportConfig) -> Docx {
        let profile = profile();
        let history = history();
        let assumptions = ValuationConfig::default();
        let summary = valuation::evaluate(&profile, &assumptions);
        let png = png_fixture();
        let inputs = ReportInputs {
            profile: &profile,
            history: &history,
            valuation: &summary,
            chart_png: &png,
            analysis_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        };
        assemble(&inputs, config, &assumptions).unwrap()
    }

    fn paragraph_text(p: &Paragraph) -> String {
        let mut out = String::new();
        for child in &p.children {
            if let ParagraphChild::Run(run) = child {
                for rc in &run.children {
                    if let RunChild::Text(t) = rc {
                        out.push_str(&t.text);
                    }
                }
            }
        }
        out
    }

    fn all_paragraph_texts(docx: &Docx) -> Vec<String> {
        docx.document
            .children
            .iter()
            .filter_map(|c| match c {
                DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
                _ => None,
            })
            .collect()
    }

    fn tables(docx: &Docx) -> Vec<&Table> {
        docx.document
            .children
            .iter()
            .filter_map(|c| match c {
                DocumentChild::Table(t) => Some(t.as_ref()),
                _ => None,
            })
            .collect()
    }

    fn image_count(docx: &Docx) -> usize {
        docx.document
            .children
            .iter()
            .filter_map(|c| match c {
                DocumentChild::Paragraph(p) => Some(p),
                _ => None,
            })
            .flat_map(|p| p.children.iter())
            .filter_map(|c| match c {
                ParagraphChild::Run(r) => Some(r),
                _ => None,
            })
            .flat_map(|r| r.children.iter())
            .filter(|rc| matches!(rc, RunChild::Drawing(_)))
            .count()
    }

    fn default_report_config() -> ReportConfig {
        crate::config::AppConfig::default().report
    }

    #[test]
    fn test_title_and_fixed_section_order() {
        let docx = assemble_default(&default_report_config());
        let texts = all_paragraph_texts(&docx);

        assert_eq!(texts[0], "Stock Analysis Report: NextEra Energy, Inc. (NEE)");
        assert_eq!(texts[1], "Exchange: NYSE");
        assert_eq!(texts[2], "Analysis Date: 2024-12-31");
        assert_eq!(texts[3], "Current Price: $74.00");
        // texts[4] is the chart paragraph (no text)
        assert_eq!(texts[5], "Business Description");
        assert_eq!(texts[7], "Key Financials");
        assert_eq!(texts[8], "Valuation");
        assert!(texts[9].starts_with("DDM Valuation: $70.00 per share"));
        assert!(texts[10].starts_with("DCF Valuation: $43.06 per share"));
    }

    #[test]
    fn test_exactly_one_table_2x3_and_one_image() {
        let docx = assemble_default(&default_report_config());

        let tables = tables(&docx);
        assert_eq!(tables.len(), 1);
        let rows: Vec<_> = tables[0]
            .rows
            .iter()
            .map(|r| {
                let TableChild::TableRow(row) = r;
                row
            })
            .collect();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            let cells = row
                .cells
                .iter()
                .filter(|c| matches!(c, TableRowChild::TableCell(_)))
                .count();
            assert_eq!(cells, 3);
        }

        assert_eq!(image_count(&docx), 1);
    }

    #[test]
    fn test_revenue_row_contents() {
        let docx = assemble_default(&default_report_config());
        let tables = tables(&docx);
        let TableChild::TableRow(data_row) = &tables[0].rows[1];
        let texts: Vec<String> = data_row
            .cells
            .iter()
            .map(|c| {
                let TableRowChild::TableCell(cell) = c;
                cell.children
                    .iter()
                    .filter_map(|cc| match cc {
                        docx_rs::TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                        _ => None,
                    })
                    .collect::<String>()
            })
            .collect();
        assert_eq!(texts, vec!["Revenue", "28,114,000,000", "2024"]);
    }

    #[test]
    fn test_missing_fields_fall_back_to_placeholders() {
        let profile = CompanyProfile {
            symbol: "BARE".to_string(),
            ..Default::default()
        };
        let history = history();
        let assumptions = ValuationConfig::default();
        let summary = valuation::evaluate(&profile, &assumptions);
        let png = png_fixture();
        let inputs = ReportInputs {
            profile: &profile,
            history: &history,
            valuation: &summary,
            chart_png: &png,
            analysis_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        };
        let docx = assemble(&inputs, &default_report_config(), &assumptions).unwrap();
        let texts = all_paragraph_texts(&docx);

        assert_eq!(texts[0], "Stock Analysis Report: BARE");
        assert_eq!(texts[1], "Exchange: N/A");
        assert_eq!(texts[6], "No summary available.");
        assert_eq!(
            texts[9],
            "DDM Valuation: Not applicable (missing dividend)"
        );
        assert_eq!(
            texts[10],
            "DCF Valuation: Not applicable (missing or invalid free cash flow data)"
        );
    }

    #[test]
    fn test_serialized_report_is_a_zip_archive() {
        let profile = profile();
        let history = history();
        let assumptions = ValuationConfig::default();
        let summary = valuation::evaluate(&profile, &assumptions);
        let png = png_fixture();
        let inputs = ReportInputs {
            profile: &profile,
            history: &history,
            valuation: &summary,
            chart_png: &png,
            analysis_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        };
        let bytes = build_report(&inputs, &default_report_config(), &assumptions).unwrap();
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..4], b"PK\x03\x04");
    }

    #[test]
    fn test_identical_inputs_identical_text_content() {
        let first = all_paragraph_texts(&assemble_default(&default_report_config()));
        let second = all_paragraph_texts(&assemble_default(&default_report_config()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_template_first_paragraph_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.docx");

        let mut template = Docx::new()
            .add_paragraph(text_paragraph("TITLE PLACEHOLDER"))
            .add_paragraph(text_paragraph("Boilerplate disclaimer."));
        let mut cursor = Cursor::new(Vec::new());
        template.build().pack(&mut cursor).unwrap();
        std::fs::write(&path, cursor.into_inner()).unwrap();

        let mut config = default_report_config();
        config.template_path = Some(path);

        let docx = assemble_default(&config);
        let texts = all_paragraph_texts(&docx);
        assert_eq!(texts[0], "Stock Analysis Report: NextEra Energy, Inc. (NEE)");
        assert!(texts.iter().any(|t| t == "Boilerplate disclaimer."));
        assert!(!texts.iter().any(|t| t == "TITLE PLACEHOLDER"));
    }

    #[test]
    fn test_missing_template_is_a_template_error() {
        let mut config = default_report_config();
        config.template_path = Some(std::path::PathBuf::from("/nonexistent/template.docx"));

        let profile = profile();
        let history = history();
        let assumptions = ValuationConfig::default();
        let summary = valuation::evaluate(&profile, &assumptions);
        let png = png_fixture();
        let inputs = ReportInputs {
            profile: &profile,
            history: &history,
            valuation: &summary,
            chart_png: &png,
            analysis_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        };
        let err = assemble(&inputs, &config, &assumptions).unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }
}
