//! Closing-price line chart, rasterized to an in-memory PNG.
//!
//! The renderer hands the encoded bytes straight to the document assembler;
//! nothing touches the filesystem.

use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::models::PriceHistory;
use image::RgbImage;
use plotters::prelude::*;
use std::io::Cursor;
use tracing::debug;

/// Render the close-price series as a PNG line chart.
///
/// Caption is "<SYMBOL> Price (1 Year)", axes are labeled Date / Close Price.
/// Deterministic for identical input.
pub fn render_price_chart(history: &PriceHistory, config: &ReportConfig) -> Result<Vec<u8>> {
    if history.is_empty() {
        return Err(Error::Chart(format!(
            "no price points for {}",
            history.symbol
        )));
    }

    let (width, height) = (config.chart_width, config.chart_height);
    let (start, end) = history.date_range().expect("non-empty history has a range");
    let (lo, hi) = history.close_range().expect("non-empty history has closes");

    // Degenerate ranges (single day, flat series) still need a drawable span.
    let x_range = if start == end {
        start..end + chrono::Days::new(1)
    } else {
        start..end
    };
    let y_range = if lo == hi { lo - 1.0..hi + 1.0 } else { lo..hi };

    let mut rgb = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| Error::Chart(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{} Price (1 Year)", history.symbol),
                ("sans-serif", 22),
            )
            .margin(10)
            .x_label_area_size(32)
            .y_label_area_size(52)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| Error::Chart(e.to_string()))?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Close Price")
            .x_labels(6)
            .draw()
            .map_err(|e| Error::Chart(e.to_string()))?;

        chart
            .draw_series(LineSeries::new(
                history.points.iter().map(|p| (p.date, p.close)),
                &BLUE,
            ))
            .map_err(|e| Error::Chart(e.to_string()))?;

        root.present().map_err(|e| Error::Chart(e.to_string()))?;
    }

    let img = RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| Error::Chart("pixel buffer size mismatch".to_string()))?;

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| Error::Chart(e.to_string()))?;

    debug!(
        "{}: rendered {}x{} chart ({} bytes)",
        history.symbol,
        width,
        height,
        png.len()
    );
    Ok(png)
}
