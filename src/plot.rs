//! Histogram rendering for pair-distance distributions.
//!
//! All rendering settings travel in an explicit [`PlotStyle`]; the pairing
//! engine never touches this module.

use crate::error::{CwpairError, Result};
use crate::freq::FrequencyDistribution;
use plotters::prelude::*;
use std::fmt::Display;
use std::path::Path;

pub const X_LABEL: &str = "Peak-pair distance (bp)";
pub const Y_LABEL: &str = "Peak-pair counts";

/// Rendering settings for distribution plots.
#[derive(Debug, Clone)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub line_width: u32,
    pub font_family: String,
    pub caption_size: u32,
    /// Series colors, cycled when there are more series than colors
    pub colors: Vec<RGBColor>,
    pub x_label: String,
    pub y_label: String,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            line_width: 4,
            font_family: "sans-serif".to_string(),
            caption_size: 32,
            // black, red, green
            colors: vec![BLACK, RED, RGBColor(0, 128, 0)],
            x_label: X_LABEL.to_string(),
            y_label: Y_LABEL.to_string(),
        }
    }
}

impl PlotStyle {
    fn color(&self, i: usize) -> RGBColor {
        if self.colors.is_empty() {
            BLACK
        } else {
            self.colors[i % self.colors.len()]
        }
    }
}

fn plot_err<E: Display>(e: E) -> CwpairError {
    CwpairError::Plot(e.to_string())
}

/// Draw one line per labelled distribution into an SVG file.
///
/// The x axis spans the first distribution's `[start, end)` range. A legend is
/// drawn only when more than one series is plotted.
pub fn frequency_plot<P: AsRef<Path>>(
    series: &[(&str, &FrequencyDistribution)],
    path: P,
    title: &str,
    style: &PlotStyle,
) -> Result<()> {
    let Some((_, first)) = series.first() else {
        return Err(CwpairError::Plot("no distributions to plot".to_string()));
    };
    let x_start = first.start() as f64;
    let x_end = (first.end() as f64).max(x_start + 1.0);
    let y_max = series
        .iter()
        .flat_map(|&(_, dist)| dist.graph_series().map(|(_, count)| count))
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let root = SVGBackend::new(path.as_ref(), (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let root = root.margin(10, 10, 10, 10);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (style.font_family.as_str(), style.caption_size))
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(x_start..x_end, 0.0..y_max * 1.05)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .draw()
        .map_err(plot_err)?;

    for (i, &(label, dist)) in series.iter().enumerate() {
        let color = style.color(i);
        chart
            .draw_series(LineSeries::new(
                dist.graph_series().map(|(x, count)| (x, count as f64)),
                color.stroke_width(style.line_width),
            ))
            .map_err(plot_err)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if series.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_err)?;
    }

    root.present().map_err(plot_err)?;
    Ok(())
}
