//! Equal-width histogram

use super::axis::{format_value_tick, padded_range};
use super::{render_svg, ChartKind, ChartSpec, ChartStyle, RenderedChart, CAPTION_FONT};
use crate::finance::error::{DashboardError, Result};
use plotters::prelude::*;
use tracing::debug;

/// One histogram bar: `[start, end)`, the last bar also includes `end`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Split the finite values into `bins` equal-width bins over their range
///
/// When every value is the same the range becomes `value ± 0.5`.
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let bins = bins.max(1);
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();

    let (mut lo, mut hi) = match super::axis::bounds(finite.iter().copied()) {
        Some(b) => b,
        None => return Vec::new(),
    };
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

/// Draw a histogram of `values` (y axis = count)
pub fn render_histogram(
    spec: &ChartSpec,
    style: &ChartStyle,
    values: &[f64],
    bins: usize,
) -> Result<RenderedChart> {
    let bars = histogram_bins(values, bins);
    let (first, last) = bars
        .first()
        .zip(bars.last())
        .ok_or_else(|| DashboardError::Render(format!("'{}' has no values", spec.title)))?;

    let x_range = first.start..last.end;
    let max_count = bars.iter().map(|b| b.count).max().unwrap_or(0);
    let y_range = 0.0..padded_range(0.0, max_count as f64).end;
    let color = style.mark_color();

    debug!(chart = %spec.title, bins = bars.len(), max_count, "rendering histogram");

    let svg = render_svg(spec.width, spec.height, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(spec.title.as_str(), CAPTION_FONT)
            .margin(12)
            .x_label_area_size(style.tick_orientation.label_area())
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(DashboardError::render)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .x_label_formatter(&|v: &f64| format_value_tick(*v))
            .y_label_formatter(&|v: &f64| format!("{:.0}", v))
            .x_label_style(style.tick_orientation.label_style())
            .draw()
            .map_err(DashboardError::render)?;

        chart
            .draw_series(
                bars.iter()
                    .filter(|b| b.count > 0)
                    .map(|b| Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], color.filled())),
            )
            .map_err(DashboardError::render)?;
        chart
            .draw_series(
                bars.iter()
                    .filter(|b| b.count > 0)
                    .map(|b| Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], WHITE.stroke_width(1))),
            )
            .map_err(DashboardError::render)?;

        Ok(())
    })?;

    Ok(RenderedChart {
        kind: ChartKind::Histogram,
        title: spec.title.clone(),
        svg,
        width: spec.width,
        height: spec.height,
    })
}
