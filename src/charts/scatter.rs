//! Scatter plot of paired values

use super::axis::{bounds, format_value_tick, padded_range};
use super::{render_svg, ChartKind, ChartSpec, ChartStyle, RenderedChart, CAPTION_FONT};
use crate::finance::error::{DashboardError, Result};
use plotters::prelude::*;
use tracing::debug;

/// Draw one point per (x, y) pair; non-finite pairs are skipped
pub fn render_scatter(
    spec: &ChartSpec,
    style: &ChartStyle,
    points: &[(f64, f64)],
) -> Result<RenderedChart> {
    let points: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();

    let ((x_lo, x_hi), (y_lo, y_hi)) = bounds(points.iter().map(|p| p.0))
        .zip(bounds(points.iter().map(|p| p.1)))
        .ok_or_else(|| DashboardError::Render(format!("'{}' has no data points", spec.title)))?;
    let color = style.mark_color();

    debug!(chart = %spec.title, points = points.len(), "rendering scatter plot");

    let svg = render_svg(spec.width, spec.height, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(spec.title.as_str(), CAPTION_FONT)
            .margin(12)
            .x_label_area_size(style.tick_orientation.label_area())
            .y_label_area_size(70)
            .build_cartesian_2d(padded_range(x_lo, x_hi), padded_range(y_lo, y_hi))
            .map_err(DashboardError::render)?;

        chart
            .configure_mesh()
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .x_label_formatter(&|v: &f64| format_value_tick(*v))
            .y_label_formatter(&|v: &f64| format_value_tick(*v))
            .x_label_style(style.tick_orientation.label_style())
            .draw()
            .map_err(DashboardError::render)?;

        chart
            .draw_series(
                points
                    .iter()
                    .map(|&p| Circle::new(p, 4, color.mix(0.8).filled())),
            )
            .map_err(DashboardError::render)?;

        Ok(())
    })?;

    Ok(RenderedChart {
        kind: ChartKind::Scatter,
        title: spec.title.clone(),
        svg,
        width: spec.width,
        height: spec.height,
    })
}
