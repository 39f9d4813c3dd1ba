//! Time-series line chart

use super::axis::{bounds, date_range, format_date_tick, format_value_tick, padded_range};
use super::{render_svg, ChartKind, ChartSpec, ChartStyle, RenderedChart, CAPTION_FONT};
use crate::finance::cells::date_to_epoch_days;
use crate::finance::error::{DashboardError, Result};
use chrono::NaiveDate;
use plotters::prelude::*;
use tracing::debug;

/// Draw a metric over time: x = reporting date, y = value
pub fn render_line(
    spec: &ChartSpec,
    style: &ChartStyle,
    points: &[(NaiveDate, f64)],
) -> Result<RenderedChart> {
    let series: Vec<(i32, f64)> = points
        .iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(d, v)| (date_to_epoch_days(*d), *v))
        .collect();

    let dates: Vec<NaiveDate> = points.iter().map(|(d, _)| *d).collect();
    let (x_range, (lo, hi)) = date_range(&dates)
        .zip(bounds(series.iter().map(|(_, v)| *v)))
        .ok_or_else(|| DashboardError::Render(format!("'{}' has no data points", spec.title)))?;
    let y_range = padded_range(lo, hi);
    let color = style.mark_color();

    debug!(chart = %spec.title, points = series.len(), "rendering line chart");

    let svg = render_svg(spec.width, spec.height, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(spec.title.as_str(), CAPTION_FONT)
            .margin(12)
            .x_label_area_size(style.tick_orientation.label_area())
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)
            .map_err(DashboardError::render)?;

        chart
            .configure_mesh()
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .x_labels(6)
            .x_label_formatter(&|d: &i32| format_date_tick(*d))
            .y_label_formatter(&|v: &f64| format_value_tick(*v))
            .x_label_style(style.tick_orientation.label_style())
            .draw()
            .map_err(DashboardError::render)?;

        chart
            .draw_series(LineSeries::new(series.iter().copied(), color.stroke_width(2)))
            .map_err(DashboardError::render)?;
        chart
            .draw_series(series.iter().map(|&p| Circle::new(p, 3, color.filled())))
            .map_err(DashboardError::render)?;

        Ok(())
    })?;

    Ok(RenderedChart {
        kind: ChartKind::Line,
        title: spec.title.clone(),
        svg,
        width: spec.width,
        height: spec.height,
    })
}
