//! Hexagonal binning (2-D density) chart
//!
//! Points are binned on two interleaved rectangular lattices; each point goes
//! to the nearer lattice center under the hexagonal metric
//! `dx² + 3·dy²` (in bin units). `gridsize` hexagons span the x range and
//! `gridsize / √3` span the y range, which keeps the hexagons regular on a
//! square plot. Empty hexagons are not drawn.

use super::axis::{bounds, format_value_tick};
use super::palettes::{palette_registry, sequential_color, PaletteDefinition};
use super::{render_svg, ChartKind, ChartSpec, ChartStyle, RenderedChart, CAPTION_FONT};
use crate::finance::error::{DashboardError, Result};
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::debug;

/// Hexagon vertex offsets in units of (sx, sy / 3)
const HEX_VERTICES: [(f64, f64); 6] = [
    (0.5, -0.5),
    (0.5, 0.5),
    (0.0, 1.0),
    (-0.5, 0.5),
    (-0.5, -0.5),
    (0.0, -1.0),
];

/// Width of the colorbar strip
const COLORBAR_WIDTH: u32 = 90;

/// One occupied hexagon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexBin {
    pub center: (f64, f64),
    pub count: usize,
}

/// Result of hexagonal binning
#[derive(Debug, Clone, PartialEq)]
pub struct HexGrid {
    /// Occupied hexagons only
    pub bins: Vec<HexBin>,
    /// Horizontal distance between neighbouring centers of one lattice
    pub sx: f64,
    /// Vertical distance between neighbouring centers of one lattice
    pub sy: f64,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
}

impl HexGrid {
    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    pub fn total_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Polygon of one hexagon in data coordinates
    pub fn hexagon(&self, center: (f64, f64)) -> Vec<(f64, f64)> {
        HEX_VERTICES
            .iter()
            .map(|(dx, dy)| (center.0 + dx * self.sx, center.1 + dy * self.sy / 3.0))
            .collect()
    }
}

/// Widen a degenerate range by 10% of its magnitude (or ±0.1 around zero)
fn nonsingular(lo: f64, hi: f64) -> (f64, f64) {
    if hi - lo > f64::EPSILON * lo.abs().max(hi.abs()).max(1.0) {
        return (lo, hi);
    }
    if lo == 0.0 {
        (-0.1, 0.1)
    } else {
        (lo - 0.1 * lo.abs(), hi + 0.1 * hi.abs())
    }
}

/// Bin points into hexagons, `gridsize` across the x range
///
/// Returns `None` when there is no finite point.
pub fn hex_bins(points: &[(f64, f64)], gridsize: usize) -> Option<HexGrid> {
    let points: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();

    let (x_lo, x_hi) = bounds(points.iter().map(|p| p.0))?;
    let (y_lo, y_hi) = bounds(points.iter().map(|p| p.1))?;
    let (mut xmin, mut xmax) = nonsingular(x_lo, x_hi);
    let (ymin, ymax) = nonsingular(y_lo, y_hi);

    // Keep the maximum inside the last column
    let padding = 1e-9 * (xmax - xmin);
    xmin -= padding;
    xmax += padding;

    let nx = gridsize.max(1) as f64;
    let ny = ((nx / 3f64.sqrt()) as usize).max(1) as f64;
    let sx = (xmax - xmin) / nx;
    let sy = (ymax - ymin) / ny;

    // (lattice, column, row) -> count
    let mut counts: BTreeMap<(u8, i64, i64), usize> = BTreeMap::new();
    for (x, y) in points {
        let ix = (x - xmin) / sx;
        let iy = (y - ymin) / sy;

        let (ix1, iy1) = (ix.round(), iy.round());
        let (ix2, iy2) = (ix.floor(), iy.floor());
        let d1 = (ix - ix1).powi(2) + 3.0 * (iy - iy1).powi(2);
        let d2 = (ix - ix2 - 0.5).powi(2) + 3.0 * (iy - iy2 - 0.5).powi(2);

        let key = if d1 < d2 {
            (0, ix1 as i64, iy1 as i64)
        } else {
            (1, ix2 as i64, iy2 as i64)
        };
        *counts.entry(key).or_insert(0) += 1;
    }

    let bins = counts
        .into_iter()
        .map(|((lattice, i, j), count)| {
            let offset = if lattice == 0 { 0.0 } else { 0.5 };
            HexBin {
                center: (
                    xmin + (i as f64 + offset) * sx,
                    ymin + (j as f64 + offset) * sy,
                ),
                count,
            }
        })
        .collect();

    Some(HexGrid {
        bins,
        sx,
        sy,
        // Room for the outermost hexagons
        x_range: (xmin - sx * 0.5)..(xmax + sx * 0.5),
        y_range: (ymin - sy * 2.0 / 3.0)..(ymax + sy * 2.0 / 3.0),
    })
}

fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

/// Draw the hexbin chart with a count colorbar on the right
pub fn render_hexbin(
    spec: &ChartSpec,
    style: &ChartStyle,
    points: &[(f64, f64)],
    gridsize: usize,
) -> Result<RenderedChart> {
    let grid = hex_bins(points, gridsize)
        .ok_or_else(|| DashboardError::Render(format!("'{}' has no data points", spec.title)))?;
    let palette = palette_registry()
        .sequential_or_default(&style.colormap)
        .ok_or_else(|| DashboardError::Render("no sequential palette available".to_string()))?;
    let max_count = grid.max_count();

    debug!(
        chart = %spec.title,
        hexagons = grid.bins.len(),
        max_count,
        palette = %palette.name,
        "rendering hexbin"
    );

    let plot_width = spec.width.saturating_sub(COLORBAR_WIDTH).max(1);

    let svg = render_svg(spec.width, spec.height, |root| {
        let (plot_area, bar_area) = root.split_horizontally(plot_width);

        let mut chart = ChartBuilder::on(&plot_area)
            .caption(spec.title.as_str(), CAPTION_FONT)
            .margin(12)
            .x_label_area_size(style.tick_orientation.label_area())
            .y_label_area_size(70)
            .build_cartesian_2d(grid.x_range.clone(), grid.y_range.clone())
            .map_err(DashboardError::render)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .x_label_formatter(&|v: &f64| format_value_tick(*v))
            .y_label_formatter(&|v: &f64| format_value_tick(*v))
            .x_label_style(style.tick_orientation.label_style())
            .draw()
            .map_err(DashboardError::render)?;

        chart
            .draw_series(grid.bins.iter().map(|bin| {
                let fill = rgb(sequential_color(palette, bin.count, max_count));
                Polygon::new(grid.hexagon(bin.center), fill.filled())
            }))
            .map_err(DashboardError::render)?;

        draw_colorbar(&bar_area, palette, max_count)
    })?;

    Ok(RenderedChart {
        kind: ChartKind::Hexbin,
        title: spec.title.clone(),
        svg,
        width: spec.width,
        height: spec.height,
    })
}

fn draw_colorbar(
    area: &DrawingArea<SVGBackend<'_>, plotters::coord::Shift>,
    palette: &PaletteDefinition,
    max_count: usize,
) -> Result<()> {
    const STEPS: usize = 64;
    let top = max_count.max(1) as f64;
    let low = if max_count > 1 { 1.0 } else { 0.0 };

    let mut bar = ChartBuilder::on(area)
        .margin_top(40)
        .margin_bottom(50)
        .margin_right(10)
        .y_label_area_size(0)
        .right_y_label_area_size(45)
        .build_cartesian_2d(0.0..1.0, low..top)
        .map_err(DashboardError::render)?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_label_formatter(&|v: &f64| format!("{:.0}", v))
        .draw()
        .map_err(DashboardError::render)?;

    let step = (top - low) / STEPS as f64;
    bar.draw_series((0..STEPS).map(|i| {
        let y0 = low + step * i as f64;
        let t = i as f64 / (STEPS - 1) as f64;
        Rectangle::new([(0.0, y0), (1.0, y0 + step)], rgb(palette.interpolate(t)).filled())
    }))
    .map_err(DashboardError::render)?;

    Ok(())
}
