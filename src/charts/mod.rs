//! Chart rendering with plotters
//!
//! Every chart is drawn to an in-memory SVG string and wrapped in a
//! `RenderedChart`, which the dashboard embeds as a base64 data URI.
//!
//! Structure:
//! - `axis.rs`: value/date ranges, tick formatting and orientation
//! - `palettes.rs`: palette registry (palettes.json)
//! - `line.rs`, `histogram.rs`, `scatter.rs`, `hexbin.rs`: one renderer per chart kind

pub mod axis;
pub mod hexbin;
pub mod histogram;
pub mod line;
pub mod palettes;
pub mod scatter;

use crate::finance::error::{DashboardError, Result};
use axis::TickOrientation;
use base64::Engine;
use plotters::coord::Shift;
use plotters::prelude::*;

pub use hexbin::{hex_bins, render_hexbin, HexBin, HexGrid};
pub use histogram::{histogram_bins, render_histogram, HistogramBin};
pub use line::render_line;
pub use scatter::render_scatter;

/// The kinds of chart the dashboard draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Histogram,
    Scatter,
    Hexbin,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Histogram => "histogram",
            ChartKind::Scatter => "scatter",
            ChartKind::Hexbin => "hexbin",
        }
    }
}

/// Title, axis labels and pixel size of one chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            width,
            height,
        }
    }

    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }
}

/// Styling shared by all charts of a dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    /// Mark color for lines, bars and points
    pub color: [u8; 3],
    pub tick_orientation: TickOrientation,
    /// Sequential palette name for hexbin counts
    pub colormap: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            color: [0x30, 0xa2, 0xda],
            tick_orientation: TickOrientation::Vertical,
            colormap: palettes::DEFAULT_SEQUENTIAL_PALETTE.to_string(),
        }
    }
}

impl ChartStyle {
    pub(crate) fn mark_color(&self) -> RGBColor {
        RGBColor(self.color[0], self.color[1], self.color[2])
    }
}

/// A chart drawn to SVG
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub kind: ChartKind,
    pub title: String,
    pub svg: String,
    pub width: u32,
    pub height: u32,
}

impl RenderedChart {
    /// `data:` URI for embedding in an `<img>` tag
    pub fn to_data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(self.svg.as_bytes());
        format!("data:image/svg+xml;base64,{}", encoded)
    }
}

/// Draw onto a white SVG canvas and return the document
pub(crate) fn render_svg<F>(width: u32, height: u32, draw: F) -> Result<String>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> Result<()>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(DashboardError::render)?;
        draw(&root)?;
        root.present().map_err(DashboardError::render)?;
    }
    Ok(svg)
}

/// Caption font used by every chart
pub(crate) const CAPTION_FONT: (&str, u32) = ("sans-serif", 16);
