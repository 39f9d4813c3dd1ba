//! Dashboard configuration from properties
//!
//! Configuration is loaded from dashboard properties (defined in dashboard.json).
//! All default values come from dashboard.json - no hardcoded fallbacks in this code.
//!
//! Property definitions and defaults are parsed from dashboard.json at compile
//! time via the `PropertyReader`, which is the single source of truth for defaults.

use crate::charts::axis::TickOrientation;
use crate::charts::palettes::parse_hex_color;
use crate::charts::ChartStyle;
use crate::dashboard::TabLocation;
use crate::finance::merge::JoinStrategy;
use crate::finance::properties::{registry, PropertyReader};
use tracing::warn;

/// Smallest and largest accepted chart side, in pixels
const MIN_PLOT_SIDE: i64 = 100;
const MAX_PLOT_SIDE: i64 = 4000;

/// Width and height of one chart in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotSize {
    pub width: u32,
    pub height: u32,
}

impl PlotSize {
    fn from_properties(props: &PropertyReader, prefix: &str) -> Self {
        let side = |dim: &str| {
            props.get_i64_in_range(&format!("{}.{}", prefix, dim), MIN_PLOT_SIDE, MAX_PLOT_SIDE)
                as u32
        };
        Self {
            width: side("width"),
            height: side("height"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Company name used in the headings
    pub company_name: String,

    /// Line charts on the Financial Overview tab
    pub overview_size: PlotSize,

    /// Each chart of the Key Metrics grid
    pub grid_size: PlotSize,

    /// The hexbin chart on the Heatmap Analysis tab
    pub heatmap_size: PlotSize,

    /// Number of bins in the dividend payout histogram
    pub histogram_bins: usize,

    /// Hexagons across the x range of the heatmap
    pub hexbin_gridsize: usize,

    /// Sequential palette for hexbin counts
    pub colormap: String,

    /// Mark color as RGB
    pub line_color: [u8; 3],

    pub tick_orientation: TickOrientation,

    /// How net income and dividend payout rows are matched by date
    pub join: JoinStrategy,

    pub tab_location: TabLocation,

    /// Address the dashboard server binds to
    pub serve_host: String,

    /// Port the dashboard server binds to (0 = chosen by the OS)
    pub serve_port: u16,
}

impl DashboardConfig {
    /// Create config from dashboard properties
    ///
    /// All default values come from dashboard.json via PropertyReader.
    pub fn from_properties(props: &PropertyReader) -> Self {
        let company_name = props.get_string("company.name");

        let overview_size = PlotSize::from_properties(props, "overview.plot");
        let grid_size = PlotSize::from_properties(props, "grid.plot");
        let heatmap_size = PlotSize::from_properties(props, "heatmap.plot");

        let histogram_bins = props.get_i64_in_range("histogram.bins", 1, 200) as usize;
        let hexbin_gridsize = props.get_i64_in_range("hexbin.gridsize", 2, 200) as usize;

        // Colormap: validated enum
        let colormap = props.get_enum("hexbin.colormap");

        // Line color: hex string, default from dashboard.json when unparseable
        let line_color = parse_color_property(props, "line.color");

        let tick_orientation = TickOrientation::parse(&props.get_enum("axis.x.tick.orientation"));
        let join = JoinStrategy::parse(&props.get_enum("merge.join"));
        let tab_location = TabLocation::parse(&props.get_enum("tabs.location"));

        let serve_host = props.get_string("serve.host");
        let serve_port = props.get_i64_in_range("serve.port", 0, u16::MAX as i64) as u16;

        Self {
            company_name,
            overview_size,
            grid_size,
            heatmap_size,
            histogram_bins,
            hexbin_gridsize,
            colormap,
            line_color,
            tick_orientation,
            join,
            tab_location,
            serve_host,
            serve_port,
        }
    }

    /// Chart styling derived from this config
    pub fn chart_style(&self) -> ChartStyle {
        ChartStyle {
            color: self.line_color,
            tick_orientation: self.tick_orientation,
            colormap: self.colormap.clone(),
        }
    }

    /// Page heading, e.g. "Intel Financial Data Dashboard"
    pub fn dashboard_title(&self) -> String {
        format!("{} Financial Data Dashboard", self.company_name)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::from_properties(&PropertyReader::default())
    }
}

fn parse_color_property(props: &PropertyReader, name: &str) -> [u8; 3] {
    let value = props.get_string(name);
    if let Some(rgb) = parse_hex_color(&value) {
        return rgb;
    }

    let default = registry().get_default(name).unwrap_or("");
    warn!(
        "Invalid color '{}' for property '{}'. Using default: '{}'",
        value, name, default
    );
    parse_hex_color(default).unwrap_or([0, 0, 0])
}
