//! Dashboard layout: panes arranged in columns, grids and tabs
//!
//! Structure:
//! - `html.rs`: renders a `Tabs` to one self-contained HTML page
//! - `serve.rs`: local HTTP server for the rendered page

pub mod html;
pub mod serve;

use crate::charts::RenderedChart;

pub use html::render_page;
pub use serve::DashboardServer;

/// A unit of dashboard content
#[derive(Debug, Clone, PartialEq)]
pub enum Pane {
    /// Markdown text (headings and paragraphs)
    Markdown(String),
    Chart(RenderedChart),
    Column(Column),
    Grid(Grid),
}

impl Pane {
    pub fn markdown(text: impl Into<String>) -> Self {
        Pane::Markdown(text.into())
    }

    /// Text shown in place of a chart whose metric is absent
    pub fn missing_metric(metric: &str) -> Self {
        Pane::Markdown(format!("Metric '{}' not found in data.", metric))
    }

    /// Number of charts in this pane and everything nested in it
    pub fn chart_count(&self) -> usize {
        match self {
            Pane::Markdown(_) => 0,
            Pane::Chart(_) => 1,
            Pane::Column(c) => c.panes.iter().map(Pane::chart_count).sum(),
            Pane::Grid(g) => g.panes.iter().map(Pane::chart_count).sum(),
        }
    }

    /// Every chart in display order
    pub fn charts(&self) -> Vec<&RenderedChart> {
        match self {
            Pane::Markdown(_) => Vec::new(),
            Pane::Chart(c) => vec![c],
            Pane::Column(c) => c.panes.iter().flat_map(Pane::charts).collect(),
            Pane::Grid(g) => g.panes.iter().flat_map(Pane::charts).collect(),
        }
    }
}

impl From<RenderedChart> for Pane {
    fn from(chart: RenderedChart) -> Self {
        Pane::Chart(chart)
    }
}

/// Panes stacked vertically
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    pub panes: Vec<Pane>,
}

impl Column {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, pane: impl Into<Pane>) -> Self {
        self.panes.push(pane.into());
        self
    }
}

impl From<Column> for Pane {
    fn from(column: Column) -> Self {
        Pane::Column(column)
    }
}

/// Panes laid out row by row, `ncols` per row
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub ncols: usize,
    pub panes: Vec<Pane>,
}

impl Grid {
    pub fn new(ncols: usize) -> Self {
        Self {
            ncols: ncols.max(1),
            panes: Vec::new(),
        }
    }

    pub fn push(mut self, pane: impl Into<Pane>) -> Self {
        self.panes.push(pane.into());
        self
    }

    pub fn nrows(&self) -> usize {
        self.panes.len().div_ceil(self.ncols)
    }
}

impl From<Grid> for Pane {
    fn from(grid: Grid) -> Self {
        Pane::Grid(grid)
    }
}

/// Where the tab headers sit relative to the content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabLocation {
    #[default]
    Left,
    Above,
    Right,
    Below,
}

impl TabLocation {
    /// Parse from string value (validation happens in the property reader)
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "above" => Self::Above,
            "right" => Self::Right,
            "below" => Self::Below,
            _ => Self::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Above => "above",
            Self::Right => "right",
            Self::Below => "below",
        }
    }
}

/// One named tab
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub title: String,
    pub content: Pane,
}

/// The top-level dashboard: a set of tabs, first one selected
#[derive(Debug, Clone, PartialEq)]
pub struct Tabs {
    pub location: TabLocation,
    pub tabs: Vec<Tab>,
}

impl Tabs {
    pub fn new(location: TabLocation) -> Self {
        Self {
            location,
            tabs: Vec::new(),
        }
    }

    pub fn with_tab(mut self, title: impl Into<String>, content: impl Into<Pane>) -> Self {
        self.tabs.push(Tab {
            title: title.into(),
            content: content.into(),
        });
        self
    }

    pub fn titles(&self) -> Vec<&str> {
        self.tabs.iter().map(|t| t.title.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartKind;

    fn chart(title: &str) -> RenderedChart {
        RenderedChart {
            kind: ChartKind::Line,
            title: title.to_string(),
            svg: "<svg></svg>".to_string(),
            width: 10,
            height: 10,
        }
    }

    #[test]
    fn test_missing_metric_text() {
        assert_eq!(
            Pane::missing_metric("grossProfit"),
            Pane::Markdown("Metric 'grossProfit' not found in data.".to_string())
        );
    }

    #[test]
    fn test_nested_chart_count() {
        let grid = Grid::new(2)
            .push(chart("a"))
            .push(chart("b"))
            .push(Pane::missing_metric("x"));
        let column = Column::new().push(Pane::markdown("# Title")).push(grid);

        let pane = Pane::from(column);
        assert_eq!(pane.chart_count(), 2);
        assert_eq!(
            pane.charts().iter().map(|c| c.title.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_grid_rows() {
        let grid = Grid::new(2).push(chart("a")).push(chart("b")).push(chart("c"));
        assert_eq!(grid.nrows(), 2);
        assert_eq!(Grid::new(0).ncols, 1);
    }

    #[test]
    fn test_tabs_keep_order() {
        let tabs = Tabs::new(TabLocation::parse("LEFT"))
            .with_tab("Financial Overview", Column::new())
            .with_tab("Key Metrics", Grid::new(2));
        assert_eq!(tabs.location, TabLocation::Left);
        assert_eq!(tabs.titles(), vec!["Financial Overview", "Key Metrics"]);
    }
}
