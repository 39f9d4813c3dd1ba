//! Shared dashboard pipeline
//!
//! This module contains the dashboard generation logic shared by every
//! command of the binary (render, serve, inspect).
//!
//! The pipeline:
//! 1. Loads the four statements from the workbook
//! 2. Cleans, renames and scales them (see `finance::clean`)
//! 3. Renders the charts of each tab
//! 4. Composes the tabs into one page

use crate::charts::{
    render_hexbin, render_histogram, render_line, render_scatter, ChartSpec, ChartStyle,
};
use crate::config::{DashboardConfig, PlotSize};
use crate::dashboard::{render_page, Column, Grid, Pane, Tabs};
use crate::finance::error::Result;
use crate::finance::merge::{merge_on_date, paired_values, JoinStrategy, MergeSide};
use crate::finance::{load_financial_data, FinancialData, Statement, StatementTable, XlsxSource};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

pub const OVERVIEW_TAB: &str = "Financial Overview";
pub const KEY_METRICS_TAB: &str = "Key Metrics";
pub const HEATMAP_TAB: &str = "Heatmap Analysis";

const MILLION_USD: &str = "Million USD";
const NET_INCOME_LABEL: &str = "Net Income (Million USD)";
const DIVIDEND_LABEL: &str = "Dividend Payout (Million USD)";

/// Open the workbook at `path` and load all four statements
pub fn load_workbook(path: impl AsRef<Path>) -> Result<FinancialData> {
    let t0 = Instant::now();
    let mut source = XlsxSource::open(path)?;
    let data = load_financial_data(&mut source)?;
    info!(elapsed_ms = t0.elapsed().as_millis() as u64, "workbook loaded");
    Ok(data)
}

fn spec(title: &str, size: PlotSize) -> ChartSpec {
    ChartSpec::new(title, size.width, size.height)
}

/// Line chart of one metric over time, or a placeholder when it cannot be drawn
///
/// A column absent from the table yields the "not found" text instead of an
/// error; a present column without any value yields a "no data" text.
pub fn metric_line_pane(
    table: &StatementTable,
    column: &str,
    spec: ChartSpec,
    style: &ChartStyle,
) -> Result<Pane> {
    let points = match table.time_series(column)? {
        Some(points) => points,
        None => {
            debug!(sheet = %table.statement(), column, "metric not found, using placeholder");
            return Ok(Pane::missing_metric(column));
        }
    };
    if points.is_empty() {
        return Ok(no_data(&spec.title));
    }
    Ok(render_line(&spec, style, &points)?.into())
}

fn no_data(title: &str) -> Pane {
    Pane::markdown(format!("No data available for '{}'.", title))
}

/// Paired values of two metrics from different statements
#[derive(Debug, Clone, PartialEq)]
pub enum MetricPairs {
    /// The named metric is absent from its statement
    Missing(&'static str),
    /// (x, y) pairs on the dates both statements share
    Points(Vec<(f64, f64)>),
}

/// Net income against dividend payout, matched on the reporting date
pub fn net_income_vs_dividend(data: &FinancialData, how: JoinStrategy) -> Result<MetricPairs> {
    for (table, column) in [(&data.income, "netIncome"), (&data.cash_flow, "dividendPayout")] {
        if !table.has_column(column) {
            return Ok(MetricPairs::Missing(column));
        }
    }

    let merged = merge_on_date(
        MergeSide {
            frame: data.income.frame(),
            date_column: data.income.date_column(),
            value_column: "netIncome",
        },
        MergeSide {
            frame: data.cash_flow.frame(),
            date_column: data.cash_flow.date_column(),
            value_column: "dividendPayout",
        },
        how,
    )?;

    let points = match merged {
        Some(df) => paired_values(&df, "netIncome", "dividendPayout")?,
        None => Vec::new(),
    };
    debug!(pairs = points.len(), ?how, "merged net income and dividend payout");
    Ok(MetricPairs::Points(points))
}

/// Tab 1: heading plus one line chart per statement metric
pub fn overview_tab(data: &FinancialData, config: &DashboardConfig) -> Result<Column> {
    let style = config.chart_style();
    let mut column = Column::new().push(Pane::markdown(format!("# {}", config.dashboard_title())));

    for statement in [Statement::Income, Statement::Balance, Statement::CashFlow] {
        let table = data.table(statement);
        column = column.push(Pane::markdown(format!("## {}", statement.section_title())));
        for plot in statement.overview_plots() {
            let chart_spec = spec(plot.title, config.overview_size)
                .x_label("Date")
                .y_label(MILLION_USD);
            column = column.push(metric_line_pane(table, plot.column, chart_spec, &style)?);
        }
    }

    Ok(column)
}

/// Tab 2: 2×2 grid of dividend histogram, EPS, capital expenditures and the scatter
pub fn key_metrics_tab(
    data: &FinancialData,
    pairs: &MetricPairs,
    config: &DashboardConfig,
) -> Result<Grid> {
    let style = config.chart_style();
    let size = config.grid_size;

    let histogram_title = "Distribution of Dividend Payout";
    let histogram = match data.cash_flow.values("dividendPayout")? {
        None => Pane::missing_metric("dividendPayout"),
        Some(values) if values.is_empty() => no_data(histogram_title),
        Some(values) => render_histogram(
            &spec(histogram_title, size)
                .x_label(DIVIDEND_LABEL)
                .y_label("Count"),
            &style,
            &values,
            config.histogram_bins,
        )?
        .into(),
    };

    let eps = metric_line_pane(
        &data.stock,
        "EPS",
        spec("EPS Over Time", size).x_label("Date").y_label("EPS (USD)"),
        &style,
    )?;

    let capex = metric_line_pane(
        &data.cash_flow,
        "capitalExpenditures",
        spec("Capital Expenditures Over Time", size)
            .x_label("Date")
            .y_label(MILLION_USD),
        &style,
    )?;

    let scatter_title = "Net Income vs Dividend Payout";
    let scatter = match pairs {
        MetricPairs::Missing(metric) => Pane::missing_metric(metric),
        MetricPairs::Points(points) if points.is_empty() => no_data(scatter_title),
        MetricPairs::Points(points) => render_scatter(
            &spec(scatter_title, size)
                .x_label(NET_INCOME_LABEL)
                .y_label(DIVIDEND_LABEL),
            &style,
            points,
        )?
        .into(),
    };

    Ok(Grid::new(2).push(histogram).push(eps).push(capex).push(scatter))
}

/// Tab 3: heading plus the hexbin density of net income vs dividend payout
pub fn heatmap_tab(
    pairs: &MetricPairs,
    config: &DashboardConfig,
) -> Result<Column> {
    let title = "Net Income vs Dividend Payout Heatmap";
    let chart = match pairs {
        MetricPairs::Missing(metric) => Pane::missing_metric(metric),
        MetricPairs::Points(points) if points.is_empty() => no_data(title),
        MetricPairs::Points(points) => render_hexbin(
            &spec(title, config.heatmap_size)
                .x_label(NET_INCOME_LABEL)
                .y_label(DIVIDEND_LABEL),
            &config.chart_style(),
            points,
            config.hexbin_gridsize,
        )?
        .into(),
    };

    Ok(Column::new()
        .push(Pane::markdown(format!("# {}", title)))
        .push(chart))
}

/// Build the three tabs from cleaned statements
pub fn build_dashboard(data: &FinancialData, config: &DashboardConfig) -> Result<Tabs> {
    let t0 = Instant::now();

    let pairs = net_income_vs_dividend(data, config.join)?;

    let tabs = Tabs::new(config.tab_location)
        .with_tab(OVERVIEW_TAB, overview_tab(data, config)?)
        .with_tab(KEY_METRICS_TAB, key_metrics_tab(data, &pairs, config)?)
        .with_tab(HEATMAP_TAB, heatmap_tab(&pairs, config)?);

    for tab in &tabs.tabs {
        for chart in tab.content.charts() {
            debug!(tab = %tab.title, kind = chart.kind.as_str(), title = %chart.title, "chart rendered");
        }
    }

    let charts: usize = tabs.tabs.iter().map(|t| t.content.chart_count()).sum();
    info!(
        tabs = ?tabs.titles(),
        charts,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "dashboard composed"
    );
    Ok(tabs)
}

/// Build the dashboard and render it to a self-contained HTML page
pub fn render_dashboard_html(data: &FinancialData, config: &DashboardConfig) -> Result<String> {
    let tabs = build_dashboard(data, config)?;
    Ok(render_page(&tabs, &config.dashboard_title()))
}

/// Render the dashboard and write it to `path`, returning the page size in bytes
pub fn write_dashboard_html(
    data: &FinancialData,
    config: &DashboardConfig,
    path: impl AsRef<Path>,
) -> Result<usize> {
    let page = render_dashboard_html(data, config)?;
    std::fs::write(path.as_ref(), page.as_bytes())?;
    info!(path = %path.as_ref().display(), bytes = page.len(), "dashboard written");
    Ok(page.len())
}
