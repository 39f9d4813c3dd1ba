//! Financial Data Dashboard Library
//!
//! Loads a four-sheet financial statement workbook, cleans and rescales it,
//! renders the charts with plotters and composes them into a tabbed HTML page.
//!
//! Module organization:
//! - `finance`: workbook ingestion, cleaning, merging and properties
//! - `charts`: SVG chart renderers
//! - `dashboard`: layout model, HTML page and local server
//! - `config`: Dashboard configuration
//! - `pipeline`: load → clean → plot → compose, shared by all commands

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod finance;
pub mod pipeline;

pub use config::DashboardConfig;
pub use finance::{DashboardError, Result};
