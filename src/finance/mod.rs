//! Financial statement ingestion
//!
//! Structure:
//! - `source.rs`: SheetSource trait, calamine workbook source, in-memory source
//! - `cells.rs` / `table.rs`: cell decoding and sheet → DataFrame conversion
//! - `clean.rs`: renames, date index, zero fill, scaling to millions
//! - `dataset.rs`: the four cleaned statement tables
//! - `merge.rs`: date-keyed joins across statements
//! - `properties.rs`: dashboard.json property registry
//! - `error.rs`: Error types

pub mod cells;
pub mod clean;
pub mod dataset;
pub mod error;
pub mod merge;
pub mod properties;
pub mod source;
pub mod statements;
pub mod table;

// Re-exports for convenience
pub use dataset::{load_financial_data, FinancialData, StatementTable};
pub use error::{DashboardError, Result};
pub use merge::{merge_on_date, JoinStrategy, MergeSide};
pub use source::{MemorySource, RawSheet, SheetSource, XlsxSource};
pub use statements::{MetricPlot, Statement};
