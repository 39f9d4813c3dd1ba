use thiserror::Error;

/// Errors that can occur while loading, cleaning or rendering the dashboard
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Input workbook does not exist
    #[error("file '{0}' was not found")]
    FileNotFound(String),

    /// A required sheet is missing from the workbook
    #[error("sheet name '{0}' not found in the workbook")]
    SheetNotFound(String),

    /// Workbook could not be opened or a sheet could not be read
    #[error("workbook error: {0}")]
    Workbook(String),

    /// Sheet has a header but no data rows
    #[error("sheet '{0}' contains no data rows")]
    EmptySheet(String),

    /// Expected column (usually the date column) is absent
    #[error("sheet '{sheet}' has no column '{column}'")]
    MissingColumn { sheet: String, column: String },

    /// Date cell that could not be parsed
    #[error("sheet '{sheet}', row {row}: cannot parse '{value}' as a date")]
    InvalidDate {
        sheet: String,
        row: usize,
        value: String,
    },

    /// Date column is not usable as a unique lookup key
    #[error("sheet '{sheet}': date {date} appears more than once")]
    DuplicateDate { sheet: String, date: String },

    /// Monetary column holds values that are not numbers
    #[error("sheet '{sheet}': column '{column}' is not numeric")]
    NonNumericColumn { sheet: String, column: String },

    /// Polars operation failed
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Chart rendering failed
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration error (bad config file, invalid property file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl DashboardError {
    /// Build a render error from any plotters drawing error
    pub fn render(err: impl std::fmt::Display) -> Self {
        DashboardError::Render(err.to_string())
    }
}

/// Type alias for Results using DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;
