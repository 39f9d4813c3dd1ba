//! Loaded and cleaned statement tables
//!
//! `load_financial_data` is the Load + Clean + Scale + Rename stage: it checks
//! that every required sheet exists before reading any of them, so a missing
//! sheet aborts without producing partial tables.

use super::clean::{clean_statement, column_dates, column_f64, has_column, CleanReport};
use super::error::{DashboardError, Result};
use super::source::SheetSource;
use super::statements::Statement;
use super::table::sheet_to_dataframe;
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use tracing::info;

/// One cleaned statement, keyed by its date column
#[derive(Debug, Clone)]
pub struct StatementTable {
    statement: Statement,
    frame: DataFrame,
    report: CleanReport,
}

impl StatementTable {
    pub fn new(statement: Statement, frame: DataFrame, report: CleanReport) -> Self {
        Self {
            statement,
            frame,
            report,
        }
    }

    pub fn statement(&self) -> Statement {
        self.statement
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn report(&self) -> &CleanReport {
        &self.report
    }

    pub fn date_column(&self) -> &'static str {
        self.statement.date_column()
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        has_column(&self.frame, name)
    }

    /// First and last reporting date
    pub fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let dates: Vec<NaiveDate> = column_dates(&self.frame, self.date_column())?
            .into_iter()
            .flatten()
            .collect();
        Ok(dates.first().copied().zip(dates.last().copied()))
    }

    /// (date, value) pairs for a column, or `None` if the column is absent
    pub fn time_series(&self, column: &str) -> Result<Option<Vec<(NaiveDate, f64)>>> {
        if !self.has_column(column) {
            return Ok(None);
        }
        let dates = column_dates(&self.frame, self.date_column())?;
        let values = column_f64(&self.frame, column)?;
        let points = dates
            .into_iter()
            .zip(values)
            .filter_map(|pair| match pair {
                (Some(d), Some(v)) => Some((d, v)),
                _ => None,
            })
            .collect();
        Ok(Some(points))
    }

    /// Non-null values of a column, or `None` if the column is absent
    pub fn values(&self, column: &str) -> Result<Option<Vec<f64>>> {
        if !self.has_column(column) {
            return Ok(None);
        }
        Ok(Some(column_f64(&self.frame, column)?.into_iter().flatten().collect()))
    }
}

/// The four statements of one workbook
#[derive(Debug, Clone)]
pub struct FinancialData {
    pub income: StatementTable,
    pub balance: StatementTable,
    pub cash_flow: StatementTable,
    pub stock: StatementTable,
}

impl FinancialData {
    pub fn table(&self, statement: Statement) -> &StatementTable {
        match statement {
            Statement::Income => &self.income,
            Statement::Balance => &self.balance,
            Statement::CashFlow => &self.cash_flow,
            Statement::QuarterlyStock => &self.stock,
        }
    }

    pub fn tables(&self) -> [&StatementTable; 4] {
        [&self.income, &self.balance, &self.cash_flow, &self.stock]
    }
}

/// Load, clean and scale all four statements from a source
pub fn load_financial_data<S: SheetSource>(source: &mut S) -> Result<FinancialData> {
    info!(source = %source.describe(), "loading workbook");

    if let Some(missing) = Statement::ALL
        .iter()
        .find(|s| !source.has_sheet(s.sheet_name()))
    {
        return Err(DashboardError::SheetNotFound(missing.sheet_name().to_string()));
    }

    let mut tables = Vec::with_capacity(Statement::ALL.len());
    for statement in Statement::ALL {
        tables.push(load_statement(source, statement)?);
    }

    let mut tables = tables.into_iter();
    match (tables.next(), tables.next(), tables.next(), tables.next()) {
        (Some(income), Some(balance), Some(cash_flow), Some(stock)) => Ok(FinancialData {
            income,
            balance,
            cash_flow,
            stock,
        }),
        _ => Err(DashboardError::Other(
            "statement list is incomplete".to_string(),
        )),
    }
}

fn load_statement<S: SheetSource>(source: &mut S, statement: Statement) -> Result<StatementTable> {
    let sheet = source.read_sheet(statement.sheet_name())?;
    let raw = sheet_to_dataframe(&sheet)?;
    let (frame, report) = clean_statement(statement, raw)?;

    info!(
        sheet = statement.sheet_name(),
        rows = frame.height(),
        columns = frame.width(),
        scaled = report.scaled.len(),
        renamed = report.renamed.len(),
        "statement cleaned"
    );

    Ok(StatementTable::new(statement, frame, report))
}
