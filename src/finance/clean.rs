//! Statement cleaning
//!
//! Applied to every statement frame in this order:
//! 1. fix known misspelled column names
//! 2. parse the date column into a Date column
//! 3. make the date the lookup key (no nulls, no duplicates, sorted ascending)
//! 4. replace missing numeric values with zero
//! 5. scale the monetary columns to millions
//!
//! Renaming runs before scaling so a corrected column is scaled like any other
//! configured metric.

use super::cells::{date_to_epoch_days, epoch_days_to_date, excel_serial_to_date, parse_date};
use super::error::{DashboardError, Result};
use super::statements::Statement;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Divisor used to express monetary values in millions
pub const MILLION: f64 = 1_000_000.0;

/// Check for a column by name
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Rename known misspelled columns
///
/// When both spellings are present the correctly-spelled column wins and the
/// misspelled one is dropped. Returns the renames that were applied.
pub fn fix_column_names(
    df: &mut DataFrame,
    sheet: &str,
    fixes: &[(&str, &str)],
) -> Result<Vec<(String, String)>> {
    let mut applied = Vec::new();

    for (wrong, right) in fixes {
        if !has_column(df, wrong) {
            continue;
        }
        if has_column(df, right) {
            warn!(
                sheet,
                misspelled = wrong,
                correct = right,
                "both spellings present, dropping the misspelled column"
            );
            df.drop_in_place(wrong)?;
            continue;
        }

        df.rename(wrong, (*right).into())?;
        debug!(sheet, from = wrong, to = right, "renamed column");
        applied.push((wrong.to_string(), right.to_string()));
    }

    Ok(applied)
}

/// Parse the date column into a polars Date column in place
pub fn parse_date_column(df: &mut DataFrame, sheet: &str, column: &str) -> Result<()> {
    let series = df
        .column(column)
        .map_err(|_| DashboardError::MissingColumn {
            sheet: sheet.to_string(),
            column: column.to_string(),
        })?
        .as_materialized_series()
        .clone();

    let days: Vec<Option<i32>> = match series.dtype() {
        DataType::Date => return Ok(()),
        DataType::String => series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(text) => parse_date(text)
                    .map(|d| Some(date_to_epoch_days(d)))
                    .ok_or_else(|| invalid_date(sheet, row, text)),
            })
            .collect::<Result<_>>()?,
        DataType::Float64 => series
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(v) => numeric_date(v)
                    .map(|d| Some(date_to_epoch_days(d)))
                    .ok_or_else(|| invalid_date(sheet, row, &v.to_string())),
            })
            .collect::<Result<_>>()?,
        other => {
            return Err(DashboardError::Other(format!(
                "sheet '{}': date column '{}' has unsupported type {:?}",
                sheet, column, other
            )))
        }
    };

    let parsed = Series::new(column.into(), days).cast(&DataType::Date)?;
    df.with_column(parsed)?;
    Ok(())
}

/// Numbers in a date column: `YYYYMMDD` integers or Excel serial days
fn numeric_date(value: f64) -> Option<NaiveDate> {
    if value.fract() == 0.0 && (19_000_101.0..=29_991_231.0).contains(&value) {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("{}", value as i64), "%Y%m%d") {
            return Some(d);
        }
    }
    excel_serial_to_date(value)
}

fn invalid_date(sheet: &str, row: usize, value: &str) -> DashboardError {
    DashboardError::InvalidDate {
        sheet: sheet.to_string(),
        row: row + 1,
        value: value.to_string(),
    }
}

/// Read a Date column as calendar dates (nulls preserved)
pub fn column_dates(df: &DataFrame, column: &str) -> Result<Vec<Option<NaiveDate>>> {
    let days = df
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::Int32)?;
    let dates = days
        .i32()?
        .into_iter()
        .map(|d| d.and_then(epoch_days_to_date))
        .collect();
    Ok(dates)
}

/// Read a numeric column as f64 values (nulls preserved)
pub fn column_f64(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    let values = df
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

/// Make the date column a usable lookup key: no nulls, unique, ascending
pub fn index_by_date(df: DataFrame, sheet: &str, column: &str) -> Result<DataFrame> {
    let dates = column_dates(&df, column)?;
    let mut seen = HashSet::with_capacity(dates.len());

    for (row, date) in dates.iter().enumerate() {
        let date = date.ok_or_else(|| invalid_date(sheet, row, "<missing>"))?;
        if !seen.insert(date) {
            return Err(DashboardError::DuplicateDate {
                sheet: sheet.to_string(),
                date: date.format("%Y-%m-%d").to_string(),
            });
        }
    }

    Ok(df.sort([column], SortMultipleOptions::default())?)
}

/// Replace nulls in every numeric column with zero
///
/// Returns the names of the columns that had missing values.
pub fn fill_missing_with_zero(df: &mut DataFrame) -> Result<Vec<String>> {
    let targets: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| is_numeric(c.dtype()) && c.null_count() > 0)
        .map(|c| c.name().to_string())
        .collect();

    for name in &targets {
        let filled = df
            .column(name)?
            .as_materialized_series()
            .fill_null(FillNullStrategy::Zero)?;
        df.with_column(filled)?;
    }

    Ok(targets)
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::Int16
            | DataType::Int8
            | DataType::UInt64
            | DataType::UInt32
            | DataType::UInt16
            | DataType::UInt8
    )
}

/// Convert the listed columns to Float64 millions
///
/// Absent columns are skipped. Returns the columns that were scaled.
pub fn scale_to_millions(df: &mut DataFrame, sheet: &str, columns: &[&str]) -> Result<Vec<String>> {
    let mut scaled = Vec::new();

    for &name in columns {
        if !has_column(df, name) {
            debug!(sheet, column = name, "metric not present, not scaled");
            continue;
        }

        let dtype = df.column(name)?.dtype().clone();
        if !is_numeric(&dtype) {
            return Err(DashboardError::NonNumericColumn {
                sheet: sheet.to_string(),
                column: name.to_string(),
            });
        }

        let values: Vec<Option<f64>> = column_f64(df, name)?
            .into_iter()
            .map(|v| v.map(|x| x / MILLION))
            .collect();
        df.with_column(Series::new(name.into(), values))?;
        scaled.push(name.to_string());
    }

    Ok(scaled)
}

/// Outcome of cleaning one statement
#[derive(Debug, Clone)]
pub struct CleanReport {
    pub renamed: Vec<(String, String)>,
    pub zero_filled: Vec<String>,
    pub scaled: Vec<String>,
}

/// Run the full cleaning sequence for one statement
pub fn clean_statement(statement: Statement, df: DataFrame) -> Result<(DataFrame, CleanReport)> {
    let sheet = statement.sheet_name();
    let date_column = statement.date_column();
    let mut df = df;

    let renamed = fix_column_names(&mut df, sheet, statement.column_fixes())?;
    parse_date_column(&mut df, sheet, date_column)?;
    let mut df = index_by_date(df, sheet, date_column)?;
    let zero_filled = fill_missing_with_zero(&mut df)?;
    let scaled = scale_to_millions(&mut df, sheet, statement.monetary_metrics())?;

    Ok((
        df,
        CleanReport {
            renamed,
            zero_filled,
            scaled,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn income_frame() -> DataFrame {
        df! {
            "fiscalDateEnding" => ["2023-12-30", "2021-12-25", "2022-12-31"],
            "reportedCurrency" => ["USD", "USD", "USD"],
            "totalRevenue" => [Some(54_228_000_000.0), Some(79_024_000_000.0), Some(63_054_000_000.0)],
            "opeartingIncome" => [Some(93_000_000.0), None, Some(2_334_000_000.0)],
            "netIncome" => [Some(1_689_000_000.0), Some(19_868_000_000.0), None]
        }
        .unwrap()
    }

    #[test]
    fn test_clean_income_statement() {
        let (df, report) = clean_statement(Statement::Income, income_frame()).unwrap();

        // Sorted ascending by date
        let dates = column_dates(&df, "fiscalDateEnding").unwrap();
        assert_eq!(
            dates,
            vec![
                Some(ymd(2021, 12, 25)),
                Some(ymd(2022, 12, 31)),
                Some(ymd(2023, 12, 30))
            ]
        );
        assert_eq!(df.column("fiscalDateEnding").unwrap().dtype(), &DataType::Date);

        // Scaled to millions, in date order
        let revenue = column_f64(&df, "totalRevenue").unwrap();
        assert_eq!(revenue, vec![Some(79_024.0), Some(63_054.0), Some(54_228.0)]);

        // Typo fixed, then scaled; missing value filled with zero
        assert!(!has_column(&df, "opeartingIncome"));
        let operating = column_f64(&df, "operatingIncome").unwrap();
        assert_eq!(operating, vec![Some(0.0), Some(2_334.0), Some(93.0)]);

        let net = column_f64(&df, "netIncome").unwrap();
        assert_eq!(net, vec![Some(19_868.0), Some(0.0), Some(1_689.0)]);

        assert_eq!(
            report.renamed,
            vec![("opeartingIncome".to_string(), "operatingIncome".to_string())]
        );
        assert!(report.scaled.contains(&"operatingIncome".to_string()));
        assert!(!report.scaled.contains(&"depreciation".to_string()));
        assert_eq!(report.zero_filled.len(), 2);
    }

    #[test]
    fn test_per_share_columns_untouched() {
        let df = df! {
            "Quarter End Date" => ["2023-12-30", "2023-09-30"],
            "EPS" => [Some(0.63), None]
        }
        .unwrap();

        let (df, report) = clean_statement(Statement::QuarterlyStock, df).unwrap();
        assert!(report.scaled.is_empty());
        assert_eq!(column_f64(&df, "EPS").unwrap(), vec![Some(0.0), Some(0.63)]);
    }

    #[test]
    fn test_rename_keeps_values() {
        let mut df = df! {
            "capitalExpenditure" => [1.0, 2.0, 3.0]
        }
        .unwrap();

        let renamed = fix_column_names(
            &mut df,
            "Cash Flow Statement",
            Statement::CashFlow.column_fixes(),
        )
        .unwrap();

        assert_eq!(renamed.len(), 1);
        assert!(!has_column(&df, "capitalExpenditure"));
        assert_eq!(
            column_f64(&df, "capitalExpenditures").unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
    }

    #[test]
    fn test_rename_when_both_spellings_exist() {
        let mut df = df! {
            "capitalExpenditure" => [9.0],
            "capitalExpenditures" => [1.0]
        }
        .unwrap();

        let renamed = fix_column_names(&mut df, "s", Statement::CashFlow.column_fixes()).unwrap();
        assert!(renamed.is_empty());
        assert_eq!(df.width(), 1);
        assert_eq!(column_f64(&df, "capitalExpenditures").unwrap(), vec![Some(1.0)]);
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let df = df! {
            "fiscalDateEnding" => ["2023-12-30", "2023-12-30"],
            "netIncome" => [1.0, 2.0]
        }
        .unwrap();

        match clean_statement(Statement::Income, df) {
            Err(DashboardError::DuplicateDate { date, .. }) => assert_eq!(date, "2023-12-30"),
            other => panic!("expected DuplicateDate, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_or_bad_dates_rejected() {
        let df = df! {
            "fiscalDateEnding" => [Some("2023-12-30"), None],
            "netIncome" => [1.0, 2.0]
        }
        .unwrap();
        assert!(matches!(
            clean_statement(Statement::Income, df),
            Err(DashboardError::InvalidDate { row: 2, .. })
        ));

        let df = df! {
            "fiscalDateEnding" => ["2023-12-30", "FY2022"],
            "netIncome" => [1.0, 2.0]
        }
        .unwrap();
        assert!(matches!(
            clean_statement(Statement::Income, df),
            Err(DashboardError::InvalidDate { ref value, .. }) if value == "FY2022"
        ));
    }

    #[test]
    fn test_missing_date_column() {
        let df = df! { "netIncome" => [1.0] }.unwrap();
        assert!(matches!(
            clean_statement(Statement::Income, df),
            Err(DashboardError::MissingColumn { ref column, .. }) if column == "fiscalDateEnding"
        ));
    }

    #[test]
    fn test_numeric_dates() {
        assert_eq!(numeric_date(20231230.0), Some(ymd(2023, 12, 30)));
        assert_eq!(numeric_date(45291.0), Some(ymd(2023, 12, 31)));
    }

    #[test]
    fn test_non_numeric_metric_rejected() {
        let mut df = df! { "netIncome" => ["lots"] }.unwrap();
        assert!(matches!(
            scale_to_millions(&mut df, "Income Statement", &["netIncome"]),
            Err(DashboardError::NonNumericColumn { .. })
        ));
    }
}
