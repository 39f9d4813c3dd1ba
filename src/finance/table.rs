//! Raw sheet to Polars DataFrame conversion
//!
//! The first non-empty row is the header. Each column's type is inferred from
//! its non-missing cells:
//! - all numbers → Float64
//! - all dates → Date
//! - anything else → String (numbers and dates rendered as text)

use super::cells::{date_to_epoch_days, CellValue};
use super::error::{DashboardError, Result};
use super::source::RawSheet;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{debug, warn};

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Inferred column type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Date,
    Text,
}

/// Convert a raw sheet into a DataFrame
pub fn sheet_to_dataframe(sheet: &RawSheet) -> Result<DataFrame> {
    let mut rows = sheet
        .rows
        .iter()
        .filter(|row| !row.iter().all(CellValue::is_empty));

    let header_row = rows
        .next()
        .ok_or_else(|| DashboardError::EmptySheet(sheet.name.clone()))?;
    let data_rows: Vec<&Vec<CellValue>> = rows.collect();

    if data_rows.is_empty() {
        return Err(DashboardError::EmptySheet(sheet.name.clone()));
    }

    let width = header_row.len();
    let headers = header_names(&sheet.name, header_row);

    let mut columns = Vec::with_capacity(width);
    for (idx, name) in headers.iter().enumerate() {
        let cells: Vec<&CellValue> = data_rows
            .iter()
            .map(|row| row.get(idx).unwrap_or(&EMPTY_CELL))
            .collect();

        let kind = infer_kind(&cells);
        debug!(sheet = %sheet.name, column = %name, ?kind, "inferred column type");
        columns.push(build_column(name, kind, &cells)?);
    }

    // Cells past the header width have no name and are dropped
    let overflow = data_rows.iter().filter(|row| row.len() > width).count();
    if overflow > 0 {
        warn!(
            sheet = %sheet.name,
            rows = overflow,
            "ignoring cells beyond the header width"
        );
    }

    Ok(DataFrame::new(columns)?)
}

/// Resolve header names: blank → `Unnamed: <idx>`, duplicates → `name.1`, `name.2`, ...
fn header_names(sheet: &str, header_row: &[CellValue]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(header_row.len());

    for (idx, cell) in header_row.iter().enumerate() {
        let base = cell
            .as_text()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("Unnamed: {}", idx));

        let count = seen.entry(base.clone()).or_insert(0);
        let name = if *count == 0 {
            base.clone()
        } else {
            warn!(sheet, column = %base, "duplicate header name");
            format!("{}.{}", base, count)
        };
        *count += 1;
        names.push(name);
    }

    names
}

/// Infer the column type from its non-missing cells
pub fn infer_kind(cells: &[&CellValue]) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;

    for cell in cells {
        let cell_kind = match cell {
            CellValue::Empty => continue,
            CellValue::Number(_) => ColumnKind::Numeric,
            CellValue::Date(_) => ColumnKind::Date,
            CellValue::Text(_) => return ColumnKind::Text,
        };
        match kind {
            None => kind = Some(cell_kind),
            Some(k) if k != cell_kind => return ColumnKind::Text,
            _ => {}
        }
    }

    // A column with nothing in it is numeric: missing numbers become zero later
    kind.unwrap_or(ColumnKind::Numeric)
}

fn build_column(name: &str, kind: ColumnKind, cells: &[&CellValue]) -> Result<Column> {
    let series = match kind {
        ColumnKind::Numeric => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|c| match c {
                    CellValue::Number(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Date => {
            let days: Vec<Option<i32>> = cells
                .iter()
                .map(|c| match c {
                    CellValue::Date(d) => Some(date_to_epoch_days(*d)),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), days).cast(&DataType::Date)?
        }
        ColumnKind::Text => {
            let values: Vec<Option<String>> = cells.iter().map(|c| c.as_text()).collect();
            Series::new(name.into(), values)
        }
    };

    Ok(Column::from(series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn num(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_sheet_to_dataframe_types() {
        let sheet = RawSheet::with_header(
            "Income Statement",
            &["fiscalDateEnding", "reportedCurrency", "netIncome"],
            vec![
                vec![text("2023-12-30"), text("USD"), num(1_689_000_000.0)],
                vec![text("2022-12-31"), text("USD"), CellValue::Empty],
            ],
        );

        let df = sheet_to_dataframe(&sheet).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("fiscalDateEnding").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("reportedCurrency").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("netIncome").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("netIncome").unwrap().null_count(), 1);
    }

    #[test]
    fn test_date_cells_become_date_column() {
        let d = NaiveDate::from_ymd_opt(2023, 12, 30).unwrap();
        let sheet = RawSheet::with_header(
            "Quarterly Stock Data",
            &["Quarter End Date", "EPS"],
            vec![vec![CellValue::Date(d), num(0.54)]],
        );

        let df = sheet_to_dataframe(&sheet).unwrap();
        assert_eq!(df.column("Quarter End Date").unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn test_header_names_blank_and_duplicates() {
        let names = header_names(
            "s",
            &[text("a"), CellValue::Empty, text("a"), text(" b "), text("a")],
        );
        assert_eq!(names, vec!["a", "Unnamed: 1", "a.1", "b", "a.2"]);
    }

    #[test]
    fn test_empty_rows_skipped() {
        let sheet = RawSheet::new(
            "Balance Sheet",
            vec![
                vec![CellValue::Empty, CellValue::Empty],
                vec![text("fiscalDateEnding"), text("totalAssets")],
                vec![text("2023-12-30"), num(191_572_000_000.0)],
                vec![CellValue::Empty, CellValue::Empty],
            ],
        );

        let df = sheet_to_dataframe(&sheet).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.get_column_index("totalAssets"), Some(1));
    }

    #[test]
    fn test_short_rows_padded_with_nulls() {
        let sheet = RawSheet::with_header(
            "Cash Flow Statement",
            &["fiscalDateEnding", "dividendPayout"],
            vec![vec![text("2023-12-30")]],
        );

        let df = sheet_to_dataframe(&sheet).unwrap();
        assert_eq!(df.column("dividendPayout").unwrap().null_count(), 1);
    }

    #[test]
    fn test_header_only_sheet_is_empty() {
        let sheet = RawSheet::with_header("Balance Sheet", &["fiscalDateEnding"], vec![]);
        assert!(matches!(
            sheet_to_dataframe(&sheet),
            Err(DashboardError::EmptySheet(_))
        ));

        let blank = RawSheet::new("Balance Sheet", vec![]);
        assert!(matches!(
            sheet_to_dataframe(&blank),
            Err(DashboardError::EmptySheet(_))
        ));
    }

    #[test]
    fn test_infer_kind_mixed() {
        let n = num(1.0);
        let t = text("x");
        let e = CellValue::Empty;
        assert_eq!(infer_kind(&[&n, &e]), ColumnKind::Numeric);
        assert_eq!(infer_kind(&[&n, &t]), ColumnKind::Text);
        assert_eq!(infer_kind(&[&e, &e]), ColumnKind::Numeric);
    }
}
