//! Workbook sources
//!
//! `SheetSource` abstracts where the named sheets come from so the loader runs
//! the same against a real workbook (`XlsxSource`, backed by calamine) and an
//! in-memory set of sheets (`MemorySource`).

use super::cells::CellValue;
use super::error::{DashboardError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A sheet as read from the workbook: every row of decoded cells
///
/// Header detection happens later, in the table conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Build a sheet from a header row and rows of cells
    pub fn with_header(name: impl Into<String>, header: &[&str], rows: Vec<Vec<CellValue>>) -> Self {
        let mut all_rows = Vec::with_capacity(rows.len() + 1);
        all_rows.push(
            header
                .iter()
                .map(|h| CellValue::Text(h.to_string()))
                .collect(),
        );
        all_rows.extend(rows);
        Self::new(name, all_rows)
    }
}

/// Anything that can hand out named sheets
pub trait SheetSource {
    /// Human-readable origin (file path, "memory", ...)
    fn describe(&self) -> String;

    /// Names of the sheets available in this source
    fn sheet_names(&self) -> Vec<String>;

    /// Read one sheet by name
    fn read_sheet(&mut self, name: &str) -> Result<RawSheet>;

    /// Whether a sheet with this exact name exists
    fn has_sheet(&self, name: &str) -> bool {
        self.sheet_names().iter().any(|n| n == name)
    }
}

/// Workbook file read through calamine (xlsx, xlsm, xls, ods)
pub struct XlsxSource {
    path: PathBuf,
    workbook: Sheets<BufReader<File>>,
}

impl XlsxSource {
    /// Open a workbook, reporting a missing file distinctly from a corrupt one
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DashboardError::FileNotFound(path.display().to_string()));
        }

        let workbook = open_workbook_auto(path).map_err(|e| {
            DashboardError::Workbook(format!("cannot open '{}': {}", path.display(), e))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            workbook,
        })
    }
}

impl SheetSource for XlsxSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    fn read_sheet(&mut self, name: &str) -> Result<RawSheet> {
        let range = self
            .workbook
            .worksheet_range(name)
            .map_err(|e| DashboardError::Workbook(format!("cannot read sheet '{}': {}", name, e)))?;

        debug!(sheet = name, size = ?range.get_size(), "read worksheet range");
        Ok(range_to_sheet(name, &range))
    }
}

fn range_to_sheet(name: &str, range: &Range<Data>) -> RawSheet {
    let rows = range
        .rows()
        .map(|row| row.iter().map(CellValue::from).collect())
        .collect();
    RawSheet::new(name, rows)
}

/// Sheets held in memory, in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sheets: Vec<RawSheet>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a sheet
    pub fn with_sheet(mut self, sheet: RawSheet) -> Self {
        self.sheets.retain(|s| s.name != sheet.name);
        self.sheets.push(sheet);
        self
    }
}

impl SheetSource for MemorySource {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn read_sheet(&mut self, name: &str) -> Result<RawSheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| DashboardError::SheetNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does_not_exist.xlsx");
        match XlsxSource::open(&path) {
            Err(DashboardError::FileNotFound(p)) => assert!(p.ends_with("does_not_exist.xlsx")),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected FileNotFound"),
        }
    }

    #[test]
    fn test_open_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();
        assert!(matches!(
            XlsxSource::open(&path),
            Err(DashboardError::Workbook(_))
        ));
    }

    #[test]
    fn test_range_to_sheet() {
        let mut range: Range<Data> = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("fiscalDateEnding".into()));
        range.set_value((0, 1), Data::String("netIncome".into()));
        range.set_value((1, 0), Data::String("2023-12-30".into()));
        range.set_value((1, 1), Data::Float(1_689_000_000.0));

        let sheet = range_to_sheet("Income Statement", &range);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][1], CellValue::Text("netIncome".into()));
        assert_eq!(sheet.rows[1][1], CellValue::Number(1_689_000_000.0));
    }

    #[test]
    fn test_memory_source_lookup() {
        let mut source = MemorySource::new()
            .with_sheet(RawSheet::new("A", vec![]))
            .with_sheet(RawSheet::new("B", vec![]));

        assert!(source.has_sheet("A"));
        assert!(!source.has_sheet("C"));
        assert_eq!(source.sheet_names(), vec!["A", "B"]);
        assert!(matches!(
            source.read_sheet("C"),
            Err(DashboardError::SheetNotFound(name)) if name == "C"
        ));
    }
}
