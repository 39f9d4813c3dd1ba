//! Spreadsheet cell decoding
//!
//! Converts raw workbook cells into a small typed value set. Missing-value
//! markers follow the usual spreadsheet export conventions ("None", "N/A", ...).
//! Date cells are resolved by calamine, which knows whether the workbook uses
//! the 1900 or the 1904 date system. Bare serial numbers (a date column typed
//! as plain numbers) are read in the 1900 system.

use calamine::Data;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

/// Text values treated as missing
pub const NA_MARKERS: &[&str] = &[
    "", "#N/A", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null", "-",
];

/// Date-only formats accepted in text cells
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%Y%m%d"];

/// Date-time formats accepted in text cells (time part is discarded)
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// A decoded spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl CellValue {
    /// Decode a text cell: missing markers, numbers, or plain text
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_na_marker(trimmed) {
            return CellValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => CellValue::Number(v),
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text rendering used when a column ends up as strings
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(v) => Some(v.to_string()),
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
            Data::String(s) => CellValue::from_text(s),
            // Durations are not calendar dates; keep them as text so a date
            // column holding one fails to parse
            Data::DateTime(dt) if dt.is_duration() => CellValue::Text(dt.to_string()),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(|d| CellValue::Date(d.date()))
                .unwrap_or(CellValue::Empty),
            Data::DateTimeIso(s) => parse_date(s)
                .map(CellValue::Date)
                .unwrap_or_else(|| CellValue::Text(s.clone())),
            other => CellValue::Text(other.to_string()),
        }
    }
}

/// Check whether a (trimmed) text value is a missing-value marker
pub fn is_na_marker(value: &str) -> bool {
    NA_MARKERS.contains(&value)
}

/// Convert a bare Excel serial day number (1900 date system) to a calendar date
///
/// The fractional part (time of day) is dropped. Serial 1 is 1900-01-01 for
/// dates after the 1900 leap-year bug (serial 61 onwards), which covers any
/// reporting date a financial statement can carry.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

/// Parse a date from a text cell
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Days since 1970-01-01 (the physical representation of a polars Date)
pub fn date_to_epoch_days(date: NaiveDate) -> i32 {
    date.signed_duration_since(unix_epoch()).num_days() as i32
}

/// Inverse of [`date_to_epoch_days`]
pub fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    let epoch = unix_epoch();
    if days >= 0 {
        epoch.checked_add_days(Days::new(days as u64))
    } else {
        epoch.checked_sub_days(Days::new(days.unsigned_abs() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_text_na_markers() {
        assert_eq!(CellValue::from_text("None"), CellValue::Empty);
        assert_eq!(CellValue::from_text("  "), CellValue::Empty);
        assert_eq!(CellValue::from_text("N/A"), CellValue::Empty);
        assert_eq!(CellValue::from_text("nan"), CellValue::Empty);
    }

    #[test]
    fn test_text_numbers_and_strings() {
        assert_eq!(
            CellValue::from_text("54228000000"),
            CellValue::Number(54_228_000_000.0)
        );
        assert_eq!(CellValue::from_text("-1.5"), CellValue::Number(-1.5));
        assert_eq!(CellValue::from_text("USD"), CellValue::Text("USD".into()));
        // Non-finite parses are kept as text
        assert_eq!(CellValue::from_text("inf"), CellValue::Text("inf".into()));
    }

    #[test]
    fn test_calamine_cells() {
        assert_eq!(CellValue::from(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(CellValue::from(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(CellValue::from(&Data::Bool(true)), CellValue::Number(1.0));
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Empty);
        assert_eq!(
            CellValue::from(&Data::String("None".into())),
            CellValue::Empty
        );
        assert_eq!(
            CellValue::from(&Data::DateTimeIso("2023-12-30T00:00:00".into())),
            CellValue::Date(ymd(2023, 12, 30))
        );
    }

    #[test]
    fn test_date_cells_follow_workbook_date_system() {
        let cell = |serial: f64, is_1904: bool| {
            CellValue::from(&Data::DateTime(ExcelDateTime::new(
                serial,
                ExcelDateTimeType::DateTime,
                is_1904,
            )))
        };

        assert_eq!(cell(45290.0, false), CellValue::Date(ymd(2023, 12, 30)));
        assert_eq!(cell(43828.0, true), CellValue::Date(ymd(2023, 12, 30)));
        assert_eq!(cell(0.0, true), CellValue::Date(ymd(1904, 1, 1)));
        // Time of day is dropped
        assert_eq!(cell(45290.75, false), CellValue::Date(ymd(2023, 12, 30)));
    }

    #[test]
    fn test_duration_cells_are_not_dates() {
        let cell = Data::DateTime(ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false));
        assert_eq!(CellValue::from(&cell), CellValue::Text("1.5".into()));
    }

    #[test]
    fn test_excel_serial_dates() {
        assert_eq!(excel_serial_to_date(45291.0), Some(ymd(2023, 12, 31)));
        assert_eq!(excel_serial_to_date(45291.75), Some(ymd(2023, 12, 31)));
        assert_eq!(excel_serial_to_date(61.0), Some(ymd(1900, 3, 1)));
        assert_eq!(excel_serial_to_date(-1.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2023-12-30"), Some(ymd(2023, 12, 30)));
        assert_eq!(parse_date("2023/12/30"), Some(ymd(2023, 12, 30)));
        assert_eq!(parse_date("12/30/2023"), Some(ymd(2023, 12, 30)));
        assert_eq!(parse_date("2023-12-30 00:00:00"), Some(ymd(2023, 12, 30)));
        assert_eq!(
            parse_date("2023-12-30T10:00:00+00:00"),
            Some(ymd(2023, 12, 30))
        );
        assert_eq!(parse_date("Q4 2023"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_epoch_days_roundtrip_sign() {
        assert_eq!(date_to_epoch_days(ymd(1970, 1, 2)), 1);
        assert_eq!(date_to_epoch_days(ymd(1969, 12, 31)), -1);
        assert_eq!(epoch_days_to_date(-1), Some(ymd(1969, 12, 31)));
        assert_eq!(epoch_days_to_date(19722), Some(ymd(2023, 12, 31)));
    }
}
