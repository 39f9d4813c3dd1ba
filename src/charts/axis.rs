//! Axis ranges and tick labels

use crate::finance::cells::{date_to_epoch_days, epoch_days_to_date};
use chrono::NaiveDate;
use plotters::style::{FontTransform, IntoFont, TextStyle};
use std::ops::Range;

/// Orientation of x-axis tick labels
///
/// plotters rotates text in quarter turns only, so a tilted label is not
/// available. Dates read best rotated, hence the vertical default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickOrientation {
    Horizontal,
    #[default]
    Vertical,
}

impl TickOrientation {
    /// Parse from string value (validation happens in the property reader)
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "horizontal" => Self::Horizontal,
            _ => Self::Vertical,
        }
    }

    pub(crate) fn label_style(&self) -> TextStyle<'static> {
        let font = ("sans-serif", 11).into_font();
        match self {
            Self::Horizontal => font.into(),
            Self::Vertical => font.transform(FontTransform::Rotate90).into(),
        }
    }

    /// Extra room below the plot for the tick labels
    pub(crate) fn label_area(&self) -> u32 {
        match self {
            Self::Horizontal => 40,
            Self::Vertical => 80,
        }
    }
}

/// Min and max of the finite values, if any
pub fn bounds<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Value range with 5% head room on both sides
///
/// A single repeated value gets a unit-sized window around it.
pub fn padded_range(min: f64, max: f64) -> Range<f64> {
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let span = max - min;
    if span.abs() < f64::EPSILON * min.abs().max(1.0) {
        let pad = (min.abs() * 0.05).max(1.0);
        return (min - pad)..(max + pad);
    }
    let pad = span * 0.05;
    (min - pad)..(max + pad)
}

/// Epoch-day range covering the dates, one day wider on each side
pub fn date_range(dates: &[NaiveDate]) -> Option<Range<i32>> {
    let lo = dates.iter().min()?;
    let hi = dates.iter().max()?;
    let span = date_to_epoch_days(*hi) - date_to_epoch_days(*lo);
    let pad = (span / 20).max(1);
    Some((date_to_epoch_days(*lo) - pad)..(date_to_epoch_days(*hi) + pad))
}

/// Tick label for an epoch-day coordinate
pub fn format_date_tick(days: i32) -> String {
    epoch_days_to_date(days)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Tick label for a value coordinate
pub fn format_value_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1000.0 {
        group_thousands(value.round() as i64)
    } else if magnitude >= 10.0 || magnitude == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}
