//! Date-keyed join of two statement columns
//!
//! Used for the net income vs dividend payout charts. The join runs on the
//! lazy API: both sides are narrowed to (date, value) before joining.

use super::clean::{column_f64, has_column};
use super::error::Result;
use polars::prelude::*;

/// How rows from the two statements are matched on the date key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinStrategy {
    /// Only dates present in both statements
    #[default]
    Inner,
    /// Every date of the left statement
    Left,
    /// Every date of either statement
    Outer,
}

impl JoinStrategy {
    /// Parse from string value (validation happens in the property reader)
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "left" => Self::Left,
            "outer" | "full" => Self::Outer,
            _ => Self::Inner,
        }
    }

    fn join_args(&self) -> JoinArgs {
        match self {
            Self::Inner => JoinArgs::new(JoinType::Inner),
            Self::Left => JoinArgs::new(JoinType::Left),
            Self::Outer => {
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns)
            }
        }
    }
}

/// One side of a merge: a frame, its date key and the value column to keep
#[derive(Debug, Clone, Copy)]
pub struct MergeSide<'a> {
    pub frame: &'a DataFrame,
    pub date_column: &'a str,
    pub value_column: &'a str,
}

impl MergeSide<'_> {
    fn is_available(&self) -> bool {
        has_column(self.frame, self.date_column) && has_column(self.frame, self.value_column)
    }

    fn narrowed(&self) -> LazyFrame {
        self.frame
            .clone()
            .lazy()
            .select([col(self.date_column), col(self.value_column)])
    }
}

/// Join two value columns on their date keys
///
/// Returns `None` when either side lacks its date or value column. The result
/// holds the left date column plus both value columns, sorted by date.
pub fn merge_on_date(
    left: MergeSide<'_>,
    right: MergeSide<'_>,
    how: JoinStrategy,
) -> Result<Option<DataFrame>> {
    if !left.is_available() || !right.is_available() {
        return Ok(None);
    }

    let merged = left
        .narrowed()
        .join(
            right.narrowed(),
            [col(left.date_column)],
            [col(right.date_column)],
            how.join_args(),
        )
        .sort([left.date_column], SortMultipleOptions::default())
        .collect()?;

    Ok(Some(merged))
}

/// (x, y) pairs from two numeric columns, skipping rows where either is null
pub fn paired_values(df: &DataFrame, x: &str, y: &str) -> Result<Vec<(f64, f64)>> {
    let xs = column_f64(df, x)?;
    let ys = column_f64(df, y)?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .filter_map(|pair| match pair {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        })
        .collect())
}
