//! FILENAME: core/engine/src/search.rs
//! PURPOSE: Bounded, case-insensitive value search over a grid window.
//! CONTEXT: The window is given per axis as (start, end). A start below 1 is
//! treated as 1 and an end of 0 runs to the sheet's extent on that axis.
//! Ranges are validated before any cell is read.

use crate::coord::CellCoord;
use crate::error::{Axis, EngineError};
use crate::grid::Grid;
use serde::{Deserialize, Serialize};

/// Text an absent cell is compared as.
///
/// A search for "none" therefore matches empty cells inside the window.
/// This mirrors long-standing behaviour callers rely on; it is kept as an
/// explicit constant rather than an accident of string conversion.
pub const ABSENT_VALUE_TEXT: &str = "None";

/// One axis of a search window. `end == 0` means "up to the sheet's extent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRange {
    pub start: u32,
    pub end: u32,
}

impl SearchRange {
    pub fn new(start: u32, end: u32) -> Self {
        SearchRange { start, end }
    }

    /// The whole axis: (1, 0).
    pub fn all() -> Self {
        SearchRange { start: 1, end: 0 }
    }

    fn check_order(&self, axis: Axis) -> Result<(), EngineError> {
        if self.end != 0 && self.end < self.start {
            return Err(EngineError::EndBeforeStart {
                axis,
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Resolves against the sheet's extent on this axis and returns the
    /// inclusive (start, end) pair to scan.
    fn resolve(&self, axis: Axis, extent: u32) -> Result<(u32, u32), EngineError> {
        let start = self.start.max(1);
        let end = if self.end == 0 { extent } else { self.end };
        if start > end {
            return Err(EngineError::StartExceedsEnd { axis, start, end });
        }
        Ok((start, end))
    }
}

impl Default for SearchRange {
    fn default() -> Self {
        Self::all()
    }
}

impl From<(u32, u32)> for SearchRange {
    fn from((start, end): (u32, u32)) -> Self {
        SearchRange { start, end }
    }
}

fn check_shape(values: &[i64]) -> Result<(), EngineError> {
    if values.len() != 2 {
        return Err(EngineError::InvalidRangeShape(values.len()));
    }
    Ok(())
}

fn checked_bounds(values: &[i64]) -> Result<SearchRange, EngineError> {
    let mut bounds = [0u32; 2];
    for (slot, &value) in bounds.iter_mut().zip(values) {
        *slot = u32::try_from(value).map_err(|_| EngineError::NegativeBound(value))?;
    }
    Ok(SearchRange {
        start: bounds[0],
        end: bounds[1],
    })
}

/// Validates a single range supplied as loosely typed data (e.g. decoded JSON).
/// Use [`find_checked`] to validate a row and column range together.
impl TryFrom<&[i64]> for SearchRange {
    type Error = EngineError;

    fn try_from(values: &[i64]) -> Result<Self, Self::Error> {
        check_shape(values)?;
        checked_bounds(values)
    }
}

/// What to look for. Integers are compared by their decimal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    Text(String),
    Integer(i64),
}

impl SearchTarget {
    fn normalized(&self) -> String {
        match self {
            SearchTarget::Text(s) => s.to_lowercase(),
            SearchTarget::Integer(n) => n.to_string(),
        }
    }
}

impl From<&str> for SearchTarget {
    fn from(value: &str) -> Self {
        SearchTarget::Text(value.to_string())
    }
}

impl From<String> for SearchTarget {
    fn from(value: String) -> Self {
        SearchTarget::Text(value)
    }
}

impl From<i64> for SearchTarget {
    fn from(value: i64) -> Self {
        SearchTarget::Integer(value)
    }
}

impl From<i32> for SearchTarget {
    fn from(value: i32) -> Self {
        SearchTarget::Integer(value as i64)
    }
}

/// Finds every cell in the window whose text matches `target`, ignoring case.
///
/// With `full_match` the whole cell text must equal the target; otherwise
/// the target only has to occur somewhere in it. Results come back in
/// reading order: rows ascending, then columns ascending.
///
/// # Errors
/// Returns `EndBeforeStart` if either range has a non-zero end below its
/// start, and `StartExceedsEnd` if a resolved window is empty, for example
/// a start row past the last row of the sheet.
pub fn find(
    grid: &Grid,
    target: &SearchTarget,
    rows: SearchRange,
    cols: SearchRange,
    full_match: bool,
) -> Result<Vec<CellCoord>, EngineError> {
    rows.check_order(Axis::Row)?;
    cols.check_order(Axis::Column)?;

    let (start_row, end_row) = rows.resolve(Axis::Row, grid.max_row())?;
    let (start_col, end_col) = cols.resolve(Axis::Column, grid.max_col())?;

    log::debug!(
        target: "SEARCH",
        "find {:?} rows={}..={} cols={}..={} full_match={}",
        target, start_row, end_row, start_col, end_col, full_match
    );

    let query = target.normalized();
    let mut matches = Vec::new();

    for row in start_row..=end_row {
        for col in start_col..=end_col {
            let text = match grid.value(row, col) {
                Some(value) => value.display_value().to_lowercase(),
                None => ABSENT_VALUE_TEXT.to_lowercase(),
            };
            let hit = if full_match {
                text == query
            } else {
                text.contains(&query)
            };
            if hit {
                matches.push((row, col));
            }
        }
    }

    log::trace!(target: "SEARCH", "find {:?}: {} match(es)", target, matches.len());
    Ok(matches)
}

/// [`find`] over ranges given as raw integers.
///
/// Each check runs over both ranges before the next one starts: shape,
/// then non-negative bounds, then end-before-start, rows before columns
/// at every step.
pub fn find_checked(
    grid: &Grid,
    target: &SearchTarget,
    rows: &[i64],
    cols: &[i64],
    full_match: bool,
) -> Result<Vec<CellCoord>, EngineError> {
    check_shape(rows)?;
    check_shape(cols)?;
    let rows = checked_bounds(rows)?;
    let cols = checked_bounds(cols)?;
    find(grid, target, rows, cols, full_match)
}
