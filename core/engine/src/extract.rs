//! FILENAME: core/engine/src/extract.rs
//! PURPOSE: Reads a labelled rectangle of cells into a keyed mapping.
//! CONTEXT: Each row of the rectangle is keyed by the cell just left of it.
//! Merged cells are not expanded: only the anchor of a merge holds a value,
//! so a merge inside the rectangle cuts that row short.

use crate::cell::CellValue;
use crate::error::EngineError;
use crate::grid::Grid;
use indexmap::IndexMap;
use std::hash::{Hash, Hasher};

/// Row label taken from the key column. `None` when that cell is absent.
#[derive(Debug, Clone)]
pub struct RowKey(pub Option<CellValue>);

impl RowKey {
    pub fn absent() -> Self {
        RowKey(None)
    }
}

impl From<CellValue> for RowKey {
    fn from(value: CellValue) -> Self {
        RowKey(Some(value))
    }
}

impl From<&str> for RowKey {
    fn from(value: &str) -> Self {
        RowKey(Some(CellValue::Text(value.to_string())))
    }
}

// Numbers compare by bit pattern so that keys are usable in a hash map.
impl PartialEq for RowKey {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(CellValue::Number(a)), Some(CellValue::Number(b))) => a.to_bits() == b.to_bits(),
            (a, b) => a == b,
        }
    }
}

impl Eq for RowKey {}

impl Hash for RowKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            None => 0u8.hash(state),
            Some(value) => {
                std::mem::discriminant(value).hash(state);
                match value {
                    CellValue::Empty => {}
                    CellValue::Number(n) => n.to_bits().hash(state),
                    CellValue::Text(s) => s.hash(state),
                    CellValue::Boolean(b) => b.hash(state),
                    CellValue::DateTime(dt) => dt.hash(state),
                    CellValue::Error(e) => e.hash(state),
                }
            }
        }
    }
}

/// Extracted rows in first-seen key order.
pub type RegionValues = IndexMap<RowKey, Vec<CellValue>>;

/// Extracts rows `min_row..=max_row`, reading values from `min_col` rightwards.
///
/// `max_row` and `max_col` default to the sheet's extent when `None` or 0.
/// A row's values stop at its first absent cell. Rows with equal keys
/// overwrite one another; the later row wins.
///
/// # Errors
/// `InvalidCoordinate` when `min_row` is 0 or `min_col` is below 2, since the
/// key column `min_col - 1` must exist.
pub fn extract(
    grid: &Grid,
    min_row: u32,
    min_col: u32,
    max_row: Option<u32>,
    max_col: Option<u32>,
) -> Result<RegionValues, EngineError> {
    if min_row == 0 {
        return Err(EngineError::InvalidCoordinate {
            row: min_row,
            col: min_col,
            reason: "rows start at 1",
        });
    }
    if min_col < 2 {
        return Err(EngineError::InvalidCoordinate {
            row: min_row,
            col: min_col,
            reason: "the key column left of min_col must be at least 1",
        });
    }

    let max_row = max_row.filter(|r| *r != 0).unwrap_or_else(|| grid.max_row());
    let max_col = max_col.filter(|c| *c != 0).unwrap_or_else(|| grid.max_col());

    log::debug!(
        target: "EXTRACT",
        "region rows={}..={} cols={}..={}",
        min_row, max_row, min_col, max_col
    );

    let mut values = RegionValues::new();
    for row in min_row..=max_row {
        let key = RowKey(grid.value(row, min_col - 1).cloned());
        let row_values: Vec<CellValue> = (min_col..=max_col)
            .map_while(|col| grid.value(row, col).cloned())
            .collect();
        values.insert(key, row_values);
    }
    Ok(values)
}
