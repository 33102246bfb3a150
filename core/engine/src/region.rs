//! FILENAME: core/engine/src/region.rs
//! PURPOSE: Merged-cell rectangles and containment tests.

use crate::coord::coord_to_a1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A merged rectangle of cells. All bounds are 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeRegion {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
}

impl MergeRegion {
    /// Builds a region from two opposite corners in any order.
    pub fn new(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        MergeRegion {
            min_row: start_row.min(end_row),
            max_row: start_row.max(end_row),
            min_col: start_col.min(end_col),
            max_col: start_col.max(end_col),
        }
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.min_row <= row && row <= self.max_row && self.min_col <= col && col <= self.max_col
    }

    /// The anchor cell, which is the only member holding the merged value.
    pub fn top_left(&self) -> (u32, u32) {
        (self.min_row, self.min_col)
    }

    pub fn overlaps(&self, other: &MergeRegion) -> bool {
        !(self.max_row < other.min_row
            || self.min_row > other.max_row
            || self.max_col < other.min_col
            || self.min_col > other.max_col)
    }
}

impl fmt::Display for MergeRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            coord_to_a1((self.min_row, self.min_col)),
            coord_to_a1((self.max_row, self.max_col))
        )
    }
}

/// Returns the first region, in declaration order, containing (row, col).
///
/// Regions loaded from a document never overlap, so the first match is the
/// only match. If they do overlap, the earliest declared region wins.
pub fn find_region(regions: &[MergeRegion], row: u32, col: u32) -> Option<MergeRegion> {
    regions.iter().find(|r| r.contains(row, col)).copied()
}
