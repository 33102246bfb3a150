//! FILENAME: core/engine/src/grid.rs
//! PURPOSE: Holds the cells and merged regions of one worksheet.
//! CONTEXT: Sparse storage (HashMap) keyed by 1-based (row, col). The grid
//! also tracks the sheet's used extent, which open-ended searches and region
//! extraction resolve against.

use crate::cell::{Cell, CellValue};
use crate::region::{find_region, MergeRegion};
use std::collections::HashMap;

/// The Grid struct holds the state of one worksheet.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    /// Sparse storage: keys are 1-based (row, col).
    pub cells: HashMap<(u32, u32), Cell>,

    /// Merged regions in document declaration order.
    merged: Vec<MergeRegion>,

    /// Extent declared by the source document, independent of stored cells.
    declared_extent: (u32, u32),

    max_row: u32,
    max_col: u32,
}

impl Grid {
    /// Creates a new, empty Grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a cell at the specified coordinates.
    /// Updates the used extent automatically.
    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        self.widen(row, col);
        self.cells.insert((row, col), cell);
    }

    /// Shorthand for storing a plain value.
    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        self.set_cell(row, col, Cell::new_value(value));
    }

    /// Retrieves a reference to a cell at the specified coordinates.
    /// Returns None if nothing is stored there.
    pub fn get_cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// The value at (row, col), or None when the cell is absent or empty.
    pub fn value(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells
            .get(&(row, col))
            .map(|c| &c.value)
            .filter(|v| !v.is_empty())
    }

    /// Removes a cell from the grid (clearing it).
    /// If the cell was at a boundary, recalculates bounds.
    pub fn clear_cell(&mut self, row: u32, col: u32) {
        let was_at_boundary = row == self.max_row || col == self.max_col;
        self.cells.remove(&(row, col));

        if was_at_boundary {
            self.recalculate_bounds();
        }
    }

    /// Records the document's own dimension so that trailing formatted but
    /// empty rows and columns still count towards the extent.
    pub fn declare_extent(&mut self, max_row: u32, max_col: u32) {
        self.declared_extent = (max_row, max_col);
        self.widen(max_row, max_col);
    }

    /// Highest used row. An empty sheet reports 1.
    pub fn max_row(&self) -> u32 {
        self.max_row.max(1)
    }

    /// Highest used column. An empty sheet reports 1.
    pub fn max_col(&self) -> u32 {
        self.max_col.max(1)
    }

    /// Recalculates the extent from stored cells, merges and the declared extent.
    pub fn recalculate_bounds(&mut self) {
        let (mut new_max_row, mut new_max_col) = self.declared_extent;

        for &(row, col) in self.cells.keys() {
            new_max_row = new_max_row.max(row);
            new_max_col = new_max_col.max(col);
        }
        for region in &self.merged {
            new_max_row = new_max_row.max(region.max_row);
            new_max_col = new_max_col.max(region.max_col);
        }

        self.max_row = new_max_row;
        self.max_col = new_max_col;
    }

    // ========================================================================
    // MERGED REGIONS
    // ========================================================================

    pub fn add_merged_region(&mut self, region: MergeRegion) {
        self.widen(region.max_row, region.max_col);
        self.merged.push(region);
    }

    pub fn merged_regions(&self) -> &[MergeRegion] {
        &self.merged
    }

    /// The merged region containing (row, col), if any.
    /// The coordinate is not validated; anything outside every region,
    /// including row or column 0, simply has no region.
    pub fn merged_region_at(&self, row: u32, col: u32) -> Option<MergeRegion> {
        find_region(&self.merged, row, col)
    }

    pub fn is_merged(&self, row: u32, col: u32) -> bool {
        self.merged_region_at(row, col).is_some()
    }

    fn widen(&mut self, row: u32, col: u32) {
        if row > self.max_row {
            self.max_row = row;
        }
        if col > self.max_col {
            self.max_col = col;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grid_reports_one_by_one() {
        let grid = Grid::new();
        assert_eq!((grid.max_row(), grid.max_col()), (1, 1));
    }

    #[test]
    fn extent_follows_cells_and_merges() {
        let mut grid = Grid::new();
        grid.set_value(3, 2, "x");
        assert_eq!((grid.max_row(), grid.max_col()), (3, 2));

        grid.add_merged_region(MergeRegion::new(5, 1, 6, 4));
        assert_eq!((grid.max_row(), grid.max_col()), (6, 4));

        grid.declare_extent(10, 2);
        assert_eq!((grid.max_row(), grid.max_col()), (10, 4));
    }

    #[test]
    fn clearing_boundary_cell_shrinks_extent() {
        let mut grid = Grid::new();
        grid.set_value(1, 1, 1.0);
        grid.set_value(4, 3, 2.0);
        grid.clear_cell(4, 3);
        assert_eq!((grid.max_row(), grid.max_col()), (1, 1));
    }

    #[test]
    fn empty_value_reads_as_absent() {
        let mut grid = Grid::new();
        grid.set_cell(1, 1, Cell::new());
        grid.set_value(1, 2, "a");
        assert_eq!(grid.value(1, 1), None);
        assert_eq!(grid.value(9, 9), None);
        assert_eq!(grid.value(1, 2), Some(&CellValue::Text("a".to_string())));
    }

    #[test]
    fn merged_lookup_reports_bounds() {
        let mut grid = Grid::new();
        let region = MergeRegion::new(2, 2, 3, 4);
        grid.add_merged_region(region);

        assert!(grid.is_merged(3, 4));
        assert_eq!(grid.merged_region_at(2, 3), Some(region));
        assert!(!grid.is_merged(1, 1));
        assert!(!grid.is_merged(0, 0));
        assert_eq!(grid.merged_region_at(4, 2), None);
    }
}
