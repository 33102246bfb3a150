//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the sheet engine.
//! CONTEXT: In-memory worksheet model plus the read-only helpers that run
//! over it: merged-region lookup, bounded value search and region extraction.
//! Nothing here touches files; see the persistence crate for that.

pub mod cell;
pub mod coord;
pub mod error;
pub mod extract;
pub mod grid;
pub mod region;
pub mod search;

// Re-export commonly used types at the crate root
pub use cell::{Cell, CellError, CellValue, DATETIME_DISPLAY_FORMAT};
pub use coord::{check_coord, col_to_index, coord_to_a1, index_to_col, parse_a1, CellCoord, RangeRef};
pub use error::{Axis, EngineError};
pub use extract::{extract, RegionValues, RowKey};
pub use grid::Grid;
pub use region::MergeRegion;
pub use search::{find, find_checked, SearchRange, SearchTarget, ABSENT_VALUE_TEXT};
