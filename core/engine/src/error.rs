//! FILENAME: core/engine/src/error.rs

use thiserror::Error;

/// Which axis of a search window a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("row or column range must be a pair of (start, end), got {0} values")]
    InvalidRangeShape(usize),

    #[error("range bounds must be integers greater than or equal to 0, got {0}")]
    NegativeBound(i64),

    #[error("{axis} range end {end} must be greater than or equal to start {start} when end is not 0")]
    EndBeforeStart { axis: Axis, start: u32, end: u32 },

    #[error("{axis} range resolves to start {start} beyond end {end}")]
    StartExceedsEnd { axis: Axis, start: u32, end: u32 },

    #[error("invalid cell coordinate ({row}, {col}): {reason}")]
    InvalidCoordinate { row: u32, col: u32, reason: &'static str },

    #[error("invalid cell reference: {0}")]
    InvalidReference(String),
}
