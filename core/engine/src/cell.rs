//! FILENAME: core/engine/src/cell.rs
//! PURPOSE: Defines the data held by a single worksheet cell.
//! CONTEXT: A cell keeps its loaded value and, when the workbook was opened
//! with formulas preserved, the formula text it came from.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// How date cells read as text.
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Error codes a cell can carry as its cached value (e.g., #DIV/0!)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellError {
    Div0,
    NA,
    Name,
    Null,
    Num,
    Ref,
    Value,
    GettingData,
}

impl CellError {
    /// The code as it appears in the worksheet.
    pub fn code(&self) -> &'static str {
        match self {
            CellError::Div0 => "#DIV/0!",
            CellError::NA => "#N/A",
            CellError::Name => "#NAME?",
            CellError::Null => "#NULL!",
            CellError::Num => "#NUM!",
            CellError::Ref => "#REF!",
            CellError::Value => "#VALUE!",
            CellError::GettingData => "#GETTING_DATA",
        }
    }
}

/// The value stored in a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    /// A date or date-time cell.
    DateTime(NaiveDateTime),
    Error(CellError),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text form of the value, as used by search comparisons.
    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::DateTime(dt) => dt.format(DATETIME_DISPLAY_FORMAT).to_string(),
            CellValue::Error(e) => e.code().to_string(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// A single stored cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Formula text including the leading '=', when one was loaded.
    pub formula: Option<String>,
    pub value: CellValue,
}

impl Cell {
    pub fn new() -> Self {
        Cell {
            formula: None,
            value: CellValue::Empty,
        }
    }

    pub fn new_value(value: impl Into<CellValue>) -> Self {
        Cell {
            formula: None,
            value: value.into(),
        }
    }

    /// A formula cell whose visible value is the formula text itself.
    pub fn new_formula(formula: String) -> Self {
        Cell {
            value: CellValue::Text(formula.clone()),
            formula: Some(formula),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}
