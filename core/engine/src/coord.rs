//! FILENAME: core/engine/src/coord.rs
//! PURPOSE: Utilities for converting between A1 notation and numeric coordinates.
//! CONTEXT: Coordinates in this crate are 1-based (row, col) pairs, the same
//! numbering the worksheet shows: column "A" = 1, "Z" = 26, "AA" = 27 and
//! row "1" = 1. Range references such as `Data!$A$1:$E$4` are parsed here too.

use crate::error::EngineError;
use std::fmt;

/// A cell coordinate as (row, col) with 1-based indices.
pub type CellCoord = (u32, u32);

/// Largest column the XLSX format can address ("XFD").
pub const MAX_COL: u32 = 16_384;
/// Largest row the XLSX format can address.
pub const MAX_ROW: u32 = 1_048_576;

/// Converts a column string (e.g., "A", "aa", "XFD") to a 1-based column index.
/// "A" -> 1, "Z" -> 26, "AA" -> 27.
pub fn col_to_index(col_str: &str) -> Result<u32, EngineError> {
    if col_str.is_empty() {
        return Err(EngineError::InvalidReference(col_str.to_string()));
    }
    let mut result: u32 = 0;
    for c in col_str.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(EngineError::InvalidReference(col_str.to_string()));
        }
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        result = result * 26 + digit;
        if result > MAX_COL {
            return Err(EngineError::InvalidReference(col_str.to_string()));
        }
    }
    Ok(result)
}

/// Converts a 1-based column index to its letters.
/// 1 -> "A", 26 -> "Z", 27 -> "AA". Index 0 has no letters and yields "".
pub fn index_to_col(col_index: u32) -> String {
    let mut result = String::new();
    let mut n = col_index;
    while n > 0 {
        let remainder = (n - 1) % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        n = (n - 1) / 26;
    }
    result
}

/// Parses an A1-style cell reference ("B3", "$AA$100") to a 1-based coordinate.
pub fn parse_a1(reference: &str) -> Result<CellCoord, EngineError> {
    let cleaned: String = reference.trim().chars().filter(|c| *c != '$').collect();
    let split = cleaned
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| EngineError::InvalidReference(reference.to_string()))?;
    let (letters, digits) = cleaned.split_at(split);

    let col = col_to_index(letters).map_err(|_| EngineError::InvalidReference(reference.to_string()))?;
    let row: u32 = digits
        .parse()
        .map_err(|_| EngineError::InvalidReference(reference.to_string()))?;
    if row == 0 || row > MAX_ROW {
        return Err(EngineError::InvalidReference(reference.to_string()));
    }
    Ok((row, col))
}

/// Checks that a 1-based coordinate lies inside the area an XLSX sheet can address.
pub fn check_coord(row: u32, col: u32) -> Result<CellCoord, EngineError> {
    if row == 0 || col == 0 {
        return Err(EngineError::InvalidCoordinate {
            row,
            col,
            reason: "rows and columns start at 1",
        });
    }
    if row > MAX_ROW || col > MAX_COL {
        return Err(EngineError::InvalidCoordinate {
            row,
            col,
            reason: "beyond the last addressable row or column",
        });
    }
    Ok((row, col))
}

/// Converts a 1-based (row, col) coordinate to an A1-style reference string.
/// (1, 1) -> "A1", (100, 27) -> "AA100"
pub fn coord_to_a1(coord: CellCoord) -> String {
    let (row, col) = coord;
    format!("{}{}", index_to_col(col), row)
}

/// A rectangular reference, optionally qualified by a sheet name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRef {
    pub sheet: Option<String>,
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl RangeRef {
    /// Parses `A1`, `A1:E4`, `Sheet!A1:E4` or `'My Sheet'!$A$1:$E$4`.
    /// Corners are normalised so `first_*` never exceeds `last_*`.
    pub fn parse(text: &str) -> Result<RangeRef, EngineError> {
        let text = text.trim().trim_start_matches('=');
        let (sheet, cells) = match text.rsplit_once('!') {
            Some((sheet, cells)) => (Some(unquote_sheet(sheet)?), cells),
            None => (None, text),
        };

        let (start, end) = match cells.split_once(':') {
            Some((a, b)) => (parse_a1(a)?, parse_a1(b)?),
            None => {
                let single = parse_a1(cells)?;
                (single, single)
            }
        };

        Ok(RangeRef {
            sheet,
            first_row: start.0.min(end.0),
            first_col: start.1.min(end.1),
            last_row: start.0.max(end.0),
            last_col: start.1.max(end.1),
        })
    }

    pub fn row_count(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    pub fn col_count(&self) -> u32 {
        self.last_col - self.first_col + 1
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.sheet {
            write!(f, "'{}'!", sheet.replace('\'', "''"))?;
        }
        write!(
            f,
            "{}:{}",
            coord_to_a1((self.first_row, self.first_col)),
            coord_to_a1((self.last_row, self.last_col))
        )
    }
}

fn unquote_sheet(raw: &str) -> Result<String, EngineError> {
    let raw = raw.trim();
    let name = if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        raw[1..raw.len() - 1].replace("''", "'")
    } else {
        raw.to_string()
    };
    if name.is_empty() {
        return Err(EngineError::InvalidReference(raw.to_string()));
    }
    Ok(name)
}
