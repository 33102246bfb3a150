//! FILENAME: core/persistence/src/lib.rs
//! xlkit Persistence Module
//!
//! Opens XLSX workbooks into the engine's sheet model, exposes the engine's
//! search helpers per sheet, attaches charts and saves the result.

mod chart;
mod error;
mod xlsx_reader;
mod xlsx_writer;

pub use chart::{
    parse_hex_color, BarChartSpec, BarDirection, ChartKind, ChartSize, DataLabelOptions,
    DataLabelPosition, LegendPosition, PieChartSpec, SeriesRef, SheetChart,
};
pub use error::PersistenceError;
pub use xlsx_reader::load_xlsx;
pub use xlsx_writer::save_xlsx;

use engine::{CellCoord, Grid, MergeRegion, RegionValues, SearchRange, SearchTarget};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// LOAD OPTIONS
// ============================================================================

/// How a workbook is opened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Read cached formula results instead of formula text.
    pub data_only: bool,
    /// Inspect only: charts cannot be attached and the workbook cannot be saved.
    pub read_only: bool,
    /// Keep the macro project so it is written back on save.
    pub keep_vba: bool,
}

impl LoadOptions {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// WORKBOOK
// ============================================================================

/// An opened workbook. The source file is read completely on open and is
/// not held afterwards; each instance is independent of any other.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    /// Raw `vbaProject.bin`, kept when opened with `keep_vba`.
    pub vba_project: Option<Vec<u8>>,
    pub options: LoadOptions,
}

impl Workbook {
    /// An empty in-memory workbook.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self, PersistenceError> {
        load_xlsx(path.as_ref(), options)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        save_xlsx(self, path.as_ref())
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Looks a sheet up by exact, case-sensitive name.
    pub fn sheet(&self, name: &str) -> Result<&Sheet, PersistenceError> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| PersistenceError::SheetNotFound(name.to_string()))
    }

    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet, PersistenceError> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| PersistenceError::SheetNotFound(name.to_string()))
    }

    /// Appends an empty sheet and returns it.
    pub fn add_sheet(&mut self, name: &str) -> Result<&mut Sheet, PersistenceError> {
        if self.sheets.iter().any(|s| s.name == name) {
            return Err(PersistenceError::InvalidFormat(format!(
                "Sheet already exists: {}",
                name
            )));
        }
        let index = self.sheets.len();
        self.sheets.push(Sheet::new(name.to_string()));
        Ok(&mut self.sheets[index])
    }

    // ------------------------------------------------------------------------
    // Region & search helpers
    // ------------------------------------------------------------------------

    pub fn is_merged(&self, sheet: &str, row: u32, col: u32) -> Result<bool, PersistenceError> {
        Ok(self.sheet(sheet)?.grid.is_merged(row, col))
    }

    pub fn merged_region_at(
        &self,
        sheet: &str,
        row: u32,
        col: u32,
    ) -> Result<Option<MergeRegion>, PersistenceError> {
        Ok(self.sheet(sheet)?.grid.merged_region_at(row, col))
    }

    pub fn find(
        &self,
        sheet: &str,
        target: impl Into<SearchTarget>,
        rows: impl Into<SearchRange>,
        cols: impl Into<SearchRange>,
        full_match: bool,
    ) -> Result<Vec<CellCoord>, PersistenceError> {
        let sheet = self.sheet(sheet)?;
        Ok(engine::find(
            &sheet.grid,
            &target.into(),
            rows.into(),
            cols.into(),
            full_match,
        )?)
    }

    pub fn region_values(
        &self,
        sheet: &str,
        min_row: u32,
        min_col: u32,
        max_row: Option<u32>,
        max_col: Option<u32>,
    ) -> Result<RegionValues, PersistenceError> {
        let sheet = self.sheet(sheet)?;
        Ok(engine::extract(&sheet.grid, min_row, min_col, max_row, max_col)?)
    }

    // ------------------------------------------------------------------------
    // Charts
    // ------------------------------------------------------------------------

    pub fn add_pie_chart(&mut self, sheet: &str, spec: &PieChartSpec) -> Result<(), PersistenceError> {
        let chart = SheetChart::from_pie(spec, sheet)?;
        self.attach_chart(sheet, chart)
    }

    pub fn add_bar_chart(&mut self, sheet: &str, spec: &BarChartSpec) -> Result<(), PersistenceError> {
        let chart = SheetChart::from_bar(spec, sheet)?;
        self.attach_chart(sheet, chart)
    }

    fn attach_chart(&mut self, sheet: &str, chart: SheetChart) -> Result<(), PersistenceError> {
        if self.options.read_only {
            return Err(PersistenceError::ReadOnly("charts cannot be added"));
        }
        if let Some(missing) = chart
            .referenced_sheets()
            .find(|name| self.sheets.iter().all(|s| s.name != *name))
        {
            return Err(PersistenceError::InvalidChart(format!(
                "range refers to unknown sheet '{}'",
                missing
            )));
        }

        log::debug!(
            target: "CHART",
            "attach {:?} '{}' to '{}' at ({}, {}) with {} series",
            chart.kind,
            chart.title,
            sheet,
            chart.anchor.0,
            chart.anchor.1,
            chart.series.len()
        );
        self.sheet_mut(sheet)?.charts.push(chart);
        Ok(())
    }
}

// ============================================================================
// SHEET
// ============================================================================

/// Represents a single worksheet
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
    /// Charts attached since the workbook was opened.
    pub charts: Vec<SheetChart>,
}

impl Sheet {
    pub fn new(name: String) -> Self {
        Self {
            name,
            grid: Grid::new(),
            charts: Vec::new(),
        }
    }

    pub fn from_grid(name: String, grid: Grid) -> Self {
        Self {
            name,
            grid,
            charts: Vec::new(),
        }
    }
}
