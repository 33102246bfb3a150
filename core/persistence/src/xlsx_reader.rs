// FILENAME: core\persistence\src\xlsx_reader.rs

use crate::{LoadOptions, PersistenceError, Sheet, Workbook};
use calamine::{open_workbook, CellErrorType, Data, DataType, Range, Reader, Xlsx};
use engine::{Cell, CellError, CellValue, Grid, MergeRegion};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const VBA_PROJECT_PART: &str = "xl/vbaProject.bin";

pub fn load_xlsx(path: &Path, options: &LoadOptions) -> Result<Workbook, PersistenceError> {
    let mut workbook: Xlsx<BufReader<File>> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    if sheet_names.is_empty() {
        return Err(PersistenceError::InvalidFormat(
            "Workbook contains no sheets".to_string(),
        ));
    }

    let mut sheets = Vec::new();

    for sheet_name in &sheet_names {
        let range = workbook.worksheet_range(sheet_name)?;
        let mut grid = Grid::new();

        if let Some((start_row, start_col)) = range.start() {
            for (row_idx, col_idx, data) in range.used_cells() {
                let value = convert_value(data);
                if value.is_empty() {
                    continue;
                }
                grid.set_cell(
                    start_row + row_idx as u32 + 1,
                    start_col + col_idx as u32 + 1,
                    Cell::new_value(value),
                );
            }
        }
        if let Some((end_row, end_col)) = range.end() {
            grid.declare_extent(end_row + 1, end_col + 1);
        }

        // Without data_only a formula cell reads as its formula text,
        // replacing the cached result.
        if !options.data_only {
            let formulas = workbook.worksheet_formula(sheet_name)?;
            apply_formulas(&mut grid, &formulas);
        }

        match workbook.worksheet_merge_cells(sheet_name) {
            Some(Ok(regions)) => {
                for dims in regions {
                    grid.add_merged_region(MergeRegion::new(
                        dims.start.0 + 1,
                        dims.start.1 + 1,
                        dims.end.0 + 1,
                        dims.end.1 + 1,
                    ));
                }
            }
            Some(Err(e)) => return Err(e.into()),
            None => {}
        }

        log::debug!(
            target: "LOAD",
            "sheet '{}': {} cell(s), {} merged region(s), extent {}x{}",
            sheet_name,
            grid.cells.len(),
            grid.merged_regions().len(),
            grid.max_row(),
            grid.max_col()
        );

        sheets.push(Sheet::from_grid(sheet_name.clone(), grid));
    }

    let vba_project = if options.keep_vba {
        read_vba_project(path)?
    } else {
        None
    };

    log::info!(
        target: "LOAD",
        "loaded {} sheet(s) from {} (data_only={}, read_only={}, vba={})",
        sheets.len(),
        path.display(),
        options.data_only,
        options.read_only,
        vba_project.is_some()
    );

    Ok(Workbook {
        sheets,
        vba_project,
        options: options.clone(),
    })
}

fn convert_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(convert_error(e)),
        Data::DateTime(dt) if dt.is_datetime() => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        // Durations keep their serial value.
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => data
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn convert_error(error: &CellErrorType) -> CellError {
    match error {
        CellErrorType::Div0 => CellError::Div0,
        CellErrorType::NA => CellError::NA,
        CellErrorType::Name => CellError::Name,
        CellErrorType::Null => CellError::Null,
        CellErrorType::Num => CellError::Num,
        CellErrorType::Ref => CellError::Ref,
        CellErrorType::Value => CellError::Value,
        CellErrorType::GettingData => CellError::GettingData,
    }
}

fn apply_formulas(grid: &mut Grid, formulas: &Range<String>) {
    let Some((start_row, start_col)) = formulas.start() else {
        return;
    };
    for (row_idx, col_idx, formula) in formulas.used_cells() {
        if formula.is_empty() {
            continue;
        }
        grid.set_cell(
            start_row + row_idx as u32 + 1,
            start_col + col_idx as u32 + 1,
            Cell::new_formula(format!("={}", formula)),
        );
    }
}

/// Reads the raw macro project part, if the package has one.
fn read_vba_project(path: &Path) -> Result<Option<Vec<u8>>, PersistenceError> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut part = match archive.by_name(VBA_PROJECT_PART) {
        Ok(part) => part,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut bytes = Vec::with_capacity(part.size() as usize);
    part.read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}
