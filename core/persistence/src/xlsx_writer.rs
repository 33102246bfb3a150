//! FILENAME: core/persistence/src/xlsx_writer.rs

use crate::{PersistenceError, Workbook};
use engine::{check_coord, Cell, CellValue};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};
use std::io::Write;
use std::path::Path;

const DATE_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Converts a 1-based engine coordinate to the writer's 0-based one.
pub(crate) fn xlsx_coord(row: u32, col: u32) -> Result<(u32, u16), PersistenceError> {
    let (row, col) = check_coord(row, col)?;
    // check_coord caps col at MAX_COL, which fits in u16.
    Ok((row - 1, (col - 1) as u16))
}

pub fn save_xlsx(workbook: &Workbook, path: &Path) -> Result<(), PersistenceError> {
    if workbook.options.read_only {
        return Err(PersistenceError::ReadOnly("saving is not allowed"));
    }

    let mut xlsx = XlsxWorkbook::new();
    let merge_format = Format::new();
    let date_format = Format::new().set_num_format(DATE_NUM_FORMAT);

    for sheet in &workbook.sheets {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        // Merges first: merge_range blanks the region, then the anchor's
        // real value is written over it below.
        for region in sheet.grid.merged_regions() {
            let (first_row, first_col) = xlsx_coord(region.min_row, region.min_col)?;
            let (last_row, last_col) = xlsx_coord(region.max_row, region.max_col)?;
            worksheet.merge_range(first_row, first_col, last_row, last_col, "", &merge_format)?;
        }

        // Write cells
        for ((row, col), cell) in &sheet.grid.cells {
            let (row, col) = xlsx_coord(*row, *col)?;
            write_cell(worksheet, row, col, cell, &date_format)?;
        }

        for chart in &sheet.charts {
            let (row, col) = xlsx_coord(chart.anchor.0, chart.anchor.1)?;
            worksheet.insert_chart(row, col, &chart.to_xlsx_chart()?)?;
        }

        log::debug!(
            target: "SAVE",
            "sheet '{}': {} cell(s), {} merged region(s), {} chart(s)",
            sheet.name,
            sheet.grid.cells.len(),
            sheet.grid.merged_regions().len(),
            sheet.charts.len()
        );
    }

    // The writer takes the macro project from a file, which must outlive save().
    let _vba_file = match &workbook.vba_project {
        Some(bytes) => {
            if path.extension().and_then(|e| e.to_str()) != Some("xlsm") {
                log::warn!(
                    target: "SAVE",
                    "{} keeps a macro project but is not .xlsm",
                    path.display()
                );
            }
            let mut file = tempfile::NamedTempFile::new()?;
            file.write_all(bytes)?;
            file.flush()?;
            xlsx.add_vba_project(file.path())?;
            Some(file)
        }
        None => None,
    };

    xlsx.save(path)?;
    log::info!(target: "SAVE", "saved {} sheet(s) to {}", workbook.sheets.len(), path.display());
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    date_format: &Format,
) -> Result<(), PersistenceError> {
    if let Some(ref formula) = cell.formula {
        let clean_formula = formula.strip_prefix('=').unwrap_or(formula);
        worksheet.write_formula(row, col, clean_formula)?;
        return Ok(());
    }

    match &cell.value {
        CellValue::Empty => {}
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Boolean(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::DateTime(dt) => {
            worksheet.write_datetime_with_format(row, col, dt, date_format)?;
        }
        CellValue::Error(e) => {
            worksheet.write_string(row, col, e.code())?;
        }
    }
    Ok(())
}
