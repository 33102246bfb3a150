//! FILENAME: tests/common/mod.rs
//! Fixture workbooks written with rust_xlsxwriter into a temporary directory.

#![allow(dead_code)]

use rust_xlsxwriter::{ExcelDateTime, Format, Formula, Workbook as XlsxWorkbook};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Bytes used as a stand-in macro project.
pub const FAKE_VBA: &[u8] = b"not really a vba project";

/// A fixture file that lives as long as this value.
pub struct Fixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl Fixture {
    /// Path for an output file next to the fixture.
    pub fn output(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// "Report" sheet:
///
/// ```text
///   | A                | B    | C    | D    |
/// 1 | Quarterly report (merged A1:D1)       |
/// 2 | Region           | Q1   | Q2   | Q3   |
/// 3 | North            | 10   | 12   | 9    |
/// 4 | South            | 4    | 6    | 8    |
/// 5 | Total            | =SUM(B3:B4) -> 14 | 18 | 17 |
/// ```
///
/// followed by an empty "Notes" sheet.
pub fn report_workbook() -> Fixture {
    write_report("report.xlsx", None)
}

/// The report workbook saved as .xlsm with a macro project part.
pub fn report_workbook_with_vba() -> Fixture {
    write_report("report.xlsm", Some(FAKE_VBA))
}

fn write_report(file_name: &str, vba: Option<&[u8]>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(file_name);

    let mut xlsx = XlsxWorkbook::new();
    {
        let sheet = xlsx.add_worksheet();
        sheet.set_name("Report").unwrap();
        sheet
            .merge_range(0, 0, 0, 3, "Quarterly report", &Format::new())
            .unwrap();

        for (col, header) in ["Region", "Q1", "Q2", "Q3"].iter().enumerate() {
            sheet.write_string(1, col as u16, *header).unwrap();
        }
        let rows = [("North", [10.0, 12.0, 9.0]), ("South", [4.0, 6.0, 8.0])];
        for (i, (region, values)) in rows.iter().enumerate() {
            let row = i as u32 + 2;
            sheet.write_string(row, 0, *region).unwrap();
            for (j, value) in values.iter().enumerate() {
                sheet.write_number(row, j as u16 + 1, *value).unwrap();
            }
        }

        sheet.write_string(4, 0, "Total").unwrap();
        for (col, letter, total) in [(1u16, "B", "14"), (2, "C", "18"), (3, "D", "17")] {
            let formula = Formula::new(format!("=SUM({0}3:{0}4)", letter)).set_result(total);
            sheet.write_formula(4, col, formula).unwrap();
        }
    }
    xlsx.add_worksheet().set_name("Notes").unwrap();

    let vba_file = vba.map(|bytes| {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        xlsx.add_vba_project(file.path()).unwrap();
        file
    });

    xlsx.save(&path).unwrap();
    drop(vba_file);

    Fixture { dir, path }
}

/// "Orders" sheet with dates in the label column:
///
/// ```text
///   | A                   | B  |
/// 1 | 2024-03-01          | 5  |
/// 2 | 2024-03-02 14:30:00 | 7  |
/// ```
pub fn dated_workbook() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.xlsx");

    let mut xlsx = XlsxWorkbook::new();
    let sheet = xlsx.add_worksheet();
    sheet.set_name("Orders").unwrap();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm");
    let first = ExcelDateTime::from_ymd(2024, 3, 1).unwrap();
    let second = ExcelDateTime::from_ymd(2024, 3, 2)
        .unwrap()
        .and_hms(14, 30, 0)
        .unwrap();
    sheet.write_datetime_with_format(0, 0, &first, &date_format).unwrap();
    sheet.write_number(0, 1, 5.0).unwrap();
    sheet.write_datetime_with_format(1, 0, &second, &date_format).unwrap();
    sheet.write_number(1, 1, 7.0).unwrap();
    xlsx.save(&path).unwrap();

    Fixture { dir, path }
}

/// Names of all parts in an XLSX package.
pub fn package_parts(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    archive.file_names().map(str::to_string).collect()
}

/// Raw bytes of one part in an XLSX package.
pub fn package_part(path: &Path, name: &str) -> Vec<u8> {
    use std::io::Read;
    let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut bytes = Vec::new();
    part.read_to_end(&mut bytes).unwrap();
    bytes
}
