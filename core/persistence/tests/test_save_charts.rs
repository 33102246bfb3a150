//! FILENAME: tests/test_save_charts.rs
//! Integration tests for attaching charts and writing workbooks back out.

mod common;

use common::{
    dated_workbook, package_part, package_parts, report_workbook, report_workbook_with_vba, FAKE_VBA,
};
use engine::{CellValue, EngineError, MergeRegion};
use persistence::{
    BarChartSpec, BarDirection, ChartSize, DataLabelOptions, DataLabelPosition, LegendPosition,
    LoadOptions, PersistenceError, PieChartSpec, Workbook,
};

fn cached() -> LoadOptions {
    LoadOptions {
        data_only: true,
        ..LoadOptions::default()
    }
}

// ============================================================================
// ROUND TRIP
// ============================================================================

#[test]
fn test_values_and_merges_survive_save() {
    let fixture = report_workbook();
    let workbook = Workbook::open(&fixture.path, &cached()).unwrap();
    let out = fixture.output("copy.xlsx");
    workbook.save(&out).unwrap();

    let reopened = Workbook::open(&out, &cached()).unwrap();
    assert_eq!(reopened.sheet_names(), vec!["Report", "Notes"]);
    let grid = &reopened.sheet("Report").unwrap().grid;
    assert_eq!(grid.value(3, 1), Some(&CellValue::Text("North".to_string())));
    assert_eq!(grid.value(4, 4), Some(&CellValue::Number(8.0)));
    assert_eq!(grid.value(1, 1), Some(&CellValue::Text("Quarterly report".to_string())));
    assert_eq!(grid.merged_regions(), &[MergeRegion::new(1, 1, 1, 4)]);
}

#[test]
fn test_dates_survive_save() {
    let fixture = dated_workbook();
    let workbook = Workbook::open(&fixture.path, &cached()).unwrap();
    let out = fixture.output("orders-copy.xlsx");
    workbook.save(&out).unwrap();

    let reopened = Workbook::open(&out, &cached()).unwrap();
    let before = &workbook.sheet("Orders").unwrap().grid;
    let after = &reopened.sheet("Orders").unwrap().grid;
    assert!(matches!(after.value(2, 1), Some(CellValue::DateTime(_))));
    assert_eq!(after.value(1, 1), before.value(1, 1));
    assert_eq!(after.value(2, 1), before.value(2, 1));
    assert_eq!(
        after.value(2, 1).map(CellValue::display_value),
        Some("2024-03-02 14:30:00".to_string())
    );
}

#[test]
fn test_cells_outside_the_sheet_are_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let mut workbook = Workbook::new();
    workbook.add_sheet("S").unwrap().grid.set_value(0, 1, "x");
    assert!(matches!(
        workbook.save(dir.path().join("row0.xlsx")),
        Err(PersistenceError::Engine(EngineError::InvalidCoordinate { row: 0, .. }))
    ));

    // One past the last column must not wrap round to column A.
    let mut workbook = Workbook::new();
    let sheet = workbook.add_sheet("S").unwrap();
    sheet.grid.set_value(1, 1, "keep");
    sheet.grid.set_value(1, 65_537, "clobber");
    let out = dir.path().join("wide.xlsx");
    assert!(matches!(
        workbook.save(&out),
        Err(PersistenceError::Engine(EngineError::InvalidCoordinate { col: 65_537, .. }))
    ));
    assert!(!out.exists());

    let mut workbook = Workbook::new();
    workbook
        .add_sheet("S")
        .unwrap()
        .grid
        .add_merged_region(MergeRegion::new(0, 1, 2, 2));
    assert!(workbook.save(dir.path().join("merge0.xlsx")).is_err());
}

#[test]
fn test_formulas_survive_save() {
    let fixture = report_workbook();
    let workbook = Workbook::open(&fixture.path, &LoadOptions::default()).unwrap();
    let out = fixture.output("formulas.xlsx");
    workbook.save(&out).unwrap();

    let reopened = Workbook::open(&out, &LoadOptions::default()).unwrap();
    let cell = reopened.sheet("Report").unwrap().grid.get_cell(5, 4).unwrap();
    assert_eq!(cell.formula.as_deref(), Some("=SUM(D3:D4)"));
}

#[test]
fn test_read_only_workbook_cannot_be_saved() {
    let fixture = report_workbook();
    let options = LoadOptions {
        read_only: true,
        ..LoadOptions::default()
    };
    let mut workbook = Workbook::open(&fixture.path, &options).unwrap();

    assert!(matches!(
        workbook.add_pie_chart("Report", &PieChartSpec::new("A3:A4", "B3:B4", "F2", "Q1")),
        Err(PersistenceError::ReadOnly(_))
    ));
    assert!(matches!(
        workbook.save(fixture.output("nope.xlsx")),
        Err(PersistenceError::ReadOnly(_))
    ));
    assert!(!fixture.output("nope.xlsx").exists());
}

// ============================================================================
// CHARTS
// ============================================================================

#[test]
fn test_pie_and_bar_charts_are_written() {
    let fixture = report_workbook();
    let mut workbook = Workbook::open(&fixture.path, &cached()).unwrap();

    let mut pie = PieChartSpec::new("Report!A3:A4", "Report!B3:B4", "F2", "Q1 share");
    pie.colors = vec!["#4472C4".to_string(), "ED7D31".to_string()];
    pie.size = Some(ChartSize::new(12.0, 8.0));
    workbook.add_pie_chart("Report", &pie).unwrap();

    let mut bar = BarChartSpec::new("A3:A4", "B2:D4", "F20", "By quarter");
    bar.titles_from_data = true;
    bar.direction = BarDirection::Bar;
    bar.x_title = Some("Region".to_string());
    bar.y_title = Some("Units".to_string());
    bar.legend = Some(LegendPosition::Bottom);
    bar.data_labels = Some(DataLabelOptions {
        position: DataLabelPosition::OutsideEnd,
        font_color: None,
        font_size: None,
        ..DataLabelOptions::bar_default()
    });
    workbook.add_bar_chart("Report", &bar).unwrap();

    let report = workbook.sheet("Report").unwrap();
    assert_eq!(report.charts.len(), 2);
    assert_eq!(report.charts[1].series.len(), 3);

    let out = fixture.output("charts.xlsx");
    workbook.save(&out).unwrap();

    let parts = package_parts(&out);
    assert!(parts.iter().any(|p| p == "xl/charts/chart1.xml"));
    assert!(parts.iter().any(|p| p == "xl/charts/chart2.xml"));

    let pie_xml = String::from_utf8(package_part(&out, "xl/charts/chart1.xml")).unwrap();
    assert!(pie_xml.contains("<c:pieChart>"));
    assert!(pie_xml.contains("4472C4"));
    assert!(pie_xml.contains("<c:showPercent val=\"1\"/>"));

    let bar_xml = String::from_utf8(package_part(&out, "xl/charts/chart2.xml")).unwrap();
    assert!(bar_xml.contains("<c:barDir val=\"bar\"/>"));
    assert!(bar_xml.contains("By quarter"));
}

#[test]
fn test_chart_on_unknown_sheet() {
    let fixture = report_workbook();
    let mut workbook = Workbook::open(&fixture.path, &cached()).unwrap();
    assert!(matches!(
        workbook.add_bar_chart("Summary", &BarChartSpec::new("A3:A4", "B3:B4", "F2", "t")),
        Err(PersistenceError::InvalidChart(_)) | Err(PersistenceError::SheetNotFound(_))
    ));
}

// ============================================================================
// MACROS
// ============================================================================

#[test]
fn test_vba_project_is_kept_on_request() {
    let fixture = report_workbook_with_vba();

    let dropped = Workbook::open(&fixture.path, &cached()).unwrap();
    assert!(dropped.vba_project.is_none());

    let options = LoadOptions {
        keep_vba: true,
        ..cached()
    };
    let workbook = Workbook::open(&fixture.path, &options).unwrap();
    assert_eq!(workbook.vba_project.as_deref(), Some(FAKE_VBA));

    let out = fixture.output("copy.xlsm");
    workbook.save(&out).unwrap();
    assert_eq!(package_part(&out, "xl/vbaProject.bin"), FAKE_VBA);
}
