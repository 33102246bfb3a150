//! FILENAME: core/persistence/src/chart.rs
//! PURPOSE: Pie and bar chart descriptions attached to sheets.
//! CONTEXT: A chart spec names its ranges in A1 text ("Sales!A2:A6"). Attaching
//! it to a sheet parses and checks those references up front and stores a
//! `SheetChart`; the XLSX writer turns that into a native chart on save.

use crate::xlsx_writer::xlsx_coord;
use crate::PersistenceError;
use engine::{parse_a1, CellCoord, RangeRef};
use rust_xlsxwriter::{
    Chart as XlsxChart, ChartDataLabel, ChartDataLabelPosition, ChartFont, ChartLegendPosition,
    ChartPoint, ChartSolidFill, ChartType, Color,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// OPTIONS
// ============================================================================

/// Where data labels sit relative to their point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataLabelPosition {
    BestFit,
    Center,
    InsideEnd,
    InsideBase,
    OutsideEnd,
    Above,
    Below,
    Left,
    Right,
}

/// Data label display settings shared by every series of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataLabelOptions {
    pub position: DataLabelPosition,
    pub show_value: bool,
    pub show_percent: bool,
    pub show_category_name: bool,
    pub show_series_name: bool,
    /// Hex colour, "RRGGBB" or "#RRGGBB".
    pub font_color: Option<String>,
    /// Font size in points.
    pub font_size: Option<f64>,
}

impl DataLabelOptions {
    fn white_text(position: DataLabelPosition) -> Self {
        DataLabelOptions {
            position,
            show_value: false,
            show_percent: false,
            show_category_name: false,
            show_series_name: false,
            font_color: Some("FFFFFF".to_string()),
            font_size: Some(14.0),
        }
    }

    /// Best-fit percentages in white 14pt text.
    pub fn pie_default() -> Self {
        DataLabelOptions {
            show_percent: true,
            ..Self::white_text(DataLabelPosition::BestFit)
        }
    }

    /// Centred values in white 14pt text.
    pub fn bar_default() -> Self {
        DataLabelOptions {
            show_value: true,
            ..Self::white_text(DataLabelPosition::Center)
        }
    }
}

/// Chart size in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartSize {
    pub width_cm: f64,
    pub height_cm: f64,
}

impl ChartSize {
    pub fn new(width_cm: f64, height_cm: f64) -> Self {
        ChartSize { width_cm, height_cm }
    }

    /// Size in pixels at 96 dpi.
    pub fn to_pixels(&self) -> (u32, u32) {
        let px = |cm: f64| (cm / 2.54 * 96.0).round().max(1.0) as u32;
        (px(self.width_cm), px(self.height_cm))
    }
}

/// Vertical columns or horizontal bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BarDirection {
    #[default]
    Column,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegendPosition {
    Right,
    Left,
    Top,
    Bottom,
    TopRight,
}

// ============================================================================
// SPECS
// ============================================================================

/// A pie chart request. Ranges may omit the sheet, in which case the sheet
/// the chart is attached to is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChartSpec {
    pub labels: String,
    pub data: String,
    /// Top-left cell of the chart, e.g. "H2".
    pub anchor: String,
    pub title: String,
    /// Slice colours in label order.
    pub colors: Vec<String>,
    /// Read one series per row instead of one per column.
    pub from_rows: bool,
    /// Take each series name from its first cell.
    pub titles_from_data: bool,
    pub data_labels: Option<DataLabelOptions>,
    pub size: Option<ChartSize>,
}

impl PieChartSpec {
    pub fn new(labels: &str, data: &str, anchor: &str, title: &str) -> Self {
        PieChartSpec {
            labels: labels.to_string(),
            data: data.to_string(),
            anchor: anchor.to_string(),
            title: title.to_string(),
            colors: Vec::new(),
            from_rows: false,
            titles_from_data: false,
            data_labels: None,
            size: None,
        }
    }
}

/// A bar or column chart request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChartSpec {
    pub labels: String,
    pub data: String,
    pub anchor: String,
    pub title: String,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub direction: BarDirection,
    /// Bar colours in label order, applied to the first series.
    pub colors: Vec<String>,
    pub from_rows: bool,
    pub titles_from_data: bool,
    pub data_labels: Option<DataLabelOptions>,
    pub size: Option<ChartSize>,
    /// `None` hides the legend.
    pub legend: Option<LegendPosition>,
}

impl BarChartSpec {
    pub fn new(labels: &str, data: &str, anchor: &str, title: &str) -> Self {
        BarChartSpec {
            labels: labels.to_string(),
            data: data.to_string(),
            anchor: anchor.to_string(),
            title: title.to_string(),
            x_title: None,
            y_title: None,
            direction: BarDirection::Column,
            colors: Vec::new(),
            from_rows: false,
            titles_from_data: false,
            data_labels: None,
            size: None,
            legend: None,
        }
    }
}

// ============================================================================
// ATTACHED CHART
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Bar(BarDirection),
}

/// One data series: its values and, optionally, the cell holding its name.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRef {
    pub name: Option<RangeRef>,
    pub values: RangeRef,
}

/// A validated chart as stored on a sheet. All ranges carry a sheet name.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetChart {
    pub kind: ChartKind,
    /// 1-based anchor cell.
    pub anchor: CellCoord,
    pub title: String,
    pub categories: RangeRef,
    pub series: Vec<SeriesRef>,
    pub point_colors: Vec<u32>,
    pub data_labels: DataLabelOptions,
    pub size: Option<ChartSize>,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    /// `None` hides the legend.
    pub legend: Option<LegendPosition>,
}

impl SheetChart {
    pub(crate) fn from_pie(spec: &PieChartSpec, sheet: &str) -> Result<Self, PersistenceError> {
        let data = qualified_range(&spec.data, sheet)?;
        Ok(SheetChart {
            kind: ChartKind::Pie,
            anchor: parse_anchor(&spec.anchor)?,
            title: spec.title.clone(),
            categories: qualified_range(&spec.labels, sheet)?,
            series: split_series(&data, spec.from_rows, spec.titles_from_data)?,
            point_colors: parse_colors(&spec.colors)?,
            data_labels: checked_labels(spec.data_labels.as_ref(), DataLabelOptions::pie_default)?,
            size: spec.size,
            x_title: None,
            y_title: None,
            legend: Some(LegendPosition::Right),
        })
    }

    pub(crate) fn from_bar(spec: &BarChartSpec, sheet: &str) -> Result<Self, PersistenceError> {
        let data = qualified_range(&spec.data, sheet)?;
        Ok(SheetChart {
            kind: ChartKind::Bar(spec.direction),
            anchor: parse_anchor(&spec.anchor)?,
            title: spec.title.clone(),
            categories: qualified_range(&spec.labels, sheet)?,
            series: split_series(&data, spec.from_rows, spec.titles_from_data)?,
            point_colors: parse_colors(&spec.colors)?,
            data_labels: checked_labels(spec.data_labels.as_ref(), DataLabelOptions::bar_default)?,
            size: spec.size,
            x_title: spec.x_title.clone(),
            y_title: spec.y_title.clone(),
            legend: spec.legend,
        })
    }

    /// Sheets the chart reads from.
    pub fn referenced_sheets(&self) -> impl Iterator<Item = &str> {
        std::iter::once(&self.categories)
            .chain(self.series.iter().flat_map(|s| std::iter::once(&s.values).chain(s.name.as_ref())))
            .filter_map(|r| r.sheet.as_deref())
    }

    /// Builds the writer's chart object.
    pub(crate) fn to_xlsx_chart(&self) -> Result<XlsxChart, PersistenceError> {
        let chart_type = match self.kind {
            ChartKind::Pie => ChartType::Pie,
            ChartKind::Bar(BarDirection::Column) => ChartType::Column,
            ChartKind::Bar(BarDirection::Bar) => ChartType::Bar,
        };
        let mut chart = XlsxChart::new(chart_type);
        chart.title().set_name(self.title.as_str());

        let label = xlsx_data_label(&self.data_labels);
        let points: Vec<ChartPoint> = self
            .point_colors
            .iter()
            .map(|rgb| ChartPoint::new().set_format(ChartSolidFill::new().set_color(Color::RGB(*rgb))))
            .collect();

        for (index, series) in self.series.iter().enumerate() {
            let xlsx_series = chart.add_series();
            xlsx_series
                .set_categories(range_tuple(&self.categories)?)
                .set_values(range_tuple(&series.values)?)
                .set_data_label(&label);
            if let Some(name) = &series.name {
                xlsx_series.set_name(range_tuple(name)?);
            }
            // Colours follow the categories of the first series only.
            if index == 0 && !points.is_empty() {
                xlsx_series.set_points(&points);
            }
        }

        if let Some(title) = &self.x_title {
            chart.x_axis().set_name(title.as_str());
        }
        if let Some(title) = &self.y_title {
            chart.y_axis().set_name(title.as_str());
        }

        match self.legend {
            None => {
                chart.legend().set_hidden();
            }
            Some(position) => {
                chart.legend().set_position(match position {
                    LegendPosition::Right => ChartLegendPosition::Right,
                    LegendPosition::Left => ChartLegendPosition::Left,
                    LegendPosition::Top => ChartLegendPosition::Top,
                    LegendPosition::Bottom => ChartLegendPosition::Bottom,
                    LegendPosition::TopRight => ChartLegendPosition::TopRight,
                });
            }
        }

        if let Some(size) = self.size {
            let (width, height) = size.to_pixels();
            chart.set_width(width).set_height(height);
        }

        Ok(chart)
    }
}

fn xlsx_data_label(options: &DataLabelOptions) -> ChartDataLabel {
    let mut label = ChartDataLabel::new();
    if options.show_value {
        label.show_value();
    }
    if options.show_percent {
        label.show_percentage();
    }
    if options.show_category_name {
        label.show_category_name();
    }
    if options.show_series_name {
        label.show_series_name();
    }
    label.set_position(match options.position {
        DataLabelPosition::BestFit => ChartDataLabelPosition::BestFit,
        DataLabelPosition::Center => ChartDataLabelPosition::Center,
        DataLabelPosition::InsideEnd => ChartDataLabelPosition::InsideEnd,
        DataLabelPosition::InsideBase => ChartDataLabelPosition::InsideBase,
        DataLabelPosition::OutsideEnd => ChartDataLabelPosition::OutsideEnd,
        DataLabelPosition::Above => ChartDataLabelPosition::Above,
        DataLabelPosition::Below => ChartDataLabelPosition::Below,
        DataLabelPosition::Left => ChartDataLabelPosition::Left,
        DataLabelPosition::Right => ChartDataLabelPosition::Right,
    });

    let mut font = ChartFont::new();
    let mut has_font = false;
    // Colours were checked when the chart was attached.
    if let Some(rgb) = options.font_color.as_deref().and_then(|c| parse_hex_color(c).ok()) {
        font.set_color(Color::RGB(rgb));
        has_font = true;
    }
    if let Some(size) = options.font_size {
        font.set_size(size);
        has_font = true;
    }
    if has_font {
        label.set_font(&font);
    }
    label
}

/// The writer takes 0-based (sheet, first_row, first_col, last_row, last_col).
fn range_tuple(range: &RangeRef) -> Result<(&str, u32, u16, u32, u16), PersistenceError> {
    let (first_row, first_col) = xlsx_coord(range.first_row, range.first_col)?;
    let (last_row, last_col) = xlsx_coord(range.last_row, range.last_col)?;
    Ok((
        range.sheet.as_deref().unwrap_or_default(),
        first_row,
        first_col,
        last_row,
        last_col,
    ))
}

// ============================================================================
// PARSING
// ============================================================================

fn qualified_range(text: &str, default_sheet: &str) -> Result<RangeRef, PersistenceError> {
    let mut range = RangeRef::parse(text)?;
    if range.sheet.is_none() {
        range.sheet = Some(default_sheet.to_string());
    }
    Ok(range)
}

fn parse_anchor(text: &str) -> Result<CellCoord, PersistenceError> {
    Ok(parse_a1(text)?)
}

/// Splits a data block into series, one per column or per row.
fn split_series(
    data: &RangeRef,
    from_rows: bool,
    titles_from_data: bool,
) -> Result<Vec<SeriesRef>, PersistenceError> {
    let (line_count, line_len) = if from_rows {
        (data.row_count(), data.col_count())
    } else {
        (data.col_count(), data.row_count())
    };
    if titles_from_data && line_len < 2 {
        return Err(PersistenceError::InvalidChart(format!(
            "{} has no values left after its title cell",
            data
        )));
    }

    let skip = u32::from(titles_from_data);
    let series = (0..line_count)
        .map(|i| {
            let cell = |offset: u32| -> (u32, u32) {
                if from_rows {
                    (data.first_row + i, data.first_col + offset)
                } else {
                    (data.first_row + offset, data.first_col + i)
                }
            };
            let (first_row, first_col) = cell(skip);
            let (last_row, last_col) = cell(line_len - 1);
            let name = titles_from_data.then(|| {
                let (row, col) = cell(0);
                RangeRef {
                    sheet: data.sheet.clone(),
                    first_row: row,
                    first_col: col,
                    last_row: row,
                    last_col: col,
                }
            });
            SeriesRef {
                name,
                values: RangeRef {
                    sheet: data.sheet.clone(),
                    first_row,
                    first_col,
                    last_row,
                    last_col,
                },
            }
        })
        .collect();
    Ok(series)
}

fn checked_labels(
    labels: Option<&DataLabelOptions>,
    default: fn() -> DataLabelOptions,
) -> Result<DataLabelOptions, PersistenceError> {
    let labels = labels.cloned().unwrap_or_else(default);
    if let Some(color) = &labels.font_color {
        parse_hex_color(color)?;
    }
    Ok(labels)
}

fn parse_colors(colors: &[String]) -> Result<Vec<u32>, PersistenceError> {
    colors.iter().map(|c| parse_hex_color(c)).collect()
}

/// Parses "RRGGBB" or "#RRGGBB" to a 24-bit RGB value.
pub fn parse_hex_color(text: &str) -> Result<u32, PersistenceError> {
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PersistenceError::InvalidChart(format!("bad colour '{}'", text)));
    }
    u32::from_str_radix(hex, 16)
        .map_err(|_| PersistenceError::InvalidChart(format!("bad colour '{}'", text)))
}
