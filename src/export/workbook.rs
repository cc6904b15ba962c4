use std::fmt;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Format;
use serde::Serialize;

use crate::data::record::{Record, ResultValue, REQUIRED_COLUMNS};
use crate::error::Result;
use crate::processing::pipeline::Analysis;

pub const RAW_SHEET: &str = "Raw";
pub const STATS_SHEET: &str = "Stats";
pub const DEVIATION_SHEET: &str = "Deviation";

/// One sheet cell. Numbers stay numbers so spreadsheets can compute on them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Undefined value (e.g. the SD of a single reading).
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    fn optional(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }
}

impl From<&ResultValue> for Cell {
    fn from(value: &ResultValue) -> Self {
        match value {
            ResultValue::Number(v) => Cell::Number(*v),
            ResultValue::Text(s) => Cell::Text(s.clone()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// Text form used for CSV output. Non-finite numbers keep their
/// `NaN`/`inf` spelling.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// A named table of cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// Export workbook: raw records, per-device statistics, per-record deviations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

fn record_cells(record: &Record) -> Vec<Cell> {
    vec![
        record.test_name.as_str().into(),
        record.device_id.as_str().into(),
        record.date.as_str().into(),
        (&record.result).into(),
    ]
}

impl Workbook {
    /// `raw` is the whole dataset; stats and deviations come from `analysis`
    /// and therefore follow its test filter.
    pub fn from_analysis(raw: &[Record], analysis: &Analysis) -> Self {
        let mut raw_sheet = Sheet::new(RAW_SHEET, &REQUIRED_COLUMNS);
        raw_sheet.rows = raw.iter().map(record_cells).collect();

        let mut stats_sheet = Sheet::new(STATS_SHEET, &["Device", "Count", "Mean", "SD", "CV"]);
        stats_sheet.rows = analysis
            .device_stats
            .iter()
            .map(|d| {
                vec![
                    d.device_id.as_str().into(),
                    Cell::Number(d.stats.count as f64),
                    Cell::Number(d.stats.mean),
                    Cell::optional(d.stats.standard_deviation),
                    Cell::optional(d.stats.coefficient_of_variation),
                ]
            })
            .collect();

        let mut deviation_headers: Vec<&str> = REQUIRED_COLUMNS.to_vec();
        deviation_headers.extend(["Z-score", "Deviation %"]);
        let mut deviation_sheet = Sheet::new(DEVIATION_SHEET, &deviation_headers);
        deviation_sheet.rows = analysis
            .deviations
            .iter()
            .map(|d| {
                let mut row = record_cells(&d.record);
                row.push(Cell::Number(d.z_score));
                row.push(Cell::Number(d.percent_deviation));
                row
            })
            .collect();

        Self { sheets: vec![raw_sheet, stats_sheet, deviation_sheet] }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Write all sheets into one Excel file. Empty cells are left blank;
    /// non-finite numbers, which Excel cannot store, are written as text.
    pub fn write_xlsx(&self, path: &Path) -> Result<()> {
        let mut book = rust_xlsxwriter::Workbook::new();
        let bold = Format::new().set_bold();

        for sheet in &self.sheets {
            let worksheet = book.add_worksheet();
            worksheet.set_name(&sheet.name)?;
            for (col, header) in sheet.headers.iter().enumerate() {
                worksheet.write_string_with_format(0, col as u16, header, &bold)?;
            }
            for (r, row) in sheet.rows.iter().enumerate() {
                let r = r as u32 + 1;
                for (col, cell) in row.iter().enumerate() {
                    let col = col as u16;
                    match cell {
                        Cell::Empty => {}
                        Cell::Number(v) if v.is_finite() => {
                            worksheet.write_number(r, col, *v)?;
                        }
                        other => {
                            worksheet.write_string(r, col, other.to_string())?;
                        }
                    }
                }
            }
        }

        book.save(path)?;
        tracing::info!("Workbook exported to {:?}", path);
        Ok(())
    }

    /// Write each sheet to `dir/{stem}_{sheet}.csv`. Returns the paths in
    /// sheet order.
    pub fn write_csv_sheets(&self, dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.sheets.len());
        for sheet in &self.sheets {
            let path = dir.join(format!("{stem}_{}.csv", sheet.name.to_lowercase()));
            let mut writer = csv::Writer::from_path(&path)?;
            writer.write_record(&sheet.headers)?;
            for row in &sheet.rows {
                writer.write_record(row.iter().map(ToString::to_string))?;
            }
            writer.flush()?;
            written.push(path);
        }
        tracing::info!("Workbook exported as {} CSV sheets to {:?}", written.len(), dir);
        Ok(written)
    }

    /// All sheets as one JSON document. Non-finite numbers become `null`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::pipeline::analyze;

    fn records() -> Vec<Record> {
        vec![
            Record::new("Glucose", "A", "2024-01-01", "5.0"),
            Record::new("Sodium", "A", "2024-01-01", 140.0),
            Record::new("Glucose", "B", "2024-01-01", "7.0"),
        ]
    }

    fn text_rows(sheet: &Sheet) -> Vec<Vec<String>> {
        sheet
            .rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect()
    }

    #[test]
    fn sheets_in_order_with_filter_applied() {
        let raw = records();
        let wb = Workbook::from_analysis(&raw, &analyze(&raw, Some("Glucose")));
        let names: Vec<&str> = wb.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec![RAW_SHEET, STATS_SHEET, DEVIATION_SHEET]);

        let raw_sheet = wb.sheet(RAW_SHEET).unwrap();
        assert_eq!(raw_sheet.rows.len(), 3);
        assert_eq!(raw_sheet.rows[0][3], Cell::Text("5.0".to_string()));
        assert_eq!(raw_sheet.rows[1][3], Cell::Number(140.0));

        let stats = wb.sheet(STATS_SHEET).unwrap();
        assert_eq!(stats.rows[0][3], Cell::Empty);
        assert_eq!(text_rows(stats), vec![
            vec!["A", "1", "5", "", ""],
            vec!["B", "1", "7", "", ""],
        ]);

        let dev = wb.sheet(DEVIATION_SHEET).unwrap();
        assert_eq!(dev.headers.last().map(String::as_str), Some("Deviation %"));
        assert_eq!(dev.rows.len(), 2);
        assert_eq!(dev.rows[0][0], Cell::Text("Glucose".to_string()));
    }

    #[test]
    fn non_finite_cells_are_spelled_out() {
        let raw = vec![
            Record::new("T", "A", "d1", "bad"),
            Record::new("T", "A", "d2", "1"),
        ];
        let wb = Workbook::from_analysis(&raw, &analyze(&raw, None));
        let stats = text_rows(wb.sheet(STATS_SHEET).unwrap());
        assert_eq!(stats[0][2], "NaN");
        assert_eq!(stats[0][3], "NaN");
    }

    #[test]
    fn json_contains_every_sheet() {
        let raw = records();
        let json = Workbook::from_analysis(&raw, &analyze(&raw, None)).to_json().unwrap();
        for name in [RAW_SHEET, STATS_SHEET, DEVIATION_SHEET] {
            assert!(json.contains(&format!("\"name\": \"{name}\"")));
        }
    }
}
