use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::datetime;
use crate::data::parser::{self, HeaderMap};
use crate::data::record::{Record, ResultValue, REQUIRED_COLUMNS};
use crate::error::{Error, Result};

/// A row dropped at ingestion because one of its identity fields is blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarantinedRow {
    /// 1-based row number in the source sheet/file.
    pub line: usize,
    pub reason: String,
}

/// File extensions `load_file` understands, lowercase.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["csv", "xls", "xlsx", "xlsm", "ods"];

/// Result of loading a data file.
#[derive(Debug, Clone, Default)]
pub struct LoadedData {
    pub records: Vec<Record>,
    pub quarantined: Vec<QuarantinedRow>,
    /// Data rows read below the header, including rows whose cells are all
    /// blank and quarantined rows. Empty CSV lines are not rows.
    pub source_rows: usize,
}

/// Example rows written below the headers of a template file.
const TEMPLATE_ROWS: [[&str; 4]; 2] = [
    ["Glucose", "Analyzer-01", "2024-01-15", "5.4"],
    ["Glucose", "Analyzer-02", "2024-01-15", "5.6"],
];

/// Write a CSV template with the required headers and two example rows.
pub fn write_template_csv(path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(REQUIRED_COLUMNS)?;
    for row in TEMPLATE_ROWS {
        writer.write_record(row)?;
    }
    writer.flush()?;
    tracing::info!("Template written to {:?}", path);
    Ok(())
}

/// Lowercase extension of `path`, if it is one `load_file` accepts.
pub fn supported_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}

/// Load a CSV or Excel file into measurement records.
pub fn load_file(path: &Path) -> Result<LoadedData> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let loaded = match ext.as_str() {
        "csv" => load_csv(path),
        "xls" | "xlsx" | "xlsm" | "ods" => load_excel(path),
        _ => Err(Error::UnsupportedFormat(ext)),
    }?;

    tracing::info!(
        "Loaded {} records from {:?} ({} quarantined)",
        loaded.records.len(),
        path,
        loaded.quarantined.len()
    );
    Ok(loaded)
}

fn load_csv(path: &Path) -> Result<LoadedData> {
    let content = std::fs::read(path)?;
    // Not UTF-8: treat as latin1 (each byte maps to the same code point).
    let text = String::from_utf8(content.clone())
        .unwrap_or_else(|_| content.iter().map(|&b| b as char).collect());
    parse_csv_str(&text)
}

/// Parse CSV text (header row somewhere in the first lines) into records.
pub fn parse_csv_str(text: &str) -> Result<LoadedData> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<ResultValue>> = Vec::new();
    let mut lines: Vec<usize> = Vec::new();
    for result in reader.records() {
        let record = result?;
        // The reader skips empty lines and joins quoted newlines, so take the
        // line number from the record itself.
        let line = record.position().map_or(rows.len() + 1, |p| p.line() as usize);
        rows.push(record.iter().map(ResultValue::from).collect());
        lines.push(line);
    }

    build_records(&rows, &lines)
}

fn load_excel(path: &Path) -> Result<LoadedData> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook.sheet_names().first().cloned().ok_or(Error::NoSheets)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let rows: Vec<Vec<ResultValue>> = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => ResultValue::Text(String::new()),
                    Data::String(s) => ResultValue::Text(s.clone()),
                    Data::Float(f) => ResultValue::Number(*f),
                    Data::Int(i) => ResultValue::Number(*i as f64),
                    Data::Bool(b) => ResultValue::Text(b.to_string()),
                    Data::DateTime(dt) => match dt.as_datetime() {
                        Some(naive) => ResultValue::Text(datetime::format_cell_datetime(naive)),
                        None => ResultValue::Text(dt.to_string()),
                    },
                    Data::DateTimeIso(s) => ResultValue::Text(s.clone()),
                    Data::DurationIso(s) => ResultValue::Text(s.clone()),
                    Data::Error(e) => ResultValue::Text(format!("{e:?}")),
                })
                .collect()
        })
        .collect();

    // The range begins at the first used row, which need not be row 1.
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let lines: Vec<usize> = (0..rows.len()).map(|i| first_row + i + 1).collect();

    tracing::debug!("Read {} rows from sheet {:?}", rows.len(), sheet_name);
    build_records(&rows, &lines)
}

/// Turn a grid of cells into records: find the header, skip blank rows,
/// quarantine rows missing an identity field. Row `i` of the grid is
/// reported as line `i + 1`.
pub fn records_from_rows(rows: &[Vec<ResultValue>]) -> Result<LoadedData> {
    let lines: Vec<usize> = (1..=rows.len()).collect();
    build_records(rows, &lines)
}

/// `lines[i]` is the 1-based source line of `rows[i]`.
fn build_records(rows: &[Vec<ResultValue>], lines: &[usize]) -> Result<LoadedData> {
    let header = parser::detect_header(rows, parser::MAX_HEADER_SCAN)?;
    let data_rows = &rows[header.row + 1..];

    let mut records = Vec::with_capacity(data_rows.len());
    let mut quarantined = Vec::new();

    for (offset, row) in data_rows.iter().enumerate() {
        if parser::is_blank_row(row) {
            continue;
        }
        let idx = header.row + 1 + offset;
        let line = lines.get(idx).copied().unwrap_or(idx + 1);
        match record_from_row(row, &header) {
            Ok(record) => records.push(record),
            Err(reason) => {
                tracing::warn!("Quarantined row {line}: {reason}");
                quarantined.push(QuarantinedRow { line, reason });
            }
        }
    }

    let unsortable = datetime::non_iso_dates(records.iter().map(|r| r.date.as_str()));
    if let Some(first) = unsortable.first() {
        tracing::warn!(
            "{} dates are not zero-padded ISO dates (e.g. {first:?}); date order may be wrong",
            unsortable.len()
        );
    }

    Ok(LoadedData { records, quarantined, source_rows: data_rows.len() })
}

fn record_from_row(row: &[ResultValue], header: &HeaderMap) -> std::result::Result<Record, String> {
    let text = |idx: usize, name: &str| -> std::result::Result<String, String> {
        let value = row.get(idx).map(|c| c.to_string()).unwrap_or_default();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(format!("missing {name}"))
        } else {
            Ok(trimmed.to_string())
        }
    };

    let test_name = text(header.test_name, "Test Name")?;
    let device_id = text(header.device_id, "Device ID")?;
    let date = text(header.date, "Date")?;
    let result = row
        .get(header.result)
        .cloned()
        .unwrap_or_else(|| ResultValue::Text(String::new()));

    Ok(Record { test_name, device_id, date, result })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_csv_with_string_results() {
        let csv = "Test Name,Device ID,Date,Result\n\
                   Glucose,A,2024-01-01,5.2\n\
                   Glucose,B,2024-01-01,abc\n";
        let loaded = parse_csv_str(csv).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].value(), 5.2);
        assert!(loaded.records[1].value().is_nan());
        assert!(loaded.quarantined.is_empty());
    }

    #[test]
    fn quarantines_rows_without_identity() {
        let csv = "Test Name,Device ID,Date,Result\n\
                   Glucose,,2024-01-01,5.2\n\
                   ,,,\n\
                   Glucose,A,,4.0\n\
                   Glucose,A,2024-01-02,\n";
        let loaded = parse_csv_str(csv).unwrap();
        assert_eq!(loaded.source_rows, 4);
        assert_eq!(loaded.records.len(), 1);
        assert!(loaded.records[0].value().is_nan());
        assert_eq!(
            loaded.quarantined,
            vec![
                QuarantinedRow { line: 2, reason: "missing Device ID".to_string() },
                QuarantinedRow { line: 4, reason: "missing Date".to_string() },
            ]
        );
    }

    #[test]
    fn quarantine_reports_file_lines() {
        let csv = "Test Name,Device ID,Date,Result\n\n\nGlucose,,2024-01-01,5\n\
                   Glucose,A,2024-01-01,\"multi\nline\"\n\
                   ,B,2024-01-02,4\n";
        let loaded = parse_csv_str(csv).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.source_rows, 3);
        let lines: Vec<usize> = loaded.quarantined.iter().map(|q| q.line).collect();
        assert_eq!(lines, vec![4, 7]);
    }

    #[test]
    fn grid_rows_are_numbered_from_one() {
        let rows = vec![
            vec![ResultValue::from("title")],
            vec!["Test Name", "Device ID", "Date", "Result"].into_iter().map(ResultValue::from).collect(),
            vec!["Glucose", "", "2024-01-01", "5"].into_iter().map(ResultValue::from).collect(),
        ];
        let loaded = records_from_rows(&rows).unwrap();
        assert_eq!(loaded.quarantined[0].line, 3);
    }

    #[test]
    fn supported_extensions_are_case_insensitive() {
        assert_eq!(supported_extension(Path::new("a/round.ODS")).as_deref(), Some("ods"));
        assert_eq!(supported_extension(Path::new("round.xlsm")).as_deref(), Some("xlsm"));
        assert_eq!(supported_extension(Path::new("round.txt")), None);
        assert_eq!(supported_extension(Path::new("round")), None);
    }

    #[test]
    fn short_rows_are_tolerated() {
        let csv = "Test Name,Device ID,Date,Result\nGlucose,A,2024-01-01\n";
        let loaded = parse_csv_str(csv).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert!(loaded.records[0].value().is_nan());
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = load_file(Path::new("results.json")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ref ext) if ext == "json"));
    }
}
