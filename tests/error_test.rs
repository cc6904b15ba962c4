//! Tests for error types

use eqaplot::Error;

#[test]
fn test_unsupported_format_error() {
    let error = Error::UnsupportedFormat("docx".to_string());
    assert_eq!(format!("{error}"), "Unsupported file format: .docx");
}

#[test]
fn test_missing_columns_error() {
    let error = Error::MissingColumns(vec!["Device ID".to_string(), "Result".to_string()]);
    assert_eq!(format!("{error}"), "Missing required columns: Device ID, Result");
}

#[test]
fn test_no_data_error() {
    let error_str = format!("{}", Error::NoData);
    assert!(error_str.contains("No data"));
}

#[test]
fn test_no_sheets_error() {
    let error_str = format!("{}", Error::NoSheets);
    assert!(error_str.contains("No sheets"));
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error: Error = io.into();
    assert!(matches!(error, Error::Io(_)));
    assert!(format!("{error}").contains("gone"));
}

#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_err.into();
    assert!(format!("{error}").starts_with("JSON error"));
}
