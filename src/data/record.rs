use std::fmt;

use serde::{Deserialize, Serialize};

pub const TEST_NAME: &str = "Test Name";
pub const DEVICE_ID: &str = "Device ID";
pub const DATE: &str = "Date";
pub const RESULT: &str = "Result";

/// Column names every input file must carry, in the order used for export.
pub const REQUIRED_COLUMNS: [&str; 4] = [TEST_NAME, DEVICE_ID, DATE, RESULT];

/// A measurement result as it arrived from the file.
///
/// Spreadsheets hand us real numbers, CSV always hands us text. Both are
/// kept verbatim so the raw sheet of an export reproduces the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultValue {
    Number(f64),
    Text(String),
}

impl ResultValue {
    /// Numeric view of the value. Non-numeric or blank text is `NaN`.
    pub fn as_f64(&self) -> f64 {
        match self {
            ResultValue::Number(v) => *v,
            ResultValue::Text(s) => parse_number(s),
        }
    }
}

impl From<f64> for ResultValue {
    fn from(v: f64) -> Self {
        ResultValue::Number(v)
    }
}

impl From<&str> for ResultValue {
    fn from(s: &str) -> Self {
        ResultValue::Text(s.to_string())
    }
}

impl From<String> for ResultValue {
    fn from(s: String) -> Self {
        ResultValue::Text(s)
    }
}

impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultValue::Number(v) => write!(f, "{v}"),
            ResultValue::Text(s) => f.write_str(s),
        }
    }
}

/// Coerce text to a number. Surrounding whitespace is ignored; anything
/// that does not parse, including the empty string, becomes `NaN`.
///
/// Only decimal notation is accepted: the spellings `inf`, `infinity` and
/// `nan` are rejected like any other word. An exponent that overflows
/// (`1e400`) still yields an infinity.
pub fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    let is_decimal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'));
    if trimmed.is_empty() || !is_decimal {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Anything the statistics engine can read as a number.
pub trait Numeric {
    fn to_number(&self) -> f64;
}

impl Numeric for f64 {
    fn to_number(&self) -> f64 {
        *self
    }
}

impl Numeric for str {
    fn to_number(&self) -> f64 {
        parse_number(self)
    }
}

impl Numeric for String {
    fn to_number(&self) -> f64 {
        parse_number(self)
    }
}

impl Numeric for ResultValue {
    fn to_number(&self) -> f64 {
        self.as_f64()
    }
}

impl<T: Numeric + ?Sized> Numeric for &T {
    fn to_number(&self) -> f64 {
        (**self).to_number()
    }
}

/// One measurement row: a device's reading for a test on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Test Name")]
    pub test_name: String,
    #[serde(rename = "Device ID")]
    pub device_id: String,
    /// Lexically sortable date string (`YYYY-MM-DD` for spreadsheet dates).
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Result")]
    pub result: ResultValue,
}

impl Record {
    pub fn new(
        test_name: impl Into<String>,
        device_id: impl Into<String>,
        date: impl Into<String>,
        result: impl Into<ResultValue>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            device_id: device_id.into(),
            date: date.into(),
            result: result.into(),
        }
    }

    /// The result coerced to a number (`NaN` when it is not numeric).
    pub fn value(&self) -> f64 {
        self.result.as_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_results_are_coerced() {
        assert_eq!(Record::new("Glucose", "A", "2024-01-01", " 5.5 ").value(), 5.5);
        assert_eq!(Record::new("Glucose", "A", "2024-01-01", 7.0).value(), 7.0);
        assert!(Record::new("Glucose", "A", "2024-01-01", "n/a").value().is_nan());
        assert!(Record::new("Glucose", "A", "2024-01-01", "").value().is_nan());
    }

    #[test]
    fn word_spellings_of_special_values_are_not_numbers() {
        for word in ["inf", "-Infinity", "infinity", "NaN", "nan", "+inf"] {
            assert!(parse_number(word).is_nan(), "{word} should not parse");
        }
        assert_eq!(parse_number("1e3"), 1000.0);
        assert_eq!(parse_number("-2.5E-1"), -0.25);
        assert_eq!(parse_number(".5"), 0.5);
        assert_eq!(parse_number("1e400"), f64::INFINITY);
    }

    #[test]
    fn display_keeps_raw_text() {
        assert_eq!(ResultValue::from("5.50").to_string(), "5.50");
        assert_eq!(ResultValue::from(101.0).to_string(), "101");
    }

    #[test]
    fn serializes_with_file_column_names() {
        let rec = Record::new("HbA1c", "D-7", "2024-03-02", "6.1");
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"Test Name\":\"HbA1c\""));
        assert!(json.contains("\"Device ID\":\"D-7\""));
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
