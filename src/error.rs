use thiserror::Error;

/// Result type alias for fallible file and export operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the I/O boundaries (loading, export, session files).
///
/// The statistics pipeline itself never fails: bad values travel through it
/// as `NaN` or `None` and are judged by whoever displays them.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input or failure writing a CSV sheet
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet could not be opened or read
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// Excel workbook could not be written
    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// PDF report could not be built or saved
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Session or workbook JSON could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension is not one of the supported tabular formats
    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    /// Spreadsheet has no worksheets
    #[error("No sheets found in workbook")]
    NoSheets,

    /// No header row carried all of the required column names
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// File contained no rows at all
    #[error("No data found in file")]
    NoData,
}
