pub mod report;
pub mod workbook;
