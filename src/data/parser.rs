use crate::data::record::{ResultValue, DATE, DEVICE_ID, RESULT, TEST_NAME};
use crate::error::{Error, Result};

/// Rows scanned for the header before giving up.
pub const MAX_HEADER_SCAN: usize = 50;

/// Location of the header row and of each required column within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMap {
    /// 0-based row index of the header row.
    pub row: usize,
    pub test_name: usize,
    pub device_id: usize,
    pub date: usize,
    pub result: usize,
}

/// Detect the header row: the first row within `max_rows` that names all
/// four required columns. Cells are compared after trimming, case-sensitive.
///
/// Title lines or notes above the table are skipped. When no row qualifies
/// the error lists the columns missing from the closest candidate.
pub fn detect_header(rows: &[Vec<ResultValue>], max_rows: usize) -> Result<HeaderMap> {
    if rows.is_empty() {
        return Err(Error::NoData);
    }

    let mut best_missing: Option<Vec<String>> = None;

    for (i, row) in rows.iter().take(max_rows).enumerate() {
        let names: Vec<String> = row.iter().map(|c| c.to_string().trim().to_string()).collect();
        let find = |wanted: &str| names.iter().position(|n| n == wanted);

        match (find(TEST_NAME), find(DEVICE_ID), find(DATE), find(RESULT)) {
            (Some(test_name), Some(device_id), Some(date), Some(result)) => {
                return Ok(HeaderMap { row: i, test_name, device_id, date, result });
            }
            (t, d, dt, r) => {
                let missing: Vec<String> = [(t, TEST_NAME), (d, DEVICE_ID), (dt, DATE), (r, RESULT)]
                    .iter()
                    .filter(|(pos, _)| pos.is_none())
                    .map(|(_, name)| name.to_string())
                    .collect();
                let closer = best_missing
                    .as_ref()
                    .map_or(true, |best| missing.len() < best.len());
                if closer {
                    best_missing = Some(missing);
                }
            }
        }
    }

    Err(Error::MissingColumns(best_missing.unwrap_or_default()))
}

/// True if every cell in the row is blank.
pub fn is_blank_row(row: &[ResultValue]) -> bool {
    row.iter().all(|c| match c {
        ResultValue::Text(s) => s.trim().is_empty(),
        ResultValue::Number(_) => false,
    })
}
