use crate::data::record::Record;
use crate::processing::statistics::SampleStatistics;

/// A reading is flagged when its z-score magnitude exceeds this.
pub const Z_FLAG_THRESHOLD: f64 = 2.0;

/// A record with its distance from the peer baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviationRecord {
    pub record: Record,
    pub z_score: f64,
    /// `(value - mean) / mean * 100`.
    pub percent_deviation: f64,
}

impl DeviationRecord {
    /// True when `|z| > 2`.
    pub fn is_flagged(&self) -> bool {
        self.z_score.abs() > Z_FLAG_THRESHOLD
    }
}

/// Score every record against `baseline`, keeping input order.
///
/// When the baseline SD is undefined, `NaN`, or zero there is no scale to
/// measure against and both scores are reported as `0`.
pub fn compute_deviations<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    baseline: &SampleStatistics,
) -> Vec<DeviationRecord> {
    let scale = baseline.standard_deviation.filter(|sd| !sd.is_nan() && *sd != 0.0);
    let mean = baseline.mean;

    records
        .into_iter()
        .map(|record| {
            let (z_score, percent_deviation) = match scale {
                Some(sd) => {
                    let value = record.value();
                    ((value - mean) / sd, (value - mean) / mean * 100.0)
                }
                None => (0.0, 0.0),
            };
            DeviationRecord { record: record.clone(), z_score, percent_deviation }
        })
        .collect()
}
