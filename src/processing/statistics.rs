use crate::data::record::Numeric;

/// A device whose coefficient of variation exceeds this (percent) is flagged.
pub const CV_FLAG_PERCENT: f64 = 5.0;

/// Descriptive statistics for a sample.
///
/// `standard_deviation` and `coefficient_of_variation` are `None` when
/// `count <= 1`: there is not enough data to estimate spread, which is not
/// the same as zero spread. `NaN` inputs propagate into `mean` and SD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStatistics {
    pub count: usize,
    /// `NaN` for an empty sample.
    pub mean: f64,
    /// Bessel-corrected (n - 1) sample standard deviation.
    pub standard_deviation: Option<f64>,
    /// `sd / mean * 100`; non-finite when the mean is zero.
    pub coefficient_of_variation: Option<f64>,
}

impl SampleStatistics {
    pub fn compute<T: Numeric>(values: &[T]) -> Self {
        let nums: Vec<f64> = values.iter().map(Numeric::to_number).collect();
        let count = nums.len();
        let mean = nums.iter().sum::<f64>() / count as f64;

        let (standard_deviation, coefficient_of_variation) = if count > 1 {
            let variance =
                nums.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            let sd = variance.sqrt();
            (Some(sd), Some(sd / mean * 100.0))
        } else {
            (None, None)
        };

        Self { count, mean, standard_deviation, coefficient_of_variation }
    }

    /// At least two values, so SD and CV are defined.
    pub fn has_sufficient_data(&self) -> bool {
        self.count > 1
    }

    /// True when the CV is defined and above [`CV_FLAG_PERCENT`].
    pub fn cv_flagged(&self) -> bool {
        self.coefficient_of_variation.is_some_and(|cv| cv > CV_FLAG_PERCENT)
    }

    /// SD as a finite number, if there is one to show.
    pub fn displayable_sd(&self) -> Option<f64> {
        self.standard_deviation.filter(|sd| !sd.is_nan())
    }
}

impl Default for SampleStatistics {
    /// Statistics of an empty sample.
    fn default() -> Self {
        Self::compute::<f64>(&[])
    }
}

/// Compute count, mean, SD and CV for `values`.
pub fn compute_statistics<T: Numeric>(values: &[T]) -> SampleStatistics {
    SampleStatistics::compute(values)
}

/// Five-number summary used to draw a box plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxSummary {
    /// Summarise the finite values of `sample`; `None` if there are none.
    pub fn from_sample(sample: &[f64]) -> Option<Self> {
        let mut vals: Vec<f64> = sample.iter().copied().filter(|v| v.is_finite()).collect();
        if vals.is_empty() {
            return None;
        }
        vals.sort_by(f64::total_cmp);

        Some(BoxSummary {
            min: vals[0],
            q1: quantile_sorted(&vals, 0.25),
            median: quantile_sorted(&vals, 0.5),
            q3: quantile_sorted(&vals, 0.75),
            max: vals[vals.len() - 1],
        })
    }
}

/// R-7 linear interpolation quantile over non-empty sorted data.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p;
    let j = h.floor() as usize;
    let g = h - h.floor();
    if j + 1 >= n {
        sorted[n - 1]
    } else {
        (1.0 - g) * sorted[j] + g * sorted[j + 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sample() {
        let s = compute_statistics::<f64>(&[]);
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan());
        assert_eq!(s.standard_deviation, None);
        assert_eq!(s.coefficient_of_variation, None);
        assert!(!s.has_sufficient_data());
    }

    #[test]
    fn single_value_has_no_spread() {
        let s = compute_statistics(&[10.0]);
        assert_eq!(s.count, 1);
        assert_eq!(s.mean, 10.0);
        assert_eq!(s.standard_deviation, None);
        assert_eq!(s.coefficient_of_variation, None);
        assert!(!s.cv_flagged());
    }

    #[test]
    fn sample_standard_deviation() {
        let s = compute_statistics(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(s.count, 8);
        assert!((s.mean - 5.0).abs() < 1e-12);
        let sd = s.standard_deviation.unwrap();
        assert!((sd - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!((sd - 2.1381).abs() < 1e-4);
        let cv = s.coefficient_of_variation.unwrap();
        assert!((cv - sd / 5.0 * 100.0).abs() < 1e-9);
        assert!(s.cv_flagged());
    }

    #[test]
    fn identical_values_have_zero_spread() {
        let s = compute_statistics(&[3.0, 3.0, 3.0]);
        assert_eq!(s.standard_deviation, Some(0.0));
        assert_eq!(s.coefficient_of_variation, Some(0.0));
        assert!(!s.cv_flagged());
    }

    #[test]
    fn string_inputs_are_coerced() {
        let s = compute_statistics(&["1", " 2 ", "3"]);
        assert_eq!(s.mean, 2.0);
        assert_eq!(s.standard_deviation, Some(1.0));
    }

    #[test]
    fn non_numeric_input_propagates_nan() {
        let s = compute_statistics(&["1", "oops", "3"]);
        assert_eq!(s.count, 3);
        assert!(s.mean.is_nan());
        assert!(s.standard_deviation.unwrap().is_nan());
        assert_eq!(s.displayable_sd(), None);
        assert!(!s.cv_flagged());
    }

    #[test]
    fn zero_mean_cv_is_non_finite() {
        let s = compute_statistics(&[-1.0, 1.0]);
        assert_eq!(s.mean, 0.0);
        let cv = s.coefficient_of_variation.unwrap();
        assert!(!cv.is_finite());
    }

    #[test]
    fn box_summary_quartiles() {
        let b = BoxSummary::from_sample(&[7.0, 1.0, 3.0, 5.0, f64::NAN]).unwrap();
        assert_eq!(b.min, 1.0);
        assert_eq!(b.q1, 2.5);
        assert_eq!(b.median, 4.0);
        assert_eq!(b.q3, 5.5);
        assert_eq!(b.max, 7.0);

        assert_eq!(BoxSummary::from_sample(&[f64::NAN]), None);
        let one = BoxSummary::from_sample(&[4.0]).unwrap();
        assert_eq!((one.min, one.median, one.max), (4.0, 4.0, 4.0));
    }
}
