use std::collections::HashMap;

use crate::processing::grouping::GroupedSet;
use crate::processing::statistics::BoxSummary;

/// One device's readings laid out on the shared date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSeries {
    pub device_id: String,
    /// One slot per date label; `None` where the device has no reading.
    pub points: Vec<Option<f64>>,
}

/// Line-chart data: a date axis and one aligned series per device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    pub labels: Vec<String>,
    pub series: Vec<DeviceSeries>,
}

impl TimeSeries {
    pub fn get(&self, device_id: &str) -> Option<&[Option<f64>]> {
        self.series
            .iter()
            .find(|s| s.device_id == device_id)
            .map(|s| s.points.as_slice())
    }
}

/// Box-plot data: one raw sample per device, aligned with `labels`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributionSeries {
    pub labels: Vec<String>,
    pub samples: Vec<Vec<f64>>,
}

impl DistributionSeries {
    /// Five-number summary per device, aligned with `labels`.
    pub fn summaries(&self) -> Vec<Option<BoxSummary>> {
        self.samples.iter().map(|s| BoxSummary::from_sample(s)).collect()
    }
}

/// Align every device's readings to `dates`.
///
/// Missing dates become `None` so that all series share the axis. If a device
/// has several readings on one date the first one (group order) is used.
pub fn build_time_series(grouped: &GroupedSet<'_>, dates: &[String]) -> TimeSeries {
    let series = grouped
        .iter()
        .map(|group| {
            let mut by_date: HashMap<&str, f64> = HashMap::new();
            for record in &group.records {
                by_date.entry(record.date.as_str()).or_insert_with(|| record.value());
            }
            let points = dates.iter().map(|d| by_date.get(d.as_str()).copied()).collect();
            DeviceSeries { device_id: group.device_id.to_string(), points }
        })
        .collect();

    TimeSeries { labels: dates.to_vec(), series }
}

/// One numeric sample per device, in group order.
pub fn build_distribution_series(grouped: &GroupedSet<'_>) -> DistributionSeries {
    DistributionSeries {
        labels: grouped.iter().map(|g| g.device_id.to_string()).collect(),
        samples: grouped.iter().map(|g| g.values()).collect(),
    }
}
