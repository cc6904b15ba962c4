use crate::data::record::Record;
use crate::processing::deviation::{compute_deviations, DeviationRecord};
use crate::processing::grouping::{
    distinct_sorted_dates, distinct_test_names, filter_by_test, group_by_device,
};
use crate::processing::series::{
    build_distribution_series, build_time_series, DistributionSeries, TimeSeries,
};
use crate::processing::statistics::{compute_statistics, SampleStatistics};

/// Statistics of one device's readings for the selected test.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatistics {
    pub device_id: String,
    pub stats: SampleStatistics,
}

/// Everything derived from one pass over the records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    /// Every test in the dataset, for the selector (not only the selected one).
    pub tests: Vec<String>,
    pub selected_test: Option<String>,
    /// Number of records that passed the test filter.
    pub record_count: usize,
    pub device_stats: Vec<DeviceStatistics>,
    /// Statistics over all devices' readings; the deviation baseline.
    pub peer: SampleStatistics,
    pub deviations: Vec<DeviationRecord>,
    pub time_series: TimeSeries,
    pub distribution: DistributionSeries,
}

impl Analysis {
    pub fn device(&self, device_id: &str) -> Option<&SampleStatistics> {
        self.device_stats
            .iter()
            .find(|d| d.device_id == device_id)
            .map(|d| &d.stats)
    }

    pub fn flagged_devices(&self) -> impl Iterator<Item = &DeviceStatistics> {
        self.device_stats.iter().filter(|d| d.stats.cv_flagged())
    }

    pub fn flagged_records(&self) -> impl Iterator<Item = &DeviationRecord> {
        self.deviations.iter().filter(|d| d.is_flagged())
    }
}

/// Run the full pipeline: filter by test, group by device, per-device and
/// peer statistics, deviations against the peer baseline, chart series.
pub fn analyze(records: &[Record], selected_test: Option<&str>) -> Analysis {
    let selected_test = selected_test.filter(|t| !t.is_empty());
    let filtered = filter_by_test(records, selected_test);
    let grouped = group_by_device(filtered.iter().copied());

    let device_stats: Vec<DeviceStatistics> = grouped
        .iter()
        .map(|group| DeviceStatistics {
            device_id: group.device_id.to_string(),
            stats: compute_statistics(&group.values()),
        })
        .collect();

    let peer_values: Vec<f64> = filtered.iter().map(|r| r.value()).collect();
    let peer = compute_statistics(&peer_values);
    let deviations = compute_deviations(filtered.iter().copied(), &peer);

    let dates = distinct_sorted_dates(filtered.iter().copied());
    let time_series = build_time_series(&grouped, &dates);
    let distribution = build_distribution_series(&grouped);

    tracing::debug!(
        "Analyzed {} records over {} devices (test: {:?})",
        filtered.len(),
        device_stats.len(),
        selected_test
    );

    Analysis {
        tests: distinct_test_names(records),
        selected_test: selected_test.map(str::to_string),
        record_count: filtered.len(),
        device_stats,
        peer,
        deviations,
        time_series,
        distribution,
    }
}
