pub mod app;
pub mod data;
pub mod error;
pub mod export;
pub mod processing;
pub mod state;
pub mod ui;

pub use data::record::{Numeric, Record, ResultValue};
pub use error::{Error, Result};
pub use processing::deviation::{compute_deviations, DeviationRecord, Z_FLAG_THRESHOLD};
pub use processing::grouping::{
    distinct_sorted_dates, distinct_test_names, filter_by_test, group_by_device, GroupedSet,
};
pub use processing::pipeline::{analyze, Analysis, DeviceStatistics};
pub use processing::series::{
    build_distribution_series, build_time_series, DistributionSeries, TimeSeries,
};
pub use processing::statistics::{compute_statistics, SampleStatistics, CV_FLAG_PERCENT};
pub use state::session::AnalysisSession;
