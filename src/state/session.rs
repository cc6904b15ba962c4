use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::data::loader::{LoadedData, QuarantinedRow};
use crate::data::record::Record;
use crate::processing::grouping::distinct_test_names;
use crate::processing::pipeline::{self, Analysis};

/// The dataset under analysis and the user's current test selection.
///
/// Owned by the caller and handed to the pipeline explicitly; nothing is
/// shared between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSession {
    pub records: Vec<Record>,
    /// `None` analyses every test.
    pub selected_test: Option<String>,
    /// File the records were loaded from, if any.
    #[serde(default)]
    pub source: Option<PathBuf>,
    /// Rows the loader refused, kept so the user can be told about them.
    #[serde(default)]
    pub quarantined: Vec<QuarantinedRow>,
}

impl AnalysisSession {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records, ..Default::default() }
    }

    /// Start a session from freshly loaded file contents.
    pub fn from_loaded(loaded: LoadedData, source: PathBuf) -> Self {
        Self {
            records: loaded.records,
            selected_test: None,
            source: Some(source),
            quarantined: loaded.quarantined,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Select a test; `None` or an empty name clears the filter.
    pub fn select_test(&mut self, test: Option<String>) {
        self.selected_test = test.filter(|t| !t.is_empty());
    }

    pub fn tests(&self) -> Vec<String> {
        distinct_test_names(&self.records)
    }

    /// The first `n` records, in file order.
    pub fn preview(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Run the full pipeline over the session's records.
    pub fn analyze(&self) -> Analysis {
        pipeline::analyze(&self.records, self.selected_test.as_deref())
    }
}
