use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::session::AnalysisSession;
use crate::state::theme::Theme;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extension used for saved sessions.
pub const SESSION_EXTENSION: &str = "eqa.json";

/// Everything the viewer persists between runs: the session and the theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub session: AnalysisSession,
    #[serde(default)]
    pub theme: Theme,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save the state as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!("Session saved to {:?}", path);
        Ok(())
    }

    /// Load a state previously written by [`AppState::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let state = Self::from_json(&json)?;
        tracing::info!(
            "Session loaded from {:?} ({} records)",
            path,
            state.session.records.len()
        );
        Ok(state)
    }
}
