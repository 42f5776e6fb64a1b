//! Report settings, optionally read from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Tunables for report assembly and chart rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Bars in the ride-hailing reasons chart.
    pub top_reasons: usize,
    /// Labels passed to the carpool reasons chart.
    pub carpool_reason_limit: usize,
    pub chart_width: u32,
    pub chart_height: u32,
    /// Render pool size; 0 uses the rayon default.
    pub render_threads: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_reasons: 15,
            carpool_reason_limit: 50,
            chart_width: 1200,
            chart_height: 800,
            render_threads: 0,
        }
    }
}

impl ReportSettings {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
