//! Travel Survey - faculty travel survey analysis
//!
//! Loads the survey CSV, derives headline percentages, frequency tables,
//! cross-tabulations and reason counts, and turns them into chart requests.
//!
//! ```ignore
//! use std::path::Path;
//! use travel_survey::{generate_report_from_path, ReportSettings};
//!
//! let settings = ReportSettings::default();
//! let report = generate_report_from_path(Path::new("Faculty_Travel_Survey.csv"), &settings)?;
//! for metric in report.headline_metrics() {
//!     println!("{}: {}", metric.label, metric.value);
//! }
//! ```

pub mod charts;
pub mod config;
pub mod data;
pub mod logging;
pub mod report;
pub mod stats;

pub use config::{ConfigError, ReportSettings};
pub use data::{load, CachedLoader, LoaderError, ResponseTable};
pub use report::{generate_report_from_path, HeadlineMetric, Report, ReportError};
