//! Survey CSV Loader Module
//! Reads the response table with Polars and trims header names.

use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Could not find the CSV at: {path}")]
    NotFound { path: PathBuf },
    #[error("Error loading CSV {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl LoaderError {
    fn parse(path: &Path, err: impl std::fmt::Display) -> Self {
        LoaderError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// The survey responses as read from disk, one row per submission.
///
/// Column names are trimmed once at construction and never change. Every
/// column is held as text; cells are otherwise exactly what the file had.
#[derive(Debug, Clone)]
pub struct ResponseTable {
    df: DataFrame,
}

impl ResponseTable {
    /// Wrap a DataFrame, trimming surrounding whitespace from column names.
    ///
    /// Fails when two names collapse to the same trimmed name.
    pub fn from_dataframe(df: DataFrame) -> PolarsResult<Self> {
        let columns: Vec<Column> = df
            .get_columns()
            .iter()
            .map(|col| {
                let mut col = col.clone();
                let trimmed = col.name().trim().to_string();
                col.rename(trimmed.into());
                col
            })
            .collect();

        Ok(Self {
            df: DataFrame::new(columns)?,
        })
    }

    /// Build a table from in-memory columns of optional cells.
    pub fn from_columns(columns: Vec<(&str, Vec<Option<&str>>)>) -> PolarsResult<Self> {
        let columns: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| Column::new(name.into(), values))
            .collect();
        Self::from_dataframe(DataFrame::new(columns)?)
    }

    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            df: DataFrame::empty(),
        }
    }

    /// Number of responses.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.df.column(column).is_ok()
    }

    /// Raw cells of a column in row order, `None` for missing cells.
    ///
    /// Returns `None` when the column does not exist.
    pub fn cells(&self, column: &str) -> Option<Vec<Option<String>>> {
        let col = self.df.column(column).ok()?;
        let series = col.cast(&DataType::String).ok()?.take_materialized_series();
        let values = series.str().ok()?;
        Some(values.iter().map(|v| v.map(str::to_string)).collect())
    }
}

/// Load the survey CSV at `path`.
///
/// Every column is read as text so free-text answers survive untouched.
/// A path that is not a readable file yields [`LoaderError::NotFound`];
/// anything else that goes wrong while reading yields [`LoaderError::Parse`].
pub fn load(path: &Path) -> Result<ResponseTable, LoaderError> {
    let not_found = || LoaderError::NotFound {
        path: path.to_path_buf(),
    };

    let is_file = std::fs::metadata(path)
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(not_found());
    }
    let file = File::open(path).map_err(|e| {
        debug!(path = %path.display(), error = %e, "survey CSV is not readable");
        not_found()
    })?;

    debug!(path = %path.display(), "reading survey CSV");

    // Schema inference length 0 keeps every column as String
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| LoaderError::parse(path, e))?;

    let table = ResponseTable::from_dataframe(df).map_err(|e| LoaderError::parse(path, e))?;

    info!(
        path = %path.display(),
        rows = table.height(),
        columns = table.column_names().len(),
        "loaded survey responses"
    );

    Ok(table)
}
