//! Chart Request Module
//! A named chart type plus the prepared table it should show.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Chart type hint handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Donut,
    StackedBar,
    Bar,
    HorizontalBar,
    Treemap,
    /// A text message shown instead of a chart.
    Notice,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Donut => "donut",
            ChartKind::StackedBar => "stacked bar",
            ChartKind::Bar => "bar",
            ChartKind::HorizontalBar => "horizontal bar",
            ChartKind::Treemap => "treemap",
            ChartKind::Notice => "notice",
        }
    }
}

/// Prepared data for one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartTable {
    /// Label -> value, drawn in the given order.
    Categories(Vec<(String, f64)>),
    /// Row label x column label values, one stack per row.
    Matrix {
        rows: Vec<String>,
        columns: Vec<String>,
        values: Vec<Vec<f64>>,
    },
    Message(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("chart '{title}' has no data")]
    Empty { title: String },
    #[error("{} chart '{title}' needs {needed}", .kind.as_str())]
    Unsupported {
        kind: ChartKind,
        title: String,
        needed: &'static str,
    },
    #[error("chart '{title}' has invalid value {value}")]
    InvalidValue { title: String, value: f64 },
    #[error("chart '{title}' matrix is not rectangular")]
    Ragged { title: String },
}

/// A chart to draw: type hint, titles and the data table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRequest {
    /// Stable identifier, used for output file names.
    pub name: String,
    pub kind: ChartKind,
    /// The kind asked for before any fallback.
    pub requested: ChartKind,
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub table: ChartTable,
}

impl ChartRequest {
    pub fn new(
        name: impl Into<String>,
        kind: ChartKind,
        title: impl Into<String>,
        table: ChartTable,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            requested: kind,
            title: title.into(),
            x_label: None,
            y_label: None,
            table,
        }
    }

    pub fn notice(
        name: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            ChartKind::Notice,
            title,
            ChartTable::Message(message.into()),
        )
    }

    pub fn with_axes(mut self, x_label: &str, y_label: &str) -> Self {
        self.x_label = Some(x_label.to_string());
        self.y_label = Some(y_label.to_string());
        self
    }

    /// True when this request is a fallback for a different kind.
    pub fn is_fallback(&self) -> bool {
        self.kind != self.requested
    }

    /// Check that the table can be drawn as `kind`.
    pub fn validate(&self) -> Result<(), ChartError> {
        match (&self.kind, &self.table) {
            (ChartKind::Notice, ChartTable::Message(_)) => Ok(()),
            (ChartKind::StackedBar, ChartTable::Matrix { rows, columns, values }) => {
                if rows.is_empty() || columns.is_empty() {
                    return Err(self.empty());
                }
                if values.len() != rows.len() || values.iter().any(|r| r.len() != columns.len()) {
                    return Err(ChartError::Ragged {
                        title: self.title.clone(),
                    });
                }
                self.check_values(values.iter().flatten().copied())
            }
            (
                ChartKind::Donut | ChartKind::Bar | ChartKind::HorizontalBar | ChartKind::Treemap,
                ChartTable::Categories(data),
            ) => {
                if data.is_empty() {
                    return Err(self.empty());
                }
                self.check_values(data.iter().map(|(_, v)| *v))?;

                let total: f64 = data.iter().map(|(_, v)| v).sum();
                match self.kind {
                    ChartKind::Donut | ChartKind::Treemap if total <= 0.0 => {
                        Err(self.unsupported("a positive total"))
                    }
                    ChartKind::Treemap if data.len() < 2 => {
                        Err(self.unsupported("at least 2 labels"))
                    }
                    _ => Ok(()),
                }
            }
            (ChartKind::Notice, _) => Err(self.unsupported("a message")),
            (ChartKind::StackedBar, _) => Err(self.unsupported("a matrix table")),
            _ => Err(self.unsupported("a category table")),
        }
    }

    /// The next simpler representation of this chart, if any.
    ///
    /// Treemap -> horizontal bar, donut -> bar, stacked bar -> horizontal
    /// bar over "row / column" labels, any bar -> notice.
    pub fn degrade(&self) -> Option<ChartRequest> {
        let (kind, table) = match (&self.kind, &self.table) {
            (ChartKind::Notice, _) => return None,
            (ChartKind::Treemap, ChartTable::Categories(_)) => {
                (ChartKind::HorizontalBar, self.table.clone())
            }
            (ChartKind::Donut, ChartTable::Categories(_)) => (ChartKind::Bar, self.table.clone()),
            (ChartKind::StackedBar, ChartTable::Matrix { rows, columns, values })
                if !rows.is_empty() && !columns.is_empty() =>
            {
                let flat = rows
                    .iter()
                    .zip(values)
                    .flat_map(|(row, vals)| {
                        columns
                            .iter()
                            .zip(vals)
                            .map(move |(col, v)| (format!("{row} / {col}"), *v))
                    })
                    .collect();
                (ChartKind::HorizontalBar, ChartTable::Categories(flat))
            }
            _ => (
                ChartKind::Notice,
                ChartTable::Message(format!("No data available for {}.", self.title)),
            ),
        };

        Some(ChartRequest {
            kind,
            table,
            ..self.clone()
        })
    }

    /// Walk the fallback chain until a representation validates.
    pub fn prepare(self) -> ChartRequest {
        let mut current = self;
        loop {
            let err = match current.validate() {
                Ok(()) => return current,
                Err(err) => err,
            };
            match current.degrade() {
                Some(next) => {
                    warn!(
                        chart = %current.name,
                        from = current.kind.as_str(),
                        to = next.kind.as_str(),
                        error = %err,
                        "chart data unusable, falling back"
                    );
                    current = next;
                }
                None => {
                    warn!(chart = %current.name, error = %err, "chart has no usable fallback");
                    return current;
                }
            }
        }
    }

    fn check_values(&self, values: impl Iterator<Item = f64>) -> Result<(), ChartError> {
        for value in values {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidValue {
                    title: self.title.clone(),
                    value,
                });
            }
        }
        Ok(())
    }

    fn empty(&self) -> ChartError {
        ChartError::Empty {
            title: self.title.clone(),
        }
    }

    fn unsupported(&self, needed: &'static str) -> ChartError {
        ChartError::Unsupported {
            kind: self.kind,
            title: self.title.clone(),
            needed,
        }
    }
}
