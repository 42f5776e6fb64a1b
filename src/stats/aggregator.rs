//! Aggregator Module
//! Frequency counts, cross-tabulations and top-N rankings.
//!
//! Labels are grouped case-insensitively; the first spelling seen becomes
//! the label.

use serde::Serialize;
use std::collections::HashMap;

/// One label and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub label: String,
    pub count: usize,
}

/// Label counts ordered by descending count, ties in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.count)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|e| (e.label.as_str(), e.count))
    }
}

/// Interns labels by their case-folded form.
#[derive(Default)]
struct LabelIndex {
    ids: HashMap<String, usize>,
    labels: Vec<String>,
}

impl LabelIndex {
    fn intern(&mut self, label: &str) -> usize {
        let key = label.to_lowercase();
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = self.labels.len();
        self.ids.insert(key, id);
        self.labels.push(label.to_string());
        id
    }

    /// Labels sorted alphabetically, plus each id's position in that order.
    fn into_sorted(self) -> (Vec<String>, Vec<usize>) {
        let mut order: Vec<usize> = (0..self.labels.len()).collect();
        order.sort_by(|&a, &b| self.labels[a].cmp(&self.labels[b]));

        let mut position = vec![0; order.len()];
        for (pos, &id) in order.iter().enumerate() {
            position[id] = pos;
        }

        let mut labels = self.labels;
        let sorted = order.iter().map(|&id| std::mem::take(&mut labels[id])).collect();
        (sorted, position)
    }
}

/// Count occurrences of each value, most frequent first.
pub fn value_counts<S: AsRef<str>>(values: &[S]) -> FrequencyTable {
    let mut index = LabelIndex::default();
    let mut counts: Vec<usize> = Vec::new();

    for value in values {
        let id = index.intern(value.as_ref());
        if id == counts.len() {
            counts.push(0);
        }
        counts[id] += 1;
    }

    let mut entries: Vec<FrequencyEntry> = index
        .labels
        .into_iter()
        .zip(counts)
        .map(|(label, count)| FrequencyEntry { label, count })
        .collect();
    // Stable sort keeps first-seen order among equal counts
    entries.sort_by(|a, b| b.count.cmp(&a.count));

    FrequencyTable { entries }
}

/// Joint counts of two categorical series, row label x column label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrossTab {
    rows: Vec<String>,
    columns: Vec<String>,
    counts: Vec<Vec<usize>>,
}

impl CrossTab {
    /// Build from explicit labels and counts.
    ///
    /// `counts` is padded or truncated to `rows.len()` x `columns.len()`.
    pub fn new(rows: Vec<String>, columns: Vec<String>, mut counts: Vec<Vec<usize>>) -> Self {
        counts.resize_with(rows.len(), Vec::new);
        for row in &mut counts {
            row.resize(columns.len(), 0);
        }
        Self {
            rows,
            columns,
            counts,
        }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn counts(&self) -> &[Vec<usize>] {
        &self.counts
    }

    pub fn get(&self, row: &str, column: &str) -> Option<usize> {
        let r = self.rows.iter().position(|l| l == row)?;
        let c = self.columns.iter().position(|l| l == column)?;
        Some(self.counts[r][c])
    }

    pub fn row_total(&self, row: usize) -> usize {
        self.counts.get(row).map(|r| r.iter().sum()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

/// Count each (a, b) pair of two aligned series.
///
/// Rows and columns are sorted by label. Extra trailing values of the
/// longer series are ignored.
pub fn cross_tab<A: AsRef<str>, B: AsRef<str>>(series_a: &[A], series_b: &[B]) -> CrossTab {
    let mut row_index = LabelIndex::default();
    let mut col_index = LabelIndex::default();

    let pairs: Vec<(usize, usize)> = series_a
        .iter()
        .zip(series_b)
        .map(|(a, b)| (row_index.intern(a.as_ref()), col_index.intern(b.as_ref())))
        .collect();

    let (rows, row_pos) = row_index.into_sorted();
    let (columns, col_pos) = col_index.into_sorted();

    let mut counts = vec![vec![0usize; columns.len()]; rows.len()];
    for (r, c) in pairs {
        counts[row_pos[r]][col_pos[c]] += 1;
    }

    CrossTab {
        rows,
        columns,
        counts,
    }
}

/// Row-normalized view of a [`CrossTab`], each row in percent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PercentageTable {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl PercentageTable {
    pub fn row_sum(&self, row: usize) -> f64 {
        self.values.get(row).map(|r| r.iter().sum()).unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

/// Divide each row by its total and scale to 100.
///
/// Rows without observations come out as all zeros.
pub fn row_normalize(crosstab: &CrossTab) -> PercentageTable {
    let values = crosstab
        .counts
        .iter()
        .map(|row| {
            let total: usize = row.iter().sum();
            row.iter()
                .map(|&count| {
                    if total == 0 {
                        return 0.0;
                    }
                    let pct = count as f64 / total as f64 * 100.0;
                    if pct.is_finite() {
                        pct
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect();

    PercentageTable {
        rows: crosstab.rows.clone(),
        columns: crosstab.columns.clone(),
        values,
    }
}

/// First `n` entries of `table` in its existing order.
pub fn top_n(table: &FrequencyTable, n: usize) -> Vec<(String, usize)> {
    table
        .entries
        .iter()
        .take(n)
        .map(|e| (e.label.clone(), e.count))
        .collect()
}
