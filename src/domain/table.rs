//! Observation table: the rows a model was fitted on.
//!
//! The table is a small column store. Rows are addressed by their 0-based
//! position, which is also how per-observation posterior variables are indexed
//! (element `i` of `Reaction_mean` belongs to row `i`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PlotError};

/// A single column of observations.
///
/// Untagged so JSON arrays of numbers and arrays of strings both deserialize
/// without a wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Column {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label of row `i` as used for grouping.
    ///
    /// Whole numbers render without a fractional part so numeric subject ids
    /// (`308.0`) group and print as `308`.
    fn label_at(&self, i: usize) -> String {
        match self {
            Column::Numeric(v) => format_label(v[i]),
            Column::Text(v) => v[i].clone(),
        }
    }
}

fn format_label(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Named, equal-length columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Column>", into = "BTreeMap<String, Column>")]
pub struct ObservationTable {
    columns: BTreeMap<String, Column>,
    n_rows: usize,
}

impl ObservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a column, checking its length against existing columns.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self, PlotError> {
        let name = name.into();
        let others = self.columns.iter().filter(|(k, _)| **k != name).count();
        if others > 0 && column.len() != self.n_rows {
            return Err(PlotError::new(
                ErrorKind::Shape,
                format!(
                    "Column '{name}' has {} rows, table has {}.",
                    column.len(),
                    self.n_rows
                ),
            ));
        }
        self.n_rows = column.len();
        self.columns.insert(name, column);
        Ok(self)
    }

    pub fn with_numeric(self, name: impl Into<String>, values: Vec<f64>) -> Result<Self, PlotError> {
        self.with_column(name, Column::Numeric(values))
    }

    pub fn with_text(self, name: impl Into<String>, values: Vec<String>) -> Result<Self, PlotError> {
        self.with_column(name, Column::Text(values))
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Result<&Column, PlotError> {
        self.columns.get(name).ok_or_else(|| {
            PlotError::new(
                ErrorKind::MissingColumn,
                format!("Missing column: `{name}`"),
            )
        })
    }

    /// Borrow a numeric column.
    pub fn numeric(&self, name: &str) -> Result<&[f64], PlotError> {
        match self.column(name)? {
            Column::Numeric(values) => Ok(values),
            Column::Text(_) => Err(PlotError::new(
                ErrorKind::InvalidInput,
                format!("Column `{name}` is not numeric."),
            )),
        }
    }

    /// Distinct labels of a column in order of first appearance.
    pub fn unique_labels(&self, name: &str) -> Result<Vec<String>, PlotError> {
        let column = self.column(name)?;
        let mut seen = Vec::new();
        for i in 0..column.len() {
            let label = column.label_at(i);
            if !seen.contains(&label) {
                seen.push(label);
            }
        }
        Ok(seen)
    }

    /// Row positions whose label in `name` equals `label`.
    pub fn rows_matching(&self, name: &str, label: &str) -> Result<Vec<usize>, PlotError> {
        let column = self.column(name)?;
        Ok((0..column.len())
            .filter(|&i| column.label_at(i) == label)
            .collect())
    }
}

impl TryFrom<BTreeMap<String, Column>> for ObservationTable {
    type Error = PlotError;

    fn try_from(columns: BTreeMap<String, Column>) -> Result<Self, Self::Error> {
        columns
            .into_iter()
            .try_fold(ObservationTable::new(), |table, (name, column)| {
                table.with_column(name, column)
            })
    }
}

impl From<ObservationTable> for BTreeMap<String, Column> {
    fn from(table: ObservationTable) -> Self {
        table.columns
    }
}

/// Distinct values in order of first appearance (`pandas.unique` semantics).
pub fn unique_values(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::new();
    for &v in values {
        if !out.iter().any(|&u| u == v || (u.is_nan() && v.is_nan())) {
            out.push(v);
        }
    }
    out
}
