//! Posterior summary table: one row per parameter, one column per statistic.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PlotError};

/// A labelled row of a [`SummaryTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub name: String,
    pub values: Vec<f64>,
}

/// Rows keyed by parameter name, in insertion order.
///
/// Row names follow the sampler's conventions, e.g. `Intercept`, `Days`,
/// `1|Subject[308]`, `Days|Subject[308]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSummary", into = "RawSummary")]
pub struct SummaryTable {
    columns: Vec<String>,
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; its length must match the column count.
    pub fn push_row(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), PlotError> {
        let name = name.into();
        if values.len() != self.columns.len() {
            return Err(PlotError::new(
                ErrorKind::Shape,
                format!(
                    "Row '{name}' has {} values, table has {} columns.",
                    values.len(),
                    self.columns.len()
                ),
            ));
        }
        self.rows.push(SummaryRow { name, values });
        Ok(())
    }

    pub fn with_row(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self, PlotError> {
        self.push_row(name, values)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the first row named exactly `name`.
    pub fn row(&self, name: &str) -> Result<&[f64], PlotError> {
        self.rows
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.values.as_slice())
            .ok_or_else(|| {
                PlotError::new(ErrorKind::MissingRow, format!("Summary has no row `{name}`."))
            })
    }

    /// Single cell lookup by row and column name.
    pub fn get(&self, row: &str, column: &str) -> Result<f64, PlotError> {
        let col = self.columns.iter().position(|c| c == column).ok_or_else(|| {
            PlotError::new(
                ErrorKind::MissingColumn,
                format!("Summary has no column `{column}`."),
            )
        })?;
        Ok(self.row(row)?[col])
    }

    /// Rows whose name contains `needle`, order preserved.
    pub fn filter_like(&self, needle: &str) -> SummaryTable {
        SummaryTable {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| r.name.contains(needle))
                .cloned()
                .collect(),
        }
    }

    /// Add `offset` column-wise to every row.
    pub fn add_row_values(&self, offset: &[f64]) -> Result<SummaryTable, PlotError> {
        if offset.len() != self.columns.len() {
            return Err(PlotError::new(
                ErrorKind::Shape,
                format!(
                    "Cannot add {} values to a table with {} columns.",
                    offset.len(),
                    self.columns.len()
                ),
            ));
        }
        Ok(SummaryTable {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .map(|r| SummaryRow {
                    name: r.name.clone(),
                    values: r.values.iter().zip(offset).map(|(a, b)| a + b).collect(),
                })
                .collect(),
        })
    }
}

/// Unchecked wire form; rows are validated on the way in.
#[derive(Serialize, Deserialize)]
struct RawSummary {
    columns: Vec<String>,
    rows: Vec<SummaryRow>,
}

impl TryFrom<RawSummary> for SummaryTable {
    type Error = PlotError;

    fn try_from(raw: RawSummary) -> Result<Self, Self::Error> {
        raw.rows
            .into_iter()
            .try_fold(SummaryTable::new(raw.columns), |table, row| {
                table.with_row(row.name, row.values)
            })
    }
}

impl From<SummaryTable> for RawSummary {
    fn from(table: SummaryTable) -> Self {
        Self {
            columns: table.columns,
            rows: table.rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> SummaryTable {
        SummaryTable::new(["mean", "sd"])
            .with_row("Intercept", vec![250.0, 7.0])
            .unwrap()
            .with_row("1|Subject[308]", vec![40.0, 12.0])
            .unwrap()
            .with_row("Days|Subject[308]", vec![9.0, 3.0])
            .unwrap()
    }

    #[test]
    fn filter_like_is_substring_match() {
        let t = summary().filter_like("1|Subject");
        assert_eq!(t.len(), 1);
        assert_eq!(t.rows()[0].name, "1|Subject[308]");
        assert_eq!(summary().filter_like("Subject").len(), 2);
        assert!(summary().filter_like("Nope").is_empty());
    }

    #[test]
    fn cell_lookup_reports_missing_pieces() {
        let t = summary();
        assert_eq!(t.get("Intercept", "sd").unwrap(), 7.0);
        assert_eq!(t.get("Days", "mean").unwrap_err().kind(), ErrorKind::MissingRow);
        assert_eq!(t.get("Intercept", "r_hat").unwrap_err().kind(), ErrorKind::MissingColumn);
    }

    #[test]
    fn push_row_checks_width() {
        let mut t = SummaryTable::new(["mean"]);
        assert_eq!(t.push_row("x", vec![1.0, 2.0]).unwrap_err().kind(), ErrorKind::Shape);
    }

    #[test]
    fn round_trips_through_json() {
        let t = summary();
        let json = serde_json::to_string(&t).unwrap();
        let back: SummaryTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn ragged_json_rows_are_rejected() {
        let json = r#"{"columns":["mean","sd"],"rows":[{"name":"1|Subject","values":[2.0]}]}"#;
        let err = serde_json::from_str::<SummaryTable>(json).unwrap_err();
        assert!(err.to_string().contains("1|Subject"), "{err}");
    }
}
