//! Build a [`SummaryTable`] from posterior draws.

use crate::domain::Posterior;
use crate::error::PlotError;
use crate::math::{hdi, hdi_labels, mean, sample_std};
use crate::summary::table::SummaryTable;

/// Summarize every posterior variable as `mean`, `sd` and HDI bounds.
///
/// Scalar variables give one row named after the variable; vector variables
/// give one row per element, named `name[i]`.
pub fn summarize(posterior: &Posterior, hdi_prob: f64) -> Result<SummaryTable, PlotError> {
    let (lo_label, hi_label) = hdi_labels(hdi_prob);
    let mut table = SummaryTable::new(["mean".to_string(), "sd".to_string(), lo_label, hi_label]);

    for (name, var) in posterior.variables() {
        for elem in 0..var.n_elems() {
            let samples = var.element_samples(elem)?;
            let (lo, hi) = hdi(&samples, hdi_prob)?;
            let row_name = if var.n_elems() == 1 {
                name.to_string()
            } else {
                format!("{name}[{elem}]")
            };
            let m = mean(&samples).unwrap_or(f64::NAN);
            table.push_row(row_name, vec![m, sample_std(&samples), lo, hi])?;
        }
    }

    log::debug!("summarized {} rows at hdi_prob={hdi_prob}", table.len());
    Ok(table)
}
