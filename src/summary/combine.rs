//! Combine group-level offsets with their population-level baseline.
//!
//! Hierarchical models report random effects as deviations from a shared
//! term. Adding the shared row back gives per-group estimates on the
//! original scale:
//!
//! ```text
//! intercept[g] = Intercept + 1|Subject[g]
//! slope[g]     = Days      + Days|Subject[g]
//! ```

use crate::error::PlotError;
use crate::summary::table::SummaryTable;

/// Row name of the population-level intercept.
pub const INTERCEPT_ROW: &str = "Intercept";

/// Per-group intercepts: rows containing `random_key` plus the `Intercept` row.
pub fn get_intercepts(summary: &SummaryTable, random_key: &str) -> Result<SummaryTable, PlotError> {
    get_coefs(summary, INTERCEPT_ROW, random_key)
}

/// Per-group coefficients: rows containing `random_key` plus the `main_key` row.
///
/// Every column is combined, so a summary with `mean` and HDI bounds yields
/// shifted means and shifted bounds.
pub fn get_coefs(summary: &SummaryTable, main_key: &str, random_key: &str) -> Result<SummaryTable, PlotError> {
    let baseline = summary.row(main_key)?;
    let offsets = summary.filter_like(random_key);
    if offsets.is_empty() {
        log::warn!("no summary rows contain `{random_key}`; nothing to combine with `{main_key}`");
    } else {
        log::debug!(
            "combining {} `{random_key}` rows with `{main_key}`",
            offsets.len()
        );
    }
    offsets.add_row_values(baseline)
}
