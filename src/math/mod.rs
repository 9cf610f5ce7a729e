//! Numeric utilities: highest density intervals, descriptive statistics and
//! band smoothing.

pub mod hdi;
pub mod smooth;
pub mod stats;

pub use hdi::*;
pub use smooth::*;
pub use stats::*;
