//! Chart construction and rendering.
//!
//! - regression scatter + line + HDI band (`regression`)
//! - sleep-study small multiples (`subjects`)
//! - HDI bands from stacked samples (`band`)

pub mod band;
pub mod regression;
pub(crate) mod render;
pub mod subjects;

pub use band::HdiBand;
pub use regression::*;
pub use subjects::*;
