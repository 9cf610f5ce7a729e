//! Summary tables and hierarchical-coefficient helpers.
//!
//! - the table type itself (`table`)
//! - building a table from posterior draws (`summarize`)
//! - adding population-level terms to group offsets (`combine`)

pub mod combine;
pub mod summarize;
pub mod table;

pub use combine::*;
pub use summarize::*;
pub use table::*;
