//! Input types supplied by the caller.
//!
//! This module defines:
//!
//! - the observation table the model was fitted on (`ObservationTable`)
//! - posterior draws indexed by `(chain, draw, element)` (`Posterior`)

pub mod posterior;
pub mod table;

pub use posterior::*;
pub use table::*;
