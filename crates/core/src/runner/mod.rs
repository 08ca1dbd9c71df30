//! Order run orchestration.
//!
//! The runner pulls rows from the spreadsheet, filters to PENDING, and
//! drives each through the form filler against one shared portal session,
//! writing a terminal status back per row.

mod run;
mod types;

pub use run::OrderRunner;
pub use types::*;
