//! Order form filling.
//!
//! Drives one order through the vendor's multi-screen form as a linear
//! sequence of `FormStep`s, each either mandatory or best-effort, ending in
//! a terminal `OrderOutcome`.

mod flow;
mod steps;
mod types;

pub use flow::{OrderFormFiller, CONFIRMATION_TEXT};
pub use steps::{schedule_days, FormStep};
pub use types::*;
