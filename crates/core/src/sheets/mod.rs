//! Spreadsheet gateway abstraction.
//!
//! This module provides a `SheetsGateway` trait for reading order rows and
//! writing per-row status cells, with a Google Sheets REST implementation.

mod google;
mod types;

pub use google::GoogleSheetsGateway;
pub use types::*;
