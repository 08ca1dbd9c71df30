//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides fake implementations of the external service
//! traits, allowing full runner/filler testing without a spreadsheet
//! backend or a live browser.
//!
//! # Example
//!
//! ```rust,ignore
//! use portico_core::testing::{FakePortalPage, FakePortalDriver, MockSheetsGateway};
//!
//! let page = FakePortalPage::new().with_visible_text("Your order has been placed.");
//! let driver = FakePortalDriver::new(page.clone());
//! let gateway = MockSheetsGateway::with_rows(vec![/* rows */]);
//!
//! // Wire into an OrderRunner...
//! ```

mod fake_portal;
mod mock_sheets;

pub use fake_portal::{FakePortalDriver, FakePortalPage, RecordedAction};
pub use mock_sheets::{MockSheetsGateway, RecordedWrite};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::sheets::OrderRow;

    /// A fully-populated pending order row in the default column layout.
    pub fn pending_row(client_name: &str) -> OrderRow {
        OrderRow::from(vec![
            "", client_name, "500 Oak St", "Durham", "NC", "27701", "1200", "Durham", "NC",
            "27701", "PENDING",
        ])
    }

    /// A row whose status keeps the runner away from it.
    pub fn row_with_status(client_name: &str, status: &str) -> OrderRow {
        OrderRow::from(vec![
            "", client_name, "500 Oak St", "Durham", "NC", "27701", "1200", "Durham", "NC",
            "27701", status,
        ])
    }

    /// A pending row with every data field empty.
    pub fn empty_pending_row() -> OrderRow {
        OrderRow::from(vec!["", "", "", "", "", "", "", "", "", "", "PENDING"])
    }
}
