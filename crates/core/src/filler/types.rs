use serde::{Deserialize, Serialize};

use crate::config::ColumnMap;
use crate::sheets::OrderRow;

/// Terminal outcome of one order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderOutcome {
    Success,
    Failure(String),
}

impl OrderOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, OrderOutcome::Success)
    }

    /// Stored failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            OrderOutcome::Success => None,
            OrderOutcome::Failure(msg) => Some(msg),
        }
    }
}

/// Whether a step failure aborts the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Failure aborts the remaining steps and fails the row.
    Mandatory,
    /// Failure is expected portal variability; swallowed, sequence continues.
    BestEffort,
}

/// Result of attempting one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// The step decided it does not apply (e.g. no client name to match).
    Skipped(&'static str),
}

/// The named fields of one order, extracted from a positional row.
///
/// Extraction never fails; absent positions read as empty and the filler
/// substitutes its configured defaults.
#[derive(Debug, Clone, Default)]
pub struct OrderFields {
    pub package: String,
    pub client_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub sqft: String,
    pub billing_city: String,
    pub billing_state: String,
    pub billing_zip: String,
}

impl OrderFields {
    pub fn from_row(row: &OrderRow, columns: &ColumnMap) -> Self {
        Self {
            package: row.field(columns.package).to_string(),
            client_name: row.field(columns.client_name).to_string(),
            address: row.field(columns.address).to_string(),
            city: row.field(columns.city).to_string(),
            state: row.field(columns.state).to_string(),
            zip: row.field(columns.zip).to_string(),
            sqft: row.field(columns.sqft).to_string(),
            billing_city: row.field(columns.billing_city).to_string(),
            billing_state: row.field(columns.billing_state).to_string(),
            billing_zip: row.field(columns.billing_zip).to_string(),
        }
    }
}
