use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the spreadsheet backend.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// The backing credential lacks permission on the spreadsheet.
    #[error("access denied to spreadsheet {resource}: {message}")]
    AccessDenied { resource: String, message: String },

    /// Request timed out.
    #[error("sheets request timed out")]
    Timeout,

    /// Could not reach the backend.
    #[error("failed to connect to sheets API: {0}")]
    ConnectionFailed(String),

    /// Backend rejected the request or returned an unusable response.
    #[error("sheets API error: {0}")]
    Api(String),

    /// The configured credential could not be loaded.
    #[error("sheets credential unavailable: {0}")]
    Credential(String),
}

impl SheetsError {
    /// Permission errors are run-fatal and carry an actionable message;
    /// everything else is the transient class.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, SheetsError::AccessDenied { .. })
    }
}

/// One order record, read positionally from the sheet.
///
/// Access never fails: positions beyond the stored fields read as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderRow(Vec<String>);

impl OrderRow {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// Field at `position`, or `""` when the row is shorter than that.
    pub fn field(&self, position: usize) -> &str {
        self.0.get(position).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<&str>> for OrderRow {
    fn from(fields: Vec<&str>) -> Self {
        Self(fields.into_iter().map(str::to_string).collect())
    }
}

/// Per-row processing status, owned by the runner.
///
/// Advances one way: PENDING -> IN_PROGRESS -> DONE | FAILED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStatus {
    Pending,
    InProgress,
    Done,
    Failed,
}

impl RowStatus {
    /// Parse a stored status cell, case-insensitive and whitespace-trimmed.
    /// Anything unrecognized is `None` and the row is left untouched.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(RowStatus::Pending),
            "IN_PROGRESS" => Some(RowStatus::InProgress),
            "DONE" => Some(RowStatus::Done),
            "FAILED" => Some(RowStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Pending => "PENDING",
            RowStatus::InProgress => "IN_PROGRESS",
            RowStatus::Done => "DONE",
            RowStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spreadsheet gateway: row reads and single-cell writes.
///
/// `row` is the 1-based sheet row (callers add the header offset); `column`
/// is the 1-based column index. Writes are idempotent: re-applying the same
/// value is safe and produces the same stored state.
#[async_trait]
pub trait SheetsGateway: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch all data rows from the configured range. Not retried here;
    /// errors propagate to the caller.
    async fn read_rows(&self) -> Result<Vec<OrderRow>, SheetsError>;

    /// Write a single cell.
    async fn write_field(&self, row: u32, column: u32, value: &str) -> Result<(), SheetsError>;
}

/// 1-based column index to sheet column letters (1 -> A, 27 -> AA).
pub fn column_letter(mut index: u32) -> String {
    debug_assert!(index >= 1);
    let mut letters = Vec::new();
    while index > 0 {
        let rem = ((index - 1) % 26) as u8;
        letters.push(b'A' + rem);
        index = (index - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap()
}
