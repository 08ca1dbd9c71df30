//! Types for the order runner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ColumnMap, Config};
use crate::portal::SessionError;
use crate::sheets::SheetsError;

/// Run-fatal errors. Row-local failures never surface here; they end up in
/// the row's result cell instead.
#[derive(Debug, Error)]
pub enum RunError {
    /// Spreadsheet read failed before any row was touched.
    #[error("spreadsheet error: {0}")]
    Sheets(#[from] SheetsError),

    /// The portal session could not be established.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

/// Explicit run configuration, passed into the runner rather than read from
/// globals.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub columns: ColumnMap,
    pub header_rows: u32,
}

impl From<&Config> for RunnerConfig {
    fn from(config: &Config) -> Self {
        Self {
            columns: config.columns.clone(),
            header_rows: config.sheets.header_rows,
        }
    }
}

/// Summary of one completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Rows read from the sheet.
    pub total_rows: usize,
    /// Rows that were PENDING and ran to a terminal outcome.
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Rows left untouched (status not PENDING).
    pub skipped: usize,
}

impl RunReport {
    pub fn new(run_id: String, started_at: DateTime<Utc>, total_rows: usize) -> Self {
        Self {
            run_id,
            started_at,
            finished_at: started_at,
            total_rows,
            processed: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serialization() {
        let mut report = RunReport::new("run-1".to_string(), Utc::now(), 3);
        report.processed = 2;
        report.succeeded = 1;
        report.failed = 1;
        report.skipped = 1;

        let json = serde_json::to_string(&report).unwrap();
        let parsed: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.run_id, "run-1");
        assert_eq!(parsed.total_rows, 3);
        assert_eq!(parsed.succeeded, 1);
    }

    #[test]
    fn test_runner_config_from_config() {
        let config = crate::config::load_config_from_str(
            r#"
[sheets]
spreadsheet_id = "s"
token = "t"
header_rows = 2
"#,
        )
        .unwrap();
        let runner_config = RunnerConfig::from(&config);
        assert_eq!(runner_config.header_rows, 2);
        assert_eq!(runner_config.columns.status, 10);
    }

    #[test]
    fn test_error_display() {
        let err = RunError::Sheets(SheetsError::Timeout);
        assert_eq!(err.to_string(), "spreadsheet error: sheets request timed out");
    }
}
