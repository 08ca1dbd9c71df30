//! Mock spreadsheet gateway for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::sheets::{OrderRow, SheetsError, SheetsGateway};

/// A recorded cell write for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub row: u32,
    pub column: u32,
    pub value: String,
}

/// Mock implementation of the `SheetsGateway` trait.
///
/// Provides controllable behavior for testing:
/// - Serve configurable rows
/// - Record every cell write, and keep final cell state for idempotence checks
/// - Inject one-shot read/write errors
pub struct MockSheetsGateway {
    rows: Mutex<Vec<OrderRow>>,
    writes: Mutex<Vec<RecordedWrite>>,
    cells: Mutex<HashMap<(u32, u32), String>>,
    next_read_error: Mutex<Option<SheetsError>>,
    next_write_error: Mutex<Option<SheetsError>>,
}

impl Default for MockSheetsGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSheetsGateway {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            cells: Mutex::new(HashMap::new()),
            next_read_error: Mutex::new(None),
            next_write_error: Mutex::new(None),
        }
    }

    pub fn with_rows(rows: Vec<OrderRow>) -> Self {
        let gateway = Self::new();
        *gateway.rows.lock().unwrap() = rows;
        gateway
    }

    pub fn set_rows(&self, rows: Vec<OrderRow>) {
        *self.rows.lock().unwrap() = rows;
    }

    /// Fail the next read_rows with this error.
    pub fn set_next_read_error(&self, error: SheetsError) {
        *self.next_read_error.lock().unwrap() = Some(error);
    }

    /// Fail the next write_field with this error.
    pub fn set_next_write_error(&self, error: SheetsError) {
        *self.next_write_error.lock().unwrap() = Some(error);
    }

    /// Every write in order.
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// Final stored value of a cell, if ever written.
    pub fn cell(&self, row: u32, column: u32) -> Option<String> {
        self.cells.lock().unwrap().get(&(row, column)).cloned()
    }

    /// Writes targeting one cell, in order.
    pub fn cell_history(&self, row: u32, column: u32) -> Vec<String> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.row == row && w.column == column)
            .map(|w| w.value.clone())
            .collect()
    }
}

#[async_trait]
impl SheetsGateway for MockSheetsGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn read_rows(&self) -> Result<Vec<OrderRow>, SheetsError> {
        if let Some(error) = self.next_read_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn write_field(&self, row: u32, column: u32, value: &str) -> Result<(), SheetsError> {
        if let Some(error) = self.next_write_error.lock().unwrap().take() {
            return Err(error);
        }
        self.writes.lock().unwrap().push(RecordedWrite {
            row,
            column,
            value: value.to_string(),
        });
        self.cells
            .lock()
            .unwrap()
            .insert((row, column), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_serves_rows() {
        let gateway = MockSheetsGateway::with_rows(vec![
            fixtures::pending_row("Jane Doe"),
            fixtures::row_with_status("Al Smith", "DONE"),
        ]);
        let rows = gateway.read_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].field(1), "Jane Doe");
    }

    #[tokio::test]
    async fn test_records_writes() {
        let gateway = MockSheetsGateway::new();
        gateway.write_field(2, 11, "IN_PROGRESS").await.unwrap();
        gateway.write_field(2, 11, "DONE").await.unwrap();

        assert_eq!(gateway.write_count(), 2);
        assert_eq!(gateway.cell(2, 11).as_deref(), Some("DONE"));
        assert_eq!(gateway.cell_history(2, 11), vec!["IN_PROGRESS", "DONE"]);
    }

    #[tokio::test]
    async fn test_write_idempotence() {
        let gateway = MockSheetsGateway::new();
        gateway.write_field(3, 12, "ORDER_SUCCESS").await.unwrap();
        gateway.write_field(3, 12, "ORDER_SUCCESS").await.unwrap();
        assert_eq!(gateway.cell(3, 12).as_deref(), Some("ORDER_SUCCESS"));
    }

    #[tokio::test]
    async fn test_read_error_injection() {
        let gateway = MockSheetsGateway::new();
        gateway.set_next_read_error(SheetsError::AccessDenied {
            resource: "sheet-1".to_string(),
            message: "no scope".to_string(),
        });

        let result = gateway.read_rows().await;
        assert!(matches!(result, Err(SheetsError::AccessDenied { .. })));

        // Error is consumed.
        assert!(gateway.read_rows().await.is_ok());
    }

    #[tokio::test]
    async fn test_write_error_injection() {
        let gateway = MockSheetsGateway::new();
        gateway.set_next_write_error(SheetsError::Api("backend rejected".to_string()));

        assert!(gateway.write_field(2, 1, "x").await.is_err());
        assert!(gateway.write_field(2, 1, "x").await.is_ok());
        assert_eq!(gateway.write_count(), 1);
    }
}
