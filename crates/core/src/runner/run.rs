//! Order runner implementation.
//!
//! Rows are fully independent and processed strictly sequentially in source
//! order; one row's failure never touches another row's fields.

use std::sync::Arc;

use chrono::{Local, SecondsFormat, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::filler::{OrderFields, OrderFormFiller, OrderOutcome};
use crate::metrics;
use crate::portal::{Credentials, PortalDriver, PortalPage, SessionError, SessionManager};
use crate::sheets::{OrderRow, RowStatus, SheetsGateway};

use super::types::{RunError, RunReport, RunnerConfig};

/// Result cell literal for a confirmed order.
const RESULT_SUCCESS: &str = "ORDER_SUCCESS";

/// The order runner: one invocation processes the whole sheet once.
pub struct OrderRunner {
    config: RunnerConfig,
    gateway: Arc<dyn SheetsGateway>,
    driver: Arc<dyn PortalDriver>,
    session: SessionManager,
    credentials: Credentials,
    filler: OrderFormFiller,
}

impl OrderRunner {
    pub fn new(
        config: RunnerConfig,
        gateway: Arc<dyn SheetsGateway>,
        driver: Arc<dyn PortalDriver>,
        session: SessionManager,
        credentials: Credentials,
        filler: OrderFormFiller,
    ) -> Self {
        Self {
            config,
            gateway,
            driver,
            session,
            credentials,
            filler,
        }
    }

    /// Execute one full run.
    ///
    /// Reads rows first: a read failure aborts before any row is written.
    /// The browser session is opened only when there is pending work and is
    /// closed on every path out.
    pub async fn run(&self) -> Result<RunReport, RunError> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        info!(run_id = %run_id, "Starting order run");

        let rows = match self.gateway.read_rows().await {
            Ok(rows) => rows,
            Err(e) => {
                metrics::RUNS_TOTAL.with_label_values(&["error"]).inc();
                return Err(e.into());
            }
        };

        let mut report = RunReport::new(run_id, started_at, rows.len());

        let pending: Vec<(usize, &OrderRow)> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| self.row_status(row) == Some(RowStatus::Pending))
            .collect();
        report.skipped = rows.len() - pending.len();
        metrics::ROWS_PROCESSED
            .with_label_values(&["skipped"])
            .inc_by(report.skipped as u64);

        if pending.is_empty() {
            info!("No pending rows, nothing to do");
            report.finished_at = Utc::now();
            metrics::RUNS_TOTAL.with_label_values(&["success"]).inc();
            return Ok(report);
        }

        let page = match self.driver.open_page().await {
            Ok(page) => page,
            Err(e) => {
                metrics::RUNS_TOTAL.with_label_values(&["error"]).inc();
                return Err(RunError::Session(SessionError::Portal(e)));
            }
        };

        if let Err(e) = self.session.login(page.as_ref(), &self.credentials).await {
            let _ = page.close().await;
            metrics::RUNS_TOTAL.with_label_values(&["error"]).inc();
            return Err(e.into());
        }

        // Row processing is infallible from here: every outcome lands in
        // the sheet, and the session close below always runs.
        for (index, row) in pending {
            self.process_row(page.as_ref(), index, row, &mut report).await;
        }

        if let Err(e) = page.close().await {
            warn!(error = %e, "Failed to close portal session");
        }

        report.finished_at = Utc::now();
        metrics::RUNS_TOTAL.with_label_values(&["success"]).inc();
        metrics::RUN_DURATION
            .with_label_values(&[])
            .observe((report.finished_at - report.started_at).num_milliseconds() as f64 / 1000.0);
        info!(
            processed = report.processed,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            "Order run complete"
        );
        Ok(report)
    }

    fn row_status(&self, row: &OrderRow) -> Option<RowStatus> {
        RowStatus::parse(row.field(self.config.columns.status))
    }

    /// 1-based sheet row for the row at `index` in the read sequence.
    fn sheet_row(&self, index: usize) -> u32 {
        self.config.header_rows + 1 + index as u32
    }

    /// Drive one pending row to a terminal status.
    async fn process_row(
        &self,
        page: &dyn PortalPage,
        index: usize,
        row: &OrderRow,
        report: &mut RunReport,
    ) {
        let sheet_row = self.sheet_row(index);
        debug!(row = sheet_row, "Processing row");

        self.write_cell(sheet_row, self.config.columns.status, RowStatus::InProgress.as_str())
            .await;

        let order = OrderFields::from_row(row, &self.config.columns);
        let today = Local::now().date_naive();
        let outcome = self.filler.submit_order(page, &order, today).await;

        let processed_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        match &outcome {
            OrderOutcome::Success => {
                self.write_cell(sheet_row, self.config.columns.result, RESULT_SUCCESS)
                    .await;
                self.write_cell(sheet_row, self.config.columns.status, RowStatus::Done.as_str())
                    .await;
                report.succeeded += 1;
                metrics::ROWS_PROCESSED.with_label_values(&["done"]).inc();
                info!(row = sheet_row, "Row done");
            }
            OrderOutcome::Failure(message) => {
                error!(row = sheet_row, result = %message, "Row failed");
                self.write_cell(sheet_row, self.config.columns.result, message)
                    .await;
                self.write_cell(sheet_row, self.config.columns.status, RowStatus::Failed.as_str())
                    .await;
                report.failed += 1;
                metrics::ROWS_PROCESSED.with_label_values(&["failed"]).inc();
            }
        }

        self.write_cell(sheet_row, self.config.columns.processed_at, &processed_at)
            .await;
        report.processed += 1;
    }

    /// Best-effort single-cell write. A rejected write is logged with row
    /// context; re-applying the same value on a later run is safe.
    async fn write_cell(&self, sheet_row: u32, position: usize, value: &str) {
        let column = (position + 1) as u32;
        if let Err(e) = self.gateway.write_field(sheet_row, column, value).await {
            warn!(row = sheet_row, column = column, error = %e, "Cell write failed");
        }
    }
}
