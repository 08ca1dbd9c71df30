//! Runner lifecycle integration tests.
//!
//! These tests verify the complete row lifecycle through the runner:
//! PENDING -> IN_PROGRESS -> form flow -> DONE | FAILED, against the fake
//! portal and mock spreadsheet gateway.

use std::sync::Arc;

use portico_core::{
    testing::{fixtures, FakePortalDriver, FakePortalPage, MockSheetsGateway},
    load_config_from_str, Credentials, OrderFormFiller, OrderRunner, RowStatus, RunError,
    RunnerConfig, SessionError, SessionManager, SheetsError,
};

/// 1-based sheet columns for the default column map.
const COL_STATUS: u32 = 11;
const COL_RESULT: u32 = 12;
const COL_PROCESSED_AT: u32 = 13;

/// First data row in the default layout (one header row).
const FIRST_ROW: u32 = 2;

const CONFIRMATION: &str = "Your order has been placed.";
const DASHBOARD: &str = "https://order.harmonps.com/Dashboard/";

/// Test helper wiring a runner to a fake portal and mock sheet.
struct TestHarness {
    gateway: Arc<MockSheetsGateway>,
    page: FakePortalPage,
    driver: Arc<FakePortalDriver>,
}

impl TestHarness {
    fn new(page: FakePortalPage) -> Self {
        Self {
            gateway: Arc::new(MockSheetsGateway::new()),
            driver: Arc::new(FakePortalDriver::new(page.clone())),
            page,
        }
    }

    /// A page that logs in successfully and sees the confirmation marker.
    fn happy_page() -> FakePortalPage {
        FakePortalPage::new()
            .with_url_after_submit(DASHBOARD)
            .with_visible_text(CONFIRMATION)
    }

    fn runner(&self) -> OrderRunner {
        let config = load_config_from_str(
            r#"
[sheets]
spreadsheet_id = "sheet-123"
token = "tok"

[portal]
settle_ms = 0
"#,
        )
        .unwrap();

        OrderRunner::new(
            RunnerConfig::from(&config),
            Arc::clone(&self.gateway) as Arc<dyn portico_core::SheetsGateway>,
            Arc::clone(&self.driver) as Arc<dyn portico_core::PortalDriver>,
            SessionManager::new(&config.portal),
            Credentials::from(&config.portal),
            OrderFormFiller::new(&config.portal, config.defaults.clone()),
        )
    }
}

#[tokio::test]
async fn test_pending_row_end_to_end_success() {
    let harness = TestHarness::new(TestHarness::happy_page());
    harness.gateway.set_rows(vec![fixtures::pending_row("Jane Doe")]);

    let report = harness.runner().run().await.unwrap();

    assert_eq!(report.total_rows, 1);
    assert_eq!(report.processed, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.skipped, 0);

    // Status advanced IN_PROGRESS -> DONE, in that order.
    assert_eq!(
        harness.gateway.cell_history(FIRST_ROW, COL_STATUS),
        vec!["IN_PROGRESS", "DONE"]
    );
    assert_eq!(
        harness.gateway.cell(FIRST_ROW, COL_RESULT).as_deref(),
        Some("ORDER_SUCCESS")
    );

    // processed-at is a valid ISO-8601 UTC timestamp.
    let processed_at = harness.gateway.cell(FIRST_ROW, COL_PROCESSED_AT).unwrap();
    assert!(processed_at.ends_with('Z'));
    chrono::DateTime::parse_from_rfc3339(&processed_at).unwrap();

    // The filler actually drove the form.
    assert_eq!(
        harness.page.filled_value("UserComboSearch").await.as_deref(),
        Some("Jane Doe")
    );
    assert!(harness.page.clicked("Place My Order!").await);
    assert!(harness.page.closed().await);
}

#[tokio::test]
async fn test_non_pending_rows_untouched() {
    let harness = TestHarness::new(TestHarness::happy_page());
    harness.gateway.set_rows(vec![
        fixtures::row_with_status("Done Client", "DONE"),
        fixtures::row_with_status("Failed Client", "FAILED"),
        fixtures::row_with_status("Weird Client", "hold off"),
        fixtures::row_with_status("Blank Status", ""),
    ]);

    let report = harness.runner().run().await.unwrap();

    assert_eq!(report.skipped, 4);
    assert_eq!(report.processed, 0);
    // Skipping is a no-op on spreadsheet state and never opens the portal.
    assert_eq!(harness.gateway.write_count(), 0);
    assert!(harness.page.actions().await.is_empty());
}

#[tokio::test]
async fn test_status_parse_is_case_insensitive_and_trimmed() {
    let harness = TestHarness::new(TestHarness::happy_page());
    harness
        .gateway
        .set_rows(vec![fixtures::row_with_status("Jane Doe", "  pending ")]);

    let report = harness.runner().run().await.unwrap();
    assert_eq!(report.succeeded, 1);
    assert_eq!(
        harness.gateway.cell(FIRST_ROW, COL_STATUS).as_deref(),
        Some(RowStatus::Done.as_str())
    );
}

#[tokio::test]
async fn test_all_empty_row_submits_with_defaults() {
    let harness = TestHarness::new(TestHarness::happy_page());
    harness.gateway.set_rows(vec![fixtures::empty_pending_row()]);

    let report = harness.runner().run().await.unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(
        harness.gateway.cell(FIRST_ROW, COL_STATUS).as_deref(),
        Some("DONE")
    );
    // Defaults filled the form instead of empty strings.
    assert_eq!(
        harness.page.filled_value("sAddress\"").await.as_deref(),
        Some("123 Main Street")
    );
    // No client name: the autocomplete lookup is skipped entirely.
    assert!(harness.page.filled_value("UserComboSearch").await.is_none());
    assert!(harness.page.clicked("Place My Order!").await);
}

#[tokio::test]
async fn test_confirmation_timeout_marks_row_failed() {
    // Login works but the confirmation text never appears and there is no
    // inline error element.
    let page = FakePortalPage::new().with_url_after_submit(DASHBOARD);
    let harness = TestHarness::new(page);
    harness.gateway.set_rows(vec![fixtures::pending_row("Jane Doe")]);

    let report = harness.runner().run().await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 0);
    assert_eq!(
        harness.gateway.cell(FIRST_ROW, COL_RESULT).as_deref(),
        Some("ERROR: unknown after submit")
    );
    assert_eq!(
        harness.gateway.cell_history(FIRST_ROW, COL_STATUS),
        vec!["IN_PROGRESS", "FAILED"]
    );
    // A failed row still gets its processed-at stamp.
    assert!(harness.gateway.cell(FIRST_ROW, COL_PROCESSED_AT).is_some());
}

#[tokio::test]
async fn test_row_failure_does_not_affect_later_rows() {
    // The client autocomplete is broken, so the first row (which has a
    // client name) fails its mandatory match step; the second row has no
    // client name, skips that step, and succeeds.
    let page = TestHarness::happy_page().with_failing_target("UserComboSearch");
    let harness = TestHarness::new(page);
    harness.gateway.set_rows(vec![
        fixtures::pending_row("Jane Doe"),
        fixtures::empty_pending_row(),
    ]);

    let report = harness.runner().run().await.unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 1);

    assert_eq!(
        harness.gateway.cell(FIRST_ROW, COL_STATUS).as_deref(),
        Some("FAILED")
    );
    let failure = harness.gateway.cell(FIRST_ROW, COL_RESULT).unwrap();
    assert!(failure.starts_with("EXCEPTION: match_existing_client failed"));

    assert_eq!(
        harness.gateway.cell(FIRST_ROW + 1, COL_STATUS).as_deref(),
        Some("DONE")
    );
}

#[tokio::test]
async fn test_no_acted_row_left_in_progress() {
    let page = TestHarness::happy_page().with_failing_target("Create New Site");
    let harness = TestHarness::new(page);
    harness.gateway.set_rows(vec![
        fixtures::pending_row("A"),
        fixtures::pending_row("B"),
    ]);

    harness.runner().run().await.unwrap();

    for row in [FIRST_ROW, FIRST_ROW + 1] {
        let terminal = harness.gateway.cell(row, COL_STATUS).unwrap();
        assert!(
            terminal == "DONE" || terminal == "FAILED",
            "row {} ended at {}",
            row,
            terminal
        );
    }
}

#[tokio::test]
async fn test_access_denied_aborts_before_any_write() {
    let harness = TestHarness::new(TestHarness::happy_page());
    harness.gateway.set_next_read_error(SheetsError::AccessDenied {
        resource: "sheet-123".to_string(),
        message: "credential lacks access".to_string(),
    });

    let result = harness.runner().run().await;

    match result {
        Err(RunError::Sheets(e)) => assert!(e.is_access_denied()),
        other => panic!("expected sheets error, got {:?}", other.map(|r| r.processed)),
    }
    // No IN_PROGRESS rows were produced and the portal was never touched.
    assert_eq!(harness.gateway.write_count(), 0);
    assert!(harness.page.actions().await.is_empty());
}

#[tokio::test]
async fn test_login_timeout_is_run_fatal() {
    // No post-login redirect: the dashboard never appears.
    let page = FakePortalPage::new().with_visible_text(CONFIRMATION);
    let harness = TestHarness::new(page);
    harness.gateway.set_rows(vec![fixtures::pending_row("Jane Doe")]);

    let result = harness.runner().run().await;

    assert!(matches!(
        result,
        Err(RunError::Session(SessionError::AuthenticationTimeout(_)))
    ));
    // No row writes, and the session was still closed.
    assert_eq!(harness.gateway.write_count(), 0);
    assert!(harness.page.closed().await);
}

#[tokio::test]
async fn test_failed_status_write_does_not_abort_run() {
    let harness = TestHarness::new(TestHarness::happy_page());
    harness.gateway.set_rows(vec![fixtures::pending_row("Jane Doe")]);
    // The IN_PROGRESS write is rejected by the backend.
    harness
        .gateway
        .set_next_write_error(SheetsError::Api("backend rejected".to_string()));

    let report = harness.runner().run().await.unwrap();

    // The row still ran to a terminal status.
    assert_eq!(report.succeeded, 1);
    assert_eq!(
        harness.gateway.cell(FIRST_ROW, COL_STATUS).as_deref(),
        Some("DONE")
    );
}
