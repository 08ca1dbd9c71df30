//! Order run API handlers: the trigger boundary.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

use portico_core::RunReport;

use crate::metrics::TRIGGER_REQUESTS;
use crate::state::AppState;

/// Response for the trigger endpoint.
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,
}

/// Response for the run status endpoint.
#[derive(Debug, Serialize)]
pub struct RunStatusResponse {
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_report: Option<RunReport>,
}

/// Trigger one full order run.
///
/// The body is optional and tolerated when malformed. A completed run is
/// always 200, even when individual rows failed; only run-level errors
/// (credentials, session) are 500.
pub async fn run_orders(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<TriggerResponse>) {
    inspect_trigger_body(&body);

    match state.execute_run().await {
        Ok(report) => {
            TRIGGER_REQUESTS.with_label_values(&["success"]).inc();
            (
                StatusCode::OK,
                Json(TriggerResponse {
                    status: "success".to_string(),
                    message: "Orders processed".to_string(),
                    report: Some(report),
                }),
            )
        }
        Err(e) => {
            error!(error = %e, "Order run failed");
            TRIGGER_REQUESTS.with_label_values(&["error"]).inc();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TriggerResponse {
                    status: "error".to_string(),
                    message: e.to_string(),
                    report: None,
                }),
            )
        }
    }
}

/// Current run state plus the last completed report.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<RunStatusResponse> {
    Json(RunStatusResponse {
        running: state.is_running(),
        last_report: state.last_report().await,
    })
}

/// The sheet-side trigger script posts `{"sheet": <id>}`, but the service
/// credential is scoped to the configured spreadsheet, so any override is
/// ignored. Malformed bodies are treated as empty.
fn inspect_trigger_body(body: &Bytes) {
    if body.is_empty() {
        return;
    }
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(payload) => {
            if let Some(sheet) = payload.get("sheet").and_then(|v| v.as_str()) {
                debug!(sheet = sheet, "Ignoring sheet override from trigger body");
            }
        }
        Err(e) => {
            debug!(error = %e, "Malformed trigger body treated as empty");
        }
    }
}
