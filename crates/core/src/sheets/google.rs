//! Google Sheets gateway implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::{ColumnMap, SheetsConfig};
use crate::metrics;

use super::{column_letter, OrderRow, SheetsError, SheetsGateway};

/// Google Sheets `values` API client.
///
/// Authenticates with a pre-issued OAuth bearer token for the service
/// identity; token exchange happens outside this process.
pub struct GoogleSheetsGateway {
    client: Client,
    config: SheetsConfig,
    /// Width of the read range, from the configured column map.
    read_width: u32,
    /// Cached bearer token (loaded from token_file on first use).
    token: RwLock<Option<String>>,
}

impl GoogleSheetsGateway {
    /// Create a new gateway with the given configuration.
    pub fn new(config: SheetsConfig, columns: &ColumnMap) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            read_width: columns.read_width(),
            token: RwLock::new(None),
        }
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// First data row (1-based), directly below the header block.
    fn first_data_row(&self) -> u32 {
        self.config.header_rows + 1
    }

    /// Resolve the bearer token: inline config wins, otherwise the
    /// token file is read once and cached.
    async fn bearer_token(&self) -> Result<String, SheetsError> {
        if let Some(token) = &self.config.token {
            return Ok(token.trim().to_string());
        }

        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                return Ok(token.clone());
            }
        }

        let path = self
            .config
            .token_file
            .as_ref()
            .ok_or_else(|| SheetsError::Credential("no token or token_file configured".into()))?;

        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            SheetsError::Credential(format!("failed to read {}: {}", path.display(), e))
        })?;

        let token = raw.trim().to_string();
        if token.is_empty() {
            return Err(SheetsError::Credential(format!(
                "token file {} is empty",
                path.display()
            )));
        }

        let mut cached = self.token.write().await;
        *cached = Some(token.clone());
        Ok(token)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url(),
            urlencoding::encode(&self.config.spreadsheet_id),
            urlencoding::encode(range)
        )
    }

    fn map_transport_error(e: reqwest::Error) -> SheetsError {
        if e.is_timeout() {
            SheetsError::Timeout
        } else if e.is_connect() {
            SheetsError::ConnectionFailed(e.to_string())
        } else {
            SheetsError::Api(e.to_string())
        }
    }

    /// Map an unsuccessful response, surfacing permission problems with the
    /// spreadsheet id so the operator knows what to share.
    async fn map_status_error(&self, status: StatusCode, response: reqwest::Response) -> SheetsError {
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
            SheetsError::AccessDenied {
                resource: self.config.spreadsheet_id.clone(),
                message: format!(
                    "credential lacks access (HTTP {}); share the spreadsheet with the service identity",
                    status.as_u16()
                ),
            }
        } else {
            SheetsError::Api(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            ))
        }
    }
}

#[async_trait]
impl SheetsGateway for GoogleSheetsGateway {
    fn name(&self) -> &str {
        "google-sheets"
    }

    async fn read_rows(&self) -> Result<Vec<OrderRow>, SheetsError> {
        let token = self.bearer_token().await?;

        let range = format!(
            "{}!A{}:{}",
            self.config.sheet_name,
            self.first_data_row(),
            column_letter(self.read_width)
        );
        let url = self.values_url(&range);
        debug!(range = %range, "Reading order rows");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            metrics::SHEET_REQUESTS.with_label_values(&["read", "error"]).inc();
            return Err(self.map_status_error(status, response).await);
        }

        let body: ValuesResponse = response
            .json()
            .await
            .map_err(|e| SheetsError::Api(format!("Failed to parse response: {}", e)))?;

        let rows: Vec<OrderRow> = body
            .values
            .unwrap_or_default()
            .into_iter()
            .map(OrderRow::new)
            .collect();

        metrics::SHEET_REQUESTS.with_label_values(&["read", "success"]).inc();
        debug!(rows = rows.len(), "Sheet read complete");
        Ok(rows)
    }

    async fn write_field(&self, row: u32, column: u32, value: &str) -> Result<(), SheetsError> {
        let token = self.bearer_token().await?;

        let cell = format!("{}!{}{}", self.config.sheet_name, column_letter(column), row);
        let url = format!("{}?valueInputOption=RAW", self.values_url(&cell));
        debug!(cell = %cell, "Writing cell");

        let body = json!({
            "range": cell,
            "majorDimension": "ROWS",
            "values": [[value]],
        });

        let response = self
            .client
            .put(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            metrics::SHEET_REQUESTS.with_label_values(&["write", "error"]).inc();
            return Err(self.map_status_error(status, response).await);
        }

        metrics::SHEET_REQUESTS.with_label_values(&["write", "success"]).inc();
        Ok(())
    }
}

// Sheets values API response
#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Option<Vec<Vec<String>>>,
}
