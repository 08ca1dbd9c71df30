use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub defaults: FillDefaults,
    #[serde(default)]
    pub columns: ColumnMap,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Spreadsheet backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SheetsConfig {
    /// Spreadsheet document id
    pub spreadsheet_id: String,
    /// Sheet (tab) holding the order rows
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Sheets API base URL
    #[serde(default = "default_sheets_url")]
    pub url: String,
    /// OAuth bearer token, inline
    #[serde(default)]
    pub token: Option<String>,
    /// Path to a file holding the bearer token for the service identity
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Rows above the first data row (data starts at header_rows + 1)
    #[serde(default = "default_header_rows")]
    pub header_rows: u32,
}

fn default_sheet_name() -> String {
    "Orders".to_string()
}

fn default_sheets_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_header_rows() -> u32 {
    1
}

/// Vendor portal configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PortalConfig {
    /// Portal base URL
    #[serde(default = "default_portal_url")]
    pub base_url: String,
    /// WebDriver endpoint (chromedriver/geckodriver)
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// Login email. Dev fallback only; set PORTICO_PORTAL_EMAIL in deployment.
    #[serde(default = "default_email")]
    pub email: String,
    /// Login password. Dev fallback only; set PORTICO_PORTAL_PASSWORD in deployment.
    #[serde(default = "default_password")]
    pub password: String,
    /// Run the browser headless
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// WebDriver request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Bounded wait for the post-login landing page
    #[serde(default = "default_login_timeout")]
    pub login_timeout_secs: u32,
    /// Bounded wait for the order confirmation marker
    #[serde(default = "default_confirmation_timeout")]
    pub confirmation_timeout_secs: u32,
    /// Settle delay before interacting with autocomplete widgets
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_portal_url(),
            webdriver_url: default_webdriver_url(),
            email: default_email(),
            password: default_password(),
            headless: default_headless(),
            timeout_secs: default_timeout(),
            login_timeout_secs: default_login_timeout(),
            confirmation_timeout_secs: default_confirmation_timeout(),
            settle_ms: default_settle_ms(),
        }
    }
}

fn default_portal_url() -> String {
    "https://order.harmonps.com".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_email() -> String {
    "orders@example.com".to_string()
}

fn default_password() -> String {
    "dev-only-password".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_login_timeout() -> u32 {
    60
}

fn default_confirmation_timeout() -> u32 {
    30
}

fn default_settle_ms() -> u64 {
    500
}

/// Placeholder values substituted when a source field is empty.
///
/// Incomplete rows still produce a submitted order; every substitution is
/// logged by the filler.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FillDefaults {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_address2")]
    pub address2: String,
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default = "default_zip")]
    pub zip: String,
    #[serde(default = "default_sqft")]
    pub sqft: String,
}

impl Default for FillDefaults {
    fn default() -> Self {
        Self {
            address: default_address(),
            address2: default_address2(),
            city: default_city(),
            state: default_state(),
            zip: default_zip(),
            sqft: default_sqft(),
        }
    }
}

fn default_address() -> String {
    "123 Main Street".to_string()
}

fn default_address2() -> String {
    "Suite 456".to_string()
}

fn default_city() -> String {
    "Carrboro".to_string()
}

fn default_state() -> String {
    "NC".to_string()
}

fn default_zip() -> String {
    "10001".to_string()
}

fn default_sqft() -> String {
    "10001".to_string()
}

/// Zero-based positions of the named fields within an order row.
///
/// The sheet layout is configuration, not code; defaults match the
/// production sheet (column A carries the package name, status in column K).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColumnMap {
    #[serde(default = "d_package")]
    pub package: usize,
    #[serde(default = "d_client_name")]
    pub client_name: usize,
    #[serde(default = "d_address")]
    pub address: usize,
    #[serde(default = "d_city")]
    pub city: usize,
    #[serde(default = "d_state")]
    pub state: usize,
    #[serde(default = "d_zip")]
    pub zip: usize,
    #[serde(default = "d_sqft")]
    pub sqft: usize,
    #[serde(default = "d_billing_city")]
    pub billing_city: usize,
    #[serde(default = "d_billing_state")]
    pub billing_state: usize,
    #[serde(default = "d_billing_zip")]
    pub billing_zip: usize,
    #[serde(default = "d_status")]
    pub status: usize,
    #[serde(default = "d_result")]
    pub result: usize,
    #[serde(default = "d_processed_at")]
    pub processed_at: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            package: d_package(),
            client_name: d_client_name(),
            address: d_address(),
            city: d_city(),
            state: d_state(),
            zip: d_zip(),
            sqft: d_sqft(),
            billing_city: d_billing_city(),
            billing_state: d_billing_state(),
            billing_zip: d_billing_zip(),
            status: d_status(),
            result: d_result(),
            processed_at: d_processed_at(),
        }
    }
}

impl ColumnMap {
    /// Highest mapped position, as a 1-based column count for the read range.
    pub fn read_width(&self) -> u32 {
        let max = [
            self.package,
            self.client_name,
            self.address,
            self.city,
            self.state,
            self.zip,
            self.sqft,
            self.billing_city,
            self.billing_state,
            self.billing_zip,
            self.status,
            self.result,
            self.processed_at,
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        (max + 1) as u32
    }
}

fn d_package() -> usize {
    0
}
fn d_client_name() -> usize {
    1
}
fn d_address() -> usize {
    2
}
fn d_city() -> usize {
    3
}
fn d_state() -> usize {
    4
}
fn d_zip() -> usize {
    5
}
fn d_sqft() -> usize {
    6
}
fn d_billing_city() -> usize {
    7
}
fn d_billing_state() -> usize {
    8
}
fn d_billing_zip() -> usize {
    9
}
fn d_status() -> usize {
    10
}
fn d_result() -> usize {
    11
}
fn d_processed_at() -> usize {
    12
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub sheets: SanitizedSheetsConfig,
    pub portal: SanitizedPortalConfig,
    pub defaults: FillDefaults,
    pub columns: ColumnMap,
}

/// Sanitized sheets config (bearer token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSheetsConfig {
    pub url: String,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub token_configured: bool,
    pub header_rows: u32,
    pub timeout_secs: u32,
}

/// Sanitized portal config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedPortalConfig {
    pub base_url: String,
    pub webdriver_url: String,
    pub email: String,
    pub password_configured: bool,
    pub headless: bool,
    pub login_timeout_secs: u32,
    pub confirmation_timeout_secs: u32,
    pub settle_ms: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            sheets: SanitizedSheetsConfig {
                url: config.sheets.url.clone(),
                spreadsheet_id: config.sheets.spreadsheet_id.clone(),
                sheet_name: config.sheets.sheet_name.clone(),
                token_configured: config.sheets.token.is_some()
                    || config.sheets.token_file.is_some(),
                header_rows: config.sheets.header_rows,
                timeout_secs: config.sheets.timeout_secs,
            },
            portal: SanitizedPortalConfig {
                base_url: config.portal.base_url.clone(),
                webdriver_url: config.portal.webdriver_url.clone(),
                email: config.portal.email.clone(),
                password_configured: !config.portal.password.is_empty(),
                headless: config.portal.headless,
                login_timeout_secs: config.portal.login_timeout_secs,
                confirmation_timeout_secs: config.portal.confirmation_timeout_secs,
                settle_ms: config.portal.settle_ms,
            },
            defaults: config.defaults.clone(),
            columns: config.columns.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[sheets]
spreadsheet_id = "sheet-123"
token = "test-token"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.sheets.spreadsheet_id, "sheet-123");
        assert_eq!(config.sheets.sheet_name, "Orders");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.portal.login_timeout_secs, 60);
        assert_eq!(config.portal.confirmation_timeout_secs, 30);
        assert_eq!(config.portal.settle_ms, 500);
    }

    #[test]
    fn test_deserialize_missing_sheets_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_column_map_defaults() {
        let columns = ColumnMap::default();
        assert_eq!(columns.client_name, 1);
        assert_eq!(columns.billing_zip, 9);
        assert_eq!(columns.status, 10);
        assert_eq!(columns.processed_at, 12);
        assert_eq!(columns.read_width(), 13);
    }

    #[test]
    fn test_column_map_override() {
        let toml = r#"
[sheets]
spreadsheet_id = "s"
token = "t"

[columns]
status = 14
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.columns.status, 14);
        assert_eq!(config.columns.client_name, 1);
        assert_eq!(config.columns.read_width(), 15);
    }

    #[test]
    fn test_fill_defaults() {
        let defaults = FillDefaults::default();
        assert_eq!(defaults.address, "123 Main Street");
        assert_eq!(defaults.state, "NC");
        assert_eq!(defaults.sqft, "10001");
    }

    #[test]
    fn test_sanitized_config_redacts_secrets() {
        let toml = r#"
[sheets]
spreadsheet_id = "sheet-123"
token = "secret-token"

[portal]
password = "hunter2"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.sheets.token_configured);
        assert!(sanitized.portal.password_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-token"));
        assert!(!json.contains("hunter2"));
    }
}
