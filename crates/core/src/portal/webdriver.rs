//! W3C WebDriver implementation of the portal page primitives.
//!
//! Speaks the plain JSON protocol against a chromedriver/geckodriver
//! endpoint; no browser-side library is embedded.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::PortalConfig;

use super::{Locator, PortalDriver, PortalError, PortalPage};

/// Poll interval for bounded waits.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// WebDriver key code for Enter.
const ENTER_KEY: &str = "\u{E007}";

/// Factory for WebDriver-backed pages.
pub struct WebDriverClient {
    client: Client,
    config: PortalConfig,
}

impl WebDriverClient {
    /// Create a new client against the configured WebDriver endpoint.
    pub fn new(config: PortalConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn base_url(&self) -> &str {
        self.config.webdriver_url.trim_end_matches('/')
    }
}

#[async_trait]
impl PortalDriver for WebDriverClient {
    fn name(&self) -> &str {
        "webdriver"
    }

    async fn open_page(&self) -> Result<Box<dyn PortalPage>, PortalError> {
        let mut args = vec![
            "--disable-gpu".to_string(),
            "--window-size=1280,1024".to_string(),
        ];
        if self.config.headless {
            args.push("--headless=new".to_string());
        }

        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args },
                }
            }
        });

        let url = format!("{}/session", self.base_url());
        let response = self
            .client
            .post(&url)
            .json(&capabilities)
            .send()
            .await
            .map_err(map_transport_error)?;

        let body: Value = parse_response(response).await?;
        let session_id = body["value"]["sessionId"]
            .as_str()
            .ok_or_else(|| PortalError::Protocol("session response missing sessionId".into()))?
            .to_string();

        debug!(session_id = %session_id, "WebDriver session created");

        Ok(Box::new(WebDriverPage {
            client: self.client.clone(),
            base: self.base_url().to_string(),
            session_id: RwLock::new(Some(session_id)),
        }))
    }
}

/// One WebDriver session, driven as a single page.
pub struct WebDriverPage {
    client: Client,
    base: String,
    /// Taken on close; requests after close fail with `NoSession`.
    session_id: RwLock<Option<String>>,
}

impl WebDriverPage {
    async fn session_id(&self) -> Result<String, PortalError> {
        self.session_id
            .read()
            .await
            .clone()
            .ok_or(PortalError::NoSession)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, PortalError> {
        let session_id = self.session_id().await?;
        let url = format!("{}/session/{}{}", self.base, session_id, path);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;
        parse_response(response).await
    }

    async fn get(&self, path: &str) -> Result<Value, PortalError> {
        let session_id = self.session_id().await?;
        let url = format!("{}/session/{}{}", self.base, session_id, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_transport_error)?;
        parse_response(response).await
    }

    /// Find the first element matching the locator, returning its handle.
    async fn find_element(&self, target: &Locator) -> Result<String, PortalError> {
        let (using, value) = to_selector(target);
        let body = self
            .post("/element", json!({ "using": using, "value": value }))
            .await
            .map_err(|e| match e {
                PortalError::ElementNotFound(_) => {
                    PortalError::ElementNotFound(target.to_string())
                }
                other => other,
            })?;

        extract_element_id(&body)
            .ok_or_else(|| PortalError::Protocol(format!("no element handle for {}", target)))
    }

    /// Find an element scoped under another element.
    async fn find_child(&self, parent: &str, using: &str, value: &str) -> Result<String, PortalError> {
        let body = self
            .post(
                &format!("/element/{}/element", parent),
                json!({ "using": using, "value": value }),
            )
            .await?;

        extract_element_id(&body)
            .ok_or_else(|| PortalError::Protocol("no element handle for child lookup".into()))
    }

    async fn click_element(&self, element: &str) -> Result<(), PortalError> {
        self.post(&format!("/element/{}/click", element), json!({}))
            .await?;
        Ok(())
    }

    async fn execute(&self, script: &str) -> Result<Value, PortalError> {
        self.post("/execute/sync", json!({ "script": script, "args": [] }))
            .await
    }

    async fn current_url(&self) -> Result<String, PortalError> {
        let body = self.get("/url").await?;
        body["value"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PortalError::Protocol("url response missing value".into()))
    }
}

#[async_trait]
impl PortalPage for WebDriverPage {
    async fn goto(&self, url: &str) -> Result<(), PortalError> {
        debug!(url = url, "Navigating");
        self.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn fill(&self, target: &Locator, value: &str) -> Result<(), PortalError> {
        let element = self.find_element(target).await?;
        self.post(&format!("/element/{}/clear", element), json!({}))
            .await?;
        self.post(
            &format!("/element/{}/value", element),
            json!({ "text": value }),
        )
        .await?;
        Ok(())
    }

    async fn click(&self, target: &Locator) -> Result<(), PortalError> {
        let element = self.find_element(target).await?;
        self.click_element(&element).await
    }

    async fn check(&self, target: &Locator) -> Result<(), PortalError> {
        let element = self.find_element(target).await?;
        let body = self
            .get(&format!("/element/{}/property/checked", element))
            .await?;
        if body["value"].as_bool() == Some(true) {
            return Ok(());
        }
        self.click_element(&element).await
    }

    async fn select_option(&self, target: &Locator, value: &str) -> Result<(), PortalError> {
        let element = self.find_element(target).await?;
        let literal = xpath_string(value);
        let option_xpath = format!(
            ".//option[@value={} or normalize-space(text())={}]",
            literal, literal
        );
        let option = self.find_child(&element, "xpath", &option_xpath).await?;
        self.click_element(&option).await
    }

    async fn press_enter(&self, target: &Locator) -> Result<(), PortalError> {
        let element = self.find_element(target).await?;
        self.post(
            &format!("/element/{}/value", element),
            json!({ "text": ENTER_KEY }),
        )
        .await?;
        Ok(())
    }

    async fn read_text(&self, target: &Locator) -> Result<String, PortalError> {
        let element = self.find_element(target).await?;
        let body = self.get(&format!("/element/{}/text", element)).await?;
        body["value"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PortalError::Protocol("text response missing value".into()))
    }

    async fn wait_for_text(&self, text: &str, timeout: Duration) -> Result<(), PortalError> {
        let target = Locator::text(text);
        let deadline = Instant::now() + timeout;
        loop {
            match self.find_element(&target).await {
                Ok(_) => return Ok(()),
                Err(PortalError::ElementNotFound(_)) => {}
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                return Err(PortalError::Timeout(format!("text \"{}\"", text)));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_url_prefix(
        &self,
        prefix: &str,
        timeout: Duration,
    ) -> Result<(), PortalError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.current_url().await?.starts_with(prefix) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(PortalError::Timeout(format!("url prefix {}", prefix)));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_load(&self, timeout: Duration) -> Result<(), PortalError> {
        let deadline = Instant::now() + timeout;
        loop {
            let state = self.execute("return document.readyState").await?;
            if state["value"].as_str() == Some("complete") {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(PortalError::Timeout("document load".into()));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn settle(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }

    async fn close(&self) -> Result<(), PortalError> {
        let session_id = {
            let mut guard = self.session_id.write().await;
            guard.take()
        };
        let Some(session_id) = session_id else {
            return Ok(());
        };

        let url = format!("{}/session/{}", self.base, session_id);
        self.client
            .delete(&url)
            .send()
            .await
            .map_err(map_transport_error)?;
        debug!(session_id = %session_id, "WebDriver session closed");
        Ok(())
    }
}

fn map_transport_error(e: reqwest::Error) -> PortalError {
    if e.is_timeout() {
        PortalError::Timeout("webdriver response".into())
    } else if e.is_connect() {
        PortalError::ConnectionFailed(e.to_string())
    } else {
        PortalError::Protocol(e.to_string())
    }
}

/// Parse a WebDriver response, mapping protocol errors.
async fn parse_response(response: reqwest::Response) -> Result<Value, PortalError> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| PortalError::Protocol(format!("unparseable response: {}", e)))?;

    if status.is_success() {
        return Ok(body);
    }

    let error = body["value"]["error"].as_str().unwrap_or("");
    let message = body["value"]["message"].as_str().unwrap_or("");
    match error {
        "no such element" => Err(PortalError::ElementNotFound(message.to_string())),
        "invalid session id" => Err(PortalError::NoSession),
        _ => Err(PortalError::Protocol(format!(
            "HTTP {}: {} {}",
            status, error, message
        ))),
    }
}

fn extract_element_id(body: &Value) -> Option<String> {
    // W3C element identifier key
    body["value"]["element-6066-11e4-a52e-4f735466cecf"]
        .as_str()
        .map(str::to_string)
}

/// Translate a locator into a WebDriver (using, value) pair.
fn to_selector(target: &Locator) -> (&'static str, String) {
    match target {
        Locator::Css(sel) => ("css selector", sel.clone()),
        Locator::XPath(expr) => ("xpath", expr.clone()),
        Locator::Text(text) => (
            "xpath",
            format!("//*[contains(normalize-space(.), {})]", xpath_string(text)),
        ),
        Locator::Role { role, name } => ("xpath", role_xpath(role, name)),
    }
}

/// Approximate role + accessible-name lookup in portal markup.
fn role_xpath(role: &str, name: &str) -> String {
    let literal = xpath_string(name);
    match role {
        "button" if name.is_empty() => "//button".to_string(),
        "button" => format!(
            "//button[contains(normalize-space(.), {lit})] \
             | //input[(@type=\"submit\" or @type=\"button\") and contains(@value, {lit})]",
            lit = literal
        ),
        "checkbox" => format!(
            "//input[@type=\"checkbox\" and contains(@aria-label, {lit})] \
             | //label[contains(normalize-space(.), {lit})]//input[@type=\"checkbox\"]",
            lit = literal
        ),
        "radio" => format!(
            "//input[@type=\"radio\" and contains(@aria-label, {lit})] \
             | //label[contains(normalize-space(.), {lit})]//input[@type=\"radio\"]",
            lit = literal
        ),
        "combobox" if name.is_empty() => "//select".to_string(),
        "combobox" => format!("//select[contains(@aria-label, {})]", literal),
        "listitem" if name.is_empty() => "//li".to_string(),
        "listitem" => format!("//li[contains(normalize-space(.), {})]", literal),
        "cell" => format!("//td[contains(normalize-space(.), {})]", literal),
        _ => format!("//*[contains(normalize-space(.), {})]", literal),
    }
}

/// Quote a string for use inside an XPath expression.
fn xpath_string(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        let parts: Vec<String> = value
            .split('"')
            .map(|part| format!("\"{}\"", part))
            .collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_css_passthrough() {
        let (using, value) = to_selector(&Locator::input_name("sAddress"));
        assert_eq!(using, "css selector");
        assert_eq!(value, "input[name=\"sAddress\"]");
    }

    #[test]
    fn test_selector_text_becomes_xpath() {
        let (using, value) = to_selector(&Locator::text("Manual Order Entry"));
        assert_eq!(using, "xpath");
        assert!(value.contains("contains(normalize-space(.), \"Manual Order Entry\")"));
    }

    #[test]
    fn test_selector_role_button() {
        let (using, value) = to_selector(&Locator::role("button", "Create New Site"));
        assert_eq!(using, "xpath");
        assert!(value.contains("//button"));
        assert!(value.contains("Create New Site"));
        assert!(value.contains("@type=\"submit\""));
    }

    #[test]
    fn test_selector_role_checkbox_via_label() {
        let (_, value) = to_selector(&Locator::role("checkbox", "I Agree * required"));
        assert!(value.contains("@type=\"checkbox\""));
        assert!(value.contains("//label"));
    }

    #[test]
    fn test_selector_role_combobox_unnamed() {
        let (_, value) = to_selector(&Locator::role("combobox", ""));
        assert_eq!(value, "//select");
    }

    #[test]
    fn test_selector_role_cell() {
        let (_, value) = to_selector(&Locator::role("cell", "17 Select"));
        assert_eq!(value, "//td[contains(normalize-space(.), \"17 Select\")]");
    }

    #[test]
    fn test_xpath_string_plain() {
        assert_eq!(xpath_string("abc"), "\"abc\"");
    }

    #[test]
    fn test_xpath_string_with_double_quote() {
        assert_eq!(xpath_string("a\"b"), "'a\"b'");
    }

    #[test]
    fn test_xpath_string_with_both_quotes() {
        let quoted = xpath_string("a\"b'c");
        assert!(quoted.starts_with("concat("));
        assert!(quoted.contains("\"a\""));
        assert!(quoted.contains("\"b'c\""));
    }

    #[test]
    fn test_extract_element_id() {
        let body = serde_json::json!({
            "value": { "element-6066-11e4-a52e-4f735466cecf": "el-1" }
        });
        assert_eq!(extract_element_id(&body), Some("el-1".to_string()));

        let body = serde_json::json!({ "value": null });
        assert_eq!(extract_element_id(&body), None);
    }
}
