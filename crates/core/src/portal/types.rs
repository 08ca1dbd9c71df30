use thiserror::Error;

/// Errors from the browser automation layer.
#[derive(Debug, Error)]
pub enum PortalError {
    /// A bounded wait expired.
    #[error("timed out waiting for {0}")]
    Timeout(String),

    /// No element matched the locator.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// Could not reach the WebDriver endpoint.
    #[error("failed to connect to webdriver: {0}")]
    ConnectionFailed(String),

    /// The driver rejected a request or returned an unusable response.
    #[error("webdriver protocol error: {0}")]
    Protocol(String),

    /// The browser session is gone.
    #[error("no active browser session")]
    NoSession,
}

/// How to find a form control on the page.
///
/// The portal's markup is matched the way its operators described it:
/// by input name (css), by visible text, or by widget role + accessible
/// name. Presence of role/text targets varies between portal revisions,
/// which is why some steps are best-effort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// CSS selector.
    Css(String),
    /// Raw XPath expression.
    XPath(String),
    /// Any element containing this visible text.
    Text(String),
    /// Widget role ("button", "checkbox", "radio", "combobox", "listitem",
    /// "cell") with an accessible-name fragment; empty name matches the
    /// first widget of that role.
    Role { role: String, name: String },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text(text.into())
    }

    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Locator::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    /// Input element by its `name` attribute, the portal's most stable handle.
    pub fn input_name(name: &str) -> Self {
        Locator::Css(format!("input[name=\"{}\"]", name))
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(sel) => write!(f, "css={}", sel),
            Locator::XPath(expr) => write!(f, "xpath={}", expr),
            Locator::Text(text) => write!(f, "text={}", text),
            Locator::Role { role, name } => write!(f, "role={}[{}]", role, name),
        }
    }
}
