//! Fake portal page for testing.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::portal::{Locator, PortalDriver, PortalError, PortalPage};

/// Everything the fake page records about one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedAction {
    Goto(String),
    Fill { target: String, value: String },
    Click(String),
    Check(String),
    Select { target: String, value: String },
    PressEnter(String),
    Settle(Duration),
    WaitForText(String),
    WaitForUrl(String),
    WaitForLoad,
    Close,
}

#[derive(Default)]
struct FakeState {
    actions: Vec<RecordedAction>,
    /// Texts considered present on the page for wait_for_text.
    visible_texts: HashSet<String>,
    /// (locator substring, text) pairs served by read_text.
    element_texts: Vec<(String, String)>,
    /// Locator substrings that fail with ElementNotFound.
    failing_targets: Vec<String>,
    current_url: String,
    /// URL the page "redirects" to when Enter is pressed (login flow).
    url_after_submit: Option<String>,
    closed: bool,
}

/// Fake implementation of the `PortalPage` trait.
///
/// Records every interaction for assertions and resolves all waits
/// immediately (a missing text/url is an instant timeout, keeping tests
/// fast). Clones share state, so a test can keep a handle while a driver
/// hands the page to the runner.
#[derive(Clone, Default)]
pub struct FakePortalPage {
    state: Arc<Mutex<FakeState>>,
}

impl FakePortalPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a text as present on the page.
    pub fn with_visible_text(self, text: &str) -> Self {
        self.state.lock().unwrap().visible_texts.insert(text.to_string());
        self
    }

    /// Serve `text` from read_text for locators containing `target`.
    pub fn with_element_text(self, target: &str, text: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .element_texts
            .push((target.to_string(), text.to_string()));
        self
    }

    /// Fail any interaction whose locator contains `target`.
    pub fn with_failing_target(self, target: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_targets
            .push(target.to_string());
        self
    }

    /// Simulate the post-login redirect: pressing Enter moves the page to
    /// this URL.
    pub fn with_url_after_submit(self, url: &str) -> Self {
        self.state.lock().unwrap().url_after_submit = Some(url.to_string());
        self
    }

    /// All recorded interactions, in order.
    pub async fn actions(&self) -> Vec<RecordedAction> {
        self.state.lock().unwrap().actions.clone()
    }

    /// Last value filled into a control whose locator contains `needle`.
    pub async fn filled_value(&self, needle: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .actions
            .iter()
            .rev()
            .find_map(|action| match action {
                RecordedAction::Fill { target, value } if target.contains(needle) => {
                    Some(value.clone())
                }
                _ => None,
            })
    }

    /// Whether anything whose locator contains `needle` was clicked.
    pub async fn clicked(&self, needle: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.actions.iter().any(|action| {
            matches!(action, RecordedAction::Click(target) if target.contains(needle))
        })
    }

    /// Whether a checkbox/radio whose locator contains `needle` was checked.
    pub async fn checked(&self, needle: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.actions.iter().any(|action| {
            matches!(action, RecordedAction::Check(target) if target.contains(needle))
        })
    }

    pub async fn closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn check_failing(&self, target: &Locator) -> Result<(), PortalError> {
        let display = target.to_string();
        let state = self.state.lock().unwrap();
        if state.failing_targets.iter().any(|t| display.contains(t.as_str())) {
            return Err(PortalError::ElementNotFound(display));
        }
        Ok(())
    }

    fn record(&self, action: RecordedAction) {
        self.state.lock().unwrap().actions.push(action);
    }
}

#[async_trait]
impl PortalPage for FakePortalPage {
    async fn goto(&self, url: &str) -> Result<(), PortalError> {
        let mut state = self.state.lock().unwrap();
        state.actions.push(RecordedAction::Goto(url.to_string()));
        state.current_url = url.to_string();
        Ok(())
    }

    async fn fill(&self, target: &Locator, value: &str) -> Result<(), PortalError> {
        self.check_failing(target)?;
        self.record(RecordedAction::Fill {
            target: target.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn click(&self, target: &Locator) -> Result<(), PortalError> {
        self.check_failing(target)?;
        self.record(RecordedAction::Click(target.to_string()));
        Ok(())
    }

    async fn check(&self, target: &Locator) -> Result<(), PortalError> {
        self.check_failing(target)?;
        self.record(RecordedAction::Check(target.to_string()));
        Ok(())
    }

    async fn select_option(&self, target: &Locator, value: &str) -> Result<(), PortalError> {
        self.check_failing(target)?;
        self.record(RecordedAction::Select {
            target: target.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn press_enter(&self, target: &Locator) -> Result<(), PortalError> {
        self.check_failing(target)?;
        let mut state = self.state.lock().unwrap();
        state
            .actions
            .push(RecordedAction::PressEnter(target.to_string()));
        if let Some(url) = state.url_after_submit.clone() {
            state.current_url = url;
        }
        Ok(())
    }

    async fn read_text(&self, target: &Locator) -> Result<String, PortalError> {
        self.check_failing(target)?;
        let display = target.to_string();
        let state = self.state.lock().unwrap();
        state
            .element_texts
            .iter()
            .find(|(needle, _)| display.contains(needle.as_str()))
            .map(|(_, text)| text.clone())
            .ok_or(PortalError::ElementNotFound(display))
    }

    async fn wait_for_text(&self, text: &str, _timeout: Duration) -> Result<(), PortalError> {
        self.record(RecordedAction::WaitForText(text.to_string()));
        let state = self.state.lock().unwrap();
        if state.visible_texts.contains(text) {
            Ok(())
        } else {
            Err(PortalError::Timeout(format!("text \"{}\"", text)))
        }
    }

    async fn wait_for_url_prefix(
        &self,
        prefix: &str,
        _timeout: Duration,
    ) -> Result<(), PortalError> {
        self.record(RecordedAction::WaitForUrl(prefix.to_string()));
        let state = self.state.lock().unwrap();
        if state.current_url.starts_with(prefix) {
            Ok(())
        } else {
            Err(PortalError::Timeout(format!("url prefix {}", prefix)))
        }
    }

    async fn wait_for_load(&self, _timeout: Duration) -> Result<(), PortalError> {
        self.record(RecordedAction::WaitForLoad);
        Ok(())
    }

    async fn settle(&self, delay: Duration) {
        // Recorded but never slept; keeps tests instant.
        self.record(RecordedAction::Settle(delay));
    }

    async fn close(&self) -> Result<(), PortalError> {
        let mut state = self.state.lock().unwrap();
        state.actions.push(RecordedAction::Close);
        state.closed = true;
        Ok(())
    }
}

/// Fake driver handing out clones of one shared fake page.
pub struct FakePortalDriver {
    page: FakePortalPage,
    fail_open: Mutex<Option<String>>,
}

impl FakePortalDriver {
    pub fn new(page: FakePortalPage) -> Self {
        Self {
            page,
            fail_open: Mutex::new(None),
        }
    }

    /// Make the next open_page fail with a connection error.
    pub fn fail_open(&self, message: &str) {
        *self.fail_open.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl PortalDriver for FakePortalDriver {
    fn name(&self) -> &str {
        "fake"
    }

    async fn open_page(&self) -> Result<Box<dyn PortalPage>, PortalError> {
        if let Some(message) = self.fail_open.lock().unwrap().take() {
            return Err(PortalError::ConnectionFailed(message));
        }
        Ok(Box::new(self.page.clone()))
    }
}
