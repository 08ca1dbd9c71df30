use async_trait::async_trait;
use std::time::Duration;

use super::{Locator, PortalError};

/// One browser page inside an authenticated portal session.
///
/// Not safe for concurrent use; exactly one order flow drives a page at a
/// time. All waits are bounded sleeps, never busy loops.
#[async_trait]
pub trait PortalPage: Send + Sync {
    /// Navigate to an absolute URL.
    async fn goto(&self, url: &str) -> Result<(), PortalError>;

    /// Replace the value of a text control.
    async fn fill(&self, target: &Locator, value: &str) -> Result<(), PortalError>;

    /// Click an element.
    async fn click(&self, target: &Locator) -> Result<(), PortalError>;

    /// Ensure a checkbox/radio is checked (no-op when already checked).
    async fn check(&self, target: &Locator) -> Result<(), PortalError>;

    /// Choose an option of a `<select>` by value or visible label.
    async fn select_option(&self, target: &Locator, value: &str) -> Result<(), PortalError>;

    /// Send Enter to an element (submits the enclosing form).
    async fn press_enter(&self, target: &Locator) -> Result<(), PortalError>;

    /// Visible text of the first matching element.
    async fn read_text(&self, target: &Locator) -> Result<String, PortalError>;

    /// Wait until the given text is present anywhere on the page.
    async fn wait_for_text(&self, text: &str, timeout: Duration) -> Result<(), PortalError>;

    /// Wait until the current URL starts with `prefix`.
    async fn wait_for_url_prefix(&self, prefix: &str, timeout: Duration)
        -> Result<(), PortalError>;

    /// Wait for the document to finish loading. The portal's pages do not
    /// reliably go idle, so callers treat this as best-effort.
    async fn wait_for_load(&self, timeout: Duration) -> Result<(), PortalError>;

    /// Fixed settle delay for asynchronous widgets (autocomplete lists).
    async fn settle(&self, delay: Duration);

    /// Tear the page and its browser session down.
    async fn close(&self) -> Result<(), PortalError>;
}

/// Opens portal pages. One page per run.
#[async_trait]
pub trait PortalDriver: Send + Sync {
    fn name(&self) -> &str;

    async fn open_page(&self) -> Result<Box<dyn PortalPage>, PortalError>;
}
