//! Vendor portal page abstraction.
//!
//! This module provides the `PortalPage` trait for the browser primitives
//! the order flow needs (navigate, fill, click, wait), a `PortalDriver`
//! trait for opening pages, a W3C WebDriver implementation of both, and the
//! `SessionManager` that authenticates a page against the portal.

mod session;
mod traits;
mod types;
mod webdriver;

pub use session::{Credentials, SessionError, SessionManager};
pub use traits::{PortalDriver, PortalPage};
pub use types::*;
pub use webdriver::{WebDriverClient, WebDriverPage};
