//! Portal login session management.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::PortalConfig;

use super::{Locator, PortalError, PortalPage};

/// Errors establishing the authenticated session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The post-login landing page did not appear within the bounded wait.
    #[error("portal login timed out after {0} seconds")]
    AuthenticationTimeout(u32),

    /// Any other browser-level failure during login.
    #[error("portal login failed: {0}")]
    Portal(#[from] PortalError),
}

/// Portal login credentials.
///
/// Sourced from configuration/environment; the compiled-in defaults are
/// placeholders for local development only.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl From<&PortalConfig> for Credentials {
    fn from(config: &PortalConfig) -> Self {
        Self {
            email: config.email.clone(),
            password: config.password.clone(),
        }
    }
}

/// Establishes one authenticated browser session per run.
///
/// The session is a single mutable browser context; rows share it
/// sequentially and it is closed on a guaranteed path at run end.
pub struct SessionManager {
    base_url: String,
    login_timeout: Duration,
    login_timeout_secs: u32,
}

impl SessionManager {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            login_timeout: Duration::from_secs(config.login_timeout_secs as u64),
            login_timeout_secs: config.login_timeout_secs,
        }
    }

    pub fn login_url(&self) -> String {
        format!("{}/Login/", self.base_url)
    }

    pub fn dashboard_url(&self) -> String {
        format!("{}/Dashboard/", self.base_url)
    }

    /// Log the page into the portal and wait for the dashboard.
    pub async fn login(
        &self,
        page: &dyn PortalPage,
        credentials: &Credentials,
    ) -> Result<(), SessionError> {
        info!(email = %credentials.email, "Logging into portal");

        page.goto(&self.login_url()).await?;

        page.fill(&Locator::input_name("sEmail"), &credentials.email)
            .await?;
        page.fill(&Locator::input_name("sPassword"), &credentials.password)
            .await?;
        page.press_enter(&Locator::input_name("sPassword")).await?;

        match page
            .wait_for_url_prefix(&self.dashboard_url(), self.login_timeout)
            .await
        {
            Ok(()) => {
                debug!("Portal dashboard reached");
                Ok(())
            }
            Err(PortalError::Timeout(_)) => {
                Err(SessionError::AuthenticationTimeout(self.login_timeout_secs))
            }
            Err(e) => Err(SessionError::Portal(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_from_base() {
        let config = PortalConfig {
            base_url: "https://order.example.com/".to_string(),
            ..PortalConfig::default()
        };
        let manager = SessionManager::new(&config);
        assert_eq!(manager.login_url(), "https://order.example.com/Login/");
        assert_eq!(manager.dashboard_url(), "https://order.example.com/Dashboard/");
    }

    #[test]
    fn test_credentials_from_config() {
        let config = PortalConfig {
            email: "robot@example.com".to_string(),
            password: "pw".to_string(),
            ..PortalConfig::default()
        };
        let credentials = Credentials::from(&config);
        assert_eq!(credentials.email, "robot@example.com");
        assert_eq!(credentials.password, "pw");
    }

    #[test]
    fn test_authentication_timeout_message() {
        let err = SessionError::AuthenticationTimeout(60);
        assert_eq!(err.to_string(), "portal login timed out after 60 seconds");
    }
}
