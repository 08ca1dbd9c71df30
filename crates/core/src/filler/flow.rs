//! The order form filler: composes the step sequence and runs it to a
//! terminal outcome.

use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::{FillDefaults, PortalConfig};
use crate::metrics;
use crate::portal::{Locator, PortalPage};

use super::steps::{
    schedule_days, AwaitPageLoad, ConfirmAddress, ConfirmAgreements, CreateSite, FillBillingInfo,
    FillOrderSpecifics, FillSiteDetails, FormStep, MatchExistingClient, NavigateNewSite,
    SelectOrderMode, SelectScheduleDates, SkipScheduling, Submit,
};
use super::types::{OrderFields, OrderOutcome, StepMode, StepOutcome};

/// Positive confirmation marker after submission.
pub const CONFIRMATION_TEXT: &str = "Your order has been placed.";

/// Inline error element consulted when confirmation never appears.
const INLINE_ERROR_SELECTOR: &str = ".error-message";

/// Drives one order through the portal form.
pub struct OrderFormFiller {
    new_site_url: String,
    defaults: FillDefaults,
    settle: Duration,
    load_timeout: Duration,
    confirmation_timeout: Duration,
}

impl OrderFormFiller {
    pub fn new(portal: &PortalConfig, defaults: FillDefaults) -> Self {
        Self {
            new_site_url: format!(
                "{}/Sites/NewSite.asp",
                portal.base_url.trim_end_matches('/')
            ),
            defaults,
            settle: Duration::from_millis(portal.settle_ms),
            load_timeout: Duration::from_secs(portal.timeout_secs as u64),
            confirmation_timeout: Duration::from_secs(portal.confirmation_timeout_secs as u64),
        }
    }

    /// Resolve a source value, substituting (and logging) the configured
    /// default when the source is empty.
    fn resolve(&self, field: &'static str, value: &str, default: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            info!(field = field, default = default, "Substituting default for empty field");
            default.to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Build the state sequence for one order.
    pub fn build_steps(&self, order: &OrderFields, today: NaiveDate) -> Vec<Box<dyn FormStep>> {
        let d = &self.defaults;
        vec![
            Box::new(NavigateNewSite {
                url: self.new_site_url.clone(),
            }),
            Box::new(AwaitPageLoad {
                timeout: self.load_timeout,
            }),
            Box::new(FillSiteDetails {
                address: self.resolve("address", &order.address, &d.address),
                address2: d.address2.clone(),
                city: self.resolve("city", &order.city, &d.city),
                state: self.resolve("state", &order.state, &d.state),
                zip: self.resolve("zip", &order.zip, &d.zip),
            }),
            Box::new(SelectOrderMode),
            Box::new(MatchExistingClient {
                client_name: order.client_name.clone(),
                settle: self.settle,
            }),
            Box::new(CreateSite),
            Box::new(ConfirmAddress),
            Box::new(FillOrderSpecifics {
                sqft: self.resolve("sqft", &order.sqft, &d.sqft),
                settle: self.settle,
            }),
            Box::new(SelectScheduleDates {
                days: schedule_days(today),
            }),
            Box::new(SkipScheduling),
            Box::new(FillBillingInfo {
                city: self.resolve("billing_city", &order.billing_city, &d.city),
                state: self.resolve("billing_state", &order.billing_state, &d.state),
                zip: self.resolve("billing_zip", &order.billing_zip, &d.zip),
            }),
            Box::new(ConfirmAgreements),
            Box::new(Submit),
        ]
    }

    /// Run the full sequence for one order.
    ///
    /// Never returns an error: mandatory step failures and confirmation
    /// timeouts are converted into a `Failure` outcome for the row, leaving
    /// the rest of the run unaffected.
    pub async fn submit_order(
        &self,
        page: &dyn PortalPage,
        order: &OrderFields,
        today: NaiveDate,
    ) -> OrderOutcome {
        info!(
            client = %order.client_name,
            package = %order.package,
            "Submitting order"
        );

        for step in self.build_steps(order, today) {
            match step.attempt(page).await {
                Ok(StepOutcome::Completed) => {
                    debug!(step = step.name(), "Step complete");
                }
                Ok(StepOutcome::Skipped(reason)) => {
                    debug!(step = step.name(), reason = reason, "Step skipped");
                }
                Err(e) => match step.mode() {
                    StepMode::BestEffort => {
                        debug!(step = step.name(), error = %e, "Best-effort step failed, continuing");
                    }
                    StepMode::Mandatory => {
                        warn!(step = step.name(), error = %e, "Step failed, aborting order");
                        metrics::STEP_FAILURES.with_label_values(&[step.name()]).inc();
                        return OrderOutcome::Failure(format!(
                            "EXCEPTION: {} failed: {}",
                            step.name(),
                            e
                        ));
                    }
                },
            }
        }

        self.await_confirmation(page).await
    }

    /// Wait for the success marker; fall back to the inline error element.
    async fn await_confirmation(&self, page: &dyn PortalPage) -> OrderOutcome {
        match page
            .wait_for_text(CONFIRMATION_TEXT, self.confirmation_timeout)
            .await
        {
            Ok(()) => {
                debug!("Order confirmation received");
                OrderOutcome::Success
            }
            Err(crate::portal::PortalError::Timeout(_)) => {
                warn!("No confirmation within timeout, checking for inline error");
                match page.read_text(&Locator::css(INLINE_ERROR_SELECTOR)).await {
                    Ok(message) if !message.trim().is_empty() => {
                        OrderOutcome::Failure(format!("ERROR: {}", message.trim()))
                    }
                    _ => OrderOutcome::Failure("ERROR: unknown after submit".to_string()),
                }
            }
            Err(e) => OrderOutcome::Failure(format!("EXCEPTION: awaiting confirmation: {}", e)),
        }
    }
}
