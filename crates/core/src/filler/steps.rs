//! The individual form steps of the order flow.
//!
//! Each step is one state of the submission sequence and knows nothing
//! about spreadsheet rows; it receives already-resolved field values.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};

use crate::portal::{Locator, PortalError, PortalPage};

use super::types::{StepMode, StepOutcome};

/// One state of the order submission sequence.
#[async_trait]
pub trait FormStep: Send + Sync {
    fn name(&self) -> &'static str;

    fn mode(&self) -> StepMode {
        StepMode::Mandatory
    }

    async fn attempt(&self, page: &dyn PortalPage) -> Result<StepOutcome, PortalError>;
}

/// Open the new-site form.
pub struct NavigateNewSite {
    pub url: String,
}

#[async_trait]
impl FormStep for NavigateNewSite {
    fn name(&self) -> &'static str {
        "navigate_new_site"
    }

    async fn attempt(&self, page: &dyn PortalPage) -> Result<StepOutcome, PortalError> {
        page.goto(&self.url).await?;
        Ok(StepOutcome::Completed)
    }
}

/// Wait for the page to finish loading. The portal never reliably goes
/// idle, so this is best-effort.
pub struct AwaitPageLoad {
    pub timeout: Duration,
}

#[async_trait]
impl FormStep for AwaitPageLoad {
    fn name(&self) -> &'static str {
        "await_page_load"
    }

    fn mode(&self) -> StepMode {
        StepMode::BestEffort
    }

    async fn attempt(&self, page: &dyn PortalPage) -> Result<StepOutcome, PortalError> {
        page.wait_for_load(self.timeout).await?;
        Ok(StepOutcome::Completed)
    }
}

/// Fill the site address block.
pub struct FillSiteDetails {
    pub address: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[async_trait]
impl FormStep for FillSiteDetails {
    fn name(&self) -> &'static str {
        "fill_site_details"
    }

    async fn attempt(&self, page: &dyn PortalPage) -> Result<StepOutcome, PortalError> {
        page.fill(&Locator::input_name("sAddress"), &self.address)
            .await?;
        page.fill(&Locator::input_name("sAddress2"), &self.address2)
            .await?;
        page.fill(&Locator::input_name("sCity"), &self.city).await?;
        page.select_option(&Locator::role("combobox", ""), &self.state)
            .await?;
        page.fill(&Locator::input_name("sZipcode"), &self.zip)
            .await?;
        Ok(StepOutcome::Completed)
    }
}

/// Switch the form into manual order entry.
pub struct SelectOrderMode;

#[async_trait]
impl FormStep for SelectOrderMode {
    fn name(&self) -> &'static str {
        "select_order_mode"
    }

    async fn attempt(&self, page: &dyn PortalPage) -> Result<StepOutcome, PortalError> {
        page.click(&Locator::text("Manual Order Entry")).await?;
        page.check(&Locator::role("radio", "Manual Order Entry - Order"))
            .await?;
        Ok(StepOutcome::Completed)
    }
}

/// Look up an existing client through the search-as-you-type widget and
/// select the first match. Skipped entirely when no client name is given;
/// the order then proceeds against a fresh site.
pub struct MatchExistingClient {
    pub client_name: String,
    pub settle: Duration,
}

#[async_trait]
impl FormStep for MatchExistingClient {
    fn name(&self) -> &'static str {
        "match_existing_client"
    }

    async fn attempt(&self, page: &dyn PortalPage) -> Result<StepOutcome, PortalError> {
        if self.client_name.trim().is_empty() {
            return Ok(StepOutcome::Skipped("no client name"));
        }

        page.fill(&Locator::input_name("UserComboSearch"), &self.client_name)
            .await?;
        // Let the autocomplete list populate before selecting.
        page.settle(self.settle).await;
        page.click(&Locator::role("listitem", "")).await?;
        Ok(StepOutcome::Completed)
    }
}

/// Create the site and move to the order screen.
pub struct CreateSite;

#[async_trait]
impl FormStep for CreateSite {
    fn name(&self) -> &'static str {
        "create_site"
    }

    async fn attempt(&self, page: &dyn PortalPage) -> Result<StepOutcome, PortalError> {
        page.click(&Locator::role("button", "Create New Site"))
            .await?;
        Ok(StepOutcome::Completed)
    }
}

/// Some portal revisions interpose an address confirmation dialog here.
pub struct ConfirmAddress;

#[async_trait]
impl FormStep for ConfirmAddress {
    fn name(&self) -> &'static str {
        "confirm_address"
    }

    fn mode(&self) -> StepMode {
        StepMode::BestEffort
    }

    async fn attempt(&self, page: &dyn PortalPage) -> Result<StepOutcome, PortalError> {
        page.click(&Locator::role("button", "Confirm Address"))
            .await?;
        Ok(StepOutcome::Completed)
    }
}

/// Square footage plus the manual-order product toggle.
pub struct FillOrderSpecifics {
    pub sqft: String,
    pub settle: Duration,
}

#[async_trait]
impl FormStep for FillOrderSpecifics {
    fn name(&self) -> &'static str {
        "fill_order_specifics"
    }

    async fn attempt(&self, page: &dyn PortalPage) -> Result<StepOutcome, PortalError> {
        page.fill(&Locator::input_name("squarefeet"), &self.sqft)
            .await?;
        // The manual-order checkbox is hidden until the extra-products
        // section is expanded.
        page.click(&Locator::text("Hidden / Extra Products (NOTE"))
            .await?;
        page.settle(self.settle).await;
        page.check(&Locator::role("checkbox", "Manual Order $"))
            .await?;
        Ok(StepOutcome::Completed)
    }
}

/// Select the two schedule day-cells.
pub struct SelectScheduleDates {
    pub days: [u32; 2],
}

#[async_trait]
impl FormStep for SelectScheduleDates {
    fn name(&self) -> &'static str {
        "select_schedule_dates"
    }

    async fn attempt(&self, page: &dyn PortalPage) -> Result<StepOutcome, PortalError> {
        for day in self.days {
            // Exact match: contains() would let "1 Select" hit "11 Select".
            let cell = Locator::xpath(format!(
                "//td[normalize-space(.)=\"{} Select\"]//button",
                day
            ));
            page.click(&cell).await?;
        }
        Ok(StepOutcome::Completed)
    }
}

/// Defer actual scheduling.
pub struct SkipScheduling;

#[async_trait]
impl FormStep for SkipScheduling {
    fn name(&self) -> &'static str {
        "skip_scheduling"
    }

    async fn attempt(&self, page: &dyn PortalPage) -> Result<StepOutcome, PortalError> {
        page.check(&Locator::role("checkbox", "Skip Scheduling for Now  ("))
            .await?;
        Ok(StepOutcome::Completed)
    }
}

/// Billing address block.
pub struct FillBillingInfo {
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[async_trait]
impl FormStep for FillBillingInfo {
    fn name(&self) -> &'static str {
        "fill_billing_info"
    }

    async fn attempt(&self, page: &dyn PortalPage) -> Result<StepOutcome, PortalError> {
        page.fill(&Locator::input_name("search_BillingCity"), &self.city)
            .await?;
        page.select_option(
            &Locator::css("select[name=\"search_BillingState\"]"),
            &self.state,
        )
        .await?;
        page.fill(&Locator::input_name("search_BillingZipcode"), &self.zip)
            .await?;
        Ok(StepOutcome::Completed)
    }
}

/// Required agreements before submission.
pub struct ConfirmAgreements;

#[async_trait]
impl FormStep for ConfirmAgreements {
    fn name(&self) -> &'static str {
        "confirm_agreements"
    }

    async fn attempt(&self, page: &dyn PortalPage) -> Result<StepOutcome, PortalError> {
        page.check(&Locator::role("checkbox", "I Agree * required"))
            .await?;
        page.check(&Locator::role("checkbox", "Do NOT send invoice/receipt"))
            .await?;
        Ok(StepOutcome::Completed)
    }
}

/// Place the order.
pub struct Submit;

#[async_trait]
impl FormStep for Submit {
    fn name(&self) -> &'static str {
        "submit"
    }

    async fn attempt(&self, page: &dyn PortalPage) -> Result<StepOutcome, PortalError> {
        page.click(&Locator::role("button", "Place My Order!")).await?;
        Ok(StepOutcome::Completed)
    }
}

/// Day-of-month numbers for the two schedule cells: today + 1 and today + 2.
///
/// Derived through real date addition so the numbers stay valid calendar
/// cells across month rollover. Which month's grid the portal displays for
/// those cells is still an open question of the portal UI.
pub fn schedule_days(today: NaiveDate) -> [u32; 2] {
    [1i64, 2].map(|offset| (today + chrono::Duration::days(offset)).day())
}
