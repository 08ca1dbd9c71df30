use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use portico_core::{
    Config, Credentials, OrderFormFiller, OrderRunner, PortalDriver, RunError, RunReport,
    RunnerConfig, SanitizedConfig, SessionManager, SheetsGateway,
};

/// Shared application state
pub struct AppState {
    config: Config,
    gateway: Arc<dyn SheetsGateway>,
    driver: Arc<dyn PortalDriver>,
    /// Serializes runs: the portal session is not safe for concurrent use,
    /// so overlapping triggers queue here.
    run_guard: Mutex<()>,
    running: AtomicBool,
    last_report: RwLock<Option<RunReport>>,
}

impl AppState {
    pub fn new(
        config: Config,
        gateway: Arc<dyn SheetsGateway>,
        driver: Arc<dyn PortalDriver>,
    ) -> Self {
        Self {
            config,
            gateway,
            driver,
            run_guard: Mutex::new(()),
            running: AtomicBool::new(false),
            last_report: RwLock::new(None),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub async fn last_report(&self) -> Option<RunReport> {
        self.last_report.read().await.clone()
    }

    /// Execute one full order run. Holds the run guard for the duration.
    pub async fn execute_run(&self) -> Result<RunReport, RunError> {
        let _guard = self.run_guard.lock().await;
        self.running.store(true, Ordering::SeqCst);
        crate::metrics::RUNS_IN_FLIGHT.set(1);

        let runner = OrderRunner::new(
            RunnerConfig::from(&self.config),
            Arc::clone(&self.gateway),
            Arc::clone(&self.driver),
            SessionManager::new(&self.config.portal),
            Credentials::from(&self.config.portal),
            OrderFormFiller::new(&self.config.portal, self.config.defaults.clone()),
        );

        let result = runner.run().await;

        self.running.store(false, Ordering::SeqCst);
        crate::metrics::RUNS_IN_FLIGHT.set(0);

        if let Ok(report) = &result {
            *self.last_report.write().await = Some(report.clone());
        }
        result
    }
}
