pub mod config;
pub mod filler;
pub mod metrics;
pub mod portal;
pub mod runner;
pub mod sheets;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, ColumnMap, Config, ConfigError,
    FillDefaults, PortalConfig, SanitizedConfig, ServerConfig, SheetsConfig,
};
pub use filler::{OrderFields, OrderFormFiller, OrderOutcome};
pub use portal::{
    Credentials, PortalDriver, PortalError, PortalPage, SessionError, SessionManager,
    WebDriverClient,
};
pub use runner::{OrderRunner, RunError, RunReport, RunnerConfig};
pub use sheets::{GoogleSheetsGateway, OrderRow, RowStatus, SheetsError, SheetsGateway};
