use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Sheets section exists (enforced by serde)
/// - Server port is not 0
/// - A sheets credential source is configured
/// - Portal URLs are non-empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.sheets.spreadsheet_id.is_empty() {
        return Err(ConfigError::ValidationError(
            "sheets.spreadsheet_id cannot be empty".to_string(),
        ));
    }

    if config.sheets.token.is_none() && config.sheets.token_file.is_none() {
        return Err(ConfigError::ValidationError(
            "one of sheets.token or sheets.token_file must be set".to_string(),
        ));
    }

    if config.portal.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "portal.base_url cannot be empty".to_string(),
        ));
    }

    if config.portal.webdriver_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "portal.webdriver_url cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn valid_toml() -> &'static str {
        r#"
[sheets]
spreadsheet_id = "sheet-123"
token = "tok"
"#
    }

    #[test]
    fn test_validate_valid_config() {
        let config = load_config_from_str(valid_toml()).unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = load_config_from_str(valid_toml()).unwrap();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_validate_missing_credential_fails() {
        let mut config = load_config_from_str(valid_toml()).unwrap();
        config.sheets.token = None;
        config.sheets.token_file = None;
        let result = validate_config(&config);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_empty_spreadsheet_id_fails() {
        let mut config = load_config_from_str(valid_toml()).unwrap();
        config.sheets.spreadsheet_id = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_webdriver_url_fails() {
        let mut config = load_config_from_str(valid_toml()).unwrap();
        config.portal.webdriver_url = String::new();
        assert!(validate_config(&config).is_err());
    }
}
