use crate::config::types::{Config, EndpointsConfig, NetworkConfig, OutputConfig, ScrapeConfig};
use crate::nid::Nid;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scrape_config(&config.scrape)?;
    validate_network_config(&config.network)?;
    validate_endpoints(&config.endpoints)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_scrape_config(config: &ScrapeConfig) -> Result<(), ConfigError> {
    validate_nid("start-from", &config.start_from)?;
    validate_nid("end-with", &config.end_with)?;
    if let Some(nid) = &config.nid {
        validate_nid("nid", nid)?;
    }
    Ok(())
}

fn validate_nid(field: &str, value: &str) -> Result<(), ConfigError> {
    Nid::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidNid(format!("{}: {}", field, e)))
}

fn validate_network_config(config: &NetworkConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_endpoints(config: &EndpointsConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("ncode", &config.ncode),
        ("novel18", &config.novel18),
        ("novelcom", &config.novelcom),
        ("novelcom18", &config.novelcom18),
        ("api", &config.api),
    ] {
        let url = Url::parse(value)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} endpoint: {}", name, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "{} endpoint '{}' must use http or https",
                name, value
            )));
        }
    }
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.log_file.is_empty() {
        return Err(ConfigError::Validation(
            "log-file cannot be empty".to_string(),
        ));
    }

    Ok(())
}
