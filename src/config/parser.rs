use crate::config::types::{Config, Overrides};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Missing keys take their defaults, so an empty file is a valid configuration.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use narou_crawl::config::load_config;
///
/// let config = load_config(Path::new("narou.toml")).unwrap();
/// println!("Database: {}", config.output.database_path);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Builds the run configuration from an optional file plus command-line overrides
///
/// The merged result is validated once, after overrides are applied.
pub fn resolve_config(path: Option<&Path>, overrides: &Overrides) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => Config::default(),
    };

    config.apply(overrides);
    validate(&config)?;

    Ok(config)
}
