//! Errors raised while loading the orders configuration.

use thiserror::Error;

/// ConfigError covers the path from reading the YAML file to validating
/// the loaded `app` and `store` sections.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read orders config: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("orders config is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid orders config: {0}")]
    Validation(String),
}
