//! Configuration loading and validation for the special-order service.
//!
//! Uses serde_yaml to load YAML configuration files with support for
//! environment variable overrides.

mod app;
mod error;
mod store;

pub use app::AppConfig;
pub use error::ConfigError;
pub use store::StoreConfig;

use serde::Deserialize;
use std::{env, fs};

/// Root configuration structure for the special-order service.
///
/// Required sections: app, store.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application-level settings like name and environment.
    pub app: AppConfig,
    /// Order persistence settings.
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration from a YAML file at the given path.
    ///
    /// First loads environment variables from `.env` file (if exists),
    /// then loads YAML config. `ORDERS_DB_PATH` overrides `store.path`.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore error if not found)
        dotenvy::dotenv().ok();

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        config.load_overrides_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn load_overrides_from_env(&mut self) {
        if let Ok(path) = env::var("ORDERS_DB_PATH") {
            if !path.is_empty() {
                self.store.path = path;
            }
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.is_empty() {
            return Err(ConfigError::Validation("app.name is required".into()));
        }

        if self.store.path.is_empty() {
            return Err(ConfigError::Validation("store.path is required".into()));
        }

        if self.store.max_connections == 0 {
            return Err(ConfigError::Validation(
                "store.max_connections must be positive".into(),
            ));
        }

        Ok(())
    }
}
