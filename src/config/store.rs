//! Order store configuration.

use serde::Deserialize;

fn default_max_connections() -> u32 {
    5
}

/// Order store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file. The `ORDERS_DB_PATH` environment
    /// variable overrides it.
    pub path: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}
