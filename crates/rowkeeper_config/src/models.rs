// --- File: crates/rowkeeper_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// --- Database Config ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DatabaseConfig {
    pub url: String, // e.g. "sqlite:data/rowkeeper.db", or ROWKEEPER__DATABASE__URL
    /// Upper bound of pooled connections. Defaults to 5.
    #[serde(default)]
    pub max_connections: Option<u32>,
    /// Seconds to wait for a free connection. Defaults to 3.
    #[serde(default)]
    pub acquire_timeout_secs: Option<u64>,
    /// Seconds before an idle connection is closed. Defaults to 600.
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,
}

// --- Logging Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Optional Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}
