use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: &str = "0.1.0";

/// Persisted at `<root>/.ort/config`, written once by `ort init`.
#[derive(Serialize, Deserialize)]
pub struct OrtConfig {
    pub version: String,
    pub database: DatabaseConfig,
}

impl OrtConfig {
    pub fn new(database: DatabaseConfig) -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            database,
        }
    }
}

/// Field names match the JSON keys of the on-disk config. The port is kept
/// as a string and passed through verbatim to the external command line.
#[derive(Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub database_host: String,
    pub database_port: String,
    pub database_user: String,
    pub database_password: String,
    pub database_schema: String,
}
