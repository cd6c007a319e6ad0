use std::path::Path;

use anyhow::Result;

use crate::config::ort::DatabaseConfig;
use crate::error::OrtError;

pub mod mysql;

/// Resolved connection parameters, built once per invocation from the
/// persisted configuration and immutable afterwards.
#[derive(Clone)]
pub struct ConnectionProfile {
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
    pub schema: String,
}

impl ConnectionProfile {
    /// All five fields must be present; a profile is never partially
    /// populated. Anything beyond presence (bad credentials, unreachable
    /// host) surfaces only when the external process runs.
    pub fn build_from(config: &DatabaseConfig) -> Result<Self, OrtError> {
        let profile = Self {
            host: config.database_host.clone(),
            port: config.database_port.clone(),
            username: config.database_user.clone(),
            password: config.database_password.clone(),
            schema: config.database_schema.clone(),
        };
        for (field, value) in [
            ("database_host", &profile.host),
            ("database_port", &profile.port),
            ("database_user", &profile.username),
            ("database_password", &profile.password),
            ("database_schema", &profile.schema),
        ] {
            if value.is_empty() {
                return Err(OrtError::InvalidConfig { field });
            }
        }
        Ok(profile)
    }
}

pub trait DumpEngine {
    /// Dump the configured schema into `dest`, blocking until the external
    /// process exits.
    fn dump(&self, profile: &ConnectionProfile, dest: &Path) -> Result<()>;

    /// Feed the dump at `source` back into the database.
    fn restore(&self, profile: &ConnectionProfile, source: &Path) -> Result<()>;
}
