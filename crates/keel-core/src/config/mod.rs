//! Layered configuration: every section defaults independently, so a partial
//! TOML file only overrides what it names.

pub mod classifier_config;
pub mod connection_config;
pub mod consistency_config;
pub mod defaults;
pub mod ledger_config;
pub mod observability_config;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub use classifier_config::ClassifierConfig;
pub use connection_config::ConnectionConfig;
pub use consistency_config::ConsistencyConfig;
pub use ledger_config::LedgerConfig;
pub use observability_config::ObservabilityConfig;

/// Top-level configuration for a keel session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeelConfig {
    pub connection: ConnectionConfig,
    pub ledger: LedgerConfig,
    pub consistency: ConsistencyConfig,
    pub classifier: ClassifierConfig,
    pub observability: ObservabilityConfig,
}

impl KeelConfig {
    /// Parse and validate a TOML document. Missing sections take defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: KeelConfig = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileNotReadable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.opid_cap == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ledger.opid_cap".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        let max = defaults::MAX_READ_TIMEOUT_MS;
        if !(1..=max).contains(&self.consistency.linearizable_read_timeout_ms) {
            return Err(ConfigError::InvalidValue {
                field: "consistency.linearizable_read_timeout_ms".to_string(),
                message: format!("must be between 1 and {max}"),
            });
        }
        if self.consistency.majority_read_timeout_ms.is_some_and(|ms| ms == 0 || ms > max) {
            return Err(ConfigError::InvalidValue {
                field: "consistency.majority_read_timeout_ms".to_string(),
                message: format!("must be between 1 and {max} when set"),
            });
        }
        if self.connection.username.is_some() != self.connection.password.is_some() {
            return Err(ConfigError::InvalidValue {
                field: "connection.username".to_string(),
                message: "username and password must be set together".to_string(),
            });
        }

        // A code may belong to exactly one class.
        let mut seen = HashSet::new();
        let classes = [
            &self.classifier.transient_codes,
            &self.classifier.duplicate_key_codes,
            &self.classifier.terminal_codes,
        ];
        for code in classes.into_iter().flatten() {
            if !seen.insert(*code) {
                return Err(ConfigError::InvalidValue {
                    field: "classifier".to_string(),
                    message: format!("code {code} is listed more than once"),
                });
            }
        }
        Ok(())
    }
}
