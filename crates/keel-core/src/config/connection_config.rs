use serde::{Deserialize, Serialize};

use super::defaults;

/// Where and as whom the session connects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Store address handed to the connector.
    pub address: String,
    /// Database holding the document collection.
    pub database: String,
    /// Collection all protocols operate on.
    pub collection: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            address: defaults::DEFAULT_ADDRESS.to_string(),
            database: defaults::DEFAULT_DATABASE.to_string(),
            collection: defaults::DEFAULT_COLLECTION.to_string(),
            username: None,
            password: None,
        }
    }
}
