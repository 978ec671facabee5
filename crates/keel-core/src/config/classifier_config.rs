use serde::{Deserialize, Serialize};

use super::defaults;

/// Driver error codes grouped by how the classifier treats them.
/// Codes listed nowhere classify as unclassified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub transient_codes: Vec<i32>,
    pub duplicate_key_codes: Vec<i32>,
    pub terminal_codes: Vec<i32>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            transient_codes: defaults::DEFAULT_TRANSIENT_CODES.to_vec(),
            duplicate_key_codes: defaults::DEFAULT_DUPLICATE_KEY_CODES.to_vec(),
            terminal_codes: defaults::DEFAULT_TERMINAL_CODES.to_vec(),
        }
    }
}
