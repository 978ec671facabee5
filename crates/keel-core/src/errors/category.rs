use serde::{Deserialize, Serialize};

/// How the classifier categorizes one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Outcome unknown; the operation may or may not have applied.
    Transient,
    /// Uniqueness violation seen on a retry: the first attempt applied and
    /// only its acknowledgment was lost.
    AmbiguousDuplicate,
    /// Recognized failure that retrying cannot fix.
    Terminal,
    /// Code not present in the classification table. Handled as terminal.
    Unclassified,
}

impl ErrorCategory {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Transient)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transient => "transient",
            ErrorCategory::AmbiguousDuplicate => "ambiguous_duplicate",
            ErrorCategory::Terminal => "terminal",
            ErrorCategory::Unclassified => "unclassified",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
