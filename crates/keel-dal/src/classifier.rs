//! Error classification: maps a driver failure to the retry taxonomy.
//!
//! The code table is a configuration value handed in at construction, so a
//! deployment talking to a different driver only changes config.

use std::collections::HashMap;

use keel_core::config::ClassifierConfig;
use keel_core::{DriverError, ErrorCategory};

/// Which attempt of an operation produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retry,
}

impl Attempt {
    /// 1-based attempt number, for logs and operation comments.
    pub fn number(&self) -> u8 {
        match self {
            Attempt::First => 1,
            Attempt::Retry => 2,
        }
    }

    pub fn is_retry(&self) -> bool {
        matches!(self, Attempt::Retry)
    }
}

/// What a known code means, independent of which attempt saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeClass {
    Transient,
    DuplicateKey,
    Terminal,
}

/// Code-to-class lookup table.
#[derive(Debug, Clone, Default)]
pub struct ClassificationTable {
    codes: HashMap<i32, CodeClass>,
}

impl ClassificationTable {
    /// A table that knows no codes; everything classifies as unclassified.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        let mut table = Self::empty();
        for &code in &config.terminal_codes {
            table.codes.insert(code, CodeClass::Terminal);
        }
        for &code in &config.duplicate_key_codes {
            table.codes.insert(code, CodeClass::DuplicateKey);
        }
        for &code in &config.transient_codes {
            table.codes.insert(code, CodeClass::Transient);
        }
        table
    }

    pub fn with(mut self, code: i32, class: CodeClass) -> Self {
        self.codes.insert(code, class);
        self
    }

    pub fn get(&self, code: i32) -> Option<CodeClass> {
        self.codes.get(&code).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Categorizes driver failures for the retry executor.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    table: ClassificationTable,
}

impl ErrorClassifier {
    pub fn new(table: ClassificationTable) -> Self {
        Self { table }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(ClassificationTable::from_config(config))
    }

    /// Classify one failed attempt.
    ///
    /// A uniqueness violation is only ambiguous on a retry: the id was
    /// assigned before the first send, so on a retry the only way it can
    /// already exist is that the first attempt landed and its acknowledgment
    /// was lost. On the first attempt it is a genuine collision.
    pub fn classify(&self, error: &DriverError, attempt: Attempt) -> ErrorCategory {
        match self.table.get(error.code) {
            Some(CodeClass::Transient) => ErrorCategory::Transient,
            Some(CodeClass::DuplicateKey) if attempt.is_retry() => {
                ErrorCategory::AmbiguousDuplicate
            }
            Some(CodeClass::DuplicateKey) | Some(CodeClass::Terminal) => ErrorCategory::Terminal,
            None => ErrorCategory::Unclassified,
        }
    }

    pub fn is_duplicate_key(&self, error: &DriverError) -> bool {
        self.table.get(error.code) == Some(CodeClass::DuplicateKey)
    }

    pub fn table(&self) -> &ClassificationTable {
        &self.table
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}
