//! Driver-neutral filter, update, and projection descriptions.
//!
//! These describe *what* to match or change; evaluating them is the store
//! driver's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::DocId;

/// One predicate on a document field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// Field equals value.
    Eq { field: String, value: Value },
    /// Field is absent or differs from value.
    Ne { field: String, value: Value },
    /// Array field does not contain value (absent field counts as not containing).
    NotContains { field: String, value: Value },
    /// Field is greater than or equal to value. Numbers compare numerically,
    /// strings lexicographically; mixed types never match.
    Gte { field: String, value: Value },
}

/// Conjunction of an optional id match and field conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: Option<DocId>,
    pub conditions: Vec<Condition>,
}

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: &DocId) -> Self {
        Self {
            id: Some(id.clone()),
            conditions: Vec::new(),
        }
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn ne(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Ne {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn not_contains(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::NotContains {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn gte(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Gte {
            field: field.into(),
            value: value.into(),
        });
        self
    }
}

/// One field modification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum UpdateOp {
    /// Add `by` to an integer field (absent counts as 0).
    Inc { field: String, by: i64 },
    /// Overwrite a field.
    Set { field: String, value: Value },
    /// Append to an array field, then drop the oldest entries so at most
    /// `cap` remain.
    PushCapped {
        field: String,
        value: Value,
        cap: usize,
    },
}

/// Ordered list of modifications applied atomically to one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub ops: Vec<UpdateOp>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(mut self, field: impl Into<String>, by: i64) -> Self {
        self.ops.push(UpdateOp::Inc {
            field: field.into(),
            by,
        });
        self
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::Set {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn push_capped(
        mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
        cap: usize,
    ) -> Self {
        self.ops.push(UpdateOp::PushCapped {
            field: field.into(),
            value: value.into(),
            cap,
        });
        self
    }
}

/// Fields to return from a write. `None` returns the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub fields: Option<Vec<String>>,
}

impl Projection {
    pub fn full() -> Self {
        Self { fields: None }
    }

    pub fn only<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: Some(fields.into_iter().map(Into::into).collect()),
        }
    }
}
