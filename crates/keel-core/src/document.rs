//! Documents and the identifiers the protocol layer assigns to them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{COUNTER_FIELD, OPIDS_FIELD};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

define_id!(
    /// Document identifier, minted client-side before the first network call.
    DocId
);

define_id!(
    /// Identifier of one logical mutation. Shared by every network attempt of
    /// that mutation.
    OperationId
);

/// A stored or to-be-stored document: an optional id plus an ordered field map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// A counter-bearing document starting at `initial` with an empty ledger.
    pub fn with_counter(initial: i64) -> Self {
        Self::new()
            .with_field(COUNTER_FIELD, initial)
            .with_field(OPIDS_FIELD, Value::Array(Vec::new()))
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_id(mut self, id: DocId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<&DocId> {
        self.id.as_ref()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Current counter value, if the document carries an integer counter.
    pub fn counter(&self) -> Option<i64> {
        self.fields.get(COUNTER_FIELD).and_then(Value::as_i64)
    }

    /// Operation ids currently held in the ledger, oldest first.
    pub fn opids(&self) -> Vec<&str> {
        self.fields
            .get(OPIDS_FIELD)
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Keep only the named fields (the id is always kept).
    pub fn project(&self, fields: &[String]) -> Document {
        let kept = self
            .fields
            .iter()
            .filter(|(name, _)| fields.iter().any(|f| f == *name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Document {
            id: self.id.clone(),
            fields: kept,
        }
    }
}
