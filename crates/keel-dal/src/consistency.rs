//! Consistency selection per operation shape.

use std::time::Duration;

use keel_core::config::ConsistencyConfig;
use keel_core::traits::CallOptions;
use keel_core::ConsistencyLevel;

/// What kind of operation is about to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationShape {
    Write,
    /// Latest value of one document.
    SingleRead,
    /// Several documents, or a count.
    MultiRead,
}

/// Level and time bound attached to one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consistency {
    pub level: ConsistencyLevel,
    pub timeout: Option<Duration>,
}

impl Consistency {
    pub fn call_options(&self, comment: impl Into<String>) -> CallOptions {
        CallOptions::default()
            .with_max_time(self.timeout)
            .with_comment(comment)
    }
}

/// Picks `{level, timeout}` for each operation shape.
#[derive(Debug, Clone)]
pub struct ConsistencySelector {
    linearizable_read_timeout: Duration,
    majority_read_timeout: Option<Duration>,
}

impl ConsistencySelector {
    pub fn from_config(config: &ConsistencyConfig) -> Self {
        Self {
            linearizable_read_timeout: config.linearizable_read_timeout(),
            majority_read_timeout: config.majority_read_timeout(),
        }
    }

    pub fn select(&self, shape: OperationShape) -> Consistency {
        match shape {
            // Writes are acknowledged by a quorum before success is reported.
            OperationShape::Write => Consistency {
                level: ConsistencyLevel::Majority,
                timeout: None,
            },
            // Always bounded: an unbounded linearizable read hangs for as long
            // as quorum is lost. The expiry code classifies as transient.
            OperationShape::SingleRead => Consistency {
                level: ConsistencyLevel::Linearizable,
                timeout: Some(self.linearizable_read_timeout),
            },
            OperationShape::MultiRead => Consistency {
                level: ConsistencyLevel::Majority,
                timeout: self.majority_read_timeout,
            },
        }
    }

    pub fn write(&self) -> Consistency {
        self.select(OperationShape::Write)
    }

    pub fn single_read(&self) -> Consistency {
        self.select(OperationShape::SingleRead)
    }

    pub fn multi_read(&self) -> Consistency {
        self.select(OperationShape::MultiRead)
    }
}

impl Default for ConsistencySelector {
    fn default() -> Self {
        Self::from_config(&ConsistencyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_use_majority_without_timeout() {
        let c = ConsistencySelector::default().write();
        assert_eq!(c.level, ConsistencyLevel::Majority);
        assert_eq!(c.timeout, None);
    }

    #[test]
    fn single_reads_are_linearizable_and_bounded() {
        let c = ConsistencySelector::default().single_read();
        assert_eq!(c.level, ConsistencyLevel::Linearizable);
        assert_eq!(c.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn multi_reads_use_configured_majority_bound() {
        let config = ConsistencyConfig {
            majority_read_timeout_ms: Some(750),
            ..Default::default()
        };
        let c = ConsistencySelector::from_config(&config).multi_read();
        assert_eq!(c.level, ConsistencyLevel::Majority);
        assert_eq!(c.timeout, Some(Duration::from_millis(750)));
    }

    #[test]
    fn call_options_carry_timeout_and_comment() {
        let opts = ConsistencySelector::default()
            .single_read()
            .call_options("get_by_id attempt 1");
        assert_eq!(opts.max_time, Some(Duration::from_secs(10)));
        assert_eq!(opts.comment.as_deref(), Some("get_by_id attempt 1"));
    }
}
