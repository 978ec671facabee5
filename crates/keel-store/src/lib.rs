//! # keel-store
//!
//! In-process replicated document store implementing the keel driver traits.
//! Simulates replica reachability (quorum loss, elections) and lets tests
//! script faults, including writes whose acknowledgment is lost after the
//! write applied.

mod collection;
mod connector;
pub mod eval;
pub mod faults;
mod replica_set;

pub use collection::MemoryCollection;
pub use connector::{MemoryClient, MemoryConnector, ADDRESS_SCHEME};
pub use faults::{Fault, FaultInjector, OpKind};
pub use replica_set::{ReplicaSetStore, DEFAULT_REPLICAS};
