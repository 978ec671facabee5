//! Scripted fault injection.
//!
//! Faults are queued per operation kind and consumed in FIFO order, one per
//! matching call. A `LostAck` fault lets the operation apply and then reports
//! a failure, which is exactly the ambiguity the protocol layer must absorb.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use keel_core::DriverError;

/// Store operation a fault or counter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Connect,
    Insert,
    Find,
    Update,
    Delete,
    Count,
}

impl OpKind {
    const ALL: [OpKind; 6] = [
        OpKind::Connect,
        OpKind::Insert,
        OpKind::Find,
        OpKind::Update,
        OpKind::Delete,
        OpKind::Count,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// One scripted failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Fail with this code without touching any data.
    Before(i32),
    /// Apply the operation, then fail with this code.
    LostAck(i32),
}

impl Fault {
    pub fn code(&self) -> i32 {
        match self {
            Fault::Before(code) | Fault::LostAck(code) => *code,
        }
    }

    pub fn into_error(self, kind: OpKind) -> DriverError {
        match self {
            Fault::Before(code) => {
                DriverError::new(code, format!("injected {kind:?} failure"))
            }
            Fault::LostAck(code) => DriverError::new(
                code,
                format!("injected {kind:?} failure after the write applied"),
            ),
        }
    }
}

/// Queue of pending faults plus per-kind attempt counters.
#[derive(Debug, Default)]
pub struct FaultInjector {
    queue: Mutex<VecDeque<(OpKind, Fault)>>,
    attempts: [AtomicU64; 6],
}

impl FaultInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `fault` for the next call of `kind`.
    pub fn inject(&self, kind: OpKind, fault: Fault) {
        self.lock().push_back((kind, fault));
    }

    /// Queue `fault` for the next `times` calls of `kind`.
    pub fn inject_times(&self, kind: OpKind, fault: Fault, times: usize) {
        let mut queue = self.lock();
        for _ in 0..times {
            queue.push_back((kind, fault));
        }
    }

    /// Record an attempt of `kind` and take the first queued fault for it.
    pub fn next(&self, kind: OpKind) -> Option<Fault> {
        self.attempts[kind.index()].fetch_add(1, Ordering::SeqCst);
        let mut queue = self.lock();
        let pos = queue.iter().position(|(k, _)| *k == kind)?;
        let fault = queue.remove(pos).map(|(_, f)| f);
        if let Some(f) = fault {
            tracing::debug!(?kind, fault = ?f, "store: injecting fault");
        }
        fault
    }

    /// Faults still queued.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Calls of `kind` seen so far, faulted or not.
    pub fn attempts(&self, kind: OpKind) -> u64 {
        self.attempts[kind.index()].load(Ordering::SeqCst)
    }

    pub fn reset_attempts(&self) {
        for kind in OpKind::ALL {
            self.attempts[kind.index()].store(0, Ordering::SeqCst);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<(OpKind, Fault)>> {
        // The queue holds plain data; a panic mid-push leaves it usable.
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}
