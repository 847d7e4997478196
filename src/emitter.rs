//! EventEmitter Trait - abstraction for change notification
//!
//! Every store write takes an explicit emitter. Production code passes an
//! `EventLog` (or its own listener bridge), callers with no listeners pass
//! `NoopEmitter`.

use std::sync::Arc;

use crate::event_log::{EventKind, EventLog};

/// Sink for store events
pub trait EventEmitter: Send + Sync {
    /// Emit an event and return its ID
    fn emit(&self, kind: EventKind) -> u64;
}

impl EventEmitter for EventLog {
    fn emit(&self, kind: EventKind) -> u64 {
        EventLog::emit(self, kind)
    }
}

impl<E: EventEmitter + ?Sized> EventEmitter for Arc<E> {
    fn emit(&self, kind: EventKind) -> u64 {
        (**self).emit(kind)
    }
}

/// Emitter with no listeners (always returns 0)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl EventEmitter for NoopEmitter {
    fn emit(&self, _kind: EventKind) -> u64 {
        0
    }
}
