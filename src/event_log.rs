//! Change notifications for the shared data store
//!
//! - Event: envelope with id + timestamp + kind
//! - EventKind: item writes plus script bracketing
//! - EventLog: thread-safe, append-only log

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Single event in the log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic sequence ID (for ordering)
    pub id: u64,
    /// Time since log creation (ms)
    pub timestamp_ms: u64,
    /// Event type and data
    pub kind: EventKind,
}

/// All possible event types
///
/// Uses Arc<str> for item names so the same allocation is shared with the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    // ═══════════════════════════════════════════
    // SCRIPT LEVEL
    // ═══════════════════════════════════════════
    ScriptStarted {
        step_count: usize,
    },
    ScriptCompleted {
        total_duration_ms: u64,
    },

    // ═══════════════════════════════════════════
    // ITEM LEVEL
    // ═══════════════════════════════════════════
    /// A data item was written. `value` is null when the item was removed.
    StoreData {
        name: Arc<str>,
        value: Arc<Value>,
        owner: Option<Arc<str>>,
        target: Option<Arc<str>>,
        expires: Option<i64>,
    },
}

impl EventKind {
    /// Item name if the event concerns a single data item
    pub fn item_name(&self) -> Option<&str> {
        match self {
            Self::StoreData { name, .. } => Some(name),
            Self::ScriptStarted { .. } | Self::ScriptCompleted { .. } => None,
        }
    }

    pub fn is_data_event(&self) -> bool {
        matches!(self, Self::StoreData { .. })
    }
}

/// Thread-safe, append-only event log
#[derive(Clone)]
pub struct EventLog {
    events: Arc<RwLock<Vec<Event>>>,
    start_time: Instant,
    next_id: Arc<AtomicU64>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            start_time: Instant::now(),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Emit an event (thread-safe, returns event ID)
    pub fn emit(&self, kind: EventKind) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let event = Event {
            id,
            timestamp_ms: self.start_time.elapsed().as_millis() as u64,
            kind,
        };

        self.events.write().push(event);
        id
    }

    /// Get all events (cloned)
    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    /// Events concerning one data item
    pub fn filter_item(&self, name: &str) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.kind.item_name() == Some(name))
            .collect()
    }

    /// Item write events only
    pub fn data_events(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.kind.is_data_event())
            .collect()
    }

    /// Serialize to JSON for printing/debugging
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.events()).unwrap_or(Value::Null)
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("len", &self.len())
            .finish()
    }
}
