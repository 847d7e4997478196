//! Global state container
//!
//! The data store never owns state. It reads snapshots from a
//! `StateContainer` and asks it to adopt a new snapshot. Snapshots are
//! immutable (`Arc<GlobalState>`); every change builds a new one.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::store::DataEntry;

/// Item name → stored entry (`app.data`)
pub type DataMapping = BTreeMap<String, DataEntry>;

/// Whole application state snapshot
///
/// Only `app.data` is interpreted. Every other key is carried along untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalState {
    #[serde(default)]
    pub app: AppState,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `app` sub-tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub data: DataMapping,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GlobalState {
    /// Parse a snapshot from any JSON value shaped like `{ app: { data: {...} }, ... }`
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Copy of this snapshot with `app.data` swapped out, siblings shared as-is
    pub fn with_data(&self, data: DataMapping) -> Self {
        Self {
            app: AppState {
                data,
                extra: self.app.extra.clone(),
            },
            extra: self.extra.clone(),
        }
    }
}

/// Atomic state container capability
///
/// `update` is the read-decide-replace primitive: the closure sees the
/// current snapshot and returns the next one (or `None` to leave it alone),
/// with no other writer able to interleave.
pub trait StateContainer: Send + Sync {
    /// Current snapshot
    fn read(&self) -> Arc<GlobalState>;

    /// Unconditionally adopt `next`
    fn replace(&self, next: GlobalState);

    /// Atomically derive the next snapshot from the current one.
    /// Returns `true` if a new snapshot was adopted.
    fn update(&self, f: &mut dyn FnMut(&GlobalState) -> Option<GlobalState>) -> bool;
}

impl<S: StateContainer + ?Sized> StateContainer for Arc<S> {
    fn read(&self) -> Arc<GlobalState> {
        (**self).read()
    }

    fn replace(&self, next: GlobalState) {
        (**self).replace(next)
    }

    fn update(&self, f: &mut dyn FnMut(&GlobalState) -> Option<GlobalState>) -> bool {
        (**self).update(f)
    }
}

/// In-process state container (shared handle, clone is cheap)
#[derive(Clone, Default)]
pub struct AtomicState {
    current: Arc<RwLock<Arc<GlobalState>>>,
}

impl AtomicState {
    pub fn new(initial: GlobalState) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    pub fn from_json(value: Value) -> Result<Self> {
        GlobalState::from_json(value).map(Self::new)
    }

    /// Current snapshot rendered as JSON
    pub fn to_json(&self) -> Value {
        self.read().to_json()
    }
}

impl StateContainer for AtomicState {
    fn read(&self) -> Arc<GlobalState> {
        self.current.read().clone()
    }

    fn replace(&self, next: GlobalState) {
        *self.current.write() = Arc::new(next);
    }

    fn update(&self, f: &mut dyn FnMut(&GlobalState) -> Option<GlobalState>) -> bool {
        let mut guard = self.current.write();
        match f(&**guard) {
            Some(next) => {
                *guard = Arc::new(next);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for AtomicState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicState")
            .field("items", &self.read().app.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_keeps_unknown_siblings() {
        let raw = json!({
            "foo": 5,
            "app": { "data": { "foo": 10 }, "layout": "desktop" }
        });

        let state = GlobalState::from_json(raw.clone()).unwrap();
        assert_eq!(state.extra["foo"], 5);
        assert_eq!(state.app.extra["layout"], "desktop");
        assert_eq!(state.to_json(), raw);
    }

    #[test]
    fn missing_app_defaults_to_empty_data() {
        let state = GlobalState::from_json(json!({ "foo": 1 })).unwrap();
        assert!(state.app.data.is_empty());
    }

    #[test]
    fn read_returns_shared_snapshot() {
        let state = AtomicState::new(GlobalState::default());
        let a = state.read();
        let b = state.read();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn replace_does_not_touch_old_snapshot() {
        let state = AtomicState::from_json(json!({ "app": { "data": { "a": 1 } } })).unwrap();
        let before = state.read();

        state.replace(GlobalState::default());

        assert_eq!(before.app.data.len(), 1);
        assert!(state.read().app.data.is_empty());
    }

    #[test]
    fn update_returning_none_keeps_snapshot() {
        let state = AtomicState::from_json(json!({ "x": 1 })).unwrap();
        let before = state.read();

        let changed = state.update(&mut |_| None);

        assert!(!changed);
        assert!(Arc::ptr_eq(&before, &state.read()));
    }

    #[test]
    fn update_is_serialized_across_threads() {
        use std::thread;

        let state = AtomicState::from_json(json!({ "counter": 0 })).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = state.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        state.update(&mut |current| {
                            let mut next = current.clone();
                            let n = next.extra["counter"].as_i64().unwrap_or(0);
                            next.extra.insert("counter".into(), json!(n + 1));
                            Some(next)
                        });
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(state.read().extra["counter"], 400);
    }
}
