//! DataStore - shared item reads and ownership-gated writes
//!
//! All operations go through a `StateContainer`: read the latest snapshot,
//! decide, and adopt a new snapshot in one `update` call. Events are emitted
//! only after the new snapshot is visible to readers.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use super::expiry::compute_expiry;
use super::item::{DataEntry, DataItem, ItemMeta};
use crate::emitter::EventEmitter;
use crate::event_log::EventKind;
use crate::state::{GlobalState, StateContainer};

/// Stored entry under `name`, in whatever shape it was stored
pub fn read_data_item<S: StateContainer + ?Sized>(state: &S, name: &str) -> Option<DataEntry> {
    state.read().app.data.get(name).cloned()
}

/// Just the payload under `name` (Arc clone, no deep copy)
pub fn read_data_value<S: StateContainer + ?Sized>(state: &S, name: &str) -> Option<Arc<Value>> {
    state
        .read()
        .app
        .data
        .get(name)
        .map(|entry| Arc::clone(entry.value()))
}

/// Unconditional write, for privileged callers. `Value::Null` removes the item.
pub fn write_data_item<S: StateContainer + ?Sized>(
    events: &dyn EventEmitter,
    state: &S,
    name: &str,
    value: Value,
    meta: ItemMeta,
) {
    let write = PendingWrite::new(name, value, meta);
    state.update(&mut |current| Some(write.apply(current)));

    debug!(item = %write.name, owner = ?write.owner(), removed = write.item.is_none(), "Data item written");
    write.emit(events);
}

/// Ownership-gated write. Succeeds when `name` is absent, unowned, or owned
/// by exactly `meta.owner`; otherwise leaves the store untouched and
/// returns `false`.
pub fn try_write_data_item<S: StateContainer + ?Sized>(
    events: &dyn EventEmitter,
    state: &S,
    name: &str,
    value: Value,
    meta: ItemMeta,
) -> bool {
    let write = PendingWrite::new(name, value, meta);
    let mut holder: Option<Arc<str>> = None;

    let accepted = state.update(&mut |current| match current.app.data.get(name) {
        Some(entry) if !may_overwrite(entry, write.owner()) => {
            holder = entry.owner().map(Arc::from);
            None
        }
        _ => Some(write.apply(current)),
    });

    if accepted {
        debug!(item = %write.name, owner = ?write.owner(), removed = write.item.is_none(), "Data item written");
        write.emit(events);
    } else {
        debug!(item = %write.name, owner = ?write.owner(), held_by = ?holder, "Data write rejected");
    }

    accepted
}

/// Drop every item regardless of owner. Emits no per-item events.
pub fn reset_data<S: StateContainer + ?Sized>(state: &S) {
    let mut cleared = 0;
    state.update(&mut |current| {
        cleared = current.app.data.len();
        Some(current.with_data(Default::default()))
    });

    info!(cleared, "Data reset");
}

/// Names of structured items already stale at `now_ms`
///
/// Advisory only: callers decide whether to remove them.
pub fn expired_names<S: StateContainer + ?Sized>(state: &S, now_ms: i64) -> Vec<String> {
    state
        .read()
        .app
        .data
        .iter()
        .filter(|(_, entry)| entry.item().is_some_and(|item| item.is_expired_at(now_ms)))
        .map(|(name, _)| name.clone())
        .collect()
}

fn may_overwrite(existing: &DataEntry, caller: Option<&str>) -> bool {
    match existing.owner() {
        None => true,
        Some(owner) => caller == Some(owner),
    }
}

/// A write resolved against the clock, ready to apply to any snapshot
struct PendingWrite {
    name: Arc<str>,
    /// Caller identity, kept even for removals
    owner: Option<Arc<str>>,
    /// `None` removes the entry
    item: Option<DataItem>,
}

impl PendingWrite {
    fn new(name: &str, value: Value, meta: ItemMeta) -> Self {
        let item = (!value.is_null()).then(|| DataItem {
            value: Arc::new(value),
            owner: meta.owner.clone(),
            target: meta.target,
            expires: compute_expiry(meta.expires),
        });

        Self {
            name: Arc::from(name),
            owner: meta.owner,
            item,
        }
    }

    fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    fn apply(&self, current: &GlobalState) -> GlobalState {
        let mut data = current.app.data.clone();
        match &self.item {
            Some(item) => {
                data.insert(self.name.to_string(), DataEntry::Full(item.clone()));
            }
            None => {
                data.remove(&*self.name);
            }
        }
        current.with_data(data)
    }

    fn emit(&self, events: &dyn EventEmitter) {
        let kind = match &self.item {
            Some(item) => EventKind::StoreData {
                name: Arc::clone(&self.name),
                value: Arc::clone(&item.value),
                owner: item.owner.clone(),
                target: item.target.clone(),
                expires: item.expires,
            },
            None => EventKind::StoreData {
                name: Arc::clone(&self.name),
                value: Arc::new(Value::Null),
                owner: self.owner.clone(),
                target: None,
                expires: None,
            },
        };
        events.emit(kind);
    }
}
