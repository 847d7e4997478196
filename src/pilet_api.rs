//! Per-pilet view of the shared data store
//!
//! A pilet writes under its own name as owner, so it can never clobber
//! items another pilet created.

use std::sync::Arc;

use serde_json::Value;

use crate::emitter::EventEmitter;
use crate::state::StateContainer;
use crate::store::{self, Expiry, ItemMeta};

/// Options for `PiletData::set_data`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataStoreOptions {
    pub target: Option<String>,
    pub expires: Expiry,
}

/// A bare string is shorthand for the target
impl From<&str> for DataStoreOptions {
    fn from(target: &str) -> Self {
        Self {
            target: Some(target.to_string()),
            ..Default::default()
        }
    }
}

impl From<Expiry> for DataStoreOptions {
    fn from(expires: Expiry) -> Self {
        Self {
            expires,
            ..Default::default()
        }
    }
}

/// Data API handed to one pilet
#[derive(Clone)]
pub struct PiletData {
    owner: Arc<str>,
    state: Arc<dyn StateContainer>,
    events: Arc<dyn EventEmitter>,
}

impl PiletData {
    pub fn new(
        owner: impl Into<Arc<str>>,
        state: Arc<dyn StateContainer>,
        events: Arc<dyn EventEmitter>,
    ) -> Self {
        Self {
            owner: owner.into(),
            state,
            events,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn get_data(&self, name: &str) -> Option<Arc<Value>> {
        store::read_data_value(&*self.state, name)
    }

    /// Write `name` as this pilet. Returns `false` if another pilet owns it.
    pub fn set_data(
        &self,
        name: &str,
        value: impl Into<Value>,
        options: impl Into<DataStoreOptions>,
    ) -> bool {
        let options = options.into();
        let mut meta = ItemMeta::new()
            .with_owner(Arc::clone(&self.owner))
            .with_expiry(options.expires);
        if let Some(target) = options.target {
            meta = meta.with_target(target);
        }

        store::try_write_data_item(&*self.events, &*self.state, name, value.into(), meta)
    }
}

impl std::fmt::Debug for PiletData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiletData")
            .field("owner", &self.owner)
            .finish()
    }
}
