//! Data items and their two stored shapes
//!
//! Older writers stored bare values under a name. Current writes always
//! store a full `DataItem`. Readers accept both.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::expiry::Expiry;

/// A named entry with its ownership and expiry metadata
///
/// Serializes all four keys, with `null` for missing metadata, so consumers
/// always see the same shape.
///
/// Decoding goes through `DataEntry`, which also accepts the bare shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataItem {
    pub value: Arc<Value>,
    pub owner: Option<Arc<str>>,
    pub target: Option<Arc<str>>,
    /// Unix epoch milliseconds
    pub expires: Option<i64>,
}

impl DataItem {
    pub fn new(value: impl Into<Arc<Value>>) -> Self {
        Self {
            value: value.into(),
            owner: None,
            target: None,
            expires: None,
        }
    }

    /// Stale once `now_ms` has passed `expires`. Items without expiry never are.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires.is_some_and(|expires| now_ms > expires)
    }

    /// Build from an object carrying a `value` key. Mistyped metadata reads
    /// as absent and unknown keys are dropped.
    fn from_object(mut map: Map<String, Value>) -> Self {
        let text = |v: Option<Value>| -> Option<Arc<str>> {
            match v {
                Some(Value::String(s)) => Some(Arc::from(s)),
                _ => None,
            }
        };

        Self {
            value: Arc::new(map.remove("value").unwrap_or(Value::Null)),
            owner: text(map.remove("owner")),
            target: text(map.remove("target")),
            expires: map
                .remove("expires")
                .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))),
        }
    }
}

/// Ownership and routing metadata attached to a write
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemMeta {
    pub owner: Option<Arc<str>>,
    pub target: Option<Arc<str>>,
    pub expires: Expiry,
}

impl ItemMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owner(mut self, owner: impl Into<Arc<str>>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<Arc<str>>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_expiry(mut self, expires: impl Into<Expiry>) -> Self {
        self.expires = expires.into();
        self
    }
}

/// What is actually stored under a name
#[derive(Debug, Clone, PartialEq)]
pub enum DataEntry {
    /// Legacy bare value, no metadata
    Raw(Arc<Value>),
    /// Structured item
    Full(DataItem),
}

impl DataEntry {
    /// The payload, whichever shape it is stored in
    pub fn value(&self) -> &Arc<Value> {
        match self {
            DataEntry::Raw(value) => value,
            DataEntry::Full(item) => &item.value,
        }
    }

    /// Owner identity. Raw entries are unowned.
    pub fn owner(&self) -> Option<&str> {
        match self {
            DataEntry::Raw(_) => None,
            DataEntry::Full(item) => item.owner.as_deref(),
        }
    }

    pub fn item(&self) -> Option<&DataItem> {
        match self {
            DataEntry::Raw(_) => None,
            DataEntry::Full(item) => Some(item),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, DataEntry::Raw(_))
    }

    /// Normalized view: raw values become items without metadata
    pub fn to_item(&self) -> DataItem {
        match self {
            DataEntry::Raw(value) => DataItem::new(Arc::clone(value)),
            DataEntry::Full(item) => item.clone(),
        }
    }
}

impl From<DataItem> for DataEntry {
    fn from(item: DataItem) -> Self {
        DataEntry::Full(item)
    }
}

/// Shape detection: any object with a `value` key is an item, so an owner
/// is never lost to an extra key or an oddly typed field. Anything else is
/// a raw value.
impl From<Value> for DataEntry {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) if map.contains_key("value") => {
                DataEntry::Full(DataItem::from_object(map))
            }
            other => DataEntry::Raw(Arc::new(other)),
        }
    }
}

impl Serialize for DataEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DataEntry::Raw(value) => value.serialize(serializer),
            DataEntry::Full(item) => item.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for DataEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(DataEntry::from)
    }
}
