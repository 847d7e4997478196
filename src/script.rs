//! Data script parsing structures
//!
//! ```yaml
//! schema: pilet-data/script@0.1
//! state: { foo: 5, app: { data: { foo: 10 } } }
//! steps:
//!   - write: { name: bar, value: 0, owner: me, ttl_ms: 5000 }
//!   - try_write: { name: bar, value: 1, owner: you }
//!   - read: bar
//!   - reset: true
//! ```

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DataError, Result};
use crate::state::GlobalState;
use crate::store::ItemMeta;

pub const SCRIPT_SCHEMA: &str = "pilet-data/script@0.1";

#[derive(Debug, Deserialize)]
pub struct Script {
    pub schema: String,
    /// Initial snapshot; empty state when omitted
    #[serde(default)]
    pub state: Option<Value>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// The 4 step kinds - serde picks the variant by its key
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Write { write: WriteDef },
    TryWrite { try_write: WriteDef },
    Read { read: String },
    Reset { reset: bool },
}

#[derive(Debug, Clone, Deserialize)]
pub struct WriteDef {
    pub name: String,
    /// Missing or null removes the item
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl WriteDef {
    pub fn meta(&self) -> ItemMeta {
        let mut meta = ItemMeta::new().with_expiry(self.ttl_ms.map(Duration::from_millis));
        if let Some(owner) = &self.owner {
            meta = meta.with_owner(owner.as_str());
        }
        if let Some(target) = &self.target {
            meta = meta.with_target(target.as_str());
        }
        meta
    }
}

impl Step {
    /// Item name the step touches (`None` for reset)
    pub fn name(&self) -> Option<&str> {
        match self {
            Step::Write { write: def } | Step::TryWrite { try_write: def } => Some(&def.name),
            Step::Read { read } => Some(read),
            Step::Reset { .. } => None,
        }
    }
}

impl Script {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Schema id matches, there is something to do, every name is non-empty
    pub fn validate(&self) -> Result<()> {
        if self.schema != SCRIPT_SCHEMA {
            return Err(DataError::InvalidSchema {
                expected: SCRIPT_SCHEMA.to_string(),
                found: self.schema.clone(),
            });
        }

        if self.steps.is_empty() {
            return Err(DataError::NoSteps);
        }

        for (index, step) in self.steps.iter().enumerate() {
            if step.name().is_some_and(str::is_empty) {
                return Err(DataError::EmptyName { step: index + 1 });
            }
        }

        Ok(())
    }

    pub fn initial_state(&self) -> Result<GlobalState> {
        match &self.state {
            Some(value) => GlobalState::from_json(value.clone()),
            None => Ok(GlobalState::default()),
        }
    }

    pub fn count_steps(&self) -> usize {
        self.steps.len()
    }
}
