//! Pilet Data - shared, observable key-value store for pilets

pub mod emitter;
pub mod error;
pub mod event_log;
pub mod pilet_api;
pub mod runner;
pub mod script;
pub mod state;
pub mod store;

pub use emitter::{EventEmitter, NoopEmitter};
pub use error::{DataError, FixSuggestion};
pub use event_log::{Event, EventKind, EventLog};
pub use pilet_api::{DataStoreOptions, PiletData};
pub use runner::{Runner, ScriptReport, StepOutcome};
pub use script::{Script, Step, WriteDef, SCRIPT_SCHEMA};
pub use state::{AppState, AtomicState, DataMapping, GlobalState, StateContainer};
pub use store::{
    read_data_item, read_data_value, reset_data, try_write_data_item, write_data_item, DataEntry,
    DataItem, Expiry, ItemMeta,
};
