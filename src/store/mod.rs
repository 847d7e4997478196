//! Store Module - shared data items
//!
//! Key types:
//! - `DataEntry`: raw legacy value or full `DataItem`
//! - `ItemMeta`: owner/target/expiry attached to a write
//! - `Expiry`: never, relative TTL, or absolute instant
//!
//! Operations are free functions over any `StateContainer`, so the store
//! itself holds no state.

mod datastore;
pub mod expiry;
mod item;

pub use datastore::{
    expired_names, read_data_item, read_data_value, reset_data, try_write_data_item,
    write_data_item,
};
pub use expiry::{compute_expiry, compute_expiry_from, now_millis, Expiry};
pub use item::{DataEntry, DataItem, ItemMeta};
