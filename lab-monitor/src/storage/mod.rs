//! Persistent lounge state
//!
//! A small typed key-value layer over redb. Values are JSON with the
//! dashboard's camelCase field names; timestamps are Unix milliseconds.

pub mod kv;

pub use kv::{LocalStore, StorageError, StorageResult, StoreBackend};

/// People currently inside (u32)
pub const PEOPLE_INSIDE_KEY: &str = "peopleInside";
/// Cumulative entries (u64)
pub const TOTAL_ENTRIES_KEY: &str = "totalEntries";
/// Ordered equipment list (Vec<Equipment>)
pub const EQUIPMENT_KEY: &str = "equipment";
