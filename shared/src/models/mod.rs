//! Data models
//!
//! Serialized with the dashboard's camelCase field names. `startTime` is
//! stored as Unix milliseconds rather than a date string.

pub mod equipment;
pub mod notification;
pub mod session;

// Re-exports
pub use equipment::*;
pub use notification::*;
pub use session::*;
