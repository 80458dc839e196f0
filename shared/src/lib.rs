//! Shared types for the Gaming Lab monitor
//!
//! Domain models used by the monitor runtime and by any front end that
//! renders lounge state: equipment, rental sessions and notifications.

pub mod models;
pub mod util;

// Re-exports
pub use models::{
    Equipment, EquipmentState, EquipmentType, Notification, NotificationKind, Session,
};
pub use serde::{Deserialize, Serialize};
