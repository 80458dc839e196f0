//! Lounge domain: equipment, rental sessions and people counters
//!
//! # Command Flow
//!
//! ```text
//! operator command ─▶ AppState::dispatch ─▶ validate ─▶ registry / engine / counters
//!                                                     └▶ persist ─▶ notify
//! SessionTicker (every period) ─▶ AppState::tick ─▶ SessionEngine::tick
//!                                                     └▶ persist ─▶ threshold notifications
//! ```

pub mod commands;
pub mod counters;
pub mod engine;
pub mod registry;
pub mod ticker;

pub use commands::LoungeCommand;
pub use counters::LoungeCounters;
pub use engine::{SessionEngine, SessionEvent, StartMode, TickReport};
pub use registry::EquipmentRegistry;
pub use ticker::SessionTicker;
