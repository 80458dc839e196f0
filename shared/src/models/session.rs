//! Rental Session Model

use serde::{Deserialize, Serialize};

use crate::util::{format_remaining, new_id, now_millis};

/// Timed occupancy record attached to one piece of equipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    /// Owning equipment (lookup only)
    pub equipment_id: String,
    /// Unix milliseconds
    pub start_time: i64,
    /// Requested length in minutes
    pub duration: u32,
    /// Seconds left, floor 0
    pub time_remaining: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

impl Session {
    /// Start a session now with `duration_minutes * 60` seconds on the clock
    pub fn new(equipment_id: &str, duration_minutes: u32, player_name: Option<String>) -> Self {
        Self {
            id: new_id(),
            equipment_id: equipment_id.to_string(),
            start_time: now_millis(),
            duration: duration_minutes,
            time_remaining: duration_minutes.saturating_mul(60),
            player_name,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.time_remaining == 0
    }

    /// Remaining time as `m:ss`
    pub fn remaining_display(&self) -> String {
        format_remaining(self.time_remaining)
    }
}
