//! Operator intents and their input validation

use shared::models::EquipmentType;

use super::engine::StartMode;
use crate::core::{LoungeError, LoungeResult};

/// A user intent dispatched to [`crate::core::AppState::dispatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoungeCommand {
    AddEquipment {
        name: String,
        kind: EquipmentType,
    },
    StartSession {
        equipment_id: String,
        duration_minutes: u32,
        player_name: Option<String>,
        mode: StartMode,
    },
    EndSession {
        equipment_id: String,
    },
    DeleteEquipment {
        equipment_id: String,
    },
    RecordEntry,
    RecordExit,
}

impl LoungeCommand {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            LoungeCommand::AddEquipment { .. } => "add_equipment",
            LoungeCommand::StartSession { .. } => "start_session",
            LoungeCommand::EndSession { .. } => "end_session",
            LoungeCommand::DeleteEquipment { .. } => "delete_equipment",
            LoungeCommand::RecordEntry => "record_entry",
            LoungeCommand::RecordExit => "record_exit",
        }
    }
}

/// Trimmed, non-empty equipment name
pub fn validate_name(name: &str) -> LoungeResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LoungeError::Validation("Equipment name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Duration in minutes within `1..=max_minutes`
pub fn validate_duration(minutes: u32, max_minutes: u32) -> LoungeResult<u32> {
    if minutes == 0 || minutes > max_minutes {
        return Err(LoungeError::Validation(format!(
            "Duration must be between 1 and {max_minutes} minutes"
        )));
    }
    Ok(minutes)
}

/// Trim the player name; blank means no player
pub fn normalize_player_name(player_name: Option<String>) -> Option<String> {
    player_name
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}
