//! Equipment Model

use serde::{Deserialize, Serialize};

use super::Session;
use crate::util::new_id;

/// Kind of rentable unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentType {
    Pc,
    Console,
}

impl EquipmentType {
    /// Human-readable label ("PC" / "Console")
    pub fn label(&self) -> &'static str {
        match self {
            EquipmentType::Pc => "PC",
            EquipmentType::Console => "Console",
        }
    }
}

impl std::fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EquipmentType::Pc => write!(f, "pc"),
            EquipmentType::Console => write!(f, "console"),
        }
    }
}

impl std::str::FromStr for EquipmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pc" => Ok(EquipmentType::Pc),
            "console" => Ok(EquipmentType::Console),
            other => Err(format!("unknown equipment type: {other}")),
        }
    }
}

/// Session state of a piece of equipment, derived from its current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentState {
    /// No session attached
    Idle,
    /// Session attached with time left
    Active,
    /// Session attached, countdown reached zero, not yet ended
    Expired,
}

/// Rentable equipment (PC or console)
///
/// `is_occupied` mirrors `current_session.is_some()`. Both fields are only
/// changed through [`Equipment::attach_session`] / [`Equipment::detach_session`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EquipmentType,
    is_occupied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_session: Option<Session>,
}

impl Equipment {
    /// Create free equipment with a fresh id
    pub fn new(name: impl Into<String>, kind: EquipmentType) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            kind,
            is_occupied: false,
            current_session: None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.is_occupied
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current_session.as_ref()
    }

    pub fn current_session_mut(&mut self) -> Option<&mut Session> {
        self.current_session.as_mut()
    }

    pub fn state(&self) -> EquipmentState {
        match &self.current_session {
            None => EquipmentState::Idle,
            Some(session) if session.time_remaining == 0 => EquipmentState::Expired,
            Some(_) => EquipmentState::Active,
        }
    }

    /// Attach a session, returning the one it replaced (if any)
    pub fn attach_session(&mut self, session: Session) -> Option<Session> {
        self.is_occupied = true;
        self.current_session.replace(session)
    }

    /// Detach the current session and mark the equipment free
    pub fn detach_session(&mut self) -> Option<Session> {
        self.is_occupied = false;
        self.current_session.take()
    }

    /// Repair an occupied flag that disagrees with the session.
    ///
    /// Returns true if anything was changed.
    pub fn normalize(&mut self) -> bool {
        let expected = self.current_session.is_some();
        if self.is_occupied != expected {
            self.is_occupied = expected;
            return true;
        }
        false
    }
}
