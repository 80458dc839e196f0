//! Session engine - countdown and threshold detection
//!
//! Per-equipment state machine:
//!
//! ```text
//!   Idle ──start_session──▶ Active ──tick (…→0)──▶ Expired
//!    ▲                        │                       │
//!    └──────── end_session ───┴───────────────────────┘
//! ```
//!
//! # Tick
//!
//! Every tick decrements `time_remaining` by exactly one second for each
//! session that still has time left, then compares the NEW value by exact
//! equality against the warning threshold and zero. Exact equality is what
//! makes each threshold event fire once per session: values already past a
//! threshold never match it again, and sessions at zero are skipped.
//!
//! Expired sessions stay attached (equipment remains occupied) until an
//! operator ends them.

use shared::models::{Equipment, EquipmentState, Session};

use super::registry::EquipmentRegistry;
use crate::core::{LoungeError, LoungeResult};

/// Default warning threshold: two minutes left
pub const DEFAULT_WARNING_THRESHOLD_SECS: u32 = 120;

/// What to do when starting a session on equipment that already has one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartMode {
    /// Refuse with [`LoungeError::EquipmentOccupied`]
    #[default]
    Reject,
    /// Discard the running session and start the new one
    Replace,
}

/// Threshold crossing produced by a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Remaining time just reached the warning threshold
    Warning {
        equipment_id: String,
        equipment_name: String,
        player_name: Option<String>,
        remaining_secs: u32,
    },
    /// Remaining time just reached zero
    Expired {
        equipment_id: String,
        equipment_name: String,
        player_name: Option<String>,
    },
}

impl SessionEvent {
    pub fn equipment_id(&self) -> &str {
        match self {
            SessionEvent::Warning { equipment_id, .. } | SessionEvent::Expired { equipment_id, .. } => {
                equipment_id
            }
        }
    }
}

/// Result of one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Threshold events, in registry order
    pub events: Vec<SessionEvent>,
    /// How many sessions lost a second
    pub decremented: usize,
}

impl TickReport {
    pub fn is_idle(&self) -> bool {
        self.decremented == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEngine {
    warning_threshold_secs: u32,
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_WARNING_THRESHOLD_SECS)
    }
}

impl SessionEngine {
    pub fn new(warning_threshold_secs: u32) -> Self {
        Self {
            warning_threshold_secs,
        }
    }

    /// Attach a new session to `equipment_id`.
    ///
    /// `duration_minutes` must already be validated (positive, within bounds).
    pub fn start_session(
        &self,
        registry: &mut EquipmentRegistry,
        equipment_id: &str,
        duration_minutes: u32,
        player_name: Option<String>,
        mode: StartMode,
    ) -> LoungeResult<Session> {
        let result = registry.update_by_id(equipment_id, |eq| {
            if eq.is_occupied() && mode == StartMode::Reject {
                return Err(LoungeError::EquipmentOccupied(eq.name.clone()));
            }
            let session = Session::new(&eq.id, duration_minutes, player_name);
            if let Some(previous) = eq.attach_session(session.clone()) {
                tracing::warn!(
                    equipment_id = %eq.id,
                    replaced_session = %previous.id,
                    remaining_secs = previous.time_remaining,
                    "Running session replaced"
                );
            }
            Ok(session)
        });

        match result {
            Some(outcome) => outcome,
            None => Err(LoungeError::EquipmentNotFound(equipment_id.to_string())),
        }
    }

    /// Detach the session from `equipment_id`.
    ///
    /// Returns `None` for unknown or idle equipment.
    pub fn end_session(&self, registry: &mut EquipmentRegistry, equipment_id: &str) -> Option<Session> {
        registry
            .update_by_id(equipment_id, Equipment::detach_session)
            .flatten()
    }

    /// Advance every running countdown by one second
    pub fn tick(&self, registry: &mut EquipmentRegistry) -> TickReport {
        let mut report = TickReport::default();

        for eq in registry.iter_mut() {
            let Some(event) = self.tick_equipment(eq, &mut report.decremented) else {
                continue;
            };
            report.events.push(event);
        }

        report
    }

    fn tick_equipment(&self, eq: &mut Equipment, decremented: &mut usize) -> Option<SessionEvent> {
        if eq.state() != EquipmentState::Active {
            return None;
        }
        let equipment_id = eq.id.clone();
        let equipment_name = eq.name.clone();
        let session = eq.current_session_mut()?;

        session.time_remaining -= 1;
        *decremented += 1;
        let remaining = session.time_remaining;

        if remaining == 0 {
            Some(SessionEvent::Expired {
                equipment_id,
                equipment_name,
                player_name: session.player_name.clone(),
            })
        } else if remaining == self.warning_threshold_secs {
            Some(SessionEvent::Warning {
                equipment_id,
                equipment_name,
                player_name: session.player_name.clone(),
                remaining_secs: remaining,
            })
        } else {
            None
        }
    }
}
