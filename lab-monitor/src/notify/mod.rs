//! Operator notifications
//!
//! - [`NotificationSink`] - where notifications go (log, broadcast, fan-out)
//! - [`AudibleAlert`] - the expiry tone
//! - [`Notifier`] - both, plus the texts for session threshold events

pub mod alert;
pub mod sink;

pub use alert::{AudibleAlert, SilentAlert, TerminalBell};
pub use sink::{BroadcastSink, FanoutSink, LogSink, NotificationSink};

use shared::models::Notification;
use std::sync::Arc;

use crate::lounge::SessionEvent;

/// Sink + alert pair used by the coordinator
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    alert: Arc<dyn AudibleAlert>,
    expiry_notice_ms: u64,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("sink", &"<dyn NotificationSink>")
            .field("alert", &"<dyn AudibleAlert>")
            .field("expiry_notice_ms", &self.expiry_notice_ms)
            .finish()
    }
}

impl Notifier {
    pub fn new(
        sink: Arc<dyn NotificationSink>,
        alert: Arc<dyn AudibleAlert>,
        expiry_notice_ms: u64,
    ) -> Self {
        Self {
            sink,
            alert,
            expiry_notice_ms,
        }
    }

    pub fn notify(&self, notification: Notification) {
        self.sink.notify(notification);
    }

    /// Publish a threshold event (and ring on expiry)
    pub fn session_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::Warning {
                equipment_name,
                player_name,
                remaining_secs,
                ..
            } => {
                self.notify(
                    Notification::warning(format!(
                        "{} - {} left!",
                        equipment_name,
                        describe_remaining(*remaining_secs)
                    ))
                    .with_description(player_line(player_name.as_deref())),
                );
            }
            SessionEvent::Expired {
                equipment_name,
                player_name,
                ..
            } => {
                self.notify(
                    Notification::error(format!("{equipment_name} - Time is up!"))
                        .with_description(player_line(player_name.as_deref()))
                        .with_duration_ms(self.expiry_notice_ms),
                );
                self.alert.play();
            }
        }
    }
}

/// "Player: <name>" description line
pub fn player_line(player_name: Option<&str>) -> Option<String> {
    player_name.map(|p| format!("Player: {p}"))
}

/// "2 minutes" / "1 minute" / "90 seconds"
fn describe_remaining(secs: u32) -> String {
    match (secs / 60, secs % 60) {
        (1, 0) => "1 minute".to_string(),
        (m, 0) if m > 1 => format!("{m} minutes"),
        _ => format!("{secs} seconds"),
    }
}
