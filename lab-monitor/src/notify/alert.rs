//! Audible alert on session expiry

use std::io::Write;

/// Best-effort sound; implementations swallow every failure
pub trait AudibleAlert: Send + Sync {
    fn play(&self);
}

/// Rings the terminal bell (BEL) on stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl AudibleAlert for TerminalBell {
    fn play(&self) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = out.write_all(b"\x07").and_then(|_| out.flush()) {
            tracing::debug!(error = %e, "Terminal bell unavailable");
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAlert;

impl AudibleAlert for SilentAlert {
    fn play(&self) {}
}
