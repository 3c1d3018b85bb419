//! Notifications emitted by the session scheduler.

use crate::stage::StageDescriptor;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The final stage ran out.
    Completed,
    /// `stop` was called.
    Stopped,
}

/// Events for the tone generator and UI layers.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A session began; fired once, before the first stage.
    SessionStarted { total_seconds: u32 },
    /// A stage became active; carries the full tone configuration.
    StageChanged {
        index: usize,
        stage: StageDescriptor,
    },
    /// Ramp the output volume to `target_volume` percent.
    FadeRequested { target_volume: f64 },
    PauseRequested,
    ResumeRequested,
    SessionEnded { reason: EndReason },
}

impl SessionEvent {
    /// Whether this event ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionEvent::SessionEnded { .. })
    }
}
