//! Status line: human-readable progress text for the active session.

use std::fmt;

use super::{PlayState, SessionScheduler};

/// Format seconds as zero-padded `MM:SS`. Minutes are not wrapped at 60.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Progress snapshot suitable for a status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// `Playing`, `Paused`, or an idle message.
    pub label: String,
    /// e.g. `Stage: 2/3 ISO | Time: 04:59/5`.
    pub stage: String,
    /// e.g. `Total: 09:59`.
    pub total: String,
}

impl StatusLine {
    const NO_STAGE: &'static str = "Stage: --/-- | Time: --:--/--:--";
    const NO_TOTAL: &'static str = "Total: --:--";

    /// Build a status line from the scheduler's current state.
    ///
    /// `ready_stages` is the number of compiled stages waiting to play, used
    /// for the idle label.
    pub fn from_scheduler(scheduler: &SessionScheduler, ready_stages: usize) -> Self {
        let state = scheduler.state();
        match (scheduler.session(), scheduler.current_stage(), state.current_stage) {
            (Some(session), Some(stage), Some(idx)) if state.is_active() => {
                let label = match state.play_state {
                    PlayState::Paused => "Paused",
                    _ => "Playing",
                };
                Self {
                    label: label.to_string(),
                    stage: format!(
                        "Stage: {}/{} {} | Time: {}/{}",
                        idx + 1,
                        session.len(),
                        stage.tone_type().short_label(),
                        format_clock(state.stage_remaining_seconds),
                        stage.duration_minutes
                    ),
                    total: format!("Total: {}", format_clock(state.total_remaining_seconds)),
                }
            }
            _ => Self::idle(ready_stages),
        }
    }

    fn idle(ready_stages: usize) -> Self {
        let label = if ready_stages == 0 {
            "No session loaded".to_string()
        } else {
            format!("{ready_stages} stage(s) ready")
        };
        Self {
            label,
            stage: Self::NO_STAGE.to_string(),
            total: Self::NO_TOTAL.to_string(),
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.label, self.stage, self.total)
    }
}
