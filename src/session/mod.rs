//! Session scheduler: sequences stages on a one-second tick.
//!
//! The scheduler owns only its cursor and countdowns; the [`Session`] it plays
//! is shared and never mutated. Every operation returns the events it emitted,
//! in order, so callers (the runner, tests) decide how to deliver them.

pub mod event;
pub mod runner;
pub mod status;

pub use event::{EndReason, SessionEvent};
pub use runner::{SessionCommand, SessionRunner, TickSource};
pub use status::{format_clock, StatusLine};

use log::{debug, info};
use thiserror::Error;

use crate::stage::{Session, StageDescriptor};

/// Remaining stage seconds at which the fade to silence is requested.
pub const FADE_OUT_LEAD_SECONDS: u32 = 5;

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Idle,
    Running,
    Paused,
}

/// A snapshot of the scheduler's countdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerState {
    pub play_state: PlayState,
    /// Active stage; `None` while idle.
    pub current_stage: Option<usize>,
    pub stage_remaining_seconds: u32,
    pub total_remaining_seconds: u32,
}

impl SchedulerState {
    pub fn is_active(&self) -> bool {
        self.play_state != PlayState::Idle
    }

    pub fn is_paused(&self) -> bool {
        self.play_state == PlayState::Paused
    }
}

/// Rejected scheduler operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("no valid stages to play")]
    EmptySession,
    #[error("a session is already active")]
    AlreadyActive,
    #[error("no session is running")]
    NotRunning,
    #[error("session is not paused")]
    NotPaused,
    #[error("session runner has shut down")]
    RunnerGone,
}

/// The session state machine.
#[derive(Debug, Default)]
pub struct SessionScheduler {
    session: Option<Session>,
    state: SchedulerState,
}

impl SessionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn play_state(&self) -> PlayState {
        self.state.play_state
    }

    /// The session being played, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Descriptor of the active stage.
    pub fn current_stage(&self) -> Option<&StageDescriptor> {
        let idx = self.state.current_stage?;
        self.session.as_ref()?.get(idx)
    }

    /// Begin playing `session` from its first stage.
    pub fn start(&mut self, session: Session) -> Result<Vec<SessionEvent>, SchedulerError> {
        if self.state.is_active() {
            return Err(SchedulerError::AlreadyActive);
        }
        if session.is_empty() {
            return Err(SchedulerError::EmptySession);
        }

        info!(
            "session started: {} stage(s), {} s",
            session.len(),
            session.total_seconds()
        );

        let mut events = vec![SessionEvent::SessionStarted {
            total_seconds: session.total_seconds(),
        }];
        self.state = SchedulerState {
            play_state: PlayState::Running,
            current_stage: Some(0),
            stage_remaining_seconds: 0,
            total_remaining_seconds: session.total_seconds(),
        };
        self.session = Some(session);
        self.enter_stage(0, &mut events);
        Ok(events)
    }

    /// Halt the countdown. Countdowns are left untouched.
    pub fn pause(&mut self) -> Result<Vec<SessionEvent>, SchedulerError> {
        if self.state.play_state != PlayState::Running {
            return Err(SchedulerError::NotRunning);
        }
        self.state.play_state = PlayState::Paused;
        debug!("session paused");
        Ok(vec![SessionEvent::PauseRequested])
    }

    /// Continue from where the countdowns left off.
    pub fn resume(&mut self) -> Result<Vec<SessionEvent>, SchedulerError> {
        if self.state.play_state != PlayState::Paused {
            return Err(SchedulerError::NotPaused);
        }
        self.state.play_state = PlayState::Running;
        debug!("session resumed");
        Ok(vec![SessionEvent::ResumeRequested])
    }

    /// Pause when running, resume when paused.
    pub fn toggle_pause(&mut self) -> Result<Vec<SessionEvent>, SchedulerError> {
        match self.state.play_state {
            PlayState::Running => self.pause(),
            PlayState::Paused => self.resume(),
            PlayState::Idle => Err(SchedulerError::NotRunning),
        }
    }

    /// End the session immediately. A no-op when idle.
    pub fn stop(&mut self) -> Vec<SessionEvent> {
        if !self.state.is_active() {
            return Vec::new();
        }
        info!("session stopped");
        self.reset();
        vec![SessionEvent::SessionEnded {
            reason: EndReason::Stopped,
        }]
    }

    /// Advance by one second. Ignored unless running.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.state.play_state != PlayState::Running {
            return events;
        }

        if self.state.stage_remaining_seconds > 0 {
            self.state.stage_remaining_seconds -= 1;
            self.state.total_remaining_seconds =
                self.state.total_remaining_seconds.saturating_sub(1);
            if self.state.stage_remaining_seconds == FADE_OUT_LEAD_SECONDS {
                events.push(SessionEvent::FadeRequested { target_volume: 0.0 });
            }
        }

        if self.state.stage_remaining_seconds == 0 {
            let next = self.state.current_stage.map_or(0, |idx| idx + 1);
            let stage_count = self.session.as_ref().map_or(0, Session::len);
            if next < stage_count {
                self.enter_stage(next, &mut events);
            } else {
                info!("session completed");
                self.reset();
                events.push(SessionEvent::SessionEnded {
                    reason: EndReason::Completed,
                });
            }
        }

        events
    }

    fn enter_stage(&mut self, index: usize, events: &mut Vec<SessionEvent>) {
        let Some(stage) = self.session.as_ref().and_then(|s| s.get(index)).copied() else {
            return;
        };

        self.state.current_stage = Some(index);
        self.state.stage_remaining_seconds = stage.duration_seconds();
        events.push(SessionEvent::StageChanged { index, stage });

        // Keeps the stage and total countdowns in step across a boundary.
        if index > 0 {
            self.state.stage_remaining_seconds =
                self.state.stage_remaining_seconds.saturating_sub(1);
            self.state.total_remaining_seconds =
                self.state.total_remaining_seconds.saturating_sub(1);
        }

        events.push(SessionEvent::FadeRequested {
            target_volume: stage.volume_percent,
        });
        debug!(
            "stage {} entered: {} ({} s left in session)",
            index + 1,
            stage,
            self.state.total_remaining_seconds
        );
    }

    fn reset(&mut self) {
        self.state = SchedulerState::default();
        self.session = None;
    }
}
