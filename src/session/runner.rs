//! Session runner: a single thread that owns the scheduler.
//!
//! Control operations and ticks arrive as [`SessionCommand`]s on one mpsc
//! channel, so every scheduler mutation is serialized through the runner's
//! loop. Emitted events leave on a second channel as [`SessionUpdate`]s.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::status::StatusLine;
use super::{PlayState, SchedulerError, SchedulerState, SessionEvent, SessionScheduler};
use crate::stage::Session;

/// Reply channel for control commands.
pub type Reply = mpsc::Sender<Result<(), SchedulerError>>;

/// Where one-second ticks come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickSource {
    /// The runner keeps its own clock at this interval. The clock halts
    /// while paused and restarts a full interval after resume.
    Internal(Duration),
    /// Ticks are injected with [`SessionCommand::Tick`].
    External,
}

/// Messages accepted by the runner loop.
#[derive(Debug)]
pub enum SessionCommand {
    Start(Session, Reply),
    Pause(Reply),
    Resume(Reply),
    TogglePause(Reply),
    Stop,
    Tick,
    Shutdown,
}

/// Events emitted by one command or tick, with the resulting state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUpdate {
    pub events: Vec<SessionEvent>,
    pub state: SchedulerState,
    pub status: StatusLine,
}

/// Receiver half for [`SessionUpdate`]s.
pub struct SessionUpdateReceiver {
    rx: mpsc::Receiver<SessionUpdate>,
}

impl SessionUpdateReceiver {
    /// Non-blocking poll for the next update.
    pub fn poll(&self) -> Option<SessionUpdate> {
        self.rx.try_recv().ok()
    }

    /// Block for up to `timeout` waiting for an update.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SessionUpdate> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Drain all pending updates.
    pub fn drain(&self) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = self.rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    /// Drain pending updates and flatten their events.
    pub fn drain_events(&self) -> Vec<SessionEvent> {
        self.drain().into_iter().flat_map(|u| u.events).collect()
    }
}

/// Handle to a running session thread.
pub struct SessionRunner {
    commands: mpsc::Sender<SessionCommand>,
    thread: Option<JoinHandle<()>>,
}

impl SessionRunner {
    /// Spawn the runner thread.
    pub fn spawn(ticks: TickSource) -> (Self, SessionUpdateReceiver) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (update_tx, update_rx) = mpsc::channel();

        let thread = thread::spawn(move || {
            let mut worker = Worker {
                scheduler: SessionScheduler::new(),
                updates: update_tx,
                ticks,
                next_tick: None,
                ready_stages: 0,
            };
            worker.run(cmd_rx);
        });

        (
            Self {
                commands: cmd_tx,
                thread: Some(thread),
            },
            SessionUpdateReceiver { rx: update_rx },
        )
    }

    /// A sender for feeding commands from elsewhere (signal handlers, tick sources).
    pub fn sender(&self) -> mpsc::Sender<SessionCommand> {
        self.commands.clone()
    }

    pub fn start(&self, session: Session) -> Result<(), SchedulerError> {
        self.request(|reply| SessionCommand::Start(session, reply))
    }

    pub fn pause(&self) -> Result<(), SchedulerError> {
        self.request(SessionCommand::Pause)
    }

    pub fn resume(&self) -> Result<(), SchedulerError> {
        self.request(SessionCommand::Resume)
    }

    pub fn toggle_pause(&self) -> Result<(), SchedulerError> {
        self.request(SessionCommand::TogglePause)
    }

    pub fn stop(&self) -> Result<(), SchedulerError> {
        self.send(SessionCommand::Stop)
    }

    /// Inject one tick.
    pub fn tick(&self) -> Result<(), SchedulerError> {
        self.send(SessionCommand::Tick)
    }

    /// Stop the loop and join the thread.
    pub fn shutdown(&mut self) {
        let _ = self.commands.send(SessionCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    fn send(&self, cmd: SessionCommand) -> Result<(), SchedulerError> {
        self.commands
            .send(cmd)
            .map_err(|_| SchedulerError::RunnerGone)
    }

    fn request<F>(&self, make: F) -> Result<(), SchedulerError>
    where
        F: FnOnce(Reply) -> SessionCommand,
    {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(make(reply_tx))?;
        reply_rx.recv().map_err(|_| SchedulerError::RunnerGone)?
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Worker {
    scheduler: SessionScheduler,
    updates: mpsc::Sender<SessionUpdate>,
    ticks: TickSource,
    next_tick: Option<Instant>,
    ready_stages: usize,
}

impl Worker {
    fn run(&mut self, commands: mpsc::Receiver<SessionCommand>) {
        loop {
            let cmd = match self.next_tick {
                Some(deadline) => {
                    let wait = deadline.saturating_duration_since(Instant::now());
                    match commands.recv_timeout(wait) {
                        Ok(cmd) => cmd,
                        Err(RecvTimeoutError::Timeout) => {
                            self.clock_tick(deadline);
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match commands.recv() {
                    Ok(cmd) => cmd,
                    Err(_) => break,
                },
            };

            if !self.handle(cmd) {
                break;
            }
        }
        debug!("session runner exiting");
    }

    /// Returns `false` when the loop should exit.
    fn handle(&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::Start(session, reply) => {
                let stages = session.len();
                let result = self.scheduler.start(session);
                if result.is_ok() {
                    self.ready_stages = stages;
                }
                self.finish(result, reply);
            }
            SessionCommand::Pause(reply) => {
                let result = self.scheduler.pause();
                self.finish(result, reply);
            }
            SessionCommand::Resume(reply) => {
                let result = self.scheduler.resume();
                self.finish(result, reply);
            }
            SessionCommand::TogglePause(reply) => {
                let result = self.scheduler.toggle_pause();
                self.finish(result, reply);
            }
            SessionCommand::Stop => {
                let events = self.scheduler.stop();
                self.publish(events);
                self.sync_clock();
            }
            SessionCommand::Tick => {
                let events = self.scheduler.tick();
                self.publish(events);
                self.sync_clock();
            }
            SessionCommand::Shutdown => return false,
        }
        true
    }

    fn clock_tick(&mut self, deadline: Instant) {
        let events = self.scheduler.tick();
        self.publish(events);
        self.next_tick = match self.ticks {
            TickSource::Internal(interval) if self.is_running() => Some(deadline + interval),
            _ => None,
        };
    }

    fn finish(&mut self, result: Result<Vec<SessionEvent>, SchedulerError>, reply: Reply) {
        let reply_value = match result {
            Ok(events) => {
                self.publish(events);
                Ok(())
            }
            Err(e) => {
                warn!("session command rejected: {e}");
                Err(e)
            }
        };
        self.sync_clock();
        let _ = reply.send(reply_value);
    }

    /// Arm or disarm the internal clock to match the play state.
    fn sync_clock(&mut self) {
        match self.ticks {
            TickSource::Internal(interval) if self.is_running() => {
                if self.next_tick.is_none() {
                    self.next_tick = Some(Instant::now() + interval);
                }
            }
            _ => self.next_tick = None,
        }
    }

    fn is_running(&self) -> bool {
        self.scheduler.play_state() == PlayState::Running
    }

    fn publish(&mut self, events: Vec<SessionEvent>) {
        let state = self.scheduler.state();
        if events.is_empty() && !state.is_active() {
            return;
        }
        let status = StatusLine::from_scheduler(&self.scheduler, self.ready_stages);
        let _ = self.updates.send(SessionUpdate {
            events,
            state,
            status,
        });
    }
}
