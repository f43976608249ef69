//! Headless host loop for the desktop pet.
//!
//! This module provides the `Runner` struct that drives a [`Pet`] on the
//! tokio clock: it sleeps until the pet's next timer is due or a command
//! arrives, whichever comes first, and applies both from the same task so the
//! pet is only ever touched by one writer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::command::PetCommand;
use crate::error::Result;
use crate::pet::Pet;
use crate::surface::Surface;

/// Default command queue size.
const DEFAULT_COMMAND_QUEUE: usize = 64;

/// Longest the runner sleeps before checking for cancellation.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Sender for host commands.
pub type CommandSender = mpsc::Sender<PetCommand>;

/// Receiver for host commands.
pub type CommandReceiver = mpsc::Receiver<PetCommand>;

/// Drives a pet and its surface until it quits, is cancelled, or runs out of
/// time.
pub struct Runner<S: Surface> {
    /// The pet being driven.
    pet: Pet,
    /// Where the pet draws.
    surface: S,
    /// Commands from the host.
    commands: CommandReceiver,
    /// Shared cancellation flag.
    cancel_flag: Arc<AtomicBool>,
    /// Stop after this long, if set.
    time_limit: Option<Duration>,
}

/// Handle for controlling a running runner instance.
///
/// This handle can be used to cancel the runner from another task or thread.
#[derive(Debug, Clone)]
pub struct RunnerHandle {
    /// Shared cancellation flag.
    cancel_flag: Arc<AtomicBool>,
}

impl RunnerHandle {
    /// Signal the runner to stop at the next opportunity.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::SeqCst)
    }
}

/// Why the runner stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The pet was told to quit.
    Quit,
    /// Externally cancelled.
    Cancelled,
    /// The configured time limit passed.
    TimeLimit,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Quit => write!(f, "quit"),
            StopReason::Cancelled => write!(f, "cancelled"),
            StopReason::TimeLimit => write!(f, "time limit reached"),
        }
    }
}

/// The outcome of a runner execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Why the runner stopped.
    pub reason: StopReason,
    /// How long the pet ran, on its own clock.
    pub uptime: Duration,
}

impl<S: Surface> Runner<S> {
    /// Create a new runner for a pet that has not been started yet.
    ///
    /// Returns a tuple of (Runner, CommandSender, RunnerHandle).
    /// - The `Runner` executes the loop.
    /// - The `CommandSender` feeds it host commands.
    /// - The `RunnerHandle` can be used to cancel it.
    pub fn new(pet: Pet, surface: S) -> (Self, CommandSender, RunnerHandle) {
        let (tx, rx) = mpsc::channel(DEFAULT_COMMAND_QUEUE);
        let cancel_flag = Arc::new(AtomicBool::new(false));

        let runner = Self {
            pet,
            surface,
            commands: rx,
            cancel_flag: cancel_flag.clone(),
            time_limit: None,
        };

        let handle = RunnerHandle { cancel_flag };

        (runner, tx, handle)
    }

    /// Stop after `limit` of pet time.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Check if cancellation has been requested.
    fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::SeqCst)
    }

    /// Run the pet.
    ///
    /// Each turn of the loop:
    /// 1. Stop if quit, cancelled, or past the time limit
    /// 2. Sleep until the next timer, the time limit, or a command
    /// 3. Bring the pet's clock up to date and fire due timers
    /// 4. Apply the command, if one arrived
    ///
    /// Returns the finished pet and surface alongside the `Outcome`.
    pub async fn run(mut self) -> Result<(Outcome, Pet, S)> {
        let epoch = Instant::now();
        let mut commands_open = true;

        self.pet.start(&mut self.surface);
        info!(seed = self.pet.seed(), "runner started");

        let reason = loop {
            let elapsed = epoch.elapsed();

            if self.pet.is_quitting() {
                break StopReason::Quit;
            }
            if self.is_cancelled() {
                break StopReason::Cancelled;
            }
            if let Some(limit) = self.time_limit {
                if elapsed >= limit {
                    self.pet.advance(limit, &mut self.surface);
                    break StopReason::TimeLimit;
                }
            }

            let mut wake = elapsed + IDLE_POLL;
            if let Some(due) = self.pet.next_due() {
                wake = wake.min(due);
            }
            if let Some(limit) = self.time_limit {
                wake = wake.min(limit);
            }

            let command = tokio::select! {
                _ = sleep_until(epoch + wake) => None,
                received = self.commands.recv(), if commands_open => match received {
                    Some(command) => Some(command),
                    None => {
                        debug!("command channel closed");
                        commands_open = false;
                        None
                    }
                },
            };

            let now = epoch.elapsed();
            self.pet.advance(now, &mut self.surface);
            if let Some(command) = command {
                debug!(%command, "command");
                self.pet.handle(command, &mut self.surface);
            }
        };

        if !self.pet.is_quitting() {
            self.pet.shutdown(&mut self.surface);
        }
        let uptime = self.pet.now();
        info!(%reason, uptime_ms = uptime.as_millis() as u64, "runner stopped");

        Ok((Outcome { reason, uptime }, self.pet, self.surface))
    }
}
