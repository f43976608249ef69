//! Event system for the desktop pet.
//!
//! This module provides a channel for reporting what the pet does to
//! observers (the CLI's event printer, tests). Sending never blocks the pet:
//! when nobody is listening, or the buffer is full, events are dropped.

use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;

use crate::bubble::BubbleId;
use crate::geometry::{Point, Velocity};
use crate::wander::{Facing, MotionKind};

/// Default channel buffer size.
const DEFAULT_CHANNEL_SIZE: usize = 256;

/// Events emitted by the pet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// The pet has appeared on screen.
    Started {
        /// Starting position.
        position: Point,
        /// Starting velocity.
        velocity: Velocity,
        /// Seed of the random source, for replaying a run.
        seed: u64,
    },

    /// The character hit a screen edge.
    Bounced {
        /// Position after the bounce.
        position: Point,
        /// Velocity after the bounce.
        velocity: Velocity,
    },

    /// The random walk picked a new velocity.
    Perturbed {
        /// The new velocity.
        velocity: Velocity,
    },

    /// The character turned around.
    Turned {
        /// The new facing.
        facing: Facing,
    },

    /// The character was picked up.
    DragStarted {
        /// Pointer position at the press.
        pointer: Point,
    },

    /// The character was put down.
    DragEnded {
        /// Where it landed.
        position: Point,
        /// Its fresh velocity.
        velocity: Velocity,
        /// What it does now.
        motion: MotionKind,
    },

    /// Auto-move was switched.
    MotionChanged {
        /// The motion state after the change.
        motion: MotionKind,
    },

    /// The character was shown or hidden.
    VisibilityChanged {
        /// Whether the character is visible now.
        visible: bool,
    },

    /// A speech bubble appeared.
    BubbleShown {
        /// The bubble.
        id: BubbleId,
        /// What it says.
        message: String,
    },

    /// A speech bubble went away.
    BubbleExpired {
        /// The bubble.
        id: BubbleId,
    },

    /// The user asked for the context menu.
    MenuRequested {
        /// Where the menu should open.
        position: Point,
    },

    /// The pet is shutting down.
    Quit,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Started {
                position,
                velocity,
                seed,
            } => write!(f, "started at {position} moving {velocity} (seed {seed})"),
            Event::Bounced { position, velocity } => {
                write!(f, "bounced at {position}, now moving {velocity}")
            }
            Event::Perturbed { velocity } => write!(f, "changed course to {velocity}"),
            Event::Turned { facing } => write!(f, "turned {facing}"),
            Event::DragStarted { pointer } => write!(f, "picked up at {pointer}"),
            Event::DragEnded {
                position,
                velocity,
                motion,
            } => write!(f, "put down at {position}, {motion} with {velocity}"),
            Event::MotionChanged { motion } => write!(f, "now {motion}"),
            Event::VisibilityChanged { visible } => {
                write!(f, "{}", if *visible { "shown" } else { "hidden" })
            }
            Event::BubbleShown { id, message } => write!(f, "{id} says \"{message}\""),
            Event::BubbleExpired { id } => write!(f, "{id} expired"),
            Event::MenuRequested { position } => write!(f, "menu requested at {position}"),
            Event::Quit => write!(f, "quit"),
        }
    }
}

/// Sender for events.
pub type EventSender = mpsc::Sender<Event>;

/// Receiver for events.
pub type EventReceiver = mpsc::Receiver<Event>;

/// Create a new event channel with the default buffer size.
///
/// Returns a sender and receiver pair for event communication.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_SIZE)
}

/// Create a new event channel with a custom buffer size.
///
/// Returns a sender and receiver pair for event communication.
pub fn channel_with_size(size: usize) -> (EventSender, EventReceiver) {
    mpsc::channel(size)
}
