//! Desktop pet core library
//!
//! This crate provides everything about the desktop pet that does not depend
//! on a windowing toolkit: the wander and bounce motion, dragging, speech
//! bubbles that follow the character, the timer queue that paces them, the
//! command and menu model, and a headless runner. Hosts draw through the
//! [`Surface`] trait.

pub mod appearance;
pub mod bubble;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod pet;
pub mod rng;
pub mod runner;
pub mod scheduler;
pub mod surface;
pub mod wander;

pub use appearance::{Appearance, AppearanceKind, CharacterVisual, Sprite};
pub use bubble::{Bubble, BubbleId};
pub use command::{context_menu, tray_menu, MenuItem, PetCommand, PointerInput};
pub use config::Config;
pub use error::{Error, Result};
pub use event::{channel, channel_with_size, Event, EventReceiver, EventSender};
pub use geometry::{Bounds, Point, Size, Velocity};
pub use pet::Pet;
pub use rng::PetRng;
pub use runner::{CommandSender, Outcome, Runner, RunnerHandle, StopReason};
pub use surface::{LogSurface, Surface};
pub use wander::{Facing, Motion, MotionKind};
