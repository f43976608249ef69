//! Configuration for the desktop pet.
//!
//! This module provides the `Config` struct with a builder pattern. Every
//! timing, size and message the pet uses has a fixed default; hosts only
//! override the handful of options they expose (portrait path, seed,
//! automatic speech) and the fallback screen size when they cannot ask
//! the display.

use crate::error::{Error, Result};
use crate::geometry::Size;
use std::path::PathBuf;
use std::time::Duration;

/// Default portrait file, looked up relative to the working directory.
const DEFAULT_IMAGE_PATH: &str = "character.png";

/// Default screen size used when the host cannot report one.
const DEFAULT_SCREEN_SIZE: Size = Size::new(1920, 1080);

/// Outer size of the character window.
const DEFAULT_CHARACTER_SIZE: Size = Size::new(150, 150);

/// Edge of the square the portrait or glyph is drawn into.
const DEFAULT_VISUAL_EDGE: u32 = 120;

/// Interval between wander ticks.
const DEFAULT_WANDER_INTERVAL_MS: u64 = 50;

/// Interval between automatic speech bubbles.
const DEFAULT_SPEECH_INTERVAL_SECS: u64 = 10;

/// Interval between bubble follow ticks.
const DEFAULT_FOLLOW_INTERVAL_MS: u64 = 30;

/// How long a bubble stays on screen.
const DEFAULT_BUBBLE_LIFETIME_MS: u64 = 3000;

/// How long after a press the drag is released.
const DEFAULT_DRAG_RELEASE_MS: u64 = 3000;

/// Chance per wander tick of picking a new random velocity.
const DEFAULT_PERTURB_CHANCE: f64 = 0.03;

/// Outer size of a speech bubble window.
const DEFAULT_BUBBLE_SIZE: Size = Size::new(200, 80);

/// Vertical gap between the character and its bubble.
const DEFAULT_BUBBLE_GAP: i32 = 10;

/// Default lines the pet says.
fn default_messages() -> Vec<String> {
    vec![
        "Hello! 😊".to_string(),
        "Have a great day! 🌟".to_string(),
        "What can I do for you? 🤔".to_string(),
        "You've got this! 💪".to_string(),
    ]
}

/// Configuration for a pet.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the character portrait.
    pub image_path: PathBuf,

    /// Screen size to assume when the host cannot report one.
    pub fallback_screen: Size,

    /// Outer size of the character window.
    pub character_size: Size,

    /// Edge of the square the portrait is scaled to fit.
    pub visual_edge: u32,

    /// Interval between wander ticks.
    pub wander_interval: Duration,

    /// Interval between automatic speech bubbles.
    pub speech_interval: Duration,

    /// Whether the pet speaks on its own.
    pub auto_speech: bool,

    /// Interval between bubble follow ticks.
    pub follow_interval: Duration,

    /// How long a bubble lives.
    pub bubble_lifetime: Duration,

    /// Delay between a press and the automatic end of the drag.
    pub drag_release: Duration,

    /// Probability per wander tick of a random velocity change.
    pub perturb_chance: f64,

    /// Outer size of a speech bubble.
    pub bubble_size: Size,

    /// Gap between the character and a bubble above or below it.
    pub bubble_gap: i32,

    /// Candidate lines for speech bubbles.
    pub messages: Vec<String>,

    /// Seed for the random source. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_path: PathBuf::from(DEFAULT_IMAGE_PATH),
            fallback_screen: DEFAULT_SCREEN_SIZE,
            character_size: DEFAULT_CHARACTER_SIZE,
            visual_edge: DEFAULT_VISUAL_EDGE,
            wander_interval: Duration::from_millis(DEFAULT_WANDER_INTERVAL_MS),
            speech_interval: Duration::from_secs(DEFAULT_SPEECH_INTERVAL_SECS),
            auto_speech: true,
            follow_interval: Duration::from_millis(DEFAULT_FOLLOW_INTERVAL_MS),
            bubble_lifetime: Duration::from_millis(DEFAULT_BUBBLE_LIFETIME_MS),
            drag_release: Duration::from_millis(DEFAULT_DRAG_RELEASE_MS),
            perturb_chance: DEFAULT_PERTURB_CHANCE,
            bubble_size: DEFAULT_BUBBLE_SIZE,
            bubble_gap: DEFAULT_BUBBLE_GAP,
            messages: default_messages(),
            seed: None,
        }
    }
}

impl Config {
    /// Create a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the portrait path.
    pub fn image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = path.into();
        self
    }

    /// Set the screen size assumed when the host cannot report one.
    pub fn fallback_screen(mut self, size: Size) -> Self {
        self.fallback_screen = size;
        self
    }

    /// Set the character window size.
    pub fn character_size(mut self, size: Size) -> Self {
        self.character_size = size;
        self
    }

    /// Set the wander tick interval.
    pub fn wander_interval(mut self, interval: Duration) -> Self {
        self.wander_interval = interval;
        self
    }

    /// Set the automatic speech interval.
    pub fn speech_interval(mut self, interval: Duration) -> Self {
        self.speech_interval = interval;
        self
    }

    /// Enable or disable automatic speech.
    pub fn auto_speech(mut self, enabled: bool) -> Self {
        self.auto_speech = enabled;
        self
    }

    /// Set the bubble lifetime.
    pub fn bubble_lifetime(mut self, lifetime: Duration) -> Self {
        self.bubble_lifetime = lifetime;
        self
    }

    /// Set the drag release delay.
    pub fn drag_release(mut self, delay: Duration) -> Self {
        self.drag_release = delay;
        self
    }

    /// Set the per-tick perturbation probability.
    pub fn perturb_chance(mut self, chance: f64) -> Self {
        self.perturb_chance = chance;
        self
    }

    /// Set the bubble size.
    pub fn bubble_size(mut self, size: Size) -> Self {
        self.bubble_size = size;
        self
    }

    /// Replace the speech lines.
    pub fn messages(mut self, messages: Vec<String>) -> Self {
        self.messages = messages;
        self
    }

    /// Fix the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the configuration for values the pet cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let intervals = [
            ("wander_interval", self.wander_interval),
            ("speech_interval", self.speech_interval),
            ("follow_interval", self.follow_interval),
            ("bubble_lifetime", self.bubble_lifetime),
            ("drag_release", self.drag_release),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, d)| d.is_zero()) {
            return Err(Error::config_error(format!("{name} must be non-zero")));
        }

        if !self.character_size.is_positive() {
            return Err(Error::config_error(format!(
                "character_size must be positive, got {}",
                self.character_size
            )));
        }
        if !self.bubble_size.is_positive() {
            return Err(Error::config_error(format!(
                "bubble_size must be positive, got {}",
                self.bubble_size
            )));
        }
        if !self.fallback_screen.is_positive() {
            return Err(Error::config_error(format!(
                "fallback_screen must be positive, got {}",
                self.fallback_screen
            )));
        }
        if self.visual_edge == 0 {
            return Err(Error::config_error("visual_edge must be non-zero"));
        }
        if !(0.0..=1.0).contains(&self.perturb_chance) {
            return Err(Error::config_error(format!(
                "perturb_chance must be within [0, 1], got {}",
                self.perturb_chance
            )));
        }
        if self.messages.is_empty() {
            return Err(Error::config_error("at least one message is required"));
        }
        Ok(())
    }
}
