//! The display surface the pet draws through.
//!
//! Hosts implement [`Surface`] on top of whatever windowing toolkit they use.
//! The pet only ever asks for these operations, always from the thread that
//! drives it.

use tracing::{debug, info, trace};

use crate::appearance::CharacterVisual;
use crate::bubble::BubbleId;
use crate::geometry::{Point, Size};

pub trait Surface {
    /// Move the character window's top-left corner to `position`.
    fn move_character(&mut self, position: Point);

    /// Put the character window above every other window.
    fn raise_character(&mut self);

    /// Redraw the character.
    fn render_character(&mut self, visual: CharacterVisual);

    fn set_character_visible(&mut self, visible: bool);

    /// Open a bubble overlay showing `message`, word-wrapped inside a
    /// rounded rectangle of `size`.
    fn open_bubble(&mut self, id: BubbleId, message: &str, position: Point, size: Size);

    fn move_bubble(&mut self, id: BubbleId, position: Point);

    fn close_bubble(&mut self, id: BubbleId);

    /// The pet is done; the host should exit.
    fn quit(&mut self);
}

/// A surface with no window that reports what it would draw through tracing.
#[derive(Debug)]
pub struct LogSurface {
    position: Point,
    visible: bool,
}

impl LogSurface {
    pub fn new() -> Self {
        Self {
            position: Point::ORIGIN,
            visible: true,
        }
    }

    /// Last position the character was moved to.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Default for LogSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for LogSurface {
    fn move_character(&mut self, position: Point) {
        trace!(%position, "move character");
        self.position = position;
    }

    fn raise_character(&mut self) {}

    fn render_character(&mut self, visual: CharacterVisual) {
        debug!(?visual, "render character");
    }

    fn set_character_visible(&mut self, visible: bool) {
        debug!(visible, "character visibility");
        self.visible = visible;
    }

    fn open_bubble(&mut self, id: BubbleId, message: &str, position: Point, size: Size) {
        info!(%id, %position, %size, "💬 {message}");
    }

    fn move_bubble(&mut self, id: BubbleId, position: Point) {
        trace!(%id, %position, "move bubble");
    }

    fn close_bubble(&mut self, id: BubbleId) {
        debug!(%id, "close bubble");
    }

    fn quit(&mut self) {
        debug!("surface asked to quit");
    }
}
