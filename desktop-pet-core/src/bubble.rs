//! Speech bubbles: short-lived overlays that follow the character around.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::geometry::{Point, Size};
use crate::scheduler::TimerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BubbleId(pub u64);

impl fmt::Display for BubbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bubble#{}", self.0)
    }
}

/// Where a bubble goes relative to the character.
///
/// Horizontally centered on the character and kept on screen. Vertically
/// `gap` pixels above the character, or `gap` pixels below it when the
/// bubble's top edge would be at or above the top of the screen.
pub fn follow_position(
    character: Point,
    character_size: Size,
    bubble_size: Size,
    screen: Size,
    gap: i32,
) -> Point {
    let centered = character.x + character_size.width / 2 - bubble_size.width / 2;
    let max_x = (screen.width - bubble_size.width).max(0);
    let x = centered.clamp(0, max_x);

    let above = character.y - bubble_size.height - gap;
    let y = if above <= 0 {
        character.y + character_size.height + gap
    } else {
        above
    };

    Point::new(x, y)
}

/// A live speech bubble.
#[derive(Debug, Clone)]
pub struct Bubble {
    pub id: BubbleId,
    pub message: String,
    pub position: Point,
    pub size: Size,
    pub created_at: Duration,
    pub follow_timer: TimerId,
    pub expiry_timer: TimerId,
}

impl Bubble {
    pub fn age(&self, now: Duration) -> Duration {
        now.saturating_sub(self.created_at)
    }
}

/// The pet's live bubbles, in creation order.
#[derive(Debug, Default)]
pub struct BubbleSet {
    live: BTreeMap<BubbleId, Bubble>,
    next_id: u64,
}

impl BubbleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the id for the next bubble.
    pub fn next_id(&mut self) -> BubbleId {
        self.next_id += 1;
        BubbleId(self.next_id)
    }

    pub fn insert(&mut self, bubble: Bubble) {
        self.live.insert(bubble.id, bubble);
    }

    pub fn get(&self, id: BubbleId) -> Option<&Bubble> {
        self.live.get(&id)
    }

    pub fn get_mut(&mut self, id: BubbleId) -> Option<&mut Bubble> {
        self.live.get_mut(&id)
    }

    pub fn remove(&mut self, id: BubbleId) -> Option<Bubble> {
        self.live.remove(&id)
    }

    /// Remove every bubble, oldest first.
    pub fn drain(&mut self) -> Vec<Bubble> {
        std::mem::take(&mut self.live).into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bubble> {
        self.live.values()
    }
}
