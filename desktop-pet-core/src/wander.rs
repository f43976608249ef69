//! Wander controller: the character's position, velocity and motion state.
//!
//! The character walks in straight lines, bounces off the screen edges,
//! occasionally picks a new random velocity, and can be picked up and
//! dragged with the mouse. Motion is an explicit state machine:
//!
//! ```text
//!  Wandering --pause--> Paused
//!  Paused --resume--> Wandering
//!  Wandering | Paused --press--> Dragging
//!  Dragging --release timer--> Wandering | Paused (whichever it was before)
//! ```

use serde::Serialize;
use std::fmt;

use crate::geometry::{Bounds, Point, Velocity};
use crate::rng::PetRng;

/// Which way the character's visual currently looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Right,
    Left,
}

impl Facing {
    /// Left exactly when moving left.
    pub fn from_speed(dx: i32) -> Self {
        if dx < 0 {
            Facing::Left
        } else {
            Facing::Right
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facing::Right => write!(f, "right"),
            Facing::Left => write!(f, "left"),
        }
    }
}

/// Identifies one press-and-hold. A release timer only ends the drag it was
/// armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DragToken(pub u64);

/// An in-progress drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drag {
    /// Pointer position relative to the window origin at press time.
    pub offset: Point,
    pub token: DragToken,
    /// Whether wandering resumes once the drag ends.
    pub auto_move: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Wandering,
    Dragging(Drag),
    Paused,
}

impl Motion {
    pub fn kind(&self) -> MotionKind {
        match self {
            Motion::Wandering => MotionKind::Wandering,
            Motion::Dragging(_) => MotionKind::Dragging,
            Motion::Paused => MotionKind::Paused,
        }
    }
}

/// [`Motion`] without the drag payload, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionKind {
    Wandering,
    Dragging,
    Paused,
}

impl fmt::Display for MotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionKind::Wandering => write!(f, "wandering"),
            MotionKind::Dragging => write!(f, "dragging"),
            MotionKind::Paused => write!(f, "paused"),
        }
    }
}

/// What a single wander tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The character is being dragged; nothing moved.
    Held,
    /// Auto-move is off; nothing moved.
    Paused,
    Moved(Step),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub position: Point,
    pub bounced_x: bool,
    pub bounced_y: bool,
    /// Set when the random perturbation redrew the velocity.
    pub perturbed: Option<Velocity>,
    /// Set when the facing changed during this tick.
    pub turned: Option<Facing>,
}

/// Result of a drag ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    pub velocity: Velocity,
    pub motion: MotionKind,
    pub turned: Option<Facing>,
}

/// Bounce one axis: reflect a candidate that left `[0, max]` back across the
/// wall it crossed and clamp it. Returns the new coordinate and whether the
/// axis bounced.
fn bounce_axis(candidate: i32, speed: &mut i32, max: i32) -> (i32, bool) {
    if candidate < 0 {
        *speed = -*speed;
        ((-candidate).clamp(0, max), true)
    } else if candidate > max {
        *speed = -*speed;
        ((2 * max - candidate).clamp(0, max), true)
    } else {
        (candidate, false)
    }
}

/// Position, velocity, facing and motion state of the character.
#[derive(Debug, Clone)]
pub struct Wanderer {
    position: Point,
    velocity: Velocity,
    facing: Facing,
    motion: Motion,
    bounds: Bounds,
    perturb_chance: f64,
    drags: u64,
}

impl Wanderer {
    /// Create a wandering character. The position is clamped into `bounds`.
    pub fn new(position: Point, velocity: Velocity, bounds: Bounds, perturb_chance: f64) -> Self {
        Self {
            position: bounds.clamp(position),
            velocity,
            facing: Facing::from_speed(velocity.dx),
            motion: Motion::Wandering,
            bounds,
            perturb_chance,
            drags: 0,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.motion, Motion::Dragging(_))
    }

    /// Whether wandering is on, or will be once the current drag ends.
    pub fn auto_move_enabled(&self) -> bool {
        match self.motion {
            Motion::Wandering => true,
            Motion::Paused => false,
            Motion::Dragging(drag) => drag.auto_move,
        }
    }

    /// Advance one wander step.
    pub fn tick(&mut self, rng: &mut PetRng) -> TickOutcome {
        match self.motion {
            Motion::Dragging(_) => return TickOutcome::Held,
            Motion::Paused => return TickOutcome::Paused,
            Motion::Wandering => {}
        }

        let candidate = self.position + self.velocity;
        let (x, bounced_x) = bounce_axis(candidate.x, &mut self.velocity.dx, self.bounds.max_x());
        let (y, bounced_y) = bounce_axis(candidate.y, &mut self.velocity.dy, self.bounds.max_y());

        let perturbed = if rng.chance(self.perturb_chance) {
            self.velocity = rng.velocity();
            Some(self.velocity)
        } else {
            None
        };

        let turned = self.refresh_facing();
        self.position = Point::new(x, y);

        TickOutcome::Moved(Step {
            position: self.position,
            bounced_x,
            bounced_y,
            perturbed,
            turned,
        })
    }

    /// Pick the character up at `pointer`. Any earlier drag is superseded.
    pub fn start_drag(&mut self, pointer: Point) -> DragToken {
        self.drags += 1;
        let token = DragToken(self.drags);
        let drag = Drag {
            offset: pointer - self.position,
            token,
            auto_move: self.auto_move_enabled(),
        };
        self.motion = Motion::Dragging(drag);
        token
    }

    /// Follow the pointer while dragging. Returns the new position, or `None`
    /// when no drag is in progress.
    pub fn drag_to(&mut self, pointer: Point) -> Option<Point> {
        let Motion::Dragging(drag) = self.motion else {
            return None;
        };
        self.position = self.bounds.clamp(pointer - drag.offset);
        Some(self.position)
    }

    /// End the drag identified by `token` and pick a fresh velocity.
    ///
    /// Returns `None` when `token` no longer names the current drag.
    pub fn end_drag(&mut self, token: DragToken, rng: &mut PetRng) -> Option<Landing> {
        let Motion::Dragging(drag) = self.motion else {
            return None;
        };
        if drag.token != token {
            return None;
        }

        self.motion = if drag.auto_move {
            Motion::Wandering
        } else {
            Motion::Paused
        };
        self.velocity = rng.velocity();
        let turned = self.refresh_facing();

        Some(Landing {
            velocity: self.velocity,
            motion: self.motion.kind(),
            turned,
        })
    }

    /// Turn wandering on or off. During a drag this decides what the drag
    /// settles into. Returns true when anything changed.
    pub fn set_auto_move(&mut self, enabled: bool) -> bool {
        match &mut self.motion {
            Motion::Dragging(drag) => {
                let changed = drag.auto_move != enabled;
                drag.auto_move = enabled;
                changed
            }
            motion => {
                let next = if enabled {
                    Motion::Wandering
                } else {
                    Motion::Paused
                };
                let changed = *motion != next;
                *motion = next;
                changed
            }
        }
    }

    fn refresh_facing(&mut self) -> Option<Facing> {
        let facing = Facing::from_speed(self.velocity.dx);
        if facing == self.facing {
            return None;
        }
        self.facing = facing;
        Some(facing)
    }

    #[cfg(test)]
    pub(crate) fn force_velocity(&mut self, velocity: Velocity) {
        self.velocity = velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn bounds() -> Bounds {
        Bounds::new(Size::new(1000, 800), Size::new(150, 150))
    }

    fn steady(position: Point, velocity: Velocity) -> Wanderer {
        Wanderer::new(position, velocity, bounds(), 0.0)
    }

    #[test]
    fn test_corner_bounce_scenario() {
        let mut rng = PetRng::new(1);
        let mut pet = steady(Point::ORIGIN, Velocity::new(-2, -3));
        assert_eq!(pet.facing(), Facing::Left);

        let outcome = pet.tick(&mut rng);
        let TickOutcome::Moved(step) = outcome else {
            panic!("expected a move, got {outcome:?}");
        };
        assert!(step.bounced_x && step.bounced_y);
        assert_eq!(step.position, Point::new(2, 3));
        assert_eq!(pet.velocity(), Velocity::new(2, 3));
        assert_eq!(pet.facing(), Facing::Right);
        assert_eq!(step.turned, Some(Facing::Right));
    }

    #[test]
    fn test_bounce_off_far_walls() {
        let mut rng = PetRng::new(1);
        let mut pet = steady(Point::new(849, 649), Velocity::new(4, 3));
        let TickOutcome::Moved(step) = pet.tick(&mut rng) else {
            panic!("expected a move");
        };
        // max is (850, 650); 853 reflects to 847 and 652 to 648
        assert_eq!(step.position, Point::new(847, 648));
        assert_eq!(pet.velocity(), Velocity::new(-4, -3));
    }

    #[test]
    fn test_exact_wall_contact_does_not_bounce() {
        let mut rng = PetRng::new(1);
        let mut pet = steady(Point::new(2, 100), Velocity::new(-2, 1));
        let TickOutcome::Moved(step) = pet.tick(&mut rng) else {
            panic!("expected a move");
        };
        assert_eq!(step.position, Point::new(0, 101));
        assert!(!step.bounced_x);
        assert_eq!(pet.velocity().dx, -2);

        let TickOutcome::Moved(step) = pet.tick(&mut rng) else {
            panic!("expected a move");
        };
        assert!(step.bounced_x);
        assert_eq!(step.position.x, 2);
    }

    #[test]
    fn test_bounce_flips_sign_once_per_contact() {
        let mut rng = PetRng::new(2);
        let mut pet = steady(Point::new(10, 300), Velocity::new(-4, 1));
        let mut flips = 0;
        let mut previous = pet.velocity().dx;
        for _ in 0..10 {
            let TickOutcome::Moved(step) = pet.tick(&mut rng) else {
                panic!("expected a move");
            };
            let dx = pet.velocity().dx;
            if dx.signum() != previous.signum() {
                flips += 1;
                assert!(step.bounced_x, "sign changed without a bounce");
            }
            previous = dx;
        }
        assert_eq!(flips, 1);
    }

    #[test]
    fn test_position_stays_in_bounds() {
        let mut rng = PetRng::new(77);
        let mut pet = Wanderer::new(Point::new(400, 300), Velocity::new(4, -4), bounds(), 0.5);
        for _ in 0..20_000 {
            pet.tick(&mut rng);
            assert!(pet.bounds().contains(pet.position()), "{}", pet.position());
            assert!(pet.velocity().is_moving_on_both_axes());
        }
    }

    #[test]
    fn test_tiny_screen_pins_position() {
        let mut rng = PetRng::new(4);
        let bounds = Bounds::new(Size::new(100, 100), Size::new(150, 150));
        let mut pet = Wanderer::new(Point::ORIGIN, Velocity::new(3, 3), bounds, 0.0);
        for _ in 0..10 {
            pet.tick(&mut rng);
            assert_eq!(pet.position(), Point::ORIGIN);
        }
    }

    #[test]
    fn test_perturbation_redraws_velocity() {
        let mut rng = PetRng::new(6);
        let mut pet = Wanderer::new(Point::new(400, 300), Velocity::new(1, 1), bounds(), 1.0);
        let TickOutcome::Moved(step) = pet.tick(&mut rng) else {
            panic!("expected a move");
        };
        let redrawn = step.perturbed.expect("perturbation should always fire");
        assert_eq!(redrawn, pet.velocity());
        assert!(redrawn.is_moving_on_both_axes());
        // the committed position uses the pre-perturbation velocity
        assert_eq!(step.position, Point::new(401, 301));
    }

    #[test]
    fn test_facing_follows_sign_changes() {
        let mut rng = PetRng::new(3);
        let mut pet = steady(Point::new(400, 300), Velocity::new(2, 1));
        assert_eq!(pet.facing(), Facing::Right);

        let mut turns = Vec::new();
        for dx in [2, 3, -1, -4, -2, 1, 4, -3] {
            pet.force_velocity(Velocity::new(dx, 1));
            if let TickOutcome::Moved(step) = pet.tick(&mut rng) {
                turns.push(step.turned);
            }
        }
        assert_eq!(
            turns,
            vec![
                None,
                None,
                Some(Facing::Left),
                None,
                None,
                Some(Facing::Right),
                None,
                Some(Facing::Left),
            ]
        );
    }

    #[test]
    fn test_dragging_holds_position() {
        let mut rng = PetRng::new(1);
        let mut pet = steady(Point::new(100, 100), Velocity::new(3, 3));
        pet.start_drag(Point::new(130, 140));
        for _ in 0..5 {
            assert_eq!(pet.tick(&mut rng), TickOutcome::Held);
        }
        assert_eq!(pet.position(), Point::new(100, 100));
    }

    #[test]
    fn test_drag_keeps_pointer_offset_and_clamps() {
        let mut pet = steady(Point::new(100, 100), Velocity::new(3, 3));
        pet.start_drag(Point::new(130, 140));
        assert_eq!(pet.drag_to(Point::new(230, 240)), Some(Point::new(200, 200)));
        assert_eq!(pet.velocity(), Velocity::new(3, 3));
        assert_eq!(pet.drag_to(Point::new(5, 5)), Some(Point::ORIGIN));
        assert_eq!(pet.drag_to(Point::new(5000, 5000)), Some(Point::new(850, 650)));
    }

    #[test]
    fn test_drag_to_without_drag_is_ignored() {
        let mut pet = steady(Point::new(100, 100), Velocity::new(3, 3));
        assert_eq!(pet.drag_to(Point::new(300, 300)), None);
        assert_eq!(pet.position(), Point::new(100, 100));
    }

    #[test]
    fn test_end_drag_resumes_previous_mode() {
        let mut rng = PetRng::new(12);
        let mut pet = steady(Point::new(100, 100), Velocity::new(3, 3));
        let token = pet.start_drag(Point::new(110, 110));
        let landing = pet.end_drag(token, &mut rng).expect("drag should end");
        assert_eq!(landing.motion, MotionKind::Wandering);
        assert!(landing.velocity.is_moving_on_both_axes());
        assert_eq!(pet.facing(), Facing::from_speed(pet.velocity().dx));

        pet.set_auto_move(false);
        let token = pet.start_drag(Point::new(110, 110));
        let landing = pet.end_drag(token, &mut rng).expect("drag should end");
        assert_eq!(landing.motion, MotionKind::Paused);
        assert_eq!(pet.motion(), Motion::Paused);
    }

    #[test]
    fn test_pause_during_drag_settles_paused() {
        let mut rng = PetRng::new(12);
        let mut pet = steady(Point::new(100, 100), Velocity::new(3, 3));
        let token = pet.start_drag(Point::new(110, 110));
        assert!(pet.set_auto_move(false));
        assert!(pet.is_dragging());
        assert!(!pet.auto_move_enabled());
        pet.end_drag(token, &mut rng);
        assert_eq!(pet.motion(), Motion::Paused);
    }

    #[test]
    fn test_stale_drag_token_is_ignored() {
        let mut rng = PetRng::new(12);
        let mut pet = steady(Point::new(100, 100), Velocity::new(3, 3));
        let first = pet.start_drag(Point::new(110, 110));
        let second = pet.start_drag(Point::new(120, 120));
        assert_ne!(first, second);
        assert_eq!(pet.end_drag(first, &mut rng), None);
        assert!(pet.is_dragging());
        assert!(pet.end_drag(second, &mut rng).is_some());
        assert_eq!(pet.end_drag(second, &mut rng), None);
    }

    #[test]
    fn test_paused_tick_is_noop() {
        let mut rng = PetRng::new(1);
        let mut pet = steady(Point::new(100, 100), Velocity::new(3, 3));
        assert!(pet.set_auto_move(false));
        assert!(!pet.set_auto_move(false));
        assert_eq!(pet.tick(&mut rng), TickOutcome::Paused);
        assert_eq!(pet.position(), Point::new(100, 100));
        assert!(pet.set_auto_move(true));
        assert!(matches!(pet.tick(&mut rng), TickOutcome::Moved(_)));
    }
}
