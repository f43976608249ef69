//! Seedable random source for the pet.
//!
//! All randomness (start position, velocity redraws, the perturbation roll
//! and message choice) flows through [`PetRng`], so a fixed seed replays the
//! same walk.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::geometry::{Bounds, Point, Velocity};

/// Speeds a velocity redraw picks from. Zero is absent so no axis stalls.
pub const WANDER_SPEEDS: [i32; 8] = [-4, -3, -2, -1, 1, 2, 3, 4];

/// Speeds the character starts out with.
pub const START_SPEEDS: [i32; 6] = [-3, -2, -1, 1, 2, 3];

/// Draw both velocity components independently from [`WANDER_SPEEDS`].
pub fn pick_velocity<R: Rng + ?Sized>(rng: &mut R) -> Velocity {
    pick_from(rng, &WANDER_SPEEDS)
}

/// Draw both velocity components independently from [`START_SPEEDS`].
pub fn pick_start_velocity<R: Rng + ?Sized>(rng: &mut R) -> Velocity {
    pick_from(rng, &START_SPEEDS)
}

fn pick_from<R: Rng + ?Sized>(rng: &mut R, speeds: &[i32]) -> Velocity {
    let dx = speeds.choose(&mut *rng).copied().unwrap_or(1);
    let dy = speeds.choose(&mut *rng).copied().unwrap_or(1);
    Velocity::new(dx, dy)
}

/// Deterministic random source owned by the pet context.
#[derive(Debug, Clone)]
pub struct PetRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl PetRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed from OS entropy. The chosen seed is kept so a run can be replayed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn velocity(&mut self) -> Velocity {
        pick_velocity(&mut self.rng)
    }

    pub fn start_velocity(&mut self) -> Velocity {
        pick_start_velocity(&mut self.rng)
    }

    /// Returns true with the given probability. Values outside `[0, 1]`
    /// behave as never/always.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen::<f64>() < probability
    }

    /// Uniform pick from `messages`, `None` when the list is empty.
    pub fn message<'a>(&mut self, messages: &'a [String]) -> Option<&'a str> {
        messages.choose(&mut self.rng).map(String::as_str)
    }

    /// Uniform position anywhere inside `bounds`.
    pub fn position_within(&mut self, bounds: &Bounds) -> Point {
        Point::new(
            self.rng.gen_range(0..=bounds.max_x()),
            self.rng.gen_range(0..=bounds.max_y()),
        )
    }
}
