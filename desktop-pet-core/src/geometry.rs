//! Integer screen geometry shared by the wander controller and the bubbles.

use serde::Serialize;
use std::fmt;
use std::ops::{Add, Sub};

/// A point in screen coordinates (pixels, origin at the top-left corner).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl Add<Velocity> for Point {
    type Output = Point;

    fn add(self, rhs: Velocity) -> Point {
        Point::new(self.x.saturating_add(rhs.dx), self.y.saturating_add(rhs.dy))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height of a window, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are strictly positive.
    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Per-tick displacement of the character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Velocity {
    pub dx: i32,
    pub dy: i32,
}

impl Velocity {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Neither component is zero, so neither axis can stall.
    pub fn is_moving_on_both_axes(&self) -> bool {
        self.dx != 0 && self.dy != 0
    }
}

impl fmt::Display for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:+}, {:+})", self.dx, self.dy)
    }
}

/// The rectangle a window of a given size may occupy on a given screen.
///
/// The top-left corner of the window is kept within
/// `[0, screen.width - window.width] x [0, screen.height - window.height]`.
/// A window larger than the screen is pinned to `0` on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    screen: Size,
    window: Size,
}

impl Bounds {
    pub fn new(screen: Size, window: Size) -> Self {
        Self { screen, window }
    }

    pub fn screen(&self) -> Size {
        self.screen
    }

    pub fn window(&self) -> Size {
        self.window
    }

    /// Largest allowed x for the window's top-left corner.
    pub fn max_x(&self) -> i32 {
        (self.screen.width - self.window.width).max(0)
    }

    /// Largest allowed y for the window's top-left corner.
    pub fn max_y(&self) -> i32 {
        (self.screen.height - self.window.height).max(0)
    }

    pub fn contains(&self, point: Point) -> bool {
        (0..=self.max_x()).contains(&point.x) && (0..=self.max_y()).contains(&point.y)
    }

    pub fn clamp(&self, point: Point) -> Point {
        Point::new(point.x.clamp(0, self.max_x()), point.y.clamp(0, self.max_y()))
    }
}
