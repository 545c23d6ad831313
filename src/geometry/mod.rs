use std::f64::consts::TAU;

pub mod annulus;
pub mod hit;
pub mod partition;

pub use annulus::{ContentLayout, ContentPlacement, PathCommand, SectorPath, WedgeSpec};
pub use hit::{PointerTarget, contains, normalize_angle, route};
pub use partition::{AngleSpan, partition};

pub const FULL_TURN: f64 = TAU;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from `self` along `angle` (0 = east, increasing clockwise on screen).
    pub fn polar_offset(self, radius: f64, angle: f64) -> Self {
        Self::new(self.x + radius * angle.cos(), self.y + radius * angle.sin())
    }

    pub fn relative_to(self, origin: Point) -> Self {
        Self::new(self.x - origin.x, self.y - origin.y)
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_center(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn corners(&self) -> [Point; 4] {
        let (x, y) = (self.origin.x, self.origin.y);
        let (w, h) = (self.size.width, self.size.height);
        [
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ]
    }

    /// Radius of the largest circle centered in this rect. Zero for empty or inverted rects.
    pub fn inscribed_radius(&self) -> f64 {
        let r = self.size.width.min(self.size.height) / 2.0;
        if r.is_finite() { r.max(0.0) } else { 0.0 }
    }
}
