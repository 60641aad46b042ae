//! Math utilities and types
//!
//! Provides the 2D vector and rectangle types used by the world, the
//! region tree and the colliders.

use serde::{Deserialize, Serialize};

pub use nalgebra::Vector2;

/// 2D vector type
///
/// Value-style arithmetic goes through the operators (`a + b`, `a * s`),
/// in-place mutation through the assigning operators (`a += b`).
pub type Vec2 = Vector2<f32>;

/// Shorthand constructor for [`Vec2`]
#[inline]
pub fn vec2(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}

/// Zero-safe helpers on top of nalgebra's vector API
pub trait Vec2Ext {
    /// True when both components are exactly zero
    fn is_zero(&self) -> bool;

    /// Unit vector in the same direction, or the zero vector unchanged
    fn normalize_or_zero(&self) -> Vec2;

    /// Normalize in place; the zero vector is left untouched
    fn normalize_in_place(&mut self) -> &mut Self;

    /// Vector with the same direction and the given magnitude
    fn with_magnitude(&self, magnitude: f32) -> Vec2;

    /// Set the magnitude in place (zero vectors stay zero)
    fn set_magnitude(&mut self, magnitude: f32) -> &mut Self;
}

impl Vec2Ext for Vec2 {
    fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    fn normalize_or_zero(&self) -> Vec2 {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            *self
        } else {
            self / magnitude
        }
    }

    fn normalize_in_place(&mut self) -> &mut Self {
        let magnitude = self.magnitude();
        if magnitude != 0.0 {
            *self /= magnitude;
        }
        self
    }

    fn with_magnitude(&self, magnitude: f32) -> Vec2 {
        self.normalize_or_zero() * magnitude
    }

    fn set_magnitude(&mut self, magnitude: f32) -> &mut Self {
        self.normalize_in_place();
        *self *= magnitude;
        self
    }
}

/// Interpolate between two points, `t = 0` yields `b` and `t = 1` yields `a`
pub fn lerp_point(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    (a - b) * t + b
}

/// Axis-aligned rectangle described by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rect {
    /// Create a rectangle from its corner and size
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rectangle of the given size centered on a point
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(center.x - size.x / 2.0, center.y - size.y / 2.0, size.x, size.y)
    }

    /// Right edge (exclusive)
    pub fn max_x(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge (exclusive)
    pub fn max_y(&self) -> f32 {
        self.y + self.h
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        vec2(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Half-open containment: `x in [min_x, max_x)`, same for y
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.max_x() && point.y >= self.y && point.y < self.max_y()
    }

    /// True when the two half-open rectangles share at least one point
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    /// Same size, moved by `offset`
    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }

    /// Every coordinate multiplied by `factor`, so a rectangle centered on
    /// the origin stays centered
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.w * factor, self.h * factor)
    }
}
