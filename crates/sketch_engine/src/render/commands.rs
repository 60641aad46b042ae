//! Drawing command pattern for the canvas API
//!
//! # Design Philosophy
//!
//! The canvas should be a passive library that:
//! - Accepts world-space shapes already placed by the caller
//! - Only handles drawing (no lifecycle, input, or timing)
//!
//! Viewers describe what they want drawn as [`DrawCommand`]s; the host's
//! canvas decides how to rasterize them.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec2;

/// RGBA color with components in `0..=255`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Color {
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red
    pub const RED: Self = Self::rgb(220, 40, 40);
    /// Opaque green
    pub const GREEN: Self = Self::rgb(40, 200, 80);

    /// Opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with explicit alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// A single shape for the canvas to draw
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Filled circle
    Circle {
        /// Center
        center: Vec2,
        /// Radius
        radius: f32,
        /// Fill color
        color: Color,
    },
    /// Filled axis-aligned rectangle, centered on `center`
    Rect {
        /// Center
        center: Vec2,
        /// Width and height
        size: Vec2,
        /// Rotation in radians around the center
        rotation: f32,
        /// Fill color
        color: Color,
    },
    /// Line segment
    Line {
        /// Start point
        from: Vec2,
        /// End point
        to: Vec2,
        /// Stroke width
        width: f32,
        /// Stroke color
        color: Color,
    },
    /// Text anchored at its top-left corner
    Text {
        /// Anchor
        position: Vec2,
        /// Content
        text: String,
        /// Font size in pixels
        size: f32,
        /// Fill color
        color: Color,
    },
    /// Registered image asset, centered on `center`
    Image {
        /// Name the image was registered under
        asset: String,
        /// Center
        center: Vec2,
        /// Width and height
        size: Vec2,
        /// Rotation in radians around the center
        rotation: f32,
    },
}

impl DrawCommand {
    /// Filled circle
    pub fn circle(center: Vec2, radius: f32, color: Color) -> Self {
        Self::Circle { center, radius, color }
    }

    /// Filled rectangle
    pub fn rect(center: Vec2, size: Vec2, color: Color) -> Self {
        Self::Rect {
            center,
            size,
            rotation: 0.0,
            color,
        }
    }

    /// Line segment
    pub fn line(from: Vec2, to: Vec2, width: f32, color: Color) -> Self {
        Self::Line { from, to, width, color }
    }

    /// Text
    pub fn text(position: Vec2, text: impl Into<String>, size: f32, color: Color) -> Self {
        Self::Text {
            position,
            text: text.into(),
            size,
            color,
        }
    }

    /// Image from the asset registry
    pub fn image(asset: impl Into<String>, center: Vec2, size: Vec2) -> Self {
        Self::Image {
            asset: asset.into(),
            center,
            size,
            rotation: 0.0,
        }
    }
}
