//! Transform component
//!
//! Pure data component: where an object is, how big it is and how it is
//! rotated. The Scene reads it to build the spatial index and to cull
//! objects outside the camera.

use serde::{Deserialize, Serialize};

use crate::ecs::component::Component;
use crate::foundation::math::{vec2, Vec2};

/// Default edge length of a fresh transform
pub const DEFAULT_SCALE: f32 = 50.0;

/// Position, scale and rotation in world space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World space position
    pub position: Vec2,

    /// Size of the object, also used as the culling margin
    pub scale: Vec2,

    /// Rotation in radians
    pub rotation: f32,

    /// Values restored by `restart`
    #[serde(skip)]
    initial: Option<(Vec2, Vec2, f32)>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            scale: vec2(DEFAULT_SCALE, DEFAULT_SCALE),
            rotation: 0.0,
            initial: None,
        }
    }
}

impl Transform {
    /// Transform at `position` with the default scale
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Set the scale (builder)
    #[must_use]
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Set the rotation (builder)
    #[must_use]
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Move by `offset`
    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Unit vector the rotation points along
    pub fn forward(&self) -> Vec2 {
        vec2(self.rotation.cos(), self.rotation.sin())
    }

    /// Convert a local-space point to world space (translation only)
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.position + local
    }

    /// Convert a world-space point to local space (translation only)
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        world - self.position
    }
}

impl Component for Transform {
    fn start(&mut self, _object: &mut crate::ecs::GameObject) {
        self.initial = Some((self.position, self.scale, self.rotation));
    }

    fn restart(&mut self) {
        if let Some((position, scale, rotation)) = self.initial {
            self.position = position;
            self.scale = scale;
            self.rotation = rotation;
        }
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(Self {
            initial: None,
            ..self.clone()
        })
    }
}
