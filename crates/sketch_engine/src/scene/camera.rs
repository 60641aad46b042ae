//! Scene camera
//!
//! The camera either sits at a fixed focus point or follows a GameObject.
//! The Scene centers the focus point in the viewport.

use crate::ecs::components::Transform;
use crate::ecs::GameObject;
use crate::foundation::collections::{ObjectId, SlotMap};
use crate::foundation::math::Vec2;

/// 2D camera: a focus point, optionally tracking an object
#[derive(Debug, Clone, Default)]
pub struct Camera {
    position: Vec2,
    target: Option<ObjectId>,
}

impl Camera {
    /// Camera focused on `position`
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            target: None,
        }
    }

    /// Current focus point in world space
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Focus on a fixed point and stop following
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.target = None;
    }

    /// Follow an object; the focus point tracks its Transform each frame
    pub fn follow(&mut self, target: ObjectId) {
        self.target = Some(target);
    }

    /// Stop following, keeping the last focus point
    pub fn stop_following(&mut self) {
        self.target = None;
    }

    /// The followed object, if any
    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    /// Move the focus point onto the followed object
    ///
    /// A target that is gone or has no Transform leaves the focus where it
    /// was.
    pub fn sync(&mut self, objects: &SlotMap<ObjectId, GameObject>) {
        if let Some(position) = self
            .target
            .and_then(|target| objects.get(target))
            .and_then(GameObject::position)
        {
            self.position = position;
        }
    }

    /// Offset that brings the focus point to the canvas origin
    pub fn translation(&self) -> Vec2 {
        -self.position
    }

    /// True if `transform` may show up in a viewport of size `viewport`
    ///
    /// The margin is the object's own scale, so objects straddling the edge
    /// still draw.
    pub fn is_visible(&self, transform: &Transform, viewport: Vec2) -> bool {
        let distance = self.position - transform.position;
        distance.x.abs() <= viewport.x / 2.0 + transform.scale.x
            && distance.y.abs() <= viewport.y / 2.0 + transform.scale.y
    }
}
