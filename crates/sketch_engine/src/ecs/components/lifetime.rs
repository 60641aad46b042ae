//! Lifetime Component
//!
//! Destroys its object once a duration of scene time has passed. Useful for
//! projectiles and short-lived effects.

use crate::ecs::component::{Component, Role};
use crate::ecs::context::UpdateContext;
use crate::ecs::GameObject;

/// Controller that destroys its object after `duration` seconds
#[derive(Debug, Clone, Copy)]
pub struct Lifetime {
    /// How long the object should live (in seconds); zero or less lives forever
    pub duration: f32,
    /// Time lived so far
    pub age: f32,
}

impl Lifetime {
    /// Create a new lifetime component
    pub fn new(duration: f32) -> Self {
        Self { duration, age: 0.0 }
    }

    /// Check if the lifetime has expired
    pub fn is_expired(&self) -> bool {
        self.duration > 0.0 && self.age >= self.duration
    }

    /// Get remaining lifetime in seconds
    pub fn remaining(&self) -> f32 {
        if self.duration <= 0.0 {
            f32::INFINITY
        } else {
            (self.duration - self.age).max(0.0)
        }
    }

    /// Advance by `delta` seconds, returns true the moment it expires
    pub fn advance(&mut self, delta: f32) -> bool {
        let was_expired = self.is_expired();
        self.age += delta;
        !was_expired && self.is_expired()
    }
}

impl Component for Lifetime {
    fn role(&self) -> Role {
        Role::Controller
    }

    fn restart(&mut self) {
        self.age = 0.0;
    }

    fn update(&mut self, object: &mut GameObject, ctx: &mut UpdateContext<'_>) {
        if self.advance(ctx.delta_time()) {
            object.destroy();
        }
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(Self::new(self.duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_not_expired() {
        let mut lifetime = Lifetime::new(5.0);
        assert!(!lifetime.advance(2.0));
        assert!(!lifetime.is_expired());
    }

    #[test]
    fn test_lifetime_expires_once() {
        let mut lifetime = Lifetime::new(5.0);
        assert!(lifetime.advance(6.0));
        assert!(!lifetime.advance(1.0));
        assert!(lifetime.is_expired());
    }

    #[test]
    fn test_infinite_lifetime() {
        let mut lifetime = Lifetime::new(0.0);
        assert!(!lifetime.advance(1000.0));
        assert_eq!(lifetime.remaining(), f32::INFINITY);
    }

    #[test]
    fn test_remaining_time() {
        let mut lifetime = Lifetime::new(10.0);
        lifetime.advance(3.0);
        assert_eq!(lifetime.remaining(), 7.0);
        lifetime.advance(9.0);
        assert_eq!(lifetime.remaining(), 0.0);
    }
}
