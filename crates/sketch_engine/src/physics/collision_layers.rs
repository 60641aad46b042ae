//! Collision layer system for filtering collision detection
//!
//! Every collider sits on one or more layers and carries a mask of the
//! layers it wants to hear about. Two colliders only interact when each
//! one's layer is present in the other's mask.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Collision layer bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CollisionLayers: u32 {
        /// Player character
        const PLAYER = 1 << 0;
        /// Enemy characters
        const ENEMY = 1 << 1;
        /// Projectiles (bullets, missiles, etc.)
        const PROJECTILE = 1 << 2;
        /// Static environment geometry
        const ENVIRONMENT = 1 << 3;
        /// Trigger volumes (no physical response)
        const TRIGGER = 1 << 4;
        /// Pickups and collectibles
        const PICKUP = 1 << 5;
        /// Towers and other placed structures
        const STRUCTURE = 1 << 6;
        /// User-defined
        const CUSTOM_0 = 1 << 8;
        /// User-defined
        const CUSTOM_1 = 1 << 9;
        /// User-defined
        const CUSTOM_2 = 1 << 10;
        /// User-defined
        const CUSTOM_3 = 1 << 11;
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::all()
    }
}

impl CollisionLayers {
    /// Check if two colliders should interact based on their layers and masks
    ///
    /// A's layer must be in B's mask and B's layer must be in A's mask.
    pub fn should_collide(layer_a: Self, mask_a: Self, layer_b: Self, mask_b: Self) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_collide_mutual() {
        let player_mask = CollisionLayers::ENEMY | CollisionLayers::ENVIRONMENT;
        let enemy_mask = CollisionLayers::PLAYER | CollisionLayers::PROJECTILE;
        assert!(CollisionLayers::should_collide(
            CollisionLayers::PLAYER,
            player_mask,
            CollisionLayers::ENEMY,
            enemy_mask,
        ));
    }

    #[test]
    fn test_one_sided_mask_is_rejected() {
        // The projectile listens for enemies but enemies ignore projectiles
        assert!(!CollisionLayers::should_collide(
            CollisionLayers::PROJECTILE,
            CollisionLayers::ENEMY,
            CollisionLayers::ENEMY,
            CollisionLayers::PLAYER,
        ));
    }

    #[test]
    fn test_default_collides_with_everything() {
        let all = CollisionLayers::default();
        assert!(CollisionLayers::should_collide(all, all, CollisionLayers::PICKUP, all));
    }
}
