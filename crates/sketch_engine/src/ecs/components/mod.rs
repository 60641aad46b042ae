//! Built-in components
//!
//! Transform is the one model every positioned object carries; the
//! colliders and Lifetime are controllers. Animator and AnimationTree
//! are viewers.

pub mod animation;
pub mod collision;
pub mod lifetime;
pub mod transform;

pub use animation::{
    Animation, AnimationSelector, AnimationTree, Animator, DirectionalAnimation, NamedAnimations, DIRECTION_PROPERTY,
};
pub use collision::{
    update_collider, CircleCollider, Collider, ColliderBody, ColliderEvent, ContactListener, RectCollider,
};
pub use lifetime::Lifetime;
pub use transform::{Transform, DEFAULT_SCALE};
