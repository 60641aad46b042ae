//! Physics module for collision filtering and bookkeeping
//!
//! Shape tests live on the collider components themselves; this module
//! holds what is shared between them: layer filtering, collider
//! identities and the contact inbox used for symmetric recording.

pub mod collision_layers;
pub mod contacts;

pub use collision_layers::CollisionLayers;
pub use contacts::{ColliderId, Contact, ContactInbox};
