//! Entity-component runtime
//!
//! GameObjects own their components directly; the Scene owns the
//! GameObjects. Controllers reach the rest of the world through the
//! [`UpdateContext`] handed to them each frame.

pub mod component;
pub mod components;
pub mod context;
pub mod game_object;
pub mod prefab;

pub use component::{AnyCollider, AsAny, Component, ComponentFamily, Role};
pub use context::{SceneCallback, SceneCommands, UpdateContext, WorldView};
pub use game_object::{create_game_object, GameObject};
pub use prefab::GamePrefab;
