//! Scene management
//!
//! A [`Scene`] owns the live GameObjects and runs the per-frame pipeline:
//! spatial rebuild, scripts, object updates, then layered drawing under
//! the [`Camera`]. The [`SceneManager`] owns every Scene by name and
//! switches between them, optionally through a [`SceneTransition`].

mod camera;
mod game_scene;
mod scene_manager;
mod script;
mod transition;

#[cfg(test)]
mod tests;

pub use camera::Camera;
pub use game_scene::Scene;
pub use scene_manager::SceneManager;
pub use script::{SceneBehavior, Script, UiElement};
pub use transition::{NoEffect, SceneTransition, TransitionEffect};
