//! Scene scripts and UI elements
//!
//! Scripts are scene-level behavior with full access to their Scene.
//! They run every tick, paused or not. UI elements draw in screen space
//! after the world.

use crate::engine::AppContext;
use crate::render::Canvas;

use super::game_scene::Scene;

/// Scene-level behavior
///
/// A script is detached from its Scene while it runs, so it may add
/// objects, scripts or timers freely.
pub trait Script {
    /// Called once when the Scene initializes (or when added to a live Scene)
    fn start(&mut self, _scene: &mut Scene, _app: &mut AppContext) {}

    /// Called every tick before objects update
    fn update(&mut self, _scene: &mut Scene, _app: &mut AppContext) {}

    /// Called every tick after objects update
    fn late_update(&mut self, _scene: &mut Scene, _app: &mut AppContext) {}
}

/// Screen-space element drawn on top of the world
pub trait UiElement {
    /// Called once when the Scene initializes (or when added to a live Scene)
    fn initialize(&mut self, _app: &mut AppContext) {}

    /// Called every tick, paused or not
    fn update(&mut self, _app: &mut AppContext) {}

    /// Draw without the camera transform
    fn display(&self, canvas: &mut dyn Canvas);
}

/// Hooks a Scene runs around its own lifecycle
pub trait SceneBehavior {
    /// One-time setup, before any script or object starts
    fn start(&mut self, _scene: &mut Scene, _app: &mut AppContext) {}

    /// The Scene became the active one
    fn on_enter(&mut self, _scene: &mut Scene, _app: &mut AppContext) {}

    /// The Scene stopped being the active one
    fn on_exit(&mut self, _scene: &mut Scene, _app: &mut AppContext) {}

    /// Drawn before the world, in screen space
    fn background(&mut self, _scene: &Scene, _canvas: &mut dyn Canvas) {}

    /// Drawn after the world and the UI, in screen space
    fn overlay(&mut self, _scene: &Scene, _canvas: &mut dyn Canvas) {}
}
