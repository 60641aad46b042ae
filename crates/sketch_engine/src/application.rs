//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to create your game using the engine.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once after the engine is created. Register scenes, assets and
    /// event handlers here, then set the entry scene.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame before the active scene ticks.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Handle application events
    ///
    /// Called when the host forwards an event (window, keyboard, mouse).
    fn handle_event(&mut self, engine: &mut Engine, event: AppEvent) -> Result<(), AppError> {
        engine.handle_event(event)
    }

    /// Cleanup the application
    ///
    /// Called once when the main loop ends.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),

    /// Game logic error
    #[error("Game logic error: {0}")]
    GameLogic(String),
}

/// Application events
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Canvas was resized
    WindowResized {
        /// New width
        width: u32,
        /// New height
        height: u32,
    },

    /// Window close requested
    WindowCloseRequested,

    /// Key was pressed
    KeyPressed(crate::input::KeyCode),

    /// Key was released
    KeyReleased(crate::input::KeyCode),

    /// Mouse button event
    MouseButton {
        /// The mouse button that was pressed/released
        button: crate::input::MouseButton,
        /// Whether the button was pressed (true) or released (false)
        pressed: bool,
    },

    /// Mouse movement, in canvas coordinates
    MouseMoved {
        /// New X coordinate
        x: f32,
        /// New Y coordinate
        y: f32,
    },
}
