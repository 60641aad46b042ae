//! # Sketch Engine
//!
//! A small 2D entity-component game framework.
//!
//! ## Features
//!
//! - **GameObjects and Components**: objects are bags of typed components,
//!   each a model (data), a viewer (drawn on a layer) or a controller
//!   (updated every frame)
//! - **Spatial Index**: a region tree rebuilt every frame answers "what is
//!   inside this rectangle"
//! - **Colliders**: rectangle and circle colliders with enter/exit events
//! - **Animation**: frame animations and event-driven animation trees
//! - **Scenes**: per-frame pipeline, camera culling, layered drawing, timers,
//!   scripts, UI and timed scene transitions
//! - **Headless**: drawing goes through a [`render::Canvas`] supplied by the
//!   host, so everything runs and tests without a window
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sketch_engine::prelude::*;
//!
//! struct Level;
//!
//! impl SceneBehavior for Level {
//!     fn start(&mut self, scene: &mut Scene, _app: &mut AppContext) {
//!         scene.add_game_object(create_game_object(vec![
//!             Box::new(CircleCollider::new(10.0)) as Box<dyn Component>,
//!         ]));
//!     }
//! }
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let level = engine.create_scene(Level);
//!         engine.register_scene("level", level)?;
//!         engine.set_entry_scene("level")?;
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut canvas = NullCanvas::new(800.0, 600.0);
//!     Engine::run(EngineConfig::default(), &mut MyApp, &mut canvas)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod config;
pub mod core;

pub mod assets;
pub mod ecs;
pub mod events;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod render;
pub mod scene;
pub mod spatial;

mod application;
mod engine;

pub use application::{AppError, AppEvent, Application};
pub use engine::{AppContext, Engine, EngineError, SceneRequest};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::AssetRegistry,
        core::config::{Config, EngineConfig, SceneConfig, SpatialConfig},
        ecs::components::{
            Animation, AnimationTree, Animator, CircleCollider, Collider, ColliderEvent, DirectionalAnimation,
            Lifetime, NamedAnimations, RectCollider, Transform, DIRECTION_PROPERTY,
        },
        ecs::{
            create_game_object, AnyCollider, Component, GameObject, GamePrefab, Role, SceneCommands, UpdateContext,
            WorldView,
        },
        events::{Event, EventArg, EventBus},
        foundation::collections::{ObjectId, PrefabId, TimerId},
        foundation::math::{vec2, Rect, Vec2, Vec2Ext},
        input::{InputState, KeyCode, MouseButton},
        physics::{CollisionLayers, Contact},
        render::{Canvas, Color, DrawCommand, NullCanvas, RecordingCanvas},
        scene::{Camera, NoEffect, Scene, SceneBehavior, SceneManager, SceneTransition, Script, TransitionEffect, UiElement},
        AppContext, AppError, AppEvent, Application, Engine, EngineError,
    };
}
