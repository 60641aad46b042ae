//! Core engine implementation

use crate::{
    application::{AppError, AppEvent, Application},
    assets::AssetRegistry,
    core::config::{Config, ConfigError, EngineConfig},
    events::EventBus,
    foundation::time::FrameClock,
    input::InputState,
    render::Canvas,
    scene::{Scene, SceneBehavior, SceneManager, SceneTransition},
};
use thiserror::Error;

/// Scene switch asked for from inside a frame
#[derive(Debug)]
pub enum SceneRequest {
    /// Switch immediately (ignored while a transition runs)
    Change(String),
    /// Switch through a timed transition
    Transition(String, SceneTransition),
}

/// Services shared by every Scene
///
/// Constructed once by the [`Engine`] and handed by reference to scenes,
/// scripts and controllers.
#[derive(Debug)]
pub struct AppContext {
    /// Engine configuration
    pub config: EngineConfig,

    /// Keyboard and mouse state
    pub input: InputState,

    /// Frame timing
    pub clock: FrameClock,

    /// Publish/subscribe bus
    pub events: EventBus,

    /// Named assets
    pub assets: AssetRegistry,

    scene_request: Option<SceneRequest>,
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl AppContext {
    /// Fresh context for `config`
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            input: InputState::new(),
            clock: FrameClock::new(),
            events: EventBus::new(),
            assets: AssetRegistry::new(),
            scene_request: None,
        }
    }

    /// Ask for an immediate Scene switch once the active Scene has ticked
    pub fn request_scene(&mut self, name: impl Into<String>) {
        self.scene_request = Some(SceneRequest::Change(name.into()));
    }

    /// Ask for a timed Scene switch once the active Scene has ticked
    pub fn request_transition(&mut self, name: impl Into<String>, transition: SceneTransition) {
        self.scene_request = Some(SceneRequest::Transition(name.into(), transition));
    }

    /// Whether debug features are on
    pub fn debug_mode(&self) -> bool {
        self.config.debug_mode
    }

    pub(crate) fn take_scene_request(&mut self) -> Option<SceneRequest> {
        self.scene_request.take()
    }
}

/// Main engine struct
///
/// The engine owns the shared context and the scenes, and runs one frame
/// at a time for the host loop.
pub struct Engine {
    /// Services shared with every Scene
    pub context: AppContext,

    /// Registered scenes
    pub scenes: SceneManager,

    /// Whether the engine should continue running
    running: bool,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");
        config.validate()?;

        Ok(Self {
            context: AppContext::new(config),
            scenes: SceneManager::new(),
            running: true,
        })
    }

    /// Create an engine from a `.toml` or `.ron` config file
    pub fn from_config_file(path: impl AsRef<std::path::Path>) -> Result<Self, EngineError> {
        let config = EngineConfig::load_from_file(path)?;
        Self::new(config)
    }

    /// Run the engine main loop with the given application
    ///
    /// Frames are timed from the wall clock until the application or a
    /// host event calls [`Self::quit`].
    pub fn run<T: Application>(config: EngineConfig, app: &mut T, canvas: &mut dyn Canvas) -> Result<(), EngineError> {
        let mut engine = Self::new(config)?;

        app.initialize(&mut engine)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {}", e)))?;

        log::info!("Starting main loop...");

        while engine.running {
            engine.context.clock.tick();
            let delta_time = engine.context.clock.delta_time_seconds();

            app.update(&mut engine, delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {}", e)))?;

            engine.step(canvas);
        }

        app.cleanup(&mut engine);

        log::info!("Engine shutdown complete");
        Ok(())
    }

    /// Run `frames` frames of fixed length `delta_seconds`
    ///
    /// Stops early if the engine is asked to quit.
    pub fn run_frames<T: Application>(
        &mut self,
        app: &mut T,
        frames: u64,
        delta_seconds: f32,
        canvas: &mut dyn Canvas,
    ) -> Result<(), EngineError> {
        for _ in 0..frames {
            if !self.running {
                break;
            }
            self.context.clock.advance(delta_seconds);
            app.update(self, delta_seconds)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {}", e)))?;
            self.step(canvas);
        }
        Ok(())
    }

    /// Advance the clock by `delta_seconds` and run one frame
    pub fn frame(&mut self, delta_seconds: f32, canvas: &mut dyn Canvas) {
        self.context.clock.advance(delta_seconds);
        self.step(canvas);
    }

    /// Scene tick, event dispatch, then end of the input frame
    fn step(&mut self, canvas: &mut dyn Canvas) {
        self.context.events.update_time(f64::from(self.context.clock.elapsed()));
        self.scenes.tick(&mut self.context, canvas);
        self.context.events.dispatch();
        self.context.input.end_frame();
    }

    /// Scene sized by this engine's spatial and scene settings
    pub fn create_scene(&self, behavior: impl SceneBehavior + 'static) -> Scene {
        Scene::new(behavior).with_config(self.context.config.spatial.clone(), self.context.config.scene.clone())
    }

    /// Register a Scene under `name`
    pub fn register_scene(&mut self, name: impl Into<String>, scene: Scene) -> Result<(), EngineError> {
        self.scenes.register_scene(name, scene)
    }

    /// Initialize every Scene and enter `name`
    pub fn set_entry_scene(&mut self, name: &str) -> Result<(), EngineError> {
        self.scenes.set_entry_scene(name, &mut self.context)
    }

    /// Switch the active Scene right away
    pub fn change_scene(&mut self, name: &str) -> bool {
        self.scenes.change_scene(name, &mut self.context)
    }

    /// The active Scene
    pub fn active_scene(&self) -> Option<&Scene> {
        self.scenes.active_scene()
    }

    /// Mutable access to the active Scene
    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.scenes.active_scene_mut()
    }

    /// Handle an application event
    pub fn handle_event(&mut self, event: AppEvent) -> Result<(), AppError> {
        match event {
            AppEvent::WindowCloseRequested => {
                self.running = false;
            }
            AppEvent::KeyPressed(key) => {
                self.context.input.press(key);
            }
            AppEvent::KeyReleased(key) => {
                self.context.input.release(key);
            }
            AppEvent::MouseButton { button, pressed } => {
                if pressed {
                    self.context.input.press(button);
                } else {
                    self.context.input.release(button);
                }
            }
            AppEvent::MouseMoved { x, y } => {
                self.context.input.move_mouse(x, y);
            }
            AppEvent::WindowResized { width, height } => {
                log::debug!("Canvas resized to {}x{}", width, height);
            }
        }

        Ok(())
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop keeps going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get the current frame delta time
    pub fn delta_time(&self) -> f32 {
        self.context.clock.delta_time_seconds()
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Initialization error
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// A Scene with this name is already registered
    #[error("Scene with name '{0}' already registered")]
    DuplicateScene(String),

    /// No Scene with this name
    #[error("No scene with name '{0}'")]
    UnknownScene(String),

    /// Scenes can only be registered before the entry Scene is set
    #[error("Cannot register scene '{0}' after entry")]
    RegistrationClosed(String),

    /// The entry Scene can only be set once
    #[error("Cannot set the entry scene multiple times")]
    EntryAlreadySet,

    /// An asset with this name is already registered
    #[error("Asset with name '{0}' already registered")]
    DuplicateAsset(String),

    /// No asset with this name
    #[error("No asset with name '{0}'")]
    MissingAsset(String),

    /// Prefab templates must never be initialized
    #[error("Cannot build a prefab from an initialized GameObject")]
    InitializedPrefabTemplate,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SpatialConfig;
    use crate::foundation::math::Rect;
    use crate::input::KeyCode;
    use crate::render::NullCanvas;

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig::default().with_spatial(SpatialConfig::new(Rect::new(0.0, 0.0, 100.0, 100.0)).with_node_capacity(0));
        assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_frame_advances_clock_and_clears_input_edges() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let mut canvas = NullCanvas::new(200.0, 200.0);
        engine.register_scene("main", engine.create_scene(NoHooks)).unwrap();
        engine.set_entry_scene("main").unwrap();

        engine.handle_event(AppEvent::KeyPressed(KeyCode::Space)).unwrap();
        assert!(engine.context.input.was_pressed_this_frame(KeyCode::Space));

        engine.frame(0.5, &mut canvas);
        assert_eq!(engine.context.clock.frame(), 1);
        assert!(engine.context.input.is_down(KeyCode::Space));
        assert!(!engine.context.input.was_pressed_this_frame(KeyCode::Space));
    }

    #[test]
    fn test_close_request_stops_run_frames() {
        struct Counter(u32);

        impl Application for Counter {
            fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
                Ok(())
            }

            fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
                self.0 += 1;
                if self.0 == 3 {
                    engine.handle_event(AppEvent::WindowCloseRequested)?;
                }
                Ok(())
            }

            fn cleanup(&mut self, _engine: &mut Engine) {}
        }

        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let mut canvas = NullCanvas::new(10.0, 10.0);
        let mut app = Counter(0);
        engine.run_frames(&mut app, 10, 0.016, &mut canvas).unwrap();
        assert_eq!(app.0, 3);
        assert!(!engine.is_running());
    }

    struct NoHooks;

    impl SceneBehavior for NoHooks {}
}
