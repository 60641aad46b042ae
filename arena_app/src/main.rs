//! Headless arena demo
//!
//! A player with an auto-firing turret holds off waves of enemies. The
//! run is scripted: the app feeds movement keys into the engine, records
//! the draw commands of each frame and logs what happened.

mod components;
mod scenes;

use std::cell::Cell;
use std::rc::Rc;

use sketch_engine::foundation::logging;
use sketch_engine::prelude::*;
use thiserror::Error;

use scenes::{
    ArenaBehavior, GameOverBehavior, MenuBehavior, ARENA_RADIUS_ASSET, ARENA_SCENE, DEFAULT_ARENA_RADIUS,
    ENEMY_KILLED, GAME_OVER_SCENE, MENU_SCENE, QUIT_REQUESTED, WAVE_CLEARED,
};

// Run configuration
const CONFIG_PATH: &str = "arena.ron";
const RUN_SECONDS: u64 = 90;
const FRAMES_PER_SECOND: u64 = 60;
const FRAME_TIME: f32 = 1.0 / 60.0;
const SEED: u64 = 0x5EED;
const STRAFE_FRAMES: u64 = 90;
const STRAFE_KEYS: [KeyCode; 4] = [KeyCode::D, KeyCode::S, KeyCode::A, KeyCode::W];
// Pause the arena briefly partway through the run
const PAUSE_AT_FRAME: u64 = 1800;
const UNPAUSE_AT_FRAME: u64 = 1860;

#[derive(Error, Debug)]
enum ArenaError {
    #[error("invalid arena radius {0}")]
    InvalidRadius(f32),
}

impl From<ArenaError> for AppError {
    fn from(error: ArenaError) -> Self {
        Self::GameLogic(error.to_string())
    }
}

/// Counters fed by gameplay events
#[derive(Debug, Default)]
struct RunStats {
    kills: Rc<Cell<u32>>,
    waves: Rc<Cell<i64>>,
    quit_requested: Rc<Cell<bool>>,
}

struct ArenaApp {
    arena_radius: f32,
    frame: u64,
    held_key: Option<KeyCode>,
    stats: RunStats,
}

impl ArenaApp {
    fn new(arena_radius: f32) -> Self {
        log::info!("Creating arena application...");
        Self {
            arena_radius,
            frame: 0,
            held_key: None,
            stats: RunStats::default(),
        }
    }

    fn watch_events(&self, events: &mut EventBus) {
        let kills = Rc::clone(&self.stats.kills);
        events.on(ENEMY_KILLED, move |_event: &Event| {
            kills.set(kills.get() + 1);
            false
        });

        let waves = Rc::clone(&self.stats.waves);
        events.on(WAVE_CLEARED, move |event: &Event| {
            if let Some(wave) = event.get_int("wave") {
                log::info!("Wave {} started", wave);
                waves.set(wave);
            }
            false
        });

        let quit = Rc::clone(&self.stats.quit_requested);
        events.on(QUIT_REQUESTED, move |_event: &Event| {
            quit.set(true);
            true
        });
    }

    /// Hold one movement key at a time, cycling through a square
    fn steer(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        if self.frame % STRAFE_FRAMES == 0 {
            let index = (self.frame / STRAFE_FRAMES) as usize % STRAFE_KEYS.len();
            let next = STRAFE_KEYS[index];
            if let Some(previous) = self.held_key.replace(next) {
                engine.handle_event(AppEvent::KeyReleased(previous))?;
            }
            engine.handle_event(AppEvent::KeyPressed(next))?;
        }

        if self.frame == PAUSE_AT_FRAME || self.frame == UNPAUSE_AT_FRAME {
            engine.handle_event(AppEvent::KeyPressed(KeyCode::Escape))?;
        } else if self.frame == PAUSE_AT_FRAME + 1 || self.frame == UNPAUSE_AT_FRAME + 1 {
            engine.handle_event(AppEvent::KeyReleased(KeyCode::Escape))?;
        }
        Ok(())
    }
}

impl Application for ArenaApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        log::info!("Initializing arena...");
        if !(self.arena_radius.is_finite() && self.arena_radius > 0.0) {
            return Err(ArenaError::InvalidRadius(self.arena_radius).into());
        }

        engine.context.assets.register(ARENA_RADIUS_ASSET, self.arena_radius)?;
        self.watch_events(&mut engine.context.events);

        let menu = engine.create_scene(MenuBehavior);
        let arena = engine.create_scene(ArenaBehavior::new(SEED));
        let game_over = engine.create_scene(GameOverBehavior);
        engine.register_scene(MENU_SCENE, menu)?;
        engine.register_scene(ARENA_SCENE, arena)?;
        engine.register_scene(GAME_OVER_SCENE, game_over)?;
        engine.set_entry_scene(MENU_SCENE)?;
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        if self.stats.quit_requested.get() {
            engine.quit();
            return Ok(());
        }
        if engine.scenes.active_scene_name() == Some(ARENA_SCENE) {
            self.steer(engine)?;
            self.frame += 1;
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        let scene = engine.scenes.active_scene_name().unwrap_or("none");
        log::info!(
            "Run finished in scene '{}': reached wave {}, {} enemies down",
            scene,
            self.stats.waves.get(),
            self.stats.kills.get()
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load_or_default(CONFIG_PATH)?;
    logging::init_with_level(&config.log_level);

    log::info!("Starting arena demo");

    let mut engine = Engine::new(config)?;
    let mut app = ArenaApp::new(DEFAULT_ARENA_RADIUS);
    app.initialize(&mut engine)?;

    // One second of frames at a time, so the recording stays small
    let mut canvas = RecordingCanvas::new(800.0, 600.0);
    let mut result = Ok(());
    for second in 1..=RUN_SECONDS {
        result = engine.run_frames(&mut app, FRAMES_PER_SECOND, FRAME_TIME, &mut canvas);
        if result.is_err() || !engine.is_running() {
            break;
        }
        log::debug!(
            "Second {}: {} draw commands recorded, {:.0} fps",
            second,
            canvas.draw_count(),
            engine.context.clock.average_fps()
        );
        canvas.clear();
    }
    app.cleanup(&mut engine);

    match result {
        Ok(()) => {
            log::info!("Arena demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Arena demo failed: {:?}", e);
            Err(e.into())
        }
    }
}
