//! Menu, arena and game-over scenes

use std::cell::Cell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sketch_engine::prelude::*;

use crate::components::{
    damage_object, Chaser, Health, HealthBar, Pilot, Player, Projectile, Sprite, Turret, BULLET_LIFETIME,
    BULLET_RADIUS, BULLET_SPEED, ENEMY_HEALTH, ENEMY_SIZE, ENEMY_SPEED, PLAYER_HEALTH, PLAYER_SPEED,
};

pub const MENU_SCENE: &str = "menu";
pub const ARENA_SCENE: &str = "arena";
pub const GAME_OVER_SCENE: &str = "game_over";

pub const ARENA_RADIUS_ASSET: &str = "arenaRadius";
pub const DEFAULT_ARENA_RADIUS: f32 = 1500.0;

// Event names
pub const WAVE_CLEARED: &str = "wave/cleared";
pub const ENEMY_KILLED: &str = "enemy/killed";
pub const PLAYER_DIED: &str = "player/died";
pub const SCENE_PAUSED: &str = "gameScene/paused";
pub const SCENE_UNPAUSED: &str = "gameScene/unpaused";
pub const QUIT_REQUESTED: &str = "app/quit";

const MENU_DELAY: f32 = 0.5;
const MENU_TRANSITION: f32 = 1.0;
const DEATH_TRANSITION: f32 = 4.0;
const GAME_OVER_DELAY: f32 = 1.0;
const SPAWN_BAND: f32 = 1000.0;

/// Fades to a solid color and back
#[derive(Debug, Clone, Copy)]
pub struct FadeEffect {
    color: Color,
}

impl FadeEffect {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    /// Opaque at the halfway point, clear at both ends
    fn opacity(progress: f32) -> f32 {
        (1.0 - (progress * 2.0 - 1.0).abs()).clamp(0.0, 1.0)
    }
}

impl TransitionEffect for FadeEffect {
    fn display(&mut self, progress: f32, canvas: &mut dyn Canvas) {
        let alpha = (Self::opacity(progress) * 255.0).round() as u8;
        let size = canvas.size();
        canvas.draw(DrawCommand::rect(size / 2.0, size, self.color.with_alpha(alpha)));
    }
}

fn arena_radius(app: &AppContext) -> f32 {
    app.assets
        .get::<f32>(ARENA_RADIUS_ASSET)
        .map_or(DEFAULT_ARENA_RADIUS, |radius| *radius)
}

/// Sand-colored floor, scaled so it stays visible with its center off-screen
#[derive(Debug, Clone, Copy)]
struct ArenaFloor {
    radius: f32,
}

impl Component for ArenaFloor {
    fn role(&self) -> Role {
        Role::viewer(0)
    }

    fn display(&self, object: &GameObject, canvas: &mut dyn Canvas) {
        let center = object.position().unwrap_or_else(Vec2::zeros);
        canvas.draw(DrawCommand::circle(center, self.radius, Color::rgb(89, 72, 37)));
        canvas.draw(DrawCommand::circle(center, 250.0, Color::rgb(129, 102, 67)));
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(*self)
    }
}

fn create_arena(radius: f32) -> GameObject {
    let mut arena = create_game_object(vec![Box::new(ArenaFloor { radius }) as Box<dyn Component>]);
    if let Some(transform) = arena.transform_mut() {
        transform.scale = vec2(radius, radius);
    }
    arena
}

fn create_player(bullet: PrefabId) -> GameObject {
    let collider = CircleCollider::new(25.0)
        .with_layers(CollisionLayers::PLAYER, CollisionLayers::ENEMY)
        .with_listener(ColliderEvent::Enter, |contact, player, ctx| {
            ctx.commands.destroy(contact.object);
            let died = player
                .component_mut::<Health>()
                .is_some_and(|health| health.take(1));
            if died {
                log::info!("Player died");
                ctx.app.events.send(Event::new(PLAYER_DIED));
            }
        });

    create_game_object(vec![
        Box::new(Player) as Box<dyn Component>,
        Box::new(Pilot { speed: PLAYER_SPEED }),
        Box::new(Health::new(PLAYER_HEALTH)),
        Box::new(Turret::new(bullet)),
        Box::new(collider),
        Box::new(Sprite {
            radius: 25.0,
            color: Color::rgb(60, 120, 220),
            layer: 3,
        }),
        Box::new(HealthBar {
            width: 60.0,
            offset: 40.0,
        }),
    ])
}

/// Bullet fired by the player's turret
pub fn bullet_prefab() -> Result<GamePrefab, EngineError> {
    let collider = CircleCollider::new(BULLET_RADIUS)
        .with_layers(CollisionLayers::PROJECTILE, CollisionLayers::ENEMY)
        .with_listener(ColliderEvent::Enter, |contact, bullet, ctx| {
            if bullet.is_destroyed() {
                return;
            }
            let damage = bullet.component::<Projectile>().map_or(1, |projectile| projectile.damage);
            let target = contact.object;
            bullet.destroy();
            ctx.commands.run(move |scene, _app| {
                damage_object(scene, target, damage);
            });
        });

    GamePrefab::new(create_game_object(vec![
        Box::new(Projectile {
            direction: Vec2::zeros(),
            speed: BULLET_SPEED,
            damage: 1,
        }) as Box<dyn Component>,
        Box::new(Lifetime::new(BULLET_LIFETIME)),
        Box::new(collider),
        Box::new(Sprite {
            radius: BULLET_RADIUS,
            color: Color::rgb(240, 120, 30),
            layer: 2,
        }),
    ]))
}

/// Enemy that chases the player
pub fn enemy_prefab() -> Result<GamePrefab, EngineError> {
    let collider = RectCollider::new(vec2(ENEMY_SIZE, ENEMY_SIZE))
        .with_layers(CollisionLayers::ENEMY, CollisionLayers::PLAYER | CollisionLayers::PROJECTILE);

    GamePrefab::new(create_game_object(vec![
        Box::new(Chaser { speed: ENEMY_SPEED }) as Box<dyn Component>,
        Box::new(Health::new(ENEMY_HEALTH)),
        Box::new(collider),
        Box::new(Sprite {
            radius: ENEMY_SIZE / 2.0,
            color: Color::rgb(160, 80, 40),
            layer: 1,
        }),
        Box::new(HealthBar {
            width: ENEMY_SIZE,
            offset: ENEMY_SIZE * 0.8,
        }),
    ]))
}

/// Waves, pausing and the way out when the player dies
pub struct GameManager {
    enemy: PrefabId,
    enemies: Vec<ObjectId>,
    wave: u32,
    rng: StdRng,
    player_died: Rc<Cell<bool>>,
    game_over: bool,
}

impl GameManager {
    pub fn new(enemy: PrefabId, seed: u64) -> Self {
        Self {
            enemy,
            enemies: Vec::new(),
            wave: 0,
            rng: StdRng::seed_from_u64(seed),
            player_died: Rc::new(Cell::new(false)),
            game_over: false,
        }
    }

    fn enemies_per_wave(wave: u32) -> usize {
        (wave as f32).powf(0.8).ceil() as usize
    }

    fn toggle_pause(scene: &mut Scene, app: &mut AppContext) {
        if scene.is_paused() {
            scene.unpause();
            app.events.send(Event::new(SCENE_UNPAUSED));
        } else {
            scene.pause();
            app.events.send(Event::new(SCENE_PAUSED));
        }
    }

    /// Forget enemies that left the Scene; true once none are left
    fn wave_cleared(&mut self, scene: &Scene, app: &mut AppContext) -> bool {
        let before = self.enemies.len();
        self.enemies.retain(|&id| scene.object(id).is_some());
        for remaining in (self.enemies.len()..before).rev() {
            app.events.send(
                Event::new(ENEMY_KILLED)
                    .with_arg("remaining", EventArg::Int(remaining as i64))
                    .with_arg("wave_size", EventArg::Int(Self::enemies_per_wave(self.wave) as i64)),
            );
        }
        self.enemies.is_empty()
    }

    fn spawn_wave(&mut self, scene: &mut Scene, app: &AppContext) {
        let radius = arena_radius(app);
        let band = SPAWN_BAND.min(radius);
        for _ in 0..Self::enemies_per_wave(self.wave) {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let distance = radius - band + self.rng.gen::<f32>() * band;
            let position = vec2(angle.cos(), angle.sin()) * distance;
            if let Some(id) = scene.spawn_at(self.enemy, position) {
                self.enemies.push(id);
            }
        }
        log::info!("Wave {} spawned {} enemies", self.wave, self.enemies.len());
    }
}

impl Script for GameManager {
    fn start(&mut self, _scene: &mut Scene, app: &mut AppContext) {
        let died = Rc::clone(&self.player_died);
        app.events.on(PLAYER_DIED, move |_event: &Event| {
            died.set(true);
            false
        });
    }

    fn update(&mut self, scene: &mut Scene, app: &mut AppContext) {
        if self.game_over {
            return;
        }
        if self.player_died.get() {
            self.game_over = true;
            scene.pause();
            app.request_transition(
                GAME_OVER_SCENE,
                SceneTransition::new(DEATH_TRANSITION, FadeEffect::new(Color::BLACK)),
            );
            return;
        }

        if app.input.was_pressed_this_frame(KeyCode::Escape) {
            Self::toggle_pause(scene, app);
        }

        if self.wave_cleared(scene, app) {
            self.wave += 1;
            app.events
                .send(Event::new(WAVE_CLEARED).with_arg("wave", EventArg::Int(i64::from(self.wave))));
            self.spawn_wave(scene, app);
        }
    }
}

/// Current wave number in the top-right corner
#[derive(Default)]
struct WaveInfo {
    wave: Rc<Cell<i64>>,
    position: Vec2,
}

impl UiElement for WaveInfo {
    fn initialize(&mut self, app: &mut AppContext) {
        let wave = Rc::clone(&self.wave);
        app.events.on(WAVE_CLEARED, move |event: &Event| {
            if let Some(number) = event.get_int("wave") {
                wave.set(number);
            }
            false
        });
    }

    fn display(&self, canvas: &mut dyn Canvas) {
        let size = 125.0;
        let anchor = vec2(canvas.size().x - size - 50.0, 30.0);
        let center = anchor + self.position + vec2(size / 2.0, size / 2.0);
        canvas.draw(DrawCommand::circle(center, size / 2.0, Color::WHITE));
        canvas.draw(DrawCommand::circle(center, size * 0.45, Color::rgb(70, 70, 70)));
        canvas.draw(DrawCommand::text(
            center - vec2(12.0, 20.0),
            self.wave.get().to_string(),
            40.0,
            Color::WHITE,
        ));
    }
}

/// "PAUSED" banner shown while the arena is paused
#[derive(Default)]
struct PauseBanner {
    visible: Rc<Cell<bool>>,
}

impl UiElement for PauseBanner {
    fn initialize(&mut self, app: &mut AppContext) {
        for (name, visible) in [(SCENE_PAUSED, true), (SCENE_UNPAUSED, false)] {
            let flag = Rc::clone(&self.visible);
            app.events.on(name, move |_event: &Event| {
                flag.set(visible);
                false
            });
        }
    }

    fn display(&self, canvas: &mut dyn Canvas) {
        if !self.visible.get() {
            return;
        }
        let size = canvas.size();
        canvas.draw(DrawCommand::rect(size / 2.0, size, Color::BLACK.with_alpha(120)));
        canvas.draw(DrawCommand::text(size / 2.0 - vec2(80.0, 20.0), "PAUSED", 40.0, Color::WHITE));
    }
}

/// Title screen that moves on to the arena by itself
#[derive(Debug, Default)]
pub struct MenuBehavior;

impl SceneBehavior for MenuBehavior {
    fn on_enter(&mut self, scene: &mut Scene, _app: &mut AppContext) {
        scene.after(MENU_DELAY, |_scene, app| {
            log::info!("Leaving the main menu");
            app.request_transition(
                ARENA_SCENE,
                SceneTransition::new(MENU_TRANSITION, FadeEffect::new(Color::BLACK)),
            );
        });
    }

    fn background(&mut self, _scene: &Scene, canvas: &mut dyn Canvas) {
        canvas.background(Color::rgb(30, 30, 40));
    }

    fn overlay(&mut self, _scene: &Scene, canvas: &mut dyn Canvas) {
        let center = canvas.size() / 2.0;
        canvas.draw(DrawCommand::text(center - vec2(120.0, 40.0), "ARENA", 64.0, Color::WHITE));
    }
}

/// The playable Scene
#[derive(Debug)]
pub struct ArenaBehavior {
    seed: u64,
}

impl ArenaBehavior {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl SceneBehavior for ArenaBehavior {
    fn start(&mut self, scene: &mut Scene, app: &mut AppContext) {
        let (bullet, enemy) = match (bullet_prefab(), enemy_prefab()) {
            (Ok(bullet), Ok(enemy)) => (scene.bind_prefab(bullet), scene.bind_prefab(enemy)),
            (Err(e), _) | (_, Err(e)) => {
                log::error!("Failed to build arena prefabs: {}", e);
                return;
            }
        };

        scene.add_game_object(create_arena(arena_radius(app)));
        let player = scene.add_game_object(create_player(bullet));
        scene.camera_mut().follow(player);

        scene.add_script(GameManager::new(enemy, self.seed));
        scene.add_ui_element(WaveInfo::default());
        scene.add_ui_element(PauseBanner::default());
    }

    fn on_enter(&mut self, scene: &mut Scene, app: &mut AppContext) {
        scene.unpause();
        app.events.send(Event::new(SCENE_UNPAUSED));
    }

    fn background(&mut self, _scene: &Scene, canvas: &mut dyn Canvas) {
        canvas.background(Color::rgb(80, 80, 80));
    }
}

/// Shown after the player dies; asks the app to quit shortly after
#[derive(Debug, Default)]
pub struct GameOverBehavior;

impl SceneBehavior for GameOverBehavior {
    fn on_enter(&mut self, scene: &mut Scene, _app: &mut AppContext) {
        log::info!("Game over");
        scene.after(GAME_OVER_DELAY, |_scene, app| app.events.send(Event::new(QUIT_REQUESTED)));
    }

    fn background(&mut self, _scene: &Scene, canvas: &mut dyn Canvas) {
        canvas.background(Color::BLACK);
    }

    fn overlay(&mut self, _scene: &Scene, canvas: &mut dyn Canvas) {
        let center = canvas.size() / 2.0;
        canvas.draw(DrawCommand::text(center - vec2(160.0, 40.0), "GAME OVER", 64.0, Color::RED));
    }
}
