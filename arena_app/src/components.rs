//! Gameplay components for the arena demo

use sketch_engine::prelude::*;

// Movement and combat tuning
pub const PLAYER_SPEED: f32 = 220.0;
pub const PLAYER_HEALTH: i32 = 5;
pub const ENEMY_SPEED: f32 = 70.0;
pub const ENEMY_HEALTH: i32 = 3;
pub const ENEMY_SIZE: f32 = 50.0;
pub const BULLET_SPEED: f32 = 500.0;
pub const BULLET_RADIUS: f32 = 10.0;
pub const BULLET_LIFETIME: f32 = 5.0;
pub const TURRET_RANGE: f32 = 600.0;
pub const TURRET_COOLDOWN: f32 = 0.25;

/// Marks the object the camera follows and enemies chase
#[derive(Debug, Clone, Copy, Default)]
pub struct Player;

impl Component for Player {
    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(*self)
    }
}

/// Hit points
#[derive(Debug, Clone, Copy)]
pub struct Health {
    current: i32,
    max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0 {
            return 0.0;
        }
        self.current.max(0) as f32 / self.max as f32
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    /// Apply `amount` damage; true if this hit was the killing one
    pub fn take(&mut self, amount: i32) -> bool {
        let was_alive = !self.is_dead();
        self.current -= amount;
        was_alive && self.is_dead()
    }
}

impl Component for Health {
    fn restart(&mut self) {
        self.current = self.max;
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(Self::new(self.max))
    }
}

/// Moves the player from the arrow/WASD keys
#[derive(Debug, Clone, Copy)]
pub struct Pilot {
    pub speed: f32,
}

impl Pilot {
    fn heading(input: &InputState) -> Vec2 {
        let mut heading = Vec2::zeros();
        if input.is_down(KeyCode::W) || input.is_down(KeyCode::Up) {
            heading.y -= 1.0;
        }
        if input.is_down(KeyCode::S) || input.is_down(KeyCode::Down) {
            heading.y += 1.0;
        }
        if input.is_down(KeyCode::A) || input.is_down(KeyCode::Left) {
            heading.x -= 1.0;
        }
        if input.is_down(KeyCode::D) || input.is_down(KeyCode::Right) {
            heading.x += 1.0;
        }
        heading.normalize_or_zero()
    }
}

impl Component for Pilot {
    fn role(&self) -> Role {
        Role::Controller
    }

    fn update(&mut self, object: &mut GameObject, ctx: &mut UpdateContext<'_>) {
        let step = Self::heading(&ctx.app.input) * self.speed * ctx.delta_time();
        if let Some(transform) = object.transform_mut() {
            transform.translate(step);
        }
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(*self)
    }
}

/// Walks straight at the player
#[derive(Debug, Clone, Copy)]
pub struct Chaser {
    pub speed: f32,
}

impl Component for Chaser {
    fn role(&self) -> Role {
        Role::Controller
    }

    fn update(&mut self, object: &mut GameObject, ctx: &mut UpdateContext<'_>) {
        let target = ctx
            .world
            .others()
            .find(|(_, other)| other.has_component::<Player>())
            .and_then(|(_, player)| player.position());
        let (Some(target), Some(position)) = (target, object.position()) else {
            return;
        };

        let step = (target - position).normalize_or_zero() * self.speed * ctx.delta_time();
        if let Some(transform) = object.transform_mut() {
            transform.translate(step);
        }
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(*self)
    }
}

/// Flies in a straight line and carries the damage it deals
#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    pub direction: Vec2,
    pub speed: f32,
    pub damage: i32,
}

impl Component for Projectile {
    fn role(&self) -> Role {
        Role::Controller
    }

    fn update(&mut self, object: &mut GameObject, ctx: &mut UpdateContext<'_>) {
        let step = self.direction * self.speed * ctx.delta_time();
        if let Some(transform) = object.transform_mut() {
            transform.translate(step);
        }
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(*self)
    }
}

/// Fires the bullet prefab at the nearest enemy in range
#[derive(Debug, Clone)]
pub struct Turret {
    bullet: PrefabId,
    cooldown: f32,
    range: f32,
    timer: f32,
    nearby: Vec<ObjectId>,
}

impl Turret {
    pub fn new(bullet: PrefabId) -> Self {
        Self {
            bullet,
            cooldown: TURRET_COOLDOWN,
            range: TURRET_RANGE,
            timer: 0.0,
            nearby: Vec::new(),
        }
    }

    fn nearest_enemy(&mut self, origin: Vec2, world: &WorldView<'_>) -> Option<Vec2> {
        let area = Rect::from_center(origin, vec2(self.range * 2.0, self.range * 2.0));
        self.nearby.clear();
        world.query_into(&area, &mut self.nearby);

        self.nearby
            .iter()
            .filter_map(|&id| world.object(id))
            .filter(|object| object.has_component::<Chaser>() && !object.is_destroyed())
            .filter_map(GameObject::position)
            .map(|position| (position, (position - origin).norm_squared()))
            .filter(|&(_, distance)| distance <= self.range * self.range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(position, _)| position)
    }
}

impl Component for Turret {
    fn role(&self) -> Role {
        Role::Controller
    }

    fn restart(&mut self) {
        self.timer = 0.0;
    }

    fn update(&mut self, object: &mut GameObject, ctx: &mut UpdateContext<'_>) {
        self.timer -= ctx.delta_time();
        if self.timer > 0.0 {
            return;
        }
        let Some(origin) = object.position() else {
            return;
        };
        let Some(target) = self.nearest_enemy(origin, &ctx.world) else {
            return;
        };

        self.timer = self.cooldown;
        let direction = (target - origin).normalize_or_zero();
        let bullet = self.bullet;
        ctx.commands.run(move |scene, _app| {
            let Some(id) = scene.spawn_at(bullet, origin) else {
                return;
            };
            if let Some(projectile) = scene.object_mut(id).and_then(|b| b.component_mut::<Projectile>()) {
                projectile.direction = direction;
            }
        });
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(Self::new(self.bullet))
    }
}

/// Filled circle drawn at the object's position
#[derive(Debug, Clone, Copy)]
pub struct Sprite {
    pub radius: f32,
    pub color: Color,
    pub layer: i32,
}

impl Component for Sprite {
    fn role(&self) -> Role {
        Role::viewer(self.layer)
    }

    fn display(&self, object: &GameObject, canvas: &mut dyn Canvas) {
        if let Some(position) = object.position() {
            canvas.draw(DrawCommand::circle(position, self.radius, self.color));
        }
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(*self)
    }
}

/// Thin bar above the object showing its remaining health
#[derive(Debug, Clone, Copy)]
pub struct HealthBar {
    pub width: f32,
    pub offset: f32,
}

impl Component for HealthBar {
    fn role(&self) -> Role {
        Role::viewer(10)
    }

    fn display(&self, object: &GameObject, canvas: &mut dyn Canvas) {
        let (Some(position), Some(health)) = (object.position(), object.component::<Health>()) else {
            return;
        };
        let anchor = position - vec2(0.0, self.offset);
        canvas.draw(DrawCommand::rect(anchor, vec2(self.width, 6.0), Color::RED));

        let filled = self.width * health.fraction();
        let left = anchor.x - self.width / 2.0;
        canvas.draw(DrawCommand::rect(
            vec2(left + filled / 2.0, anchor.y),
            vec2(filled, 6.0),
            Color::GREEN,
        ));
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(*self)
    }
}

/// Damage the object `target` unless it is already gone
///
/// Returns true if this hit killed it.
pub fn damage_object(scene: &mut Scene, target: ObjectId, amount: i32) -> bool {
    let Some(object) = scene.object_mut(target) else {
        return false;
    };
    if object.is_destroyed() {
        return false;
    }
    let killed = object.component_mut::<Health>().is_some_and(|health| health.take(amount));
    if killed {
        object.destroy();
    }
    killed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_reports_the_killing_blow_once() {
        let mut health = Health::new(2);
        assert!(!health.take(1));
        assert!(health.take(1));
        assert!(!health.take(1));
        assert!(health.is_dead());
        assert_eq!(health.fraction(), 0.0);
    }

    #[test]
    fn test_pilot_heading_is_normalized() {
        let mut input = InputState::new();
        input.press(KeyCode::D);
        input.press(KeyCode::S);
        let heading = Pilot::heading(&input);
        assert!((heading.norm() - 1.0).abs() < 1e-5);
        assert!(heading.x > 0.0 && heading.y > 0.0);
    }

    #[test]
    fn test_damage_object_destroys_on_kill() {
        let mut scene = Scene::empty();
        let id = scene.add_game_object(
            GameObject::new()
                .with_component(Transform::default())
                .with_component(Health::new(2)),
        );

        assert!(!damage_object(&mut scene, id, 1));
        assert!(damage_object(&mut scene, id, 1));
        assert!(scene.object(id).is_some_and(GameObject::is_destroyed));
        assert!(!damage_object(&mut scene, id, 1));
    }
}
