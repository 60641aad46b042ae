//! Scenario tests running whole Scenes frame by frame

mod collisions;

use std::cell::RefCell;
use std::rc::Rc;

use crate::ecs::components::Transform;
use crate::ecs::{Component, GameObject, Role, UpdateContext};
use crate::engine::AppContext;
use crate::foundation::math::Vec2;
use crate::render::{Canvas, Color, DrawCommand, RecordingCanvas};
use crate::scene::Scene;

const FRAME: f32 = 1.0 / 60.0;

type Log = Rc<RefCell<Vec<String>>>;

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// Advance the clock one frame and tick `scene`
fn step(scene: &mut Scene, app: &mut AppContext, canvas: &mut RecordingCanvas) {
    app.clock.advance(FRAME);
    scene.tick(app, canvas);
}

fn at(position: Vec2) -> GameObject {
    GameObject::new().with_component(Transform::from_position(position))
}

/// Controller that writes its tag every update
#[derive(Clone)]
struct Tagger {
    tag: &'static str,
    log: Log,
}

impl Component for Tagger {
    fn role(&self) -> Role {
        Role::Controller
    }

    fn update(&mut self, _object: &mut GameObject, _ctx: &mut UpdateContext<'_>) {
        self.log.borrow_mut().push(self.tag.to_string());
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Controller counting its updates
#[derive(Clone, Default)]
struct Ticks(u32);

impl Component for Ticks {
    fn role(&self) -> Role {
        Role::Controller
    }

    fn update(&mut self, _object: &mut GameObject, _ctx: &mut UpdateContext<'_>) {
        self.0 += 1;
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(Self(0))
    }
}

/// Viewer drawing a circle whose radius is its layer
#[derive(Clone)]
struct Dot(i32);

impl Component for Dot {
    fn role(&self) -> Role {
        Role::viewer(self.0)
    }

    fn display(&self, object: &GameObject, canvas: &mut dyn Canvas) {
        #[allow(clippy::cast_precision_loss)]
        let radius = self.0 as f32;
        let center = object.position().unwrap_or_else(Vec2::zeros);
        canvas.draw(DrawCommand::circle(center, radius, Color::WHITE));
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

fn drawn_radii(canvas: &RecordingCanvas) -> Vec<f32> {
    canvas
        .draws()
        .filter_map(|command| match command {
            DrawCommand::Circle { radius, .. } => Some(*radius),
            _ => None,
        })
        .collect()
}
