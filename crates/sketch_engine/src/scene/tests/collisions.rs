use super::*;
use crate::ecs::components::{CircleCollider, Collider, ColliderEvent, RectCollider};
use crate::ecs::AnyCollider;
use crate::foundation::collections::ObjectId;
use crate::foundation::math::vec2;
use crate::physics::CollisionLayers;

fn logged_rect(tag: &'static str, log: &Log) -> RectCollider {
    let enter = Rc::clone(log);
    let exit = Rc::clone(log);
    RectCollider::new(vec2(50.0, 50.0))
        .with_listener(ColliderEvent::Enter, move |_, _, _| {
            enter.borrow_mut().push(format!("{tag} enter"));
        })
        .with_listener(ColliderEvent::Exit, move |_, _, _| {
            exit.borrow_mut().push(format!("{tag} exit"));
        })
}

fn logged_circle(tag: &'static str, log: &Log) -> CircleCollider {
    let enter = Rc::clone(log);
    let exit = Rc::clone(log);
    CircleCollider::new(10.0)
        .with_listener(ColliderEvent::Enter, move |_, _, _| {
            enter.borrow_mut().push(format!("{tag} enter"));
        })
        .with_listener(ColliderEvent::Exit, move |_, _, _| {
            exit.borrow_mut().push(format!("{tag} exit"));
        })
}

fn move_to(scene: &mut Scene, id: ObjectId, position: Vec2) {
    if let Some(transform) = scene.object_mut(id).and_then(GameObject::transform_mut) {
        transform.position = position;
    }
}

struct Fixture {
    scene: Scene,
    app: AppContext,
    canvas: RecordingCanvas,
    log: Log,
    rect: ObjectId,
    circle: ObjectId,
}

impl Fixture {
    /// Rect at the origin and a circle at (100, 100), added in the given order
    fn new(rect_first: bool) -> Self {
        let log = new_log();
        let mut scene = Scene::empty();
        let rect_object = at(Vec2::zeros()).with_component(logged_rect("rect", &log));
        let circle_object = at(vec2(100.0, 100.0)).with_component(logged_circle("circle", &log));

        let (rect, circle) = if rect_first {
            let rect = scene.add_game_object(rect_object);
            (rect, scene.add_game_object(circle_object))
        } else {
            let circle = scene.add_game_object(circle_object);
            (scene.add_game_object(rect_object), circle)
        };

        let mut app = AppContext::default();
        scene.initialize(&mut app);
        Self {
            scene,
            app,
            canvas: RecordingCanvas::new(800.0, 600.0),
            log,
            rect,
            circle,
        }
    }

    fn step(&mut self, frames: usize) {
        for _ in 0..frames {
            step(&mut self.scene, &mut self.app, &mut self.canvas);
        }
    }

    fn count(&self, line: &str) -> usize {
        self.log.borrow().iter().filter(|entry| entry.as_str() == line).count()
    }
}

#[test]
fn test_far_apart_shapes_do_not_collide() {
    let mut fixture = Fixture::new(true);
    fixture.step(5);
    assert!(entries(&fixture.log).is_empty());

    let rect = fixture.scene.object(fixture.rect).unwrap();
    let colliders = rect.get_components_recursive::<AnyCollider>();
    assert_eq!(colliders.len(), 1);
    assert!(!colliders[0].body().is_colliding());
}

#[test]
fn test_moving_into_overlap_enters_on_both_sides() {
    let mut fixture = Fixture::new(true);
    fixture.step(2);

    let circle = fixture.circle;
    move_to(&mut fixture.scene, circle, vec2(10.0, 10.0));
    fixture.step(1);

    // The circle updates first and hands its contact to the rect, which
    // picks it up later in the same pass.
    assert_eq!(entries(&fixture.log), vec!["circle enter", "rect enter"]);

    let circle_collider_id = fixture
        .scene
        .object(circle)
        .and_then(|object| object.component::<CircleCollider>())
        .map(Collider::id)
        .unwrap();
    let rect = fixture.scene.object(fixture.rect).unwrap();
    let rect_collider = rect.component::<RectCollider>().unwrap();
    assert!(rect_collider.body().is_colliding_with(circle_collider_id));
    assert_eq!(rect_collider.body().contacts().next().map(|contact| contact.object), Some(circle));
}

#[test]
fn test_update_order_only_delays_the_mirror_side() {
    let mut fixture = Fixture::new(false);
    let circle = fixture.circle;
    move_to(&mut fixture.scene, circle, vec2(10.0, 10.0));

    fixture.step(1);
    assert_eq!(entries(&fixture.log), vec!["circle enter"]);

    fixture.step(1);
    assert_eq!(entries(&fixture.log), vec!["circle enter", "rect enter"]);
}

#[test]
fn test_enter_and_exit_fire_exactly_once() {
    for rect_first in [true, false] {
        let mut fixture = Fixture::new(rect_first);
        let circle = fixture.circle;

        move_to(&mut fixture.scene, circle, vec2(10.0, 10.0));
        fixture.step(30);
        assert_eq!(fixture.count("rect enter"), 1);
        assert_eq!(fixture.count("circle enter"), 1);
        assert_eq!(fixture.count("rect exit"), 0);

        move_to(&mut fixture.scene, circle, vec2(300.0, 300.0));
        fixture.step(30);
        assert_eq!(fixture.count("rect exit"), 1);
        assert_eq!(fixture.count("circle exit"), 1);
        assert_eq!(fixture.count("rect enter"), 1);

        move_to(&mut fixture.scene, circle, vec2(-5.0, 0.0));
        fixture.step(30);
        assert_eq!(fixture.count("rect enter"), 2);
        assert_eq!(fixture.count("circle enter"), 2);
    }
}

#[test]
fn test_layers_filter_contacts() {
    let log = new_log();
    let mut scene = Scene::empty();
    let friendly = logged_rect("a", &log).with_layers(CollisionLayers::PLAYER, CollisionLayers::ENEMY);
    let also_friendly = logged_circle("b", &log).with_layers(CollisionLayers::PLAYER, CollisionLayers::ENEMY);
    scene.add_game_object(at(Vec2::zeros()).with_component(friendly));
    scene.add_game_object(at(vec2(5.0, 5.0)).with_component(also_friendly));

    let mut app = AppContext::default();
    let mut canvas = RecordingCanvas::new(800.0, 600.0);
    scene.initialize(&mut app);
    for _ in 0..5 {
        step(&mut scene, &mut app, &mut canvas);
    }
    assert!(entries(&log).is_empty());
}

#[test]
fn test_sibling_colliders_see_each_other() {
    let log = new_log();
    let mut scene = Scene::empty();
    scene.add_game_object(
        at(Vec2::zeros())
            .with_component(logged_rect("outer", &log))
            .with_component(logged_circle("inner", &log)),
    );

    let mut app = AppContext::default();
    let mut canvas = RecordingCanvas::new(800.0, 600.0);
    scene.initialize(&mut app);
    step(&mut scene, &mut app, &mut canvas);
    step(&mut scene, &mut app, &mut canvas);

    let log = entries(&log);
    assert!(log.contains(&"outer enter".to_string()));
    assert!(log.contains(&"inner enter".to_string()));
}

#[test]
fn test_listener_can_destroy_both_sides() {
    let mut scene = Scene::empty();
    let bullet = CircleCollider::new(10.0).with_listener(ColliderEvent::Enter, |contact, object, ctx| {
        object.destroy();
        ctx.commands.destroy(contact.object);
    });
    let enemy = scene.add_game_object(at(Vec2::zeros()).with_component(RectCollider::default()));
    let bullet = scene.add_game_object(at(vec2(5.0, 0.0)).with_component(bullet));

    let mut app = AppContext::default();
    let mut canvas = RecordingCanvas::new(800.0, 600.0);
    scene.initialize(&mut app);
    step(&mut scene, &mut app, &mut canvas);

    assert!(scene.object(bullet).is_none());
    assert!(scene.object(enemy).is_none());
    assert_eq!(scene.object_count(), 0);
}

#[test]
fn test_destroyed_partner_ends_contact() {
    let mut fixture = Fixture::new(true);
    let circle = fixture.circle;
    move_to(&mut fixture.scene, circle, vec2(10.0, 10.0));
    fixture.step(3);
    assert_eq!(fixture.count("rect enter"), 1);

    fixture.scene.destroy_object(circle);
    fixture.step(3);
    assert!(fixture.scene.object(circle).is_none());
    assert_eq!(fixture.count("rect exit"), 1);
    // The destroyed side never updates again
    assert_eq!(fixture.count("circle exit"), 0);
}

#[test]
fn test_prefab_copies_collide_with_fresh_identities() {
    use crate::ecs::GamePrefab;

    let log = new_log();
    let mut scene = Scene::empty();
    let prefab = GamePrefab::new(at(Vec2::zeros()).with_component(logged_circle("pellet", &log))).unwrap();
    let prefab = scene.bind_prefab(prefab);

    let mut app = AppContext::default();
    let mut canvas = RecordingCanvas::new(800.0, 600.0);
    scene.initialize(&mut app);

    let first = scene.spawn_at(prefab, vec2(0.0, 0.0)).unwrap();
    let second = scene.spawn_at(prefab, vec2(4.0, 0.0)).unwrap();
    step(&mut scene, &mut app, &mut canvas);
    step(&mut scene, &mut app, &mut canvas);

    let id_of = |id| {
        scene
            .object(id)
            .and_then(|object| object.component::<CircleCollider>())
            .map(Collider::id)
    };
    assert_ne!(id_of(first), id_of(second));
    assert_eq!(entries(&log), vec!["pellet enter", "pellet enter"]);
}
