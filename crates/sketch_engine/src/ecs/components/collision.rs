//! Collider components
//!
//! Colliders are controllers. Every frame each collider:
//!
//! 1. picks up the contacts other colliders found for it,
//! 2. asks the spatial index for objects inside its bounding box doubled,
//! 3. tests its own origin and sampled outline points against every
//!    collider on those objects, stopping at the first hit per collider,
//! 4. records each hit on itself and leaves the mirror contact for the
//!    other collider,
//! 5. fires `Enter` for contacts that are new since last frame and `Exit`
//!    for contacts that went away, then starts a fresh frame.
//!
//! The test is approximate: two shapes that overlap without any sampled
//! point of either landing inside the other are not reported, and fast
//! movers can pass through each other between frames.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::f32::consts::TAU;
use std::rc::Rc;

use crate::ecs::component::{AnyCollider, Component, Role};
use crate::ecs::context::UpdateContext;
use crate::ecs::GameObject;
use crate::foundation::math::{lerp_point, vec2, Rect, Vec2};
use crate::physics::{ColliderId, CollisionLayers, Contact};

/// Collision edge a listener can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderEvent {
    /// First frame two colliders touch
    Enter,
    /// First frame two colliders no longer touch
    Exit,
}

/// Callback fired on a collision edge
///
/// Receives the other side, the object owning this collider and the update
/// context of that object.
pub type ContactListener = Rc<dyn Fn(&Contact, &mut GameObject, &mut UpdateContext<'_>)>;

/// State shared by every collider shape
pub struct ColliderBody {
    id: Cell<Option<ColliderId>>,
    aabb: Rect,
    vertices: Vec<Vec2>,
    current: BTreeMap<ColliderId, Contact>,
    last: BTreeMap<ColliderId, Contact>,
    entered: Vec<Contact>,
    exited: Vec<Contact>,
    on_enter: Vec<ContactListener>,
    on_exit: Vec<ContactListener>,
    warned_no_transform: bool,
    /// Layers this collider sits on
    pub layer: CollisionLayers,
    /// Layers this collider reacts to
    pub mask: CollisionLayers,
}

impl std::fmt::Debug for ColliderBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColliderBody")
            .field("id", &self.id.get())
            .field("aabb", &self.aabb)
            .field("vertices", &self.vertices.len())
            .field("colliding", &self.last.len())
            .field("layer", &self.layer)
            .field("mask", &self.mask)
            .finish_non_exhaustive()
    }
}

impl ColliderBody {
    /// Body with the given local bounding box and outline samples
    pub fn new(aabb: Rect, vertices: Vec<Vec2>) -> Self {
        Self {
            id: Cell::new(None),
            aabb,
            vertices,
            current: BTreeMap::new(),
            last: BTreeMap::new(),
            entered: Vec::new(),
            exited: Vec::new(),
            on_enter: Vec::new(),
            on_exit: Vec::new(),
            warned_no_transform: false,
            layer: CollisionLayers::default(),
            mask: CollisionLayers::default(),
        }
    }

    /// Identity of this collider, assigned on first use
    pub fn id(&self) -> ColliderId {
        if let Some(id) = self.id.get() {
            return id;
        }
        let id = ColliderId::next();
        self.id.set(Some(id));
        id
    }

    /// Bounding box in local space
    pub fn aabb(&self) -> Rect {
        self.aabb
    }

    /// Sampled outline points in local space
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Replace the shape description
    pub fn set_shape(&mut self, aabb: Rect, vertices: Vec<Vec2>) {
        self.aabb = aabb;
        self.vertices = vertices;
    }

    /// Register a callback for an edge
    pub fn add_listener(
        &mut self,
        event: ColliderEvent,
        listener: impl Fn(&Contact, &mut GameObject, &mut UpdateContext<'_>) + 'static,
    ) {
        let listener: ContactListener = Rc::new(listener);
        match event {
            ColliderEvent::Enter => self.on_enter.push(listener),
            ColliderEvent::Exit => self.on_exit.push(listener),
        }
    }

    /// Number of listeners registered for an edge
    pub fn listener_count(&self, event: ColliderEvent) -> usize {
        match event {
            ColliderEvent::Enter => self.on_enter.len(),
            ColliderEvent::Exit => self.on_exit.len(),
        }
    }

    /// True if anything touched this collider in its last update
    pub fn is_colliding(&self) -> bool {
        !self.last.is_empty()
    }

    /// True if `other` touched this collider in its last update
    pub fn is_colliding_with(&self, other: ColliderId) -> bool {
        self.last.contains_key(&other)
    }

    /// Contacts from the last update, ordered by collider id
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.last.values()
    }

    /// Contacts that started in the last update
    pub fn entered(&self) -> &[Contact] {
        &self.entered
    }

    /// Contacts that ended in the last update
    pub fn exited(&self) -> &[Contact] {
        &self.exited
    }

    /// Record a contact for the frame in progress
    pub fn record(&mut self, contact: Contact) {
        self.current.entry(contact.collider).or_insert(contact);
    }

    /// Same shape, layers and listeners; fresh identity and no contacts
    pub fn fresh_copy(&self) -> Self {
        Self {
            on_enter: self.on_enter.clone(),
            on_exit: self.on_exit.clone(),
            layer: self.layer,
            mask: self.mask,
            ..Self::new(self.aabb, self.vertices.clone())
        }
    }

    /// Forget every contact
    pub fn clear_contacts(&mut self) {
        self.current.clear();
        self.last.clear();
        self.entered.clear();
        self.exited.clear();
    }

    /// Diff this frame against the last one and rotate
    fn finish_frame(&mut self) {
        self.entered = self
            .current
            .iter()
            .filter(|(id, _)| !self.last.contains_key(id))
            .map(|(_, contact)| *contact)
            .collect();
        self.exited = self
            .last
            .iter()
            .filter(|(id, _)| !self.current.contains_key(id))
            .map(|(_, contact)| *contact)
            .collect();
        self.last = std::mem::take(&mut self.current);
    }
}

/// Shape-specific part of a collider
pub trait Collider: 'static {
    /// Shared collider state
    fn body(&self) -> &ColliderBody;

    /// Mutable shared collider state
    fn body_mut(&mut self) -> &mut ColliderBody;

    /// True if the world-space `point` is inside the shape when the shape
    /// is centered on `origin`
    fn contains_point(&self, origin: Vec2, point: Vec2) -> bool;

    /// Identity of this collider
    fn id(&self) -> ColliderId {
        self.body().id()
    }
}

/// Run one frame of detection for `collider`, attached to `object`
pub fn update_collider<C: Collider>(collider: &mut C, object: &mut GameObject, ctx: &mut UpdateContext<'_>) {
    let Some(origin) = object.position() else {
        let body = collider.body_mut();
        if !body.warned_no_transform {
            log::warn!("Collider {} is attached to an object without a Transform", body.id());
            body.warned_no_transform = true;
        }
        return;
    };

    let my_id = collider.id();
    for contact in ctx.contacts.drain(my_id) {
        collider.body_mut().record(contact);
    }

    let body = collider.body();
    let broad = body.aabb.scaled(2.0).translated(origin);
    let samples: Vec<Vec2> = std::iter::once(origin)
        .chain(body.vertices.iter().map(|vertex| origin + vertex))
        .collect();
    let touches = |other: &dyn Collider, other_origin: Vec2| {
        let other_body = other.body();
        CollisionLayers::should_collide(body.layer, body.mask, other_body.layer, other_body.mask)
            && samples.iter().any(|point| other.contains_point(other_origin, *point))
    };

    let mut hits = Vec::new();
    for candidate in ctx.world.query(&broad) {
        if candidate == ctx.object_id {
            // Siblings on the same object; this collider is detached while
            // it updates so it never sees itself.
            for other in object.get_components_recursive::<AnyCollider>() {
                if touches(other, origin) {
                    hits.push(Contact {
                        object: candidate,
                        collider: other.id(),
                    });
                }
            }
        } else if let Some(other_object) = ctx.world.object(candidate) {
            if other_object.is_destroyed() {
                continue;
            }
            let Some(other_origin) = other_object.position() else {
                continue;
            };
            for other in other_object.get_components_recursive::<AnyCollider>() {
                if touches(other, other_origin) {
                    hits.push(Contact {
                        object: candidate,
                        collider: other.id(),
                    });
                }
            }
        }
    }

    let mirror = Contact {
        object: ctx.object_id,
        collider: my_id,
    };
    for hit in hits {
        collider.body_mut().record(hit);
        ctx.contacts.deliver(hit.collider, mirror);
    }

    let body = collider.body_mut();
    body.finish_frame();

    let entered = body.entered.clone();
    let exited = body.exited.clone();
    let on_enter = body.on_enter.clone();
    let on_exit = body.on_exit.clone();
    for contact in &entered {
        for listener in &on_enter {
            listener(contact, object, ctx);
        }
    }
    for contact in &exited {
        for listener in &on_exit {
            listener(contact, object, ctx);
        }
    }
}

/// Rectangular collider centered on its object
#[derive(Debug)]
pub struct RectCollider {
    body: ColliderBody,
    size: Vec2,
}

impl Default for RectCollider {
    fn default() -> Self {
        Self::new(vec2(50.0, 50.0))
    }
}

impl RectCollider {
    /// Rectangle of the given width and height
    pub fn new(size: Vec2) -> Self {
        let (aabb, vertices) = Self::shape(size);
        Self {
            body: ColliderBody::new(aabb, vertices),
            size,
        }
    }

    /// Set layer and mask (builder)
    #[must_use]
    pub fn with_layers(mut self, layer: CollisionLayers, mask: CollisionLayers) -> Self {
        self.body.layer = layer;
        self.body.mask = mask;
        self
    }

    /// Register a listener (builder)
    #[must_use]
    pub fn with_listener(
        mut self,
        event: ColliderEvent,
        listener: impl Fn(&Contact, &mut GameObject, &mut UpdateContext<'_>) + 'static,
    ) -> Self {
        self.body.add_listener(event, listener);
        self
    }

    /// Width and height
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Resize and resample the outline
    pub fn set_size(&mut self, size: Vec2) {
        let (aabb, vertices) = Self::shape(size);
        self.size = size;
        self.body.set_shape(aabb, vertices);
    }

    /// Corners plus `floor(edge * 0.06)` points along each pair of edges
    fn shape(size: Vec2) -> (Rect, Vec<Vec2>) {
        let half = size / 2.0;
        let top_left = vec2(-half.x, -half.y);
        let bottom_left = vec2(-half.x, half.y);
        let bottom_right = vec2(half.x, half.y);
        let top_right = vec2(half.x, -half.y);

        let mut vertices = vec![top_left, bottom_left, bottom_right, top_right];

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let x_points = (size.x * 0.06).floor().max(0.0) as usize;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let y_points = (size.y * 0.06).floor().max(0.0) as usize;

        for i in 0..x_points {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f32 / x_points as f32;
            vertices.push(lerp_point(top_left, top_right, t));
            vertices.push(lerp_point(bottom_left, bottom_right, t));
        }
        for i in 0..y_points {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f32 / y_points as f32;
            vertices.push(lerp_point(top_left, bottom_left, t));
            vertices.push(lerp_point(bottom_right, top_right, t));
        }

        (Rect::from_center(Vec2::zeros(), size), vertices)
    }
}

impl Collider for RectCollider {
    fn body(&self) -> &ColliderBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut ColliderBody {
        &mut self.body
    }

    fn contains_point(&self, origin: Vec2, point: Vec2) -> bool {
        self.body.aabb.contains_point(point - origin)
    }
}

impl Component for RectCollider {
    fn role(&self) -> Role {
        Role::Controller
    }

    fn restart(&mut self) {
        self.body.clear_contacts();
    }

    fn update(&mut self, object: &mut GameObject, ctx: &mut UpdateContext<'_>) {
        update_collider(self, object, ctx);
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(Self {
            body: self.body.fresh_copy(),
            size: self.size,
        })
    }

    fn as_collider(&self) -> Option<&(dyn Collider + 'static)> {
        Some(self)
    }

    fn as_collider_mut(&mut self) -> Option<&mut (dyn Collider + 'static)> {
        Some(self)
    }
}

/// Circular collider centered on its object
#[derive(Debug)]
pub struct CircleCollider {
    body: ColliderBody,
    radius: f32,
}

impl Default for CircleCollider {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl CircleCollider {
    /// Circle of the given radius
    pub fn new(radius: f32) -> Self {
        let (aabb, vertices) = Self::shape(radius);
        Self {
            body: ColliderBody::new(aabb, vertices),
            radius,
        }
    }

    /// Set layer and mask (builder)
    #[must_use]
    pub fn with_layers(mut self, layer: CollisionLayers, mask: CollisionLayers) -> Self {
        self.body.layer = layer;
        self.body.mask = mask;
        self
    }

    /// Register a listener (builder)
    #[must_use]
    pub fn with_listener(
        mut self,
        event: ColliderEvent,
        listener: impl Fn(&Contact, &mut GameObject, &mut UpdateContext<'_>) + 'static,
    ) -> Self {
        self.body.add_listener(event, listener);
        self
    }

    /// Radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Change the radius and resample the rim
    pub fn set_radius(&mut self, radius: f32) {
        let (aabb, vertices) = Self::shape(radius);
        self.radius = radius;
        self.body.set_shape(aabb, vertices);
    }

    /// `floor(0.4 * radius)` points evenly spaced on the rim
    fn shape(radius: f32) -> (Rect, Vec<Vec2>) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = (0.4 * radius).floor().max(0.0) as usize;
        let vertices = (0..count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let angle = TAU / count as f32 * i as f32;
                vec2(angle.cos() * radius, angle.sin() * radius)
            })
            .collect();
        (Rect::new(-radius, -radius, radius * 2.0, radius * 2.0), vertices)
    }
}

impl Collider for CircleCollider {
    fn body(&self) -> &ColliderBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut ColliderBody {
        &mut self.body
    }

    fn contains_point(&self, origin: Vec2, point: Vec2) -> bool {
        (point - origin).norm_squared() <= self.radius * self.radius
    }
}

impl Component for CircleCollider {
    fn role(&self) -> Role {
        Role::Controller
    }

    fn restart(&mut self) {
        self.body.clear_contacts();
    }

    fn update(&mut self, object: &mut GameObject, ctx: &mut UpdateContext<'_>) {
        update_collider(self, object, ctx);
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(Self {
            body: self.body.fresh_copy(),
            radius: self.radius,
        })
    }

    fn as_collider(&self) -> Option<&(dyn Collider + 'static)> {
        Some(self)
    }

    fn as_collider_mut(&mut self) -> Option<&mut (dyn Collider + 'static)> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_samples() {
        let collider = RectCollider::default();
        // 4 corners + 3 points on each of the 4 edges
        assert_eq!(collider.body().vertices().len(), 4 + 2 * 3 + 2 * 3);
        assert_eq!(collider.body().aabb(), Rect::new(-25.0, -25.0, 50.0, 50.0));
    }

    #[test]
    fn test_small_rect_has_only_corners() {
        let collider = RectCollider::new(vec2(10.0, 10.0));
        assert_eq!(collider.body().vertices().len(), 4);
    }

    #[test]
    fn test_circle_samples() {
        let collider = CircleCollider::new(10.0);
        assert_eq!(collider.body().vertices().len(), 4);
        for vertex in collider.body().vertices() {
            approx::assert_relative_eq!(vertex.norm(), 10.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let collider = RectCollider::new(vec2(50.0, 50.0));
        let origin = vec2(100.0, 100.0);
        assert!(collider.contains_point(origin, vec2(75.0, 75.0)));
        assert!(collider.contains_point(origin, vec2(124.9, 124.9)));
        assert!(!collider.contains_point(origin, vec2(125.0, 100.0)));
    }

    #[test]
    fn test_circle_contains_includes_rim() {
        let collider = CircleCollider::new(10.0);
        assert!(collider.contains_point(Vec2::zeros(), vec2(10.0, 0.0)));
        assert!(!collider.contains_point(Vec2::zeros(), vec2(7.5, 7.5)));
    }

    #[test]
    fn test_id_is_lazy_and_stable() {
        let collider = CircleCollider::default();
        assert!(collider.body.id.get().is_none());
        let id = collider.id();
        assert_eq!(collider.id(), id);
    }

    #[test]
    fn test_clone_gets_new_id_but_keeps_listeners() {
        let original = RectCollider::default()
            .with_listener(ColliderEvent::Enter, |_, _, _| {})
            .with_layers(CollisionLayers::ENEMY, CollisionLayers::PROJECTILE);
        let original_id = original.id();

        let copy = original.clone_component();
        let copy = copy.as_collider().unwrap();
        assert_ne!(copy.id(), original_id);
        assert_eq!(copy.body().listener_count(ColliderEvent::Enter), 1);
        assert_eq!(copy.body().layer, CollisionLayers::ENEMY);
    }

    #[test]
    fn test_finish_frame_diffs() {
        let mut body = ColliderBody::new(Rect::new(0.0, 0.0, 1.0, 1.0), Vec::new());
        let contact = Contact {
            object: crate::foundation::collections::ObjectId::default(),
            collider: ColliderId::next(),
        };

        body.record(contact);
        body.finish_frame();
        assert_eq!(body.entered(), &[contact]);
        assert!(body.is_colliding_with(contact.collider));

        body.record(contact);
        body.finish_frame();
        assert!(body.entered().is_empty());
        assert!(body.exited().is_empty());

        body.finish_frame();
        assert_eq!(body.exited(), &[contact]);
        assert!(!body.is_colliding());
    }
}
