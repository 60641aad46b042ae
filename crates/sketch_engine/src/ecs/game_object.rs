//! GameObject: a typed bag of components
//!
//! Components are kept in attach order. A type-keyed index answers exact
//! lookups, and the viewer and controller lists are filled at attach time
//! so the per-frame passes never scan models.

use std::any::TypeId;
use std::collections::HashMap;

use super::component::{Component, ComponentFamily, Role};
use super::components::Transform;
use super::context::UpdateContext;
use crate::foundation::math::Vec2;
use crate::render::Canvas;

type DestroyCallback = Box<dyn FnMut()>;

struct ComponentSlot {
    /// `None` only while the component is detached for its own update
    component: Option<Box<dyn Component>>,
    started: bool,
}

/// An object in the world, made of components
#[derive(Default)]
pub struct GameObject {
    slots: Vec<ComponentSlot>,
    by_type: HashMap<TypeId, Vec<usize>>,
    viewers: Vec<usize>,
    controllers: Vec<usize>,
    initialized: bool,
    destroyed: bool,
    on_destroy: Vec<DestroyCallback>,
}

impl std::fmt::Debug for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let components: Vec<&str> = self
            .slots
            .iter()
            .filter_map(|slot| slot.component.as_deref())
            .map(|component| component.type_name())
            .collect();
        f.debug_struct("GameObject")
            .field("components", &components)
            .field("initialized", &self.initialized)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl GameObject {
    /// Create an empty, uninitialized object
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::add_component`]
    #[must_use]
    pub fn with_component(mut self, component: impl Component) -> Self {
        self.add_component(component);
        self
    }

    /// Attach a component
    ///
    /// If the object is already initialized the component starts right
    /// away, otherwise it starts with the object.
    pub fn add_component(&mut self, component: impl Component) {
        self.add_boxed(Box::new(component));
    }

    /// Attach an already boxed component
    pub fn add_boxed(&mut self, mut component: Box<dyn Component>) {
        let started = self.initialized;
        if started {
            component.start(self);
        }

        let index = self.slots.len();
        let type_id = (*component).as_any().type_id();
        match component.role() {
            Role::Viewer { .. } => self.viewers.push(index),
            Role::Controller => self.controllers.push(index),
            Role::Model => {}
        }
        self.by_type.entry(type_id).or_default().push(index);
        self.slots.push(ComponentSlot {
            component: Some(component),
            started,
        });
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.slots.len()
    }

    /// The `index`-th component of exactly type `T`
    ///
    /// A miss returns `None`; an index past the end also logs a warning.
    pub fn get_component<T: Component>(&self, index: usize) -> Option<&T> {
        let indices = self.by_type.get(&TypeId::of::<T>())?;
        let Some(&slot) = indices.get(index) else {
            log::warn!(
                "Index {} out of range when retrieving component '{}'",
                index,
                std::any::type_name::<T>()
            );
            return None;
        };
        self.slots[slot].component.as_deref()?.downcast_ref::<T>()
    }

    /// Mutable form of [`Self::get_component`]
    pub fn get_component_mut<T: Component>(&mut self, index: usize) -> Option<&mut T> {
        let indices = self.by_type.get(&TypeId::of::<T>())?;
        let Some(&slot) = indices.get(index) else {
            log::warn!(
                "Index {} out of range when retrieving component '{}'",
                index,
                std::any::type_name::<T>()
            );
            return None;
        };
        self.slots[slot].component.as_deref_mut()?.downcast_mut::<T>()
    }

    /// First component of exactly type `T`
    pub fn component<T: Component>(&self) -> Option<&T> {
        self.get_component(0)
    }

    /// Mutable form of [`Self::component`]
    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.get_component_mut(0)
    }

    /// True if at least one component of exactly type `T` is attached
    pub fn has_component<T: Component>(&self) -> bool {
        self.by_type
            .get(&TypeId::of::<T>())
            .is_some_and(|indices| !indices.is_empty())
    }

    /// Every component of exactly type `T`, in attach order
    pub fn get_components<T: Component>(&self) -> Vec<&T> {
        let Some(indices) = self.by_type.get(&TypeId::of::<T>()) else {
            return Vec::new();
        };
        indices
            .iter()
            .filter_map(|&slot| self.slots[slot].component.as_deref())
            .filter_map(|component| component.downcast_ref::<T>())
            .collect()
    }

    /// Every component belonging to family `F`, in attach order
    ///
    /// For a concrete component type this is the exact matches plus any
    /// component that exposes one through `upcast`; for a wider family
    /// such as [`AnyCollider`](super::component::AnyCollider) it is every
    /// member regardless of concrete type. Each component appears once.
    pub fn get_components_recursive<F: ComponentFamily>(&self) -> Vec<&F::Member> {
        self.slots
            .iter()
            .filter_map(|slot| slot.component.as_deref())
            .filter_map(|component| F::cast(component))
            .collect()
    }

    /// Mutable form of [`Self::get_components_recursive`]
    pub fn get_components_recursive_mut<F: ComponentFamily>(&mut self) -> Vec<&mut F::Member> {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.component.as_deref_mut())
            .filter_map(|component| F::cast_mut(component))
            .collect()
    }

    /// The object's Transform, if it has one
    pub fn transform(&self) -> Option<&Transform> {
        self.component::<Transform>()
    }

    /// Mutable access to the object's Transform
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.component_mut::<Transform>()
    }

    /// World position from the Transform, if any
    pub fn position(&self) -> Option<Vec2> {
        self.transform().map(|transform| transform.position)
    }

    /// Start every component that has not started yet
    ///
    /// Initializing twice is a no-op.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        for index in 0..self.slots.len() {
            if self.slots[index].started {
                continue;
            }
            let Some(mut component) = self.slots[index].component.take() else {
                continue;
            };
            component.start(self);
            self.slots[index].component = Some(component);
            self.slots[index].started = true;
        }
    }

    /// True once [`Self::initialize`] has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Update every controller in attach order, then animate every viewer
    ///
    /// Each controller is detached while it runs so it can borrow the
    /// object mutably. Controllers attached during the pass run in the
    /// same pass.
    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let mut position = 0;
        while position < self.controllers.len() {
            let index = self.controllers[position];
            position += 1;

            let Some(mut component) = self.slots[index].component.take() else {
                continue;
            };
            component.update(self, ctx);
            self.slots[index].component = Some(component);
        }

        let delta_time = ctx.delta_time();
        for &index in &self.viewers {
            if let Some(component) = self.slots[index].component.as_deref_mut() {
                component.animate(delta_time);
            }
        }
    }

    /// Draw every viewer on `layer`
    ///
    /// Returns true once `layer` is above every viewer's layer, i.e. this
    /// object has nothing left to draw for this or any higher layer.
    pub fn display_layer(&self, layer: u8, canvas: &mut dyn Canvas) -> bool {
        let mut highest: Option<u8> = None;
        for &index in &self.viewers {
            let Some(component) = self.slots[index].component.as_deref() else {
                continue;
            };
            let Some(view_layer) = component.role().view_layer() else {
                continue;
            };
            highest = Some(highest.map_or(view_layer, |h| h.max(view_layer)));
            if view_layer == layer {
                component.display(self, canvas);
            }
        }
        highest.map_or(true, |highest| layer > highest)
    }

    /// Highest layer any viewer currently sits on
    pub fn max_view_layer(&self) -> Option<u8> {
        self.viewers
            .iter()
            .filter_map(|&index| self.slots[index].component.as_deref())
            .filter_map(|component| component.role().view_layer())
            .max()
    }

    /// Flag the object as destroyed and run the destroy callbacks
    ///
    /// The Scene drops destroyed objects at the end of its update pass.
    /// Destroying an object that is already destroyed does nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for callback in &mut self.on_destroy {
            callback();
        }
    }

    /// True once [`Self::destroy`] has been called (and not undone by a restart)
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Register a callback run each time the object goes from live to destroyed
    pub fn on_destroy(&mut self, callback: impl FnMut() + 'static) {
        self.on_destroy.push(Box::new(callback));
    }

    /// Bring the object back to its started state
    ///
    /// Clears the destroyed flag and restarts every component. Restarting
    /// an object that was never initialized only logs a warning.
    pub fn restart(&mut self) {
        if !self.initialized {
            log::warn!("Cannot restart a GameObject before initialization");
            return;
        }
        self.destroyed = false;
        for slot in &mut self.slots {
            if let Some(component) = slot.component.as_deref_mut() {
                component.restart();
            }
        }
    }

    /// Uninitialized copy made of fresh clones of every component, in
    /// attach order
    ///
    /// Destroy callbacks are not copied.
    pub fn copy(&self) -> Self {
        let mut copy = Self::new();
        for component in self.slots.iter().filter_map(|slot| slot.component.as_deref()) {
            copy.add_boxed(component.clone_component());
        }
        copy
    }
}

/// Object with a default [`Transform`] followed by `components`
pub fn create_game_object(components: impl IntoIterator<Item = Box<dyn Component>>) -> GameObject {
    let mut object = GameObject::new();
    object.add_component(Transform::default());
    for component in components {
        object.add_boxed(component);
    }
    object
}
