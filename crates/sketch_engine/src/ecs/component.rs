//! Component trait and role tagging
//!
//! A component is a unit of data or behavior owned by exactly one
//! GameObject. Each component plays one role:
//!
//! - **Model**: passive data (e.g. [`Transform`](super::components::Transform))
//! - **Viewer**: drawn every frame on a view layer
//! - **Controller**: updated every frame
//!
//! Lookups by type go through [`ComponentFamily`]. Every concrete
//! component is its own family; wider families such as
//! [`AnyCollider`] are declared statically and resolved through the
//! capability hooks on [`Component`].

use std::any::{Any, TypeId};

use crate::core::config::MAX_VIEW_LAYER;
use crate::ecs::components::collision::Collider;
use crate::ecs::context::UpdateContext;
use crate::ecs::game_object::GameObject;
use crate::render::Canvas;

/// Access to `dyn Any` for trait objects
pub trait AsAny: Any {
    /// Borrow as `dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Name of the concrete type, for diagnostics
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Role a component plays for its GameObject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Passive data holder
    Model,
    /// Drawn every frame; higher layers draw on top
    Viewer {
        /// Draw-order bucket in `0..=MAX_VIEW_LAYER`
        layer: u8,
    },
    /// Updated every frame
    Controller,
}

impl Role {
    /// Viewer role with the layer clamped into `0..=MAX_VIEW_LAYER`
    pub fn viewer(layer: i32) -> Self {
        let clamped = layer.clamp(0, i32::from(MAX_VIEW_LAYER));
        Self::Viewer {
            layer: u8::try_from(clamped).unwrap_or(MAX_VIEW_LAYER),
        }
    }

    /// The view layer, for viewers
    pub fn view_layer(self) -> Option<u8> {
        match self {
            Self::Viewer { layer } => Some(layer),
            _ => None,
        }
    }

    /// True for viewers
    pub fn is_viewer(self) -> bool {
        matches!(self, Self::Viewer { .. })
    }

    /// True for controllers
    pub fn is_controller(self) -> bool {
        matches!(self, Self::Controller)
    }
}

/// Behavior or data attached to a GameObject
///
/// Components are constructed uninitialized. `start` runs once, when the
/// owning object is initialized (or immediately if the component is
/// attached to an object that is already live).
pub trait Component: AsAny + 'static {
    /// Role of this component; may change over time for viewers that move
    /// between layers
    fn role(&self) -> Role {
        Role::Model
    }

    /// One-time setup with access to the owning object
    fn start(&mut self, _object: &mut GameObject) {}

    /// Return to the freshly started state
    fn restart(&mut self) {}

    /// Per-frame update, called for controllers only
    ///
    /// While this runs the component is detached from `object`, so sibling
    /// lookups never alias it.
    fn update(&mut self, _object: &mut GameObject, _ctx: &mut UpdateContext<'_>) {}

    /// Advance visual state such as animation frames, called for viewers
    /// during the update pass
    ///
    /// Paused scenes skip the update pass, so animations freeze with them.
    fn animate(&mut self, _delta_time: f32) {}

    /// Per-frame draw, called for viewers only
    fn display(&self, _object: &GameObject, _canvas: &mut dyn Canvas) {}

    /// Structurally independent copy that has not been started
    fn clone_component(&self) -> Box<dyn Component>;

    /// Collider capability
    fn as_collider(&self) -> Option<&(dyn Collider + 'static)> {
        None
    }

    /// Mutable collider capability
    fn as_collider_mut(&mut self) -> Option<&mut (dyn Collider + 'static)> {
        None
    }

    /// Expose an embedded component of another type, so that lookups for
    /// that type also find this one
    fn upcast(&self, _target: TypeId) -> Option<&dyn Any> {
        None
    }

    /// Mutable counterpart of [`Component::upcast`]
    fn upcast_mut(&mut self, _target: TypeId) -> Option<&mut dyn Any> {
        None
    }
}

// `AsAny` is implemented for every `T: Any`, references included, so these
// helpers dispatch through `*self` to reach the concrete component.
impl dyn Component {
    /// True if the concrete type is `T`
    pub fn is<T: Component>(&self) -> bool {
        (*self).as_any().is::<T>()
    }

    /// Downcast to the concrete type
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        (*self).as_any().downcast_ref::<T>()
    }

    /// Mutably downcast to the concrete type
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        (*self).as_any_mut().downcast_mut::<T>()
    }
}

impl std::fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("type", &(*self).type_name())
            .field("role", &self.role())
            .finish()
    }
}

/// A set of component types that can be looked up together
pub trait ComponentFamily: 'static {
    /// What a lookup yields for each member
    type Member: ?Sized;

    /// Borrow `component` as a member, if it belongs to the family
    fn cast(component: &dyn Component) -> Option<&Self::Member>;

    /// Mutably borrow `component` as a member
    fn cast_mut(component: &mut dyn Component) -> Option<&mut Self::Member>;
}

impl<T: Component> ComponentFamily for T {
    type Member = T;

    fn cast(component: &dyn Component) -> Option<&T> {
        if let Some(exact) = component.downcast_ref::<T>() {
            return Some(exact);
        }
        component
            .upcast(TypeId::of::<T>())
            .and_then(|any| any.downcast_ref::<T>())
    }

    fn cast_mut(component: &mut dyn Component) -> Option<&mut T> {
        if component.is::<T>() {
            return component.downcast_mut::<T>();
        }
        component
            .upcast_mut(TypeId::of::<T>())
            .and_then(|any| any.downcast_mut::<T>())
    }
}

/// Every collider shape, whatever its concrete type
#[derive(Debug, Clone, Copy)]
pub struct AnyCollider;

impl ComponentFamily for AnyCollider {
    type Member = dyn Collider;

    fn cast(component: &dyn Component) -> Option<&(dyn Collider + 'static)> {
        component.as_collider()
    }

    fn cast_mut(component: &mut dyn Component) -> Option<&mut (dyn Collider + 'static)> {
        component.as_collider_mut()
    }
}
