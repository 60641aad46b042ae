//! Frame animations
//!
//! An [`Animation`] is a list of image asset names shown one after the
//! other. Two viewers play them:
//!
//! - [`Animator`] plays a single animation
//! - [`AnimationTree`] is a small state machine: each state is an
//!   [`AnimationSelector`] and named events move between states
//!
//! Both advance in the update pass through [`Component::animate`] and draw
//! the current frame as a [`DrawCommand::Image`] placed, sized and rotated
//! by the object's Transform.

use std::collections::HashMap;
use std::rc::Rc;

use crate::assets::AssetRegistry;
use crate::ecs::component::{Component, Role};
use crate::ecs::GameObject;
use crate::engine::EngineError;
use crate::events::EventArg;
use crate::foundation::math::{vec2, Vec2, Vec2Ext};
use crate::render::{Canvas, DrawCommand};

/// Tree property that [`DirectionalAnimation`] follows, as an
/// [`EventArg::Position`]
pub const DIRECTION_PROPERTY: &str = "direction";

/// Frames shown for equal shares of a total duration
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    frames: Vec<String>,
    frame_duration: f32,
    timer: f32,
    current: usize,
    looping: bool,
}

impl Animation {
    /// Looping animation over `frames`, lasting `duration` seconds per cycle
    pub fn new<S: Into<String>>(frames: impl IntoIterator<Item = S>, duration: f32) -> Self {
        let frames: Vec<String> = frames.into_iter().map(Into::into).collect();
        #[allow(clippy::cast_precision_loss)]
        let frame_duration = if frames.is_empty() {
            f32::INFINITY
        } else {
            duration.max(0.0) / frames.len() as f32
        };

        Self {
            frames,
            frame_duration,
            timer: 0.0,
            current: 0,
            looping: true,
        }
    }

    /// Like [`Self::new`], but every frame has to be a registered asset
    pub fn from_assets<S: Into<String>>(
        assets: &AssetRegistry,
        frames: impl IntoIterator<Item = S>,
        duration: f32,
    ) -> Result<Self, EngineError> {
        let animation = Self::new(frames, duration);
        if let Some(missing) = animation.frames.iter().find(|name| !assets.contains(name)) {
            return Err(EngineError::MissingAsset(missing.clone()));
        }
        Ok(animation)
    }

    /// Hold the last frame instead of wrapping around (builder)
    #[must_use]
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Advance the frame timer by `delta_time` seconds
    ///
    /// Steps at most one frame per call; the timer starts over on each step.
    pub fn update(&mut self, delta_time: f32) {
        if self.frames.is_empty() {
            return;
        }
        self.timer += delta_time;
        if self.timer < self.frame_duration {
            return;
        }

        self.timer = 0.0;
        if !self.looping && self.on_last_frame() {
            return;
        }
        self.current = (self.current + 1) % self.frames.len();
    }

    /// Back to the first frame
    pub fn restart(&mut self) {
        self.current = 0;
        self.timer = 0.0;
    }

    /// Asset name of the frame on show
    pub fn frame(&self) -> Option<&str> {
        self.frames.get(self.current).map(String::as_str)
    }

    /// Index of the frame on show
    pub fn frame_index(&self) -> usize {
        self.current
    }

    /// Number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// True for a non-looping animation holding its last frame
    pub fn is_finished(&self) -> bool {
        !self.looping && self.on_last_frame()
    }

    fn on_last_frame(&self) -> bool {
        self.current + 1 == self.frames.len()
    }

    fn draw(&self, object: &GameObject, canvas: &mut dyn Canvas) {
        let (Some(frame), Some(transform)) = (self.frame(), object.transform()) else {
            return;
        };
        canvas.draw(DrawCommand::Image {
            asset: frame.to_owned(),
            center: transform.position,
            size: transform.scale,
            rotation: transform.rotation,
        });
    }
}

/// Chooses which animation an [`AnimationTree`] state plays
pub trait AnimationSelector: std::fmt::Debug {
    /// Animation currently chosen
    fn animation(&self) -> Option<&Animation>;

    /// Mutable access to the chosen animation
    fn animation_mut(&mut self) -> Option<&mut Animation>;

    /// Restart every animation this selector holds
    fn restart(&mut self);

    /// A property of the owning tree changed
    fn property_changed(&mut self, _name: &str, _value: &EventArg) {}

    /// Independent copy, used when the owning tree is cloned
    fn clone_selector(&self) -> Box<dyn AnimationSelector>;
}

/// Animations picked by name
#[derive(Debug, Clone, Default)]
pub struct NamedAnimations {
    animations: Vec<(String, Animation)>,
    current: Option<usize>,
}

impl NamedAnimations {
    /// Empty selector
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an animation; names already present are left alone
    ///
    /// The first animation added becomes the current one.
    pub fn add_animation(&mut self, name: impl Into<String>, animation: Animation) {
        let name = name.into();
        if self.index_of(&name).is_some() {
            return;
        }
        self.set_animation(name, animation);
    }

    /// Insert an animation or replace the one stored under `name`
    pub fn set_animation(&mut self, name: impl Into<String>, animation: Animation) {
        let name = name.into();
        match self.index_of(&name) {
            Some(index) => self.animations[index].1 = animation,
            None => {
                self.animations.push((name, animation));
                if self.current.is_none() {
                    self.current = Some(self.animations.len() - 1);
                }
            }
        }
    }

    /// Play the animation called `name`; false if there is none
    pub fn set_current(&mut self, name: &str) -> bool {
        let Some(index) = self.index_of(name) else {
            log::warn!("No animation named '{}'", name);
            return false;
        };
        self.current = Some(index);
        true
    }

    /// Name of the animation being played
    pub fn current_name(&self) -> Option<&str> {
        self.current.map(|index| self.animations[index].0.as_str())
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.animations.iter().position(|(stored, _)| stored == name)
    }
}

impl AnimationSelector for NamedAnimations {
    fn animation(&self) -> Option<&Animation> {
        self.current.map(|index| &self.animations[index].1)
    }

    fn animation_mut(&mut self) -> Option<&mut Animation> {
        let index = self.current?;
        self.animations.get_mut(index).map(|(_, animation)| animation)
    }

    fn restart(&mut self) {
        for (_, animation) in &mut self.animations {
            animation.restart();
        }
    }

    fn clone_selector(&self) -> Box<dyn AnimationSelector> {
        Box::new(self.clone())
    }
}

/// Animations picked by heading
///
/// Listens to the [`DIRECTION_PROPERTY`] of its tree and plays the
/// animation whose direction points most nearly the same way.
#[derive(Debug, Clone, Default)]
pub struct DirectionalAnimation {
    animations: NamedAnimations,
    directions: Vec<(String, Vec2)>,
}

impl DirectionalAnimation {
    /// Empty selector
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the animation played when heading along `direction`
    pub fn add_animation(&mut self, name: impl Into<String>, animation: Animation, direction: Vec2) {
        let name = name.into();
        match self.directions.iter_mut().find(|(stored, _)| *stored == name) {
            Some((_, stored)) => *stored = direction,
            None => self.directions.push((name.clone(), direction)),
        }
        self.animations.set_animation(name, animation);
    }

    /// Switch to the animation closest to `heading`
    ///
    /// A zero heading keeps the current animation.
    pub fn update_direction(&mut self, heading: Vec2) {
        if heading.is_zero() {
            return;
        }

        let mut best_similarity = -1.0;
        let mut best = None;
        for (name, direction) in &self.directions {
            let similarity = direction.dot(&heading);
            if similarity > best_similarity {
                best_similarity = similarity;
                best = Some(name);
            }
        }
        if let Some(name) = best.cloned() {
            self.animations.set_current(&name);
        }
    }

    /// Name of the animation being played
    pub fn current_name(&self) -> Option<&str> {
        self.animations.current_name()
    }
}

impl AnimationSelector for DirectionalAnimation {
    fn animation(&self) -> Option<&Animation> {
        self.animations.animation()
    }

    fn animation_mut(&mut self) -> Option<&mut Animation> {
        self.animations.animation_mut()
    }

    fn restart(&mut self) {
        self.animations.restart();
    }

    fn property_changed(&mut self, name: &str, value: &EventArg) {
        if name != DIRECTION_PROPERTY {
            return;
        }
        if let EventArg::Position(x, y) = value {
            self.update_direction(vec2(*x, *y));
        }
    }

    fn clone_selector(&self) -> Box<dyn AnimationSelector> {
        Box::new(self.clone())
    }
}

/// Callback run when a tree property is set
pub type PropertyListener = Rc<dyn Fn(&EventArg)>;

#[derive(Clone, Default)]
struct Property {
    value: Option<EventArg>,
    listeners: Vec<PropertyListener>,
}

#[derive(Debug, Clone)]
struct StateTransition {
    target: String,
    event: String,
}

struct AnimationState {
    name: String,
    selector: Box<dyn AnimationSelector>,
    transitions: Vec<StateTransition>,
}

/// Viewer that moves between animation states on named events
///
/// The first state added is the starting state. Clones share property
/// listeners with the tree they were cloned from.
pub struct AnimationTree {
    layer: i32,
    states: Vec<AnimationState>,
    current: Option<usize>,
    properties: HashMap<String, Property>,
}

impl std::fmt::Debug for AnimationTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let states: Vec<&str> = self.states.iter().map(|state| state.name.as_str()).collect();
        f.debug_struct("AnimationTree")
            .field("layer", &self.layer)
            .field("states", &states)
            .field("current", &self.current_state())
            .finish()
    }
}

impl AnimationTree {
    /// Empty tree drawn on view layer `layer`
    pub fn new(layer: i32) -> Self {
        Self {
            layer,
            states: Vec::new(),
            current: None,
            properties: HashMap::new(),
        }
    }

    /// Add a state; names already present are left alone
    pub fn add_state(&mut self, name: impl Into<String>, selector: impl AnimationSelector + 'static) {
        let name = name.into();
        if self.state_index(&name).is_some() {
            return;
        }
        self.states.push(AnimationState {
            name,
            selector: Box::new(selector),
            transitions: Vec::new(),
        });
        if self.current.is_none() {
            self.current = Some(0);
        }
    }

    /// Builder form of [`Self::add_state`]
    #[must_use]
    pub fn with_state(mut self, name: impl Into<String>, selector: impl AnimationSelector + 'static) -> Self {
        self.add_state(name, selector);
        self
    }

    /// Move from state `from` to state `to` when `event` is raised
    ///
    /// Ignored (with a warning) when either state is unknown.
    pub fn add_transition(&mut self, from: &str, to: &str, event: impl Into<String>) {
        if self.state_index(to).is_none() {
            log::warn!("Animation transition to unknown state '{}'", to);
            return;
        }
        let Some(index) = self.state_index(from) else {
            log::warn!("Animation transition from unknown state '{}'", from);
            return;
        };
        self.states[index].transitions.push(StateTransition {
            target: to.to_owned(),
            event: event.into(),
        });
    }

    /// Follow the first transition out of the current state that listens
    /// to `event`
    ///
    /// Returns true if the state changed.
    pub fn transition(&mut self, event: &str) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let target = self.states[current]
            .transitions
            .iter()
            .find(|transition| transition.event == event)
            .and_then(|transition| self.state_index(&transition.target));

        match target {
            Some(target) => {
                self.current = Some(target);
                true
            }
            None => false,
        }
    }

    /// Name of the state being played
    pub fn current_state(&self) -> Option<&str> {
        self.current.map(|index| self.states[index].name.as_str())
    }

    /// Animation chosen by the current state
    pub fn current_animation(&self) -> Option<&Animation> {
        self.current.and_then(|index| self.states[index].selector.animation())
    }

    /// Set a property, telling every state and every listener
    pub fn set_property(&mut self, name: &str, value: EventArg) {
        for state in &mut self.states {
            state.selector.property_changed(name, &value);
        }
        let property = self.properties.entry(name.to_owned()).or_default();
        for listener in &property.listeners {
            listener(&value);
        }
        property.value = Some(value);
    }

    /// Last value set for property `name`
    pub fn property(&self, name: &str) -> Option<&EventArg> {
        self.properties.get(name)?.value.as_ref()
    }

    /// Run `listener` every time property `name` is set
    pub fn add_property_listener(&mut self, name: &str, listener: impl Fn(&EventArg) + 'static) {
        self.properties
            .entry(name.to_owned())
            .or_default()
            .listeners
            .push(Rc::new(listener));
    }

    fn state_index(&self, name: &str) -> Option<usize> {
        self.states.iter().position(|state| state.name == name)
    }
}

impl Component for AnimationTree {
    fn role(&self) -> Role {
        Role::viewer(self.layer)
    }

    fn restart(&mut self) {
        self.current = if self.states.is_empty() { None } else { Some(0) };
        for state in &mut self.states {
            state.selector.restart();
        }
    }

    fn animate(&mut self, delta_time: f32) {
        let Some(current) = self.current else {
            return;
        };
        if let Some(animation) = self.states[current].selector.animation_mut() {
            animation.update(delta_time);
        }
    }

    fn display(&self, object: &GameObject, canvas: &mut dyn Canvas) {
        if let Some(animation) = self.current_animation() {
            animation.draw(object, canvas);
        }
    }

    fn clone_component(&self) -> Box<dyn Component> {
        let states = self
            .states
            .iter()
            .map(|state| AnimationState {
                name: state.name.clone(),
                selector: state.selector.clone_selector(),
                transitions: state.transitions.clone(),
            })
            .collect();

        let mut copy = Self {
            layer: self.layer,
            states,
            current: None,
            properties: self.properties.clone(),
        };
        copy.restart();
        Box::new(copy)
    }
}

/// Viewer playing a single animation
#[derive(Debug, Clone)]
pub struct Animator {
    animation: Animation,
    layer: i32,
}

impl Animator {
    /// Play `animation` on view layer `layer`
    pub fn new(animation: Animation, layer: i32) -> Self {
        Self { animation, layer }
    }

    /// The animation being played
    pub fn animation(&self) -> &Animation {
        &self.animation
    }
}

impl Component for Animator {
    fn role(&self) -> Role {
        Role::viewer(self.layer)
    }

    fn restart(&mut self) {
        self.animation.restart();
    }

    fn animate(&mut self, delta_time: f32) {
        self.animation.update(delta_time);
    }

    fn display(&self, object: &GameObject, canvas: &mut dyn Canvas) {
        self.animation.draw(object, canvas);
    }

    fn clone_component(&self) -> Box<dyn Component> {
        let mut copy = self.clone();
        copy.animation.restart();
        Box::new(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Transform;
    use crate::render::RecordingCanvas;
    use std::cell::Cell;

    fn walk() -> Animation {
        Animation::new(["walk_0", "walk_1", "walk_2"], 0.75)
    }

    fn frames_after(animation: &mut Animation, steps: usize, delta_time: f32) -> Vec<usize> {
        (0..steps)
            .map(|_| {
                animation.update(delta_time);
                animation.frame_index()
            })
            .collect()
    }

    #[test]
    fn test_frames_step_once_per_frame_duration() {
        let mut animation = walk();
        assert_eq!(animation.frame(), Some("walk_0"));
        assert_eq!(frames_after(&mut animation, 4, 0.125), vec![0, 1, 1, 2]);
        assert_eq!(animation.frame(), Some("walk_2"));
    }

    #[test]
    fn test_looping_wraps_and_one_shot_holds() {
        let mut looping = walk();
        assert_eq!(frames_after(&mut looping, 4, 0.25), vec![1, 2, 0, 1]);

        let mut once = walk().with_looping(false);
        assert_eq!(frames_after(&mut once, 4, 0.25), vec![1, 2, 2, 2]);
        assert!(once.is_finished());

        once.restart();
        assert_eq!(once.frame_index(), 0);
        assert!(!once.is_finished());
    }

    #[test]
    fn test_empty_animation_has_no_frame() {
        let mut animation = Animation::new(Vec::<String>::new(), 1.0);
        animation.update(10.0);
        assert_eq!(animation.frame(), None);
        assert_eq!(animation.frame_count(), 0);
    }

    #[test]
    fn test_frames_must_be_registered_assets() {
        let mut assets = AssetRegistry::new();
        assets.register("walk_0", ()).unwrap();
        assets.register("walk_1", ()).unwrap();

        assert!(Animation::from_assets(&assets, ["walk_0", "walk_1"], 0.2).is_ok());
        let err = Animation::from_assets(&assets, ["walk_0", "walk_9"], 0.2).unwrap_err();
        assert!(matches!(err, EngineError::MissingAsset(name) if name == "walk_9"));
    }

    #[test]
    fn test_named_animations_keep_first_and_switch() {
        let mut named = NamedAnimations::new();
        named.add_animation("idle", Animation::new(["idle"], 1.0));
        named.add_animation("run", walk());
        named.add_animation("idle", walk());
        assert_eq!(named.current_name(), Some("idle"));
        assert_eq!(named.animation().map(Animation::frame_count), Some(1));

        assert!(named.set_current("run"));
        assert!(!named.set_current("fly"));
        assert_eq!(named.current_name(), Some("run"));
    }

    #[test]
    fn test_directional_picks_closest_heading() {
        let mut directional = DirectionalAnimation::new();
        directional.add_animation("right", walk(), vec2(1.0, 0.0));
        directional.add_animation("up", walk(), vec2(0.0, -1.0));
        directional.add_animation("left", walk(), vec2(-1.0, 0.0));
        assert_eq!(directional.current_name(), Some("right"));

        directional.property_changed(DIRECTION_PROPERTY, &EventArg::Position(-0.9, -0.2));
        assert_eq!(directional.current_name(), Some("left"));

        directional.update_direction(Vec2::zeros());
        assert_eq!(directional.current_name(), Some("left"));

        directional.property_changed("speed", &EventArg::Position(0.0, -1.0));
        assert_eq!(directional.current_name(), Some("left"));
    }

    fn idle_run_tree() -> AnimationTree {
        let mut idle = NamedAnimations::new();
        idle.add_animation("idle", Animation::new(["idle_0", "idle_1"], 1.0));
        let mut run = DirectionalAnimation::new();
        run.add_animation("run_right", Animation::new(["right_0", "right_1"], 0.5), vec2(1.0, 0.0));
        run.add_animation("run_left", Animation::new(["left_0", "left_1"], 0.5), vec2(-1.0, 0.0));

        let mut tree = AnimationTree::new(4).with_state("idle", idle).with_state("run", run);
        tree.add_transition("idle", "run", "move");
        tree.add_transition("run", "idle", "stop");
        tree
    }

    #[test]
    fn test_events_drive_the_tree() {
        let mut tree = idle_run_tree();
        assert_eq!(tree.current_state(), Some("idle"));

        assert!(!tree.transition("stop"));
        assert!(tree.transition("move"));
        assert_eq!(tree.current_state(), Some("run"));
        assert!(!tree.transition("move"));

        tree.set_property(DIRECTION_PROPERTY, EventArg::Position(-1.0, 0.0));
        assert_eq!(tree.current_animation().and_then(Animation::frame), Some("left_0"));

        assert!(tree.transition("stop"));
        assert_eq!(tree.current_state(), Some("idle"));
    }

    #[test]
    fn test_transitions_to_unknown_states_are_ignored() {
        let mut tree = idle_run_tree();
        tree.add_transition("idle", "jump", "space");
        tree.add_transition("swim", "idle", "land");
        assert!(!tree.transition("space"));
        assert_eq!(tree.current_state(), Some("idle"));
    }

    #[test]
    fn test_property_listeners_see_every_value() {
        let mut tree = idle_run_tree();
        let seen = Rc::new(Cell::new(0.0));
        let last = Rc::clone(&seen);
        tree.add_property_listener("speed", move |value| {
            if let EventArg::Float(speed) = value {
                last.set(*speed);
            }
        });

        assert_eq!(tree.property("speed"), None);
        tree.set_property("speed", EventArg::Float(3.5));
        assert_eq!(seen.get(), 3.5);
        assert_eq!(tree.property("speed"), Some(&EventArg::Float(3.5)));
    }

    #[test]
    fn test_only_the_current_state_animates() {
        let mut tree = idle_run_tree();
        tree.animate(0.6);
        assert_eq!(tree.current_animation().and_then(Animation::frame), Some("idle_1"));

        tree.transition("move");
        tree.animate(0.25);
        assert_eq!(tree.current_animation().and_then(Animation::frame), Some("right_1"));

        tree.restart();
        assert_eq!(tree.current_state(), Some("idle"));
        assert_eq!(tree.current_animation().and_then(Animation::frame), Some("idle_0"));
    }

    #[test]
    fn test_tree_draws_current_frame_over_the_transform() {
        let mut tree = idle_run_tree();
        tree.transition("move");
        let object = GameObject::new().with_component(
            Transform::from_position(vec2(10.0, 20.0))
                .with_scale(vec2(32.0, 48.0))
                .with_rotation(0.5),
        );

        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        tree.display(&object, &mut canvas);
        assert_eq!(
            canvas.draws().collect::<Vec<_>>(),
            vec![&DrawCommand::Image {
                asset: "right_0".to_owned(),
                center: vec2(10.0, 20.0),
                size: vec2(32.0, 48.0),
                rotation: 0.5,
            }]
        );
    }

    #[test]
    fn test_clones_start_over() {
        let mut animator = Animator::new(walk(), 2);
        animator.animate(0.25);
        assert_eq!(animator.animation().frame_index(), 1);

        let copy = animator.clone_component();
        let copy = copy.downcast_ref::<Animator>().unwrap();
        assert_eq!(copy.animation().frame_index(), 0);
        assert_eq!(copy.role(), Role::viewer(2));

        let mut tree = idle_run_tree();
        tree.transition("move");
        let copy = tree.clone_component();
        let copy = copy.downcast_ref::<AnimationTree>().unwrap();
        assert_eq!(copy.current_state(), Some("idle"));
    }
}
