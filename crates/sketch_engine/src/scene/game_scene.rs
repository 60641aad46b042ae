//! Scene: the live object set and the per-frame pipeline
//!
//! One tick runs, in order:
//!
//! 1. scripts and UI elements added since the last tick are started
//! 2. timers advance (unpaused only)
//! 3. the spatial index is rebuilt from object positions
//! 4. scripts `update`
//! 5. objects update in reverse order (unpaused only), then queued
//!    commands apply and destroyed objects are dropped
//! 6. scripts `late_update`, UI elements `update`
//! 7. background, world under the camera transform, UI, overlay
//!
//! Objects are drawn layer by layer: every visible object draws layer 0,
//! then layer 1 and so on, so a higher layer always lands on top no matter
//! which object owns it.

use crate::core::config::{SceneConfig, SpatialConfig, MAX_VIEW_LAYER};
use crate::ecs::context::{SceneCallback, SceneCommand, SceneCommands, UpdateContext, WorldView};
use crate::ecs::{AnyCollider, GameObject, GamePrefab};
use crate::engine::AppContext;
use crate::foundation::collections::{ObjectId, PrefabId, SlotMap, TimerId};
use crate::foundation::math::{Rect, Vec2};
use crate::foundation::time::TimerQueue;
use crate::physics::ContactInbox;
use crate::render::Canvas;
use crate::spatial::RegionTree;

use super::camera::Camera;
use super::script::{SceneBehavior, Script, UiElement};

struct ScriptSlot {
    script: Box<dyn Script>,
    started: bool,
}

struct UiSlot {
    element: Box<dyn UiElement>,
    initialized: bool,
}

#[derive(Clone, Copy)]
enum ScriptPhase {
    Start,
    Update,
    LateUpdate,
}

/// A set of GameObjects with the scripts, UI and camera that go with them
pub struct Scene {
    objects: SlotMap<ObjectId, GameObject>,
    order: Vec<ObjectId>,
    spatial: RegionTree<ObjectId>,
    contacts: ContactInbox,
    camera: Camera,
    scripts: Vec<ScriptSlot>,
    ui: Vec<UiSlot>,
    prefabs: SlotMap<PrefabId, GamePrefab>,
    timers: TimerQueue<SceneCallback>,
    config: SceneConfig,
    behavior: Option<Box<dyn SceneBehavior>>,
    paused: bool,
    initialized: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("objects", &self.order.len())
            .field("scripts", &self.scripts.len())
            .field("ui", &self.ui.len())
            .field("timers", &self.timers.len())
            .field("paused", &self.paused)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Scene driven by `behavior`
    pub fn new(behavior: impl SceneBehavior + 'static) -> Self {
        let mut scene = Self::empty();
        scene.behavior = Some(Box::new(behavior));
        scene
    }

    /// Scene without lifecycle hooks
    pub fn empty() -> Self {
        Self {
            objects: SlotMap::with_key(),
            order: Vec::new(),
            spatial: RegionTree::default(),
            contacts: ContactInbox::new(),
            camera: Camera::default(),
            scripts: Vec::new(),
            ui: Vec::new(),
            prefabs: SlotMap::with_key(),
            timers: TimerQueue::new(),
            config: SceneConfig::default(),
            behavior: None,
            paused: false,
            initialized: false,
        }
    }

    /// Use the given spatial index and scene settings (builder)
    #[must_use]
    pub fn with_config(mut self, spatial: SpatialConfig, config: SceneConfig) -> Self {
        self.spatial = RegionTree::new(spatial);
        self.config = config;
        self
    }

    /// Start the behavior, then every script, object and UI element
    ///
    /// Initializing twice is a no-op.
    pub fn initialize(&mut self, app: &mut AppContext) {
        if self.initialized {
            return;
        }

        if let Some(mut behavior) = self.behavior.take() {
            behavior.start(self, app);
            if self.behavior.is_none() {
                self.behavior = Some(behavior);
            }
        }
        self.run_scripts(ScriptPhase::Start, app);
        for &id in &self.order {
            if let Some(object) = self.objects.get_mut(id) {
                object.initialize();
            }
        }
        self.initialize_ui(app);

        self.initialized = true;
        log::debug!("Scene initialized with {} objects", self.order.len());
    }

    /// True once [`Self::initialize`] has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn enter(&mut self, app: &mut AppContext) {
        if let Some(mut behavior) = self.behavior.take() {
            behavior.on_enter(self, app);
            if self.behavior.is_none() {
                self.behavior = Some(behavior);
            }
        }
    }

    pub(crate) fn exit(&mut self, app: &mut AppContext) {
        if let Some(mut behavior) = self.behavior.take() {
            behavior.on_exit(self, app);
            if self.behavior.is_none() {
                self.behavior = Some(behavior);
            }
        }
    }

    /// Run one frame
    pub fn tick(&mut self, app: &mut AppContext, canvas: &mut dyn Canvas) {
        if !self.initialized {
            log::warn!("Cannot tick a Scene before it is initialized");
            return;
        }

        self.run_scripts(ScriptPhase::Start, app);
        self.initialize_ui(app);

        if !self.paused {
            for callback in self.timers.advance(app.clock.delta_time_seconds()) {
                callback(self, app);
            }
        }

        self.rebuild_spatial_index();

        self.run_scripts(ScriptPhase::Update, app);
        if !self.paused {
            self.update_objects(app);
        }
        self.sweep_destroyed();
        self.run_scripts(ScriptPhase::LateUpdate, app);
        for slot in &mut self.ui {
            slot.element.update(app);
        }

        self.display(canvas);
    }

    /// Stop updating objects and timers; drawing, scripts and UI go on
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume updating objects and timers
    pub fn unpause(&mut self) {
        self.paused = false;
    }

    /// True while paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Add an object, starting it right away if the Scene is live
    pub fn add_game_object(&mut self, mut object: GameObject) -> ObjectId {
        if self.initialized {
            object.initialize();
        }
        let id = self.objects.insert(object);
        self.order.push(id);
        id
    }

    /// An object in this Scene
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    /// Mutable access to an object in this Scene
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    /// Every object, in insertion order
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &GameObject)> {
        self.order
            .iter()
            .filter_map(|&id| self.objects.get(id).map(|object| (id, object)))
    }

    /// Number of objects, destroyed ones included until they are dropped
    pub fn object_count(&self) -> usize {
        self.order.len()
    }

    /// Flag an object as destroyed; it is dropped before the next draw
    pub fn destroy_object(&mut self, id: ObjectId) -> bool {
        match self.objects.get_mut(id) {
            Some(object) => {
                object.destroy();
                true
            }
            None => false,
        }
    }

    /// Bind a prefab to this Scene so it can be spawned by id
    pub fn bind_prefab(&mut self, prefab: GamePrefab) -> PrefabId {
        self.prefabs.insert(prefab)
    }

    /// A bound prefab
    pub fn prefab(&self, id: PrefabId) -> Option<&GamePrefab> {
        self.prefabs.get(id)
    }

    /// Spawn a copy of a bound prefab
    pub fn spawn(&mut self, prefab: PrefabId) -> Option<ObjectId> {
        self.spawn_with(prefab, None)
    }

    /// Spawn a copy of a bound prefab at `position`
    pub fn spawn_at(&mut self, prefab: PrefabId, position: Vec2) -> Option<ObjectId> {
        self.spawn_with(prefab, Some(position))
    }

    fn spawn_with(&mut self, prefab: PrefabId, position: Option<Vec2>) -> Option<ObjectId> {
        let Some(template) = self.prefabs.get(prefab) else {
            log::warn!("Cannot spawn prefab {:?}: it is not bound to this Scene", prefab);
            return None;
        };
        let mut object = template.instantiate();
        if let Some(position) = position {
            if let Some(transform) = object.transform_mut() {
                transform.position = position;
            }
        }
        Some(self.add_game_object(object))
    }

    /// Add a script; on a live Scene it starts at the next tick
    pub fn add_script(&mut self, script: impl Script + 'static) {
        self.scripts.push(ScriptSlot {
            script: Box::new(script),
            started: false,
        });
    }

    /// Number of scripts
    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    /// Add a UI element; on a live Scene it initializes at the next tick
    pub fn add_ui_element(&mut self, element: impl UiElement + 'static) {
        self.ui.push(UiSlot {
            element: Box::new(element),
            initialized: false,
        });
    }

    /// Number of UI elements
    pub fn ui_element_count(&self) -> usize {
        self.ui.len()
    }

    /// The camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// The spatial index as of the last rebuild
    pub fn spatial_index(&self) -> &RegionTree<ObjectId> {
        &self.spatial
    }

    /// Refill the spatial index from the current object positions
    pub fn rebuild_spatial_index(&mut self) {
        self.spatial.reset();
        for &id in &self.order {
            let Some(object) = self.objects.get(id) else {
                continue;
            };
            if object.is_destroyed() {
                continue;
            }
            if let Some(position) = object.position() {
                self.spatial.insert(position, id);
            }
        }
    }

    /// Objects whose position was inside `area` at the last rebuild
    pub fn query_region(&self, area: &Rect) -> Vec<ObjectId> {
        self.spatial.query_area(area)
    }

    /// Run `callback` once `seconds` of active, unpaused time have passed
    pub fn after(&mut self, seconds: f32, callback: impl FnOnce(&mut Scene, &mut AppContext) + 'static) -> TimerId {
        self.timers.after(seconds, Box::new(callback))
    }

    /// Cancel a pending timer, returns false if it already fired
    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        self.timers.cancel(id)
    }

    /// Number of pending timers
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    fn run_scripts(&mut self, phase: ScriptPhase, app: &mut AppContext) {
        let mut scripts = std::mem::take(&mut self.scripts);
        for slot in &mut scripts {
            match phase {
                ScriptPhase::Start => {
                    if !slot.started {
                        slot.started = true;
                        slot.script.start(self, app);
                    }
                }
                ScriptPhase::Update => slot.script.update(self, app),
                ScriptPhase::LateUpdate => slot.script.late_update(self, app),
            }
        }
        // Scripts added while the others ran
        scripts.append(&mut self.scripts);
        self.scripts = scripts;
    }

    fn initialize_ui(&mut self, app: &mut AppContext) {
        for slot in self.ui.iter_mut().filter(|slot| !slot.initialized) {
            slot.initialized = true;
            slot.element.initialize(app);
        }
    }

    fn update_objects(&mut self, app: &mut AppContext) {
        let mut commands = SceneCommands::new();

        let mut index = self.order.len();
        while index > 0 {
            index -= 1;
            let id = self.order[index];

            if let Some(slot) = self.objects.get_mut(id) {
                if !slot.is_destroyed() {
                    let mut object = std::mem::take(slot);
                    let mut ctx = UpdateContext {
                        object_id: id,
                        world: WorldView::new(&self.objects, &self.spatial, id),
                        contacts: &mut self.contacts,
                        commands: &mut commands,
                        app: &mut *app,
                    };
                    object.update(&mut ctx);
                    if let Some(slot) = self.objects.get_mut(id) {
                        *slot = object;
                    }
                }
            }

            if self.objects.get(id).map_or(true, GameObject::is_destroyed) {
                self.order.remove(index);
                self.remove_object(id);
            }
        }

        self.apply_commands(commands.take(), app);
    }

    fn apply_commands(&mut self, commands: Vec<SceneCommand>, app: &mut AppContext) {
        for command in commands {
            match command {
                SceneCommand::Spawn(object) => {
                    self.add_game_object(object);
                }
                SceneCommand::SpawnPrefab { prefab, position } => {
                    self.spawn_with(prefab, position);
                }
                SceneCommand::Destroy(id) => {
                    self.destroy_object(id);
                }
                SceneCommand::After(seconds, callback) => {
                    self.timers.after(seconds, callback);
                }
                SceneCommand::Run(callback) => callback(self, app),
            }
        }
    }

    fn sweep_destroyed(&mut self) {
        let destroyed: Vec<ObjectId> = self
            .order
            .iter()
            .copied()
            .filter(|&id| self.objects.get(id).map_or(true, GameObject::is_destroyed))
            .collect();
        if destroyed.is_empty() {
            return;
        }
        self.order.retain(|id| !destroyed.contains(id));
        for id in destroyed {
            self.remove_object(id);
        }
    }

    fn remove_object(&mut self, id: ObjectId) {
        let Some(object) = self.objects.remove(id) else {
            return;
        };
        for collider in object.get_components_recursive::<AnyCollider>() {
            self.contacts.purge(collider.id());
        }
    }

    fn display(&mut self, canvas: &mut dyn Canvas) {
        let mut behavior = self.behavior.take();

        if let Some(behavior) = behavior.as_mut() {
            behavior.background(self, canvas);
        }

        self.camera.sync(&self.objects);
        canvas.push();
        let offset = self.camera.translation() + canvas.size() / 2.0;
        canvas.translate(offset);
        self.display_objects(canvas);
        canvas.pop();

        for slot in &self.ui {
            slot.element.display(canvas);
        }

        if let Some(behavior) = behavior.as_mut() {
            behavior.overlay(self, canvas);
        }
        if self.behavior.is_none() {
            self.behavior = behavior;
        }
    }

    fn display_objects(&self, canvas: &mut dyn Canvas) {
        let viewport = canvas.size();
        let mut remaining: Vec<&GameObject> = self
            .order
            .iter()
            .filter_map(|&id| self.objects.get(id))
            .filter(|object| !object.is_destroyed())
            .filter(|object| {
                object
                    .transform()
                    .map_or(true, |transform| self.camera.is_visible(transform, viewport))
            })
            .collect();

        let last_layer = self.config.max_view_layer.min(MAX_VIEW_LAYER);
        for layer in 0..=last_layer {
            if remaining.is_empty() {
                break;
            }
            remaining.retain(|object| !object.display_layer(layer, canvas));
        }
    }
}
