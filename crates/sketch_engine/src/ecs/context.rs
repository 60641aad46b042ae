//! Per-update context handed to controllers
//!
//! During a Scene's update pass the object being updated is detached from
//! the Scene, so a controller can freely mutate its own object while
//! reading every other one through [`WorldView`]. Anything that would
//! mutate the Scene itself (spawning, destroying another object, timers)
//! is queued on [`SceneCommands`] and applied when the pass ends.

use crate::engine::AppContext;
use crate::foundation::collections::{ObjectId, PrefabId, SlotMap};
use crate::foundation::math::{Rect, Vec2};
use crate::physics::ContactInbox;
use crate::scene::Scene;
use crate::spatial::RegionTree;

use super::game_object::GameObject;

/// Read-only view of the Scene's objects during an update
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    objects: &'a SlotMap<ObjectId, GameObject>,
    spatial: &'a RegionTree<ObjectId>,
    current: ObjectId,
}

impl<'a> WorldView<'a> {
    /// Build a view that hides `current`, the object being updated
    pub fn new(
        objects: &'a SlotMap<ObjectId, GameObject>,
        spatial: &'a RegionTree<ObjectId>,
        current: ObjectId,
    ) -> Self {
        Self {
            objects,
            spatial,
            current,
        }
    }

    /// Id of the object being updated
    pub fn current(&self) -> ObjectId {
        self.current
    }

    /// Another object in the Scene
    ///
    /// The object being updated is not reachable here; it is the
    /// `object` argument of the update call.
    pub fn object(&self, id: ObjectId) -> Option<&'a GameObject> {
        if id == self.current {
            return None;
        }
        self.objects.get(id)
    }

    /// Ids of every object whose position was inside `area` when the
    /// spatial index was rebuilt this frame
    pub fn query(&self, area: &Rect) -> Vec<ObjectId> {
        self.spatial.query_area(area)
    }

    /// Like [`Self::query`], appending into an existing buffer
    pub fn query_into(&self, area: &Rect, results: &mut Vec<ObjectId>) {
        self.spatial.query(area, results);
    }

    /// The spatial index built at the start of this frame
    pub fn spatial_index(&self) -> &'a RegionTree<ObjectId> {
        self.spatial
    }

    /// Every other live object, in no particular order
    pub fn others(&self) -> impl Iterator<Item = (ObjectId, &'a GameObject)> + 'a {
        let current = self.current;
        self.objects
            .iter()
            .filter(move |(id, object)| *id != current && !object.is_destroyed())
    }
}

/// Deferred callback run against the Scene
pub type SceneCallback = Box<dyn FnOnce(&mut Scene, &mut AppContext)>;

pub(crate) enum SceneCommand {
    Spawn(GameObject),
    SpawnPrefab { prefab: PrefabId, position: Option<Vec2> },
    Destroy(ObjectId),
    After(f32, SceneCallback),
    Run(SceneCallback),
}

/// Scene mutations requested during an update pass
#[derive(Default)]
pub struct SceneCommands {
    queue: Vec<SceneCommand>,
}

impl SceneCommands {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new object to the Scene
    pub fn spawn(&mut self, object: GameObject) {
        self.queue.push(SceneCommand::Spawn(object));
    }

    /// Spawn a copy of a prefab bound to the Scene
    pub fn spawn_prefab(&mut self, prefab: PrefabId) {
        self.queue.push(SceneCommand::SpawnPrefab {
            prefab,
            position: None,
        });
    }

    /// Spawn a copy of a bound prefab and move it to `position`
    pub fn spawn_prefab_at(&mut self, prefab: PrefabId, position: Vec2) {
        self.queue.push(SceneCommand::SpawnPrefab {
            prefab,
            position: Some(position),
        });
    }

    /// Destroy another object once the pass ends
    ///
    /// Destroying the object being updated does not need this: call
    /// [`GameObject::destroy`] on it directly.
    pub fn destroy(&mut self, id: ObjectId) {
        self.queue.push(SceneCommand::Destroy(id));
    }

    /// Run `callback` after `seconds` of unpaused Scene time
    pub fn after(&mut self, seconds: f32, callback: impl FnOnce(&mut Scene, &mut AppContext) + 'static) {
        self.queue.push(SceneCommand::After(seconds, Box::new(callback)));
    }

    /// Run `callback` against the Scene once the pass ends
    pub fn run(&mut self, callback: impl FnOnce(&mut Scene, &mut AppContext) + 'static) {
        self.queue.push(SceneCommand::Run(Box::new(callback)));
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn take(&mut self) -> Vec<SceneCommand> {
        std::mem::take(&mut self.queue)
    }
}

/// Everything a controller can reach while it updates
pub struct UpdateContext<'a> {
    /// Id of the object being updated
    pub object_id: ObjectId,
    /// The rest of the Scene
    pub world: WorldView<'a>,
    /// Contacts waiting for colliders
    pub contacts: &'a mut ContactInbox,
    /// Deferred Scene mutations
    pub commands: &'a mut SceneCommands,
    /// Input, time, events and assets
    pub app: &'a mut AppContext,
}

impl UpdateContext<'_> {
    /// Seconds since the previous frame
    pub fn delta_time(&self) -> f32 {
        self.app.clock.delta_time_seconds()
    }
}
