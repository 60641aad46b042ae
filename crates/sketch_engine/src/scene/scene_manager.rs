//! Scene Manager
//!
//! Owns every Scene by name and decides which one is active. Scenes are
//! registered up front; choosing the entry Scene initializes all of them
//! and closes registration. Switching is either immediate
//! ([`SceneManager::change_scene`]) or timed through a
//! [`SceneTransition`].

use std::collections::HashMap;

use crate::engine::{AppContext, EngineError, SceneRequest};
use crate::render::Canvas;

use super::game_scene::Scene;
use super::transition::SceneTransition;

struct NamedScene {
    name: String,
    scene: Scene,
}

struct ActiveTransition {
    transition: SceneTransition,
    target: usize,
}

/// Registry of named Scenes and the active one
#[derive(Default)]
pub struct SceneManager {
    scenes: Vec<NamedScene>,
    by_name: HashMap<String, usize>,
    active: Option<usize>,
    transition: Option<ActiveTransition>,
    warned_no_entry: bool,
}

impl std::fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneManager")
            .field("scenes", &self.scene_names().collect::<Vec<_>>())
            .field("active", &self.active_scene_name())
            .field("transitioning", &self.is_transitioning())
            .finish()
    }
}

impl SceneManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `scene` under `name`
    ///
    /// Fails once the entry Scene is set or if the name is taken.
    pub fn register_scene(&mut self, name: impl Into<String>, scene: Scene) -> Result<(), EngineError> {
        let name = name.into();
        if self.has_entered() {
            return Err(EngineError::RegistrationClosed(name));
        }
        if self.by_name.contains_key(&name) {
            return Err(EngineError::DuplicateScene(name));
        }

        log::debug!("Registered scene '{}'", name);
        self.by_name.insert(name.clone(), self.scenes.len());
        self.scenes.push(NamedScene { name, scene });
        Ok(())
    }

    /// Initialize every registered Scene and enter `name`
    pub fn set_entry_scene(&mut self, name: &str, app: &mut AppContext) -> Result<(), EngineError> {
        if self.has_entered() {
            return Err(EngineError::EntryAlreadySet);
        }
        let index = *self
            .by_name
            .get(name)
            .ok_or_else(|| EngineError::UnknownScene(name.to_string()))?;

        for named in &mut self.scenes {
            named.scene.initialize(app);
        }
        self.active = Some(index);
        self.scenes[index].scene.enter(app);

        log::info!("Entered scene '{}'", name);
        Ok(())
    }

    /// True once the entry Scene has been set
    pub fn has_entered(&self) -> bool {
        self.active.is_some()
    }

    /// Make `name` the active Scene right away
    ///
    /// Switching to the Scene that is already active does nothing.
    /// Returns true if the active Scene changed.
    pub fn set_scene(&mut self, name: &str, app: &mut AppContext) -> bool {
        let Some(&index) = self.by_name.get(name) else {
            log::warn!("No scene with name: '{}'", name);
            return false;
        };
        let Some(current) = self.active else {
            log::warn!("Cannot switch to scene '{}' before the entry scene is set", name);
            return false;
        };
        if current == index {
            return false;
        }

        self.scenes[current].scene.exit(app);
        self.active = Some(index);
        self.scenes[index].scene.enter(app);
        log::debug!("Switched scene '{}' -> '{}'", self.scenes[current].name, name);
        true
    }

    /// Like [`Self::set_scene`], ignored while a transition runs
    pub fn change_scene(&mut self, name: &str, app: &mut AppContext) -> bool {
        if self.is_transitioning() {
            return false;
        }
        self.set_scene(name, app)
    }

    /// Start a timed transition to `name`
    ///
    /// Ignored while another transition runs or when `name` is already
    /// active. Returns true if the transition started.
    pub fn transition(&mut self, name: &str, mut transition: SceneTransition) -> bool {
        let Some(&target) = self.by_name.get(name) else {
            log::warn!("No scene with name: '{}'", name);
            return false;
        };
        if self.is_transitioning() || self.active == Some(target) {
            return false;
        }

        transition.start();
        self.transition = Some(ActiveTransition { transition, target });
        true
    }

    /// True while a transition runs
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// The running transition
    pub fn active_transition(&self) -> Option<&SceneTransition> {
        self.transition.as_ref().map(|active| &active.transition)
    }

    /// Tick the active Scene, then handle Scene requests and the transition
    pub fn tick(&mut self, app: &mut AppContext, canvas: &mut dyn Canvas) {
        let Some(active) = self.active else {
            if !self.warned_no_entry {
                log::warn!("Entry scene was not set");
                self.warned_no_entry = true;
            }
            return;
        };

        self.scenes[active].scene.tick(app, canvas);

        match app.take_scene_request() {
            Some(SceneRequest::Change(name)) => {
                self.change_scene(&name, app);
            }
            Some(SceneRequest::Transition(name, transition)) => {
                self.transition(&name, transition);
            }
            None => {}
        }

        let Some(mut active) = self.transition.take() else {
            return;
        };
        active.transition.advance(app.clock.delta_time_seconds());
        if active.transition.has_switched() {
            let name = self.scenes[active.target].name.clone();
            self.set_scene(&name, app);
        }
        active.transition.display(canvas);
        if !active.transition.is_done() {
            self.transition = Some(active);
        }
    }

    /// The active Scene
    pub fn active_scene(&self) -> Option<&Scene> {
        self.active.map(|index| &self.scenes[index].scene)
    }

    /// Mutable access to the active Scene
    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.active.map(|index| &mut self.scenes[index].scene)
    }

    /// Name of the active Scene
    pub fn active_scene_name(&self) -> Option<&str> {
        self.active.map(|index| self.scenes[index].name.as_str())
    }

    /// A Scene by name
    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.by_name.get(name).map(|&index| &self.scenes[index].scene)
    }

    /// Mutable access to a Scene by name
    pub fn scene_mut(&mut self, name: &str) -> Option<&mut Scene> {
        let index = *self.by_name.get(name)?;
        Some(&mut self.scenes[index].scene)
    }

    /// Registered names, in registration order
    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.scenes.iter().map(|named| named.name.as_str())
    }

    /// Number of registered Scenes
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// True if no Scene is registered
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EngineConfig;
    use crate::render::NullCanvas;
    use crate::scene::{NoEffect, SceneBehavior};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        tag: &'static str,
        journal: Journal,
    }

    impl SceneBehavior for Recorder {
        fn start(&mut self, _scene: &mut Scene, _app: &mut AppContext) {
            self.journal.borrow_mut().push(format!("{} start", self.tag));
        }

        fn on_enter(&mut self, _scene: &mut Scene, _app: &mut AppContext) {
            self.journal.borrow_mut().push(format!("{} enter", self.tag));
        }

        fn on_exit(&mut self, _scene: &mut Scene, _app: &mut AppContext) {
            self.journal.borrow_mut().push(format!("{} exit", self.tag));
        }
    }

    fn manager_with(tags: &[&'static str]) -> (SceneManager, Journal) {
        let journal = Journal::default();
        let mut manager = SceneManager::new();
        for &tag in tags {
            let scene = Scene::new(Recorder {
                tag,
                journal: Rc::clone(&journal),
            });
            manager.register_scene(tag, scene).unwrap();
        }
        (manager, journal)
    }

    #[test]
    fn test_registration_rules() {
        let (mut manager, _) = manager_with(&["menu"]);
        assert!(matches!(
            manager.register_scene("menu", Scene::empty()),
            Err(EngineError::DuplicateScene(_))
        ));

        let mut app = AppContext::new(EngineConfig::default());
        assert!(matches!(
            manager.set_entry_scene("missing", &mut app),
            Err(EngineError::UnknownScene(_))
        ));
        manager.set_entry_scene("menu", &mut app).unwrap();

        assert!(matches!(
            manager.register_scene("late", Scene::empty()),
            Err(EngineError::RegistrationClosed(_))
        ));
        assert!(matches!(
            manager.set_entry_scene("menu", &mut app),
            Err(EngineError::EntryAlreadySet)
        ));
    }

    #[test]
    fn test_entry_initializes_everything_then_enters() {
        let (mut manager, journal) = manager_with(&["menu", "game"]);
        let mut app = AppContext::new(EngineConfig::default());
        manager.set_entry_scene("game", &mut app).unwrap();

        assert_eq!(*journal.borrow(), vec!["menu start", "game start", "game enter"]);
        assert!(manager.scene("menu").unwrap().is_initialized());
        assert_eq!(manager.active_scene_name(), Some("game"));
    }

    #[test]
    fn test_set_scene_exits_then_enters() {
        let (mut manager, journal) = manager_with(&["menu", "game"]);
        let mut app = AppContext::new(EngineConfig::default());
        manager.set_entry_scene("menu", &mut app).unwrap();
        journal.borrow_mut().clear();

        assert!(!manager.set_scene("menu", &mut app));
        assert!(!manager.set_scene("nowhere", &mut app));
        assert!(manager.set_scene("game", &mut app));
        assert_eq!(*journal.borrow(), vec!["menu exit", "game enter"]);
    }

    #[test]
    fn test_transition_switches_halfway_and_blocks_changes() {
        let (mut manager, journal) = manager_with(&["menu", "game", "credits"]);
        let mut app = AppContext::new(EngineConfig::default());
        let mut canvas = NullCanvas::new(100.0, 100.0);
        manager.set_entry_scene("menu", &mut app).unwrap();

        assert!(!manager.transition("menu", SceneTransition::new(1.0, NoEffect)));
        assert!(manager.transition("game", SceneTransition::new(1.0, NoEffect)));
        assert!(!manager.transition("credits", SceneTransition::new(1.0, NoEffect)));
        assert!(!manager.change_scene("credits", &mut app));

        app.clock.advance(0.3);
        manager.tick(&mut app, &mut canvas);
        assert_eq!(manager.active_scene_name(), Some("menu"));

        app.clock.advance(0.3);
        manager.tick(&mut app, &mut canvas);
        assert_eq!(manager.active_scene_name(), Some("game"));
        assert!(manager.is_transitioning());

        app.clock.advance(0.5);
        manager.tick(&mut app, &mut canvas);
        assert!(!manager.is_transitioning());
        assert_eq!(
            journal.borrow().iter().filter(|line| line.as_str() == "game enter").count(),
            1
        );

        assert!(manager.change_scene("credits", &mut app));
    }

    #[test]
    fn test_scene_requests_from_gameplay() {
        let (mut manager, _) = manager_with(&["menu", "game"]);
        let mut app = AppContext::new(EngineConfig::default());
        let mut canvas = NullCanvas::new(100.0, 100.0);
        manager.set_entry_scene("menu", &mut app).unwrap();

        app.request_scene("game");
        manager.tick(&mut app, &mut canvas);
        assert_eq!(manager.active_scene_name(), Some("game"));
    }

    #[test]
    fn test_tick_without_entry_is_a_no_op() {
        let (mut manager, journal) = manager_with(&["menu"]);
        let mut app = AppContext::new(EngineConfig::default());
        let mut canvas = NullCanvas::new(100.0, 100.0);
        manager.tick(&mut app, &mut canvas);
        manager.tick(&mut app, &mut canvas);
        assert!(journal.borrow().is_empty());
        assert!(manager.active_scene().is_none());
    }
}
