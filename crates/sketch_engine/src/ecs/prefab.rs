//! Prefabs: template objects stamped into a Scene

use crate::engine::EngineError;
use crate::foundation::collections::ObjectId;
use crate::scene::Scene;

use super::game_object::GameObject;

/// A template GameObject and the means to copy it into a Scene
///
/// The template itself never lives in a Scene. Every spawn is a fresh
/// copy made of clones of the template's components, started when the
/// Scene adds it.
#[derive(Debug)]
pub struct GamePrefab {
    template: GameObject,
}

impl GamePrefab {
    /// Wrap `template`, which must not have been initialized
    pub fn new(template: GameObject) -> Result<Self, EngineError> {
        if template.is_initialized() {
            return Err(EngineError::InitializedPrefabTemplate);
        }
        Ok(Self { template })
    }

    /// The template
    pub fn template(&self) -> &GameObject {
        &self.template
    }

    /// Mutable access to the template, e.g. to tweak a component before
    /// the next spawn
    pub fn template_mut(&mut self) -> &mut GameObject {
        &mut self.template
    }

    /// A fresh, unattached copy of the template
    pub fn instantiate(&self) -> GameObject {
        self.template.copy()
    }

    /// Copy the template into `scene`
    pub fn spawn(&self, scene: &mut Scene) -> ObjectId {
        scene.add_game_object(self.instantiate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Transform;
    use crate::foundation::math::vec2;

    #[test]
    fn test_initialized_template_is_rejected() {
        let mut template = GameObject::new().with_component(Transform::default());
        template.initialize();
        assert!(matches!(
            GamePrefab::new(template),
            Err(EngineError::InitializedPrefabTemplate)
        ));
    }

    #[test]
    fn test_spawn_copies_are_independent() {
        let prefab = GamePrefab::new(
            GameObject::new().with_component(Transform::from_position(vec2(1.0, 2.0))),
        )
        .unwrap();
        let mut scene = Scene::empty();

        let first = prefab.spawn(&mut scene);
        let second = prefab.spawn(&mut scene);
        assert_ne!(first, second);

        scene.object_mut(first).unwrap().transform_mut().unwrap().position = vec2(50.0, 50.0);
        assert_eq!(scene.object(second).unwrap().position(), Some(vec2(1.0, 2.0)));
        assert!(!prefab.template().is_initialized());
        assert_eq!(prefab.template().position(), Some(vec2(1.0, 2.0)));
    }
}
