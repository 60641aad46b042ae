//! Asset registry
//!
//! Loading and decoding happen outside the engine. Whatever the host
//! produces (decoded images, sprite atlases, level data) is registered
//! once under a name and looked up by that name afterwards.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

use crate::engine::EngineError;

struct StoredAsset {
    type_id: TypeId,
    type_name: &'static str,
    value: Rc<dyn Any>,
}

/// Name → asset registry
#[derive(Default)]
pub struct AssetRegistry {
    assets: HashMap<String, StoredAsset>,
}

impl std::fmt::Debug for AssetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut entries: Vec<(&str, &str)> = self
            .assets
            .iter()
            .map(|(name, asset)| (name.as_str(), asset.type_name))
            .collect();
        entries.sort_unstable();
        f.debug_map().entries(entries).finish()
    }
}

impl AssetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an asset under `name`; a name can only be registered once
    pub fn register<T: Any>(&mut self, name: impl Into<String>, asset: T) -> Result<(), EngineError> {
        let name = name.into();
        if self.assets.contains_key(&name) {
            return Err(EngineError::DuplicateAsset(name));
        }
        log::debug!("Registered asset '{}' ({})", name, std::any::type_name::<T>());
        self.assets.insert(
            name,
            StoredAsset {
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
                value: Rc::new(asset),
            },
        );
        Ok(())
    }

    /// Look up an asset by name
    ///
    /// Returns `None` (and logs a warning) when the name is unknown or the
    /// asset was registered with a different type.
    pub fn get<T: Any>(&self, name: &str) -> Option<Rc<T>> {
        let Some(stored) = self.assets.get(name) else {
            log::warn!("Asset '{}' does not exist", name);
            return None;
        };
        if stored.type_id != TypeId::of::<T>() {
            log::warn!(
                "Asset '{}' is a {}, not a {}",
                name,
                stored.type_name,
                std::any::type_name::<T>()
            );
            return None;
        }
        Rc::clone(&stored.value).downcast::<T>().ok()
    }

    /// True if an asset is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }

    /// Number of registered assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Iterate over the registered names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Sprite {
        width: u32,
        height: u32,
    }

    #[test]
    fn test_register_and_get() {
        let mut assets = AssetRegistry::new();
        assets
            .register("tower", Sprite { width: 32, height: 48 })
            .unwrap();

        let sprite = assets.get::<Sprite>("tower").unwrap();
        assert_eq!(*sprite, Sprite { width: 32, height: 48 });
        assert!(assets.contains("tower"));
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let mut assets = AssetRegistry::new();
        assets.register("music", 1u8).unwrap();
        let err = assets.register("music", 2u8).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateAsset(name) if name == "music"));
        assert_eq!(*assets.get::<u8>("music").unwrap(), 1);
    }

    #[test]
    fn test_missing_and_mistyped_are_none() {
        let mut assets = AssetRegistry::new();
        assets.register("level", String::from("map")).unwrap();
        assert!(assets.get::<String>("nothing").is_none());
        assert!(assets.get::<u32>("level").is_none());
    }
}
