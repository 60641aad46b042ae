//! Specialized collection types

pub use slotmap::{SlotMap, SecondaryMap};

slotmap::new_key_type! {
    /// Stable handle to a GameObject owned by a Scene
    ///
    /// Handles stay valid across compaction and go stale (lookups return
    /// `None`) once the object has been purged.
    pub struct ObjectId;

    /// Handle to a pending scene timer
    pub struct TimerId;

    /// Handle to a prefab bound to a Scene
    pub struct PrefabId;
}
