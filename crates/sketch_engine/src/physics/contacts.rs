//! Collider identities and the contact inbox
//!
//! When collider A finds collider B it records B in its own "currently
//! colliding" set and must also record A on B. B may live on another
//! GameObject that is not reachable mutably during A's update, so the
//! second half goes through a scene-owned inbox that B drains at the start
//! of its own update. If B already updated this frame it sees the contact
//! on its next update.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::collections::ObjectId;

static NEXT_COLLIDER_ID: AtomicU64 = AtomicU64::new(0);

/// Process-wide collider identity
///
/// Handed out in increasing order on first use and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderId(u64);

impl ColliderId {
    /// Allocate the next identity
    pub fn next() -> Self {
        Self(NEXT_COLLIDER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw counter value
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ColliderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collider#{}", self.0)
    }
}

/// The other side of a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    /// GameObject owning the other collider
    pub object: ObjectId,
    /// Identity of the other collider
    pub collider: ColliderId,
}

/// Contacts waiting to be picked up by the collider they were found for
#[derive(Debug, Default)]
pub struct ContactInbox {
    pending: HashMap<ColliderId, Vec<Contact>>,
}

impl ContactInbox {
    /// Create an empty inbox
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave `contact` for the collider `to`
    pub fn deliver(&mut self, to: ColliderId, contact: Contact) {
        self.pending.entry(to).or_default().push(contact);
    }

    /// Take every contact waiting for `collider`
    pub fn drain(&mut self, collider: ColliderId) -> Vec<Contact> {
        self.pending.remove(&collider).unwrap_or_default()
    }

    /// Drop contacts for a collider that no longer exists
    pub fn purge(&mut self, collider: ColliderId) {
        self.pending.remove(&collider);
    }

    /// Number of colliders with pending contacts
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn object(raw: u64) -> ObjectId {
        ObjectId::from(KeyData::from_ffi(raw))
    }

    #[test]
    fn test_ids_increase() {
        let a = ColliderId::next();
        let b = ColliderId::next();
        assert!(b > a);
    }

    #[test]
    fn test_drain_takes_everything_once() {
        let mut inbox = ContactInbox::new();
        let me = ColliderId::next();
        let contact = Contact {
            object: object(1),
            collider: ColliderId::next(),
        };
        inbox.deliver(me, contact);
        inbox.deliver(me, contact);

        assert_eq!(inbox.drain(me).len(), 2);
        assert!(inbox.drain(me).is_empty());
        assert!(inbox.is_empty());
    }

    #[test]
    fn test_purge() {
        let mut inbox = ContactInbox::new();
        let gone = ColliderId::next();
        inbox.deliver(
            gone,
            Contact {
                object: object(1),
                collider: ColliderId::next(),
            },
        );
        inbox.purge(gone);
        assert!(inbox.is_empty());
    }
}
