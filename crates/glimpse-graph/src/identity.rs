//! Stable per-reference object identifiers.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};

use crate::object::{Introspect, ObjectRef};

/// Opaque token for one live object. Rendered as `"$<n>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct Entry {
    object: Weak<dyn Introspect>,
    id: ObjectId,
}

struct Inner {
    next: u64,
    entries: FxHashMap<usize, Entry>,
}

/// Hands out one [`ObjectId`] per object reference.
///
/// Entries are keyed by allocation address and hold a [`Weak`] to the object,
/// so an address reused after the original object was dropped gets a fresh
/// token instead of inheriting the old one.
pub struct ObjectIdentityProvider {
    inner: Mutex<Inner>,
}

impl ObjectIdentityProvider {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next: 1,
                entries: FxHashMap::default(),
            }),
        }
    }

    pub fn identifier(&self, object: &ObjectRef) -> ObjectId {
        let address = address_of(object);
        let mut inner = self.inner.lock();

        if let Some(entry) = inner.entries.get(&address) {
            if entry.object.strong_count() > 0 {
                return entry.id;
            }
        }

        let id = ObjectId(inner.next);
        inner.next += 1;
        inner.entries.insert(
            address,
            Entry {
                object: Arc::downgrade(object),
                id,
            },
        );
        id
    }

    /// Identifier already assigned to `object`, without assigning one.
    pub fn lookup(&self, object: &ObjectRef) -> Option<ObjectId> {
        let inner = self.inner.lock();
        inner
            .entries
            .get(&address_of(object))
            .filter(|entry| entry.object.strong_count() > 0)
            .map(|entry| entry.id)
    }

    /// Drop entries whose object is gone. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| entry.object.strong_count() > 0);
        before - inner.entries.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ObjectIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectIdentityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ObjectIdentityProvider")
            .field("next", &inner.next)
            .field("entries", &inner.entries.len())
            .finish()
    }
}

pub(crate) fn address_of(object: &ObjectRef) -> usize {
    Arc::as_ptr(object).cast::<()>() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(PartialEq)]
    struct Point(i32, i32);

    impl Introspect for Point {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn class_hierarchy(&self) -> Vec<String> {
            vec!["Point".into()]
        }
    }

    fn point(x: i32, y: i32) -> ObjectRef {
        Arc::new(Point(x, y))
    }

    #[test]
    fn same_reference_same_identifier() {
        let provider = ObjectIdentityProvider::new();
        let object = point(1, 2);
        let alias = object.clone();

        assert_eq!(provider.identifier(&object), provider.identifier(&alias));
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn equal_values_get_distinct_identifiers() {
        let provider = ObjectIdentityProvider::new();
        let a = point(1, 2);
        let b = point(1, 2);

        assert_ne!(provider.identifier(&a), provider.identifier(&b));
    }

    #[test]
    fn identifiers_render_with_dollar_prefix() {
        let provider = ObjectIdentityProvider::new();
        let id = provider.identifier(&point(0, 0));

        assert_eq!(id.to_string(), "$1");
        assert_eq!(serde_json::to_value(id).unwrap(), "$1");
    }

    #[test]
    fn prune_forgets_dropped_objects() {
        let provider = ObjectIdentityProvider::new();
        let kept = point(0, 0);
        let first = provider.identifier(&kept);
        provider.identifier(&point(1, 1));

        assert_eq!(provider.prune(), 1);
        assert_eq!(provider.len(), 1);
        assert_eq!(provider.identifier(&kept), first);
    }

    #[test]
    fn lookup_does_not_assign() {
        let provider = ObjectIdentityProvider::new();
        let object = point(3, 4);

        assert_eq!(provider.lookup(&object), None);
        assert!(provider.is_empty());

        let id = provider.identifier(&object);
        assert_eq!(provider.lookup(&object), Some(id));
        assert_eq!(provider.identifier(&point(0, 0)).get(), 2);
    }

    #[test]
    fn dead_entry_is_never_reused() {
        let provider = ObjectIdentityProvider::new();
        let dropped = point(0, 0);
        let old = provider.identifier(&dropped);
        drop(dropped);

        let fresh = point(5, 5);
        assert_ne!(provider.identifier(&fresh), old);
    }
}
