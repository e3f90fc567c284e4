//! Per-call traversal state.

use std::collections::VecDeque;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::identity::{ObjectId, ObjectIdentityProvider};
use crate::object::ObjectRef;
use crate::snapshot::SerializedNode;

/// Frontier, visited set and finished nodes for one serialization.
///
/// An object is marked visited the first time it is seen, whether that is as
/// the root or as a nested value, so it can be enqueued at most once.
pub struct TraversalContext<'a> {
    identity: &'a ObjectIdentityProvider,
    frontier: VecDeque<(ObjectId, ObjectRef)>,
    visited: FxHashSet<ObjectId>,
    finished: IndexMap<ObjectId, SerializedNode>,
}

impl<'a> TraversalContext<'a> {
    pub fn new(identity: &'a ObjectIdentityProvider) -> Self {
        Self {
            identity,
            frontier: VecDeque::new(),
            visited: FxHashSet::default(),
            finished: IndexMap::new(),
        }
    }

    pub fn identifier(&self, object: &ObjectRef) -> ObjectId {
        self.identity.identifier(object)
    }

    /// Identifier of `object` if it has already been seen in this call.
    /// Objects never seen get no identifier from this check.
    pub fn visited(&self, object: &ObjectRef) -> Option<ObjectId> {
        let id = self.identity.lookup(object)?;
        self.visited.contains(&id).then_some(id)
    }

    /// Mark `object` visited and queue it if it is new. Returns its identifier
    /// either way.
    pub fn enqueue(&mut self, object: &ObjectRef) -> ObjectId {
        let id = self.identifier(object);
        if self.visited.insert(id) {
            self.frontier.push_back((id, object.clone()));
        }
        id
    }

    pub fn next(&mut self) -> Option<(ObjectId, ObjectRef)> {
        self.frontier.pop_front()
    }

    pub fn finish(&mut self, id: ObjectId, node: SerializedNode) {
        let previous = self.finished.insert(id, node);
        debug_assert!(previous.is_none(), "object {id} finished twice");
    }

    pub fn finished_len(&self) -> usize {
        self.finished.len()
    }

    pub fn pending(&self) -> usize {
        self.frontier.len()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn into_finished(self) -> IndexMap<ObjectId, SerializedNode> {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Introspect;
    use std::any::Any;
    use std::sync::Arc;

    struct Leaf;

    impl Introspect for Leaf {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn class_hierarchy(&self) -> Vec<String> {
            vec!["Leaf".into()]
        }
    }

    #[test]
    fn enqueue_is_idempotent() {
        let identity = ObjectIdentityProvider::new();
        let mut context = TraversalContext::new(&identity);
        let leaf: ObjectRef = Arc::new(Leaf);

        assert!(context.visited(&leaf).is_none());
        let first = context.enqueue(&leaf);
        let second = context.enqueue(&leaf);

        assert_eq!(first, second);
        assert_eq!(context.pending(), 1);
        assert_eq!(context.visited(&leaf), Some(first));
    }

    #[test]
    fn frontier_is_fifo() {
        let identity = ObjectIdentityProvider::new();
        let mut context = TraversalContext::new(&identity);
        let a: ObjectRef = Arc::new(Leaf);
        let b: ObjectRef = Arc::new(Leaf);

        let id_a = context.enqueue(&a);
        let id_b = context.enqueue(&b);

        assert_eq!(context.next().map(|(id, _)| id), Some(id_a));
        assert_eq!(context.next().map(|(id, _)| id), Some(id_b));
        assert!(context.next().is_none());
        assert_eq!(context.visited_len(), 2);
    }
}
