//! Breadth-first serialization of a live object graph.

use std::sync::Arc;
use std::time::Instant;

use glimpse_bridge::{BridgeOptions, ContentBridges};
use glimpse_schema::SchemaRegistry;
use serde_json::Value;
use tracing::{debug, debug_span, trace};

use crate::context::TraversalContext;
use crate::delegate::discover_delegate;
use crate::error::{GraphError, Result};
use crate::identity::{ObjectId, ObjectIdentityProvider};
use crate::introspect::PropertyIntrospector;
use crate::object::{AccessorTable, ObjectRef};
use crate::snapshot::{SerializedNode, Snapshot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializerOptions {
    /// Fail instead of producing a snapshot with more objects than this.
    pub max_objects: Option<usize>,
}

impl SerializerOptions {
    pub fn with_max_objects(max_objects: usize) -> Self {
        Self {
            max_objects: Some(max_objects),
        }
    }
}

/// Walks an object graph from a root and produces a [`Snapshot`].
///
/// The serializer keeps its identity provider across calls, so an object that
/// stays alive keeps its identifier from one snapshot to the next. Content
/// bridges are likewise kept per renderer.
pub struct GraphSerializer {
    schema: Arc<SchemaRegistry>,
    accessors: AccessorTable,
    identity: ObjectIdentityProvider,
    bridges: ContentBridges,
    options: SerializerOptions,
}

impl GraphSerializer {
    pub fn new(schema: Arc<SchemaRegistry>) -> Self {
        Self {
            schema,
            accessors: AccessorTable::new(),
            identity: ObjectIdentityProvider::new(),
            bridges: ContentBridges::new(BridgeOptions::default()),
            options: SerializerOptions::default(),
        }
    }

    #[must_use]
    pub fn with_accessors(mut self, accessors: AccessorTable) -> Self {
        self.accessors = accessors;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: SerializerOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_bridge_options(mut self, options: BridgeOptions) -> Self {
        self.bridges = ContentBridges::new(options);
        self
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn accessors_mut(&mut self) -> &mut AccessorTable {
        &mut self.accessors
    }

    pub fn options(&self) -> SerializerOptions {
        self.options
    }

    pub fn identity(&self) -> &ObjectIdentityProvider {
        &self.identity
    }

    pub fn bridges(&self) -> &ContentBridges {
        &self.bridges
    }

    /// Serialize everything reachable from `root` through declared
    /// properties. Either the whole snapshot is returned or nothing is.
    pub fn serialize(&self, root: &ObjectRef) -> Result<Snapshot> {
        let span = debug_span!("serialize");
        let _guard = span.enter();
        let started = Instant::now();

        let pruned = self.identity.prune();
        if pruned > 0 {
            trace!(pruned, "dropped identities of released objects");
        }

        let mut context = TraversalContext::new(&self.identity);
        let introspector = PropertyIntrospector::new(&self.schema, &self.accessors);
        let root_object = context.enqueue(root);

        while let Some((id, object)) = context.next() {
            if let Some(max) = self.options.max_objects {
                if context.finished_len() >= max {
                    return Err(GraphError::TooManyObjects {
                        count: context.finished_len() + 1,
                        max,
                    });
                }
            }

            let node = self.serialize_object(id, &object, &introspector, &mut context);
            context.finish(id, node);
        }

        let objects = context.into_finished();
        debug!(
            objects = objects.len(),
            root = %root_object,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "object graph serialized"
        );

        Ok(Snapshot {
            objects,
            root_object,
        })
    }

    /// [`serialize`](Self::serialize) straight to a JSON document.
    pub fn serialize_json(&self, root: &ObjectRef) -> Result<Value> {
        Ok(serde_json::to_value(self.serialize(root)?)?)
    }

    fn serialize_object(
        &self,
        id: ObjectId,
        object: &ObjectRef,
        introspector: &PropertyIntrospector<'_>,
        context: &mut TraversalContext<'_>,
    ) -> SerializedNode {
        let hierarchy = object.class_hierarchy();
        let mut node = SerializedNode::new(id, hierarchy.clone());

        match self.schema.describe(&hierarchy) {
            Some(class) => {
                for property in class.properties() {
                    if !introspector.should_read(object, &hierarchy, property) {
                        continue;
                    }
                    if let Some(result) = introspector.read(object, &hierarchy, property, context) {
                        node.properties.insert(property.name().to_string(), result);
                    }
                }
                node.delegate = discover_delegate(object, class.delegates());
            }
            None => trace!(%id, class = ?hierarchy.first(), "no descriptor for class"),
        }

        if let Some(renderer) = object.content_renderer() {
            node.html_page = self.bridges.extract(&renderer);
            if node.html_page.is_none() {
                debug!(%id, "content tree unavailable");
            }
        }

        node
    }
}

impl std::fmt::Debug for GraphSerializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphSerializer")
            .field("classes", &self.schema.class_count())
            .field("accessors", &self.accessors)
            .field("identity", &self.identity)
            .field("options", &self.options)
            .finish()
    }
}
