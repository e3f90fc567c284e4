//! # glimpse-graph
//!
//! Breadth-first serializer turning a live object graph into a flat,
//! identifier-keyed snapshot.
//!
//! ## Overview
//!
//! Starting from a root, the serializer describes every object reachable
//! through the properties its [`SchemaRegistry`](glimpse_schema::SchemaRegistry)
//! declares. Each object becomes one [`SerializedNode`]:
//!
//! ```text
//! {
//!   "id": "$1",
//!   "class": ["UIButton", "UIControl", "UIView"],
//!   "properties": {
//!     "frame": { "value": { "X": 0, "Y": 0, "Width": 100, "Height": 44 } },
//!     "title": { "values": [{ "where": { "parameters": [0] }, "value": "Buy" }] }
//!   },
//!   "delegate": { "class": "", "selectors": [] }
//! }
//! ```
//!
//! Nested objects, including back-edges of cycles, appear as identifiers
//! (`"$2"`), so every object is described exactly once.
//!
//! ## Architecture
//!
//! - **ObjectIdentityProvider**: one stable token per live reference
//! - **TraversalContext**: FIFO frontier, visited set and finished nodes
//! - **PropertyIntrospector**: direct reads and accessor invocation across
//!   parameter variations
//! - **ValueTransformer**: identifiers for nested objects, transforms for
//!   everything else
//! - **discover_delegate**: the delegate's class and implemented selectors
//! - **GraphSerializer**: ties it together, plus `htmlPage` extraction through
//!   [`glimpse_bridge`]
//! - **FixtureGraph**: object graphs described as JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use glimpse_graph::{FixtureGraph, GraphSerializer};
//! use glimpse_schema::{ClassDescriptor, PropertyDescriptor, SchemaRegistry, Transform};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = SchemaRegistry::builder()
//!     .class(
//!         ClassDescriptor::new("Screen").with_property(
//!             PropertyDescriptor::builder("child", "Screen")
//!                 .transform(Transform::identity())
//!                 .build()?,
//!         ),
//!     )
//!     .build()?;
//!
//! let graph = FixtureGraph::from_json(r#"{
//!     "root": "r",
//!     "objects": {
//!         "r": { "class": ["Screen"], "attributes": { "child": { "$ref": "c" } } },
//!         "c": { "class": ["Screen"], "attributes": { "child": { "$ref": "r" } } }
//!     }
//! }"#)?;
//!
//! let serializer = GraphSerializer::new(Arc::new(schema));
//! let snapshot = serializer.serialize(&graph.root())?;
//!
//! assert_eq!(snapshot.len(), 2);
//! assert_eq!(snapshot.root_object.to_string(), "$1");
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod context;
pub mod delegate;
pub mod error;
pub mod fixture;
pub mod identity;
pub mod introspect;
pub mod object;
pub mod serializer;
pub mod snapshot;
pub mod transform;

pub use context::TraversalContext;
pub use delegate::discover_delegate;
pub use error::{FixtureError, GraphError, Result};
pub use fixture::{FixtureGraph, FixtureObject, FixtureSpec, ObjectSpec};
pub use identity::{ObjectId, ObjectIdentityProvider};
pub use introspect::PropertyIntrospector;
pub use object::{AccessorTable, Introspect, InvokeError, ObjectRef, RawValue};
pub use serializer::{GraphSerializer, SerializerOptions};
pub use snapshot::{DelegateInfo, PropertyResult, SerializedNode, Snapshot, Variation, Where};
pub use transform::ValueTransformer;
