use glimpse_schema::DelegateDescriptor;
use indexmap::{IndexMap, IndexSet};

use crate::object::ObjectRef;
use crate::snapshot::DelegateInfo;

/// Describe the delegate of `object`.
///
/// Each distinct relationship is followed once, in declaration order, and the
/// first one that resolves supplies the delegate. Its reported selectors are
/// the declared ones it responds to, in declared order, without duplicates.
/// The delegate itself is never queued for serialization.
pub fn discover_delegate(object: &ObjectRef, delegates: &[DelegateDescriptor]) -> DelegateInfo {
    let mut relationships: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for descriptor in delegates {
        relationships
            .entry(descriptor.relationship.as_str())
            .or_default()
            .extend(descriptor.selectors.iter().map(String::as_str));
    }

    for (relationship, selectors) in relationships {
        let Some(delegate) = object.relationship(relationship) else {
            continue;
        };

        let class = delegate.class_hierarchy().into_iter().next().unwrap_or_default();
        let selectors: IndexSet<&str> = selectors
            .into_iter()
            .filter(|selector| delegate.responds_to(selector))
            .collect();

        return DelegateInfo {
            class,
            selectors: selectors.into_iter().map(str::to_string).collect(),
        };
    }

    DelegateInfo::default()
}
