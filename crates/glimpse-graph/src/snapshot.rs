//! The snapshot document and its nodes.

use glimpse_bridge::ContentTreeInfo;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::identity::ObjectId;

/// `{"objects": {id: node}, "rootObject": id}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub objects: IndexMap<ObjectId, SerializedNode>,
    pub root_object: ObjectId,
}

impl Snapshot {
    pub fn root(&self) -> Option<&SerializedNode> {
        self.objects.get(&self.root_object)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SerializedNode> {
        self.objects.get(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// One object's record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedNode {
    pub id: ObjectId,
    /// Most-derived class first.
    pub class: Vec<String>,
    pub properties: IndexMap<String, PropertyResult>,
    pub delegate: DelegateInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_page: Option<ContentTreeInfo>,
}

impl SerializedNode {
    pub fn new(id: ObjectId, class: Vec<String>) -> Self {
        Self {
            id,
            class,
            properties: IndexMap::new(),
            delegate: DelegateInfo::default(),
            html_page: None,
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyResult> {
        self.properties.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyResult {
    /// A direct attribute read.
    Direct { value: Value },
    /// One entry per accessor variation that produced a value.
    Invoked { values: Vec<Variation> },
}

impl PropertyResult {
    /// The single value of a direct read, or of an invoke with exactly one
    /// variation.
    pub fn single(&self) -> Option<&Value> {
        match self {
            PropertyResult::Direct { value } => Some(value),
            PropertyResult::Invoked { values } if values.len() == 1 => Some(&values[0].value),
            PropertyResult::Invoked { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variation {
    #[serde(rename = "where")]
    pub condition: Where,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Where {
    pub parameters: Vec<Value>,
}

impl Variation {
    pub fn new(parameters: Vec<Value>, value: Value) -> Self {
        Self {
            condition: Where { parameters },
            value,
        }
    }

    pub fn parameters(&self) -> &[Value] {
        &self.condition.parameters
    }
}

/// The delegate an object reports, or `{class: "", selectors: []}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DelegateInfo {
    pub class: String,
    pub selectors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn property_results_use_wire_shapes() {
        let direct = PropertyResult::Direct { value: json!(3) };
        assert_eq!(serde_json::to_value(&direct).unwrap(), json!({ "value": 3 }));

        let invoked = PropertyResult::Invoked {
            values: vec![Variation::new(vec![json!(0)], json!("Buy"))],
        };
        assert_eq!(
            serde_json::to_value(&invoked).unwrap(),
            json!({ "values": [{ "where": { "parameters": [0] }, "value": "Buy" }] })
        );
    }

    #[test]
    fn empty_delegate_serializes_blank() {
        assert_eq!(
            serde_json::to_value(DelegateInfo::default()).unwrap(),
            json!({ "class": "", "selectors": [] })
        );
    }
}
