//! Content-tree data: the in-memory document model, reported nodes, and the
//! `htmlPage` record merged into a snapshot node.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::slot::REQUEST_FIELD;

/// A layout box in viewport coordinates, shaped like a DOM `DOMRect`.
///
/// Deserializes from `{x, y, width, height}`; the edge fields are derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Frame")]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            top: y,
            right: x + width,
            bottom: y + height,
            left: x,
        }
    }
}

#[derive(Deserialize)]
struct Frame {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
}

impl From<Frame> for Rect {
    fn from(frame: Frame) -> Self {
        Rect::new(frame.x, frame.y, frame.width, frame.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Fully inside, edges touching the viewport included.
    pub fn contains(&self, rect: &Rect) -> bool {
        rect.top >= 0.0 && rect.left >= 0.0 && rect.bottom <= self.height && rect.right <= self.width
    }
}

/// One element of the in-memory document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub rect: Rect,

    #[serde(default)]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>, rect: Rect) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            rect,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }
}

/// A rendered page: location path, viewport and `<body>` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "path")]
    pub location_path: String,
    pub viewport: Viewport,
    pub body: Element,
}

impl Document {
    pub fn new(location_path: impl Into<String>, viewport: Viewport) -> Self {
        Self {
            location_path: location_path.into(),
            viewport,
            body: Element::new("body", Rect::new(0.0, 0.0, viewport.width, viewport.height)),
        }
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.body.children.push(child);
        self
    }
}

/// A visible element as reported by the content script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub path: String,
    pub rect: Rect,
}

/// What one content-script run produced, before it is stringified for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentReport {
    pub path: String,
    pub client_width: f64,
    pub client_height: f64,
    pub nodes: Vec<ContentNode>,
}

impl ContentReport {
    /// The all-string message the content script posts on a named channel,
    /// tagged with the request it answers when there is one.
    pub fn to_message(&self, request: Option<u64>) -> Result<Value> {
        let mut message = Map::new();
        if let Some(request) = request {
            message.insert(REQUEST_FIELD.into(), Value::String(request.to_string()));
        }
        message.insert("path".into(), Value::String(self.path.clone()));
        message.insert("clientWidth".into(), Value::String(self.client_width.to_string()));
        message.insert("clientHeight".into(), Value::String(self.client_height.to_string()));
        message.insert("nodes".into(), Value::String(serde_json::to_string(&self.nodes)?));
        Ok(Value::Object(message))
    }

    pub fn into_tree_info(self) -> Result<ContentTreeInfo> {
        Ok(ContentTreeInfo {
            url: self.path,
            client_width: self.client_width.to_string(),
            client_height: self.client_height.to_string(),
            nodes: serde_json::to_string(&self.nodes)?,
        })
    }
}

/// The `htmlPage` entry of a snapshot node. Every field is a string; `nodes`
/// is itself JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTreeInfo {
    pub url: String,
    pub client_width: String,
    pub client_height: String,
    pub nodes: String,
}

impl ContentTreeInfo {
    /// Decode the node list. An empty string decodes as no nodes.
    pub fn parsed_nodes(&self) -> Result<Vec<ContentNode>> {
        if self.nodes.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&self.nodes)?)
    }

    /// Apply a channel message. Only string-valued fields are taken; anything
    /// missing or mistyped leaves the previous value in place.
    pub fn merge_message(&mut self, message: &Value) {
        let field = |key: &str| message.get(key).and_then(Value::as_str).map(str::to_owned);

        if let Some(path) = field("path") {
            self.url = path;
        }
        if let Some(width) = field("clientWidth") {
            self.client_width = width;
        }
        if let Some(height) = field("clientHeight") {
            self.client_height = height;
        }
        if let Some(nodes) = field("nodes") {
            self.nodes = nodes;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rect_derives_edges_from_frame() {
        let rect: Rect = serde_json::from_value(json!({ "x": 10, "y": 20, "width": 30, "height": 40 })).unwrap();
        assert_eq!(rect.right, 40.0);
        assert_eq!(rect.bottom, 60.0);
        assert_eq!(rect, Rect::new(10.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn viewport_includes_touching_edges() {
        let viewport = Viewport::new(100.0, 100.0);
        assert!(viewport.contains(&Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert!(!viewport.contains(&Rect::new(-1.0, 0.0, 10.0, 10.0)));
        assert!(!viewport.contains(&Rect::new(0.0, 95.0, 10.0, 10.0)));
    }

    #[test]
    fn merge_keeps_prior_values_for_mistyped_fields() {
        let mut info = ContentTreeInfo {
            url: "/old".into(),
            client_width: "320".into(),
            client_height: "480".into(),
            nodes: "[]".into(),
        };

        info.merge_message(&json!({ "path": "/new", "clientWidth": 375, "nodes": "[{}]" }));

        assert_eq!(info.url, "/new");
        assert_eq!(info.client_width, "320");
        assert_eq!(info.client_height, "480");
        assert_eq!(info.nodes, "[{}]");
    }

    #[test]
    fn tree_info_serializes_camel_case() {
        let info = ContentTreeInfo {
            url: "/".into(),
            client_width: "375".into(),
            client_height: "667".into(),
            nodes: "[]".into(),
        };
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({ "url": "/", "clientWidth": "375", "clientHeight": "667", "nodes": "[]" })
        );
    }
}
