//! The content script.
//!
//! One walk, two renditions: JavaScript for real renderers and a native
//! evaluator over [`Document`] for the in-memory one. Both follow the same
//! rules so the same page produces the same node list either way.
//!
//! Starting from the children of `<body>`, `script` and `link` elements are
//! skipped (and so is their subtree). Every other element gets the name `tag`
//! or `tag#id` and the path `parent/name[i]`, where `i` counts earlier
//! siblings with the same name. Elements fully inside the viewport are
//! reported; recursion continues regardless.

use rustc_hash::FxHashMap;

use crate::content::{ContentNode, ContentReport, Document, Element, Viewport};
use crate::slot::REQUEST_FIELD;

/// Global object the script defines in the page.
pub const REPORT_OBJECT: &str = "glimpse_report";

const SKIPPED_TAGS: [&str; 2] = ["script", "link"];

/// How a finished report leaves the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Delivery {
    /// Synchronous call into an object the host exported into the page:
    /// `name.report(request, path, nodes, width, height)`.
    HostExport(String),
    /// WebKit-style script message handler:
    /// `window.webkit.messageHandlers[name].postMessage(message)`.
    MessageHandler(String),
    /// CDP binding: `window[name](JSON.stringify(message))`.
    Binding(String),
}

impl Delivery {
    /// Export or channel name.
    pub fn name(&self) -> &str {
        match self {
            Delivery::HostExport(name) | Delivery::MessageHandler(name) | Delivery::Binding(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentScript {
    delivery: Delivery,
}

impl ContentScript {
    pub fn new(delivery: Delivery) -> Self {
        Self { delivery }
    }

    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    /// Script source. Defines [`REPORT_OBJECT`]; message deliveries also run
    /// the report immediately so the source doubles as a document-end user script.
    pub fn source(&self) -> String {
        let mut source = self.definition();
        if !matches!(self.delivery, Delivery::HostExport(_)) {
            source.push_str(&self.trigger_expression(None));
            source.push('\n');
        }
        source
    }

    /// Source that defines the report object, if missing, and runs the report
    /// for `request`.
    pub fn request_source(&self, request: u64) -> String {
        let mut source = format!("if (typeof {REPORT_OBJECT} === 'undefined') {{\n");
        source.push_str(&self.definition());
        source.push_str("}\n");
        source.push_str(&self.trigger_expression(Some(request)));
        source.push('\n');
        source
    }

    fn definition(&self) -> String {
        let deliver = match &self.delivery {
            Delivery::HostExport(name) => {
                format!(
                    "{name}.report(String(request), window.location.pathname, JSON.stringify(nodes), String(r.clientWidth), String(r.clientHeight));"
                )
            }
            Delivery::MessageHandler(name) => {
                format!("window.webkit.messageHandlers.{name}.postMessage(r.message(nodes, request));")
            }
            Delivery::Binding(name) => {
                format!("window.{name}(JSON.stringify(r.message(nodes, request)));")
            }
        };

        format!(
            r#"var {REPORT_OBJECT} = {{}};
(function (r) {{
  r.clientWidth = (window.innerWidth || document.documentElement.clientWidth);
  r.clientHeight = (window.innerHeight || document.documentElement.clientHeight);
  r.isElementInViewport = function (rect) {{
    return rect.top >= 0 && rect.left >= 0 &&
      rect.bottom <= r.clientHeight && rect.right <= r.clientWidth;
  }};
  r.nodeName = function (node) {{
    var name = node.localName;
    if (name == 'script' || name == 'link') {{ return ''; }}
    if (node.id && node.id.length > 0) {{ name += '#' + node.id; }}
    return name;
  }};
  r.reportChildNodes = function (children, out, parentPath) {{
    var indexes = {{}};
    for (var i = 0; i < children.length; i++) {{
      var child = children[i];
      var name = r.nodeName(child);
      if (name == '') {{ continue; }}
      indexes[name] = indexes[name] == null ? 0 : indexes[name] + 1;
      var path = parentPath + '/' + name + '[' + indexes[name] + ']';
      var rect = child.getBoundingClientRect();
      if (r.isElementInViewport(rect)) {{ out.push({{ path: path, rect: rect }}); }}
      if (child.children) {{ r.reportChildNodes(child.children, out, path); }}
    }}
  }};
  r.message = function (nodes, request) {{
    var message = {{
      path: window.location.pathname,
      clientWidth: String(r.clientWidth),
      clientHeight: String(r.clientHeight),
      nodes: JSON.stringify(nodes)
    }};
    if (request != null) {{ message.{REQUEST_FIELD} = String(request); }}
    return message;
  }};
  r.reportNodes = function (request) {{
    var nodes = [];
    r.reportChildNodes(document.getElementsByTagName('body')[0].children, nodes, '');
    {deliver}
  }};
}})({REPORT_OBJECT});
"#
        )
    }

    /// Expression that re-runs the report once the source is installed.
    /// Untagged runs answer whatever request is pending.
    pub fn trigger_expression(&self, request: Option<u64>) -> String {
        match request {
            Some(request) => format!("{REPORT_OBJECT}.reportNodes({request});"),
            None => format!("{REPORT_OBJECT}.reportNodes();"),
        }
    }

    /// Evaluate the script natively against an in-memory document.
    pub fn run(&self, document: &Document) -> ContentReport {
        let mut nodes = Vec::new();
        report_child_nodes(&document.body.children, "", &document.viewport, &mut nodes);

        ContentReport {
            path: document.location_path.clone(),
            client_width: document.viewport.width,
            client_height: document.viewport.height,
            nodes,
        }
    }
}

fn node_name(element: &Element) -> Option<String> {
    if SKIPPED_TAGS.contains(&element.tag.as_str()) {
        return None;
    }
    Some(match element.id.as_deref() {
        Some(id) if !id.is_empty() => format!("{}#{id}", element.tag),
        _ => element.tag.clone(),
    })
}

fn report_child_nodes(
    children: &[Element],
    parent_path: &str,
    viewport: &Viewport,
    out: &mut Vec<ContentNode>,
) {
    let mut indexes: FxHashMap<String, usize> = FxHashMap::default();

    for child in children {
        let Some(name) = node_name(child) else {
            continue;
        };

        let index = *indexes
            .entry(name.clone())
            .and_modify(|i| *i += 1)
            .or_insert(0);
        let path = format!("{parent_path}/{name}[{index}]");

        if viewport.contains(&child.rect) {
            out.push(ContentNode {
                path: path.clone(),
                rect: child.rect,
            });
        }

        report_child_nodes(&child.children, &path, viewport, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Rect;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(x, y, w, h)
    }

    fn paths(report: &ContentReport) -> Vec<&str> {
        report.nodes.iter().map(|n| n.path.as_str()).collect()
    }

    #[test]
    fn sibling_indexes_count_per_name() {
        let document = Document::new("/list", Viewport::new(100.0, 100.0))
            .with_child(
                Element::new("div", rect(0.0, 0.0, 100.0, 50.0))
                    .with_child(Element::new("p", rect(0.0, 0.0, 10.0, 10.0)))
                    .with_child(Element::new("p", rect(0.0, 10.0, 10.0, 10.0)))
                    .with_child(Element::new("p", rect(0.0, 20.0, 10.0, 10.0))),
            )
            .with_child(Element::new("div", rect(0.0, 50.0, 100.0, 50.0)).with_id("main"));

        let report = ContentScript::new(Delivery::HostExport("Export".into())).run(&document);

        assert_eq!(
            paths(&report),
            ["/div[0]", "/div[0]/p[0]", "/div[0]/p[1]", "/div[0]/p[2]", "/div#main[0]"]
        );
        assert_eq!(report.path, "/list");
    }

    #[test]
    fn skipped_tags_do_not_consume_indexes() {
        let document = Document::new("/", Viewport::new(100.0, 100.0))
            .with_child(Element::new("script", rect(0.0, 0.0, 1.0, 1.0)))
            .with_child(
                Element::new("link", rect(0.0, 0.0, 1.0, 1.0))
                    .with_child(Element::new("span", rect(0.0, 0.0, 1.0, 1.0))),
            )
            .with_child(Element::new("span", rect(0.0, 0.0, 1.0, 1.0)));

        let report = ContentScript::new(Delivery::Binding("glimpse".into())).run(&document);
        assert_eq!(paths(&report), ["/span[0]"]);
    }

    #[test]
    fn offscreen_parents_still_recurse() {
        let document = Document::new("/", Viewport::new(100.0, 100.0)).with_child(
            Element::new("section", rect(0.0, 0.0, 100.0, 400.0))
                .with_child(Element::new("button", rect(10.0, 10.0, 80.0, 90.0)))
                .with_child(Element::new("button", rect(10.0, 120.0, 80.0, 20.0))),
        );

        let report = ContentScript::new(Delivery::Binding("glimpse".into())).run(&document);
        assert_eq!(paths(&report), ["/section[0]/button[0]"]);
    }

    #[test]
    fn message_sources_run_the_report_immediately() {
        let binding = ContentScript::new(Delivery::Binding("glimpseReport".into())).source();
        assert!(binding.contains("window.glimpseReport(JSON.stringify"));
        assert!(binding.trim_end().ends_with("glimpse_report.reportNodes();"));

        let export = ContentScript::new(Delivery::HostExport("GlimpseExport".into())).source();
        assert!(export.contains("GlimpseExport.report(String(request)"));
        assert!(!export.trim_end().ends_with("reportNodes();"));
    }

    #[test]
    fn request_source_tags_the_report() {
        let script = ContentScript::new(Delivery::Binding("glimpseReport".into()));
        let source = script.request_source(7);
        assert!(source.starts_with("if (typeof glimpse_report === 'undefined')"));
        assert!(source.contains("message.request = String(request)"));
        assert!(source.trim_end().ends_with("glimpse_report.reportNodes(7);"));
    }
}
