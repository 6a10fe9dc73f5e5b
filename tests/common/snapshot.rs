use serde_json::{json, Value};

use screen_crawler::snapshot::snapshot_model::Snapshot;

/// Builds DOMSnapshot-shaped captures node by node.
#[derive(Debug, Default, Clone)]
pub struct SnapshotBuilder {
    strings: Vec<String>,
    parents: Vec<i64>,
    names: Vec<i64>,
    values: Vec<i64>,
    attributes: Vec<Vec<i64>>,
    backend_ids: Vec<i64>,
    clickable: Vec<i64>,
    input_nodes: Vec<i64>,
    input_values: Vec<i64>,
    layout_nodes: Vec<i64>,
    bounds: Vec<Vec<f64>>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, s: &str) -> i64 {
        if let Some(pos) = self.strings.iter().position(|x| x == s) {
            return pos as i64;
        }
        self.strings.push(s.to_string());
        (self.strings.len() - 1) as i64
    }

    /// Add an element node (tag names are upper-case on the wire, like Chrome).
    pub fn element(&mut self, tag: &str, parent: Option<usize>) -> usize {
        let name = self.intern(&tag.to_uppercase());
        self.push(name, -1, parent)
    }

    pub fn text(&mut self, value: &str, parent: usize) -> usize {
        let name = self.intern("#text");
        let value = self.intern(value);
        self.push(name, value, Some(parent))
    }

    pub fn comment(&mut self, value: &str, parent: usize) -> usize {
        let name = self.intern("#comment");
        let value = self.intern(value);
        self.push(name, value, Some(parent))
    }

    fn push(&mut self, name: i64, value: i64, parent: Option<usize>) -> usize {
        let index = self.names.len();
        self.names.push(name);
        self.values.push(value);
        self.parents.push(parent.map(|p| p as i64).unwrap_or(-1));
        self.attributes.push(Vec::new());
        self.backend_ids.push(1000 + index as i64);
        index
    }

    pub fn attr(&mut self, node: usize, key: &str, value: &str) -> &mut Self {
        let key = self.intern(key);
        let value = self.intern(value);
        self.attributes[node].extend([key, value]);
        self
    }

    pub fn bounds(&mut self, node: usize, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.layout_nodes.push(node as i64);
        self.bounds.push(vec![x, y, width, height]);
        self
    }

    /// Give a node a small box near the top-left corner.
    pub fn visible(&mut self, node: usize) -> &mut Self {
        self.bounds(node, 10.0, 10.0, 100.0, 20.0)
    }

    pub fn clickable(&mut self, node: usize) -> &mut Self {
        self.clickable.push(node as i64);
        self
    }

    pub fn input_value(&mut self, node: usize, value: &str) -> &mut Self {
        let value = self.intern(value);
        self.input_nodes.push(node as i64);
        self.input_values.push(value);
        self
    }

    pub fn to_json(&self) -> Value {
        json!({
            "documents": [{
                "nodes": {
                    "parentIndex": self.parents,
                    "nodeName": self.names,
                    "nodeValue": self.values,
                    "backendNodeId": self.backend_ids,
                    "attributes": self.attributes,
                    "inputValue": { "index": self.input_nodes, "value": self.input_values },
                    "isClickable": { "index": self.clickable },
                },
                "layout": {
                    "nodeIndex": self.layout_nodes,
                    "bounds": self.bounds,
                },
            }],
            "strings": self.strings,
        })
    }

    pub fn build(&self) -> Snapshot {
        Snapshot::from_json(self.to_json()).expect("builder produces valid snapshots")
    }
}

/// `html > body` skeleton; returns the builder and the body index.
pub fn page() -> (SnapshotBuilder, usize) {
    let mut b = SnapshotBuilder::new();
    let html = b.element("html", None);
    let body = b.element("body", Some(html));
    b.bounds(html, 0.0, 0.0, 1280.0, 3000.0);
    b.bounds(body, 0.0, 0.0, 1280.0, 3000.0);
    (b, body)
}
