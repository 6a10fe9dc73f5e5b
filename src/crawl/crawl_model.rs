use std::fmt;

use serde::Serialize;

use crate::snapshot::snapshot_model::NodeIndex;

/// Display kind of a materialized element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Link,
    Button,
    Input,
    Img,
    Heading,
    Text,
}

impl ElementKind {
    /// Map a (possibly renamed) tag to its display kind.
    pub fn from_tag(tag: &str, clickable: bool) -> Self {
        match tag {
            "a" => ElementKind::Link,
            "input" | "textarea" => ElementKind::Input,
            "img" => ElementKind::Img,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => ElementKind::Heading,
            "button" => ElementKind::Button,
            _ if clickable => ElementKind::Button,
            _ => ElementKind::Text,
        }
    }

    /// Kinds kept even when they carry no text.
    pub fn always_kept(&self) -> bool {
        matches!(
            self,
            ElementKind::Link | ElementKind::Input | ElementKind::Img | ElementKind::Heading
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Link => "link",
            ElementKind::Button => "button",
            ElementKind::Input => "input",
            ElementKind::Img => "img",
            ElementKind::Heading => "heading",
            ElementKind::Text => "text",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A piece of descendant data redirected to the root that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Attribute { key: String, value: String },
}

/// One `key="value"` annotation on an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaAttribute {
    pub key: String,
    pub value: String,
}

impl fmt::Display for MetaAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.key, self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

/// A materialized element: everything needed to display it and act on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementRecord {
    pub id: usize,
    pub node_index: NodeIndex,
    pub backend_node_id: Option<i64>,
    pub kind: ElementKind,
    pub text: String,
    pub meta: Vec<MetaAttribute>,
    pub clickable: bool,
    pub origin: Point,
    pub center: Point,
}

impl ElementRecord {
    /// Tag-like line shown to the decision maker.
    pub fn render(&self) -> String {
        let mut line = format!("<{} id={}", self.kind, self.id);
        for attribute in &self.meta {
            line.push(' ');
            line.push_str(&attribute.to_string());
        }

        if self.text.is_empty() {
            line.push_str("/>");
        } else {
            line.push_str(&format!(">{}</{}>", self.text, self.kind));
        }
        line
    }
}

/// Id-indexed table of the elements emitted in one cycle.
///
/// Ids are dense and zero-based: the record with id `n` sits at position `n`.
/// A buffer is never updated in place; each cycle builds a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementBuffer {
    records: Vec<ElementRecord>,
}

impl ElementBuffer {
    pub(crate) fn push(&mut self, mut record: ElementRecord) -> usize {
        let id = self.records.len();
        record.id = id;
        self.records.push(record);
        id
    }

    pub fn get(&self, id: usize) -> Option<&ElementRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementRecord> {
        self.records.iter()
    }
}

/// What happened to a snapshot node during one crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "fate", rename_all = "snake_case")]
pub enum NodeFate {
    /// Structural tag that never renders content.
    ExcludedTag,
    /// No layout box.
    NotRendered,
    OutsideViewport,
    /// Contribution redirected into an anchor/button root.
    MergedInto { root: NodeIndex },
    /// Nothing worth showing after merging.
    Dropped,
    Emitted { id: usize },
}

/// Output of one crawl cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawledPage {
    pub buffer: ElementBuffer,
    pub fates: Vec<NodeFate>,
}

impl CrawledPage {
    pub fn lines(&self) -> Vec<String> {
        self.buffer.iter().map(ElementRecord::render).collect()
    }

    /// The element list as handed to the decision maker.
    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}
