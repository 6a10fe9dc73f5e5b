use std::collections::HashMap;

use crate::crawl::ancestry::AncestryEntry;
use crate::crawl::crawl_model::{Fragment, MetaAttribute};
use crate::snapshot::snapshot_model::{LayoutBox, NodeIndex, Snapshot};

/// Attributes worth showing next to an element.
pub const RECOGNIZED_ATTRIBUTES: [&str; 5] = ["type", "placeholder", "aria-label", "title", "alt"];

/// Decorative separators that carry no meaning inside a link or button.
const SEPARATORS: [&str; 2] = ["|", "\u{2022}"];

/// Fragments collected per owning root, in traversal order.
#[derive(Debug, Default)]
pub struct FragmentStore {
    fragments: HashMap<NodeIndex, Vec<Fragment>>,
}

impl FragmentStore {
    pub fn push(&mut self, root: NodeIndex, fragment: Fragment) {
        self.fragments.entry(root).or_default().push(fragment);
    }

    pub fn get(&self, root: NodeIndex) -> &[Fragment] {
        self.fragments.get(&root).map(|f| f.as_slice()).unwrap_or(&[])
    }

    pub fn take(&mut self, root: NodeIndex) -> Vec<Fragment> {
        self.fragments.remove(&root).unwrap_or_default()
    }
}

/// A visible node that may become an element of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub node: NodeIndex,
    /// Tag after renaming (`input type=submit` becomes `button`).
    pub tag: String,
    pub value: Option<String>,
    pub meta: Vec<MetaAttribute>,
    pub clickable: bool,
    /// Layout box in CSS pixels.
    pub bounds: LayoutBox,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Contribution {
    Candidate(Candidate),
    MergedInto(NodeIndex),
    /// Stand-alone separator glyph.
    Separator,
}

/// Recognized attributes in document order; the first occurrence of a key wins.
pub fn recognized_attributes(snapshot: &Snapshot, node: NodeIndex) -> Vec<MetaAttribute> {
    let mut found: Vec<MetaAttribute> = Vec::new();

    for (key, value) in snapshot.attributes(node) {
        if !RECOGNIZED_ATTRIBUTES.contains(&key) || found.iter().any(|a| a.key == key) {
            continue;
        }
        found.push(MetaAttribute {
            key: key.to_string(),
            value: value.to_string(),
        });
        if found.len() == RECOGNIZED_ATTRIBUTES.len() {
            break;
        }
    }

    found
}

/// The root that owns a node's contribution. Anchors take precedence over
/// buttons when a node sits inside both.
pub fn owner_of(anchor: AncestryEntry, button: AncestryEntry) -> Option<NodeIndex> {
    if anchor.is_descendant {
        anchor.root
    } else if button.is_descendant {
        button.root
    } else {
        None
    }
}

fn is_separator(text: &str) -> bool {
    SEPARATORS.contains(&text)
}

fn is_root_tag(tag: &str) -> bool {
    tag == "a" || tag == "button"
}

/// Route one visible node: either it becomes a candidate element, or its text
/// and attributes are handed to the root that owns it.
pub fn contribute(
    snapshot: &Snapshot,
    node: NodeIndex,
    bounds: LayoutBox,
    owner: Option<NodeIndex>,
    store: &mut FragmentStore,
) -> Contribution {
    let mut tag = snapshot.tag(node);

    if let (Some(root), "#text") = (owner, tag.as_str()) {
        let text = snapshot.node_value(node).unwrap_or_default().trim();
        if !text.is_empty() && !is_separator(text) {
            store.push(root, Fragment::Text(text.to_string()));
        }
        return Contribution::MergedInto(root);
    }

    let mut attributes = recognized_attributes(snapshot, node);

    let is_submit = tag == "input"
        && attributes
            .iter()
            .any(|a| a.key == "type" && a.value == "submit");
    if is_submit || tag == "button" {
        tag = "button".to_string();
        // The kind already says "button".
        attributes.retain(|a| a.key != "type");
    }

    // Descendants of a root hand everything over, separators included.
    if let Some(root) = owner.filter(|_| !is_root_tag(&tag)) {
        for attribute in attributes {
            store.push(
                root,
                Fragment::Attribute {
                    key: attribute.key,
                    value: attribute.value,
                },
            );
        }
        return Contribution::MergedInto(root);
    }
    let meta = attributes;

    let value = match snapshot.node_value(node) {
        Some(value) if is_separator(value.trim()) => return Contribution::Separator,
        Some(value) => Some(value.to_string()),
        None if tag == "input" || tag == "textarea" => {
            snapshot.input_value(node).map(str::to_string)
        }
        None => None,
    };

    Contribution::Candidate(Candidate {
        node,
        tag,
        value,
        meta,
        clickable: snapshot.is_clickable(node),
        bounds,
    })
}
