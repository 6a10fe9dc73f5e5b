use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use thiserror::Error;

/// Index of a node inside one snapshot's parallel arrays.
pub type NodeIndex = usize;

// ============================================================================
// Wire model (DOMSnapshot.captureSnapshot result)
// ============================================================================

/// Raw capture as returned by the browser. Only the first document is used.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSnapshot {
    pub documents: Vec<RawDocument>,
    pub strings: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    pub nodes: RawNodeTree,
    pub layout: RawLayoutTree,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNodeTree {
    #[serde(default)]
    pub parent_index: Vec<i64>,
    #[serde(default)]
    pub node_name: Vec<i64>,
    #[serde(default)]
    pub node_value: Vec<i64>,
    #[serde(default)]
    pub backend_node_id: Vec<i64>,
    #[serde(default)]
    pub attributes: Vec<Vec<i64>>,
    #[serde(default)]
    pub input_value: RareStringData,
    #[serde(default)]
    pub is_clickable: RareBooleanData,
}

/// Sparse string column: `value[i]` belongs to node `index[i]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RareStringData {
    #[serde(default)]
    pub index: Vec<i64>,
    #[serde(default)]
    pub value: Vec<i64>,
}

/// Sparse boolean column: every listed node has the flag set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RareBooleanData {
    #[serde(default)]
    pub index: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLayoutTree {
    #[serde(default)]
    pub node_index: Vec<i64>,
    #[serde(default)]
    pub bounds: Vec<Vec<f64>>,
}

// ============================================================================
// Validated snapshot
// ============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(String),

    #[error("snapshot contains no documents")]
    NoDocument,

    #[error("node column '{column}' has {actual} entries, expected {expected}")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("node {node} has parent index {parent} outside the snapshot")]
    ParentOutOfRange { node: NodeIndex, parent: i64 },

    #[error("string index {index} outside string table of {len} entries")]
    StringOutOfRange { index: i64, len: usize },

    #[error("layout entry {entry} is malformed: {reason}")]
    Layout { entry: usize, reason: String },
}

/// Layout box in device pixels, as reported by the browser.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One per-cycle capture of the rendered page.
///
/// Nodes are addressed by [`NodeIndex`]; every accessor resolves string-table
/// references so callers never touch raw indices.
#[derive(Debug, Clone)]
pub struct Snapshot {
    strings: Vec<String>,
    nodes: RawNodeTree,
    layout: HashMap<NodeIndex, LayoutBox>,
    input_values: HashMap<NodeIndex, i64>,
    clickable: HashSet<NodeIndex>,
}

impl Snapshot {
    pub fn from_json(value: serde_json::Value) -> Result<Self, SnapshotError> {
        let raw: RawSnapshot =
            serde_json::from_value(value).map_err(|e| SnapshotError::Malformed(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawSnapshot) -> Result<Self, SnapshotError> {
        let RawSnapshot { documents, strings } = raw;
        let document = documents
            .into_iter()
            .next()
            .ok_or(SnapshotError::NoDocument)?;
        let nodes = document.nodes;
        let count = nodes.node_name.len();

        check_column("parentIndex", count, nodes.parent_index.len())?;
        check_column("nodeValue", count, nodes.node_value.len())?;
        if !nodes.attributes.is_empty() {
            check_column("attributes", count, nodes.attributes.len())?;
        }
        if !nodes.backend_node_id.is_empty() {
            check_column("backendNodeId", count, nodes.backend_node_id.len())?;
        }

        for (node, &parent) in nodes.parent_index.iter().enumerate() {
            if parent >= count as i64 || parent < -1 {
                return Err(SnapshotError::ParentOutOfRange { node, parent });
            }
        }

        for &index in nodes.node_name.iter() {
            check_string(index, strings.len())?;
        }
        for &index in nodes.node_value.iter().filter(|i| **i >= 0) {
            check_string(index, strings.len())?;
        }
        for &index in nodes.attributes.iter().flatten().filter(|i| **i >= 0) {
            check_string(index, strings.len())?;
        }

        let layout = index_layout(&document.layout, count)?;

        let input_values = nodes
            .input_value
            .index
            .iter()
            .zip(nodes.input_value.value.iter())
            .filter(|(node, value)| **node >= 0 && **value >= 0 && (**value as usize) < strings.len())
            .map(|(node, value)| (*node as NodeIndex, *value))
            .collect();

        let clickable = nodes
            .is_clickable
            .index
            .iter()
            .filter(|i| **i >= 0)
            .map(|i| *i as NodeIndex)
            .collect();

        Ok(Snapshot {
            strings,
            nodes,
            layout,
            input_values,
            clickable,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.node_name.len()
    }

    /// Lower-cased tag name (`#text` for text nodes).
    pub fn tag(&self, node: NodeIndex) -> String {
        self.string(self.nodes.node_name[node])
            .unwrap_or_default()
            .to_lowercase()
    }

    pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        let parent = self.nodes.parent_index[node];
        (parent >= 0).then_some(parent as NodeIndex)
    }

    pub fn node_value(&self, node: NodeIndex) -> Option<&str> {
        self.string(self.nodes.node_value[node])
    }

    pub fn input_value(&self, node: NodeIndex) -> Option<&str> {
        self.input_values
            .get(&node)
            .and_then(|index| self.string(*index))
    }

    pub fn backend_node_id(&self, node: NodeIndex) -> Option<i64> {
        self.nodes.backend_node_id.get(node).copied()
    }

    pub fn is_clickable(&self, node: NodeIndex) -> bool {
        self.clickable.contains(&node)
    }

    pub fn layout(&self, node: NodeIndex) -> Option<LayoutBox> {
        self.layout.get(&node).copied()
    }

    /// Attribute `(key, value)` pairs in document order. Pairs whose value
    /// index is negative are skipped.
    pub fn attributes(&self, node: NodeIndex) -> impl Iterator<Item = (&str, &str)> {
        let pairs = self
            .nodes
            .attributes
            .get(node)
            .map(|a| a.as_slice())
            .unwrap_or(&[]);

        pairs.chunks_exact(2).filter_map(|pair| {
            let key = self.string(pair[0])?;
            let value = self.string(pair[1])?;
            Some((key, value))
        })
    }

    fn string(&self, index: i64) -> Option<&str> {
        if index < 0 {
            return None;
        }
        self.strings.get(index as usize).map(|s| s.as_str())
    }
}

fn check_column(column: &'static str, expected: usize, actual: usize) -> Result<(), SnapshotError> {
    if expected == actual {
        Ok(())
    } else {
        Err(SnapshotError::ColumnLength {
            column,
            expected,
            actual,
        })
    }
}

fn check_string(index: i64, len: usize) -> Result<(), SnapshotError> {
    if index < 0 || index as usize >= len {
        return Err(SnapshotError::StringOutOfRange { index, len });
    }
    Ok(())
}

fn index_layout(
    layout: &RawLayoutTree,
    node_count: usize,
) -> Result<HashMap<NodeIndex, LayoutBox>, SnapshotError> {
    if layout.node_index.len() != layout.bounds.len() {
        return Err(SnapshotError::Layout {
            entry: layout.node_index.len().min(layout.bounds.len()),
            reason: format!(
                "{} node indices but {} bounds",
                layout.node_index.len(),
                layout.bounds.len()
            ),
        });
    }

    let mut map = HashMap::with_capacity(layout.node_index.len());

    for (entry, (&node, bounds)) in layout.node_index.iter().zip(&layout.bounds).enumerate() {
        if node < 0 || node as usize >= node_count {
            return Err(SnapshotError::Layout {
                entry,
                reason: format!("node index {} outside the snapshot", node),
            });
        }
        let &[x, y, width, height] = bounds.as_slice() else {
            return Err(SnapshotError::Layout {
                entry,
                reason: format!("expected 4 bound values, got {}", bounds.len()),
            });
        };

        // A node can own several layout entries; the first one is its box.
        map.entry(node as NodeIndex).or_insert(LayoutBox {
            x,
            y,
            width,
            height,
        });
    }

    Ok(map)
}
