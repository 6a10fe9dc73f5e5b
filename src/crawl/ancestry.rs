use std::collections::HashMap;

use crate::snapshot::snapshot_model::{NodeIndex, Snapshot};

/// Resolved ownership of one node: whether it sits inside (or is) a root of
/// the tracked tag, and which root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AncestryEntry {
    pub is_descendant: bool,
    pub root: Option<NodeIndex>,
}

impl AncestryEntry {
    const NONE: AncestryEntry = AncestryEntry {
        is_descendant: false,
        root: None,
    };

    fn owned_by(root: NodeIndex) -> Self {
        AncestryEntry {
            is_descendant: true,
            root: Some(root),
        }
    }
}

/// Memoized nearest-root lookup for a single root tag (`a` or `button`).
///
/// Entries are filled top-down: a node is only resolved once its parent is.
/// A node carrying the root tag owns its own subtree even when it is nested
/// inside another root of the same tag.
#[derive(Debug, Clone)]
pub struct AncestryResolver {
    root_tag: &'static str,
    entries: HashMap<NodeIndex, AncestryEntry>,
}

impl AncestryResolver {
    pub fn new(root_tag: &'static str) -> Self {
        AncestryResolver {
            root_tag,
            entries: HashMap::new(),
        }
    }

    pub fn anchors() -> Self {
        Self::new("a")
    }

    pub fn buttons() -> Self {
        Self::new("button")
    }

    pub fn root_tag(&self) -> &'static str {
        self.root_tag
    }

    /// Number of nodes resolved so far.
    pub fn resolved(&self) -> usize {
        self.entries.len()
    }

    pub fn resolve(&mut self, snapshot: &Snapshot, node: NodeIndex) -> AncestryEntry {
        if let Some(entry) = self.entries.get(&node) {
            return *entry;
        }

        // Climb to the nearest resolved ancestor (or the top of the tree),
        // then fill the chain back down.
        let mut chain = vec![node];
        let mut inherited = AncestryEntry::NONE;
        let mut cursor = snapshot.parent(node);

        while let Some(parent) = cursor {
            if let Some(entry) = self.entries.get(&parent) {
                inherited = *entry;
                break;
            }
            // Parent graph must be acyclic; bail out rather than spin.
            if chain.len() > snapshot.node_count() {
                tracing::warn!(node, "cyclic parent chain in snapshot");
                break;
            }
            chain.push(parent);
            cursor = snapshot.parent(parent);
        }

        for &current in chain.iter().rev() {
            let entry = if snapshot.tag(current) == self.root_tag {
                AncestryEntry::owned_by(current)
            } else {
                inherited
            };
            self.entries.insert(current, entry);
            inherited = entry;
        }

        inherited
    }
}
