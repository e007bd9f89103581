//! Expansion flags. A folder is only ever expanded beneath expanded
//! ancestors, and leaves are never expanded.

use indextree::NodeId;
use tracing::debug;

use crate::tree::TmTree;

impl TmTree {
    /// Expand `id` if it is a folder, along with any collapsed ancestors.
    pub fn expand(&mut self, id: NodeId) {
        if self.is_leaf(id) {
            return;
        }
        let mut current = Some(id);
        while let Some(node_id) = current {
            self.node_mut(node_id).expanded = true;
            current = self.attached_parent(node_id);
        }
    }

    /// Expand `id` and every folder below it.
    pub fn expand_all(&mut self, id: NodeId) {
        self.expand(id);
        let folders: Vec<NodeId> = self
            .descendants(id)
            .filter(|&d| !self.is_leaf(d))
            .collect();
        for folder in folders {
            self.node_mut(folder).expanded = true;
        }
    }

    /// Collapse the whole subtree of `id`'s parent.
    ///
    /// Does nothing for a node without a parent, so a root cannot be collapsed
    /// this way; use [`TmTree::collapse_all`].
    pub fn collapse(&mut self, id: NodeId) {
        if let Some(parent) = self.get_parent(id) {
            debug!(?id, ?parent, "collapsing parent subtree");
            self.collapse_subtree(parent);
        }
    }

    /// Collapse every node in the tree containing `id`.
    pub fn collapse_all(&mut self, id: NodeId) {
        let root = self.root_of(id);
        self.collapse_subtree(root);
    }

    fn collapse_subtree(&mut self, id: NodeId) {
        let nodes: Vec<NodeId> = self.descendants(id).collect();
        for node_id in nodes {
            self.node_mut(node_id).expanded = false;
        }
    }
}
