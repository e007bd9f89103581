use indextree::NodeId;

use crate::tree::{Rgb, TmTree};
use crate::treemap::{Point, Rect};

/// One rectangle a renderer should fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColoredRect {
    pub rect: Rect,
    pub color: Rgb,
    pub node: NodeId,
}

impl TmTree {
    /// Whether `id` is drawn as a single block: a leaf or a collapsed folder.
    pub fn is_frontier(&self, id: NodeId) -> bool {
        self.is_leaf(id) || !self.is_expanded(id)
    }

    /// Rectangles of the visible frontier below `id`, in layout order.
    ///
    /// Zero-sized nodes contribute nothing. Collapsed folders stand in for
    /// their whole subtree.
    pub fn get_rectangles(&self, id: NodeId) -> Vec<ColoredRect> {
        let mut out = Vec::new();
        self.collect_rectangles(id, &mut out);
        out
    }

    fn collect_rectangles(&self, id: NodeId, out: &mut Vec<ColoredRect>) {
        let node = self.node(id);
        if node.data_size == 0 || (node.expanded && node.is_empty()) {
            return;
        }

        if self.is_frontier(id) {
            out.push(ColoredRect {
                rect: node.rect,
                color: node.color,
                node: id,
            });
            return;
        }

        for child in id.children(&self.arena) {
            self.collect_rectangles(child, out);
        }
    }

    /// The visible frontier node below `id` whose rectangle contains `pos`.
    ///
    /// Edges count as inside. A position on an edge shared by two siblings
    /// resolves to the leftmost, then topmost, of them. Returns `None` when
    /// `pos` is outside `id`'s rectangle or `id` has nothing to show.
    pub fn get_tree_at_position(&self, id: NodeId, pos: Point) -> Option<NodeId> {
        let node = self.node(id);
        if node.is_empty() || node.data_size == 0 || !node.rect.contains(pos) {
            return None;
        }
        self.frontier_at(id, node.rect.nudge_inside(pos))
    }

    fn frontier_at(&self, id: NodeId, pos: Point) -> Option<NodeId> {
        if self.is_frontier(id) {
            return Some(id);
        }

        for child in id.children(&self.arena) {
            let node = self.node(child);
            if node.data_size == 0 || node.rect.is_degenerate() || !node.rect.contains(pos) {
                continue;
            }
            return self.frontier_at(child, node.rect.nudge_inside(pos));
        }
        None
    }
}
