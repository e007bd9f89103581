//! Structural and size edits.
//!
//! Every edit is a silent no-op when its preconditions fail and reports that
//! through its `bool` return. Edits repair sizes only where stated; callers
//! refresh the rest with [`TmTree::update_data_sizes`] on a common ancestor.

use indextree::NodeId;
use tracing::{debug, warn};

use crate::tree::TmTree;

impl TmTree {
    /// Move leaf `id` to be the last child of `destination`.
    ///
    /// Only a non-empty leaf can move, and only into a node that already has
    /// children and does not have `id` in its lineage. The old parent's sizes
    /// are recomputed, and `destination`'s sizes are recomputed whether or not
    /// the move happened.
    pub fn move_to(&mut self, id: NodeId, destination: NodeId) -> bool {
        let movable = self.is_leaf(id)
            && !self.is_empty(id)
            && !self.is_leaf(destination)
            && !self.lineage(destination).contains(&id);
        if !movable {
            debug!(?id, ?destination, "move rejected");
            self.update_data_sizes(destination);
            return false;
        }

        let old_parent = self.get_parent(id);
        id.detach(&mut self.arena);
        if let Err(err) = destination.checked_append(id, &mut self.arena) {
            warn!(?id, ?destination, ?err, "move failed after detach");
            if let Some(parent) = old_parent {
                self.release_if_childless(parent);
            }
            self.update_data_sizes(destination);
            return false;
        }
        self.node_mut(id).detached_from = None;

        if let Some(parent) = old_parent {
            self.release_if_childless(parent);
            self.update_data_sizes(parent);
        }
        self.update_data_sizes(destination);
        debug!(?id, ?destination, "moved leaf");
        true
    }

    /// Grow or shrink leaf `id` by `factor` of its size.
    ///
    /// The change is rounded up to a whole unit, so any non-zero factor
    /// changes a non-zero size by at least one. Growth saturates at
    /// `u64::MAX` and shrinking stops at zero. A NaN factor, folders and the
    /// empty sentinel are left alone. Ancestors are not resized.
    pub fn change_size(&mut self, id: NodeId, factor: f64) -> bool {
        if factor.is_nan() || !self.is_leaf(id) || self.is_empty(id) {
            return false;
        }

        let size = self.data_size(id);
        if size == 0 {
            return true;
        }
        // Float to int casts saturate, so an infinite change maps to u64::MAX.
        let change = (size as f64 * factor.abs()).ceil() as u64;

        let node = self.node_mut(id);
        node.data_size = if factor < 0.0 {
            size.saturating_sub(change)
        } else {
            size.saturating_add(change)
        };
        debug!(?id, from = size, to = node.data_size, "resized leaf");
        true
    }

    /// Remove `id` from its parent's children.
    ///
    /// Returns `false` when `id` has no parent. The former parent stays
    /// reachable through [`TmTree::get_parent`]; ancestor sizes are not
    /// repaired.
    pub fn delete_self(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.attached_parent(id) else {
            return false;
        };

        id.detach(&mut self.arena);
        self.node_mut(id).detached_from = Some(parent);
        self.release_if_childless(parent);
        debug!(?id, ?parent, "deleted node");
        true
    }

    /// A folder that lost its last child can no longer be expanded.
    fn release_if_childless(&mut self, id: NodeId) {
        if self.is_leaf(id) {
            self.node_mut(id).expanded = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treemap::Rect;

    struct Fixture {
        tree: TmTree,
        root: NodeId,
        src: NodeId,
        dst: NodeId,
        a: NodeId,
        b: NodeId,
        c: NodeId,
    }

    fn fixture() -> Fixture {
        let mut tree = TmTree::with_seed(5);
        let a = tree.new_leaf("a", 10);
        let b = tree.new_leaf("b", 20);
        let src = tree.new_node("src", vec![a, b], 0).unwrap();
        let c = tree.new_leaf("c", 5);
        let dst = tree.new_node("dst", vec![c], 0).unwrap();
        let root = tree.new_node("root", vec![src, dst], 0).unwrap();
        Fixture {
            tree,
            root,
            src,
            dst,
            a,
            b,
            c,
        }
    }

    #[test]
    fn test_move_leaf_into_folder() {
        let mut f = fixture();

        assert!(f.tree.move_to(f.a, f.dst));

        assert_eq!(f.tree.children(f.src), vec![f.b]);
        assert_eq!(f.tree.children(f.dst), vec![f.c, f.a]);
        assert_eq!(f.tree.get_parent(f.a), Some(f.dst));
        assert_eq!(f.tree.data_size(f.src), 20);
        assert_eq!(f.tree.data_size(f.dst), 15);
        // The root was not refreshed, but a move keeps its total.
        assert_eq!(f.tree.data_size(f.root), 35);
        assert_eq!(f.tree.update_data_sizes(f.root), 35);
    }

    #[test]
    fn test_move_rejects_folder_source() {
        let mut f = fixture();
        let before_src = f.tree.children(f.src);
        let before_dst = f.tree.children(f.dst);

        assert!(!f.tree.move_to(f.src, f.dst));

        assert_eq!(f.tree.children(f.src), before_src);
        assert_eq!(f.tree.children(f.dst), before_dst);
        assert_eq!(f.tree.get_parent(f.src), Some(f.root));
    }

    #[test]
    fn test_move_rejects_leaf_destination() {
        let mut f = fixture();
        assert!(!f.tree.move_to(f.a, f.c));
        assert_eq!(f.tree.children(f.src), vec![f.a, f.b]);
        assert!(f.tree.is_leaf(f.c));
    }

    #[test]
    fn test_rejected_move_still_refreshes_destination() {
        let mut f = fixture();
        f.tree.change_size(f.c, 1.0);
        assert_eq!(f.tree.data_size(f.dst), 5);

        assert!(!f.tree.move_to(f.src, f.dst));
        assert_eq!(f.tree.data_size(f.dst), 10);
    }

    #[test]
    fn test_move_within_same_parent_goes_last() {
        let mut f = fixture();
        assert!(f.tree.move_to(f.a, f.src));
        assert_eq!(f.tree.children(f.src), vec![f.b, f.a]);
        assert_eq!(f.tree.data_size(f.src), 30);
    }

    #[test]
    fn test_move_last_child_collapses_old_parent() {
        let mut f = fixture();
        f.tree.expand_all(f.root);

        assert!(f.tree.move_to(f.c, f.src));

        assert!(f.tree.is_leaf(f.dst));
        assert!(!f.tree.is_expanded(f.dst));
        // An emptied folder keeps its last size as a leaf.
        assert_eq!(f.tree.data_size(f.dst), 5);
    }

    #[test]
    fn test_move_detached_node() {
        let mut f = fixture();
        let loose = f.tree.new_leaf("loose", 7);
        assert!(f.tree.move_to(loose, f.dst));
        assert_eq!(f.tree.data_size(f.dst), 12);
    }

    #[test]
    fn test_move_deleted_node_clears_former_parent() {
        let mut f = fixture();
        assert!(f.tree.delete_self(f.a));
        assert!(f.tree.move_to(f.a, f.dst));
        assert_eq!(f.tree.get_parent(f.a), Some(f.dst));
        assert_eq!(f.tree.data_size(f.src), 20);
    }

    #[test]
    fn test_move_into_own_deleted_subtree_rejected() {
        let mut tree = TmTree::with_seed(5);
        let leaf = tree.new_leaf("leaf", 3);
        let inner = tree.new_node("inner", vec![leaf], 0).unwrap();
        let last = tree.new_leaf("last", 4);
        let parent = tree.new_node("parent", vec![inner, last], 0).unwrap();

        assert!(tree.delete_self(inner));
        assert!(tree.move_to(last, inner));
        assert!(tree.is_leaf(parent));

        assert!(!tree.move_to(parent, inner));

        assert_eq!(tree.attached_parent(parent), None);
        assert_eq!(tree.get_parent(inner), Some(parent));
        assert_eq!(tree.root_of(inner), parent);
        assert_eq!(tree.lineage(leaf), vec![leaf, inner, parent]);
        assert_eq!(tree.data_size(inner), 7);
    }

    #[test]
    fn test_move_empty_sentinel_rejected() {
        let mut f = fixture();
        let empty = f.tree.new_empty();
        assert!(!f.tree.move_to(empty, f.dst));
        assert_eq!(f.tree.get_parent(empty), None);
    }

    #[test]
    fn test_change_size_round_trip() {
        let mut tree = TmTree::with_seed(5);
        let grow = tree.new_leaf("grow", 100);
        let shrink = tree.new_leaf("shrink", 100);

        assert!(tree.change_size(grow, 0.5));
        assert!(tree.change_size(shrink, -0.5));

        assert_eq!(tree.data_size(grow), 150);
        assert_eq!(tree.data_size(shrink), 50);
    }

    #[test]
    fn test_change_size_rounds_up() {
        let mut tree = TmTree::with_seed(5);
        let leaf = tree.new_leaf("leaf", 10);

        tree.change_size(leaf, 0.01);
        assert_eq!(tree.data_size(leaf), 11);
        tree.change_size(leaf, -0.01);
        assert_eq!(tree.data_size(leaf), 10);
    }

    #[test]
    fn test_change_size_saturates_at_zero() {
        let mut tree = TmTree::with_seed(5);
        let leaf = tree.new_leaf("leaf", 10);
        assert!(tree.change_size(leaf, -3.0));
        assert_eq!(tree.data_size(leaf), 0);
    }

    #[test]
    fn test_change_size_infinite_factor_saturates() {
        let mut tree = TmTree::with_seed(5);
        let grow = tree.new_leaf("grow", 10);
        let shrink = tree.new_leaf("shrink", 10);

        assert!(tree.change_size(grow, f64::INFINITY));
        assert!(tree.change_size(shrink, f64::NEG_INFINITY));

        assert_eq!(tree.data_size(grow), u64::MAX);
        assert_eq!(tree.data_size(shrink), 0);
    }

    #[test]
    fn test_change_size_rejects_nan() {
        let mut tree = TmTree::with_seed(5);
        let leaf = tree.new_leaf("leaf", 10);
        assert!(!tree.change_size(leaf, f64::NAN));
        assert_eq!(tree.data_size(leaf), 10);
    }

    #[test]
    fn test_change_size_ignores_folders_and_empty() {
        let mut f = fixture();
        assert!(!f.tree.change_size(f.src, 1.0));
        assert_eq!(f.tree.data_size(f.src), 30);

        let empty = f.tree.new_empty();
        assert!(!f.tree.change_size(empty, 1.0));
        assert_eq!(f.tree.data_size(empty), 0);
    }

    #[test]
    fn test_change_size_does_not_propagate() {
        let mut f = fixture();
        f.tree.change_size(f.a, 1.0);
        assert_eq!(f.tree.data_size(f.a), 20);
        assert_eq!(f.tree.data_size(f.src), 30);
        assert_eq!(f.tree.update_data_sizes(f.root), 45);
    }

    #[test]
    fn test_delete_keeps_parent_reference() {
        let mut f = fixture();

        assert!(f.tree.delete_self(f.a));

        assert_eq!(f.tree.children(f.src), vec![f.b]);
        assert_eq!(f.tree.get_parent(f.a), Some(f.src));
        assert_eq!(f.tree.data_size(f.src), 30);
        assert_eq!(f.tree.update_data_sizes(f.root), 25);
    }

    #[test]
    fn test_delete_without_parent_fails() {
        let mut f = fixture();
        assert!(!f.tree.delete_self(f.root));

        assert!(f.tree.delete_self(f.a));
        assert!(!f.tree.delete_self(f.a));
    }

    #[test]
    fn test_delete_last_child_collapses_parent() {
        let mut f = fixture();
        f.tree.expand_all(f.root);
        assert!(f.tree.delete_self(f.c));
        assert!(!f.tree.is_expanded(f.dst));
    }

    #[test]
    fn test_deleted_subtree_drops_out_of_layout() {
        let mut f = fixture();
        f.tree.delete_self(f.src);
        f.tree.update_data_sizes(f.root);
        f.tree.update_rectangles(f.root, Rect::new(0, 0, 60, 20));

        assert_eq!(f.tree.rect(f.dst), Rect::new(0, 0, 60, 20));
    }
}
