use indextree::{Arena, NodeId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::debug;

use crate::error::TreeError;
use crate::path_format::{PathFormat, Unformatted};
use crate::treemap::Rect;

/// RGB colour of a node, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// One item in the hierarchy: a folder if it has children, a leaf otherwise.
#[derive(Debug, Clone)]
pub struct TmNode {
    /// `None` marks the empty-tree sentinel.
    pub(crate) name: Option<String>,
    /// Authoritative for leaves, sum of the children for folders.
    pub(crate) data_size: u64,
    pub(crate) color: Rgb,
    /// Written only by the layout pass.
    pub(crate) rect: Rect,
    pub(crate) expanded: bool,
    /// Parent this node was deleted from, kept for "go up" navigation.
    pub(crate) detached_from: Option<NodeId>,
}

impl TmNode {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn data_size(&self) -> u64 {
        self.data_size
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

/// Arena holding every node of one or more treemap hierarchies.
///
/// Children are owned through the arena's sibling links, so each node has at
/// most one structural parent. Nodes are never freed: a handle stays valid for
/// the lifetime of the tree, even after the node is deleted from its parent.
#[derive(Debug)]
pub struct TmTree {
    pub(crate) arena: Arena<TmNode>,
    rng: StdRng,
    format: Box<dyn PathFormat>,
}

impl Default for TmTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TmTree {
    /// Create an empty arena whose node colours are drawn from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create an empty arena with reproducible node colours.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            arena: Arena::new(),
            rng,
            format: Box::new(Unformatted),
        }
    }

    /// Select the variant used to render path strings.
    pub fn with_format(mut self, format: Box<dyn PathFormat>) -> Self {
        self.format = format;
        self
    }

    fn random_color(&mut self) -> Rgb {
        Rgb(self.rng.gen(), self.rng.gen(), self.rng.gen())
    }

    fn alloc(&mut self, name: Option<String>, data_size: u64) -> NodeId {
        let color = self.random_color();
        self.arena.new_node(TmNode {
            name,
            data_size,
            color,
            rect: Rect::ZERO,
            expanded: false,
            detached_from: None,
        })
    }

    /// Create the empty-tree sentinel.
    pub fn new_empty(&mut self) -> NodeId {
        self.alloc(None, 0)
    }

    pub fn new_leaf(&mut self, name: impl Into<String>, data_size: u64) -> NodeId {
        self.alloc(Some(name.into()), data_size)
    }

    /// Create a node owning `children`, in order.
    ///
    /// With no children `data_size` becomes the leaf size; otherwise it is
    /// ignored and the node's size is the sum of its children. Every child
    /// must be a detached, non-empty node listed once; on error nothing is
    /// created. Adopted subtrees start collapsed under the new node.
    pub fn new_node(
        &mut self,
        name: impl Into<String>,
        children: Vec<NodeId>,
        data_size: u64,
    ) -> Result<NodeId, TreeError> {
        let mut seen = HashSet::with_capacity(children.len());
        for &child in &children {
            if self.node(child).is_empty() {
                return Err(TreeError::EmptyChild);
            }
            if self.attached_parent(child).is_some() {
                return Err(TreeError::AlreadyAttached(child));
            }
            if !seen.insert(child) {
                return Err(TreeError::DuplicateChild(child));
            }
        }

        let data_size = if children.is_empty() {
            data_size
        } else {
            children
                .iter()
                .fold(0u64, |acc, &c| acc.saturating_add(self.node(c).data_size))
        };

        let id = self.alloc(Some(name.into()), data_size);
        for child in children {
            self.node_mut(child).detached_from = None;
            let below: Vec<NodeId> = child.descendants(&self.arena).collect();
            for node in below {
                self.node_mut(node).expanded = false;
            }
            id.append(child, &mut self.arena);
        }
        debug!(?id, data_size, "created folder node");
        Ok(id)
    }

    /// Borrow a node's data.
    ///
    /// Panics if `id` was not created by this tree.
    pub fn node(&self, id: NodeId) -> &TmNode {
        self.arena[id].get()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TmNode {
        self.arena[id].get_mut()
    }

    /// Total number of nodes ever created in this arena.
    pub fn node_count(&self) -> usize {
        self.arena.count()
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).name()
    }

    pub fn data_size(&self, id: NodeId) -> u64 {
        self.node(id).data_size
    }

    pub fn color(&self, id: NodeId) -> Rgb {
        self.node(id).color
    }

    pub fn rect(&self, id: NodeId) -> Rect {
        self.node(id).rect
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.node(id).expanded
    }

    pub fn is_empty(&self, id: NodeId) -> bool {
        self.node(id).is_empty()
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.arena[id].first_child().is_none()
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        id.children(&self.arena).collect()
    }

    /// `id` followed by every node below it, depth first.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.descendants(&self.arena)
    }

    /// The node whose children list holds `id`. Deleted nodes have none.
    pub fn attached_parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    /// The parent of `id`, or the parent it was last deleted from.
    pub fn get_parent(&self, id: NodeId) -> Option<NodeId> {
        self.attached_parent(id).or(self.node(id).detached_from)
    }

    /// `id` followed by each [`TmTree::get_parent`] above it.
    ///
    /// The walk stops before revisiting a node, so it always terminates.
    pub fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            if !seen.insert(node_id) {
                break;
            }
            chain.push(node_id);
            current = self.get_parent(node_id);
        }
        chain
    }

    /// Follow [`TmTree::get_parent`] to the top.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.lineage(id).last().copied().unwrap_or(id)
    }

    /// Recompute folder sizes below `id` from their leaves and return the size
    /// of `id`.
    ///
    /// Leaves keep their stored size. Ancestors of `id` are not visited.
    pub fn update_data_sizes(&mut self, id: NodeId) -> u64 {
        if self.node(id).is_empty() {
            return 0;
        }

        let children = self.children(id);
        if children.is_empty() {
            return self.node(id).data_size;
        }

        let mut total = 0u64;
        for child in children {
            total = total.saturating_add(self.update_data_sizes(child));
        }
        self.node_mut(id).data_size = total;
        total
    }

    /// Separator between names in a path string, per the tree's variant.
    pub fn get_separator(&self) -> Result<&str, TreeError> {
        self.format.separator()
    }

    /// Trailing descriptor for `id`, per the tree's variant.
    pub fn get_suffix(&self, id: NodeId) -> Result<String, TreeError> {
        self.format.suffix(self, id)
    }

    /// Names from the root down to `id`, joined by the variant's separator.
    pub fn get_path_string(&self, id: NodeId) -> Result<String, TreeError> {
        let mut names: Vec<&str> = self
            .lineage(id)
            .into_iter()
            .map(|node_id| self.node(node_id).name().unwrap_or(""))
            .collect();

        if names.len() == 1 {
            return Ok(names[0].to_string());
        }

        let separator = self.get_separator()?;
        names.reverse();
        Ok(names.join(separator))
    }
}
