//! Externally supplied hierarchies.
//!
//! A [`NodeSpec`] is the plain description a caller hands over (typically as
//! JSON) before the engine takes ownership of the nodes:
//!
//! ```json
//! { "name": "home", "children": [
//!     { "name": "notes.txt", "size": 120 },
//!     { "name": "music", "children": [{ "name": "song.mp3", "size": 4000 }] }
//! ] }
//! ```

use indextree::NodeId;
use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::tree::TmTree;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    /// Leaf size; ignored for nodes with children.
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn leaf(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            children: Vec::new(),
        }
    }

    pub fn folder(name: impl Into<String>, children: Vec<NodeSpec>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            children,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Create the described nodes in `tree`, children first, and return the
    /// new root.
    pub fn build(&self, tree: &mut TmTree) -> Result<NodeId, TreeError> {
        let children = self
            .children
            .iter()
            .map(|child| child.build(tree))
            .collect::<Result<Vec<_>, _>>()?;
        tree.new_node(self.name.clone(), children, self.size)
    }
}

impl TmTree {
    /// Describe the current subtree at `id`, with folder sizes as stored.
    ///
    /// Returns `None` for the empty sentinel. Empty sentinels never appear
    /// below a node, so the result can be built back into an equal shape.
    pub fn snapshot(&self, id: NodeId) -> Option<NodeSpec> {
        let name = self.name(id)?.to_string();
        let children: Vec<NodeSpec> = id
            .children(&self.arena)
            .filter_map(|child| self.snapshot(child))
            .collect();
        let size = if children.is_empty() {
            self.data_size(id)
        } else {
            0
        };
        Some(NodeSpec {
            name,
            size,
            children,
        })
    }
}
