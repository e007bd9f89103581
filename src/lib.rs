//! Treemap layout and mutation engine over an arena-backed tree of sized items.
//!
//! A [`TmTree`] owns every node; callers hold [`NodeId`] handles and drive the
//! engine through layout ([`TmTree::update_rectangles`]), queries
//! ([`TmTree::get_rectangles`], [`TmTree::get_tree_at_position`]) and
//! mutations (move, resize, delete, expand, collapse).

pub mod edit;
pub mod error;
pub mod expand_state;
pub mod hierarchy;
pub mod path_format;
pub mod render_tree;
pub mod tree;
pub mod treemap;

pub use error::TreeError;
pub use hierarchy::NodeSpec;
pub use indextree::NodeId;
pub use path_format::{format_size, FileSystemFormat, PathFormat, Unformatted};
pub use render_tree::ColoredRect;
pub use tree::{Rgb, TmNode, TmTree};
pub use treemap::{Axis, Point, Rect};
