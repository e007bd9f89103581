use indextree::NodeId;
use thiserror::Error;

/// Errors surfaced by tree construction, hierarchy loading and path formatting.
///
/// Layout and mutation never fail: precondition violations there are no-ops
/// reported through a `bool` return.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A path-formatting hook the tree's variant does not provide.
    #[error("`{0}` is not implemented for this tree variant")]
    Unimplemented(&'static str),

    #[error("an empty tree cannot be used as a child")]
    EmptyChild,

    #[error("node {0:?} already has a parent")]
    AlreadyAttached(NodeId),

    #[error("node {0:?} appears more than once in the child list")]
    DuplicateChild(NodeId),

    #[error("invalid hierarchy: {0}")]
    Json(#[from] serde_json::Error),
}
