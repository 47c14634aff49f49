//! Whole-tree algorithms.
//!
//! Everything here is generic over a [`Rewriter`](crate::Rewriter) and is
//! normally reached through [`RewriterExt`](crate::RewriterExt). The async
//! variants live in [`asynch`] as free functions.

pub mod asynch;
pub mod context;
pub mod descendants;
pub(crate) mod fold;
pub(crate) mod path;
pub(crate) mod rewrite;
pub(crate) mod zip_fold;

#[cfg(test)]
mod traversal_test;

pub use context::{Context, SelfAndDescendantsInContext};
pub use descendants::{DescendantsAndSelf, SelfAndDescendants, SelfAndDescendantsBreadthFirst};

/// What [`rewrite_iter`](crate::RewriterExt::rewrite_iter) should do after
/// looking at a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterResult<T> {
    /// Keep the node as it is.
    Done,
    /// Replace the node and rewrite the replacement again.
    Continue(T),
}
