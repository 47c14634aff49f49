//! The node contract and the algorithms built on it.
//!
//! A [`Rewriter`] knows three things about a tree type: how many children a
//! node has, what they are, and how to rebuild a node around new ones.
//! [`RewriterExt`] turns those three operations into the whole traversal
//! toolbox and is implemented for every rewriter automatically.

use crate::Vec;
use crate::arena::{ChildSink, ChunkStack, InlineChildren, fill_exact, fill_inline};
use crate::children::Children;
use crate::cursor::Cursor;
use crate::direction::Direction;
use crate::error::Result;
use crate::identity::Identity;
use crate::traversal::context::{self, Context, SelfAndDescendantsInContext};
use crate::traversal::descendants::{
    self, DescendantsAndSelf, SelfAndDescendants, SelfAndDescendantsBreadthFirst,
};
use crate::traversal::{IterResult, fold, path, rewrite, zip_fold};
use crate::zipper::Zipper;

/// Describes the immediate children of the nodes of one tree type.
///
/// Implementations must be consistent:
///
/// - `get_children` appends exactly `count_children(node)` children, always
///   in the same order;
/// - `set_children(node, children)` accepts exactly that many children and
///   returns a node equal to `node` except for its children, without
///   modifying `node`.
///
/// A mismatch between the count and the children is a bug in the
/// implementation and panics (see [`check_child_count`]).
pub trait Rewriter<T> {
    fn count_children(&self, node: &T) -> usize;

    fn get_children(&self, node: &T, out: &mut ChildSink<'_, T>);

    fn set_children(&self, node: &T, children: &[T]) -> T;
}

impl<T, R: Rewriter<T> + ?Sized> Rewriter<T> for &R {
    #[inline]
    fn count_children(&self, node: &T) -> usize {
        (**self).count_children(node)
    }

    #[inline]
    fn get_children(&self, node: &T, out: &mut ChildSink<'_, T>) {
        (**self).get_children(node, out)
    }

    #[inline]
    fn set_children(&self, node: &T, children: &[T]) -> T {
        (**self).set_children(node, children)
    }
}

/// Panics unless `found == expected`.
///
/// Call this at the top of [`Rewriter::set_children`] so a wrong number of
/// children is reported the same way everywhere.
#[track_caller]
pub fn check_child_count(expected: usize, found: usize) {
    if expected != found {
        child_count_violation(expected, found);
    }
}

#[cold]
#[track_caller]
pub(crate) fn child_count_violation(expected: usize, found: usize) -> ! {
    panic!("child count mismatch: the node has {expected} children but {found} were supplied")
}

// ============================================================================
// Extension trait
// ============================================================================

/// Traversals available on every [`Rewriter`].
///
/// Node handles must be cheap to clone ([`Rc`](alloc::rc::Rc), references
/// into an arena, small values) and comparable by [`Identity`]: rewrites
/// return the original node, not a copy, when nothing changed.
pub trait RewriterExt<T: Clone + Identity>: Rewriter<T> {
    /// The immediate children of `node`.
    fn children(&self, node: &T) -> Children<T> {
        let count = self.count_children(node);
        if count > 2 {
            let mut buf = Vec::with_capacity(count);
            fill_exact(&mut buf, count, |sink| self.get_children(node, sink));
            return Children::from(buf);
        }
        let mut buf = InlineChildren::new();
        fill_inline(&mut buf, count, |sink| self.get_children(node, sink));
        buf.into_iter().collect()
    }

    /// Applies `f` to each immediate child of `node`.
    ///
    /// Returns `node` itself when `f` returned every child unchanged.
    fn rewrite_children<F>(&self, node: &T, mut f: F) -> T
    where
        F: FnMut(T) -> T,
    {
        let count = self.count_children(node);
        if count == 0 {
            return node.clone();
        }

        // Up to four children are staged without touching the heap.
        let mut children = InlineChildren::new();
        fill_inline(&mut children, count, |sink| self.get_children(node, sink));
        let mut changed = false;
        for child in children.iter_mut() {
            let new_child = f(child.clone());
            if !new_child.is_same(child) {
                *child = new_child;
                changed = true;
            }
        }

        if changed {
            self.set_children(node, &children)
        } else {
            node.clone()
        }
    }

    // ---- Enumeration -------------------------------------------------------

    /// Every node of the tree, each before its descendants.
    fn self_and_descendants(&self, node: &T) -> Vec<T> {
        descendants::self_and_descendants(self, node)
    }

    /// Every node of the tree, each after its descendants.
    fn descendants_and_self(&self, node: &T) -> Vec<T> {
        descendants::descendants_and_self(self, node)
    }

    fn self_and_descendants_lazily(&self, node: &T) -> SelfAndDescendants<&Self, T> {
        SelfAndDescendants::new(self, node.clone())
    }

    fn descendants_and_self_lazily(&self, node: &T) -> DescendantsAndSelf<&Self, T> {
        DescendantsAndSelf::new(self, node.clone())
    }

    /// Every node of the tree, level by level.
    fn self_and_descendants_breadth_first(&self, node: &T) -> Vec<T> {
        SelfAndDescendantsBreadthFirst::new(self, node.clone()).collect()
    }

    fn self_and_descendants_breadth_first_lazily(
        &self,
        node: &T,
    ) -> SelfAndDescendantsBreadthFirst<&Self, T> {
        SelfAndDescendantsBreadthFirst::new(self, node.clone())
    }

    // ---- Folds and rewrites ------------------------------------------------

    /// Folds the tree bottom-up.
    ///
    /// `f` receives a node and the results for its children, in child order.
    fn fold<U, F>(&self, node: &T, f: F) -> U
    where
        F: FnMut(&T, &[U]) -> U,
    {
        fold::fold(self, node, f)
    }

    /// Rebuilds the tree bottom-up, applying `f` to every node after its
    /// children have been rewritten.
    fn rewrite<F>(&self, node: &T, f: F) -> T
    where
        F: FnMut(T) -> T,
    {
        rewrite::rewrite(self, node, f)
    }

    /// Rewrites bottom-up until `step` reports [`IterResult::Done`] for every
    /// node.
    ///
    /// A node replaced through [`IterResult::Continue`] is rewritten again,
    /// children first. A `step` that never settles loops forever.
    fn rewrite_iter<F>(&self, node: &T, step: F) -> T
    where
        F: FnMut(&T) -> IterResult<T>,
    {
        rewrite::rewrite_iter(self, node, step)
    }

    /// Folds two trees in lockstep.
    ///
    /// Children are paired by position up to the shorter child list; the
    /// surplus children of the longer side are never visited.
    fn zip_fold<U, F>(&self, a: &T, b: &T, f: F) -> U
    where
        F: FnMut(&T, &T, &[U]) -> U,
    {
        zip_fold::zip_fold(self, a, b, f)
    }

    // ---- Contexts ----------------------------------------------------------

    /// The children of `node`, each with a context that rebuilds `node`
    /// around a replacement.
    fn children_in_context(&self, node: &T) -> Children<(T, Context<&Self, T>)> {
        context::children_in_context(self, node, None)
    }

    fn self_and_descendants_in_context(&self, node: &T) -> Vec<(T, Context<&Self, T>)> {
        context::self_and_descendants_in_context(self, node)
    }

    fn descendants_and_self_in_context(&self, node: &T) -> Vec<(T, Context<&Self, T>)> {
        context::descendants_and_self_in_context(self, node)
    }

    fn self_and_descendants_in_context_breadth_first(
        &self,
        node: &T,
    ) -> Vec<(T, Context<&Self, T>)> {
        context::self_and_descendants_in_context_breadth_first(self, node)
    }

    fn self_and_descendants_in_context_lazily(
        &self,
        node: &T,
    ) -> SelfAndDescendantsInContext<'_, Self, T> {
        SelfAndDescendantsInContext::new(self, node.clone())
    }

    // ---- Navigation --------------------------------------------------------

    fn cursor(&self, root: T) -> Cursor<&Self, T> {
        Cursor::new(self, root)
    }

    fn zipper(&self, root: T) -> Zipper<&Self, T> {
        Zipper::new(self, root)
    }

    /// The node reached by following `path` from `root`.
    fn descendant_at(&self, path: &[Direction], root: &T) -> Result<T> {
        path::descendant_at(self, path, root)
    }

    /// Replaces the node at `path` and returns the rebuilt tree.
    fn replace_descendant_at(&self, path: &[Direction], new: T, root: &T) -> Result<T> {
        path::replace_descendant_at(self, path, new, root)
    }

    /// Rewrites the node at `path` with `f` and returns the rebuilt tree.
    fn rewrite_descendant_at<F>(&self, path: &[Direction], root: &T, f: F) -> Result<T>
    where
        F: FnOnce(T) -> T,
    {
        path::rewrite_descendant_at(self, path, root, f)
    }
}

impl<T: Clone + Identity, R: Rewriter<T> + ?Sized> RewriterExt<T> for R {}

/// Rebuilds `node` from `rewrite_child` applied to each of its children.
///
/// Children are staged in `chunks`; `set_children` is only called when some
/// child came back as a different node.
pub(crate) fn rewrite_children_with<R, T, G>(
    rewriter: &R,
    node: &T,
    chunks: &mut ChunkStack<T>,
    mut rewrite_child: G,
) -> T
where
    R: Rewriter<T> + ?Sized,
    T: Clone + Identity,
    G: FnMut(&T, &mut ChunkStack<T>) -> T,
{
    let count = rewriter.count_children(node);
    if count == 0 {
        return node.clone();
    }

    let chunk = chunks.alloc_with(count, |sink| rewriter.get_children(node, sink));
    let mut changed = false;
    for i in 0..count {
        let child = chunks.slice(&chunk)[i].clone();
        let new_child = rewrite_child(&child, chunks);
        if !new_child.is_same(&child) {
            chunks.slice_mut(&chunk)[i] = new_child;
            changed = true;
        }
    }

    let rebuilt = if changed {
        rewriter.set_children(node, chunks.slice(&chunk))
    } else {
        node.clone()
    };
    chunks.free(chunk);
    rebuilt
}
