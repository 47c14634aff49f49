//! Depth-first and breadth-first enumeration.

use crate::Vec;
use crate::arena::{ChunkStack, PooledQueue, fill_exact};
use crate::rewriter::Rewriter;

pub(crate) fn self_and_descendants<R, T>(rewriter: &R, node: &T) -> Vec<T>
where
    R: Rewriter<T> + ?Sized,
    T: Clone,
{
    tracing::trace!("self_and_descendants");
    let mut out = Vec::new();
    let mut chunks = ChunkStack::new();
    pre_order(rewriter, node, &mut chunks, &mut out);
    out
}

pub(crate) fn descendants_and_self<R, T>(rewriter: &R, node: &T) -> Vec<T>
where
    R: Rewriter<T> + ?Sized,
    T: Clone,
{
    tracing::trace!("descendants_and_self");
    let mut out = Vec::new();
    let mut chunks = ChunkStack::new();
    post_order(rewriter, node, &mut chunks, &mut out);
    out
}

fn pre_order<R, T>(rewriter: &R, node: &T, chunks: &mut ChunkStack<T>, out: &mut Vec<T>)
where
    R: Rewriter<T> + ?Sized,
    T: Clone,
{
    out.push(node.clone());
    let count = rewriter.count_children(node);
    if count == 0 {
        return;
    }
    let chunk = chunks.alloc_with(count, |sink| rewriter.get_children(node, sink));
    for i in 0..count {
        let child = chunks.slice(&chunk)[i].clone();
        pre_order(rewriter, &child, chunks, out);
    }
    chunks.free(chunk);
}

fn post_order<R, T>(rewriter: &R, node: &T, chunks: &mut ChunkStack<T>, out: &mut Vec<T>)
where
    R: Rewriter<T> + ?Sized,
    T: Clone,
{
    let count = rewriter.count_children(node);
    if count > 0 {
        let chunk = chunks.alloc_with(count, |sink| rewriter.get_children(node, sink));
        for i in 0..count {
            let child = chunks.slice(&chunk)[i].clone();
            post_order(rewriter, &child, chunks, out);
        }
        chunks.free(chunk);
    }
    out.push(node.clone());
}

// ============================================================================
// Lazy iterators
// ============================================================================

/// Pre-order iterator; see
/// [`RewriterExt::self_and_descendants_lazily`](crate::RewriterExt::self_and_descendants_lazily).
pub struct SelfAndDescendants<R, T> {
    rewriter: R,
    stack: Vec<T>,
}

impl<R: Rewriter<T>, T: Clone> SelfAndDescendants<R, T> {
    pub fn new(rewriter: R, root: T) -> Self {
        Self {
            rewriter,
            stack: crate::vec![root],
        }
    }
}

impl<R: Rewriter<T>, T: Clone> Iterator for SelfAndDescendants<R, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let node = self.stack.pop()?;
        let count = self.rewriter.count_children(&node);
        if count > 0 {
            let rewriter = &self.rewriter;
            let start = fill_exact(&mut self.stack, count, |sink| rewriter.get_children(&node, sink));
            // The first child has to be popped first.
            self.stack[start..].reverse();
        }
        Some(node)
    }
}

/// Post-order iterator; see
/// [`RewriterExt::descendants_and_self_lazily`](crate::RewriterExt::descendants_and_self_lazily).
pub struct DescendantsAndSelf<R, T> {
    rewriter: R,
    stack: Vec<T>,
    expanded: Vec<bool>,
}

impl<R: Rewriter<T>, T: Clone> DescendantsAndSelf<R, T> {
    pub fn new(rewriter: R, root: T) -> Self {
        Self {
            rewriter,
            stack: crate::vec![root],
            expanded: crate::vec![false],
        }
    }
}

impl<R: Rewriter<T>, T: Clone> Iterator for DescendantsAndSelf<R, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let top = self.expanded.last_mut()?;
            if *top {
                self.expanded.pop();
                return self.stack.pop();
            }
            *top = true;

            let Some(node) = self.stack.last().cloned() else {
                return None;
            };
            let count = self.rewriter.count_children(&node);
            if count > 0 {
                let rewriter = &self.rewriter;
                let start = fill_exact(&mut self.stack, count, |sink| rewriter.get_children(&node, sink));
                self.stack[start..].reverse();
                self.expanded.resize(self.stack.len(), false);
            }
        }
    }
}

/// Level-order iterator backed by a [`PooledQueue`]; see
/// [`RewriterExt::self_and_descendants_breadth_first_lazily`](crate::RewriterExt::self_and_descendants_breadth_first_lazily).
pub struct SelfAndDescendantsBreadthFirst<R, T> {
    rewriter: R,
    queue: PooledQueue<T>,
}

impl<R: Rewriter<T>, T: Clone> SelfAndDescendantsBreadthFirst<R, T> {
    pub fn new(rewriter: R, root: T) -> Self {
        let mut queue = PooledQueue::new();
        queue.enqueue(root);
        Self { rewriter, queue }
    }
}

impl<R: Rewriter<T>, T: Clone> Iterator for SelfAndDescendantsBreadthFirst<R, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let node = self.queue.dequeue()?;
        let count = self.rewriter.count_children(&node);
        let rewriter = &self.rewriter;
        self.queue.enqueue_with(count, |sink| rewriter.get_children(&node, sink));
        Some(node)
    }
}
