use crate::arena::ChunkStack;
use crate::identity::Identity;
use crate::rewriter::{Rewriter, rewrite_children_with};

use super::IterResult;

pub(crate) fn rewrite<R, T, F>(rewriter: &R, node: &T, mut f: F) -> T
where
    R: Rewriter<T> + ?Sized,
    T: Clone + Identity,
    F: FnMut(T) -> T,
{
    tracing::trace!("rewrite");
    let mut chunks = ChunkStack::new();
    rewrite_node(rewriter, node, &mut f, &mut chunks)
}

fn rewrite_node<R, T, F>(rewriter: &R, node: &T, f: &mut F, chunks: &mut ChunkStack<T>) -> T
where
    R: Rewriter<T> + ?Sized,
    T: Clone + Identity,
    F: FnMut(T) -> T,
{
    let rebuilt = rewrite_children_with(rewriter, node, chunks, |child, chunks| {
        rewrite_node(rewriter, child, &mut *f, chunks)
    });
    f(rebuilt)
}

pub(crate) fn rewrite_iter<R, T, F>(rewriter: &R, node: &T, mut step: F) -> T
where
    R: Rewriter<T> + ?Sized,
    T: Clone + Identity,
    F: FnMut(&T) -> IterResult<T>,
{
    tracing::trace!("rewrite_iter");
    let mut chunks = ChunkStack::new();
    rewrite_iter_node(rewriter, node, &mut step, &mut chunks)
}

fn rewrite_iter_node<R, T, F>(rewriter: &R, node: &T, step: &mut F, chunks: &mut ChunkStack<T>) -> T
where
    R: Rewriter<T> + ?Sized,
    T: Clone + Identity,
    F: FnMut(&T) -> IterResult<T>,
{
    let mut current = node.clone();
    loop {
        current = rewrite_children_with(rewriter, &current, chunks, |child, chunks| {
            rewrite_iter_node(rewriter, child, &mut *step, chunks)
        });
        match step(&current) {
            IterResult::Done => return current,
            IterResult::Continue(next) => {
                tracing::debug!("rewrite_iter: node replaced, rewriting the replacement");
                current = next;
            }
        }
    }
}
