use crate::Vec;
use crate::arena::ChunkStack;
use crate::arena::pool::Scratch;
use crate::rewriter::Rewriter;

/// Bottom-up fold.
///
/// Children are staged in a [`ChunkStack`]; results accumulate on one
/// contiguous value stack, so a node's child results are always the top
/// `count` values when its turn comes.
pub(crate) fn fold<R, T, U, F>(rewriter: &R, node: &T, mut f: F) -> U
where
    R: Rewriter<T> + ?Sized,
    T: Clone,
    F: FnMut(&T, &[U]) -> U,
{
    tracing::trace!("fold");
    let mut chunks = ChunkStack::new();
    let mut values = Scratch::new();
    fold_node(rewriter, node, &mut f, &mut chunks, &mut values);
    match values.pop() {
        Some(result) if values.is_empty() => result,
        _ => unreachable!("a fold leaves exactly one value"),
    }
}

fn fold_node<R, T, U, F>(
    rewriter: &R,
    node: &T,
    f: &mut F,
    chunks: &mut ChunkStack<T>,
    values: &mut Vec<U>,
) where
    R: Rewriter<T> + ?Sized,
    T: Clone,
    F: FnMut(&T, &[U]) -> U,
{
    let count = rewriter.count_children(node);
    if count == 0 {
        let value = f(node, &[]);
        values.push(value);
        return;
    }

    let chunk = chunks.alloc_with(count, |sink| rewriter.get_children(node, sink));
    for i in 0..count {
        let child = chunks.slice(&chunk)[i].clone();
        fold_node(rewriter, &child, f, chunks, values);
    }
    chunks.free(chunk);

    let start = values.len() - count;
    let value = f(node, &values[start..]);
    values.truncate(start);
    values.push(value);
}
