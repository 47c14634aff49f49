use crate::Vec;
use crate::arena::ChunkStack;
use crate::arena::pool::Scratch;
use crate::rewriter::Rewriter;

pub(crate) fn zip_fold<R, T, U, F>(rewriter: &R, a: &T, b: &T, mut f: F) -> U
where
    R: Rewriter<T> + ?Sized,
    T: Clone,
    F: FnMut(&T, &T, &[U]) -> U,
{
    tracing::trace!("zip_fold");
    let mut chunks = ChunkStack::new();
    let mut values = Scratch::new();
    zip_fold_node(rewriter, a, b, &mut f, &mut chunks, &mut values);
    match values.pop() {
        Some(result) if values.is_empty() => result,
        _ => unreachable!("a zip-fold leaves exactly one value"),
    }
}

fn zip_fold_node<R, T, U, F>(
    rewriter: &R,
    a: &T,
    b: &T,
    f: &mut F,
    chunks: &mut ChunkStack<T>,
    values: &mut Vec<U>,
) where
    R: Rewriter<T> + ?Sized,
    T: Clone,
    F: FnMut(&T, &T, &[U]) -> U,
{
    let count_a = rewriter.count_children(a);
    let count_b = rewriter.count_children(b);
    let count = count_a.min(count_b);
    if count == 0 {
        let value = f(a, b, &[]);
        values.push(value);
        return;
    }

    let chunk_a = chunks.alloc_with(count_a, |sink| rewriter.get_children(a, sink));
    let chunk_b = chunks.alloc_with(count_b, |sink| rewriter.get_children(b, sink));
    for i in 0..count {
        let child_a = chunks.slice(&chunk_a)[i].clone();
        let child_b = chunks.slice(&chunk_b)[i].clone();
        zip_fold_node(rewriter, &child_a, &child_b, f, chunks, values);
    }
    chunks.free(chunk_b);
    chunks.free(chunk_a);

    let start = values.len() - count;
    let value = f(a, b, &values[start..]);
    values.truncate(start);
    values.push(value);
}
