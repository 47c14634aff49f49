//! Async counterparts of fold, rewrite, rewrite-to-fixpoint and zip-fold.
//!
//! The callbacks return futures, which are awaited one at a time in the
//! same order the synchronous versions call their callbacks: children left
//! to right, then the parent. Nothing runs concurrently, so the futures
//! need not be `Send` and the traversal shares one arena across awaits.
//!
//! Callbacks receive nodes by value (handles are cheap to clone) and child
//! results as an owned [`Children`], so the futures they return do not
//! borrow from the traversal.

use core::future::Future;

use futures_util::future::{FutureExt, LocalBoxFuture};

use super::IterResult;
use crate::arena::ChunkStack;
use crate::children::Children;
use crate::identity::Identity;
use crate::rewriter::Rewriter;

/// Async [`fold`](crate::RewriterExt::fold).
pub async fn fold_async<R, T, U, F, Fut>(rewriter: &R, node: &T, mut f: F) -> U
where
    R: Rewriter<T> + ?Sized,
    T: Clone,
    F: FnMut(T, Children<U>) -> Fut,
    Fut: Future<Output = U>,
{
    tracing::trace!("fold_async");
    let mut chunks = ChunkStack::new();
    fold_node(rewriter, node.clone(), &mut f, &mut chunks).await
}

fn fold_node<'a, R, T, U, F, Fut>(
    rewriter: &'a R,
    node: T,
    f: &'a mut F,
    chunks: &'a mut ChunkStack<T>,
) -> LocalBoxFuture<'a, U>
where
    R: Rewriter<T> + ?Sized,
    T: Clone + 'a,
    U: 'a,
    F: FnMut(T, Children<U>) -> Fut,
    Fut: Future<Output = U> + 'a,
{
    async move {
        let count = rewriter.count_children(&node);
        let mut results = Children::none();
        if count > 0 {
            let chunk = chunks.alloc_with(count, |sink| rewriter.get_children(&node, sink));
            for i in 0..count {
                let child = chunks.slice(&chunk)[i].clone();
                let value = fold_node(rewriter, child, &mut *f, &mut *chunks).await;
                results = results.add(value);
            }
            chunks.free(chunk);
        }
        f(node, results).await
    }
    .boxed_local()
}

/// Async [`rewrite`](crate::RewriterExt::rewrite).
pub async fn rewrite_async<R, T, F, Fut>(rewriter: &R, node: &T, mut f: F) -> T
where
    R: Rewriter<T> + ?Sized,
    T: Clone + Identity,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = T>,
{
    tracing::trace!("rewrite_async");
    let mut chunks = ChunkStack::new();
    rewrite_node(rewriter, node.clone(), &mut f, &mut chunks).await
}

fn rewrite_node<'a, R, T, F, Fut>(
    rewriter: &'a R,
    node: T,
    f: &'a mut F,
    chunks: &'a mut ChunkStack<T>,
) -> LocalBoxFuture<'a, T>
where
    R: Rewriter<T> + ?Sized,
    T: Clone + Identity + 'a,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = T> + 'a,
{
    async move {
        let count = rewriter.count_children(&node);
        if count == 0 {
            return f(node).await;
        }

        let chunk = chunks.alloc_with(count, |sink| rewriter.get_children(&node, sink));
        let mut changed = false;
        for i in 0..count {
            let child = chunks.slice(&chunk)[i].clone();
            let new_child = rewrite_node(rewriter, child.clone(), &mut *f, &mut *chunks).await;
            if !new_child.is_same(&child) {
                chunks.slice_mut(&chunk)[i] = new_child;
                changed = true;
            }
        }
        let rebuilt = if changed {
            rewriter.set_children(&node, chunks.slice(&chunk))
        } else {
            node
        };
        chunks.free(chunk);
        f(rebuilt).await
    }
    .boxed_local()
}

/// Async [`rewrite_iter`](crate::RewriterExt::rewrite_iter).
pub async fn rewrite_iter_async<R, T, F, Fut>(rewriter: &R, node: &T, mut step: F) -> T
where
    R: Rewriter<T> + ?Sized,
    T: Clone + Identity,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = IterResult<T>>,
{
    tracing::trace!("rewrite_iter_async");
    let mut chunks = ChunkStack::new();
    rewrite_iter_node(rewriter, node.clone(), &mut step, &mut chunks).await
}

fn rewrite_iter_node<'a, R, T, F, Fut>(
    rewriter: &'a R,
    node: T,
    step: &'a mut F,
    chunks: &'a mut ChunkStack<T>,
) -> LocalBoxFuture<'a, T>
where
    R: Rewriter<T> + ?Sized,
    T: Clone + Identity + 'a,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = IterResult<T>> + 'a,
{
    async move {
        let mut current = node;
        loop {
            let count = rewriter.count_children(&current);
            if count > 0 {
                let chunk = chunks.alloc_with(count, |sink| rewriter.get_children(&current, sink));
                let mut changed = false;
                for i in 0..count {
                    let child = chunks.slice(&chunk)[i].clone();
                    let new_child =
                        rewrite_iter_node(rewriter, child.clone(), &mut *step, &mut *chunks).await;
                    if !new_child.is_same(&child) {
                        chunks.slice_mut(&chunk)[i] = new_child;
                        changed = true;
                    }
                }
                if changed {
                    current = rewriter.set_children(&current, chunks.slice(&chunk));
                }
                chunks.free(chunk);
            }

            match step(current.clone()).await {
                IterResult::Done => return current,
                IterResult::Continue(next) => {
                    tracing::debug!("rewrite_iter_async: node replaced, rewriting the replacement");
                    current = next;
                }
            }
        }
    }
    .boxed_local()
}

/// Async [`zip_fold`](crate::RewriterExt::zip_fold).
pub async fn zip_fold_async<R, T, U, F, Fut>(rewriter: &R, a: &T, b: &T, mut f: F) -> U
where
    R: Rewriter<T> + ?Sized,
    T: Clone,
    F: FnMut(T, T, Children<U>) -> Fut,
    Fut: Future<Output = U>,
{
    tracing::trace!("zip_fold_async");
    let mut chunks = ChunkStack::new();
    zip_fold_node(rewriter, a.clone(), b.clone(), &mut f, &mut chunks).await
}

fn zip_fold_node<'a, R, T, U, F, Fut>(
    rewriter: &'a R,
    a: T,
    b: T,
    f: &'a mut F,
    chunks: &'a mut ChunkStack<T>,
) -> LocalBoxFuture<'a, U>
where
    R: Rewriter<T> + ?Sized,
    T: Clone + 'a,
    U: 'a,
    F: FnMut(T, T, Children<U>) -> Fut,
    Fut: Future<Output = U> + 'a,
{
    async move {
        let count_a = rewriter.count_children(&a);
        let count_b = rewriter.count_children(&b);
        let count = count_a.min(count_b);
        let mut results = Children::none();
        if count > 0 {
            let chunk_a = chunks.alloc_with(count_a, |sink| rewriter.get_children(&a, sink));
            let chunk_b = chunks.alloc_with(count_b, |sink| rewriter.get_children(&b, sink));
            for i in 0..count {
                let child_a = chunks.slice(&chunk_a)[i].clone();
                let child_b = chunks.slice(&chunk_b)[i].clone();
                let value = zip_fold_node(rewriter, child_a, child_b, &mut *f, &mut *chunks).await;
                results = results.add(value);
            }
            chunks.free(chunk_b);
            chunks.free(chunk_a);
        }
        f(a, b, results).await
    }
    .boxed_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Expr, ExprRewriter, add, call, lit, neg};
    use crate::{Rc, RewriterExt, Vec, vec};
    use core::cell::RefCell;
    use futures_executor::block_on;
    use futures_util::future::ready;
    use pretty_assertions::assert_eq;

    fn eval_children(node: &Rc<Expr>, kids: &Children<i64>) -> i64 {
        let kids: Vec<i64> = kids.iter().copied().collect();
        crate::test_utils::eval(node, &kids)
    }

    #[test]
    fn test_fold_async_matches_fold() {
        let tree = call("f", vec![add(lit(1), neg(lit(2))), lit(3), call("g", vec![])]);
        let expected = ExprRewriter.fold(&tree, crate::test_utils::eval);
        let actual = block_on(fold_async(&ExprRewriter, &tree, |node, kids| async move {
            eval_children(&node, &kids)
        }));
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_async_callbacks_run_in_order() {
        let tree = add(neg(lit(1)), lit(2));
        let visited = RefCell::new(Vec::new());
        block_on(fold_async(&ExprRewriter, &tree, |node, _kids: Children<()>| {
            visited.borrow_mut().push(crate::test_utils::label(&node));
            ready(())
        }));
        assert_eq!(visited.into_inner(), ["1", "neg", "2", "add"]);
    }

    #[test]
    fn test_rewrite_async_identity_returns_original() {
        let tree = add(neg(lit(1)), lit(2));
        let same = block_on(rewrite_async(&ExprRewriter, &tree, ready));
        assert!(Rc::ptr_eq(&same, &tree));
    }

    #[test]
    fn test_rewrite_async_rewrites_bottom_up() {
        let tree = add(neg(lit(1)), lit(2));
        let doubled = block_on(rewrite_async(&ExprRewriter, &tree, |node| async move {
            match &*node {
                Expr::Lit(n) => lit(n * 2),
                _ => node,
            }
        }));
        assert_eq!(doubled, add(neg(lit(2)), lit(4)));
    }

    #[test]
    fn test_rewrite_iter_async_reaches_fixpoint() {
        let tree = add(neg(add(lit(1), lit(2))), neg(lit(3)));
        let result = block_on(rewrite_iter_async(&ExprRewriter, &tree, |node| async move {
            match &*node {
                Expr::Neg(x) => match &**x {
                    Expr::Lit(n) => IterResult::Continue(lit(-n)),
                    _ => IterResult::Done,
                },
                Expr::Add(l, r) => match (&**l, &**r) {
                    (Expr::Lit(a), Expr::Lit(b)) => IterResult::Continue(lit(a + b)),
                    _ => IterResult::Done,
                },
                _ => IterResult::Done,
            }
        }));
        assert_eq!(result, lit(-6));
    }

    #[test]
    fn test_zip_fold_async_truncates() {
        let a = call("f", vec![lit(1), lit(2), lit(3)]);
        let b = call("f", vec![lit(1), lit(2)]);
        let pairs = block_on(zip_fold_async(&ExprRewriter, &a, &b, |_, _, kids: Children<usize>| {
            ready(1 + kids.iter().sum::<usize>())
        }));
        assert_eq!(pairs, 3);
    }
}
