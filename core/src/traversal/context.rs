//! Traversals that pair each node with the means to replace it.
//!
//! A [`Context`] remembers the chain of ancestors above a node. Calling
//! [`Context::replace`] rebuilds exactly those ancestors around the new
//! node and returns the new root; every other subtree is shared with the
//! original tree.

use crate::arena::{PooledQueue, fill_exact};
use crate::children::Children;
use crate::identity::Identity;
use crate::rewriter::Rewriter;
use crate::{Rc, Vec};

pub(crate) struct Frame<T> {
    parent: T,
    siblings: Rc<[T]>,
    index: usize,
    up: Option<Rc<Frame<T>>>,
}

/// The position of a node within the tree it was enumerated from.
pub struct Context<R, T> {
    rewriter: R,
    frame: Option<Rc<Frame<T>>>,
}

impl<R: Clone, T> Clone for Context<R, T> {
    fn clone(&self) -> Self {
        Self {
            rewriter: self.rewriter.clone(),
            frame: self.frame.clone(),
        }
    }
}

impl<R, T> core::fmt::Debug for Context<R, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context").field("depth", &self.depth()).finish()
    }
}

impl<R, T> Context<R, T> {
    /// `true` for the context of the node the traversal started from.
    pub fn is_root(&self) -> bool {
        self.frame.is_none()
    }

    /// Number of ancestors above the node.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut frame = self.frame.as_deref();
        while let Some(level) = frame {
            depth += 1;
            frame = level.up.as_deref();
        }
        depth
    }

    /// Position of the node among its siblings, or `None` at the root.
    pub fn index(&self) -> Option<usize> {
        self.frame.as_deref().map(|level| level.index)
    }
}

impl<R: Rewriter<T>, T: Clone + Identity> Context<R, T> {
    /// Rebuilds the tree with `new` in place of this context's node.
    ///
    /// Returns the original root when `new` is the node that was there.
    pub fn replace(&self, new: T) -> T {
        let mut current = new;
        let mut frame = self.frame.as_deref();
        while let Some(level) = frame {
            if current.is_same(&level.siblings[level.index]) {
                return root_of(level);
            }
            let mut children = level.siblings.to_vec();
            children[level.index] = current;
            current = self.rewriter.set_children(&level.parent, &children);
            frame = level.up.as_deref();
        }
        current
    }
}

fn root_of<T: Clone>(mut level: &Frame<T>) -> T {
    while let Some(up) = level.up.as_deref() {
        level = up;
    }
    level.parent.clone()
}

fn root_context<R, T>(rewriter: R) -> Context<R, T> {
    Context { rewriter, frame: None }
}

pub(crate) fn children_in_context<'a, R, T>(
    rewriter: &'a R,
    node: &T,
    up: Option<Rc<Frame<T>>>,
) -> Children<(T, Context<&'a R, T>)>
where
    R: Rewriter<T> + ?Sized,
    T: Clone,
{
    let count = rewriter.count_children(node);
    if count == 0 {
        return Children::None;
    }
    let mut buf = Vec::with_capacity(count);
    fill_exact(&mut buf, count, |sink| rewriter.get_children(node, sink));
    let siblings: Rc<[T]> = Rc::from(buf);

    (0..count)
        .map(|index| {
            let frame = Rc::new(Frame {
                parent: node.clone(),
                siblings: siblings.clone(),
                index,
                up: up.clone(),
            });
            let context = Context {
                rewriter,
                frame: Some(frame),
            };
            (siblings[index].clone(), context)
        })
        .collect()
}

pub(crate) fn self_and_descendants_in_context<'r, R, T>(
    rewriter: &'r R,
    node: &T,
) -> Vec<(T, Context<&'r R, T>)>
where
    R: Rewriter<T> + ?Sized,
    T: Clone,
{
    tracing::trace!("self_and_descendants_in_context");
    let mut out = Vec::new();
    pre_order(rewriter, node.clone(), root_context(rewriter), &mut out);
    out
}

fn pre_order<'r, R, T>(
    rewriter: &'r R,
    node: T,
    context: Context<&'r R, T>,
    out: &mut Vec<(T, Context<&'r R, T>)>,
) where
    R: Rewriter<T> + ?Sized,
    T: Clone,
{
    let frame = context.frame.clone();
    let children = children_in_context(rewriter, &node, frame);
    out.push((node, context));
    for (child, child_context) in children {
        pre_order(rewriter, child, child_context, out);
    }
}

pub(crate) fn descendants_and_self_in_context<'r, R, T>(
    rewriter: &'r R,
    node: &T,
) -> Vec<(T, Context<&'r R, T>)>
where
    R: Rewriter<T> + ?Sized,
    T: Clone,
{
    tracing::trace!("descendants_and_self_in_context");
    let mut out = Vec::new();
    post_order(rewriter, node.clone(), root_context(rewriter), &mut out);
    out
}

fn post_order<'r, R, T>(
    rewriter: &'r R,
    node: T,
    context: Context<&'r R, T>,
    out: &mut Vec<(T, Context<&'r R, T>)>,
) where
    R: Rewriter<T> + ?Sized,
    T: Clone,
{
    for (child, child_context) in children_in_context(rewriter, &node, context.frame.clone()) {
        post_order(rewriter, child, child_context, out);
    }
    out.push((node, context));
}

pub(crate) fn self_and_descendants_in_context_breadth_first<'r, R, T>(
    rewriter: &'r R,
    node: &T,
) -> Vec<(T, Context<&'r R, T>)>
where
    R: Rewriter<T> + ?Sized,
    T: Clone,
{
    tracing::trace!("self_and_descendants_in_context_breadth_first");
    let mut out = Vec::new();
    let mut queue = PooledQueue::new();
    queue.enqueue((node.clone(), root_context(rewriter)));
    while let Some((node, context)) = queue.dequeue() {
        let children = children_in_context(rewriter, &node, context.frame.clone());
        queue.enqueue_with(children.len(), |sink| sink.extend(children));
        out.push((node, context));
    }
    out
}

/// Lazy pre-order enumeration with contexts; see
/// [`RewriterExt::self_and_descendants_in_context_lazily`](crate::RewriterExt::self_and_descendants_in_context_lazily).
pub struct SelfAndDescendantsInContext<'r, R: ?Sized, T> {
    rewriter: &'r R,
    stack: Vec<(T, Context<&'r R, T>)>,
}

impl<'r, R, T> SelfAndDescendantsInContext<'r, R, T>
where
    R: Rewriter<T> + ?Sized,
    T: Clone,
{
    pub fn new(rewriter: &'r R, root: T) -> Self {
        Self {
            rewriter,
            stack: crate::vec![(root, root_context(rewriter))],
        }
    }
}

impl<'r, R, T> Iterator for SelfAndDescendantsInContext<'r, R, T>
where
    R: Rewriter<T> + ?Sized,
    T: Clone,
{
    type Item = (T, Context<&'r R, T>);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, context) = self.stack.pop()?;
        let start = self.stack.len();
        self.stack
            .extend(children_in_context(self.rewriter, &node, context.frame.clone()));
        self.stack[start..].reverse();
        Some((node, context))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{Expr, ExprRewriter, add, call, label, lit, neg};
    use crate::{Rc, RewriterExt, String, Vec, vec};
    use pretty_assertions::assert_eq;

    fn sample() -> Rc<Expr> {
        call("f", vec![add(lit(1), neg(lit(2))), lit(3)])
    }

    #[test]
    fn test_children_in_context_replace_rebuilds_parent() {
        let rewriter = ExprRewriter;
        let tree = add(lit(1), lit(2));
        let children = rewriter.children_in_context(&tree);
        assert_eq!(children.len(), 2);
        let (child, context) = children.second().clone();
        assert_eq!(child, lit(2));
        assert_eq!(context.replace(lit(20)), add(lit(1), lit(20)));
    }

    #[test]
    fn test_replace_with_same_node_returns_original_root() {
        let rewriter = ExprRewriter;
        let tree = sample();
        for (node, context) in rewriter.self_and_descendants_in_context(&tree) {
            let root = context.replace(node);
            assert!(Rc::ptr_eq(&root, &tree));
        }
    }

    #[test]
    fn test_replace_deep_node() {
        let rewriter = ExprRewriter;
        let tree = sample();
        let (_, context) = rewriter
            .self_and_descendants_in_context(&tree)
            .into_iter()
            .find(|(node, _)| **node == Expr::Lit(2))
            .expect("lit 2 is in the tree");
        assert_eq!(context.depth(), 3);
        assert_eq!(
            context.replace(lit(7)),
            call("f", vec![add(lit(1), neg(lit(7))), lit(3)])
        );
        // The original tree is untouched.
        assert_eq!(tree, sample());
    }

    #[test]
    fn test_replace_shares_siblings() {
        let rewriter = ExprRewriter;
        let tree = sample();
        let contexts = rewriter.self_and_descendants_in_context(&tree);
        let (_, context) = contexts.last().expect("non-empty").clone();
        let rebuilt = context.replace(lit(30));
        let (Expr::Call(_, old), Expr::Call(_, new)) = (&*tree, &*rebuilt) else {
            panic!("expected calls");
        };
        assert!(Rc::ptr_eq(&old[0], &new[0]));
        assert_eq!(new[1], lit(30));
    }

    #[test]
    fn test_orders_match_plain_enumeration() {
        let rewriter = ExprRewriter;
        let tree = sample();
        let pick = |nodes: Vec<(Rc<Expr>, _)>| nodes.iter().map(|(n, _)| label(n)).collect::<Vec<String>>();
        assert_eq!(
            pick(rewriter.self_and_descendants_in_context(&tree)),
            ["f", "add", "1", "neg", "2", "3"]
        );
        assert_eq!(
            pick(rewriter.descendants_and_self_in_context(&tree)),
            ["1", "2", "neg", "add", "3", "f"]
        );
        assert_eq!(
            pick(rewriter.self_and_descendants_in_context_breadth_first(&tree)),
            ["f", "add", "3", "1", "neg", "2"]
        );
        assert_eq!(
            pick(rewriter.self_and_descendants_in_context_lazily(&tree).collect()),
            ["f", "add", "1", "neg", "2", "3"]
        );
    }

    #[test]
    fn test_root_context() {
        let rewriter = ExprRewriter;
        let tree = sample();
        let all = rewriter.self_and_descendants_in_context(&tree);
        let (_, root) = &all[0];
        assert!(root.is_root());
        assert_eq!(root.index(), None);
        assert_eq!(root.replace(lit(0)), lit(0));
    }
}
