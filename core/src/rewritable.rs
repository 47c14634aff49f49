//! Self-describing nodes.
//!
//! A node type that knows its own children implements [`Rewritable`] once
//! and gets the whole toolbox on its handles through [`RewritableExt`]:
//!
//! ```
//! use std::rc::Rc;
//! use sawmill_core::{ChildSink, Rewritable, RewritableExt};
//!
//! #[derive(Debug, PartialEq)]
//! struct Tree(u32, Vec<Rc<Tree>>);
//!
//! impl Rewritable<Rc<Tree>> for Tree {
//!     fn count_children(&self) -> usize {
//!         self.1.len()
//!     }
//!     fn get_children(&self, out: &mut ChildSink<'_, Rc<Tree>>) {
//!         out.extend(self.1.iter().cloned());
//!     }
//!     fn set_children(&self, children: &[Rc<Tree>]) -> Self {
//!         Tree(self.0, children.to_vec())
//!     }
//! }
//!
//! let tree = Rc::new(Tree(1, vec![Rc::new(Tree(2, vec![])), Rc::new(Tree(3, vec![]))]));
//! assert_eq!(tree.fold(|node, kids: &[u32]| node.0 + kids.iter().sum::<u32>()), 6);
//! ```
//!
//! `#[derive(Rewritable)]` in the `sawmill` crate writes the impl.

use core::marker::PhantomData;
use core::ops::Deref;

use crate::Vec;
use crate::arena::ChildSink;
use crate::children::Children;
use crate::cursor::Cursor;
use crate::identity::Identity;
use crate::rewriter::{Rewriter, RewriterExt};
use crate::traversal::IterResult;
use crate::zipper::Zipper;

/// A node payload whose children are handles of type `P`.
///
/// `P` is the handle the tree is built from (`Rc<Self>`, `Arc<Self>`, ...);
/// it dereferences to the payload and is created from a rebuilt payload.
/// The same consistency rules as for [`Rewriter`] apply.
pub trait Rewritable<P>: Sized {
    fn count_children(&self) -> usize;

    fn get_children(&self, out: &mut ChildSink<'_, P>);

    /// A copy of `self` with its children replaced.
    fn set_children(&self, children: &[P]) -> Self;
}

/// The [`Rewriter`] for handles to [`Rewritable`] payloads.
pub struct RewritableRewriter<P>(PhantomData<fn() -> P>);

impl<P> RewritableRewriter<P> {
    pub const fn new() -> Self {
        RewritableRewriter(PhantomData)
    }
}

impl<P> Default for RewritableRewriter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for RewritableRewriter<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for RewritableRewriter<P> {}

impl<P> core::fmt::Debug for RewritableRewriter<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("RewritableRewriter")
    }
}

impl<P> Rewriter<P> for RewritableRewriter<P>
where
    P: Deref + From<<P as Deref>::Target>,
    P::Target: Rewritable<P> + Sized,
{
    fn count_children(&self, node: &P) -> usize {
        (**node).count_children()
    }

    fn get_children(&self, node: &P, out: &mut ChildSink<'_, P>) {
        (**node).get_children(out)
    }

    fn set_children(&self, node: &P, children: &[P]) -> P {
        P::from((**node).set_children(children))
    }
}

/// Traversals called directly on a handle to a [`Rewritable`] node.
pub trait RewritableExt: Sized {
    fn children(&self) -> Children<Self>;

    fn self_and_descendants(&self) -> Vec<Self>;

    fn descendants_and_self(&self) -> Vec<Self>;

    fn self_and_descendants_breadth_first(&self) -> Vec<Self>;

    fn fold<U, F>(&self, f: F) -> U
    where
        F: FnMut(&Self, &[U]) -> U;

    fn rewrite<F>(&self, f: F) -> Self
    where
        F: FnMut(Self) -> Self;

    fn rewrite_iter<F>(&self, step: F) -> Self
    where
        F: FnMut(&Self) -> IterResult<Self>;

    fn zip_fold<U, F>(&self, other: &Self, f: F) -> U
    where
        F: FnMut(&Self, &Self, &[U]) -> U;

    fn cursor(self) -> Cursor<RewritableRewriter<Self>, Self>;

    fn zipper(self) -> Zipper<RewritableRewriter<Self>, Self>;
}

impl<P> RewritableExt for P
where
    P: Clone + Identity + Deref + From<<P as Deref>::Target>,
    P::Target: Rewritable<P> + Sized,
{
    fn children(&self) -> Children<Self> {
        RewritableRewriter::new().children(self)
    }

    fn self_and_descendants(&self) -> Vec<Self> {
        RewritableRewriter::new().self_and_descendants(self)
    }

    fn descendants_and_self(&self) -> Vec<Self> {
        RewritableRewriter::new().descendants_and_self(self)
    }

    fn self_and_descendants_breadth_first(&self) -> Vec<Self> {
        RewritableRewriter::new().self_and_descendants_breadth_first(self)
    }

    fn fold<U, F>(&self, f: F) -> U
    where
        F: FnMut(&Self, &[U]) -> U,
    {
        RewritableRewriter::new().fold(self, f)
    }

    fn rewrite<F>(&self, f: F) -> Self
    where
        F: FnMut(Self) -> Self,
    {
        RewritableRewriter::new().rewrite(self, f)
    }

    fn rewrite_iter<F>(&self, step: F) -> Self
    where
        F: FnMut(&Self) -> IterResult<Self>,
    {
        RewritableRewriter::new().rewrite_iter(self, step)
    }

    fn zip_fold<U, F>(&self, other: &Self, f: F) -> U
    where
        F: FnMut(&Self, &Self, &[U]) -> U,
    {
        RewritableRewriter::new().zip_fold(self, other, f)
    }

    fn cursor(self) -> Cursor<RewritableRewriter<Self>, Self> {
        Cursor::new(RewritableRewriter::new(), self)
    }

    fn zipper(self) -> Zipper<RewritableRewriter<Self>, Self> {
        Zipper::new(RewritableRewriter::new(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::{Rewritable, RewritableExt};
    use crate::{ChildSink, IterResult, Rc, Vec, vec};
    use pretty_assertions::assert_eq;

    #[derive(Debug, PartialEq)]
    enum Shape {
        Dot(u8),
        Group(Vec<Rc<Shape>>),
        Flip(Rc<Shape>),
    }

    impl Rewritable<Rc<Shape>> for Shape {
        fn count_children(&self) -> usize {
            match self {
                Shape::Dot(_) => 0,
                Shape::Group(items) => items.len(),
                Shape::Flip(_) => 1,
            }
        }

        fn get_children(&self, out: &mut ChildSink<'_, Rc<Shape>>) {
            match self {
                Shape::Dot(_) => {}
                Shape::Group(items) => out.extend(items.iter().cloned()),
                Shape::Flip(inner) => out.push(inner.clone()),
            }
        }

        fn set_children(&self, children: &[Rc<Shape>]) -> Self {
            crate::check_child_count(self.count_children(), children.len());
            match self {
                Shape::Dot(n) => Shape::Dot(*n),
                Shape::Group(_) => Shape::Group(children.to_vec()),
                Shape::Flip(_) => Shape::Flip(children[0].clone()),
            }
        }
    }

    fn dot(n: u8) -> Rc<Shape> {
        Rc::new(Shape::Dot(n))
    }

    fn sample() -> Rc<Shape> {
        Rc::new(Shape::Group(vec![dot(1), Rc::new(Shape::Flip(dot(2))), dot(3)]))
    }

    #[test]
    fn test_handle_traversals() {
        let shape = sample();
        assert_eq!(shape.children().len(), 3);
        assert_eq!(shape.self_and_descendants().len(), 5);
        assert_eq!(shape.descendants_and_self().last(), Some(&shape));
        assert_eq!(shape.self_and_descendants_breadth_first()[4], dot(2));
        let total = shape.fold(|node, kids: &[u32]| match &**node {
            Shape::Dot(n) => u32::from(*n),
            _ => kids.iter().sum(),
        });
        assert_eq!(total, 6);
    }

    #[test]
    fn test_handle_rewrites() {
        let shape = sample();
        let unflipped = shape.rewrite(|node| match &*node {
            Shape::Flip(inner) => inner.clone(),
            _ => node,
        });
        assert_eq!(unflipped, Rc::new(Shape::Group(vec![dot(1), dot(2), dot(3)])));
        assert!(Rc::ptr_eq(&shape.rewrite(|node| node), &shape));

        let settled = shape.rewrite_iter(|node| match &**node {
            Shape::Dot(n) if *n < 3 => IterResult::Continue(dot(n + 1)),
            _ => IterResult::Done,
        });
        assert_eq!(
            settled,
            Rc::new(Shape::Group(vec![dot(3), Rc::new(Shape::Flip(dot(3))), dot(3)]))
        );
        assert_eq!(shape.zip_fold(&settled, |_, _, kids: &[usize]| 1 + kids.iter().sum::<usize>()), 5);
    }

    #[test]
    fn test_handle_navigation() {
        let mut cursor = sample().cursor();
        assert!(cursor.try_down());
        assert!(cursor.try_right());
        assert!(cursor.try_down());
        cursor.set_focus(dot(9));
        let edited = cursor.into_top();
        assert_eq!(
            edited,
            Rc::new(Shape::Group(vec![dot(1), Rc::new(Shape::Flip(dot(9))), dot(3)]))
        );

        let zipper = sample().zipper();
        let last = zipper.down().and_then(|z| z.right()).and_then(|z| z.right());
        assert_eq!(last.map(|z| z.with_focus(dot(0)).zip()).ok(), Some(Rc::new(Shape::Group(vec![
            dot(1),
            Rc::new(Shape::Flip(dot(2))),
            dot(0),
        ]))));
    }
}
