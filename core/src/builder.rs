//! Assembling a [`Rewriter`] from per-variant declarations.
//!
//! Each case names a view of one kind of node (usually an enum variant),
//! lists that kind's children in order, and says how to rebuild it:
//!
//! ```
//! use std::rc::Rc;
//! use sawmill_core::{RewriterBuilder, RewriterExt};
//!
//! #[derive(Debug, PartialEq)]
//! enum Expr {
//!     Lit(i64),
//!     Add(Rc<Expr>, Rc<Expr>),
//!     Call(String, Vec<Rc<Expr>>),
//! }
//!
//! let rewriter = RewriterBuilder::<Rc<Expr>>::new()
//!     .case(
//!         |e: &Rc<Expr>| matches!(**e, Expr::Lit(_)).then_some(()),
//!         |c| c.construct(|_, _| unreachable!("literals have no children to replace")),
//!     )
//!     .case(
//!         |e: &Rc<Expr>| match &**e {
//!             Expr::Add(l, r) => Some((l.clone(), r.clone())),
//!             _ => None,
//!         },
//!         |c| {
//!             c.child(|(l, _)| l.clone())
//!                 .child(|(_, r)| r.clone())
//!                 .construct(|_, kids| Rc::new(Expr::Add(kids.next_child(), kids.next_child())))
//!         },
//!     )
//!     .case(
//!         |e: &Rc<Expr>| match &**e {
//!             Expr::Call(name, args) => Some((name.clone(), args.clone())),
//!             _ => None,
//!         },
//!         |c| {
//!             c.children(|(_, args)| args.clone())
//!                 .construct(|(name, _), kids| Rc::new(Expr::Call(name.clone(), kids.next_children())))
//!         },
//!     )
//!     .build();
//!
//! let lit = |n| Rc::new(Expr::Lit(n));
//! let tree = Rc::new(Expr::Call("f".into(), vec![lit(1), Rc::new(Expr::Add(lit(2), lit(3)))]));
//! assert_eq!(rewriter.self_and_descendants(&tree).len(), 5);
//! ```
//!
//! Cases are tried in declaration order; the first whose view function
//! returns `Some` handles the node. A node no case accepts is a bug in the
//! builder setup and panics.

use crate::arena::ChildSink;
use crate::rewriter::{Rewriter, check_child_count};
use crate::{Box, Vec};

type View<'f, T, S> = Box<dyn Fn(&T) -> Option<S> + 'f>;

enum Member<'f, T, S> {
    Child(Box<dyn Fn(&S) -> T + 'f>),
    Children(Box<dyn Fn(&S) -> Vec<T> + 'f>),
}

/// How many new children one declared member consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    One,
    Many(usize),
}

/// Declares the children of one kind of node; see [`RewriterBuilder::case`].
pub struct CaseBuilder<'f, T, S> {
    members: Vec<Member<'f, T, S>>,
}

/// A finished case, ready to be added to a [`RewriterBuilder`].
pub struct Case<'f, T, S> {
    members: Vec<Member<'f, T, S>>,
    construct: Box<dyn Fn(&S, &mut NewChildren<'_, T>) -> T + 'f>,
}

impl<'f, T: 'f, S: 'f> CaseBuilder<'f, T, S> {
    /// Declares a single child.
    pub fn child<G>(mut self, get: G) -> Self
    where
        G: Fn(&S) -> T + 'f,
    {
        self.members.push(Member::Child(Box::new(get)));
        self
    }

    /// Declares a list of children.
    pub fn children<G>(mut self, get: G) -> Self
    where
        G: Fn(&S) -> Vec<T> + 'f,
    {
        self.members.push(Member::Children(Box::new(get)));
        self
    }

    /// Finishes the case with the function that rebuilds a node.
    ///
    /// `construct` gets the view of the original node (for its plain fields)
    /// and the replacement children, to be read in declaration order.
    pub fn construct<C>(self, construct: C) -> Case<'f, T, S>
    where
        C: Fn(&S, &mut NewChildren<'_, T>) -> T + 'f,
    {
        Case {
            members: self.members,
            construct: Box::new(construct),
        }
    }
}

/// Replacement children handed to a case's `construct` function.
///
/// # Panics
///
/// Reading a member of the wrong kind, or reading past the last member.
pub struct NewChildren<'a, T> {
    children: &'a [T],
    slots: &'a [Slot],
    position: usize,
}

impl<T: Clone> NewChildren<'_, T> {
    /// The replacement for the next child declared with `child`.
    pub fn next_child(&mut self) -> T {
        match self.slots.split_first() {
            Some((Slot::One, rest)) => {
                self.slots = rest;
                let child = self.children[self.position].clone();
                self.position += 1;
                child
            }
            other => panic!(
                "NewChildren::next_child: the next declared member is {:?}",
                other.map(|(slot, _)| slot)
            ),
        }
    }

    /// The replacements for the next child list declared with `children`.
    pub fn next_children(&mut self) -> Vec<T> {
        match self.slots.split_first() {
            Some((Slot::Many(len), rest)) => {
                self.slots = rest;
                let list = self.children[self.position..self.position + len].to_vec();
                self.position += len;
                list
            }
            other => panic!(
                "NewChildren::next_children: the next declared member is {:?}",
                other.map(|(slot, _)| slot)
            ),
        }
    }
}

/// Type-erased case stored in a [`BuiltRewriter`].
trait ErasedCase<T> {
    fn count_children(&self, node: &T) -> Option<usize>;

    fn get_children(&self, node: &T, out: &mut ChildSink<'_, T>) -> bool;

    fn set_children(&self, node: &T, children: &[T]) -> Option<T>;
}

struct Dispatch<'f, T, S> {
    view: View<'f, T, S>,
    case: Case<'f, T, S>,
}

impl<T: Clone, S> Dispatch<'_, T, S> {
    fn slots(&self, view: &S) -> Vec<Slot> {
        self.case
            .members
            .iter()
            .map(|member| match member {
                Member::Child(_) => Slot::One,
                Member::Children(get) => Slot::Many(get(view).len()),
            })
            .collect()
    }
}

impl<T: Clone, S> ErasedCase<T> for Dispatch<'_, T, S> {
    fn count_children(&self, node: &T) -> Option<usize> {
        let view = (self.view)(node)?;
        let count = self
            .case
            .members
            .iter()
            .map(|member| match member {
                Member::Child(_) => 1,
                Member::Children(get) => get(&view).len(),
            })
            .sum();
        Some(count)
    }

    fn get_children(&self, node: &T, out: &mut ChildSink<'_, T>) -> bool {
        let Some(view) = (self.view)(node) else {
            return false;
        };
        for member in &self.case.members {
            match member {
                Member::Child(get) => out.push(get(&view)),
                Member::Children(get) => out.extend(get(&view)),
            }
        }
        true
    }

    fn set_children(&self, node: &T, children: &[T]) -> Option<T> {
        let view = (self.view)(node)?;
        let slots = self.slots(&view);
        let expected = slots
            .iter()
            .map(|slot| match slot {
                Slot::One => 1,
                Slot::Many(len) => *len,
            })
            .sum();
        check_child_count(expected, children.len());
        let mut reader = NewChildren {
            children,
            slots: &slots,
            position: 0,
        };
        Some((self.case.construct)(&view, &mut reader))
    }
}

/// Collects cases and builds a [`BuiltRewriter`].
pub struct RewriterBuilder<'f, T> {
    cases: Vec<Box<dyn ErasedCase<T> + 'f>>,
}

impl<T> Default for RewriterBuilder<'_, T> {
    fn default() -> Self {
        Self { cases: Vec::new() }
    }
}

impl<'f, T: Clone + 'f> RewriterBuilder<'f, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a case for the nodes `view` accepts.
    ///
    /// `declare` receives an empty [`CaseBuilder`] and returns the finished
    /// [`Case`].
    pub fn case<S, V, D>(mut self, view: V, declare: D) -> Self
    where
        S: 'f,
        V: Fn(&T) -> Option<S> + 'f,
        D: FnOnce(CaseBuilder<'f, T, S>) -> Case<'f, T, S>,
    {
        let case = declare(CaseBuilder { members: Vec::new() });
        self.cases.push(Box::new(Dispatch {
            view: Box::new(view),
            case,
        }));
        self
    }

    pub fn build(self) -> BuiltRewriter<'f, T> {
        tracing::trace!(cases = self.cases.len(), "RewriterBuilder: built");
        BuiltRewriter { cases: self.cases }
    }
}

/// A [`Rewriter`] assembled by [`RewriterBuilder`].
pub struct BuiltRewriter<'f, T> {
    cases: Vec<Box<dyn ErasedCase<T> + 'f>>,
}

#[cold]
#[track_caller]
fn unhandled_node<T>() -> ! {
    let node_type = core::any::type_name::<T>();
    tracing::error!(node_type, "RewriterBuilder: no case accepts the node");
    panic!("no rewriter case handles this node of type `{node_type}`")
}

impl<T> Rewriter<T> for BuiltRewriter<'_, T> {
    fn count_children(&self, node: &T) -> usize {
        self.cases
            .iter()
            .find_map(|case| case.count_children(node))
            .unwrap_or_else(|| unhandled_node::<T>())
    }

    fn get_children(&self, node: &T, out: &mut ChildSink<'_, T>) {
        if !self.cases.iter().any(|case| case.get_children(node, out)) {
            unhandled_node::<T>();
        }
    }

    fn set_children(&self, node: &T, children: &[T]) -> T {
        self.cases
            .iter()
            .find_map(|case| case.set_children(node, children))
            .unwrap_or_else(|| unhandled_node::<T>())
    }
}
