//! Sawmill - traversal and rewriting for immutable trees
//!
//! # Overview
//!
//! Sawmill gives any immutable tree type a common set of algorithms once it
//! describes how to reach a node's immediate children. Typical trees are
//! syntax trees, query plans, document models and configuration trees.
//!
//! # Quick Start
//!
//! ```
//! use std::rc::Rc;
//! use sawmill::{IterResult, Rewritable, RewritableExt};
//!
//! #[derive(Debug, PartialEq, Rewritable)]
//! enum Expr {
//!     Lit(i64),
//!     Neg(Rc<Expr>),
//!     Add(Rc<Expr>, Rc<Expr>),
//! }
//!
//! let lit = |n| Rc::new(Expr::Lit(n));
//! let tree = Rc::new(Expr::Add(Rc::new(Expr::Neg(lit(3))), lit(4)));
//!
//! let folded = tree.rewrite_iter(|node| match &**node {
//!     Expr::Neg(x) => match **x {
//!         Expr::Lit(n) => IterResult::Continue(lit(-n)),
//!         _ => IterResult::Done,
//!     },
//!     Expr::Add(l, r) => match (&**l, &**r) {
//!         (Expr::Lit(a), Expr::Lit(b)) => IterResult::Continue(lit(a + b)),
//!         _ => IterResult::Done,
//!     },
//!     Expr::Lit(_) => IterResult::Done,
//! });
//! assert_eq!(folded, lit(1));
//! ```
//!
//! # Ways to describe a tree
//!
//! 1. **Derive** `Rewritable` on the node type (needs the `derive` feature,
//!    on by default).
//! 2. **Implement** [`Rewritable`] by hand on the node type, or
//!    [`Rewriter`] on a separate value when the node type is foreign or the
//!    handle is not a smart pointer (for example `&'a Node` in an arena).
//! 3. **Assemble** a rewriter at runtime with [`RewriterBuilder`].
//!
//! Every route ends in the same toolbox: [`RewriterExt`] on rewriters and
//! [`RewritableExt`] on handles.

pub use sawmill_core::*;

#[cfg(feature = "derive")]
pub use sawmill_macros::Rewritable;
