//! Generic traversal and rewriting of immutable trees.
//!
//! A tree type only has to say how to count, enumerate and replace the
//! immediate children of a node (the [`Rewriter`] contract). Everything else
//! in this crate (folds, rewrites, zip-folds, depth/breadth enumeration,
//! replacement contexts, cursors and zippers) is built on those three
//! operations, so unrelated tree types get the same toolbox without sharing
//! a base type.
//!
//! ## Structure
//!
//! - **Containers**: [`Children`], the small-arity child container
//! - **Arenas**: [`arena::ChunkStack`] and [`arena::PooledQueue`], rented
//!   buffers that keep whole-tree traversals off the allocator
//! - **Contract**: [`Rewriter`], [`Rewritable`], [`Identity`]
//! - **Algorithms**: [`RewriterExt`] and the [`traversal`] module
//! - **Navigation**: [`Cursor`] (mutable) and [`Zipper`] (persistent)
//! - **Builders**: [`RewriterBuilder`], plus `#[derive(Rewritable)]` in the
//!   `sawmill` facade crate
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use sawmill_core::{ChildSink, Rewriter, RewriterExt};
//!
//! enum Expr {
//!     Lit(i64),
//!     Neg(Rc<Expr>),
//!     Add(Rc<Expr>, Rc<Expr>),
//! }
//!
//! struct ExprRewriter;
//!
//! impl Rewriter<Rc<Expr>> for ExprRewriter {
//!     fn count_children(&self, node: &Rc<Expr>) -> usize {
//!         match &**node {
//!             Expr::Lit(_) => 0,
//!             Expr::Neg(_) => 1,
//!             Expr::Add(_, _) => 2,
//!         }
//!     }
//!
//!     fn get_children(&self, node: &Rc<Expr>, out: &mut ChildSink<'_, Rc<Expr>>) {
//!         match &**node {
//!             Expr::Lit(_) => {}
//!             Expr::Neg(x) => out.push(x.clone()),
//!             Expr::Add(l, r) => {
//!                 out.push(l.clone());
//!                 out.push(r.clone());
//!             }
//!         }
//!     }
//!
//!     fn set_children(&self, node: &Rc<Expr>, children: &[Rc<Expr>]) -> Rc<Expr> {
//!         sawmill_core::check_child_count(self.count_children(node), children.len());
//!         Rc::new(match &**node {
//!             Expr::Lit(n) => Expr::Lit(*n),
//!             Expr::Neg(_) => Expr::Neg(children[0].clone()),
//!             Expr::Add(_, _) => Expr::Add(children[0].clone(), children[1].clone()),
//!         })
//!     }
//! }
//!
//! let tree = Rc::new(Expr::Add(
//!     Rc::new(Expr::Neg(Rc::new(Expr::Lit(3)))),
//!     Rc::new(Expr::Lit(4)),
//! ));
//!
//! let value = ExprRewriter.fold(&tree, |node, children: &[i64]| match &**node {
//!     Expr::Lit(n) => *n,
//!     Expr::Neg(_) => -children[0],
//!     Expr::Add(_, _) => children[0] + children[1],
//! });
//! assert_eq!(value, 1);
//! ```
//!
//! ## Features
//!
//! - `std`: arenas park their regions in a per-thread pool when dropped, so
//!   repeated traversals on one thread stop allocating. Without it the crate
//!   is `no_std` and every traversal starts with fresh regions.

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

// Re-export for convenience so other modules don't need alloc:: prefix
#[allow(unused_imports)]
pub(crate) use alloc::{boxed::Box, format, rc::Rc, string::String, string::ToString, vec, vec::Vec};

pub mod arena;
pub mod builder;
pub mod children;
pub mod cursor;
pub mod direction;
pub mod draw;
pub mod error;
pub mod identity;
pub mod options;
pub mod rewritable;
pub mod rewriter;
mod scarred;
mod stack;
pub mod traversal;
pub mod zipper;

pub use arena::{ChildSink, Chunk, ChunkStack, PooledQueue};
pub use builder::{BuiltRewriter, Case, CaseBuilder, NewChildren, RewriterBuilder};
pub use children::{Children, NumberOfChildren};
pub use cursor::Cursor;
pub use direction::Direction;
pub use draw::draw_tree;
pub use error::NavigationError;
pub use identity::Identity;
pub use options::ArenaOptions;
pub use rewritable::{Rewritable, RewritableExt, RewritableRewriter};
pub use rewriter::{Rewriter, RewriterExt, check_child_count};
pub use traversal::asynch::{fold_async, rewrite_async, rewrite_iter_async, zip_fold_async};
pub use traversal::{Context, IterResult};
pub use zipper::Zipper;

/// Test utilities shared by the unit tests of this crate.
#[cfg(test)]
pub(crate) mod test_utils;
