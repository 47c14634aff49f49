//! Procedural macros for sawmill
//!
//! This crate provides `#[derive(Rewritable)]`, which writes the
//! `sawmill::Rewritable` impl for a node type from its field types.

extern crate proc_macro;

use proc_macro::TokenStream;

mod rewritable;

/// Derive `sawmill::Rewritable` for a struct or enum.
///
/// Children are found by their types:
/// - A field of type `W<Self>` (spelled with the type's own name, for
///   example `Rc<Expr>`) is one child.
/// - A field of type `Vec<W<Self>>` is a list of children.
/// - Every other field is plain data and is cloned when a node is rebuilt.
///
/// All child fields must use the same wrapper `W`; the impl is
/// `Rewritable<W<Self>>`. `W` must be a shared pointer such as `Rc` or
/// `Arc`. `Box` is rejected: a cloned box is a new allocation, so an
/// unchanged child could never be recognised as the original.
///
/// # Example
///
/// ```ignore
/// #[derive(Rewritable)]
/// enum Expr {
///     Lit(i64),
///     Add(Rc<Expr>, Rc<Expr>),
///     Call(String, Vec<Rc<Expr>>),
/// }
/// ```
///
/// # Attributes
///
/// - `#[rewritable(node = "Rc<Expr>")]` on the type: the handle type. Needed
///   when no field is a child, otherwise it must agree with the fields.
/// - `#[rewritable(skip)]` on a field: treat it as plain data even if its
///   type looks like a child.
#[proc_macro_derive(Rewritable, attributes(rewritable))]
pub fn derive_rewritable(input: TokenStream) -> TokenStream {
    rewritable::derive_rewritable_impl(input)
}
