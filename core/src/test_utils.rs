//! Test utilities for enabling logging in tests, plus a small expression
//! tree used throughout the unit tests.

use crate::{ChildSink, Rc, Rewriter, String, Vec, check_child_count};

/// Initialize tracing subscriber for tests with DEBUG level.
/// Call this at the start of tests where you want to see logging output.
///
/// # Example
/// ```ignore
/// #[test]
/// fn test_rewrite_to_fixpoint() {
///     test_utils::init_test_logging();
///     // ... your test code
/// }
/// ```
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    // Try to initialize, ignore error if already initialized
    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

#[derive(Debug, PartialEq)]
pub enum Expr {
    Lit(i64),
    Neg(Rc<Expr>),
    Add(Rc<Expr>, Rc<Expr>),
    Call(String, Vec<Rc<Expr>>),
}

pub fn lit(n: i64) -> Rc<Expr> {
    Rc::new(Expr::Lit(n))
}

pub fn neg(operand: Rc<Expr>) -> Rc<Expr> {
    Rc::new(Expr::Neg(operand))
}

pub fn add(left: Rc<Expr>, right: Rc<Expr>) -> Rc<Expr> {
    Rc::new(Expr::Add(left, right))
}

pub fn call(name: &str, args: Vec<Rc<Expr>>) -> Rc<Expr> {
    Rc::new(Expr::Call(name.into(), args))
}

/// Evaluates with `Call` summing its arguments.
pub fn eval(node: &Rc<Expr>, children: &[i64]) -> i64 {
    match &**node {
        Expr::Lit(n) => *n,
        Expr::Neg(_) => -children[0],
        Expr::Add(_, _) => children[0] + children[1],
        Expr::Call(_, _) => children.iter().sum(),
    }
}

/// Short label used by ordering assertions.
pub fn label(node: &Rc<Expr>) -> String {
    match &**node {
        Expr::Lit(n) => alloc::format!("{n}"),
        Expr::Neg(_) => "neg".into(),
        Expr::Add(_, _) => "add".into(),
        Expr::Call(name, _) => name.clone(),
    }
}

pub struct ExprRewriter;

impl Rewriter<Rc<Expr>> for ExprRewriter {
    fn count_children(&self, node: &Rc<Expr>) -> usize {
        match &**node {
            Expr::Lit(_) => 0,
            Expr::Neg(_) => 1,
            Expr::Add(_, _) => 2,
            Expr::Call(_, args) => args.len(),
        }
    }

    fn get_children(&self, node: &Rc<Expr>, out: &mut ChildSink<'_, Rc<Expr>>) {
        match &**node {
            Expr::Lit(_) => {}
            Expr::Neg(operand) => out.push(operand.clone()),
            Expr::Add(left, right) => {
                out.push(left.clone());
                out.push(right.clone());
            }
            Expr::Call(_, args) => out.extend(args.iter().cloned()),
        }
    }

    fn set_children(&self, node: &Rc<Expr>, children: &[Rc<Expr>]) -> Rc<Expr> {
        check_child_count(self.count_children(node), children.len());
        Rc::new(match &**node {
            Expr::Lit(n) => Expr::Lit(*n),
            Expr::Neg(_) => Expr::Neg(children[0].clone()),
            Expr::Add(_, _) => Expr::Add(children[0].clone(), children[1].clone()),
            Expr::Call(name, _) => Expr::Call(name.clone(), children.to_vec()),
        })
    }
}
