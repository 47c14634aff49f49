//! Text rendering of a tree, one node per line.

use crate::identity::Identity;
use crate::rewriter::{Rewriter, RewriterExt};
use crate::{String, Vec};

/// Draws `node` and its descendants with box-drawing connectors.
///
/// ```
/// use sawmill_core::{ChildSink, Rewritable, RewritableRewriter, draw_tree};
/// use std::rc::Rc;
///
/// struct Dir(&'static str, Vec<Rc<Dir>>);
///
/// impl Rewritable<Rc<Dir>> for Dir {
///     fn count_children(&self) -> usize { self.1.len() }
///     fn get_children(&self, out: &mut ChildSink<'_, Rc<Dir>>) { out.extend(self.1.iter().cloned()) }
///     fn set_children(&self, children: &[Rc<Dir>]) -> Self { Dir(self.0, children.to_vec()) }
/// }
///
/// let leaf = |name| Rc::new(Dir(name, vec![]));
/// let tree = Rc::new(Dir("src", vec![Rc::new(Dir("bin", vec![leaf("main.rs")])), leaf("lib.rs")]));
/// let text = draw_tree(&RewritableRewriter::new(), &tree, |d| d.0.to_string());
/// assert_eq!(text, "src\n├─ bin\n│  └─ main.rs\n└─ lib.rs\n");
/// ```
pub fn draw_tree<R, T, F>(rewriter: &R, node: &T, mut label: F) -> String
where
    R: Rewriter<T> + ?Sized,
    T: Clone + Identity,
    F: FnMut(&T) -> String,
{
    let mut out = String::new();
    // (node, prefix for its own line, prefix for its children)
    let mut pending: Vec<(T, String, String)> = Vec::new();
    pending.push((node.clone(), String::new(), String::new()));

    while let Some((node, own, below)) = pending.pop() {
        out.push_str(&own);
        out.push_str(&label(&node));
        out.push('\n');
        let children = rewriter.children(&node).to_vec();
        let last = children.len().saturating_sub(1);
        for (i, child) in children.into_iter().enumerate().rev() {
            let (connector, continuation) = if i == last {
                ("└─ ", "   ")
            } else {
                ("├─ ", "│  ")
            };
            let own = format_prefix(&below, connector);
            let below = format_prefix(&below, continuation);
            pending.push((child, own, below));
        }
    }
    out
}

fn format_prefix(base: &str, suffix: &str) -> String {
    let mut prefix = String::with_capacity(base.len() + suffix.len());
    prefix.push_str(base);
    prefix.push_str(suffix);
    prefix
}
