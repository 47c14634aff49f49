//! Reading and editing the node at a [`Direction`] path.

use crate::cursor::Cursor;
use crate::direction::Direction;
use crate::error::Result;
use crate::identity::Identity;
use crate::rewriter::Rewriter;

pub(crate) fn descendant_at<R, T>(rewriter: &R, path: &[Direction], root: &T) -> Result<T>
where
    R: Rewriter<T> + ?Sized,
    T: Clone + Identity,
{
    let mut cursor = Cursor::new(rewriter, root.clone());
    cursor.follow(path)?;
    Ok(cursor.focus().clone())
}

pub(crate) fn replace_descendant_at<R, T>(rewriter: &R, path: &[Direction], new: T, root: &T) -> Result<T>
where
    R: Rewriter<T> + ?Sized,
    T: Clone + Identity,
{
    let mut cursor = Cursor::new(rewriter, root.clone());
    cursor.follow(path)?;
    cursor.set_focus(new);
    Ok(cursor.into_top())
}

pub(crate) fn rewrite_descendant_at<R, T, F>(rewriter: &R, path: &[Direction], root: &T, f: F) -> Result<T>
where
    R: Rewriter<T> + ?Sized,
    T: Clone + Identity,
    F: FnOnce(T) -> T,
{
    let mut cursor = Cursor::new(rewriter, root.clone());
    cursor.follow(path)?;
    cursor.modify_focus(f);
    Ok(cursor.into_top())
}

#[cfg(test)]
mod tests {
    use crate::Direction::{Down, Left, Right, Up};
    use crate::test_utils::{Expr, ExprRewriter, add, call, lit, neg};
    use crate::{NavigationError, Rc, RewriterExt, vec};
    use pretty_assertions::assert_eq;

    fn sample() -> Rc<Expr> {
        call("f", vec![add(lit(1), neg(lit(2))), lit(3)])
    }

    #[test]
    fn test_descendant_at() {
        let tree = sample();
        assert_eq!(ExprRewriter.descendant_at(&[], &tree), Ok(tree.clone()));
        assert_eq!(ExprRewriter.descendant_at(&[Down, Down, Right, Down], &tree), Ok(lit(2)));
        assert_eq!(ExprRewriter.descendant_at(&[Down, Right, Left, Down], &tree), Ok(lit(1)));
        assert_eq!(ExprRewriter.descendant_at(&[Down, Down, Up, Right], &tree), Ok(lit(3)));
    }

    #[test]
    fn test_replace_descendant_at() {
        let tree = sample();
        let rebuilt = ExprRewriter.replace_descendant_at(&[Down, Right], lit(30), &tree);
        assert_eq!(rebuilt, Ok(call("f", vec![add(lit(1), neg(lit(2))), lit(30)])));
    }

    #[test]
    fn test_rewrite_descendant_at() {
        let tree = sample();
        let rebuilt = ExprRewriter.rewrite_descendant_at(&[Down, Down], &tree, |n| neg(n));
        assert_eq!(
            rebuilt,
            Ok(call("f", vec![add(neg(lit(1)), neg(lit(2))), lit(3)]))
        );
    }

    #[test]
    fn test_unchanged_rewrite_returns_original() {
        let tree = sample();
        let same = ExprRewriter.rewrite_descendant_at(&[Down, Down], &tree, |n| n);
        assert!(Rc::ptr_eq(&same.expect("valid path"), &tree));
    }

    #[test]
    fn test_invalid_path_is_an_error() {
        let tree = sample();
        let err = ExprRewriter.descendant_at(&[Down, Right, Down], &tree);
        assert_eq!(
            err,
            Err(NavigationError::InvalidPath {
                index: 2,
                direction: Down,
                source: crate::Box::new(NavigationError::NoChildren),
            })
        );
        assert!(matches!(
            ExprRewriter.replace_descendant_at(&[Up], lit(0), &tree),
            Err(NavigationError::InvalidPath { index: 0, direction: Up, .. })
        ));
    }
}
