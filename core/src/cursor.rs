//! A mutable cursor for navigating and editing a tree in place.
//!
//! The cursor keeps the focused node, its siblings, and the path of
//! ancestors it descended through. Edits only replace the focus; the
//! ancestors are rebuilt lazily when the cursor moves back up, and only for
//! levels where something actually changed.

use core::mem;

use smallvec::SmallVec;

use crate::Vec;
use crate::arena::fill_exact;
use crate::direction::Direction;
use crate::error::{NavigationError, Result};
use crate::identity::Identity;
use crate::rewriter::Rewriter;

/// Siblings on one side of the focus, nearest sibling last.
type Siblings<T> = SmallVec<[T; 4]>;

struct Step<T> {
    parent: T,
    prevs: Siblings<T>,
    nexts: Siblings<T>,
    changed: bool,
}

/// Mutable navigation over a tree; see [`RewriterExt::cursor`](crate::RewriterExt::cursor).
///
/// Failed moves return `false` (or an error) and leave the cursor where it
/// was.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use sawmill_core::{ChildSink, Rewriter, RewriterExt};
///
/// // A rose tree of labels.
/// #[derive(Debug, PartialEq)]
/// struct Node(&'static str, Vec<Rc<Node>>);
///
/// struct Nodes;
///
/// impl Rewriter<Rc<Node>> for Nodes {
///     fn count_children(&self, node: &Rc<Node>) -> usize {
///         node.1.len()
///     }
///     fn get_children(&self, node: &Rc<Node>, out: &mut ChildSink<'_, Rc<Node>>) {
///         out.extend(node.1.iter().cloned());
///     }
///     fn set_children(&self, node: &Rc<Node>, children: &[Rc<Node>]) -> Rc<Node> {
///         Rc::new(Node(node.0, children.to_vec()))
///     }
/// }
///
/// let leaf = |name| Rc::new(Node(name, vec![]));
/// let tree = Rc::new(Node("root", vec![leaf("a"), leaf("b")]));
///
/// let nodes = Nodes;
/// let mut cursor = nodes.cursor(tree);
/// assert!(cursor.try_down());
/// assert!(cursor.try_right());
/// cursor.set_focus(leaf("c"));
/// let edited = cursor.into_top();
/// assert_eq!(edited, Rc::new(Node("root", vec![leaf("a"), leaf("c")])));
/// ```
pub struct Cursor<R, T> {
    rewriter: R,
    path: Vec<Step<T>>,
    prevs: Siblings<T>,
    nexts: Siblings<T>,
    focus: T,
    /// Whether the current level differs from the children its parent had.
    changed: bool,
    scratch: Vec<T>,
}

impl<R: Rewriter<T>, T: Clone + Identity> Cursor<R, T> {
    pub fn new(rewriter: R, root: T) -> Self {
        Self {
            rewriter,
            path: Vec::new(),
            prevs: SmallVec::new(),
            nexts: SmallVec::new(),
            focus: root,
            changed: false,
            scratch: Vec::new(),
        }
    }

    pub fn focus(&self) -> &T {
        &self.focus
    }

    /// Number of ancestors above the focus.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Replaces the focused node.
    ///
    /// Setting the node that is already focused is not an edit.
    pub fn set_focus(&mut self, node: T) {
        if !node.is_same(&self.focus) {
            self.focus = node;
            self.changed = true;
        }
    }

    pub fn modify_focus<F>(&mut self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        let node = f(self.focus.clone());
        self.set_focus(node);
    }

    // ========================================================================
    // Single moves
    // ========================================================================

    /// Moves to the parent, rebuilding it if this level was edited.
    pub fn try_up(&mut self) -> bool {
        let Some(step) = self.path.pop() else {
            return false;
        };
        let child = mem::replace(&mut self.focus, step.parent);
        let level_changed = mem::replace(&mut self.changed, step.changed);

        if level_changed {
            self.scratch.clear();
            self.scratch.extend(self.prevs.drain(..));
            self.scratch.push(child);
            self.scratch.extend(self.nexts.drain(..).rev());
            tracing::debug!(children = self.scratch.len(), "Cursor: rebuilding parent");
            let rebuilt = self.rewriter.set_children(&self.focus, &self.scratch);
            self.scratch.clear();
            if !rebuilt.is_same(&self.focus) {
                self.focus = rebuilt;
                self.changed = true;
            }
        }

        self.prevs = step.prevs;
        self.nexts = step.nexts;
        true
    }

    /// Moves to the first child of the focus.
    pub fn try_down(&mut self) -> bool {
        let count = self.rewriter.count_children(&self.focus);
        if count == 0 {
            return false;
        }

        self.scratch.clear();
        let rewriter = &self.rewriter;
        let focus = &self.focus;
        fill_exact(&mut self.scratch, count, |sink| rewriter.get_children(focus, sink));

        let mut children = self.scratch.drain(..);
        let Some(first) = children.next() else {
            unreachable!("a node with children yields a first child");
        };
        let nexts: Siblings<T> = children.rev().collect();

        let parent = mem::replace(&mut self.focus, first);
        self.path.push(Step {
            parent,
            prevs: mem::take(&mut self.prevs),
            nexts: mem::replace(&mut self.nexts, nexts),
            changed: self.changed,
        });
        self.changed = false;
        true
    }

    pub fn try_left(&mut self) -> bool {
        let Some(prev) = self.prevs.pop() else {
            return false;
        };
        let old = mem::replace(&mut self.focus, prev);
        self.nexts.push(old);
        true
    }

    pub fn try_right(&mut self) -> bool {
        let Some(next) = self.nexts.pop() else {
            return false;
        };
        let old = mem::replace(&mut self.focus, next);
        self.prevs.push(old);
        true
    }

    pub fn try_move(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.try_up(),
            Direction::Down => self.try_down(),
            Direction::Left => self.try_left(),
            Direction::Right => self.try_right(),
        }
    }

    pub fn up(&mut self) -> Result<()> {
        self.move_to(Direction::Up)
    }

    pub fn down(&mut self) -> Result<()> {
        self.move_to(Direction::Down)
    }

    pub fn left(&mut self) -> Result<()> {
        self.move_to(Direction::Left)
    }

    pub fn right(&mut self) -> Result<()> {
        self.move_to(Direction::Right)
    }

    pub fn move_to(&mut self, direction: Direction) -> Result<()> {
        if self.try_move(direction) {
            Ok(())
        } else {
            Err(NavigationError::for_direction(direction))
        }
    }

    // ========================================================================
    // Derived moves
    // ========================================================================

    /// Moves to the root and returns it, rebuilt with every edit.
    pub fn top(&mut self) -> &T {
        while self.try_up() {}
        &self.focus
    }

    /// Consumes the cursor, returning the rebuilt root.
    pub fn into_top(mut self) -> T {
        while self.try_up() {}
        self.focus
    }

    pub fn leftmost(&mut self) {
        while self.try_left() {}
    }

    pub fn rightmost(&mut self) {
        while self.try_right() {}
    }

    /// Moves up while `predicate` holds for the focus.
    ///
    /// Returns `false` if the root was reached with the predicate still
    /// holding.
    pub fn up_while<P>(&mut self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.move_while(Direction::Up, predicate)
    }

    pub fn down_while<P>(&mut self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.move_while(Direction::Down, predicate)
    }

    pub fn left_while<P>(&mut self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.move_while(Direction::Left, predicate)
    }

    pub fn right_while<P>(&mut self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.move_while(Direction::Right, predicate)
    }

    fn move_while<P>(&mut self, direction: Direction, mut predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        while predicate(&self.focus) {
            if !self.try_move(direction) {
                return false;
            }
        }
        true
    }

    /// Pre-order search from the focus: the focus, its descendants, then its
    /// right siblings and theirs.
    ///
    /// On success the focus is the first match. Otherwise the cursor is back
    /// where it started and `false` is returned.
    pub fn search_down_and_right<P>(&mut self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.search(predicate, Direction::Down, Direction::Right)
    }

    /// Like [`search_down_and_right`](Self::search_down_and_right), but
    /// visits a node's right siblings before its children.
    pub fn search_right_and_down<P>(&mut self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.search(predicate, Direction::Right, Direction::Down)
    }

    fn search<P>(&mut self, mut predicate: P, primary: Direction, secondary: Direction) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        let mut moves: Vec<Direction> = Vec::new();
        loop {
            if predicate(&self.focus) {
                return true;
            }
            if self.try_move(primary) {
                moves.push(primary);
                continue;
            }
            // Backtrack until a secondary move opens a fresh subtree.
            loop {
                if self.try_move(secondary) {
                    moves.push(secondary);
                    break;
                }
                while moves.last() == Some(&secondary) {
                    moves.pop();
                    let undone = self.try_move(secondary.reverse());
                    debug_assert!(undone);
                }
                if moves.pop().is_none() {
                    return false;
                }
                let undone = self.try_move(primary.reverse());
                debug_assert!(undone);
            }
        }
    }

    // ========================================================================
    // Paths
    // ========================================================================

    /// The `Down`/`Right` steps leading from the root to the focus.
    pub fn get_path(&self) -> Vec<Direction> {
        let mut path = Vec::new();
        let levels = self.path.iter().skip(1).map(|step| step.prevs.len());
        for index in levels.chain((!self.path.is_empty()).then_some(self.prevs.len())) {
            path.push(Direction::Down);
            path.extend(core::iter::repeat_n(Direction::Right, index));
        }
        path
    }

    /// Follows `path` from the focus.
    ///
    /// On failure the cursor stays at the last position it reached.
    pub fn follow(&mut self, path: &[Direction]) -> Result<()> {
        for (index, &direction) in path.iter().enumerate() {
            if !self.try_move(direction) {
                return Err(NavigationError::invalid_path(index, direction));
            }
        }
        Ok(())
    }

    pub fn try_follow(&mut self, path: &[Direction]) -> bool {
        self.follow(path).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction::{Down, Right};
    use crate::test_utils::{Expr, ExprRewriter, add, call, label, lit, neg};
    use crate::{Rc, RewriterExt, vec};
    use pretty_assertions::assert_eq;

    fn sample() -> Rc<Expr> {
        // f(add(1, neg(2)), 3, g(4, 5))
        call(
            "f",
            vec![add(lit(1), neg(lit(2))), lit(3), call("g", vec![lit(4), lit(5)])],
        )
    }

    fn is_lit(n: i64) -> impl Fn(&Rc<Expr>) -> bool {
        move |node| matches!(**node, Expr::Lit(m) if m == n)
    }

    #[test]
    fn test_edit_and_rebuild() {
        let rewriter = ExprRewriter;
        let mut cursor = rewriter.cursor(add(neg(lit(3)), lit(4)));
        cursor.down().expect("add has children");
        cursor.down().expect("neg has a child");
        cursor.set_focus(lit(5));
        cursor.up().expect("not at root");
        assert_eq!(*cursor.focus(), neg(lit(5)));
        cursor.right().expect("neg has a right sibling");
        cursor.set_focus(lit(6));
        assert_eq!(*cursor.top(), add(neg(lit(5)), lit(6)));
    }

    #[test]
    fn test_navigation_without_edits_returns_original() {
        let rewriter = ExprRewriter;
        let tree = sample();
        let mut cursor = rewriter.cursor(tree.clone());
        assert!(cursor.try_down());
        assert!(cursor.try_down());
        assert!(cursor.try_right());
        assert!(cursor.try_up());
        assert!(cursor.try_right());
        assert!(Rc::ptr_eq(&cursor.into_top(), &tree));
    }

    #[test]
    fn test_unedited_levels_are_shared() {
        let rewriter = ExprRewriter;
        let tree = sample();
        let mut cursor = rewriter.cursor(tree.clone());
        cursor.try_follow(&[Down, Right, Right, Down]);
        cursor.set_focus(lit(40));
        let rebuilt = cursor.into_top();
        let (Expr::Call(_, old), Expr::Call(_, new)) = (&*tree, &*rebuilt) else {
            panic!("expected calls");
        };
        assert!(Rc::ptr_eq(&old[0], &new[0]));
        assert!(Rc::ptr_eq(&old[1], &new[1]));
        assert_eq!(new[2], call("g", vec![lit(40), lit(5)]));
    }

    #[test]
    fn test_setting_same_node_is_not_an_edit() {
        let rewriter = ExprRewriter;
        let tree = sample();
        let mut cursor = rewriter.cursor(tree.clone());
        cursor.down().expect("has children");
        let same = cursor.focus().clone();
        cursor.set_focus(same);
        cursor.modify_focus(|node| node);
        assert!(Rc::ptr_eq(&cursor.into_top(), &tree));
    }

    #[test]
    fn test_failed_moves_leave_cursor_in_place() {
        let rewriter = ExprRewriter;
        let mut cursor = rewriter.cursor(sample());
        assert_eq!(cursor.up(), Err(NavigationError::AtRoot));
        assert_eq!(cursor.left(), Err(NavigationError::NoLeftSibling));
        assert!(cursor.try_down());
        assert!(!cursor.try_left());
        assert_eq!(label(cursor.focus()), "add");
        cursor.rightmost();
        assert_eq!(cursor.right(), Err(NavigationError::NoRightSibling));
        assert_eq!(label(cursor.focus()), "g");
        assert!(cursor.try_down());
        assert!(cursor.try_right());
        assert_eq!(cursor.down(), Err(NavigationError::NoChildren));
        assert_eq!(label(cursor.focus()), "5");
        cursor.leftmost();
        assert_eq!(label(cursor.focus()), "4");
    }

    #[test]
    fn test_get_path_and_follow_round_trip() {
        let rewriter = ExprRewriter;
        let tree = sample();
        let mut cursor = rewriter.cursor(tree.clone());
        assert!(cursor.get_path().is_empty());
        cursor.follow(&[Down, Down, Right, Down]).expect("valid path");
        assert_eq!(label(cursor.focus()), "2");
        assert_eq!(cursor.get_path(), [Down, Down, Right, Down]);

        let mut other = rewriter.cursor(tree);
        other.follow(&[Down, Right, Right, Down, Right]).expect("valid path");
        let path = other.get_path();
        assert_eq!(path, [Down, Right, Right, Down, Right]);
        let mut replay = rewriter.cursor(sample());
        assert!(replay.try_follow(&path));
        assert_eq!(label(replay.focus()), "5");
    }

    #[test]
    fn test_follow_stops_at_last_good_position() {
        let rewriter = ExprRewriter;
        let mut cursor = rewriter.cursor(sample());
        let err = cursor.follow(&[Down, Right, Down, Right]);
        assert!(matches!(
            err,
            Err(NavigationError::InvalidPath { index: 2, direction: Down, .. })
        ));
        assert_eq!(label(cursor.focus()), "3");
        assert_eq!(cursor.depth(), 1);
    }

    #[test]
    fn test_while_moves() {
        let rewriter = ExprRewriter;
        let mut cursor = rewriter.cursor(sample());
        // Descend along first children until a literal is reached.
        assert!(cursor.down_while(|node| !matches!(**node, Expr::Lit(_))));
        assert_eq!(label(cursor.focus()), "1");
        assert!(!cursor.right_while(|_| true));
        assert_eq!(label(cursor.focus()), "neg");
        assert!(!cursor.up_while(|_| true));
        assert!(cursor.is_root());
        assert!(cursor.left_while(|_| false));
    }

    #[test]
    fn test_search_down_and_right() {
        let rewriter = ExprRewriter;
        let mut cursor = rewriter.cursor(sample());
        assert!(cursor.search_down_and_right(is_lit(2)));
        assert_eq!(cursor.get_path(), [Down, Down, Right, Down]);

        let mut cursor = rewriter.cursor(sample());
        assert!(cursor.search_down_and_right(is_lit(5)));
        assert_eq!(cursor.get_path(), [Down, Right, Right, Down, Right]);
    }

    #[test]
    fn test_search_right_and_down_prefers_siblings() {
        let rewriter = ExprRewriter;
        // Both the first child's subtree and the second child contain a 3.
        let tree = call("f", vec![neg(lit(3)), lit(3)]);
        let mut cursor = rewriter.cursor(tree.clone());
        cursor.down().expect("has children");
        assert!(cursor.search_right_and_down(is_lit(3)));
        assert_eq!(cursor.get_path(), [Down, Right]);

        let mut cursor = rewriter.cursor(tree);
        cursor.down().expect("has children");
        assert!(cursor.search_down_and_right(is_lit(3)));
        assert_eq!(cursor.get_path(), [Down, Down]);
    }

    #[test]
    fn test_failed_search_returns_to_start() {
        let rewriter = ExprRewriter;
        let mut cursor = rewriter.cursor(sample());
        cursor.follow(&[Down, Down]).expect("valid path");
        assert!(!cursor.search_down_and_right(is_lit(99)));
        assert_eq!(cursor.get_path(), [Down, Down]);
        assert!(!cursor.search_right_and_down(is_lit(99)));
        assert_eq!(cursor.get_path(), [Down, Down]);
    }

    #[test]
    fn test_search_does_not_leave_its_subtree_upwards() {
        let rewriter = ExprRewriter;
        let mut cursor = rewriter.cursor(sample());
        cursor.follow(&[Down, Right]).expect("valid path");
        // `1` sits in an earlier sibling, so it is out of reach.
        assert!(!cursor.search_down_and_right(is_lit(1)));
        assert!(cursor.search_down_and_right(is_lit(4)));
        assert_eq!(cursor.get_path(), [Down, Right, Right, Down]);
    }
}
