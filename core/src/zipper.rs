//! A persistent zipper.
//!
//! Every move returns a new [`Zipper`] and leaves the old one valid, so a
//! caller can branch off several edits from one position. Positions share
//! their sibling lists and ancestor paths; edits are recorded as scars and
//! the affected ancestors are only rebuilt when [`Zipper::zip`] (or
//! [`Zipper::focus`]) asks for a finished node.

use crate::Vec;
use crate::direction::Direction;
use crate::error::{NavigationError, Result};
use crate::identity::Identity;
use crate::rewriter::Rewriter;
use crate::scarred::Scarred;
use crate::stack::Stack;

struct Step<T> {
    parent: Scarred<T>,
    prevs: Stack<Scarred<T>>,
    nexts: Stack<Scarred<T>>,
    changed: bool,
}

/// Persistent navigation over a tree; see [`RewriterExt::zipper`](crate::RewriterExt::zipper).
pub struct Zipper<R, T> {
    rewriter: R,
    path: Stack<Step<T>>,
    /// Left siblings, nearest on top.
    prevs: Stack<Scarred<T>>,
    focus: Scarred<T>,
    /// Right siblings, nearest on top.
    nexts: Stack<Scarred<T>>,
    changed: bool,
}

impl<R: Clone, T> Clone for Zipper<R, T> {
    fn clone(&self) -> Self {
        Self {
            rewriter: self.rewriter.clone(),
            path: self.path.clone(),
            prevs: self.prevs.clone(),
            focus: self.focus.clone(),
            nexts: self.nexts.clone(),
            changed: self.changed,
        }
    }
}

impl<R, T> Zipper<R, T>
where
    R: Rewriter<T> + Clone,
    T: Clone + Identity,
{
    pub fn new(rewriter: R, root: T) -> Self {
        Self {
            rewriter,
            path: Stack::new(),
            prevs: Stack::new(),
            focus: Scarred::untouched(root),
            nexts: Stack::new(),
            changed: false,
        }
    }

    /// The focused node, with every edit made below it applied.
    pub fn focus(&self) -> T {
        self.focus.heal(&self.rewriter)
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Returns a zipper with `node` in place of the focus.
    pub fn with_focus(&self, node: T) -> Self {
        if self.focus.is_untouched() && node.is_same(self.focus.original()) {
            return self.clone();
        }
        Self {
            focus: Scarred::untouched(node),
            changed: true,
            ..self.clone()
        }
    }

    pub fn modify_focus<F>(&self, f: F) -> Self
    where
        F: FnOnce(T) -> T,
    {
        self.with_focus(f(self.focus()))
    }

    // ========================================================================
    // Single moves
    // ========================================================================

    pub fn try_up(&self) -> Option<Self> {
        let (step, path) = self.path.pop()?;
        let focus = if self.changed {
            let mut children: Vec<Scarred<T>> = self.prevs.iter().cloned().collect();
            children.reverse();
            children.push(self.focus.clone());
            children.extend(self.nexts.iter().cloned());
            Scarred::rebuilt(step.parent.original().clone(), children)
        } else {
            step.parent.clone()
        };
        Some(Self {
            rewriter: self.rewriter.clone(),
            path,
            prevs: step.prevs.clone(),
            focus,
            nexts: step.nexts.clone(),
            changed: step.changed || self.changed,
        })
    }

    pub fn try_down(&self) -> Option<Self> {
        let children = self.focus.children(&self.rewriter);
        let (first, rest) = children.split_first()?;
        let step = Step {
            parent: self.focus.clone(),
            prevs: self.prevs.clone(),
            nexts: self.nexts.clone(),
            changed: self.changed,
        };
        Some(Self {
            rewriter: self.rewriter.clone(),
            path: self.path.push(step),
            prevs: Stack::new(),
            focus: first.clone(),
            nexts: rest.iter().rev().cloned().collect(),
            changed: false,
        })
    }

    pub fn try_left(&self) -> Option<Self> {
        let (prev, prevs) = self.prevs.pop()?;
        Some(Self {
            prevs,
            focus: prev.clone(),
            nexts: self.nexts.push(self.focus.clone()),
            ..self.clone()
        })
    }

    pub fn try_right(&self) -> Option<Self> {
        let (next, nexts) = self.nexts.pop()?;
        Some(Self {
            prevs: self.prevs.push(self.focus.clone()),
            focus: next.clone(),
            nexts,
            ..self.clone()
        })
    }

    pub fn try_move(&self, direction: Direction) -> Option<Self> {
        match direction {
            Direction::Up => self.try_up(),
            Direction::Down => self.try_down(),
            Direction::Left => self.try_left(),
            Direction::Right => self.try_right(),
        }
    }

    pub fn move_to(&self, direction: Direction) -> Result<Self> {
        self.try_move(direction)
            .ok_or_else(|| NavigationError::for_direction(direction))
    }

    pub fn up(&self) -> Result<Self> {
        self.move_to(Direction::Up)
    }

    pub fn down(&self) -> Result<Self> {
        self.move_to(Direction::Down)
    }

    pub fn left(&self) -> Result<Self> {
        self.move_to(Direction::Left)
    }

    pub fn right(&self) -> Result<Self> {
        self.move_to(Direction::Right)
    }

    // ========================================================================
    // Derived moves
    // ========================================================================

    fn repeat(&self, direction: Direction) -> Self {
        let mut current = self.clone();
        while let Some(next) = current.try_move(direction) {
            current = next;
        }
        current
    }

    pub fn top(&self) -> Self {
        self.repeat(Direction::Up)
    }

    pub fn leftmost(&self) -> Self {
        self.repeat(Direction::Left)
    }

    pub fn rightmost(&self) -> Self {
        self.repeat(Direction::Right)
    }

    /// Rebuilds the whole tree with every edit applied.
    ///
    /// Subtrees that were not edited are the original nodes.
    pub fn zip(&self) -> T {
        tracing::trace!("Zipper::zip");
        self.top().focus()
    }

    // ========================================================================
    // Paths
    // ========================================================================

    /// The `Down`/`Right` steps leading from the root to the focus.
    pub fn get_path(&self) -> Vec<Direction> {
        if self.path.is_empty() {
            return Vec::new();
        }
        let mut indices: Vec<usize> = Vec::new();
        indices.push(self.prevs.iter().count());
        indices.extend(self.path.iter().map(|step| step.prevs.iter().count()));
        // The bottom step holds the root's (empty) sibling list.
        indices.pop();
        indices.reverse();

        let mut path = Vec::new();
        for index in indices {
            path.push(Direction::Down);
            path.extend(core::iter::repeat_n(Direction::Right, index));
        }
        path
    }

    pub fn follow(&self, path: &[Direction]) -> Result<Self> {
        let mut current = self.clone();
        for (index, &direction) in path.iter().enumerate() {
            current = current
                .try_move(direction)
                .ok_or_else(|| NavigationError::invalid_path(index, direction))?;
        }
        Ok(current)
    }

    pub fn try_follow(&self, path: &[Direction]) -> Option<Self> {
        self.follow(path).ok()
    }
}
