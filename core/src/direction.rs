//! Single-step moves through a tree.

use core::fmt;

/// One step of navigation, as recorded by
/// [`Cursor::get_path`](crate::Cursor::get_path).
///
/// A path from the root is a sequence of `Down` and `Right` steps: `Down`
/// enters the first child, `Right` moves to the next sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The move that undoes this one, as far as position is concerned.
    ///
    /// `Down` is undone by `Up`, but `Up` followed by `Down` lands on the
    /// first child, not necessarily where the cursor started.
    pub fn reverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}
