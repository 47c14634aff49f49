//! Navigation errors for [`Cursor`](crate::Cursor) and [`Zipper`](crate::Zipper).
//!
//! Contract violations (a node reporting a child count it cannot honour, a
//! chunk freed out of order) are bugs and panic; only navigation, which
//! routinely fails at the edges of a tree, reports errors as values.

use thiserror::Error;

use crate::Box;
use crate::direction::Direction;

/// Result type for navigation operations.
pub type Result<T> = core::result::Result<T, NavigationError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("cannot move up: the focus is the root")]
    AtRoot,

    #[error("cannot move down: the focus has no children")]
    NoChildren,

    #[error("cannot move left: the focus is the leftmost sibling")]
    NoLeftSibling,

    #[error("cannot move right: the focus is the rightmost sibling")]
    NoRightSibling,

    #[error("path step {index} ({direction}) could not be followed")]
    InvalidPath {
        index: usize,
        direction: Direction,
        source: Box<NavigationError>,
    },
}

impl NavigationError {
    /// The error a single failed move in `direction` produces.
    pub fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Up => NavigationError::AtRoot,
            Direction::Down => NavigationError::NoChildren,
            Direction::Left => NavigationError::NoLeftSibling,
            Direction::Right => NavigationError::NoRightSibling,
        }
    }

    pub(crate) fn invalid_path(index: usize, direction: Direction) -> Self {
        NavigationError::InvalidPath {
            index,
            direction,
            source: Box::new(Self::for_direction(direction)),
        }
    }
}
