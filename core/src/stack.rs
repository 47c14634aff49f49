//! A persistent cons-list stack.
//!
//! Pushing returns a new stack that shares its tail with the old one, so a
//! zipper can keep every earlier version of its sibling lists alive at the
//! cost of one allocation per push.

use crate::Rc;

pub(crate) struct Stack<T> {
    head: Option<Rc<Cell<T>>>,
}

struct Cell<T> {
    value: T,
    next: Stack<T>,
}

impl<T> Clone for Stack<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
        }
    }
}

impl<T> Stack<T> {
    pub(crate) fn new() -> Self {
        Self { head: None }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub(crate) fn push(&self, value: T) -> Self {
        Self {
            head: Some(Rc::new(Cell {
                value,
                next: self.clone(),
            })),
        }
    }

    /// The top value and the stack beneath it.
    pub(crate) fn pop(&self) -> Option<(&T, Stack<T>)> {
        self.head.as_deref().map(|cell| (&cell.value, cell.next.clone()))
    }

    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
        }
    }
}

impl<T> FromIterator<T> for Stack<T> {
    /// Builds a stack whose top is the *last* item yielded.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().fold(Stack::new(), |stack, value| stack.push(value))
    }
}

impl<T> Drop for Stack<T> {
    // Unlink uniquely owned cells one at a time; the derived drop would
    // recurse once per cell.
    fn drop(&mut self) {
        let mut head = self.head.take();
        while let Some(cell) = head {
            match Rc::try_unwrap(cell) {
                Ok(mut cell) => head = cell.next.head.take(),
                Err(_) => break,
            }
        }
    }
}

pub(crate) struct Iter<'a, T> {
    next: Option<&'a Cell<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let cell = self.next?;
        self.next = cell.next.head.as_deref();
        Some(&cell.value)
    }
}
