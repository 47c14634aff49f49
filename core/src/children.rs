//! A child container specialised for the common small arities.
//!
//! Most tree nodes have zero, one or two children. `Children` stores those
//! cases inline and only falls back to a `Vec` for the `Many` case, so code
//! that hands a node's children around does not touch the allocator for
//! leaves, unary and binary nodes.

use crate::Vec;
use crate::vec;
use core::fmt;
use core::ops::Index;

/// The shape of a [`Children`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberOfChildren {
    None,
    One,
    Two,
    Many,
}

impl fmt::Display for NumberOfChildren {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberOfChildren::None => write!(f, "no"),
            NumberOfChildren::One => write!(f, "one"),
            NumberOfChildren::Two => write!(f, "two"),
            NumberOfChildren::Many => write!(f, "many"),
        }
    }
}

/// An immutable sequence of child nodes, tagged by arity.
///
/// `Many` is normally only built for three or more elements, but a `Many`
/// holding fewer is legal and every operation in this crate accepts it.
///
/// # Example
///
/// ```
/// use sawmill_core::{Children, NumberOfChildren};
///
/// let kids = Children::one('a').add('b');
/// assert_eq!(kids.number_of_children(), NumberOfChildren::Two);
/// assert_eq!(*kids.second(), 'b');
///
/// let kids = kids.add('c');
/// assert_eq!(kids.number_of_children(), NumberOfChildren::Many);
/// assert_eq!(kids.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Children<T> {
    None,
    One(T),
    Two(T, T),
    Many(Vec<T>),
}

impl<T> Default for Children<T> {
    fn default() -> Self {
        Children::None
    }
}

impl<T> Children<T> {
    pub fn none() -> Self {
        Children::None
    }

    pub fn one(child: T) -> Self {
        Children::One(child)
    }

    pub fn two(first: T, second: T) -> Self {
        Children::Two(first, second)
    }

    /// Wraps `children` as `Many` without normalising the tag.
    pub fn many(children: Vec<T>) -> Self {
        Children::Many(children)
    }

    pub fn number_of_children(&self) -> NumberOfChildren {
        match self {
            Children::None => NumberOfChildren::None,
            Children::One(_) => NumberOfChildren::One,
            Children::Two(_, _) => NumberOfChildren::Two,
            Children::Many(_) => NumberOfChildren::Many,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Children::None => 0,
            Children::One(_) => 1,
            Children::Two(_, _) => 2,
            Children::Many(children) => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first child of a `One` or `Two`.
    ///
    /// # Panics
    ///
    /// On `None` and `Many`; use [`Children::get`] for arity-agnostic access.
    pub fn first(&self) -> &T {
        match self {
            Children::One(first) | Children::Two(first, _) => first,
            other => invalid_state("first", other.number_of_children()),
        }
    }

    /// The second child of a `Two`.
    ///
    /// # Panics
    ///
    /// On every other tag.
    pub fn second(&self) -> &T {
        match self {
            Children::Two(_, second) => second,
            other => invalid_state("second", other.number_of_children()),
        }
    }

    /// The elements of a `Many`.
    ///
    /// # Panics
    ///
    /// On every other tag.
    pub fn many_children(&self) -> &[T] {
        match self {
            Children::Many(children) => children,
            other => invalid_state("many_children", other.number_of_children()),
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        match (self, index) {
            (Children::One(first), 0) | (Children::Two(first, _), 0) => Some(first),
            (Children::Two(_, second), 1) => Some(second),
            (Children::Many(children), i) => children.get(i),
            _ => None,
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        match self {
            Children::None => Iter::Small([None, None].into_iter()),
            Children::One(a) => Iter::Small([Some(a), None].into_iter()),
            Children::Two(a, b) => Iter::Small([Some(a), Some(b)].into_iter()),
            Children::Many(children) => Iter::Many(children.iter()),
        }
    }

    /// Borrows every child, keeping the tag.
    pub fn as_ref(&self) -> Children<&T> {
        match self {
            Children::None => Children::None,
            Children::One(a) => Children::One(a),
            Children::Two(a, b) => Children::Two(a, b),
            Children::Many(children) => Children::Many(children.iter().collect()),
        }
    }

    /// Applies `f` to every child, preserving the tag exactly.
    ///
    /// A `Many` of two elements stays a `Many`; zip-folding relies on mapped
    /// children lining up with the originals.
    pub fn map<U, F>(self, mut f: F) -> Children<U>
    where
        F: FnMut(T) -> U,
    {
        match self {
            Children::None => Children::None,
            Children::One(a) => Children::One(f(a)),
            Children::Two(a, b) => {
                let a = f(a);
                Children::Two(a, f(b))
            }
            Children::Many(children) => Children::Many(children.into_iter().map(f).collect()),
        }
    }

    /// Pairs children positionally, stopping at the shorter side.
    ///
    /// The result uses the smallest tag that fits the number of pairs.
    pub fn zip<U>(self, other: Children<U>) -> Children<(T, U)> {
        match (self, other) {
            (Children::None, _) | (_, Children::None) => Children::None,
            (Children::One(a), Children::One(b))
            | (Children::One(a), Children::Two(b, _))
            | (Children::Two(a, _), Children::One(b)) => Children::One((a, b)),
            (Children::Two(a1, a2), Children::Two(b1, b2)) => Children::Two((a1, b1), (a2, b2)),
            (left, right) => left.into_iter().zip(right).collect(),
        }
    }

    /// Appends `child`, promoting to `Many` past two elements.
    pub fn add(self, child: T) -> Self {
        match self {
            Children::None => Children::One(child),
            Children::One(a) => Children::Two(a, child),
            Children::Two(a, b) => Children::Many(vec![a, b, child]),
            Children::Many(mut children) => {
                children.push(child);
                Children::Many(children)
            }
        }
    }

    /// Inserts `child` at `index`.
    ///
    /// # Panics
    ///
    /// If `index > len`.
    pub fn insert(self, index: usize, child: T) -> Self {
        let len = self.len();
        assert!(index <= len, "insertion index {index} out of range for {len} children");
        match (self, index) {
            (Children::None, _) => Children::One(child),
            (Children::One(a), 0) => Children::Two(child, a),
            (Children::One(a), _) => Children::Two(a, child),
            (Children::Two(a, b), 0) => Children::Many(vec![child, a, b]),
            (Children::Two(a, b), 1) => Children::Many(vec![a, child, b]),
            (Children::Two(a, b), _) => Children::Many(vec![a, b, child]),
            (Children::Many(mut children), i) => {
                children.insert(i, child);
                Children::Many(children)
            }
        }
    }

    /// Removes the child at `index`, shrinking to the smallest tag.
    ///
    /// # Panics
    ///
    /// If `index >= len`.
    pub fn remove_at(self, index: usize) -> Self {
        let len = self.len();
        assert!(index < len, "removal index {index} out of range for {len} children");
        match (self, index) {
            (Children::One(_), _) => Children::None,
            (Children::Two(_, b), 0) => Children::One(b),
            (Children::Two(a, _), _) => Children::One(a),
            (Children::Many(mut children), i) => {
                children.remove(i);
                Children::from(children)
            }
            (Children::None, _) => unreachable!("empty children have no valid index"),
        }
    }

    /// Replaces the child at `index`, keeping the tag.
    ///
    /// # Panics
    ///
    /// If `index >= len`.
    pub fn set_item(self, index: usize, child: T) -> Self {
        let len = self.len();
        assert!(index < len, "index {index} out of range for {len} children");
        match (self, index) {
            (Children::One(_), _) => Children::One(child),
            (Children::Two(_, b), 0) => Children::Two(child, b),
            (Children::Two(a, _), _) => Children::Two(a, child),
            (Children::Many(mut children), i) => {
                children[i] = child;
                Children::Many(children)
            }
            (Children::None, _) => unreachable!("empty children have no valid index"),
        }
    }

    /// Drops every child matching `pred`, shrinking to the smallest tag.
    pub fn remove_all<F>(self, mut pred: F) -> Self
    where
        F: FnMut(&T) -> bool,
    {
        match self {
            Children::None => Children::None,
            Children::One(a) if pred(&a) => Children::None,
            Children::One(a) => Children::One(a),
            Children::Two(a, b) => match (pred(&a), pred(&b)) {
                (true, true) => Children::None,
                (true, false) => Children::One(b),
                (false, true) => Children::One(a),
                (false, false) => Children::Two(a, b),
            },
            Children::Many(mut children) => {
                children.retain(|child| !pred(child));
                Children::from(children)
            }
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

#[cold]
#[track_caller]
fn invalid_state(accessor: &str, shape: NumberOfChildren) -> ! {
    panic!("Children::{accessor} is not available on a value with {shape} children")
}

impl<T> Index<usize> for Children<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(child) => child,
            None => panic!("index {index} out of range for {} children", self.len()),
        }
    }
}

/// Normalises to the smallest tag.
impl<T> From<Vec<T>> for Children<T> {
    fn from(mut children: Vec<T>) -> Self {
        match children.len() {
            0 => Children::None,
            1 => Children::One(children.remove(0)),
            2 => {
                let second = children.remove(1);
                Children::Two(children.remove(0), second)
            }
            _ => Children::Many(children),
        }
    }
}

/// Normalises to the smallest tag.
impl<T> FromIterator<T> for Children<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut iter = iter.into_iter();
        let Some(a) = iter.next() else {
            return Children::None;
        };
        let Some(b) = iter.next() else {
            return Children::One(a);
        };
        let Some(c) = iter.next() else {
            return Children::Two(a, b);
        };
        let mut children = Vec::with_capacity(3 + iter.size_hint().0);
        children.extend([a, b, c]);
        children.extend(iter);
        Children::Many(children)
    }
}

// ============================================================================
// Iterators
// ============================================================================

/// Borrowing iterator over [`Children`].
pub enum Iter<'a, T> {
    Small(core::array::IntoIter<Option<&'a T>, 2>),
    Many(core::slice::Iter<'a, T>),
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        match self {
            Iter::Small(inner) => inner.next().flatten(),
            Iter::Many(inner) => inner.next(),
        }
    }
}

/// Owning iterator over [`Children`].
pub enum IntoIter<T> {
    Small(core::array::IntoIter<Option<T>, 2>),
    Many(alloc::vec::IntoIter<T>),
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self {
            IntoIter::Small(inner) => inner.next().flatten(),
            IntoIter::Many(inner) => inner.next(),
        }
    }
}

impl<T> IntoIterator for Children<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        match self {
            Children::None => IntoIter::Small([None, None].into_iter()),
            Children::One(a) => IntoIter::Small([Some(a), None].into_iter()),
            Children::Two(a, b) => IntoIter::Small([Some(a), Some(b)].into_iter()),
            Children::Many(children) => IntoIter::Many(children.into_iter()),
        }
    }
}

impl<'a, T> IntoIterator for &'a Children<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arity_matches_tag() {
        assert_eq!(Children::<i32>::none().len(), 0);
        assert_eq!(Children::one(1).len(), 1);
        assert_eq!(Children::two(1, 2).len(), 2);
        assert_eq!(Children::many(vec![1, 2, 3]).len(), 3);
        assert_eq!(Children::two(1, 2).number_of_children(), NumberOfChildren::Two);
    }

    #[test]
    fn test_first_and_second() {
        assert_eq!(*Children::one('a').first(), 'a');
        let two = Children::two('a', 'b');
        assert_eq!(*two.first(), 'a');
        assert_eq!(*two.second(), 'b');
    }

    #[test]
    #[should_panic(expected = "Children::second is not available on a value with one children")]
    fn test_second_on_one_panics() {
        let _ = Children::one(1).second();
    }

    #[test]
    #[should_panic(expected = "Children::first is not available")]
    fn test_first_on_many_panics() {
        let _ = Children::many(vec![1, 2, 3]).first();
    }

    #[test]
    #[should_panic(expected = "Children::many_children is not available")]
    fn test_many_children_on_two_panics() {
        let _ = Children::two(1, 2).many_children();
    }

    #[test]
    fn test_add_promotes_to_many() {
        let children = Children::none().add(1).add(2).add(3).add(4);
        assert_eq!(children, Children::Many(vec![1, 2, 3, 4]));
    }

    #[test]
    fn test_insert_at_every_position() {
        assert_eq!(Children::one(2).insert(0, 1), Children::two(1, 2));
        assert_eq!(Children::one(1).insert(1, 2), Children::two(1, 2));
        assert_eq!(Children::two(1, 3).insert(1, 2), Children::many(vec![1, 2, 3]));
        assert_eq!(Children::two(2, 3).insert(0, 1), Children::many(vec![1, 2, 3]));
        assert_eq!(
            Children::many(vec![1, 2, 4]).insert(2, 3),
            Children::many(vec![1, 2, 3, 4])
        );
    }

    #[test]
    fn test_remove_at_shrinks() {
        assert_eq!(Children::two(1, 2).remove_at(0), Children::one(2));
        assert_eq!(Children::many(vec![1, 2, 3]).remove_at(1), Children::two(1, 3));
        assert_eq!(Children::one(1).remove_at(0), Children::none());
    }

    #[test]
    fn test_set_item_keeps_tag() {
        assert_eq!(Children::two(1, 2).set_item(1, 5), Children::two(1, 5));
        assert_eq!(Children::many(vec![1, 2]).set_item(0, 9), Children::many(vec![9, 2]));
    }

    #[test]
    fn test_remove_all_tests_both_elements_of_two() {
        assert_eq!(Children::two(1, 2).remove_all(|x| *x == 2), Children::one(1));
        assert_eq!(Children::two(1, 2).remove_all(|x| *x == 1), Children::one(2));
        assert_eq!(Children::two(1, 2).remove_all(|_| true), Children::none());
        assert_eq!(Children::two(1, 2).remove_all(|_| false), Children::two(1, 2));
        assert_eq!(
            Children::many(vec![1, 2, 3, 4]).remove_all(|x| x % 2 == 0),
            Children::two(1, 3)
        );
    }

    #[test]
    fn test_map_preserves_tag_exactly() {
        assert_eq!(Children::<i32>::none().map(|x| x * 2), Children::none());
        assert_eq!(Children::one(1).map(|x| x * 2), Children::one(2));
        assert_eq!(Children::many(vec![1, 2]).map(|x| x * 2), Children::many(vec![2, 4]));
    }

    #[test]
    fn test_zip_truncates_to_shorter_side() {
        assert_eq!(Children::one(1).zip(Children::two('a', 'b')), Children::one((1, 'a')));
        assert_eq!(Children::two(1, 2).zip(Children::one('a')), Children::one((1, 'a')));
        assert_eq!(Children::<i32>::none().zip(Children::many(vec!['a', 'b', 'c'])), Children::none());
        assert_eq!(
            Children::many(vec![1, 2, 3]).zip(Children::two('a', 'b')),
            Children::two((1, 'a'), (2, 'b'))
        );
        assert_eq!(
            Children::many(vec![1, 2, 3, 4]).zip(Children::many(vec!['a', 'b', 'c'])),
            Children::many(vec![(1, 'a'), (2, 'b'), (3, 'c')])
        );
    }

    #[test]
    fn test_iteration_follows_tag() {
        assert_eq!(Children::two(1, 2).iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(Children::many(vec![1, 2, 3]).into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(Children::<i32>::none().iter().count(), 0);
    }

    #[test]
    fn test_collect_normalises() {
        assert_eq!((0..0).collect::<Children<i32>>(), Children::none());
        assert_eq!((0..2).collect::<Children<i32>>(), Children::two(0, 1));
        assert_eq!((0..3).collect::<Children<i32>>(), Children::many(vec![0, 1, 2]));
        assert_eq!(Children::from(vec![7]), Children::one(7));
    }

    #[test]
    fn test_short_many_is_tolerated() {
        let children = Children::many(vec![1]);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0], 1);
        assert_eq!(children.get(1), None);
    }
}
