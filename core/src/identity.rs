//! Reference identity for node handles.
//!
//! Rewrites avoid rebuilding a parent when none of its children changed.
//! "Changed" means "is not the very same node", which for shared handles is
//! a pointer comparison, never a structural one.

use alloc::rc::Rc;
#[cfg(target_has_atomic = "ptr")]
use alloc::sync::Arc;

/// Cheap "is this the same node?" test.
///
/// Implemented for `Rc`, `Arc` and shared references by address. Node types
/// with another representation (interned ids, small `Copy` values) implement
/// it with whatever equality is O(1) for them.
pub trait Identity {
    /// Returns `true` if `self` and `other` denote the same node.
    fn is_same(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Identity for Rc<T> {
    #[inline]
    fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

#[cfg(target_has_atomic = "ptr")]
impl<T: ?Sized> Identity for Arc<T> {
    #[inline]
    fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Identity for &T {
    #[inline]
    fn is_same(&self, other: &Self) -> bool {
        core::ptr::eq(*self, *other)
    }
}
