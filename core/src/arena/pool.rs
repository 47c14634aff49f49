//! Per-thread pool of region allocations shared by every arena.
//!
//! Each traversal builds its own arenas, so without a pool every call would
//! start from an empty allocator state. When an arena is dropped its regions
//! are emptied and parked here as raw allocations, keyed only by their
//! layout; the next arena on the same thread (for any element type with a
//! compatible size and alignment) picks them up again.
//!
//! The pool needs `thread_local!`, so it only exists with the `std` feature.
//! Without it, renting allocates and returning frees.

use core::mem;
use core::ops::{Deref, DerefMut};

use crate::Vec;

/// Regions kept per thread; anything returned past this is freed.
#[cfg(any(feature = "std", test))]
const MAX_POOLED: usize = 32;

#[cfg(any(feature = "std", test))]
mod shared {
    use core::alloc::Layout;
    use core::cell::RefCell;
    use core::mem::{self, ManuallyDrop};
    use core::ptr::NonNull;

    use crate::Vec;

    /// An empty buffer that used to back a `Vec`.
    struct RawRegion {
        ptr: NonNull<u8>,
        layout: Layout,
    }

    impl Drop for RawRegion {
        fn drop(&mut self) {
            // SAFETY: `ptr` was allocated by the global allocator with `layout`
            // and nothing else owns it.
            unsafe { alloc::alloc::dealloc(self.ptr.as_ptr(), self.layout) }
        }
    }

    std::thread_local! {
        static POOL: RefCell<Vec<RawRegion>> = const { RefCell::new(Vec::new()) };
    }

    pub(super) fn take<T>(min_len: usize) -> Option<Vec<T>> {
        let size = mem::size_of::<T>();
        if size == 0 {
            return None;
        }
        let align = mem::align_of::<T>();
        let raw = POOL
            .try_with(|pool| {
                let mut pool = pool.try_borrow_mut().ok()?;
                let index = pool.iter().rposition(|raw| {
                    raw.layout.align() == align
                        && raw.layout.size() % size == 0
                        && raw.layout.size() / size >= min_len
                })?;
                Some(pool.swap_remove(index))
            })
            .ok()
            .flatten()?;

        let raw = ManuallyDrop::new(raw);
        let capacity = raw.layout.size() / size;
        // SAFETY: the buffer came from the global allocator with size
        // `capacity * size_of::<T>()` and the alignment of `T`, which is exactly
        // the layout a `Vec<T>` of that capacity deallocates with. It holds no
        // initialized elements.
        Some(unsafe { Vec::from_raw_parts(raw.ptr.as_ptr().cast::<T>(), 0, capacity) })
    }

    pub(super) fn put<T>(mut region: Vec<T>) {
        region.clear();
        if mem::size_of::<T>() == 0 || region.capacity() == 0 {
            return;
        }
        let Ok(layout) = Layout::array::<T>(region.capacity()) else {
            return;
        };
        let mut region = ManuallyDrop::new(region);
        let Some(ptr) = NonNull::new(region.as_mut_ptr().cast::<u8>()) else {
            return;
        };
        let raw = RawRegion { ptr, layout };

        // If the pool is full, busy or already torn down, `raw` is dropped
        // here and frees the buffer.
        let _ = POOL.try_with(move |pool| {
            if let Ok(mut pool) = pool.try_borrow_mut() {
                if pool.len() < super::MAX_POOLED {
                    pool.push(raw);
                }
            }
        });
    }

    #[cfg(test)]
    pub(super) fn pooled() -> usize {
        POOL.with(|pool| pool.borrow().len())
    }
}

/// An empty `Vec` with room for at least `min_len` elements.
///
/// Reuses a pooled buffer when one fits, otherwise allocates `fresh`
/// elements (or `min_len`, if larger).
pub(crate) fn rent<T>(min_len: usize, fresh: usize) -> Vec<T> {
    #[cfg(any(feature = "std", test))]
    {
        if let Some(region) = shared::take(min_len) {
            return region;
        }
    }
    let capacity = fresh.max(min_len);
    tracing::trace!(capacity, "arena pool: new region");
    Vec::with_capacity(capacity)
}

/// Drops the contents of `region` and keeps its buffer for later.
pub(crate) fn give_back<T>(region: Vec<T>) {
    #[cfg(any(feature = "std", test))]
    shared::put(region);
    #[cfg(not(any(feature = "std", test)))]
    drop(region);
}

/// Number of buffers parked in this thread's pool.
#[cfg(test)]
pub(crate) fn pooled_regions() -> usize {
    shared::pooled()
}

/// A `Vec` rented from the pool and given back when dropped.
pub(crate) struct Scratch<T>(Vec<T>);

impl<T> Scratch<T> {
    pub(crate) fn new() -> Self {
        Self(rent(0, 0))
    }
}

impl<T> Deref for Scratch<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.0
    }
}

impl<T> DerefMut for Scratch<T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.0
    }
}

impl<T> Drop for Scratch<T> {
    fn drop(&mut self) {
        give_back(mem::take(&mut self.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returned_buffer_is_reused() {
        let mut region: Vec<u64> = rent(8, 8);
        region.extend(0..8);
        let ptr = region.as_ptr() as usize;
        give_back(region);
        assert_eq!(pooled_regions(), 1);

        let again: Vec<u64> = rent(4, 4);
        assert_eq!(again.as_ptr() as usize, ptr);
        assert!(again.is_empty());
        assert_eq!(again.capacity(), 8);
        assert_eq!(pooled_regions(), 0);
    }

    #[test]
    fn test_buffers_are_shared_across_compatible_types() {
        let region: Vec<u64> = rent(4, 4);
        give_back(region);
        let as_floats: Vec<f64> = rent(4, 4);
        assert_eq!(as_floats.capacity(), 4);
        assert_eq!(pooled_regions(), 0);

        // Different alignment: not reused.
        give_back(as_floats);
        let bytes: Vec<u8> = rent(1, 1);
        assert_eq!(pooled_regions(), 1);
        drop(bytes);
    }

    #[test]
    fn test_too_small_buffer_is_not_rented() {
        give_back(Vec::<u32>::with_capacity(2));
        let region: Vec<u32> = rent(16, 16);
        assert!(region.capacity() >= 16);
        assert_eq!(pooled_regions(), 1);
    }

    #[test]
    fn test_pool_is_bounded() {
        for _ in 0..MAX_POOLED + 8 {
            give_back(Vec::<u16>::with_capacity(4));
        }
        assert_eq!(pooled_regions(), MAX_POOLED);
    }

    #[test]
    fn test_scratch_returns_its_buffer() {
        {
            let mut scratch: Scratch<i64> = Scratch::new();
            scratch.extend([1, 2, 3]);
            assert_eq!(scratch.len(), 3);
        }
        assert_eq!(pooled_regions(), 1);
    }
}
