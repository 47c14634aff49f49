//! Pooled, stack-disciplined buffers for traversals.
//!
//! A recursive traversal needs a small temporary buffer per node to hold
//! that node's children. Allocating one `Vec` per node would dominate the
//! cost of a fold over a large tree, so traversals rent their buffers from
//! an arena instead:
//!
//! - [`ChunkStack`]: LIFO chunks, one per active recursion frame.
//! - [`PooledQueue`]: FIFO chunks, for breadth-first walks.
//!
//! Both carve chunks out of fixed-capacity regions (see
//! [`ArenaOptions`](crate::ArenaOptions)) and keep emptied regions for reuse.
//! Arenas are single-owner and not shared between threads. Dropping one
//! hands its regions to a per-thread pool (with the `std` feature), so the
//! next traversal on that thread starts with warm buffers and only allocates
//! when the tree gets deeper or wider than anything seen so far.

mod chunk_stack;
pub(crate) mod pool;
mod pooled_queue;

pub use chunk_stack::{Chunk, ChunkStack};
pub use pooled_queue::PooledQueue;

use smallvec::SmallVec;

use crate::Vec;

/// Capacity of the first region a fresh arena allocates.
pub(crate) const FIRST_REGION: usize = 16;

/// Children staged on the stack; nodes with more spill to the heap.
pub(crate) type InlineChildren<T> = SmallVec<[T; 4]>;

enum SinkBuf<'a, T> {
    Heap(&'a mut Vec<T>),
    Inline(&'a mut InlineChildren<T>),
}

/// Append-only view of a buffer being filled with a node's children.
///
/// [`Rewriter::get_children`](crate::Rewriter::get_children) receives one of
/// these; it can push children but never see or disturb what was already in
/// the underlying region.
pub struct ChildSink<'a, T> {
    buf: SinkBuf<'a, T>,
    start: usize,
}

impl<'a, T> ChildSink<'a, T> {
    /// Appends to `buf`, leaving its current contents alone.
    pub fn new(buf: &'a mut Vec<T>) -> Self {
        let start = buf.len();
        Self {
            buf: SinkBuf::Heap(buf),
            start,
        }
    }

    pub(crate) fn inline(buf: &'a mut InlineChildren<T>) -> Self {
        let start = buf.len();
        Self {
            buf: SinkBuf::Inline(buf),
            start,
        }
    }

    #[inline]
    pub fn push(&mut self, child: T) {
        match &mut self.buf {
            SinkBuf::Heap(buf) => buf.push(child),
            SinkBuf::Inline(buf) => buf.push(child),
        }
    }

    /// Number of children written so far.
    pub fn len(&self) -> usize {
        let len = match &self.buf {
            SinkBuf::Heap(buf) => buf.len(),
            SinkBuf::Inline(buf) => buf.len(),
        };
        len - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Extend<T> for ChildSink<'_, T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        match &mut self.buf {
            SinkBuf::Heap(buf) => buf.extend(iter),
            SinkBuf::Inline(buf) => buf.extend(iter),
        }
    }
}

/// Runs `fill` against `sink` and checks it appended exactly `expected` items.
///
/// Returns the index of the first appended item.
fn fill_sink<T, F>(mut sink: ChildSink<'_, T>, expected: usize, fill: F) -> usize
where
    F: FnOnce(&mut ChildSink<'_, T>),
{
    fill(&mut sink);
    let written = sink.len();
    if written != expected {
        crate::rewriter::child_count_violation(expected, written);
    }
    sink.start
}

pub(crate) fn fill_exact<T, F>(buf: &mut Vec<T>, expected: usize, fill: F) -> usize
where
    F: FnOnce(&mut ChildSink<'_, T>),
{
    fill_sink(ChildSink::new(buf), expected, fill)
}

/// [`fill_exact`] into a stack buffer.
pub(crate) fn fill_inline<T, F>(buf: &mut InlineChildren<T>, expected: usize, fill: F)
where
    F: FnOnce(&mut ChildSink<'_, T>),
{
    fill_sink(ChildSink::inline(buf), expected, fill);
}
