use smallvec::SmallVec;

use crate::Vec;
use crate::options::ArenaOptions;

use super::{ChildSink, FIRST_REGION, fill_exact, pool};

/// Handle to a chunk allocated from a [`ChunkStack`].
///
/// Handles are deliberately not `Clone`: each one is freed exactly once.
#[derive(Debug)]
#[must_use = "chunks must be returned to their ChunkStack with `free`"]
pub struct Chunk {
    depth: usize,
    region: usize,
    start: usize,
    len: usize,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A LIFO arena of contiguous chunks.
///
/// Chunks are carved from regions of `region_size` elements. A chunk never
/// straddles two regions: when the current region cannot hold a request, the
/// stack moves on to a fresh region (rented from its spare list, then from
/// the thread's pool). Requests larger than `region_size` get a dedicated
/// region. The first region is small, so shallow traversals stay cheap.
/// Dropping the stack, also during unwinding, hands every region back to
/// the pool.
///
/// Chunks must be freed in reverse allocation order; anything else is a bug
/// in the caller and panics.
///
/// # Example
///
/// ```
/// use sawmill_core::ChunkStack;
///
/// let mut stack = ChunkStack::new();
/// let outer = stack.alloc_with(2, |sink| sink.extend(["a", "b"]));
/// let inner = stack.alloc_with(1, |sink| sink.push("c"));
/// assert_eq!(stack.slice(&outer), &["a", "b"]);
/// stack.free(inner);
/// stack.free(outer);
/// ```
pub struct ChunkStack<T> {
    regions: SmallVec<[Vec<T>; 4]>,
    spare: SmallVec<[Vec<T>; 2]>,
    region_size: usize,
    live: usize,
}

impl<T> Default for ChunkStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ChunkStack<T> {
    pub fn new() -> Self {
        Self::with_options(&ArenaOptions::default())
    }

    pub fn with_options(options: &ArenaOptions) -> Self {
        assert!(options.region_size > 0, "arena regions must hold at least one element");
        Self {
            regions: SmallVec::new(),
            spare: SmallVec::new(),
            region_size: options.region_size,
            live: 0,
        }
    }

    pub fn region_size(&self) -> usize {
        self.region_size
    }

    /// Number of chunks allocated and not yet freed.
    pub fn live_chunks(&self) -> usize {
        self.live
    }

    /// Number of regions currently holding (or ready to hold) chunks.
    pub fn regions_in_use(&self) -> usize {
        self.regions.len()
    }

    /// Allocates a chunk of `len` elements written by `fill`.
    ///
    /// # Panics
    ///
    /// If `fill` writes a number of elements other than `len`.
    pub fn alloc_with<F>(&mut self, len: usize, fill: F) -> Chunk
    where
        F: FnOnce(&mut ChildSink<'_, T>),
    {
        let depth = self.live;
        if len == 0 {
            let mut nothing = Vec::new();
            fill_exact(&mut nothing, 0, fill);
            self.live += 1;
            return Chunk {
                depth,
                region: self.regions.len(),
                start: 0,
                len: 0,
            };
        }

        let fits = self
            .regions
            .last()
            .is_some_and(|region| region.capacity() - region.len() >= len);
        if !fits {
            let region = self.rent(len);
            self.regions.push(region);
        }

        let region = self.regions.len() - 1;
        let start = fill_exact(&mut self.regions[region], len, fill);
        self.live += 1;
        Chunk {
            depth,
            region,
            start,
            len,
        }
    }

    pub fn slice(&self, chunk: &Chunk) -> &[T] {
        if chunk.len == 0 {
            return &[];
        }
        &self.regions[chunk.region][chunk.start..chunk.start + chunk.len]
    }

    pub fn slice_mut(&mut self, chunk: &Chunk) -> &mut [T] {
        if chunk.len == 0 {
            return &mut [];
        }
        &mut self.regions[chunk.region][chunk.start..chunk.start + chunk.len]
    }

    /// Returns `chunk` to the stack, dropping its elements.
    ///
    /// # Panics
    ///
    /// If `chunk` is not the most recently allocated live chunk.
    pub fn free(&mut self, chunk: Chunk) {
        if chunk.depth + 1 != self.live {
            panic!(
                "ChunkStack: chunk freed out of order (chunk #{} freed while {} chunks are live)",
                chunk.depth, self.live
            );
        }
        self.live -= 1;
        if chunk.len == 0 {
            return;
        }

        let region = &mut self.regions[chunk.region];
        debug_assert_eq!(
            region.len(),
            chunk.start + chunk.len,
            "ChunkStack: region top does not match the chunk being freed"
        );
        region.truncate(chunk.start);

        if region.is_empty() && self.regions.len() > 1 {
            if let Some(emptied) = self.regions.pop() {
                self.spare.push(emptied);
            }
        }
    }

    fn rent(&mut self, len: usize) -> Vec<T> {
        if let Some(index) = self.spare.iter().rposition(|region| region.capacity() >= len) {
            return self.spare.swap_remove(index);
        }
        let fresh = if self.regions.is_empty() {
            self.region_size.min(FIRST_REGION)
        } else {
            self.region_size
        };
        tracing::trace!(len, regions = self.regions.len(), "ChunkStack: renting region");
        pool::rent(len, fresh)
    }
}

impl<T> Drop for ChunkStack<T> {
    fn drop(&mut self) {
        for region in self.regions.drain(..).chain(self.spare.drain(..)) {
            pool::give_back(region);
        }
    }
}
