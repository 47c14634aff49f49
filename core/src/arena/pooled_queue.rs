use alloc::collections::VecDeque;

use crate::Vec;
use crate::options::ArenaOptions;

use super::{ChildSink, FIRST_REGION, fill_exact, pool};

/// A FIFO queue whose storage is a chain of fixed-capacity regions.
///
/// Items are enqueued in batches (one batch per node's children) and
/// dequeued one at a time. A batch always lands in a single region; when the
/// back region is full a new one is rented from the spare list or the
/// thread's pool. Regions drained from the front go back to the spare list,
/// and all of them go back to the pool when the queue is dropped.
pub struct PooledQueue<T> {
    regions: VecDeque<VecDeque<T>>,
    spare: Vec<VecDeque<T>>,
    scratch: Vec<T>,
    region_size: usize,
    len: usize,
}

impl<T> Default for PooledQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PooledQueue<T> {
    pub fn new() -> Self {
        Self::with_options(&ArenaOptions::default())
    }

    pub fn with_options(options: &ArenaOptions) -> Self {
        assert!(options.region_size > 0, "arena regions must hold at least one element");
        Self {
            regions: VecDeque::new(),
            spare: Vec::new(),
            scratch: Vec::new(),
            region_size: options.region_size,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn enqueue(&mut self, item: T) {
        self.enqueue_with(1, |sink| sink.push(item));
    }

    /// Appends a batch of exactly `len` items written by `fill`.
    ///
    /// # Panics
    ///
    /// If `fill` writes a number of items other than `len`.
    pub fn enqueue_with<F>(&mut self, len: usize, fill: F) -> usize
    where
        F: FnOnce(&mut ChildSink<'_, T>),
    {
        self.scratch.clear();
        if self.scratch.capacity() < len {
            pool::give_back(core::mem::take(&mut self.scratch));
            self.scratch = pool::rent(len, FIRST_REGION);
        }
        fill_exact(&mut self.scratch, len, fill);
        if len == 0 {
            return 0;
        }

        let fits = self
            .regions
            .back()
            .is_some_and(|region| region.capacity() - region.len() >= len);
        if !fits {
            // Only the sole region of an empty queue can be empty; it must not
            // sit in front of the new one.
            if self.regions.back().is_some_and(|region| region.is_empty()) {
                if let Some(empty) = self.regions.pop_back() {
                    self.spare.push(empty);
                }
            }
            let region = self.rent(len);
            self.regions.push_back(region);
        }
        if let Some(back) = self.regions.back_mut() {
            back.extend(self.scratch.drain(..));
        }
        self.len += len;
        len
    }

    pub fn dequeue(&mut self) -> Option<T> {
        let front = self.regions.front_mut()?;
        let item = front.pop_front()?;
        self.len -= 1;
        if front.is_empty() && self.regions.len() > 1 {
            if let Some(drained) = self.regions.pop_front() {
                self.spare.push(drained);
            }
        }
        Some(item)
    }

    fn rent(&mut self, len: usize) -> VecDeque<T> {
        if let Some(index) = self.spare.iter().rposition(|region| region.capacity() >= len) {
            return self.spare.swap_remove(index);
        }
        let fresh = if self.regions.is_empty() {
            self.region_size.min(FIRST_REGION)
        } else {
            self.region_size
        };
        tracing::trace!(len, regions = self.regions.len(), "PooledQueue: renting region");
        VecDeque::from(pool::rent(len, fresh))
    }
}

impl<T> Drop for PooledQueue<T> {
    fn drop(&mut self) {
        for region in self.regions.drain(..).chain(self.spare.drain(..)) {
            pool::give_back(Vec::from(region));
        }
        pool::give_back(core::mem::take(&mut self.scratch));
    }
}
