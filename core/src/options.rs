//! Configuration options for the traversal arenas.

/// Default number of elements in one arena region.
pub const DEFAULT_REGION_SIZE: usize = 512;

/// Sizing options for [`ChunkStack`](crate::ChunkStack) and
/// [`PooledQueue`](crate::PooledQueue).
///
/// # Example
///
/// ```
/// use sawmill_core::{ArenaOptions, ChunkStack};
///
/// let options = ArenaOptions { region_size: 64 };
/// let stack: ChunkStack<u32> = ChunkStack::with_options(&options);
/// assert_eq!(stack.region_size(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaOptions {
    /// Capacity of a regular region, in elements.
    ///
    /// Allocations larger than this get a dedicated region of their own.
    ///
    /// Default: 512
    pub region_size: usize,
}

impl Default for ArenaOptions {
    fn default() -> Self {
        Self {
            region_size: DEFAULT_REGION_SIZE,
        }
    }
}
