use std::num::NonZero;
use std::ptr::NonNull;

use crate::{Arena, StackPoolBuilder};

/// A growable collection of fixed-size [`Arena`] buffers under LIFO discipline.
///
/// One arena is *active* at any time: allocations are served from it, and only
/// blocks inside it may be deallocated or resized. When the active arena cannot
/// satisfy a request, a fresh arena is appended and becomes active. Arenas are
/// released only when the pool is dropped.
///
/// # Example
///
/// ```rust
/// use stack_pool::StackPool;
///
/// let mut pool = StackPool::<u32>::new();
///
/// let block = pool.get_free_arena(2).allocate(2);
/// pool.find_arena(block, 2).deallocate(block);
/// ```
///
/// # Resource usage
///
/// The pool never shrinks. Every arena it ever created stays alive until the
/// pool itself is dropped, so a burst of allocations keeps its high-water mark.
#[derive(Debug)]
pub struct StackPool<T> {
    /// The arenas providing the storage of the pool, in creation order.
    arenas: Vec<Arena<T>>,

    /// Index of the arena allocations are currently served from. Arenas before
    /// it are retired and never become active again.
    active: usize,

    /// Item capacity of every arena created by this pool.
    arena_capacity: NonZero<usize>,
}

impl<T> StackPool<T> {
    /// Creates a pool with the default configuration and its initial arena.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a new [`StackPool`].
    ///
    /// Use this when you want to customize the arena capacity beyond the default.
    ///
    /// # Example
    ///
    /// ```rust
    /// use new_zealand::nz;
    /// use stack_pool::StackPool;
    ///
    /// let pool = StackPool::<u64>::builder().arena_capacity(nz!(128)).build();
    ///
    /// assert_eq!(pool.arena_capacity().get(), 128);
    /// ```
    pub fn builder() -> StackPoolBuilder<T> {
        StackPoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(arena_capacity: NonZero<usize>) -> Self {
        Self {
            arenas: vec![Arena::new(arena_capacity)],
            active: 0,
            arena_capacity,
        }
    }

    /// Item capacity of each arena in this pool.
    #[must_use]
    pub fn arena_capacity(&self) -> NonZero<usize> {
        self.arena_capacity
    }

    /// Number of arenas the pool has created so far.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn arena_count(&self) -> usize {
        self.arenas.len()
    }

    /// Returns the arena the next allocation of `amount` items should be served
    /// from: the active arena if the block fits, otherwise a freshly appended
    /// arena which becomes the active one.
    ///
    /// # Panics
    ///
    /// Panics if `amount` exceeds the arena capacity; requests larger than one
    /// arena can never be satisfied by this pool.
    pub fn get_free_arena(&mut self, amount: usize) -> &mut Arena<T> {
        assert!(
            amount <= self.arena_capacity.get(),
            "requested {amount} items exceed the arena capacity of {}",
            self.arena_capacity.get()
        );

        let active_fits = self
            .arenas
            .get(self.active)
            .expect("active index always refers to an existing arena")
            .fits(amount);

        if !active_fits {
            self.arenas.push(Arena::new(self.arena_capacity));

            // Cannot overflow: that would imply more arenas than virtual memory.
            self.active = self.arenas.len().wrapping_sub(1);
        }

        self.arenas
            .get_mut(self.active)
            .expect("active index always refers to an existing arena")
    }

    /// Returns the arena whose buffer contains `amount` items starting at `ptr`.
    ///
    /// # Panics
    ///
    /// Panics if no arena of this pool contains the range, or if the owning arena
    /// is not the active one. Blocks in retired arenas were allocated before the
    /// active arena existed and can therefore never be the top of the stack.
    pub fn find_arena(&mut self, ptr: NonNull<T>, amount: usize) -> &mut Arena<T> {
        let index = self
            .arenas
            .iter()
            .position(|arena| arena.contains(ptr, amount))
            .unwrap_or_else(|| {
                panic!("pointer {ptr:?} does not belong to any arena in this pool")
            });

        assert!(
            index == self.active,
            "only blocks in the active arena may be deallocated or resized (found arena {index}, active is {})",
            self.active
        );

        self.arenas
            .get_mut(index)
            .expect("index was just produced by a scan over the arena list")
    }
}

impl<T> Default for StackPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(
    clippy::undocumented_unsafe_blocks,
    reason = "test code doesn't need the same safety rigor as production code"
)]
mod tests {
    use new_zealand::nz;

    use super::*;

    #[test]
    fn starts_with_one_arena() {
        let pool = StackPool::<u64>::new();

        assert_eq!(pool.arena_count(), 1);
    }

    #[test]
    fn spills_into_a_fresh_arena_when_full() {
        let mut pool = StackPool::<u64>::builder().arena_capacity(nz!(4)).build();

        // Keep allocating without freeing until the first arena runs out.
        for _ in 0..8 {
            _ = pool.get_free_arena(2).allocate(2);
        }

        assert!(pool.arena_count() >= 2);
    }

    #[test]
    fn found_arena_serves_the_top_block() {
        let mut pool = StackPool::<u32>::new();

        let block = pool.get_free_arena(4).allocate(4);

        pool.find_arena(block, 4).deallocate(block);

        // Cursor was rewound, so the same address comes back.
        let again = pool.get_free_arena(4).allocate(4);
        assert_eq!(block, again);
    }

    #[test]
    #[should_panic]
    fn oversized_request_panics() {
        let mut pool = StackPool::<u64>::builder().arena_capacity(nz!(16)).build();

        _ = pool.get_free_arena(17);
    }

    #[test]
    #[should_panic]
    fn unknown_pointer_panics() {
        let mut pool = StackPool::<u64>::new();

        _ = pool.find_arena(std::ptr::NonNull::dangling(), 1);
    }

    #[test]
    #[should_panic]
    fn pointer_in_retired_arena_is_rejected() {
        let mut pool = StackPool::<u64>::builder().arena_capacity(nz!(2)).build();

        let early = pool.get_free_arena(2).allocate(2);

        // Exhaust the first arena so the pool moves on to a new active one.
        for _ in 0..4 {
            _ = pool.get_free_arena(2).allocate(2);
        }
        assert!(pool.arena_count() >= 2);

        _ = pool.find_arena(early, 2);
    }

    #[test]
    fn pool_is_movable() {
        let mut pool = StackPool::<u64>::new();
        let block = pool.get_free_arena(1).allocate(1);

        unsafe {
            block.write(7);
        }

        let mut moved = pool;

        // The arena memory moved with the pool; the block address is unchanged.
        unsafe {
            assert_eq!(block.read(), 7);
        }
        moved.find_arena(block, 1).deallocate(block);
    }
}
