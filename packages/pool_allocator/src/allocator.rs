use std::marker::PhantomData;
use std::ptr::NonNull;

use page_pool::PagePool;
use stack_pool::StackPool;

use crate::{Pool, PoolEntry};

/// A [`PoolAllocator`] backed by the LIFO arena strategy.
pub type StackAllocator<T> = PoolAllocator<T, StackPool<T>>;

/// A [`PoolAllocator`] backed by the bitmap slot strategy.
pub type PageAllocator<T> = PoolAllocator<T, PagePool<T>>;

/// The uniform allocation facade: owns a [`Pool`] and exposes a single
/// `allocate` / `deallocate` / `reallocate` contract regardless of the
/// strategy behind it.
///
/// Containers hold a `PoolAllocator` and stay oblivious to which pool backs
/// them; swapping [`StackPool`] for [`PagePool`] changes only the type
/// parameter.
///
/// # Example
///
/// ```rust
/// use pool_allocator::{Pool, PoolAllocator, StackAllocator};
///
/// fn write_and_release<P: Pool<u64>>(allocator: &mut PoolAllocator<u64, P>) {
///     let block = allocator.allocate(1);
///
///     unsafe {
///         block.write(7);
///         assert_eq!(block.read(), 7);
///     }
///
///     allocator.deallocate(block, 1);
/// }
///
/// write_and_release(&mut StackAllocator::new());
/// ```
pub struct PoolAllocator<T, P: Pool<T>> {
    pool: P,

    _items: PhantomData<fn(T) -> T>,
}

impl<T, P: Pool<T>> PoolAllocator<T, P> {
    /// Creates an allocator with a freshly constructed pool.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized (pools reject zero-sized items).
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: P::default(),
            _items: PhantomData,
        }
    }

    /// Creates an allocator around an already configured pool.
    ///
    /// # Example
    ///
    /// ```rust
    /// use new_zealand::nz;
    /// use pool_allocator::PoolAllocator;
    /// use stack_pool::StackPool;
    ///
    /// let pool = StackPool::<u64>::builder().arena_capacity(nz!(64)).build();
    /// let mut allocator = PoolAllocator::with_pool(pool);
    ///
    /// let block = allocator.allocate(8);
    /// allocator.deallocate(block, 8);
    /// ```
    #[must_use]
    pub fn with_pool(pool: P) -> Self {
        Self {
            pool,
            _items: PhantomData,
        }
    }

    /// The pool backing this allocator.
    #[must_use]
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Claims storage for `amount` items from an entry with room, growing the
    /// pool when necessary. The storage is uninitialized.
    ///
    /// # Panics
    ///
    /// Panics if `amount` exceeds the fixed capacity of a single pool entry, or
    /// on a strategy-specific amount restriction (page slots hold one item).
    #[must_use]
    pub fn allocate(&mut self, amount: usize) -> NonNull<T> {
        self.pool.free_entry(amount).allocate(amount)
    }

    /// Releases `amount` items of storage at `ptr`.
    ///
    /// # Panics
    ///
    /// Panics if no pool entry owns the range or on strategy contract
    /// violations (non-top stack blocks, unallocated page slots).
    pub fn deallocate(&mut self, ptr: NonNull<T>, amount: usize) {
        self.pool.find_entry(ptr, amount).deallocate(ptr);
    }

    /// Resizes the storage at `ptr` to `new_amount` items. A `None` pointer
    /// behaves as a plain allocation.
    ///
    /// # Panics
    ///
    /// Panics on strategy contract violations: a stack pool only resizes the
    /// most recent allocation of its active arena and only within the arena's
    /// remaining space; a page pool only accepts an amount of one.
    #[must_use]
    pub fn reallocate(&mut self, ptr: Option<NonNull<T>>, new_amount: usize) -> NonNull<T> {
        match ptr {
            None => self.allocate(new_amount),
            Some(ptr) => self.pool.find_entry(ptr, 0).reallocate(ptr, new_amount),
        }
    }
}

impl<T, P: Pool<T>> Default for PoolAllocator<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: Pool<T>> std::fmt::Debug for PoolAllocator<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolAllocator")
            .field(
                "item_type",
                &std::format_args!("{}", std::any::type_name::<T>()),
            )
            .field(
                "pool_type",
                &std::format_args!("{}", std::any::type_name::<P>()),
            )
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::undocumented_unsafe_blocks,
    reason = "test code doesn't need the same safety rigor as production code"
)]
mod tests {
    use super::*;

    #[test]
    fn reallocate_without_pointer_allocates() {
        let mut allocator = StackAllocator::<u64>::new();

        let block = allocator.reallocate(None, 4);

        unsafe {
            block.write(1);
        }

        allocator.deallocate(block, 4);
    }

    #[test]
    fn stack_reallocate_keeps_the_address() {
        let mut allocator = StackAllocator::<u64>::new();

        let block = allocator.allocate(2);
        let resized = allocator.reallocate(Some(block), 8);

        assert_eq!(block, resized);

        allocator.deallocate(resized, 8);
    }

    #[test]
    fn page_reallocate_to_one_item_is_identity() {
        let mut allocator = PageAllocator::<u64>::new();

        let slot = allocator.allocate(1);
        let resized = allocator.reallocate(Some(slot), 1);

        assert_eq!(slot, resized);

        allocator.deallocate(resized, 1);
    }

    #[test]
    #[should_panic]
    fn page_multi_item_allocation_panics() {
        let mut allocator = PageAllocator::<u64>::new();

        _ = allocator.allocate(2);
    }

    #[test]
    #[should_panic]
    fn page_reallocate_beyond_slot_panics() {
        let mut allocator = PageAllocator::<u64>::new();

        let slot = allocator.allocate(1);

        _ = allocator.reallocate(Some(slot), 2);
    }
}
