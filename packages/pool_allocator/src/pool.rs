use std::ptr::NonNull;

use page_pool::{Page, PagePool};
use stack_pool::{Arena, StackPool};

/// A single storage unit of a pool: one arena or one page.
///
/// An entry hands out raw, uninitialized memory. The amounts passed to
/// [`allocate()`][Self::allocate] and [`reallocate()`][Self::reallocate] are in
/// items; what amounts an entry accepts is strategy-specific (arenas take any
/// amount that fits, page slots hold exactly one item).
pub trait PoolEntry<T> {
    /// Claims storage for `amount` items and returns its address.
    ///
    /// # Panics
    ///
    /// Panics if the entry cannot satisfy the request; callers must select an
    /// entry with room via [`Pool::free_entry()`].
    fn allocate(&mut self, amount: usize) -> NonNull<T>;

    /// Releases the storage at `ptr`.
    ///
    /// # Panics
    ///
    /// Panics on strategy contract violations, e.g. a stack arena rejects any
    /// block that is not its most recent allocation.
    fn deallocate(&mut self, ptr: NonNull<T>);

    /// Resizes the storage at `ptr` to `new_amount` items, returning the
    /// (unchanged) payload address.
    ///
    /// # Panics
    ///
    /// Panics on strategy contract violations: a stack arena rejects non-top
    /// blocks and blocks that would not fit resized; a page rejects any amount
    /// other than one, because slots are fixed-size.
    fn reallocate(&mut self, ptr: NonNull<T>, new_amount: usize) -> NonNull<T>;
}

/// An allocation strategy usable behind a
/// [`PoolAllocator`][crate::PoolAllocator]: a growable collection of
/// [`PoolEntry`] units plus the two lookups the facade dispatches through.
pub trait Pool<T>: Default {
    /// The storage unit this strategy is built from.
    type Entry: PoolEntry<T>;

    /// Returns an entry with room for `amount` items, growing the pool when
    /// necessary.
    ///
    /// # Panics
    ///
    /// Panics if `amount` exceeds the fixed capacity of a single entry.
    fn free_entry(&mut self, amount: usize) -> &mut Self::Entry;

    /// Returns the entry whose buffer contains `amount` items starting at
    /// `ptr`.
    ///
    /// # Panics
    ///
    /// Panics if no entry of this pool owns the range, or on strategy-specific
    /// ordering violations (a stack pool only ever yields its active arena).
    fn find_entry(&mut self, ptr: NonNull<T>, amount: usize) -> &mut Self::Entry;
}

impl<T> PoolEntry<T> for Arena<T> {
    fn allocate(&mut self, amount: usize) -> NonNull<T> {
        Self::allocate(self, amount)
    }

    fn deallocate(&mut self, ptr: NonNull<T>) {
        Self::deallocate(self, ptr);
    }

    fn reallocate(&mut self, ptr: NonNull<T>, new_amount: usize) -> NonNull<T> {
        Self::reallocate(self, ptr, new_amount)
    }
}

impl<T> Pool<T> for StackPool<T> {
    type Entry = Arena<T>;

    fn free_entry(&mut self, amount: usize) -> &mut Self::Entry {
        self.get_free_arena(amount)
    }

    fn find_entry(&mut self, ptr: NonNull<T>, amount: usize) -> &mut Self::Entry {
        self.find_arena(ptr, amount)
    }
}

impl<T> PoolEntry<T> for Page<T> {
    fn allocate(&mut self, amount: usize) -> NonNull<T> {
        assert!(
            amount == 1,
            "page slots hold exactly one item, cannot allocate {amount}"
        );

        Self::allocate(self)
    }

    fn deallocate(&mut self, ptr: NonNull<T>) {
        Self::deallocate(self, ptr);
    }

    fn reallocate(&mut self, ptr: NonNull<T>, new_amount: usize) -> NonNull<T> {
        // Slots are fixed-size: resizing to one item changes nothing, any other
        // amount is unsatisfiable.
        assert!(
            new_amount == 1,
            "page slots hold exactly one item, cannot reallocate to {new_amount}"
        );

        ptr
    }
}

impl<T> Pool<T> for PagePool<T> {
    type Entry = Page<T>;

    fn free_entry(&mut self, amount: usize) -> &mut Self::Entry {
        self.get_free_page(amount)
    }

    fn find_entry(&mut self, ptr: NonNull<T>, amount: usize) -> &mut Self::Entry {
        self.find_page(ptr, amount)
    }
}
