use std::alloc::{Layout, alloc, dealloc};
use std::ptr::{self, NonNull};

use pool_allocator::{Pool, PoolAllocator};
use stack_pool::StackPool;

/// A [`PoolMemory`] backed by the LIFO arena strategy.
///
/// Growth resizes the allocation in place, which only works while the vector's
/// block is still the top of its arena. This backend is therefore meant for a
/// single outermost container per pool; interleaving other allocations from the
/// same arena makes the next reallocation panic.
pub type StackMemory<T> = PoolMemory<T, StackPool<T>>;

/// Raw storage provider for a [`FlexVec`][crate::FlexVec].
///
/// A backend owns at most one buffer and knows nothing about element liveness:
/// the vector constructs and destroys elements in the storage the backend hands
/// back.
///
/// # Safety
///
/// Implementations must guarantee that after `realloc(live, new_capacity)`:
///
/// * [`data()`][Self::data] addresses storage valid for `new_capacity` items
///   (it may only be `None` when `new_capacity` is zero);
/// * the first `live` items occupy the start of that storage with their exact
///   previous bit patterns (moved, not copied: any previous buffer's bytes are
///   dead and will not be read or dropped);
/// * a freshly constructed (`Default`) backend returns `None` from `data()`.
pub unsafe trait Memory<T>: Default {
    /// Address of the owned storage, if any has been acquired yet.
    fn data(&self) -> Option<NonNull<T>>;

    /// Replaces the backing storage with storage for `new_capacity` items,
    /// carrying the first `live` items over.
    ///
    /// # Panics
    ///
    /// Panics when the request cannot be satisfied; no backend reports
    /// recoverable allocation errors. `live` must not exceed `new_capacity`.
    fn realloc(&mut self, live: usize, new_capacity: usize);
}

/// The default backend: a plain heap buffer.
///
/// `realloc` allocates a fresh buffer, moves the live elements across and
/// releases the old buffer.
#[derive(Debug)]
pub struct HeapMemory<T> {
    /// The owned buffer. `None` exactly when `capacity` is zero.
    data: Option<NonNull<T>>,

    /// Items the buffer was allocated for, required again on release.
    capacity: usize,
}

impl<T> Default for HeapMemory<T> {
    fn default() -> Self {
        Self {
            data: None,
            capacity: 0,
        }
    }
}

// SAFETY: The contract is upheld: a fresh buffer of `new_capacity` items is
// allocated, the first `live` items are moved across bitwise and the old buffer
// is released without touching its (now dead) contents.
unsafe impl<T> Memory<T> for HeapMemory<T> {
    fn data(&self) -> Option<NonNull<T>> {
        self.data
    }

    fn realloc(&mut self, live: usize, new_capacity: usize) {
        assert!(size_of::<T>() > 0, "HeapMemory must have non-zero item size");
        assert!(
            live <= new_capacity,
            "cannot carry {live} live items into storage for {new_capacity}"
        );

        let new_data = if new_capacity == 0 {
            None
        } else {
            let layout = Layout::array::<T>(new_capacity)
                .expect("buffer layout cannot overflow for reasonable capacity values");

            // SAFETY: The layout is non-zero-sized: the item size and capacity are
            // both non-zero here.
            let raw = NonNull::new(unsafe { alloc(layout) }).expect(
                "we do not intend to handle allocation failure as a real possibility - OOM results in panic",
            );

            Some(raw.cast::<T>())
        };

        if let Some(old) = self.data {
            if let Some(new) = new_data {
                if live > 0 {
                    // SAFETY: Distinct allocations; the old buffer holds `live`
                    // initialized items (caller contract) and the new one has room
                    // for them. The old copies are dead from here on.
                    unsafe {
                        ptr::copy_nonoverlapping(old.as_ptr(), new.as_ptr(), live);
                    }
                }
            }

            let old_layout = Layout::array::<T>(self.capacity)
                .expect("the old buffer was allocated with this layout");

            // SAFETY: Allocated in a previous realloc() with this exact layout.
            unsafe {
                dealloc(old.as_ptr().cast(), old_layout);
            }
        }

        self.data = new_data;
        self.capacity = new_capacity;
    }
}

impl<T> Drop for HeapMemory<T> {
    fn drop(&mut self) {
        if let Some(data) = self.data {
            let layout = Layout::array::<T>(self.capacity)
                .expect("the buffer was allocated with this layout");

            // SAFETY: Allocated in realloc() with this exact layout; element
            // destruction is the vector's responsibility and already happened.
            unsafe {
                dealloc(data.as_ptr().cast(), layout);
            }
        }
    }
}

// SAFETY: The backend owns its buffer exclusively; all access goes through
// &self/&mut self and moving it moves the owned memory with it.
unsafe impl<T: Send> Send for HeapMemory<T> {}

// SAFETY: Shared access only exposes the storage address; no interior
// mutability is involved.
unsafe impl<T: Sync> Sync for HeapMemory<T> {}

/// A backend that draws its storage from a pool behind a [`PoolAllocator`].
///
/// `realloc` delegates to the pool's reallocation, which for a stack pool
/// resizes the block in place — and panics if the block is no longer the top of
/// its arena. See [`StackMemory`] for the usage restriction this implies.
///
/// The backend owns its allocator (and through it the pool), so the storage
/// lives exactly as long as the backend.
#[derive(Debug)]
pub struct PoolMemory<T, P: Pool<T>> {
    allocator: PoolAllocator<T, P>,

    /// The current allocation, if storage has been acquired yet.
    data: Option<NonNull<T>>,
}

impl<T, P: Pool<T>> PoolMemory<T, P> {
    /// Creates a backend around an already configured pool.
    #[must_use]
    pub fn with_pool(pool: P) -> Self {
        Self {
            allocator: PoolAllocator::with_pool(pool),
            data: None,
        }
    }
}

impl<T, P: Pool<T>> Default for PoolMemory<T, P> {
    fn default() -> Self {
        Self {
            allocator: PoolAllocator::new(),
            data: None,
        }
    }
}

// SAFETY: The pool resizes the allocation in place (the payload address never
// changes), so the first `live` items trivially remain at the start of the
// storage. The pool is owned by this backend, keeping the storage alive.
unsafe impl<T, P: Pool<T>> Memory<T> for PoolMemory<T, P> {
    fn data(&self) -> Option<NonNull<T>> {
        self.data
    }

    fn realloc(&mut self, live: usize, new_capacity: usize) {
        assert!(
            live <= new_capacity,
            "cannot carry {live} live items into storage for {new_capacity}"
        );

        self.data = Some(self.allocator.reallocate(self.data, new_capacity));
    }
}

// SAFETY: The backend owns the allocator, the pool and thereby the storage;
// moving it moves everything with it.
unsafe impl<T: Send, P: Pool<T> + Send> Send for PoolMemory<T, P> {}

#[cfg(test)]
#[allow(
    clippy::undocumented_unsafe_blocks,
    reason = "test code doesn't need the same safety rigor as production code"
)]
mod tests {
    use new_zealand::nz;

    use super::*;

    #[test]
    fn heap_realloc_preserves_live_items() {
        let mut memory = HeapMemory::<u64>::default();
        assert!(memory.data().is_none());

        memory.realloc(0, 4);
        let data = memory.data().expect("storage was just acquired");
        for index in 0..4 {
            unsafe {
                data.add(index).write(index as u64);
            }
        }

        memory.realloc(4, 16);
        let data = memory.data().expect("storage is still held");
        for index in 0..4 {
            unsafe {
                assert_eq!(data.add(index).read(), index as u64);
            }
        }
    }

    #[test]
    fn heap_realloc_to_zero_releases_storage() {
        let mut memory = HeapMemory::<u64>::default();

        memory.realloc(0, 8);
        assert!(memory.data().is_some());

        memory.realloc(0, 0);
        assert!(memory.data().is_none());
    }

    #[test]
    fn stack_realloc_is_in_place() {
        let mut memory = StackMemory::<u64>::default();

        memory.realloc(0, 8);
        let first = memory.data().expect("storage was just acquired");

        unsafe {
            first.write(99);
        }

        memory.realloc(8, 32);
        let second = memory.data().expect("storage is still held");

        assert_eq!(first, second);
        unsafe {
            assert_eq!(second.read(), 99);
        }
    }

    #[test]
    fn pool_memory_accepts_a_configured_pool() {
        let pool = StackPool::<u64>::builder().arena_capacity(nz!(16)).build();
        let mut memory = StackMemory::with_pool(pool);

        memory.realloc(0, 16);
        assert!(memory.data().is_some());
    }

    #[test]
    #[should_panic]
    fn heap_rejects_zero_sized_items() {
        let mut memory = HeapMemory::<()>::default();

        memory.realloc(0, 8);
    }
}
