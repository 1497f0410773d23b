use std::alloc::{Layout, alloc, dealloc};
use std::marker::PhantomData;
use std::num::NonZero;
use std::ptr::NonNull;

/// Bits per bitmap word.
const WORD_BITS: usize = u64::BITS as usize;

/// A fixed-size buffer subdivided into uniform single-item slots, with one
/// bitmap bit per slot.
///
/// Bit *i* set means slot *i* is occupied; `free_count` always equals the number
/// of clear bits covering real slots. Slots are found first-fit: the scan takes
/// the first clear bit of the first word that is not fully occupied.
///
/// Pages are created and owned by a [`PagePool`][crate::PagePool]; they are
/// exposed so callers can operate on the page a pool lookup returned.
#[derive(Debug)]
pub struct Page<T> {
    /// Start of the owned slot buffer.
    buffer: NonNull<T>,

    /// Layout the buffer was allocated with, required again on release.
    buffer_layout: Layout,

    /// One bit per slot; set means occupied. Bits at positions past `capacity`
    /// (the tail of the last word) are permanently set so a first-fit scan can
    /// never select them.
    bitmap: Box<[u64]>,

    /// Number of clear bits covering real slots. Kept in lockstep with the
    /// bitmap by every mutation.
    free_count: usize,

    /// Number of slots in the buffer.
    capacity: NonZero<usize>,

    _items: PhantomData<T>,
}

impl<T> Page<T> {
    /// Creates a page with storage and bitmap for `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized or if the buffer cannot be allocated.
    #[must_use]
    pub(crate) fn new(capacity: NonZero<usize>) -> Self {
        assert!(size_of::<T>() > 0, "Page must have non-zero item size");

        let buffer_layout = Layout::array::<T>(capacity.get())
            .expect("page buffer layout cannot overflow for reasonable capacity values");

        // SAFETY: The layout is non-zero-sized because the item size and capacity
        // are both non-zero, which is validated above.
        let buffer = NonNull::new(unsafe { alloc(buffer_layout) }).expect(
            "we do not intend to handle allocation failure as a real possibility - OOM results in panic",
        ).cast::<T>();

        let words = capacity.get().div_ceil(WORD_BITS);
        let mut bitmap = vec![0_u64; words].into_boxed_slice();

        // Mark the tail bits of the last word as permanently occupied.
        let used_in_last = capacity.get() % WORD_BITS;
        if used_in_last != 0 {
            let last = bitmap
                .last_mut()
                .expect("a non-zero capacity always produces at least one bitmap word");
            *last = !((1_u64 << used_in_last).wrapping_sub(1));
        }

        Self {
            buffer,
            buffer_layout,
            bitmap,
            free_count: capacity.get(),
            capacity,
            _items: PhantomData,
        }
    }

    /// Number of slots in this page.
    #[must_use]
    pub fn capacity(&self) -> NonZero<usize> {
        self.capacity
    }

    /// Number of slots currently free.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn free_count(&self) -> usize {
        self.free_count
    }

    /// Whether at least one slot is free.
    #[must_use]
    pub fn has_space(&self) -> bool {
        self.free_count > 0
    }

    /// Whether `amount` items starting at `ptr` lie entirely within this page's
    /// buffer.
    #[must_use]
    pub(crate) fn contains(&self, ptr: NonNull<T>, amount: usize) -> bool {
        let start = ptr.addr().get();

        let Some(span) = amount.checked_mul(size_of::<T>()) else {
            return false;
        };
        let Some(needed_end) = start.checked_add(span) else {
            return false;
        };

        let buffer_end = self
            .buffer
            .addr()
            .get()
            .checked_add(self.buffer_layout.size())
            .expect("buffer end was valid at allocation time");

        start >= self.buffer.addr().get() && needed_end <= buffer_end
    }

    /// Claims the first free slot and returns its address. The slot is
    /// uninitialized.
    ///
    /// # Panics
    ///
    /// Panics if no bitmap word has a clear bit. Callers must check
    /// [`free_count()`][Self::free_count] (or go through
    /// [`PagePool::get_free_page()`][crate::PagePool::get_free_page]) first; a
    /// non-zero count combined with this panic means the bitmap and the counter
    /// diverged.
    #[must_use]
    pub fn allocate(&mut self) -> NonNull<T> {
        let found = self.bitmap.iter().enumerate().find_map(|(index, word)| {
            if *word == u64::MAX {
                return None;
            }

            // First clear bit of this word, counting from slot order.
            Some((index, (!*word).trailing_zeros() as usize))
        });

        let Some((word_index, bit)) = found else {
            panic!(
                "no clear bitmap bit in page ({} free slots recorded)",
                self.free_count
            );
        };

        *self
            .bitmap
            .get_mut(word_index)
            .expect("index was just produced by a scan over the bitmap") |= 1_u64 << bit;

        self.free_count = self
            .free_count
            .checked_sub(1)
            .expect("free-slot counter and bitmap diverged: counter was zero with a clear bit present");

        // Cannot overflow: the tail bits of the last word are permanently set, so
        // the selected slot is always below capacity.
        let slot = word_index.wrapping_mul(WORD_BITS).wrapping_add(bit);

        #[cfg(debug_assertions)]
        self.integrity_check();

        // SAFETY: slot < capacity per the tail-bit invariant, so the address stays
        // within the buffer.
        unsafe { self.buffer.add(slot) }
    }

    /// Releases the slot at `ptr`, making it available to future allocations.
    ///
    /// # Panics
    ///
    /// Panics if `ptr` does not address a slot of this page or if that slot is
    /// not currently allocated.
    pub fn deallocate(&mut self, ptr: NonNull<T>) {
        let offset_bytes = ptr
            .addr()
            .get()
            .checked_sub(self.buffer.addr().get())
            .unwrap_or_else(|| panic!("pointer {ptr:?} does not belong to this page"));

        assert!(
            offset_bytes % size_of::<T>() == 0,
            "pointer {ptr:?} is not aligned to a slot boundary"
        );

        let slot = offset_bytes / size_of::<T>();

        assert!(
            slot < self.capacity.get(),
            "slot {slot} is out of bounds in a page of {} slots",
            self.capacity.get()
        );

        let word = self
            .bitmap
            .get_mut(slot / WORD_BITS)
            .expect("a slot below capacity always has a bitmap word");
        let mask = 1_u64 << (slot % WORD_BITS);

        assert!(
            *word & mask != 0,
            "deallocate of slot {slot} which is not currently allocated"
        );

        *word &= !mask;

        // Cannot overflow: a set bit was just cleared, so at least one slot was
        // previously occupied.
        self.free_count = self.free_count.wrapping_add(1);

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    /// Verifies that the free-slot counter matches the bitmap.
    ///
    /// Only compiled in debug builds; invoked after every mutation.
    #[cfg(debug_assertions)]
    fn integrity_check(&self) {
        // Tail bits are permanently set, so their complements never count.
        let observed_free: usize = self
            .bitmap
            .iter()
            .map(|word| (!word).count_ones() as usize)
            .sum();

        assert!(
            observed_free == self.free_count,
            "free-slot counter {} does not match the {} clear bitmap bits in a page of {} slots",
            self.free_count,
            observed_free,
            self.capacity.get(),
        );
    }
}

impl<T> Drop for Page<T> {
    fn drop(&mut self) {
        // SAFETY: The buffer was allocated in new() with this exact layout and has
        // not been released yet.
        unsafe {
            dealloc(self.buffer.as_ptr().cast(), self.buffer_layout);
        }
    }
}

// SAFETY: The page owns its buffer exclusively and shares no pointers with other
// threads; all access goes through &self/&mut self. Moving it to another thread
// moves the owned memory with it.
unsafe impl<T: Send> Send for Page<T> {}

#[cfg(test)]
#[allow(
    clippy::undocumented_unsafe_blocks,
    reason = "test code doesn't need the same safety rigor as production code"
)]
mod tests {
    use new_zealand::nz;

    use super::*;

    #[test]
    fn slots_are_handed_out_first_fit() {
        let mut page = Page::<u64>::new(nz!(8));

        let first = page.allocate();
        let second = page.allocate();

        // Slots 0 and 1, in that order.
        assert_eq!(
            second.addr().get() - first.addr().get(),
            size_of::<u64>()
        );
    }

    #[test]
    fn freed_slot_is_reused_before_later_slots() {
        let mut page = Page::<u64>::new(nz!(8));

        let a = page.allocate();
        let b = page.allocate();
        let _c = page.allocate();

        page.deallocate(b);

        // Slot 1 is the first clear bit again, so the next allocation takes it.
        let reused = page.allocate();
        assert_eq!(reused, b);
        assert_ne!(reused, a);
    }

    #[test]
    fn free_count_tracks_every_transition() {
        let mut page = Page::<u32>::new(nz!(70));

        assert_eq!(page.free_count(), 70);

        let mut slots = Vec::new();
        for expected in (0..70).rev() {
            slots.push(page.allocate());
            assert_eq!(page.free_count(), expected);
        }
        assert!(!page.has_space());

        for (index, slot) in slots.drain(..).enumerate() {
            page.deallocate(slot);
            assert_eq!(page.free_count(), index + 1);
        }
    }

    #[test]
    fn any_order_deallocation_is_permitted() {
        let mut page = Page::<u64>::new(nz!(16));

        let a = page.allocate();
        let b = page.allocate();
        let c = page.allocate();

        page.deallocate(a);
        page.deallocate(c);
        page.deallocate(b);

        assert_eq!(page.free_count(), 16);
    }

    #[test]
    fn slot_values_survive_neighboring_churn() {
        let mut page = Page::<u64>::new(nz!(4));

        let keeper = page.allocate();
        let churn = page.allocate();

        unsafe {
            keeper.write(0xFEED);
            churn.write(0xC0DE);
        }

        page.deallocate(churn);
        let replacement = page.allocate();
        unsafe {
            replacement.write(0xBEEF);

            assert_eq!(keeper.read(), 0xFEED);
        }
    }

    #[test]
    #[should_panic]
    fn exhausted_page_panics_on_allocate() {
        let mut page = Page::<u64>::new(nz!(2));

        _ = page.allocate();
        _ = page.allocate();
        _ = page.allocate();
    }

    #[test]
    #[should_panic]
    fn double_free_panics() {
        let mut page = Page::<u64>::new(nz!(4));

        let slot = page.allocate();

        page.deallocate(slot);
        page.deallocate(slot);
    }

    #[test]
    #[should_panic]
    fn foreign_pointer_panics() {
        let mut page = Page::<u64>::new(nz!(4));

        page.deallocate(NonNull::dangling());
    }

    #[test]
    #[should_panic]
    fn zero_sized_items_are_rejected() {
        drop(Page::<()>::new(nz!(8)));
    }

    #[test]
    fn non_word_multiple_capacity_is_respected() {
        // 70 slots: one full word plus 6 bits; the 58 tail bits must never be
        // handed out.
        let mut page = Page::<u8>::new(nz!(70));

        let mut slots = Vec::new();
        for _ in 0..70 {
            slots.push(page.allocate());
        }

        assert!(!page.has_space());

        let base = slots.first().copied().expect("filled above").addr().get();
        for (index, slot) in slots.iter().enumerate() {
            assert_eq!(slot.addr().get() - base, index);
        }
    }
}
