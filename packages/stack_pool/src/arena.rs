use std::alloc::{Layout, alloc, dealloc};
use std::marker::PhantomData;
use std::num::NonZero;
use std::ptr::NonNull;

/// Marker value recorded in every allocation header. Reading back anything else
/// means the buffer was overwritten past an allocation boundary.
const HEADER_SIGNATURE: usize = 0x2283_2997;

/// Bookkeeping stored immediately before each payload in an arena.
#[repr(C)]
#[derive(Debug)]
struct AllocationHeader {
    signature: usize,

    /// Payload size in bytes. Always a multiple of the element size.
    size: usize,
}

/// A fixed-size buffer managed under bump/LIFO discipline.
///
/// Blocks are carved off a write cursor in allocation order. Each block is an
/// [`AllocationHeader`] followed by payload storage for the requested number of
/// items, padded so that consecutive blocks stay aligned for both the header and
/// the element type.
///
/// Only the most recently allocated block may be deallocated or resized. The
/// arena validates this on every release and panics on violations instead of
/// corrupting its cursor.
///
/// Arenas are created and owned by a [`StackPool`][crate::StackPool]; they are
/// exposed so callers can operate on the arena a pool lookup returned.
#[derive(Debug)]
pub struct Arena<T> {
    /// Start of the owned buffer.
    begin: NonNull<u8>,

    /// One past the last usable byte of the buffer.
    end: NonNull<u8>,

    /// Next free byte. Always within `begin..=end` and aligned for a block start
    /// because every block stride is a multiple of the block alignment.
    cursor: NonNull<u8>,

    /// Layout the buffer was allocated with, required again on release.
    buffer_layout: Layout,

    _items: PhantomData<T>,
}

impl<T> Arena<T> {
    /// Creates an arena sized for the worst case of `capacity` single-item
    /// allocations, each carrying its own header.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized or if the buffer cannot be allocated.
    #[must_use]
    pub(crate) fn new(capacity: NonZero<usize>) -> Self {
        assert!(size_of::<T>() > 0, "Arena must have non-zero item size");

        let (single_item_block, _) = Self::block_layout(1);

        let total_size = single_item_block
            .size()
            .checked_mul(capacity.get())
            .expect("arena byte size calculation cannot overflow for reasonable capacity values");

        let buffer_layout = Layout::from_size_align(total_size, single_item_block.align())
            .expect("arena buffer layout must be calculable from a valid block layout");

        // SAFETY: The layout is non-zero-sized because the item size and capacity are
        // both non-zero, which is validated above.
        let begin = NonNull::new(unsafe { alloc(buffer_layout) }).expect(
            "we do not intend to handle allocation failure as a real possibility - OOM results in panic",
        );

        // SAFETY: `total_size` is the exact size of the allocation, so one-past-the-end
        // is a valid offset.
        let end = unsafe { begin.add(total_size) };

        Self {
            begin,
            end,
            cursor: begin,
            buffer_layout,
            _items: PhantomData,
        }
    }

    /// Layout of one block holding `amount` items, plus the byte offset from the
    /// block start to the payload. The offset does not depend on `amount`.
    #[must_use]
    fn block_layout(amount: usize) -> (Layout, usize) {
        let payload_layout =
            Layout::array::<T>(amount).expect("payload layout cannot overflow for valid requests");

        let (combined, payload_offset) = Layout::new::<AllocationHeader>()
            .extend(payload_layout)
            .expect("layout extension cannot fail for valid layouts with reasonable sizes");

        // Padding the size to the alignment keeps the next block's header aligned.
        (combined.pad_to_align(), payload_offset)
    }

    /// Whether a block of `amount` items fits in the remaining space.
    #[must_use]
    pub fn fits(&self, amount: usize) -> bool {
        let (block, _) = Self::block_layout(amount);

        // Cannot underflow: the cursor never moves past `end`.
        let remaining = self.end.addr().get().wrapping_sub(self.cursor.addr().get());

        block.size() <= remaining
    }

    /// Whether `amount` items starting at `ptr` lie entirely within this arena's
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

        start >= self.begin.addr().get() && needed_end <= self.end.addr().get()
    }

    /// Carves a block for `amount` items off the top of the arena and returns the
    /// payload address. The payload is uninitialized.
    ///
    /// # Panics
    ///
    /// Panics if the block does not fit in the remaining space. Callers must have
    /// selected an arena with room, e.g. via
    /// [`StackPool::get_free_arena()`][crate::StackPool::get_free_arena].
    #[must_use]
    pub fn allocate(&mut self, amount: usize) -> NonNull<T> {
        let (block, payload_offset) = Self::block_layout(amount);

        assert!(
            self.fits(amount),
            "allocation of {amount} items does not fit in the arena's remaining space"
        );

        let block_start = self.cursor;

        // Guarded against overflow by the layout calculation above.
        let payload_size = size_of::<T>().wrapping_mul(amount);

        // SAFETY: The cursor is aligned for a block start and fits() guarantees the
        // header lies within the buffer.
        unsafe {
            block_start.cast::<AllocationHeader>().write(AllocationHeader {
                signature: HEADER_SIGNATURE,
                size: payload_size,
            });
        }

        // SAFETY: The whole block fits before `end` per the fits() check, so both
        // offsets stay within the buffer.
        let payload = unsafe { block_start.add(payload_offset) }.cast::<T>();

        // SAFETY: As above; the block end is at most `end`.
        self.cursor = unsafe { block_start.add(block.size()) };

        payload
    }

    /// Returns the most recently allocated block and rewinds the cursor to where
    /// it was before that allocation.
    ///
    /// # Panics
    ///
    /// Panics if the header in front of `ptr` fails validation (buffer corruption)
    /// or if the block is not the current top of the arena.
    pub fn deallocate(&mut self, ptr: NonNull<T>) {
        let header = self.header_of(ptr);

        // SAFETY: header_of() validated the header; we have exclusive access.
        let payload_size = unsafe { header.as_ref() }.size;

        let (block_start, block_end) = self.block_bounds(ptr, payload_size);

        assert!(
            block_end == self.cursor,
            "only the most recently allocated block in an arena may be deallocated"
        );

        self.cursor = block_start;
    }

    /// Resizes the most recently allocated block in place, adjusting the cursor
    /// and the recorded payload size. The payload address does not change.
    ///
    /// # Panics
    ///
    /// Panics if the header fails validation, if the block is not the current top
    /// of the arena, or if the resized block would not fit before the arena's end.
    #[must_use]
    pub fn reallocate(&mut self, ptr: NonNull<T>, new_amount: usize) -> NonNull<T> {
        let header = self.header_of(ptr);

        // SAFETY: header_of() validated the header; we have exclusive access.
        let old_payload_size = unsafe { header.as_ref() }.size;

        let (block_start, block_end) = self.block_bounds(ptr, old_payload_size);

        assert!(
            block_end == self.cursor,
            "only the most recently allocated block in an arena may be resized"
        );

        let (new_block, _) = Self::block_layout(new_amount);

        let new_block_end = block_start
            .addr()
            .get()
            .checked_add(new_block.size())
            .expect("block end calculation cannot overflow for valid layouts");

        assert!(
            new_block_end <= self.end.addr().get(),
            "resized block of {new_amount} items does not fit before the arena's end"
        );

        // SAFETY: Guarded by the fit check above.
        self.cursor = unsafe { block_start.add(new_block.size()) };

        // SAFETY: header_of() validated the pointer; we hold &mut self, so no other
        // reference to the header exists.
        unsafe {
            (*header.as_ptr()).size = size_of::<T>().wrapping_mul(new_amount);
        }

        ptr
    }

    /// Whether no allocations are currently live in the arena.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursor == self.begin
    }

    /// Recovers and validates the header in front of a payload pointer.
    ///
    /// # Panics
    ///
    /// Panics on a signature mismatch or when the recorded size is not a multiple
    /// of the element size. Both indicate the buffer was corrupted.
    fn header_of(&self, ptr: NonNull<T>) -> NonNull<AllocationHeader> {
        let (_, payload_offset) = Self::block_layout(1);

        // SAFETY: Every payload handed out by allocate() sits `payload_offset` bytes
        // past its header within this buffer.
        let header = unsafe { ptr.cast::<u8>().sub(payload_offset) }.cast::<AllocationHeader>();

        // SAFETY: The header was written by allocate() and is not aliased while we
        // hold a reference to the arena.
        let header_ref = unsafe { header.as_ref() };

        assert!(
            header_ref.signature == HEADER_SIGNATURE,
            "allocation header signature mismatch ({:#x}) - the arena buffer was corrupted",
            header_ref.signature
        );
        assert!(
            header_ref.size % size_of::<T>() == 0,
            "allocation header records {} payload bytes, which is not a multiple of the element size",
            header_ref.size
        );

        header
    }

    /// Start and one-past-end of the block whose payload is at `ptr`.
    fn block_bounds(&self, ptr: NonNull<T>, payload_size: usize) -> (NonNull<u8>, NonNull<u8>) {
        // Guarded by the size-multiple assertion in header_of().
        let amount = payload_size / size_of::<T>();

        let (block, payload_offset) = Self::block_layout(amount);

        // SAFETY: The block start precedes the payload within the same buffer.
        let block_start = unsafe { ptr.cast::<u8>().sub(payload_offset) };

        // SAFETY: The block was carved out of the buffer by allocate(), so its end
        // is at most `end`.
        let block_end = unsafe { block_start.add(block.size()) };

        (block_start, block_end)
    }
}

impl<T> Drop for Arena<T> {
    fn drop(&mut self) {
        // SAFETY: The buffer was allocated in new() with this exact layout and has
        // not been released yet.
        unsafe {
            dealloc(self.begin.as_ptr(), self.buffer_layout);
        }
    }
}

// SAFETY: The arena owns its buffer exclusively and shares no pointers with other
// threads; all access goes through &self/&mut self. Moving it to another thread
// moves the owned memory with it.
unsafe impl<T: Send> Send for Arena<T> {}

#[cfg(test)]
#[allow(
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    reason = "test code doesn't need the same safety rigor as production code"
)]
mod tests {
    use new_zealand::nz;

    use super::*;

    #[test]
    fn allocate_then_deallocate_restores_cursor() {
        let mut arena = Arena::<u64>::new(nz!(16));

        let first = arena.allocate(4);
        arena.deallocate(first);

        // The cursor is back where it started, so the next block lands at the
        // same address.
        let second = arena.allocate(4);
        assert_eq!(first, second);
    }

    #[test]
    fn payloads_do_not_overlap() {
        let mut arena = Arena::<u32>::new(nz!(16));

        let a = arena.allocate(3);
        let b = arena.allocate(5);

        unsafe {
            a.write(0xAAAA_AAAA);
            b.write(0xBBBB_BBBB);

            assert_eq!(a.read(), 0xAAAA_AAAA);
            assert_eq!(b.read(), 0xBBBB_BBBB);
        }

        assert!(a.addr().get() + 3 * size_of::<u32>() <= b.addr().get());
    }

    #[test]
    fn lifo_unwinds_in_reverse_order() {
        let mut arena = Arena::<u8>::new(nz!(64));

        let a = arena.allocate(8);
        let b = arena.allocate(16);
        let c = arena.allocate(4);

        arena.deallocate(c);
        arena.deallocate(b);
        arena.deallocate(a);

        assert!(arena.is_empty());
    }

    #[test]
    #[should_panic]
    fn deallocate_non_top_panics() {
        let mut arena = Arena::<u64>::new(nz!(16));

        let first = arena.allocate(2);
        let _second = arena.allocate(3);

        arena.deallocate(first);
    }

    #[test]
    #[should_panic]
    fn allocate_beyond_capacity_panics() {
        let mut arena = Arena::<u64>::new(nz!(2));

        _ = arena.allocate(2);
        _ = arena.allocate(2);
    }

    #[test]
    fn reallocate_grows_in_place() {
        let mut arena = Arena::<u64>::new(nz!(16));

        let block = arena.allocate(2);
        let resized = arena.reallocate(block, 6);

        assert_eq!(block, resized);

        // The resized block now occupies the top, so releasing it empties the arena.
        arena.deallocate(resized);
        assert!(arena.is_empty());
    }

    #[test]
    fn reallocate_shrinks_and_frees_space() {
        let mut arena = Arena::<u64>::new(nz!(4));

        // One block occupying nearly the whole buffer.
        let block = arena.allocate(8);
        assert!(!arena.fits(1));

        _ = arena.reallocate(block, 1);
        assert!(arena.fits(1));
    }

    #[test]
    #[should_panic]
    fn reallocate_non_top_panics() {
        let mut arena = Arena::<u64>::new(nz!(16));

        let first = arena.allocate(2);
        let _second = arena.allocate(2);

        _ = arena.reallocate(first, 4);
    }

    #[test]
    #[should_panic]
    fn reallocate_beyond_arena_end_panics() {
        let mut arena = Arena::<u64>::new(nz!(4));

        let block = arena.allocate(4);

        _ = arena.reallocate(block, 64);
    }

    #[test]
    #[should_panic]
    fn corrupted_header_is_detected() {
        let mut arena = Arena::<u64>::new(nz!(8));

        let block = arena.allocate(2);

        // Stomp over the header that sits immediately in front of the payload.
        unsafe {
            block
                .cast::<u8>()
                .sub(size_of::<AllocationHeader>())
                .cast::<usize>()
                .write(0xDEAD_BEEF);
        }

        arena.deallocate(block);
    }

    #[test]
    fn contains_covers_exactly_the_buffer() {
        let mut arena = Arena::<u64>::new(nz!(8));

        let block = arena.allocate(4);

        assert!(arena.contains(block, 4));
        assert!(!arena.contains(NonNull::dangling(), 1));
    }

    #[test]
    fn high_alignment_items_stay_aligned() {
        #[repr(C, align(32))]
        #[allow(dead_code, reason = "only the layout matters, no values are built")]
        struct Wide {
            data: [u64; 4],
        }

        let mut arena = Arena::<Wide>::new(nz!(8));

        let a = arena.allocate(1);
        let b = arena.allocate(2);

        assert_eq!(a.addr().get() % align_of::<Wide>(), 0);
        assert_eq!(b.addr().get() % align_of::<Wide>(), 0);
    }

    #[test]
    #[should_panic]
    fn zero_sized_items_are_rejected() {
        drop(Arena::<()>::new(nz!(8)));
    }
}
