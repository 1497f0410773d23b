use std::num::NonZero;
use std::ptr::NonNull;

use crate::{Page, PagePoolBuilder};

/// A growable collection of fixed-size [`Page`] buffers with bitmap-tracked
/// slots.
///
/// Unlike a stack pool there is no "active" page: any page with a free slot can
/// serve an allocation, and any slot can be returned at any time. When every
/// page is full, a fresh page is appended. Pages are released only when the pool
/// is dropped.
///
/// # Example
///
/// ```rust
/// use page_pool::PagePool;
///
/// let mut pool = PagePool::<u32>::new();
///
/// let a = pool.get_free_page(1).allocate();
/// let b = pool.get_free_page(1).allocate();
///
/// // Slots come back in any order.
/// pool.find_page(a, 1).deallocate(a);
/// pool.find_page(b, 1).deallocate(b);
/// ```
#[derive(Debug)]
pub struct PagePool<T> {
    /// The pages providing the storage of the pool, in creation order.
    pages: Vec<Page<T>>,

    /// Slot capacity of every page created by this pool.
    page_capacity: NonZero<usize>,
}

impl<T> PagePool<T> {
    /// Creates a pool with the default configuration and its initial page.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a new [`PagePool`].
    ///
    /// Use this when you want to customize the page capacity beyond the default.
    ///
    /// # Example
    ///
    /// ```rust
    /// use new_zealand::nz;
    /// use page_pool::PagePool;
    ///
    /// let pool = PagePool::<u64>::builder().page_capacity(nz!(128)).build();
    ///
    /// assert_eq!(pool.page_capacity().get(), 128);
    /// ```
    pub fn builder() -> PagePoolBuilder<T> {
        PagePoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(page_capacity: NonZero<usize>) -> Self {
        Self {
            pages: vec![Page::new(page_capacity)],
            page_capacity,
        }
    }

    /// Slot capacity of each page in this pool.
    #[must_use]
    pub fn page_capacity(&self) -> NonZero<usize> {
        self.page_capacity
    }

    /// Number of pages the pool has created so far.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of free slots across all pages.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.pages.iter().map(Page::free_count).sum()
    }

    /// Returns the first page with a free slot, appending a fresh page when all
    /// existing pages are full.
    ///
    /// # Panics
    ///
    /// Panics if `amount` exceeds the page capacity; requests larger than one
    /// page can never be satisfied by this pool.
    pub fn get_free_page(&mut self, amount: usize) -> &mut Page<T> {
        assert!(
            amount <= self.page_capacity.get(),
            "requested {amount} items exceed the page capacity of {}",
            self.page_capacity.get()
        );

        let index = match self.pages.iter().position(Page::has_space) {
            Some(index) => index,
            None => {
                // All pages are full: the new page lands at the current count.
                self.pages.push(Page::new(self.page_capacity));
                self.pages.len().wrapping_sub(1)
            }
        };

        self.pages
            .get_mut(index)
            .expect("index refers to a scanned or freshly pushed page")
    }

    /// Returns the page whose buffer contains `amount` items starting at `ptr`.
    ///
    /// # Panics
    ///
    /// Panics if no page of this pool contains the range.
    pub fn find_page(&mut self, ptr: NonNull<T>, amount: usize) -> &mut Page<T> {
        let index = self
            .pages
            .iter()
            .position(|page| page.contains(ptr, amount))
            .unwrap_or_else(|| panic!("pointer {ptr:?} does not belong to any page in this pool"));

        self.pages
            .get_mut(index)
            .expect("index was just produced by a scan over the page list")
    }
}

impl<T> Default for PagePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use new_zealand::nz;

    use super::*;

    #[test]
    fn starts_with_one_page() {
        let pool = PagePool::<u64>::new();

        assert_eq!(pool.page_count(), 1);
    }

    #[test]
    fn grows_only_when_every_page_is_full() {
        let mut pool = PagePool::<u64>::builder().page_capacity(nz!(2)).build();

        let a = pool.get_free_page(1).allocate();
        let _b = pool.get_free_page(1).allocate();
        assert_eq!(pool.page_count(), 1);

        let _c = pool.get_free_page(1).allocate();
        assert_eq!(pool.page_count(), 2);

        // Returning a slot makes the first page eligible again.
        pool.find_page(a, 1).deallocate(a);
        let reused = pool.get_free_page(1).allocate();
        assert_eq!(reused, a);
        assert_eq!(pool.page_count(), 2);
    }

    #[test]
    fn find_page_locates_the_owning_page() {
        let mut pool = PagePool::<u32>::builder().page_capacity(nz!(1)).build();

        let a = pool.get_free_page(1).allocate();
        let b = pool.get_free_page(1).allocate();
        assert_eq!(pool.page_count(), 2);

        pool.find_page(b, 1).deallocate(b);
        pool.find_page(a, 1).deallocate(a);

        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    #[should_panic]
    fn oversized_request_panics() {
        let mut pool = PagePool::<u64>::builder().page_capacity(nz!(16)).build();

        _ = pool.get_free_page(17);
    }

    #[test]
    #[should_panic]
    fn unknown_pointer_panics() {
        let mut pool = PagePool::<u64>::new();

        _ = pool.find_page(std::ptr::NonNull::dangling(), 1);
    }
}
