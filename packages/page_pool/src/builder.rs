use std::marker::PhantomData;
use std::num::NonZero;

use new_zealand::nz;

use crate::PagePool;

/// Slots per page unless overridden through the builder.
const DEFAULT_PAGE_CAPACITY: NonZero<usize> = nz!(0x400);

/// Builder for creating an instance of [`PagePool`].
///
/// You only need to use this builder if you want to customize the pool
/// configuration. The default configuration used by [`PagePool::new()`][1] is
/// sufficient for most use cases.
///
/// # Example
///
/// ```
/// use new_zealand::nz;
/// use page_pool::PagePool;
///
/// let pool = PagePool::<u32>::builder().page_capacity(nz!(256)).build();
/// ```
///
/// [1]: PagePool::new
#[must_use]
pub struct PagePoolBuilder<T> {
    page_capacity: NonZero<usize>,

    _items: PhantomData<T>,
}

impl<T> std::fmt::Debug for PagePoolBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagePoolBuilder")
            .field(
                "item_type",
                &std::format_args!("{}", std::any::type_name::<T>()),
            )
            .field("page_capacity", &self.page_capacity)
            .finish()
    }
}

impl<T> PagePoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            page_capacity: DEFAULT_PAGE_CAPACITY,
            _items: PhantomData,
        }
    }

    /// Sets the slot capacity of every page the pool will create. Requests
    /// larger than this can never be satisfied and are rejected by the pool.
    pub fn page_capacity(mut self, capacity: NonZero<usize>) -> Self {
        self.page_capacity = capacity;
        self
    }

    /// Builds the page pool with the specified configuration.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn build(self) -> PagePool<T> {
        PagePool::new_inner(self.page_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_is_applied() {
        let pool = PagePoolBuilder::<u64>::new().build();

        assert_eq!(pool.page_capacity().get(), 0x400);
    }

    #[test]
    fn custom_capacity_is_applied() {
        let pool = PagePool::<u64>::builder().page_capacity(nz!(64)).build();

        assert_eq!(pool.page_capacity().get(), 64);
    }
}
