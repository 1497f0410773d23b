use std::marker::PhantomData;
use std::num::NonZero;

use new_zealand::nz;

use crate::StackPool;

/// Items per arena unless overridden through the builder.
const DEFAULT_ARENA_CAPACITY: NonZero<usize> = nz!(0x400);

/// Builder for creating an instance of [`StackPool`].
///
/// You only need to use this builder if you want to customize the pool
/// configuration. The default configuration used by [`StackPool::new()`][1] is
/// sufficient for most use cases.
///
/// # Example
///
/// ```
/// use new_zealand::nz;
/// use stack_pool::StackPool;
///
/// let pool = StackPool::<u32>::builder().arena_capacity(nz!(256)).build();
/// ```
///
/// [1]: StackPool::new
#[must_use]
pub struct StackPoolBuilder<T> {
    arena_capacity: NonZero<usize>,

    _items: PhantomData<T>,
}

impl<T> std::fmt::Debug for StackPoolBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackPoolBuilder")
            .field(
                "item_type",
                &std::format_args!("{}", std::any::type_name::<T>()),
            )
            .field("arena_capacity", &self.arena_capacity)
            .finish()
    }
}

impl<T> StackPoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            _items: PhantomData,
        }
    }

    /// Sets the item capacity of every arena the pool will create. Requests
    /// larger than this can never be satisfied and are rejected by the pool.
    pub fn arena_capacity(mut self, capacity: NonZero<usize>) -> Self {
        self.arena_capacity = capacity;
        self
    }

    /// Builds the stack pool with the specified configuration.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn build(self) -> StackPool<T> {
        StackPool::new_inner(self.arena_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_matches_stack_size() {
        let pool = StackPoolBuilder::<u64>::new().build();

        assert_eq!(pool.arena_capacity().get(), 0x400);
    }

    #[test]
    fn custom_capacity_is_applied() {
        let pool = StackPool::<u64>::builder().arena_capacity(nz!(32)).build();

        assert_eq!(pool.arena_capacity().get(), 32);
    }
}
