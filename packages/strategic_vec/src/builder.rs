use std::marker::PhantomData;

use crate::{Global, Result, Strategy, Vector};

/// Builder for creating an instance of [`Vector`].
///
/// You only need to use this builder if you want to choose the strategy and the initial
/// capacity in one place. [`Vector::new()`][1] and [`Vector::new_in()`][2] are sufficient for
/// most use cases.
///
/// # Examples
///
/// ```
/// use strategic_vec::{Global, Vector};
///
/// let numbers = Vector::<u64>::builder()
///     .strategy(Global)
///     .capacity(32)
///     .build();
///
/// assert!(numbers.is_empty());
/// assert_eq!(numbers.capacity(), 32);
/// ```
///
/// [1]: Vector::new
/// [2]: Vector::new_in
#[must_use]
pub struct VectorBuilder<T, S: Strategy = Global> {
    strategy: S,
    capacity: usize,

    _item: PhantomData<T>,
}

#[expect(
    clippy::missing_fields_in_debug,
    reason = "strategies are not required to implement Debug"
)]
impl<T, S: Strategy> std::fmt::Debug for VectorBuilder<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorBuilder")
            .field(
                "item_type",
                &std::format_args!("{}", std::any::type_name::<T>()),
            )
            .field(
                "strategy_type",
                &std::format_args!("{}", std::any::type_name::<S>()),
            )
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T> VectorBuilder<T, Global> {
    pub(crate) fn new() -> Self {
        Self {
            strategy: Global,
            capacity: 0,
            _item: PhantomData,
        }
    }
}

impl<T, S: Strategy> VectorBuilder<T, S> {
    /// Sets the strategy the vector obtains its memory from and creates its elements with.
    ///
    /// # Examples
    ///
    /// ```
    /// use strategic_vec::{Global, Vector};
    ///
    /// let numbers = Vector::<u32>::builder().strategy(Global).build();
    /// ```
    pub fn strategy<S2: Strategy>(self, strategy: S2) -> VectorBuilder<T, S2> {
        VectorBuilder {
            strategy,
            capacity: self.capacity,
            _item: PhantomData,
        }
    }

    /// Sets the number of slots to allocate up front. Defaults to zero, in which case nothing
    /// is allocated until the first element is inserted.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builds the vector with the specified configuration.
    ///
    /// # Panics
    ///
    /// Panics if the strategy cannot provide a block of the requested capacity.
    #[must_use]
    pub fn build(self) -> Vector<T, S> {
        Vector::with_capacity_in(self.capacity, self.strategy)
    }

    /// Builds the vector with the specified configuration, reporting failure to allocate the
    /// requested capacity as an error.
    pub fn try_build(self) -> Result<Vector<T, S>> {
        Vector::try_with_capacity_in(self.capacity, self.strategy)
    }
}
