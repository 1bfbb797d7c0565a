use crate::construct::relocate_range;
use crate::{
    Global, Result, Strategy, Vector, construct_fill_with, construct_range_copy, or_panic,
};

impl<T> Vector<T, Global> {
    /// Creates an empty vector with room for exactly `capacity` elements, using the
    /// [`Global`] strategy.
    ///
    /// # Panics
    ///
    /// Panics if the block cannot be allocated.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }

    /// Creates a vector holding `count` clones of `value`, using the [`Global`] strategy.
    ///
    /// # Panics
    ///
    /// Panics if the block cannot be allocated.
    #[must_use]
    pub fn from_elem(value: &T, count: usize) -> Self
    where
        T: Clone,
    {
        Self::from_elem_in(value, count, Global)
    }

    /// Creates a vector holding clones of the elements of `values`, using the [`Global`]
    /// strategy.
    ///
    /// # Panics
    ///
    /// Panics if the block cannot be allocated.
    #[must_use]
    pub fn from_slice(values: &[T]) -> Self
    where
        T: Clone,
    {
        Self::from_slice_in(values, Global)
    }
}

impl<T, S: Strategy> Vector<T, S> {
    /// Creates an empty vector with room for exactly `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if the strategy cannot provide the block.
    #[must_use]
    pub fn with_capacity_in(capacity: usize, strategy: S) -> Self {
        or_panic(Self::try_with_capacity_in(capacity, strategy))
    }

    /// Creates an empty vector with room for exactly `capacity` elements.
    pub fn try_with_capacity_in(capacity: usize, strategy: S) -> Result<Self> {
        let mut vector = Self::new_in(strategy);
        vector.allocate(capacity)?;
        Ok(vector)
    }

    /// Creates a vector holding `count` clones of `value`, with a block of exactly `count`
    /// slots.
    ///
    /// # Panics
    ///
    /// Panics if the strategy cannot provide the block.
    #[must_use]
    pub fn from_elem_in(value: &T, count: usize, strategy: S) -> Self
    where
        T: Clone,
    {
        or_panic(Self::try_from_elem_in(value, count, strategy))
    }

    /// Creates a vector holding `count` clones of `value`.
    ///
    /// If a clone panics, the clones made so far are destroyed and the block is released.
    pub fn try_from_elem_in(value: &T, count: usize, strategy: S) -> Result<Self>
    where
        T: Clone,
    {
        Self::try_from_fn_in(count, strategy, || value.clone())
    }

    /// Creates a vector holding `count` default values, with a block of exactly `count`
    /// slots.
    ///
    /// # Panics
    ///
    /// Panics if the strategy cannot provide the block.
    #[must_use]
    pub fn from_default_in(count: usize, strategy: S) -> Self
    where
        T: Default,
    {
        or_panic(Self::try_from_fn_in(count, strategy, T::default))
    }

    /// Creates a vector holding `count` values returned by `produce`, with a block of exactly
    /// `count` slots.
    ///
    /// If `produce` panics, the values created so far are destroyed and the block is released.
    pub fn try_from_fn_in<F>(count: usize, strategy: S, produce: F) -> Result<Self>
    where
        F: FnMut() -> T,
    {
        let mut vector = Self::try_with_capacity_in(count, strategy)?;

        // SAFETY: The block was just allocated with `count` uninitialized slots.
        unsafe {
            construct_fill_with(vector.slots(0, count), &vector.strategy, produce);
        }

        vector.len = count;

        Ok(vector)
    }

    /// Creates a vector holding clones of the elements of `values`, with a block of exactly
    /// `values.len()` slots.
    ///
    /// # Panics
    ///
    /// Panics if the strategy cannot provide the block.
    #[must_use]
    pub fn from_slice_in(values: &[T], strategy: S) -> Self
    where
        T: Clone,
    {
        or_panic(Self::try_from_slice_in(values, strategy))
    }

    /// Creates a vector holding clones of the elements of `values`.
    ///
    /// The length of the input is known up front, so the block is allocated once at exactly
    /// the right size.
    pub fn try_from_slice_in(values: &[T], strategy: S) -> Result<Self>
    where
        T: Clone,
    {
        let mut vector = Self::try_with_capacity_in(values.len(), strategy)?;

        // SAFETY: The block was just allocated with room for every value and cannot overlap
        // them.
        unsafe {
            construct_range_copy(values, vector.slot(0), &vector.strategy);
        }

        vector.len = values.len();

        Ok(vector)
    }

    /// Creates a vector from the elements of an array, with a block of exactly `N` slots.
    ///
    /// # Panics
    ///
    /// Panics if the strategy cannot provide the block.
    #[must_use]
    pub fn from_array_in<const N: usize>(values: [T; N], strategy: S) -> Self {
        let mut vector = Self::with_capacity_in(N, strategy);

        for value in values {
            vector.push(value);
        }

        vector
    }

    /// Creates a vector from the elements of an iterator, appending them one at a time.
    ///
    /// # Panics
    ///
    /// Panics if the strategy cannot provide a block.
    #[must_use]
    pub fn from_iter_in<I>(values: I, strategy: S) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut vector = Self::new_in(strategy);
        vector.extend(values);
        vector
    }

    /// Creates an independent copy of the vector that uses `strategy`.
    ///
    /// # Panics
    ///
    /// Panics if the strategy cannot provide the block.
    #[must_use]
    pub fn clone_in(&self, strategy: S) -> Self
    where
        T: Clone,
    {
        or_panic(self.try_clone_in(strategy))
    }

    /// Creates an independent copy of the vector that uses `strategy`.
    pub fn try_clone_in(&self, strategy: S) -> Result<Self>
    where
        T: Clone,
    {
        Self::try_from_slice_in(self.as_slice(), strategy)
    }

    /// Moves the contents out into a new vector, leaving `self` empty and without a block.
    ///
    /// The new vector takes over the block as-is along with a copy of the strategy. No
    /// element is touched.
    #[must_use]
    pub fn take(&mut self) -> Self {
        let mut taken = Self::new_in(self.strategy.clone());
        taken.steal_block(self);
        taken
    }

    /// Moves the contents out into a new vector that uses `strategy`, leaving `self` empty.
    ///
    /// If `strategy` equals the current one, the new vector takes over the block as-is.
    /// Otherwise the elements are moved into a new block from `strategy` and `self` keeps its
    /// (now empty) block.
    ///
    /// # Panics
    ///
    /// Panics if a new block is needed and `strategy` cannot provide it.
    #[must_use]
    pub fn take_in(&mut self, strategy: S) -> Self {
        or_panic(self.try_take_in(strategy))
    }

    /// Moves the contents out into a new vector that uses `strategy`, leaving `self` empty.
    ///
    /// See [`take_in()`][Self::take_in]. On failure `self` is unchanged.
    pub fn try_take_in(&mut self, strategy: S) -> Result<Self> {
        let same_memory = S::IS_ALWAYS_EQUAL || strategy == self.strategy;
        let mut taken = Self::new_in(strategy);

        if same_memory {
            taken.steal_block(self);
            return Ok(taken);
        }

        taken.allocate(self.len)?;

        // SAFETY: Our elements are live and the new block has room for all of them.
        unsafe {
            relocate_range(self.live(), taken.slot(0), &self.strategy, &taken.strategy);
        }

        taken.len = self.len;
        self.len = 0;

        Ok(taken)
    }
}

impl<T, const N: usize> From<[T; N]> for Vector<T, Global> {
    fn from(values: [T; N]) -> Self {
        Self::from_array_in(values, Global)
    }
}

impl<T: Clone> From<&[T]> for Vector<T, Global> {
    fn from(values: &[T]) -> Self {
        Self::from_slice(values)
    }
}

impl<T> From<Vec<T>> for Vector<T, Global> {
    fn from(values: Vec<T>) -> Self {
        let mut vector = Self::with_capacity(values.len());

        for value in values {
            vector.push(value);
        }

        vector
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(
        clippy::indexing_slicing,
        reason = "we do not need to worry about these things when writing test code"
    )]

    use std::panic::{AssertUnwindSafe, catch_unwind};

    use crate::testing::{Fragile, TrackingStrategy, values_of};
    use crate::{Global, Vector};

    #[test]
    fn with_capacity_allocates_once() {
        let strategy = TrackingStrategy::<false>::new(1);

        let vector = Vector::<u32, _>::with_capacity_in(10, strategy.clone());

        assert!(vector.is_empty());
        assert_eq!(vector.capacity(), 10);
        assert_eq!(strategy.stats().allocations(), 1);
    }

    #[test]
    fn from_elem_clones() {
        let vector = Vector::from_elem(&String::from("x"), 3);

        assert_eq!(vector, ["x", "x", "x"]);
        assert_eq!(vector.capacity(), 3);
    }

    #[test]
    fn from_elem_zero_is_empty() {
        let vector = Vector::from_elem(&1, 0);

        assert!(vector.is_empty());
        assert_eq!(vector.capacity(), 0);
    }

    #[test]
    fn from_default_in_uses_defaults() {
        let vector = Vector::<u16, _>::from_default_in(4, Global);

        assert_eq!(vector, [0, 0, 0, 0]);
    }

    #[test]
    fn panicking_clone_releases_everything() {
        let strategy = TrackingStrategy::<false>::new(1);
        let (items, _budget) = Fragile::batch(4, 2);

        let result = catch_unwind(AssertUnwindSafe(|| {
            Vector::from_slice_in(&items, strategy.clone())
        }));

        assert!(result.is_err());
        assert_eq!(strategy.stats().live_blocks(), 0);
        assert_eq!(strategy.stats().constructs(), 2);
        assert_eq!(strategy.stats().destroys(), 2);
    }

    #[test]
    fn from_slice_sizes_exactly() {
        let vector = Vector::from_slice(&[1, 2, 3, 4, 5]);

        assert_eq!(vector.capacity(), 5);
        assert_eq!(vector, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn from_array_and_vec() {
        let from_array = Vector::from([1, 2, 3]);
        let from_vec = Vector::from(vec![1, 2, 3]);
        let from_slice = Vector::from(&[1, 2, 3][..]);

        assert_eq!(from_array, from_vec);
        assert_eq!(from_vec, from_slice);
        assert_eq!(from_array.capacity(), 3);
    }

    #[test]
    fn from_iter_in_appends_in_order() {
        let vector = Vector::from_iter_in((1..=4).map(|n| n * 10), Global);

        assert_eq!(vector, [10, 20, 30, 40]);
    }

    #[test]
    fn clone_in_uses_given_strategy() {
        let original = Vector::from_slice_in(&[1, 2], TrackingStrategy::<false>::new(1));
        let other = TrackingStrategy::<false>::new(2);

        let copy = original.clone_in(other.clone());

        assert_eq!(copy, [1, 2]);
        assert!(copy.strategy() == other);
        assert_eq!(other.stats().allocations(), 1);
    }

    #[test]
    fn take_leaves_source_empty() {
        let strategy = TrackingStrategy::<false>::new(1);
        let mut source = Vector::from_slice_in(&[1, 2, 3], strategy.clone());
        let start = source.as_ptr();

        let taken = source.take();

        assert_eq!(taken, [1, 2, 3]);
        assert_eq!(taken.as_ptr(), start);
        assert_eq!(source.len(), 0);
        assert_eq!(source.capacity(), 0);
        source.integrity_check();

        source.push(4);
        assert_eq!(source, [4]);
    }

    #[test]
    fn take_in_equal_strategy_keeps_block() {
        let strategy = TrackingStrategy::<false>::new(1);
        let mut source = Vector::from_slice_in(&[1, 2], strategy.clone());
        let start = source.as_ptr();

        let taken = source.take_in(strategy.clone());

        assert_eq!(taken.as_ptr(), start);
        assert_eq!(source.capacity(), 0);
        assert_eq!(strategy.stats().allocations(), 1);
    }

    #[test]
    fn take_in_unequal_strategy_moves_elements() {
        let first = TrackingStrategy::<false>::new(1);
        let second = TrackingStrategy::<false>::new(2);
        let values = [String::from("a"), String::from("b")];
        let mut source = Vector::from_slice_in(&values, first.clone());

        let taken = source.take_in(second.clone());

        assert_eq!(taken, ["a", "b"]);
        assert!(source.is_empty());
        assert_eq!(source.capacity(), 2);

        drop(source);
        drop(taken);

        // Each block went back to the strategy that allocated it.
        assert_eq!(first.stats().live_blocks(), 0);
        assert_eq!(second.stats().live_blocks(), 0);
        assert_eq!(first.stats().forgets(), 2);
        assert_eq!(first.stats().live_values(), 0);
        assert_eq!(second.stats().live_values(), 0);
    }

    #[test]
    fn failed_take_in_keeps_source() {
        let first = TrackingStrategy::<false>::new(1);
        let second = TrackingStrategy::<false>::new(2);
        second.stats().fail_after(0);
        let mut source = Vector::from_slice_in(&[1, 2], first);

        assert!(source.try_take_in(second).is_err());
        assert_eq!(source, [1, 2]);
    }

    #[test]
    fn fragile_values_survive_copy() {
        let (items, _budget) = Fragile::batch(3, 3);

        let vector = Vector::from_slice(&items);

        assert_eq!(values_of(&vector), [0, 1, 2]);
    }
}
