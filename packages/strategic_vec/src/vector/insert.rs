use scopeguard::{ScopeGuard, guard};

use crate::construct::{relocate_range, shift};
use crate::{
    RangeView, Result, Strategy, Vector, construct_fill_with, construct_range_copy, or_panic,
};

impl<T, S: Strategy> Vector<T, S> {
    /// Appends an element to the back of the vector.
    ///
    /// # Panics
    ///
    /// Panics if the vector needs to grow and the strategy cannot provide the new block.
    pub fn push(&mut self, value: T) {
        or_panic(self.try_push(value));
    }

    /// Appends an element to the back of the vector.
    ///
    /// If growing fails, `value` is dropped and the vector is unchanged.
    pub fn try_push(&mut self, value: T) -> Result<()> {
        self.try_push_with(|| value).map(|_| ())
    }

    /// Appends the element returned by `produce` to the back of the vector and returns a
    /// reference to it.
    ///
    /// If the vector needs to grow, the new block is allocated before `produce` is called and
    /// the existing elements are moved over only after it returns, so a panic in `produce`
    /// leaves the vector untouched.
    ///
    /// # Panics
    ///
    /// Panics if the vector needs to grow and the strategy cannot provide the new block.
    pub fn push_with<F>(&mut self, produce: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        or_panic(self.try_push_with(produce))
    }

    /// Appends the element returned by `produce` to the back of the vector and returns a
    /// reference to it.
    ///
    /// See [`push_with()`][Self::push_with].
    pub fn try_push_with<F>(&mut self, produce: F) -> Result<&mut T>
    where
        F: FnOnce() -> T,
    {
        let index = self.len;

        if self.len == self.capacity {
            let new_capacity = self.grown_capacity(1)?;

            self.regrow(new_capacity, index, 1, |slots, strategy| {
                // SAFETY: We are given exactly one uninitialized slot.
                unsafe {
                    strategy.construct(slots.begin(), produce());
                }
            })?;
        } else {
            let value = produce();

            // SAFETY: `len < capacity`, so the slot at `len` is inside the block and unused.
            unsafe {
                self.strategy.construct(self.slot(index), value);
            }

            // Cannot overflow, we are below capacity.
            self.len = self.len.wrapping_add(1);
        }

        // SAFETY: The slot at `index` now holds the new element and we hold `&mut self`.
        Ok(unsafe { self.slot(index).as_mut() })
    }

    /// Inserts an element at `index`, shifting everything after it towards the back. Returns
    /// the index of the inserted element.
    ///
    /// Inserting at `len()` is the same as [`push()`][Self::push].
    ///
    /// # Panics
    ///
    /// Panics if `index > len()` or if the vector needs to grow and the strategy cannot provide
    /// the new block.
    pub fn insert(&mut self, index: usize, value: T) -> usize {
        or_panic(self.try_insert(index, value))
    }

    /// Inserts an element at `index`, shifting everything after it towards the back. Returns
    /// the index of the inserted element.
    ///
    /// If growing fails, `value` is dropped and the vector is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<usize> {
        self.try_insert_with(index, || value)
    }

    /// Inserts the element returned by `produce` at `index`. Returns the index of the inserted
    /// element.
    ///
    /// The element is produced before anything is moved, so a panic in `produce` leaves the
    /// vector untouched.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()` or if the vector needs to grow and the strategy cannot provide
    /// the new block.
    pub fn insert_with<F>(&mut self, index: usize, produce: F) -> usize
    where
        F: FnOnce() -> T,
    {
        or_panic(self.try_insert_with(index, produce))
    }

    /// Inserts the element returned by `produce` at `index`. Returns the index of the inserted
    /// element.
    ///
    /// See [`insert_with()`][Self::insert_with].
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn try_insert_with<F>(&mut self, index: usize, produce: F) -> Result<usize>
    where
        F: FnOnce() -> T,
    {
        self.assert_insert_index(index);

        if index == self.len {
            self.try_push_with(produce)?;
            return Ok(index);
        }

        if self.len == self.capacity {
            let new_capacity = self.grown_capacity(1)?;

            self.regrow(new_capacity, index, 1, |slots, strategy| {
                // SAFETY: We are given exactly one uninitialized slot.
                unsafe {
                    strategy.construct(slots.begin(), produce());
                }
            })?;

            return Ok(index);
        }

        let value = produce();
        let tail = self.len.wrapping_sub(index);

        // SAFETY: There is at least one spare slot, so moving the tail back by one stays inside
        // the block.
        unsafe {
            shift(
                self.slot(index),
                self.slot(index.wrapping_add(1)),
                tail,
                &self.strategy,
            );
        }

        // SAFETY: The slot at `index` was vacated by the shift above.
        unsafe {
            self.strategy.construct(self.slot(index), value);
        }

        self.len = self.len.wrapping_add(1);

        Ok(index)
    }

    /// Inserts `count` clones of `value` at `index`. Returns `index`.
    ///
    /// Inserting zero elements does nothing. If a clone panics, the vector is left as it was.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()` or if the vector needs to grow and the strategy cannot provide
    /// the new block.
    ///
    /// # Example
    ///
    /// ```
    /// use strategic_vec::vector;
    ///
    /// let mut numbers = vector![1, 5];
    /// numbers.insert_n(1, 3, &0);
    ///
    /// assert_eq!(numbers, [1, 0, 0, 0, 5]);
    /// ```
    pub fn insert_n(&mut self, index: usize, count: usize, value: &T) -> usize
    where
        T: Clone,
    {
        or_panic(self.try_insert_n(index, count, value))
    }

    /// Inserts `count` clones of `value` at `index`. Returns `index`.
    ///
    /// See [`insert_n()`][Self::insert_n].
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn try_insert_n(&mut self, index: usize, count: usize, value: &T) -> Result<usize>
    where
        T: Clone,
    {
        self.try_insert_filled(index, count, |slots, strategy| {
            // SAFETY: We are given `count` uninitialized slots.
            unsafe {
                construct_fill_with(slots, strategy, || value.clone());
            }
        })
    }

    /// Inserts clones of every element of `values` at `index`, keeping their order. Returns
    /// `index`.
    ///
    /// The length of the input is known up front, so the vector grows at most once. If a clone
    /// panics, the vector is left as it was.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()` or if the vector needs to grow and the strategy cannot provide
    /// the new block.
    pub fn insert_from_slice(&mut self, index: usize, values: &[T]) -> usize
    where
        T: Clone,
    {
        or_panic(self.try_insert_from_slice(index, values))
    }

    /// Inserts clones of every element of `values` at `index`. Returns `index`.
    ///
    /// See [`insert_from_slice()`][Self::insert_from_slice].
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn try_insert_from_slice(&mut self, index: usize, values: &[T]) -> Result<usize>
    where
        T: Clone,
    {
        self.try_insert_filled(index, values.len(), |slots, strategy| {
            // SAFETY: We are given exactly `values.len()` uninitialized slots, which cannot
            // overlap `values` because the borrow checker keeps `values` out of our block.
            unsafe {
                construct_range_copy(values, slots.begin(), strategy);
            }
        })
    }

    /// Inserts every element of `values` at `index`, keeping their order. Returns `index`.
    ///
    /// Elements are inserted one at a time, so a long input may make the vector grow several
    /// times.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()` or if the vector needs to grow and the strategy cannot provide
    /// the new block.
    pub fn insert_iter<I>(&mut self, index: usize, values: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        or_panic(self.try_insert_iter(index, values))
    }

    /// Inserts every element of `values` at `index`, keeping their order. Returns `index`.
    ///
    /// If growing fails partway, the elements inserted before the failure stay in the vector.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn try_insert_iter<I>(&mut self, index: usize, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        self.assert_insert_index(index);

        let mut position = index;

        for value in values {
            self.try_insert(position, value)?;
            position = position.wrapping_add(1);
        }

        Ok(index)
    }

    /// Appends clones of every element of `values` to the back of the vector.
    ///
    /// # Panics
    ///
    /// Panics if the vector needs to grow and the strategy cannot provide the new block.
    pub fn extend_from_slice(&mut self, values: &[T])
    where
        T: Clone,
    {
        or_panic(self.try_extend_from_slice(values));
    }

    /// Appends clones of every element of `values` to the back of the vector.
    ///
    /// If growing fails or a clone panics, the vector is unchanged.
    pub fn try_extend_from_slice(&mut self, values: &[T]) -> Result<()>
    where
        T: Clone,
    {
        self.try_insert_from_slice(self.len, values).map(|_| ())
    }

    /// The capacity to grow to when `additional` more elements do not fit.
    pub(super) fn grown_capacity(&self, additional: usize) -> Result<usize> {
        self.len
            .checked_mul(2)
            .and_then(|doubled| doubled.checked_add(additional))
            .ok_or_else(|| self.length_exceeded(usize::MAX))
    }

    /// Opens a gap of `count` slots at `index` and has `fill` construct exactly that many
    /// values into it, growing if the gap does not fit into the spare capacity.
    ///
    /// `fill` must either construct every slot it is given or, if it panics, none of them.
    fn try_insert_filled<F>(&mut self, index: usize, count: usize, fill: F) -> Result<usize>
    where
        F: FnOnce(RangeView<T>, &S),
    {
        self.assert_insert_index(index);

        if count == 0 {
            return Ok(index);
        }

        let new_len = self
            .len
            .checked_add(count)
            .ok_or_else(|| self.length_exceeded(usize::MAX))?;

        if new_len > self.capacity {
            let new_capacity = self.grown_capacity(count)?;
            self.regrow(new_capacity, index, count, fill)?;
        } else {
            self.fill_gap(index, count, fill);
        }

        Ok(index)
    }

    /// Opens a gap of `count` slots at `index` inside the current block and fills it. If
    /// `fill` panics, the gap is closed again before the panic continues.
    fn fill_gap<F>(&mut self, index: usize, count: usize, fill: F)
    where
        F: FnOnce(RangeView<T>, &S),
    {
        let old_len = self.len;
        let tail = old_len.wrapping_sub(index);
        let after_gap = index.wrapping_add(count);

        // While the gap is open the vector only claims the elements in front of it.
        self.len = index;

        // SAFETY: The caller checked that the gap fits into the spare capacity.
        unsafe {
            shift(self.slot(index), self.slot(after_gap), tail, &self.strategy);
        }

        let this = guard(self, |this| {
            // SAFETY: The gap is empty again because `fill` constructs all or nothing.
            unsafe {
                shift(this.slot(after_gap), this.slot(index), tail, &this.strategy);
            }

            this.len = old_len;
        });

        fill(this.slots(index, count), &this.strategy);

        let this = ScopeGuard::into_inner(this);
        this.len = old_len.wrapping_add(count);
    }

    /// Builds a block of `new_capacity` slots with a gap of `count` slots at `index`, has
    /// `fill` construct the gap, moves the existing elements around it and then switches over
    /// to the new block.
    ///
    /// The gap is filled before anything is moved. If allocation fails or `fill` panics, the
    /// new block is released and the vector is unchanged.
    ///
    /// `fill` must either construct every slot it is given or, if it panics, none of them.
    pub(super) fn regrow<F>(
        &mut self,
        new_capacity: usize,
        index: usize,
        count: usize,
        fill: F,
    ) -> Result<()>
    where
        F: FnOnce(RangeView<T>, &S),
    {
        let old_len = self.len;
        let new_len = old_len
            .checked_add(count)
            .ok_or_else(|| self.length_exceeded(usize::MAX))?;

        debug_assert!(index <= old_len);
        debug_assert!(new_len <= new_capacity);

        let staging = self.allocate_tmp(new_capacity)?;

        fill(staging.slots(index, count), staging.strategy());

        // Nothing below can fail, so the moves are final.
        let front = self.slots(0, index);
        let back = self.slots(index, old_len.wrapping_sub(index));

        // SAFETY: The front elements are live and the target slots are uninitialized.
        unsafe {
            relocate_range(front, staging.slot(0), &self.strategy, staging.strategy());
        }

        // SAFETY: The back elements are live and the target slots after the gap are
        // uninitialized.
        unsafe {
            relocate_range(
                back,
                staging.slot(index.wrapping_add(count)),
                &self.strategy,
                staging.strategy(),
            );
        }

        let parts = staging.commit();

        // The old elements have been moved out, so the old block is released without them.
        self.len = 0;

        // SAFETY: The block came from our strategy and holds `new_len` live elements.
        unsafe {
            self.adopt_block(parts, new_len);
        }

        Ok(())
    }

    fn assert_insert_index(&self, index: usize) {
        assert!(
            index <= self.len,
            "insertion index {index} is beyond the end of a vector of length {}",
            self.len
        );
    }
}
