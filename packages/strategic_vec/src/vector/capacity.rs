use crate::construct::destroy_range;
use crate::{Result, Strategy, Vector, construct_fill_with, or_panic};

impl<T, S: Strategy> Vector<T, S> {
    /// Ensures the vector can hold at least `capacity` elements in total without replacing its
    /// block.
    ///
    /// Unlike [`Vec::reserve()`], the argument is the desired total capacity, not the number of
    /// additional elements. If the current capacity already suffices, nothing happens.
    /// Otherwise the vector switches to a block of exactly `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if the strategy cannot provide the new block or if `capacity` exceeds
    /// [`max_size()`][Self::max_size].
    pub fn reserve(&mut self, capacity: usize) {
        or_panic(self.try_reserve(capacity));
    }

    /// Ensures the vector can hold at least `capacity` elements in total without replacing its
    /// block.
    ///
    /// See [`reserve()`][Self::reserve]. On failure the vector is unchanged.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<()> {
        if capacity <= self.capacity {
            return Ok(());
        }

        if capacity > self.max_size() {
            return Err(self.length_exceeded(capacity));
        }

        self.regrow(capacity, self.len, 0, |_, _| {})
    }

    /// Shrinks the block to exactly `len()` slots.
    ///
    /// An empty vector gives its block back to the strategy entirely.
    ///
    /// # Panics
    ///
    /// Panics if the strategy cannot provide the smaller block.
    pub fn shrink_to_fit(&mut self) {
        or_panic(self.try_shrink_to_fit());
    }

    /// Shrinks the block to exactly `len()` slots.
    ///
    /// See [`shrink_to_fit()`][Self::shrink_to_fit]. On failure the vector is unchanged.
    pub fn try_shrink_to_fit(&mut self) -> Result<()> {
        if self.len == self.capacity {
            return Ok(());
        }

        if self.len == 0 {
            self.release();
            return Ok(());
        }

        self.regrow(self.len, self.len, 0, |_, _| {})
    }

    /// Changes the length to `new_len`, filling new slots with clones of `value` or destroying
    /// elements from the back.
    ///
    /// If the vector needs to grow, the new elements are created in the new block before the
    /// existing elements move over, so `value` may safely be a clone of one of the elements
    /// and a panicking clone leaves the vector untouched.
    ///
    /// # Panics
    ///
    /// Panics if the vector needs to grow and the strategy cannot provide the new block.
    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        or_panic(self.try_resize(new_len, value));
    }

    /// Changes the length to `new_len`, filling new slots with clones of `value`.
    ///
    /// See [`resize()`][Self::resize].
    pub fn try_resize(&mut self, new_len: usize, value: T) -> Result<()>
    where
        T: Clone,
    {
        self.try_resize_with(new_len, || value.clone())
    }

    /// Changes the length to `new_len`, filling new slots with `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics if the vector needs to grow and the strategy cannot provide the new block.
    pub fn resize_default(&mut self, new_len: usize)
    where
        T: Default,
    {
        or_panic(self.try_resize_with(new_len, T::default));
    }

    /// Changes the length to `new_len`, filling new slots with values returned by `produce`.
    ///
    /// # Panics
    ///
    /// Panics if the vector needs to grow and the strategy cannot provide the new block.
    pub fn resize_with<F>(&mut self, new_len: usize, produce: F)
    where
        F: FnMut() -> T,
    {
        or_panic(self.try_resize_with(new_len, produce));
    }

    /// Changes the length to `new_len`, filling new slots with values returned by `produce`.
    ///
    /// Growing is all or nothing: if the strategy fails or `produce` panics, the vector is
    /// unchanged.
    pub fn try_resize_with<F>(&mut self, new_len: usize, produce: F) -> Result<()>
    where
        F: FnMut() -> T,
    {
        let Some(additional) = new_len.checked_sub(self.len) else {
            self.truncate(new_len);
            return Ok(());
        };

        if additional == 0 {
            return Ok(());
        }

        let fill = |slots, strategy: &S| {
            // SAFETY: We are given `additional` uninitialized slots.
            unsafe {
                construct_fill_with(slots, strategy, produce);
            }
        };

        if new_len > self.capacity {
            if new_len > self.max_size() {
                return Err(self.length_exceeded(new_len));
            }

            self.regrow(new_len, self.len, additional, fill)
        } else {
            fill(self.slots(self.len, additional), &self.strategy);
            self.len = new_len;
            Ok(())
        }
    }

    /// Destroys every element from `new_len` onwards. Does nothing if the vector is not longer
    /// than `new_len`. The capacity is unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        let Some(removed) = self.len.checked_sub(new_len) else {
            return;
        };

        let tail = self.slots(new_len, removed);

        // The vector stops claiming the tail before it is destroyed, so a panicking destructor
        // cannot lead to a double drop.
        self.len = new_len;

        // SAFETY: The tail held live elements that the vector no longer refers to.
        unsafe {
            destroy_range(tail, &self.strategy);
        }
    }

    /// Destroys every element. The capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }
}
