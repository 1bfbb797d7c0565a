use std::ops::{Bound, Range, RangeBounds};

use scopeguard::guard;

use crate::construct::{destroy_range, shift};
use crate::{Strategy, Vector};

impl<T, S: Strategy> Vector<T, S> {
    /// Removes the last element and returns it, or `None` if the vector is empty.
    ///
    /// The element is moved out to the caller, so the strategy sees a `forget()` rather than a
    /// `destroy()`. Use [`pop_back()`][Self::pop_back] to drop the element through the
    /// strategy instead.
    pub fn pop(&mut self) -> Option<T> {
        let index = self.len.checked_sub(1)?;

        self.len = index;
        let slot = self.slot(index);

        // SAFETY: The slot held the last live element and the vector no longer claims it.
        let value = unsafe { slot.read() };
        self.strategy.forget(slot);

        Some(value)
    }

    /// Destroys the last element through the strategy.
    ///
    /// # Panics
    ///
    /// Panics if the vector is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use strategic_vec::vector;
    ///
    /// let mut words = vector![String::from("kept"), String::from("dropped")];
    /// words.pop_back();
    ///
    /// assert_eq!(words, [String::from("kept")]);
    /// ```
    pub fn pop_back(&mut self) {
        let index = self
            .len
            .checked_sub(1)
            .expect("pop_back() called on an empty vector");

        // Shortened first, so a panicking destructor leaves the slot unclaimed.
        self.len = index;

        // SAFETY: The slot held the last live element and the vector no longer claims it.
        unsafe {
            self.strategy.destroy(self.slot(index));
        }
    }

    /// Removes the element at `index`, shifting everything after it towards the front.
    /// Returns `index`, which now refers to the element that followed the removed one (or to
    /// the end, if the last element was removed).
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn erase(&mut self, index: usize) -> usize {
        assert!(
            index < self.len,
            "erase index {index} is out of range for a vector of length {}",
            self.len
        );

        self.erase_range(index..=index)
    }

    /// Removes the elements in `range`, shifting everything after them towards the front.
    /// Returns the start of the range, which now refers to the first element after the removed
    /// ones (or to the end).
    ///
    /// Removing an empty range does nothing. The capacity is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the range is decreasing or extends beyond `len()`.
    ///
    /// # Example
    ///
    /// ```
    /// use strategic_vec::vector;
    ///
    /// let mut letters = vector!['a', 'b', 'c', 'd'];
    ///
    /// assert_eq!(letters.erase_range(1..3), 1);
    /// assert_eq!(letters, ['a', 'd']);
    /// ```
    pub fn erase_range<R>(&mut self, range: R) -> usize
    where
        R: RangeBounds<usize>,
    {
        let Range { start, end } = bounded(range, self.len);
        let removed = end.wrapping_sub(start);

        if removed == 0 {
            return start;
        }

        let tail = self.len.wrapping_sub(end);
        let window = self.slots(start, removed);

        // The vector only claims the elements in front of the window until the tail has been
        // moved into place, which happens even if a destructor panics.
        self.len = start;

        let this = guard(self, |this| {
            // SAFETY: The window is empty now, so the tail can slide over it.
            unsafe {
                shift(this.slot(end), this.slot(start), tail, &this.strategy);
            }

            this.len = start.wrapping_add(tail);
        });

        // SAFETY: The window holds live elements that the vector no longer claims.
        unsafe {
            destroy_range(window, &this.strategy);
        }

        start
    }

    /// Keeps only the elements for which `keep` returns `true`, preserving their order.
    ///
    /// # Example
    ///
    /// ```
    /// use strategic_vec::vector;
    ///
    /// let mut numbers = vector![1, 2, 3, 4];
    /// numbers.retain(|n| n % 2 == 0);
    ///
    /// assert_eq!(numbers, [2, 4]);
    /// ```
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.remove_where(|item| !keep(item));
    }

    /// Removes every element for which `remove` returns `true`, preserving the order of the
    /// rest. Returns how many elements were removed.
    ///
    /// If `remove` or a destructor panics, the elements not yet examined are kept and the
    /// vector stays contiguous.
    fn remove_where<F>(&mut self, mut remove: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let original_len = self.len;

        // Elements are moved around below, so the vector claims none of them until the end.
        self.len = 0;

        // (vector, examined, removed)
        let mut state = guard((self, 0_usize, 0_usize), |(this, examined, removed)| {
            let unexamined = original_len.wrapping_sub(examined);

            // SAFETY: The `removed` slots in front of the unexamined elements are empty.
            unsafe {
                shift(
                    this.slot(examined),
                    this.slot(examined.wrapping_sub(removed)),
                    unexamined,
                    &this.strategy,
                );
            }

            this.len = original_len.wrapping_sub(removed);
        });

        while state.1 < original_len {
            let (this, examined, removed) = &mut *state;
            let slot = this.slot(*examined);

            // SAFETY: Every slot from `examined` onwards still holds its original element.
            let matches = remove(unsafe { slot.as_ref() });

            *examined = examined.wrapping_add(1);

            if matches {
                // Counted before the destructor runs, so a panicking destructor cannot cause
                // this element to be touched again.
                *removed = removed.wrapping_add(1);

                // SAFETY: The element is live and is no longer part of the vector.
                unsafe {
                    this.strategy.destroy(slot);
                }
            } else if *removed > 0 {
                let target = this.slot(examined.wrapping_sub(1).wrapping_sub(*removed));

                // SAFETY: The target slot is one of the empty slots left behind by removals.
                unsafe {
                    shift(slot, target, 1, &this.strategy);
                }
            }
        }

        state.2
    }
}

/// Removes every element equal to `value` from the vector, preserving the order of the rest.
/// Returns how many elements were removed.
///
/// # Example
///
/// ```
/// use strategic_vec::{erase, vector};
///
/// let mut numbers = vector![1, 2, 1, 3];
///
/// assert_eq!(erase(&mut numbers, &1), 2);
/// assert_eq!(numbers, [2, 3]);
/// ```
pub fn erase<T, U, S>(vector: &mut Vector<T, S>, value: &U) -> usize
where
    T: PartialEq<U>,
    U: ?Sized,
    S: Strategy,
{
    vector.remove_where(|item| item == value)
}

/// Removes every element for which `predicate` returns `true`, preserving the order of the
/// rest. Returns how many elements were removed.
///
/// # Example
///
/// ```
/// use strategic_vec::{erase_if, vector};
///
/// let mut numbers = vector![1, 2, 3, 4, 5];
///
/// assert_eq!(erase_if(&mut numbers, |n| n % 2 == 0), 2);
/// assert_eq!(numbers, [1, 3, 5]);
/// ```
pub fn erase_if<T, S, F>(vector: &mut Vector<T, S>, predicate: F) -> usize
where
    S: Strategy,
    F: FnMut(&T) -> bool,
{
    vector.remove_where(predicate)
}

/// Resolves `range` against a sequence of `len` elements.
///
/// # Panics
///
/// Panics if the range is decreasing, overflows or extends beyond `len`.
fn bounded<R>(range: R, len: usize) -> Range<usize>
where
    R: RangeBounds<usize>,
{
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start
            .checked_add(1)
            .expect("range start cannot exceed usize::MAX"),
        Bound::Unbounded => 0,
    };

    let end = match range.end_bound() {
        Bound::Included(&end) => end
            .checked_add(1)
            .expect("range end cannot exceed usize::MAX"),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };

    assert!(start <= end, "range start {start} is after range end {end}");
    assert!(
        end <= len,
        "range end {end} is out of range for a vector of length {len}"
    );

    start..end
}
