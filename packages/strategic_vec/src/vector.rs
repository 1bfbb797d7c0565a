use std::fmt;
use std::mem;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::ptr::NonNull;
use std::slice::{self, SliceIndex};

use scopeguard::guard;
use tracing::debug;

use crate::construct::destroy_range;
use crate::staging::{StagingBlock, allocate_block, deallocate_block, max_slots};
use crate::{Error, Global, RangeView, Result, Strategy, VectorBuilder};

mod assign;
mod capacity;
mod compare;
mod construction;
mod erase;
mod insert;
mod iter;

pub use erase::{erase, erase_if};
pub use iter::IntoIter;

/// A contiguous growable array whose memory and element lifecycle are delegated to an
/// allocation [`Strategy`].
///
/// The vector owns exactly one block of memory at a time. The first `len()` slots of the block
/// hold live elements and the remaining `capacity() - len()` slots are uninitialized. Every
/// element is created through [`Strategy::construct()`] and either dropped through
/// [`Strategy::destroy()`] or, when moved to another slot or out to the caller, reported to
/// [`Strategy::forget()`]. Every block comes from and returns to the strategy the vector
/// holds.
///
/// # Failure guarantees
///
/// Operations that need a bigger (or smaller) block build the replacement block completely on
/// the side and only then swap it in. If the strategy cannot provide memory or producing a new
/// element panics, the replacement is torn down and the vector is exactly as it was before the
/// call.
///
/// Operations that overwrite existing elements in place ([`clone_from()`][Clone::clone_from]
/// when the capacity suffices, [`move_from()`][Self::move_from] between unequal strategies and
/// [`assign_from_slice()`][Self::assign_from_slice]) only guarantee that the vector stays valid:
/// a panicking `clone()` or `drop()` may leave a mix of old and new elements behind.
///
/// # Growth
///
/// When an insertion finds no spare capacity, the vector grows to `2 * len() + 1` slots (or
/// `2 * len() + count` for bulk insertions), so capacity follows `0, 1, 3, 7, 15, ...`.
///
/// # Allocation failure
///
/// Every operation that may allocate has a `try_` variant that reports failure as an
/// [`Error`]. The plain variants panic instead.
///
/// # Example
///
/// ```
/// use strategic_vec::Vector;
///
/// let mut numbers = Vector::new();
/// numbers.push(1);
/// numbers.push(2);
/// numbers.push(3);
///
/// assert_eq!(numbers, [1, 2, 3]);
/// assert_eq!(numbers.capacity(), 3);
///
/// numbers.insert(1, 10);
/// assert_eq!(numbers, [1, 10, 2, 3]);
/// assert_eq!(numbers.capacity(), 7);
/// ```
pub struct Vector<T, S: Strategy = Global> {
    /// First slot of the owned block. Dangling when `capacity` is zero.
    start: NonNull<T>,

    /// Number of live elements at the front of the block.
    len: usize,

    /// Number of slots in the block.
    capacity: usize,

    strategy: S,

    _owns: PhantomData<T>,
}

impl<T> Vector<T, Global> {
    /// Creates an empty vector that uses the [`Global`] strategy.
    ///
    /// No memory is allocated until the first element is inserted.
    #[must_use]
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates a builder to configure a new vector.
    ///
    /// # Example
    ///
    /// ```
    /// use strategic_vec::Vector;
    ///
    /// let numbers = Vector::<u32>::builder().capacity(16).build();
    ///
    /// assert_eq!(numbers.capacity(), 16);
    /// ```
    pub fn builder() -> VectorBuilder<T, Global> {
        VectorBuilder::new()
    }
}

impl<T, S: Strategy> Vector<T, S> {
    /// Creates an empty vector that uses the given strategy.
    ///
    /// No memory is allocated until the first element is inserted.
    #[must_use]
    pub fn new_in(strategy: S) -> Self {
        Self {
            start: NonNull::dangling(),
            len: 0,
            capacity: 0,
            strategy,
            _owns: PhantomData,
        }
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of elements the vector can hold without replacing its block.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the vector holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The largest number of elements this vector could ever hold, limited by both the
    /// address space and the strategy's own maximum block size.
    #[must_use]
    pub fn max_size(&self) -> usize {
        max_slots::<T, S>(&self.strategy)
    }

    /// Returns a copy of the strategy the vector uses.
    #[must_use]
    pub fn strategy(&self) -> S {
        self.strategy.clone()
    }

    /// Returns a reference to the element at `index`, or [`Error::OutOfRange`] if there is
    /// no such element.
    ///
    /// Use indexing or [`get_unchecked()`][slice::get_unchecked] when the index is already
    /// known to be valid.
    ///
    /// # Example
    ///
    /// ```
    /// use strategic_vec::{Error, vector};
    ///
    /// let letters = vector!['a', 'b'];
    ///
    /// assert_eq!(letters.at(1), Ok(&'b'));
    /// assert_eq!(letters.at(2), Err(Error::OutOfRange { index: 2, len: 2 }));
    /// ```
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len;

        self.as_slice()
            .get(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    /// Returns an exclusive reference to the element at `index`, or [`Error::OutOfRange`] if
    /// there is no such element.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;

        self.as_mut_slice()
            .get_mut(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    /// The first element, if any.
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// The first element, if any.
    #[must_use]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// The last element, if any.
    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// The last element, if any.
    #[must_use]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Pointer to the first slot of the block.
    ///
    /// The pointer is dangling (but non-null and aligned) while the vector owns no block and
    /// is invalidated by any operation that replaces the block.
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.start.as_ptr()
    }

    /// Mutable pointer to the first slot of the block.
    ///
    /// See [`as_ptr()`][Self::as_ptr] for validity.
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.start.as_ptr()
    }

    /// The live elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: The first `len` slots hold live elements and the pointer is non-null and
        // aligned even when no block is owned.
        unsafe { slice::from_raw_parts(self.start.as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: The first `len` slots hold live elements, we hold an exclusive reference and
        // the pointer is non-null and aligned even when no block is owned.
        unsafe { slice::from_raw_parts_mut(self.start.as_ptr(), self.len) }
    }

    /// Address of slot `index`, which may be one past the end of the block.
    ///
    /// # Panics
    ///
    /// Panics if the index is beyond the end of the block.
    fn slot(&self, index: usize) -> NonNull<T> {
        assert!(
            index <= self.capacity,
            "slot {index} is outside a block of {} slots",
            self.capacity
        );

        // SAFETY: Guarded by the bounds check above.
        unsafe { self.start.add(index) }
    }

    /// The `len` slots starting at `index`, without regard for whether they are live.
    fn slots(&self, index: usize, len: usize) -> RangeView<T> {
        let end = index
            .checked_add(len)
            .expect("slot range end cannot overflow for a range inside an allocation");

        // Validates the end of the range.
        _ = self.slot(end);

        // SAFETY: The whole range is within the block, checked above.
        unsafe { RangeView::from_raw_parts(self.slot(index), len) }
    }

    /// The live elements.
    fn live(&self) -> RangeView<T> {
        self.slots(0, self.len)
    }

    /// The current block as an allocation hint for its replacement.
    fn hint(&self) -> Option<NonNull<T>> {
        (self.capacity > 0).then_some(self.start)
    }

    fn length_exceeded(&self, requested: usize) -> Error {
        Error::LengthExceeded {
            requested,
            max: self.max_size(),
        }
    }

    /// Gives an empty, block-less vector its first block of `capacity` slots.
    fn allocate(&mut self, capacity: usize) -> Result<()> {
        debug_assert_eq!(self.capacity, 0, "only used for first-time sizing");

        self.start = allocate_block(&self.strategy, capacity, None)?;
        self.capacity = capacity;

        Ok(())
    }

    /// Allocates a replacement block of `capacity` slots, hinting the strategy with the
    /// address of the current block.
    fn allocate_tmp(&self, capacity: usize) -> Result<StagingBlock<'_, T, S>> {
        StagingBlock::allocate(&self.strategy, capacity, self.hint())
    }

    /// Destroys every live element, then returns the block to the strategy, leaving the vector
    /// without a block.
    fn release(&mut self) {
        let (start, capacity, len) = (self.start, self.capacity, self.len);

        self.start = NonNull::dangling();
        self.len = 0;
        self.capacity = 0;

        // SAFETY: These were our block and its live elements, and the vector no longer refers to
        // them.
        unsafe {
            self.dispose(start, capacity, len);
        }
    }

    /// Destroys the first `len` elements of a block that the vector no longer refers to, then
    /// returns the block to the strategy. The block goes back even if a destructor panics.
    ///
    /// # Safety
    ///
    /// The block must come from this vector's strategy (or an equal one) with `capacity`
    /// slots, the first `len` of which hold live elements that nothing else will drop.
    unsafe fn dispose(&self, start: NonNull<T>, capacity: usize, len: usize) {
        let strategy = guard(&self.strategy, |strategy| {
            // SAFETY: The caller guarantees the block came from our strategy.
            unsafe {
                deallocate_block(strategy, start, capacity);
            }
        });

        // SAFETY: The caller guarantees the first `len` slots hold live elements.
        let live = unsafe { RangeView::from_raw_parts(start, len) };

        // SAFETY: The caller guarantees nothing else drops them.
        unsafe {
            destroy_range(live, *strategy);
        }
    }

    /// Takes ownership of a committed staging block holding `len` live elements, then releases
    /// the previous block and whatever live elements the vector still claimed in it.
    ///
    /// The new block is in place before any old element is dropped, so a panicking destructor
    /// leaves the vector holding the new contents.
    ///
    /// Callers that relocated the old elements into the new block must set `self.len` to zero
    /// first so that the relocated values are not destroyed twice.
    ///
    /// # Safety
    ///
    /// The block must come from this vector's strategy (or an equal one) with `capacity`
    /// slots, the first `len` of which hold live elements.
    unsafe fn adopt_block(&mut self, (start, capacity): (NonNull<T>, usize), len: usize) {
        debug!(
            old_capacity = self.capacity,
            new_capacity = capacity,
            len,
            "switching to a new block"
        );

        let old_start = mem::replace(&mut self.start, start);
        let old_capacity = mem::replace(&mut self.capacity, capacity);
        let old_len = mem::replace(&mut self.len, len);

        // SAFETY: The old block is no longer referenced and held `old_len` live elements.
        unsafe {
            self.dispose(old_start, old_capacity, old_len);
        }
    }

    /// Hands the block over to `self`, leaving `source` without a block. Any block `self`
    /// still owned is leaked, so callers release it first.
    fn steal_block(&mut self, source: &mut Self) {
        debug_assert_eq!(self.capacity, 0, "the previous block must be released first");

        self.start = source.start;
        self.len = source.len;
        self.capacity = source.capacity;

        source.start = NonNull::dangling();
        source.len = 0;
        source.capacity = 0;
    }

    #[cfg(test)]
    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    pub(crate) fn integrity_check(&self) {
        assert!(self.len <= self.capacity);

        if self.capacity == 0 {
            assert_eq!(self.start, NonNull::dangling());
        }
    }
}

impl<T, S: Strategy> Drop for Vector<T, S> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T, S: Strategy + Default> Default for Vector<T, S> {
    fn default() -> Self {
        Self::new_in(S::default())
    }
}

impl<T, S: Strategy> Deref for Vector<T, S> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, S: Strategy> DerefMut for Vector<T, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T, S: Strategy, I: SliceIndex<[T]>> Index<I> for Vector<T, S> {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, S: Strategy, I: SliceIndex<[T]>> IndexMut<I> for Vector<T, S> {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<T, S: Strategy> AsRef<[T]> for Vector<T, S> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, S: Strategy> AsMut<[T]> for Vector<T, S> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, S: Strategy> fmt::Debug for Vector<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

// SAFETY: The vector exclusively owns its elements and its strategy, so sending it to another
// thread is sound whenever both of those can be sent.
unsafe impl<T: Send, S: Strategy + Send> Send for Vector<T, S> {}

// SAFETY: Shared access to the vector only hands out shared access to the elements and the
// strategy, so sharing is sound whenever both of those can be shared.
unsafe impl<T: Sync, S: Strategy + Sync> Sync for Vector<T, S> {}

/// Swaps the contents of two vectors in constant time.
///
/// See [`Vector::swap_with()`] for the rules on strategies.
///
/// # Panics
///
/// Panics if the strategy does not propagate on swap and the two strategies compare unequal.
pub fn swap<T, S: Strategy>(a: &mut Vector<T, S>, b: &mut Vector<T, S>) {
    a.swap_with(b);
}
