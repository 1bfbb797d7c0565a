use std::alloc::Layout;
use std::mem;
use std::ptr::NonNull;

use tracing::trace;

use crate::{Error, RangeView, Result, Strategy};

/// The largest number of `T` slots a block under `strategy` can ever have.
pub(crate) fn max_slots<T, S: Strategy>(strategy: &S) -> usize {
    let item_size = size_of::<T>();

    if item_size == 0 {
        return usize::MAX;
    }

    let by_address_space = isize::MAX.unsigned_abs().div_euclid(item_size);
    let by_strategy = strategy.max_bytes().div_euclid(item_size);

    by_address_space.min(by_strategy)
}

/// Allocates a block of `capacity` slots of `T` through `strategy`.
///
/// Zero-byte blocks (no slots or a zero-sized `T`) are never requested from the strategy.
/// A failure is reported as [`Error::LengthExceeded`] if the request could never have been
/// satisfied and passed through as [`Error::Allocation`] otherwise.
pub(crate) fn allocate_block<T, S: Strategy>(
    strategy: &S,
    capacity: usize,
    hint: Option<NonNull<T>>,
) -> Result<NonNull<T>> {
    let max = max_slots::<T, S>(strategy);

    let Ok(layout) = Layout::array::<T>(capacity) else {
        return Err(Error::LengthExceeded {
            requested: capacity,
            max,
        });
    };

    if layout.size() == 0 {
        return Ok(NonNull::dangling());
    }

    match strategy.allocate_near(layout, hint.map(NonNull::cast)) {
        Ok(block) => {
            trace!(capacity, bytes = layout.size(), "allocated block");
            Ok(block.cast())
        }
        Err(_) if capacity > max => Err(Error::LengthExceeded {
            requested: capacity,
            max,
        }),
        Err(error) => Err(Error::Allocation(error)),
    }
}

/// Releases a block previously obtained from [`allocate_block()`] without touching its slots.
///
/// # Safety
///
/// The block must have been allocated with `capacity` slots by `strategy` or an equal
/// strategy, and must not be used afterwards.
pub(crate) unsafe fn deallocate_block<T, S: Strategy>(
    strategy: &S,
    block: NonNull<T>,
    capacity: usize,
) {
    let layout = Layout::array::<T>(capacity)
        .expect("the layout was valid when the block was allocated, so it still is");

    if layout.size() == 0 {
        return;
    }

    trace!(capacity, bytes = layout.size(), "releasing block");

    // SAFETY: Forwarding the caller's guarantees.
    unsafe {
        strategy.deallocate(block.cast(), layout);
    }
}

/// A freshly allocated block that a reallocating operation fills before swapping it in.
///
/// The block does not own any values: whoever constructs values into it is responsible for
/// them until [`commit()`][Self::commit]. If the staging block is dropped without being
/// committed, for example while unwinding, the memory is released and the container that was
/// being modified stays untouched.
#[derive(Debug)]
pub(crate) struct StagingBlock<'s, T, S: Strategy> {
    start: NonNull<T>,
    capacity: usize,
    strategy: &'s S,
}

impl<'s, T, S: Strategy> StagingBlock<'s, T, S> {
    pub(crate) fn allocate(
        strategy: &'s S,
        capacity: usize,
        hint: Option<NonNull<T>>,
    ) -> Result<Self> {
        let start = allocate_block(strategy, capacity, hint)?;

        Ok(Self {
            start,
            capacity,
            strategy,
        })
    }

    pub(crate) fn strategy(&self) -> &'s S {
        self.strategy
    }

    /// Address of slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if the index is beyond the end of the block.
    pub(crate) fn slot(&self, index: usize) -> NonNull<T> {
        assert!(
            index <= self.capacity,
            "slot {index} is outside a staging block of {} slots",
            self.capacity
        );

        // SAFETY: Guarded by the bounds check above.
        unsafe { self.start.add(index) }
    }

    /// The `len` slots starting at `index`.
    pub(crate) fn slots(&self, index: usize, len: usize) -> RangeView<T> {
        let end = index
            .checked_add(len)
            .expect("slot range end cannot overflow for a range inside an allocation");

        // Validates the end of the range.
        _ = self.slot(end);

        // SAFETY: The whole range is within the block, checked above.
        unsafe { RangeView::from_raw_parts(self.slot(index), len) }
    }

    /// Hands the block over to the caller, who becomes responsible for releasing it.
    #[must_use]
    pub(crate) fn commit(self) -> (NonNull<T>, usize) {
        let parts = (self.start, self.capacity);
        mem::forget(self);
        parts
    }
}

impl<T, S: Strategy> Drop for StagingBlock<'_, T, S> {
    fn drop(&mut self) {
        // SAFETY: The block was allocated by this strategy and was not committed, so nothing
        // else refers to it any more.
        unsafe {
            deallocate_block(self.strategy, self.start, self.capacity);
        }
    }
}
