//! Construction of values into uninitialized slots, always through a [`Strategy`].
//!
//! Every function here either constructs all of its values or none of them: if producing a
//! value panics, whatever this call already constructed is destroyed again before the panic
//! continues. Callers therefore only ever need to clean up the block, never a partially
//! constructed run of values.
//!
//! # Re-deriving slot addresses
//!
//! Rust's memory model ties the validity of a pointer to its provenance rather than to "the
//! most recently constructed object at this address", so there is no separate revalidation
//! step for memory that has just been reused. The equivalent obligation is that after a block
//! is replaced, every slot address is derived from the new block's base pointer. The vector
//! never keeps a slot address across a reallocation.

use std::ptr::NonNull;

use scopeguard::guard;

use crate::{RangeView, Strategy};

/// Clones each element of `src` into consecutive slots starting at `dst`, returning the address
/// one past the last constructed slot.
///
/// If a clone panics, the values constructed by this call are destroyed through the strategy
/// before the panic continues.
///
/// # Safety
///
/// `dst` must be the start of at least `src.len()` uninitialized slots that are valid for
/// writes and that do not overlap `src`.
///
/// # Example
///
/// ```
/// use std::mem::MaybeUninit;
/// use std::ptr::NonNull;
///
/// use strategic_vec::{Global, construct_range_copy};
///
/// let source = [String::from("a"), String::from("b")];
/// let mut slots = [const { MaybeUninit::<String>::uninit() }; 2];
/// let dst = NonNull::new(slots.as_mut_ptr().cast::<String>()).unwrap();
///
/// // SAFETY: `slots` has room for both values and does not overlap `source`.
/// let end = unsafe { construct_range_copy(&source, dst, &Global) };
/// assert_eq!(end.as_ptr(), dst.as_ptr().wrapping_add(2));
///
/// // SAFETY: Both slots were constructed above and are dropped exactly once.
/// let copies = unsafe { slots.map(|slot| slot.assume_init()) };
/// assert_eq!(copies, source);
/// ```
pub unsafe fn construct_range_copy<T, S>(src: &[T], dst: NonNull<T>, strategy: &S) -> NonNull<T>
where
    T: Clone,
    S: Strategy,
{
    let mut source = src.iter();

    // SAFETY: The caller guarantees room for `src.len()` values at `dst`.
    let slots = unsafe { RangeView::from_raw_parts(dst, src.len()) };

    // SAFETY: Forwarding the caller's guarantees; the iterator yields exactly one value per slot.
    unsafe {
        construct_fill_with(slots, strategy, || {
            source
                .next()
                .expect("one source element exists for every slot")
                .clone()
        })
    }
}

/// Relocates each value in `src` into consecutive slots starting at `dst` through the
/// strategy's [`construct()`][Strategy::construct] hook, returning the address one past the
/// last constructed slot.
///
/// Afterwards the source slots are logically uninitialized: the caller must neither drop nor
/// read them again. Relocation cannot fail. Only the destination strategy is involved, so the
/// caller reports the vacated source slots to whichever strategy constructed them.
///
/// # Safety
///
/// Every slot in `src` must hold a live value. `dst` must be the start of at least
/// `src.len()` uninitialized slots valid for writes, not overlapping `src`.
pub unsafe fn construct_range_move<T, S>(
    src: RangeView<T>,
    dst: NonNull<T>,
    strategy: &S,
) -> NonNull<T>
where
    S: Strategy,
{
    let mut next_dst = dst;

    for slot in src {
        // SAFETY: The caller guarantees the source slot holds a live value that they will
        // treat as uninitialized from now on, so reading it out transfers ownership.
        let value = unsafe { slot.read() };

        // SAFETY: The caller guarantees the destination slot is valid and uninitialized.
        // The strategy contract guarantees `construct()` does not unwind, so the value we
        // just read cannot be lost or duplicated.
        unsafe {
            strategy.construct(next_dst, value);
        }

        // SAFETY: There is room for `src.len()` values at `dst`.
        next_dst = unsafe { next_dst.add(1) };
    }

    next_dst
}

/// Relocates the values in `src` into `dst`, moving each value when the move cannot fail and
/// copying it otherwise.
///
/// A Rust move is a bitwise relocation that can never fail, so this always moves. Growth paths
/// call this function rather than [`construct_range_move()`] so that the reasoning behind
/// their failure guarantees stays visible: the old block is never left half-emptied by a
/// failed relocation because a relocation never fails.
///
/// # Safety
///
/// Same as [`construct_range_move()`].
pub unsafe fn construct_range_move_or_copy<T, S>(
    src: RangeView<T>,
    dst: NonNull<T>,
    strategy: &S,
) -> NonNull<T>
where
    S: Strategy,
{
    // SAFETY: Forwarding the caller's guarantees.
    unsafe { construct_range_move(src, dst, strategy) }
}

/// Constructs `produce()` into every slot of `slots`, returning the address one past the last
/// slot.
///
/// If `produce` panics, the values constructed by this call are destroyed through the strategy
/// before the panic continues.
///
/// # Safety
///
/// Every slot in `slots` must be uninitialized and valid for writes.
pub unsafe fn construct_fill_with<T, S, F>(
    slots: RangeView<T>,
    strategy: &S,
    mut produce: F,
) -> NonNull<T>
where
    S: Strategy,
    F: FnMut() -> T,
{
    let start = slots.begin();

    // Counts the slots constructed so far. If we unwind, those are destroyed again.
    let mut constructed = guard(0_usize, |constructed| {
        // SAFETY: The constructed slots are a prefix of `slots`.
        let done = unsafe { RangeView::from_raw_parts(start, constructed) };

        // SAFETY: Exactly the first `constructed` slots hold values created by this call.
        unsafe {
            destroy_range(done, strategy);
        }
    });

    for slot in slots {
        let value = produce();

        // SAFETY: The caller guarantees the slot is valid and uninitialized.
        unsafe {
            strategy.construct(slot, value);
        }

        *constructed = constructed.wrapping_add(1);
    }

    // The values now belong to the caller.
    scopeguard::ScopeGuard::into_inner(constructed);

    slots.end()
}

/// Destroys the values in every slot of `slots` through the strategy, front to back.
///
/// If dropping one of the values panics, the remaining values are still destroyed while
/// unwinding.
///
/// # Safety
///
/// Every slot in `slots` must hold a live value that nothing else will drop.
pub(crate) unsafe fn destroy_range<T, S>(slots: RangeView<T>, strategy: &S)
where
    S: Strategy,
{
    let mut remaining = guard(slots, |remaining| {
        for slot in remaining {
            // SAFETY: Forwarding the caller's guarantees for the slots not yet visited.
            unsafe {
                strategy.destroy(slot);
            }
        }
    });

    for slot in &mut *remaining {
        // SAFETY: The caller guarantees the slot holds a live value nobody else drops.
        unsafe {
            strategy.destroy(slot);
        }
    }
}

/// Relocates the values in `src` into consecutive slots starting at `dst`, reporting each
/// vacated source slot to `from` and each new slot to `to`. Returns the address one past the
/// last constructed slot.
///
/// # Safety
///
/// Same as [`construct_range_move()`]. The values in `src` must have been constructed through
/// `from` or a strategy equal to it.
pub(crate) unsafe fn relocate_range<T, S>(
    src: RangeView<T>,
    dst: NonNull<T>,
    from: &S,
    to: &S,
) -> NonNull<T>
where
    S: Strategy,
{
    // SAFETY: Forwarding the caller's guarantees.
    let end = unsafe { construct_range_move_or_copy(src, dst, to) };

    for slot in src {
        from.forget(slot);
    }

    end
}

/// Shifts `count` live values starting at `from` to start at `to` instead, one value at a time
/// through the strategy. The ranges may overlap.
///
/// # Safety
///
/// Both ranges must lie within the same block, the source must hold live values constructed
/// through `strategy` and the parts of the destination outside the source must be
/// uninitialized.
pub(crate) unsafe fn shift<T, S>(
    from: NonNull<T>,
    to: NonNull<T>,
    count: usize,
    strategy: &S,
) where
    S: Strategy,
{
    // Moving towards the front, the front value goes first. Moving towards the back, the back
    // value goes first. Either way a destination slot is vacated before it is written.
    let towards_front = to < from;

    for step in 0..count {
        let offset = if towards_front {
            step
        } else {
            count.wrapping_sub(step).wrapping_sub(1)
        };

        // SAFETY: `offset < count` and the caller guarantees both ranges are in the block.
        let source = unsafe { from.add(offset) };
        // SAFETY: As above.
        let target = unsafe { to.add(offset) };

        // SAFETY: The source slot holds a live value. The slot is vacated right after.
        let value = unsafe { source.read() };
        strategy.forget(source);

        // SAFETY: The target slot is either outside the source range or was vacated earlier in
        // this loop. `construct()` does not unwind, so the value cannot be lost.
        unsafe {
            strategy.construct(target, value);
        }
    }
}
