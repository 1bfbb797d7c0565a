use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

use crate::AllocError;

/// The capability a [`Vector`][crate::Vector] uses to obtain memory and to construct and
/// destroy elements in that memory.
///
/// A strategy is held by value inside each vector. Two strategies compare equal when a block
/// allocated through one of them may be released through the other; the vector consults this
/// whenever it considers handing a block from one instance to another. The `PROPAGATE_ON_*`
/// constants declare whether the strategy travels along with the contents when a vector is
/// copied from, moved from or swapped with another vector.
///
/// Every value the vector places into a slot passes through [`construct()`][Self::construct].
/// Every value that leaves a slot either passes through [`destroy()`][Self::destroy], when it
/// is dropped, or is reported to [`forget()`][Self::forget], when it is moved out. A value moved
/// out may go to a new slot (growth, insertion and removal shift elements around) or to the
/// caller (`pop()`, owning iteration). Instrumented or arena-style strategies therefore see
/// exactly one `destroy()` or `forget()` for every `construct()`.
///
/// # Safety
///
/// Implementations must uphold the following:
///
/// 1. A block returned by [`allocate()`][Self::allocate] or
///    [`allocate_near()`][Self::allocate_near] is valid for reads and writes of the requested
///    layout until it is passed to [`deallocate()`][Self::deallocate] of this strategy or of
///    any strategy that compares equal to it.
/// 2. [`construct()`][Self::construct] leaves the slot holding exactly the value it was given
///    and does not unwind. The vector relies on this when it relocates values: a value that
///    has been read out of its old slot must reach its new slot.
/// 3. [`destroy()`][Self::destroy] drops the value in the slot exactly once.
/// 4. [`forget()`][Self::forget] neither reads nor drops the slot.
/// 5. Equality is an equivalence relation that does not change over the lifetime of the
///    instances involved.
///
/// # Example
///
/// ```
/// use std::alloc::Layout;
/// use std::cell::Cell;
/// use std::ptr::NonNull;
/// use std::rc::Rc;
///
/// use strategic_vec::{AllocError, Global, Strategy, Vector};
///
/// #[derive(Clone, Debug, Default, PartialEq)]
/// struct Counting {
///     allocations: Rc<Cell<usize>>,
/// }
///
/// // SAFETY: All memory comes from `Global`, which upholds the contract for us.
/// unsafe impl Strategy for Counting {
///     fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
///         self.allocations.set(self.allocations.get() + 1);
///         Global.allocate(layout)
///     }
///
///     unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout) {
///         // SAFETY: Forwarding the caller's guarantees.
///         unsafe { Global.deallocate(block, layout) }
///     }
/// }
///
/// let strategy = Counting::default();
/// let mut numbers = Vector::new_in(strategy.clone());
/// numbers.push(1);
/// numbers.push(2);
///
/// assert_eq!(strategy.allocations.get(), 2);
/// ```
pub unsafe trait Strategy: Clone + PartialEq {
    /// Whether a vector that is assigned a copy of another vector also adopts the other
    /// vector's strategy.
    const PROPAGATE_ON_COPY: bool = false;

    /// Whether a vector that takes over the contents of another vector also adopts the other
    /// vector's strategy.
    const PROPAGATE_ON_MOVE: bool = false;

    /// Whether swapping two vectors also swaps their strategies.
    const PROPAGATE_ON_SWAP: bool = false;

    /// Whether every instance of this strategy compares equal to every other instance.
    const IS_ALWAYS_EQUAL: bool = false;

    /// Allocates a block of memory for `layout`.
    ///
    /// The vector never asks for a zero-sized block.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Allocates a block of memory for `layout`, given the address of the block it is going
    /// to replace.
    ///
    /// Strategies that can grow blocks in place may use the hint to prefer memory adjacent to
    /// the existing block. The default implementation ignores the hint.
    fn allocate_near(
        &self,
        layout: Layout,
        hint: Option<NonNull<u8>>,
    ) -> Result<NonNull<u8>, AllocError> {
        _ = hint;
        self.allocate(layout)
    }

    /// Releases a block of memory.
    ///
    /// # Safety
    ///
    /// The block must have been allocated with `layout` by this strategy or by a strategy
    /// that compares equal to it, and must not have been released already.
    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout);

    /// Moves `value` into the uninitialized `slot`.
    ///
    /// # Safety
    ///
    /// The slot must be valid for writes, properly aligned and must not hold a live value.
    unsafe fn construct<T>(&self, slot: NonNull<T>, value: T) {
        // SAFETY: Forwarding the caller's guarantees.
        unsafe {
            slot.write(value);
        }
    }

    /// Drops the value in `slot`, leaving the slot uninitialized.
    ///
    /// # Safety
    ///
    /// The slot must hold a live value that nothing else will drop.
    unsafe fn destroy<T>(&self, slot: NonNull<T>) {
        // SAFETY: Forwarding the caller's guarantees.
        unsafe {
            ptr::drop_in_place(slot.as_ptr());
        }
    }

    /// Notes that the value in `slot` has been moved out without being dropped. The slot is
    /// uninitialized afterwards.
    ///
    /// The value was constructed through this strategy or an equal one. It now lives on in
    /// another slot, which was reported to [`construct()`][Self::construct], or belongs to the
    /// caller of the operation that moved it out. The default implementation does nothing.
    fn forget<T>(&self, slot: NonNull<T>) {
        _ = slot;
    }

    /// The largest block size in bytes this strategy can ever provide.
    #[must_use]
    fn max_bytes(&self) -> usize {
        isize::MAX.unsigned_abs()
    }

    /// Returns the strategy a freshly copied vector should use.
    #[must_use]
    fn select_on_copy(&self) -> Self {
        self.clone()
    }
}

/// The default strategy, backed by the global Rust allocator.
///
/// All instances are interchangeable.
#[expect(clippy::exhaustive_structs, reason = "intentionally an empty struct")]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Global;

// SAFETY: Memory comes straight from the global allocator, which upholds the block validity
// requirements, and all instances share that allocator so equality is trivially correct.
// Element construction and destruction use the default implementations.
unsafe impl Strategy for Global {
    const IS_ALWAYS_EQUAL: bool = true;

    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() > 0, "zero-sized blocks are never requested");

        // SAFETY: The layout is not zero-sized, as guaranteed by the vector.
        NonNull::new(unsafe { alloc::alloc(layout) }).ok_or(AllocError)
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout) {
        // SAFETY: The caller guarantees the block came from `alloc()` with this layout.
        unsafe {
            alloc::dealloc(block.as_ptr(), layout);
        }
    }
}
