//! Instrumented strategies and element types shared by the unit tests.
#![allow(
    clippy::arithmetic_side_effects,
    reason = "we do not need to worry about these things when writing test code"
)]

use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;
use std::rc::Rc;

use crate::{AllocError, Global, Strategy};

/// What a family of equal [`TrackingStrategy`] instances has observed.
#[derive(Debug, Default)]
pub(crate) struct Stats {
    allocations: Cell<usize>,
    deallocations: Cell<usize>,
    constructs: Cell<usize>,
    destroys: Cell<usize>,
    forgets: Cell<usize>,
    last_hint: Cell<Option<usize>>,
    remaining_allocations: Cell<Option<usize>>,
    max_bytes: Cell<Option<usize>>,
}

impl Stats {
    pub(crate) fn allocations(&self) -> usize {
        self.allocations.get()
    }

    pub(crate) fn deallocations(&self) -> usize {
        self.deallocations.get()
    }

    /// Blocks allocated but not yet released. Goes negative if a block is released through a
    /// strategy that did not allocate it.
    pub(crate) fn live_blocks(&self) -> isize {
        let allocations = isize::try_from(self.allocations()).unwrap();
        let deallocations = isize::try_from(self.deallocations()).unwrap();

        allocations - deallocations
    }

    pub(crate) fn constructs(&self) -> usize {
        self.constructs.get()
    }

    pub(crate) fn destroys(&self) -> usize {
        self.destroys.get()
    }

    pub(crate) fn forgets(&self) -> usize {
        self.forgets.get()
    }

    /// Values constructed but neither destroyed nor moved out yet. Matches the length of every
    /// vector using this family of strategies.
    pub(crate) fn live_values(&self) -> isize {
        let constructs = isize::try_from(self.constructs()).unwrap();
        let destroys = isize::try_from(self.destroys()).unwrap();
        let forgets = isize::try_from(self.forgets()).unwrap();

        constructs - destroys - forgets
    }

    pub(crate) fn last_hint(&self) -> Option<usize> {
        self.last_hint.get()
    }

    /// Lets `count` more allocations succeed, then fails every following one.
    pub(crate) fn fail_after(&self, count: usize) {
        self.remaining_allocations.set(Some(count));
    }

    /// Lifts any limit set by [`fail_after()`][Self::fail_after].
    pub(crate) fn stop_failing(&self) {
        self.remaining_allocations.set(None);
    }

    /// Makes the strategy report (and enforce) a maximum block size.
    pub(crate) fn limit_bytes(&self, max_bytes: usize) {
        self.max_bytes.set(Some(max_bytes));
    }
}

/// A strategy that forwards to [`Global`] and counts everything that passes through it.
///
/// Instances created with the same identity share their [`Stats`] and compare equal; instances
/// with different identities compare unequal. A block released through an instance that did not
/// allocate it therefore shows up as a negative [`Stats::live_blocks()`] on one side.
///
/// `PROPAGATE` sets all three propagation flags at once.
#[derive(Clone, Debug)]
pub(crate) struct TrackingStrategy<const PROPAGATE: bool> {
    identity: u32,
    stats: Rc<Stats>,
}

impl<const PROPAGATE: bool> TrackingStrategy<PROPAGATE> {
    pub(crate) fn new(identity: u32) -> Self {
        Self {
            identity,
            stats: Rc::new(Stats::default()),
        }
    }

    pub(crate) fn stats(&self) -> &Stats {
        &self.stats
    }
}

impl<const PROPAGATE: bool> PartialEq for TrackingStrategy<PROPAGATE> {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

// SAFETY: Memory comes from `Global`; construction and destruction are the default behavior
// plus counting, which cannot unwind.
unsafe impl<const PROPAGATE: bool> Strategy for TrackingStrategy<PROPAGATE> {
    const PROPAGATE_ON_COPY: bool = PROPAGATE;
    const PROPAGATE_ON_MOVE: bool = PROPAGATE;
    const PROPAGATE_ON_SWAP: bool = PROPAGATE;

    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.allocate_near(layout, None)
    }

    fn allocate_near(
        &self,
        layout: Layout,
        hint: Option<NonNull<u8>>,
    ) -> Result<NonNull<u8>, AllocError> {
        self.stats.last_hint.set(hint.map(|hint| hint.as_ptr().addr()));

        if layout.size() > self.max_bytes() {
            return Err(AllocError);
        }

        match self.stats.remaining_allocations.get() {
            Some(0) => return Err(AllocError),
            Some(remaining) => self.stats.remaining_allocations.set(Some(remaining - 1)),
            None => {}
        }

        let block = Global.allocate(layout)?;
        self.stats.allocations.set(self.stats.allocations() + 1);
        Ok(block)
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout) {
        self.stats.deallocations.set(self.stats.deallocations() + 1);

        // SAFETY: Forwarding the caller's guarantees; all memory came from `Global`.
        unsafe {
            Global.deallocate(block, layout);
        }
    }

    unsafe fn construct<T>(&self, slot: NonNull<T>, value: T) {
        self.stats.constructs.set(self.stats.constructs() + 1);

        // SAFETY: Forwarding the caller's guarantees.
        unsafe {
            slot.write(value);
        }
    }

    unsafe fn destroy<T>(&self, slot: NonNull<T>) {
        self.stats.destroys.set(self.stats.destroys() + 1);

        // SAFETY: Forwarding the caller's guarantees.
        unsafe {
            slot.drop_in_place();
        }
    }

    fn forget<T>(&self, _slot: NonNull<T>) {
        self.stats.forgets.set(self.stats.forgets() + 1);
    }

    fn max_bytes(&self) -> usize {
        self.stats
            .max_bytes
            .get()
            .unwrap_or(isize::MAX.unsigned_abs())
    }
}

/// An element whose clones draw from a shared budget and panic once it runs out.
#[derive(Debug)]
pub(crate) struct Fragile {
    pub(crate) value: u32,
    budget: Rc<Cell<usize>>,
}

impl Fragile {
    pub(crate) fn new(value: u32, budget: &Rc<Cell<usize>>) -> Self {
        Self {
            value,
            budget: Rc::clone(budget),
        }
    }

    /// Creates `count` elements valued `0..count` sharing a budget of `clones` clones.
    pub(crate) fn batch(count: u32, clones: usize) -> (Vec<Self>, Rc<Cell<usize>>) {
        let budget = Rc::new(Cell::new(clones));
        let items = (0..count).map(|value| Self::new(value, &budget)).collect();
        (items, budget)
    }
}

impl Clone for Fragile {
    fn clone(&self) -> Self {
        let remaining = self.budget.get();
        assert!(remaining > 0, "clone budget exhausted");
        self.budget.set(remaining - 1);

        Self {
            value: self.value,
            budget: Rc::clone(&self.budget),
        }
    }
}

impl PartialEq for Fragile {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// Values of a vector of [`Fragile`] elements, for comparisons.
pub(crate) fn values_of<'a>(items: impl IntoIterator<Item = &'a Fragile>) -> Vec<u32> {
    items.into_iter().map(|item| item.value).collect()
}

/// An element that counts how many times any member of its family has been dropped.
#[derive(Debug)]
pub(crate) struct DropCounter {
    drops: Rc<Cell<usize>>,
}

impl DropCounter {
    pub(crate) fn new_shared() -> Rc<Cell<usize>> {
        Rc::new(Cell::new(0))
    }

    pub(crate) fn new(drops: &Rc<Cell<usize>>) -> Self {
        Self {
            drops: Rc::clone(drops),
        }
    }
}

impl Clone for DropCounter {
    fn clone(&self) -> Self {
        Self::new(&self.drops)
    }
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

/// An element that panics when dropped while its value is the poisoned one. The first such
/// panic clears the poison.
#[derive(Clone, Debug)]
pub(crate) struct Landmine {
    pub(crate) value: u32,
    poisoned: Rc<Cell<Option<u32>>>,
}

impl Landmine {
    pub(crate) fn new(value: u32, poisoned: &Rc<Cell<Option<u32>>>) -> Self {
        Self {
            value,
            poisoned: Rc::clone(poisoned),
        }
    }
}

impl Drop for Landmine {
    fn drop(&mut self) {
        if self.poisoned.get() == Some(self.value) {
            self.poisoned.set(None);
            panic!("stepped on {}", self.value);
        }
    }
}
