use std::mem;

use crate::construct::relocate_range;
use crate::{Result, Strategy, Vector, construct_range_copy, or_panic, zip_foreach};

impl<T, S: Strategy> Vector<T, S> {
    /// Replaces the contents with clones of `values`, keeping the strategy.
    ///
    /// Existing elements are overwritten through [`Clone::clone_from()`] where possible, so
    /// their resources may be reused. If `values` does not fit into the current block, a new
    /// block is built from scratch first and the old contents are dropped only once it is
    /// complete.
    ///
    /// # Panics
    ///
    /// Panics if the vector needs to grow and the strategy cannot provide the new block.
    pub fn assign_from_slice(&mut self, values: &[T])
    where
        T: Clone,
    {
        or_panic(self.try_assign_from_slice(values));
    }

    /// Replaces the contents with clones of `values`, keeping the strategy.
    ///
    /// See [`assign_from_slice()`][Self::assign_from_slice].
    pub fn try_assign_from_slice(&mut self, values: &[T]) -> Result<()>
    where
        T: Clone,
    {
        if values.len() > self.capacity {
            let staging = self.allocate_tmp(values.len())?;

            // SAFETY: The staging block has room for all the values and cannot overlap them.
            unsafe {
                construct_range_copy(values, staging.slot(0), staging.strategy());
            }

            let parts = staging.commit();

            // SAFETY: The block came from our strategy and now holds clones of every value.
            // The old elements are still claimed by `self.len` and are dropped here.
            unsafe {
                self.adopt_block(parts, values.len());
            }

            return Ok(());
        }

        self.truncate(values.len());

        let (shared, rest) = values.split_at(self.len);

        zip_foreach(self.iter_mut(), (shared,), |target, (value,)| {
            target.clone_from(value);
        });

        // SAFETY: The spare slots after `len` have room for the rest and cannot overlap them.
        unsafe {
            construct_range_copy(rest, self.slot(self.len), &self.strategy);
        }

        self.len = values.len();

        Ok(())
    }

    /// Moves the contents of `source` into `self`, replacing whatever `self` held. `source` is
    /// left empty but usable.
    ///
    /// If the strategy propagates on move, `self` adopts both the block and the strategy of
    /// `source`. Otherwise, if the two strategies compare equal, `self` adopts the block and
    /// keeps its own strategy. Otherwise the elements are moved one by one into memory owned
    /// by `self`'s strategy and `source` keeps its block.
    ///
    /// # Panics
    ///
    /// Panics if elements need to be moved one by one, `self` needs to grow and its strategy
    /// cannot provide the new block.
    pub fn move_from(&mut self, source: &mut Self) {
        or_panic(self.try_move_from(source));
    }

    /// Moves the contents of `source` into `self`, replacing whatever `self` held.
    ///
    /// See [`move_from()`][Self::move_from]. On failure neither vector is changed.
    pub fn try_move_from(&mut self, source: &mut Self) -> Result<()> {
        if S::PROPAGATE_ON_MOVE {
            self.release();
            self.strategy = source.strategy.clone();
            self.steal_block(source);
        } else if S::IS_ALWAYS_EQUAL || self.strategy == source.strategy {
            self.release();
            self.steal_block(source);
        } else {
            self.move_elements_from(source)?;
        }

        Ok(())
    }

    /// Moves every element of `source` into `self`'s own memory, overwriting the elements
    /// `self` already holds.
    fn move_elements_from(&mut self, source: &mut Self) -> Result<()> {
        let count = source.len;

        if count > self.capacity {
            let staging = self.allocate_tmp(count)?;

            // SAFETY: The source elements are live and the staging slots are uninitialized.
            unsafe {
                relocate_range(
                    source.live(),
                    staging.slot(0),
                    &source.strategy,
                    staging.strategy(),
                );
            }

            // The elements now live in the staging block.
            source.len = 0;

            let parts = staging.commit();

            // SAFETY: The block came from our strategy and holds `count` live elements.
            unsafe {
                self.adopt_block(parts, count);
            }

            return Ok(());
        }

        self.truncate(count);

        let shared = self.len;
        let moved_in = source.slots(0, shared);
        let rest = source.slots(shared, count.wrapping_sub(shared));

        // From here on the source elements belong to `self`. If an assignment below panics,
        // the ones not yet moved are leaked rather than dropped twice.
        source.len = 0;

        let source_strategy = &source.strategy;

        zip_foreach(self.iter_mut(), (moved_in,), |target, (slot,)| {
            // SAFETY: Each source slot holds a live element that nothing else will read.
            *target = unsafe { slot.read() };
            source_strategy.forget(slot);
        });

        // SAFETY: The remaining source elements are live and the target slots are spare.
        unsafe {
            relocate_range(rest, self.slot(shared), source_strategy, &self.strategy);
        }

        self.len = count;

        Ok(())
    }

    /// Exchanges the contents of two vectors in constant time, without moving any elements.
    ///
    /// If the strategy propagates on swap, the strategies are exchanged as well. Otherwise
    /// each vector keeps its own strategy, which is only sound if the two are equal.
    ///
    /// # Panics
    ///
    /// Panics if the strategy does not propagate on swap and the two strategies compare
    /// unequal. Neither vector is changed in that case.
    pub fn swap_with(&mut self, other: &mut Self) {
        if S::PROPAGATE_ON_SWAP {
            mem::swap(&mut self.strategy, &mut other.strategy);
        } else {
            assert!(
                S::IS_ALWAYS_EQUAL || self.strategy == other.strategy,
                "cannot swap vectors whose strategies are unequal and do not propagate on swap"
            );
        }

        mem::swap(&mut self.start, &mut other.start);
        mem::swap(&mut self.len, &mut other.len);
        mem::swap(&mut self.capacity, &mut other.capacity);
    }
}

impl<T: Clone, S: Strategy> Clone for Vector<T, S> {
    /// Creates an independent copy with clones of every element, using the strategy returned
    /// by [`Strategy::select_on_copy()`].
    ///
    /// # Panics
    ///
    /// Panics if the strategy cannot provide the new block.
    fn clone(&self) -> Self {
        self.clone_in(self.strategy.select_on_copy())
    }

    /// Replaces the contents of `self` with clones of the elements of `source`.
    ///
    /// If the strategy propagates on copy, `self` adopts `source`'s strategy (releasing its
    /// own memory first if the strategies differ). Existing elements are reused where
    /// possible, see [`assign_from_slice()`][Vector::assign_from_slice].
    fn clone_from(&mut self, source: &Self) {
        if S::PROPAGATE_ON_COPY {
            if !S::IS_ALWAYS_EQUAL && self.strategy != source.strategy {
                self.release();
            }

            self.strategy = source.strategy.clone();
        }

        self.assign_from_slice(source.as_slice());
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(
        clippy::indexing_slicing,
        reason = "we do not need to worry about these things when writing test code"
    )]

    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    use crate::testing::{DropCounter, Fragile, Landmine, TrackingStrategy, values_of};
    use crate::{Vector, swap};

    #[test]
    fn clone_is_independent() {
        let original = Vector::from_slice(&[String::from("a"), String::from("b")]);

        let mut copy = original.clone();
        copy[0].push('!');
        copy.push(String::from("c"));

        assert_eq!(original, ["a", "b"]);
        assert_eq!(copy, ["a!", "b", "c"]);
        assert_ne!(original.as_ptr(), copy.as_ptr());
    }

    #[test]
    fn clone_from_reuses_block_when_it_fits() {
        let source = Vector::from_slice(&[1, 2]);
        let mut target = Vector::from_slice(&[9, 9, 9, 9]);
        let start = target.as_ptr();

        target.clone_from(&source);

        assert_eq!(target, [1, 2]);
        assert_eq!(target.as_ptr(), start);
        assert_eq!(target.capacity(), 4);
    }

    #[test]
    fn clone_from_extends_within_capacity() {
        let source = Vector::from_slice(&[1, 2, 3]);
        let mut target = Vector::from_slice(&[9]);
        target.reserve(3);

        target.clone_from(&source);

        assert_eq!(target, [1, 2, 3]);
    }

    #[test]
    fn clone_from_grows_when_needed() {
        let source = Vector::from_slice(&[1, 2, 3]);
        let mut target = Vector::from_slice(&[9]);

        target.clone_from(&source);

        assert_eq!(target, [1, 2, 3]);
        assert_eq!(target.capacity(), 3);
    }

    #[test]
    fn clone_from_propagating_adopts_strategy() {
        let source = Vector::from_slice_in(&[1, 2], TrackingStrategy::<true>::new(1));
        let mut target = Vector::from_slice_in(&[7, 8, 9], TrackingStrategy::<true>::new(2));
        let target_strategy = target.strategy();

        target.clone_from(&source);

        assert_eq!(target, [1, 2]);
        assert!(target.strategy() == source.strategy());
        assert_eq!(target_strategy.stats().live_blocks(), 0);

        drop(target);
        assert_eq!(source.strategy().stats().live_blocks(), 1);
    }

    #[test]
    fn clone_from_non_propagating_keeps_strategy() {
        let source = Vector::from_slice_in(&[1, 2], TrackingStrategy::<false>::new(1));
        let mut target = Vector::from_slice_in(&[7], TrackingStrategy::<false>::new(2));

        target.clone_from(&source);

        assert_eq!(target, [1, 2]);
        assert!(target.strategy() != source.strategy());
    }

    #[test]
    fn failed_growth_in_assign_keeps_contents() {
        let strategy = TrackingStrategy::<false>::new(1);
        let mut target = Vector::from_slice_in(&[7], strategy.clone());
        strategy.stats().fail_after(0);

        assert!(target.try_assign_from_slice(&[1, 2, 3]).is_err());
        assert_eq!(target, [7]);
    }

    #[test]
    fn panicking_clone_during_growing_assign_keeps_contents() {
        let (items, budget) = Fragile::batch(3, 0);
        let mut target = Vector::new();
        let (old, _old_budget) = Fragile::batch(1, 0);
        for item in old {
            target.push(item);
        }
        budget.set(2);

        let result = catch_unwind(AssertUnwindSafe(|| {
            target.assign_from_slice(&items);
        }));

        assert!(result.is_err());
        assert_eq!(values_of(&target), [0]);
        assert_eq!(target.capacity(), 1);
    }

    #[test]
    fn panicking_destructor_during_growing_assign_keeps_new_contents() {
        let strategy = TrackingStrategy::<false>::new(1);
        let poisoned = Rc::new(Cell::new(None));
        let mut target = Vector::new_in(strategy.clone());
        target.push(Landmine::new(0, &poisoned));
        let values: Vec<Landmine> = (1..4).map(|value| Landmine::new(value, &poisoned)).collect();
        poisoned.set(Some(0));

        let result = catch_unwind(AssertUnwindSafe(|| {
            target.assign_from_slice(&values);
        }));

        assert!(result.is_err());
        assert_eq!(
            target.iter().map(|item| item.value).collect::<Vec<_>>(),
            [1, 2, 3]
        );
        assert_eq!(target.capacity(), 3);
        assert_eq!(strategy.stats().live_blocks(), 1);
        assert_eq!(strategy.stats().live_values(), 3);
        target.integrity_check();
    }

    #[test]
    fn panicking_destructor_during_growing_move_keeps_new_contents() {
        let source_strategy = TrackingStrategy::<false>::new(1);
        let target_strategy = TrackingStrategy::<false>::new(2);
        let poisoned = Rc::new(Cell::new(None));

        let mut source = Vector::new_in(source_strategy.clone());
        source.reserve(3);
        for value in 1..4 {
            source.push(Landmine::new(value, &poisoned));
        }
        let mut target = Vector::new_in(target_strategy.clone());
        target.push(Landmine::new(0, &poisoned));
        poisoned.set(Some(0));

        let result = catch_unwind(AssertUnwindSafe(|| {
            target.move_from(&mut source);
        }));

        assert!(result.is_err());
        assert_eq!(
            target.iter().map(|item| item.value).collect::<Vec<_>>(),
            [1, 2, 3]
        );
        assert!(source.is_empty());
        assert_eq!(target_strategy.stats().live_blocks(), 1);
        assert_eq!(target_strategy.stats().live_values(), 3);
        assert_eq!(source_strategy.stats().live_values(), 0);

        drop(source);
        drop(target);

        assert_eq!(source_strategy.stats().live_blocks(), 0);
        assert_eq!(target_strategy.stats().live_blocks(), 0);
    }

    #[test]
    fn move_from_equal_strategies_steals_block() {
        let strategy = TrackingStrategy::<false>::new(1);
        let mut source = Vector::from_slice_in(&[1, 2, 3], strategy.clone());
        let mut target = Vector::from_slice_in(&[9], strategy.clone());
        let start = source.as_ptr();

        target.move_from(&mut source);

        assert_eq!(target, [1, 2, 3]);
        assert_eq!(target.as_ptr(), start);
        assert!(source.is_empty());
        assert_eq!(source.capacity(), 0);
        assert_eq!(strategy.stats().live_blocks(), 1);
    }

    #[test]
    fn move_from_propagating_adopts_strategy() {
        let mut source = Vector::from_slice_in(&[1, 2], TrackingStrategy::<true>::new(1));
        let mut target = Vector::from_slice_in(&[9], TrackingStrategy::<true>::new(2));
        let target_strategy = target.strategy();

        target.move_from(&mut source);

        assert_eq!(target, [1, 2]);
        assert!(target.strategy() == source.strategy());
        assert_eq!(target_strategy.stats().live_blocks(), 0);
        assert!(source.is_empty());
    }

    #[test]
    fn move_from_unequal_strategies_moves_elements() {
        let source_strategy = TrackingStrategy::<false>::new(1);
        let target_strategy = TrackingStrategy::<false>::new(2);
        let drops = DropCounter::new_shared();

        let mut source = Vector::new_in(source_strategy.clone());
        for _ in 0..3 {
            source.push(DropCounter::new(&drops));
        }
        let mut target = Vector::new_in(target_strategy.clone());
        target.push(DropCounter::new(&drops));

        target.move_from(&mut source);

        // Only the element target held before was dropped.
        assert_eq!(drops.get(), 1);
        assert_eq!(target.len(), 3);
        assert!(source.is_empty());
        assert_eq!(source.capacity(), 3);
        assert!(target.strategy() == target_strategy);

        drop(source);
        drop(target);

        assert_eq!(drops.get(), 4);
        assert_eq!(source_strategy.stats().live_blocks(), 0);
        assert_eq!(target_strategy.stats().live_blocks(), 0);
        assert_eq!(source_strategy.stats().live_values(), 0);
        assert_eq!(target_strategy.stats().live_values(), 0);
    }

    #[test]
    fn move_from_unequal_strategies_into_larger_block() {
        let source_strategy = TrackingStrategy::<false>::new(1);
        let target_strategy = TrackingStrategy::<false>::new(2);
        let mut source = Vector::from_slice_in(&[1, 2], source_strategy.clone());
        let mut target = Vector::from_slice_in(&[7, 8, 9, 10], target_strategy.clone());

        target.move_from(&mut source);

        assert_eq!(target, [1, 2]);
        assert_eq!(target.capacity(), 4);
        assert_eq!(source_strategy.stats().forgets(), 2);
        assert_eq!(source_strategy.stats().live_values(), 0);
        assert_eq!(target_strategy.stats().live_values(), 2);
    }

    #[test]
    fn swap_exchanges_blocks() {
        let strategy = TrackingStrategy::<false>::new(1);
        let mut a = Vector::from_slice_in(&[1, 2], strategy.clone());
        let mut b = Vector::from_slice_in(&[3], strategy.clone());
        let (a_start, b_start) = (a.as_ptr(), b.as_ptr());

        a.swap_with(&mut b);

        assert_eq!(a, [3]);
        assert_eq!(b, [1, 2]);
        assert_eq!(a.as_ptr(), b_start);
        assert_eq!(b.as_ptr(), a_start);
    }

    #[test]
    fn swap_propagating_exchanges_strategies() {
        let mut a = Vector::from_slice_in(&[1], TrackingStrategy::<true>::new(1));
        let mut b = Vector::from_slice_in(&[2], TrackingStrategy::<true>::new(2));
        let a_strategy = a.strategy();

        swap(&mut a, &mut b);

        assert!(b.strategy() == a_strategy);
        assert_eq!(b, [1]);

        drop(b);
        assert_eq!(a_strategy.stats().live_blocks(), 0);
    }

    #[test]
    fn swap_unequal_non_propagating_panics_without_change() {
        let mut a = Vector::from_slice_in(&[1], TrackingStrategy::<false>::new(1));
        let mut b = Vector::from_slice_in(&[2], TrackingStrategy::<false>::new(2));

        let result = catch_unwind(AssertUnwindSafe(|| a.swap_with(&mut b)));

        assert!(result.is_err());
        assert_eq!(a, [1]);
        assert_eq!(b, [2]);
    }
}
