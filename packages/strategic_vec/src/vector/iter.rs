use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ptr::{self, NonNull};
use std::{fmt, slice};

use scopeguard::guard;

use crate::construct::destroy_range;
use crate::staging::deallocate_block;
use crate::{Global, RangeView, Strategy, Vector};

/// An owning iterator over the elements of a [`Vector`], front to back or back to front.
///
/// Each yielded element is reported to the strategy's `forget()` hook. Elements that are not
/// consumed are destroyed through the strategy when the iterator is dropped, after which the
/// block is returned to the strategy.
pub struct IntoIter<T, S: Strategy = Global> {
    start: NonNull<T>,
    capacity: usize,

    /// Index of the next element to yield from the front.
    head: usize,

    /// One past the index of the next element to yield from the back.
    tail: usize,

    strategy: S,

    _owns: PhantomData<T>,
}

impl<T, S: Strategy> IntoIter<T, S> {
    /// The elements that have not been yielded yet.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: The slots from `head` to `tail` hold live elements.
        unsafe { slice::from_raw_parts(self.front().as_ptr(), self.remaining()) }
    }

    fn remaining(&self) -> usize {
        self.tail.wrapping_sub(self.head)
    }

    /// The slot of the next element from the front, or the end of the remaining range if it
    /// is empty.
    fn front(&self) -> NonNull<T> {
        self.slot(self.head)
    }

    fn slot(&self, index: usize) -> NonNull<T> {
        debug_assert!(index <= self.tail);

        // SAFETY: Only called for indexes up to `tail`, which are inside the block.
        unsafe { self.start.add(index) }
    }
}

impl<T, S: Strategy> Iterator for IntoIter<T, S> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.head == self.tail {
            return None;
        }

        let slot = self.front();
        self.head = self.head.wrapping_add(1);

        // SAFETY: The slot held a live element and the iterator no longer claims it.
        let value = unsafe { slot.read() };
        self.strategy.forget(slot);

        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<T, S: Strategy> DoubleEndedIterator for IntoIter<T, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.head == self.tail {
            return None;
        }

        self.tail = self.tail.wrapping_sub(1);
        let slot = self.slot(self.tail);

        // SAFETY: The slot held a live element and the iterator no longer claims it.
        let value = unsafe { slot.read() };
        self.strategy.forget(slot);

        Some(value)
    }
}

impl<T, S: Strategy> ExactSizeIterator for IntoIter<T, S> {}

impl<T, S: Strategy> FusedIterator for IntoIter<T, S> {}

impl<T, S: Strategy> Drop for IntoIter<T, S> {
    fn drop(&mut self) {
        // The block goes back to the strategy even if a destructor panics.
        let strategy = guard(&self.strategy, |strategy| {
            // SAFETY: The block came from this strategy and nothing refers to it any more.
            unsafe {
                deallocate_block(strategy, self.start, self.capacity);
            }
        });

        // SAFETY: The slots from `head` to `tail` hold live elements.
        let remaining = unsafe { RangeView::from_raw_parts(self.front(), self.remaining()) };

        // SAFETY: Nobody else will drop the remaining elements.
        unsafe {
            destroy_range(remaining, *strategy);
        }
    }
}

impl<T: fmt::Debug, S: Strategy> fmt::Debug for IntoIter<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

// SAFETY: The iterator exclusively owns the remaining elements and the strategy, same as the
// vector it came from.
unsafe impl<T: Send, S: Strategy + Send> Send for IntoIter<T, S> {}

// SAFETY: Shared access only hands out shared access to the elements.
unsafe impl<T: Sync, S: Strategy + Sync> Sync for IntoIter<T, S> {}

impl<T, S: Strategy> IntoIterator for Vector<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T, S>;

    fn into_iter(self) -> Self::IntoIter {
        let this = ManuallyDrop::new(self);

        IntoIter {
            start: this.start,
            capacity: this.capacity,
            head: 0,
            tail: this.len,
            // SAFETY: The vector is never dropped, so the strategy is moved out exactly once.
            strategy: unsafe { ptr::read(&this.strategy) },
            _owns: PhantomData,
        }
    }
}

impl<'a, T, S: Strategy> IntoIterator for &'a Vector<T, S> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, S: Strategy> IntoIterator for &'a mut Vector<T, S> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> FromIterator<T> for Vector<T, Global> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_in(iter, Global)
    }
}

impl<T, S: Strategy> Extend<T> for Vector<T, S> {
    /// Appends every element of `iter` one at a time.
    ///
    /// # Panics
    ///
    /// Panics if the vector needs to grow and the strategy cannot provide the new block.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, T: Copy + 'a, S: Strategy> Extend<&'a T> for Vector<T, S> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for value in iter {
            self.push(*value);
        }
    }
}
