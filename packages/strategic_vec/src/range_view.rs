use std::iter::FusedIterator;
use std::ptr::NonNull;

/// A non-owning view over a run of consecutive slots, yielding the address of each slot
/// front to back.
///
/// The view does not care whether the slots hold live values; it is used both to walk the
/// live elements of a block and to walk the uninitialized tail that is about to be filled.
/// Creating or iterating a view never touches the slots themselves, so it imposes no
/// lifetime obligation on its own. Whoever dereferences the addresses is responsible for
/// their validity.
///
/// # Example
///
/// ```
/// use strategic_vec::RangeView;
///
/// let values = [1, 2, 3];
/// let view = RangeView::from_slice(&values);
///
/// assert_eq!(view.len(), 3);
///
/// // SAFETY: The view covers `values`, which is alive and initialized.
/// let sum: i32 = view.map(|slot| unsafe { *slot.as_ref() }).sum();
/// assert_eq!(sum, 6);
/// ```
#[derive(Debug)]
pub struct RangeView<T> {
    begin: NonNull<T>,
    len: usize,
}

impl<T> RangeView<T> {
    /// Creates a view over `len` slots starting at `begin`.
    ///
    /// # Safety
    ///
    /// `begin.add(len)` must stay within (or one past the end of) the same allocation.
    #[must_use]
    pub unsafe fn from_raw_parts(begin: NonNull<T>, len: usize) -> Self {
        Self { begin, len }
    }

    /// Creates a view over the slots of a slice.
    #[must_use]
    pub fn from_slice(slice: &[T]) -> Self {
        Self {
            begin: NonNull::from(slice).cast(),
            len: slice.len(),
        }
    }

    /// An empty view that does not refer to any allocation.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            begin: NonNull::dangling(),
            len: 0,
        }
    }

    /// Address of the first slot still in the view.
    #[must_use]
    pub fn begin(&self) -> NonNull<T> {
        self.begin
    }

    /// Address one past the last slot in the view.
    #[must_use]
    pub fn end(&self) -> NonNull<T> {
        // SAFETY: Construction guarantees the end stays within the same allocation.
        unsafe { self.begin.add(self.len) }
    }

    /// Number of slots still in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view has no slots left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Clone for RangeView<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RangeView<T> {}

#[expect(
    clippy::copy_iterator,
    reason = "a view is a pair of addresses and iterating a copy leaves the original intact"
)]
impl<T> Iterator for RangeView<T> {
    type Item = NonNull<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let slot = self.begin;

        // SAFETY: There is at least one slot left, so the next address is at most the end.
        self.begin = unsafe { self.begin.add(1) };
        self.len = self.len.wrapping_sub(1);

        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<T> DoubleEndedIterator for RangeView<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        self.len = self.len.wrapping_sub(1);

        // SAFETY: The slot is within the view.
        Some(unsafe { self.begin.add(self.len) })
    }
}

impl<T> ExactSizeIterator for RangeView<T> {}

impl<T> FusedIterator for RangeView<T> {}

/// Creates a [`RangeView`] over the slots in `[begin, end)`.
///
/// # Safety
///
/// Both addresses must belong to the same allocation with `begin <= end`.
///
/// # Panics
///
/// Panics if `T` is zero-sized, because the number of slots between two addresses of a
/// zero-sized type is not defined. Use [`RangeView::from_raw_parts()`] for those.
#[must_use]
pub unsafe fn range_view<T>(begin: NonNull<T>, end: NonNull<T>) -> RangeView<T> {
    assert!(
        size_of::<T>() > 0,
        "range_view() cannot measure a range of zero-sized slots"
    );

    // SAFETY: The caller guarantees both addresses share an allocation.
    let distance = unsafe { end.offset_from(begin) };

    let len = usize::try_from(distance).expect("range_view() requires begin <= end");

    // SAFETY: `end` is within the allocation, so everything up to it is too.
    unsafe { RangeView::from_raw_parts(begin, len) }
}
