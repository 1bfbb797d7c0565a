//! Lockstep iteration over one primary range and a fixed number of secondary ranges.

const SECONDARY_TOO_SHORT: &str = "a secondary range is shorter than the primary range";

/// A group of iterators that are advanced together, one item from each per step.
///
/// Implemented for tuples of up to four iterators (and for the empty tuple). The tuple form is
/// the fixed-arity stand-in for a variadic parameter list.
pub trait Lockstep {
    /// The tuple of items produced by one step.
    type Items;

    /// Advances every iterator in the group by one item.
    ///
    /// # Panics
    ///
    /// Panics if any of the iterators is exhausted.
    fn advance(&mut self) -> Self::Items;
}

/// Conversion of a tuple of iterables into a [`Lockstep`] group.
pub trait IntoLockstep {
    /// The tuple of items produced by one step.
    type Items;

    /// The group of iterators the tuple converts into.
    type Group: Lockstep<Items = Self::Items>;

    /// Converts every member of the tuple into its iterator.
    fn into_lockstep(self) -> Self::Group;
}

impl Lockstep for () {
    type Items = ();

    fn advance(&mut self) -> Self::Items {}
}

impl IntoLockstep for () {
    type Items = ();
    type Group = ();

    fn into_lockstep(self) -> Self::Group {}
}

macro_rules! lockstep_tuple {
    ($($name:ident : $index:tt),+) => {
        impl<$($name: Iterator),+> Lockstep for ($($name,)+) {
            type Items = ($($name::Item,)+);

            fn advance(&mut self) -> Self::Items {
                ($(self.$index.next().expect(SECONDARY_TOO_SHORT),)+)
            }
        }

        impl<$($name: IntoIterator),+> IntoLockstep for ($($name,)+) {
            type Items = ($($name::Item,)+);
            type Group = ($($name::IntoIter,)+);

            fn into_lockstep(self) -> Self::Group {
                ($(self.$index.into_iter(),)+)
            }
        }
    };
}

lockstep_tuple!(A: 0);
lockstep_tuple!(A: 0, B: 1);
lockstep_tuple!(A: 0, B: 1, C: 2);
lockstep_tuple!(A: 0, B: 1, C: 2, D: 3);

/// Applies `op` to each item of `primary` together with the corresponding items of every
/// secondary range, appending the results to `dest`. Returns how many results were written.
///
/// Iteration stops when the primary range is exhausted. Each secondary range must be at least
/// as long as the primary range; this is the caller's responsibility and a shorter secondary
/// range is a programming error.
///
/// # Panics
///
/// Panics if a secondary range is shorter than the primary range.
///
/// # Example
///
/// ```
/// use strategic_vec::zip_transform;
///
/// let mut sums = Vec::new();
///
/// let written = zip_transform([1, 2, 3], ([10, 20, 30],), &mut sums, |a, (b,)| a + b);
///
/// assert_eq!(written, 3);
/// assert_eq!(sums, [11, 22, 33]);
/// ```
pub fn zip_transform<P, L, D, R, F>(primary: P, secondaries: L, dest: &mut D, mut op: F) -> usize
where
    P: IntoIterator,
    L: IntoLockstep,
    D: Extend<R>,
    F: FnMut(P::Item, L::Items) -> R,
{
    let mut rest = secondaries.into_lockstep();
    let mut written: usize = 0;

    dest.extend(primary.into_iter().map(|item| {
        written = written.wrapping_add(1);
        op(item, rest.advance())
    }));

    written
}

/// Applies `op` to each item of `primary` together with the corresponding items of every
/// secondary range, for side effects only.
///
/// The same length requirements as for [`zip_transform()`] apply.
///
/// # Panics
///
/// Panics if a secondary range is shorter than the primary range.
///
/// # Example
///
/// ```
/// use strategic_vec::zip_foreach;
///
/// let mut targets = [0, 0, 0];
///
/// zip_foreach(&mut targets, ([1, 2, 3], [4, 5, 6]), |target, (a, b)| *target = a * b);
///
/// assert_eq!(targets, [4, 10, 18]);
/// ```
pub fn zip_foreach<P, L, F>(primary: P, secondaries: L, mut op: F)
where
    P: IntoIterator,
    L: IntoLockstep,
    F: FnMut(P::Item, L::Items),
{
    let mut rest = secondaries.into_lockstep();

    for item in primary {
        op(item, rest.advance());
    }
}
