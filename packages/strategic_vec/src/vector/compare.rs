use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::{Strategy, Vector};

impl<T, S: Strategy> Vector<T, S> {
    /// Compares two vectors lexicographically using only the `<` operator of the elements.
    ///
    /// Elements where neither `a < b` nor `b < a` holds are treated as equivalent, so this
    /// gives a total answer even for types like floating point numbers, where [`PartialOrd`]
    /// may refuse to order some pairs. If all compared elements are equivalent, the shorter
    /// vector orders first.
    ///
    /// # Example
    ///
    /// ```
    /// use std::cmp::Ordering;
    ///
    /// use strategic_vec::vector;
    ///
    /// let a = vector![1.0, f64::NAN, 3.0];
    /// let b = vector![1.0, 2.0, 4.0];
    ///
    /// // NaN is neither less than nor greater than 2.0, so the third element decides.
    /// assert_eq!(a.compare_by_less(&b), Ordering::Less);
    /// ```
    #[must_use]
    pub fn compare_by_less<S2: Strategy>(&self, other: &Vector<T, S2>) -> Ordering
    where
        T: PartialOrd,
    {
        for (a, b) in self.iter().zip(other.iter()) {
            if a < b {
                return Ordering::Less;
            }

            if b < a {
                return Ordering::Greater;
            }
        }

        self.len().cmp(&other.len())
    }
}

impl<T, U, S, S2> PartialEq<Vector<U, S2>> for Vector<T, S>
where
    T: PartialEq<U>,
    S: Strategy,
    S2: Strategy,
{
    fn eq(&self, other: &Vector<U, S2>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, S: Strategy> Eq for Vector<T, S> {}

impl<T, U, S> PartialEq<[U]> for Vector<T, S>
where
    T: PartialEq<U>,
    S: Strategy,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, S> PartialEq<&[U]> for Vector<T, S>
where
    T: PartialEq<U>,
    S: Strategy,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, S, const N: usize> PartialEq<[U; N]> for Vector<T, S>
where
    T: PartialEq<U>,
    S: Strategy,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, U, S> PartialEq<Vec<U>> for Vector<T, S>
where
    T: PartialEq<U>,
    S: Strategy,
{
    fn eq(&self, other: &Vec<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, S, S2> PartialOrd<Vector<T, S2>> for Vector<T, S>
where
    T: PartialOrd,
    S: Strategy,
    S2: Strategy,
{
    fn partial_cmp(&self, other: &Vector<T, S2>) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord, S: Strategy> Ord for Vector<T, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash, S: Strategy> Hash for Vector<T, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}
