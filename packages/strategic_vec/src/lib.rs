#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A contiguous growable array whose memory and element lifecycle are delegated to a
//! caller-supplied allocation strategy, plus the low-level toolkit it is built from.
//!
//! The central type is [`Vector`]. Unlike [`Vec`], every block of memory it uses comes from
//! and returns to a [`Strategy`] held inside the vector, and every element is created and
//! dropped through that strategy's hooks. The default strategy, [`Global`], uses the global
//! allocator and plain writes and drops.
//!
//! ```
//! use strategic_vec::{Vector, erase_if, vector};
//!
//! let mut numbers: Vector<u32> = vector![1, 2, 3, 4, 5];
//!
//! numbers.insert(0, 0);
//! let removed = erase_if(&mut numbers, |n| n % 2 == 1);
//!
//! assert_eq!(removed, 3);
//! assert_eq!(numbers, [0, 2, 4]);
//! ```
//!
//! Operations that replace the vector's block build the new block completely before touching
//! the old one, so a failed allocation or a panic while producing new elements leaves the
//! vector as it was. Every operation that may allocate also has a `try_` variant that reports
//! allocation failure as an [`Error`] instead of panicking.
//!
//! # Toolkit
//!
//! The building blocks are public for use with other containers:
//!
//! * [`RangeView`] and [`range_view()`] describe a run of slots by its first address and
//!   length.
//! * [`construct_range_copy()`], [`construct_range_move()`],
//!   [`construct_range_move_or_copy()`] and [`construct_fill_with()`] construct values into
//!   uninitialized slots through a strategy, all or nothing.
//! * [`zip_transform()`] and [`zip_foreach()`] walk one primary range in lockstep with a tuple
//!   of secondary ranges.

mod builder;
mod construct;
mod error;
mod range_view;
mod staging;
mod strategy;
#[cfg(test)]
mod testing;
mod vector;
mod zip;

pub use builder::*;
pub use construct::{
    construct_fill_with, construct_range_copy, construct_range_move,
    construct_range_move_or_copy,
};
pub use error::{AllocError, Error};
pub(crate) use error::{Result, or_panic};
pub use range_view::{RangeView, range_view};
pub use strategy::{Global, Strategy};
pub use vector::{IntoIter, Vector, erase, erase_if, swap};
pub use zip::{IntoLockstep, Lockstep, zip_foreach, zip_transform};

/// Creates a [`Vector`] using the [`Global`] strategy, with the same syntax as [`vec!`].
///
/// # Examples
///
/// ```
/// use strategic_vec::vector;
///
/// let listed = vector![1, 2, 3];
/// let repeated = vector![String::from("x"); 2];
///
/// assert_eq!(listed, [1, 2, 3]);
/// assert_eq!(repeated, ["x", "x"]);
/// ```
#[macro_export]
macro_rules! vector {
    () => {
        $crate::Vector::new()
    };
    ($value:expr; $count:expr) => {
        $crate::Vector::from_elem(&$value, $count)
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Vector::from([$($value),+])
    };
}
