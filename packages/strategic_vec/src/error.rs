use thiserror::Error;

/// The allocation strategy could not provide the requested block.
///
/// Strategies return this from [`Strategy::allocate()`][crate::Strategy::allocate]; the
/// vector passes it on unchanged inside [`Error::Allocation`] unless the request was
/// provably too large, in which case it reports [`Error::LengthExceeded`] instead.
#[expect(clippy::exhaustive_structs, reason = "intentionally an empty struct")]
#[derive(Clone, Copy, Debug, Default, Eq, Error, PartialEq)]
#[error("the allocation strategy failed to provide a memory block")]
pub struct AllocError;

/// Errors that can occur when operating on a [`Vector`][crate::Vector].
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A checked element access used an index that does not refer to a live element.
    #[error("index {index} is out of range for a vector of length {len}")]
    OutOfRange {
        /// The index the caller asked for.
        index: usize,

        /// The length of the vector at the time of the access.
        len: usize,
    },

    /// A growth operation asked for more elements than the vector can ever hold, either
    /// because of the address space or because of the strategy's own limit.
    #[error("requested capacity of {requested} elements exceeds the maximum of {max}")]
    LengthExceeded {
        /// The capacity that was requested. Saturates at `usize::MAX` when the request
        /// itself overflowed.
        requested: usize,

        /// The value of [`Vector::max_size()`][crate::Vector::max_size] at the time.
        max: usize,
    },

    /// The allocation strategy failed for a request that was within the size limits.
    #[error(transparent)]
    Allocation(#[from] AllocError),
}

/// A specialized `Result` type for vector operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

/// Unwraps the result of a fallible growth operation, panicking with the error message.
///
/// The panicking API surface does not intend to handle allocation failure as a real
/// possibility; callers who do use the `try_` family instead.
#[track_caller]
pub(crate) fn or_panic<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => panic!("{error}"),
    }
}
