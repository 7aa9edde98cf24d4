//! Error types for the rawmem allocators.
//!
//! [`MemError`] covers every hard failure an allocator operation can report.
//! Arena exhaustion is deliberately absent: it is a recoverable sentinel
//! (`Ok(None)` from `Arena::alloc`) whose canonical message is
//! [`ARENA_EXHAUSTED`].

use thiserror::Error;

use crate::config::ConfigError;

/// Message reported to hosts when an arena cannot satisfy a request.
pub const ARENA_EXHAUSTED: &str = "Arena out of memory";

/// Errors that can occur during heap, arena, stack or pointer operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MemError {
    /// The system allocator could not satisfy the request, or the request
    /// exceeded the configured `max_bytes`.
    #[error("allocation of {size} bytes failed")]
    AllocationFailure {
        /// Number of bytes requested.
        size: usize,
    },
    /// A zero-byte request for backing storage.
    #[error("invalid allocation size: {size} bytes")]
    InvalidSize {
        /// Number of bytes requested.
        size: usize,
    },
    /// The pointer is null, was already freed, or was never issued by the
    /// heap allocator.
    #[error("invalid pointer")]
    InvalidPointer,
    /// The arena or stack storage has already been released with `free`.
    #[error("backing storage already released")]
    Released,
    /// A push would move the stack top past its capacity.
    #[error("stack overflow: pushing {requested} bytes, {available} available")]
    StackOverflow {
        /// Length of the rejected span.
        requested: usize,
        /// Free bytes remaining on the stack.
        available: usize,
    },
    /// Pop on an empty stack.
    #[error("stack underflow")]
    StackUnderflow,
    /// A checked pointer access outside the span the pointer was issued for.
    #[error("offset {offset} out of bounds for a {len}-byte span")]
    OutOfBounds {
        /// Offset of the rejected access.
        offset: usize,
        /// Length of the span.
        len: usize,
    },
    /// The allocation configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
