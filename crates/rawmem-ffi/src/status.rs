//! C-compatible status codes.
//!
//! [`RawmemStatus`] is a `repr(i32)` enum covering every outcome of the FFI
//! functions. `Ok` is 0, errors are negative, and the single positive code,
//! `ArenaExhausted`, is the recoverable "no result" sentinel.

use std::ffi::CStr;
use std::os::raw::c_char;

use rawmem_core::MemError;

/// C-compatible status code returned by all FFI functions.
///
/// Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawmemStatus {
    /// Success.
    Ok = 0,
    /// The arena cannot fit the request. Not an error; nothing was allocated.
    ArenaExhausted = 1,
    /// Handle is invalid, of the wrong kind, or was already destroyed.
    InvalidHandle = -1,
    /// An out-pointer is null or an argument is otherwise unusable.
    InvalidArgument = -2,
    /// The system allocator could not satisfy the request.
    AllocationFailure = -3,
    /// Zero-byte request for backing storage.
    InvalidSize = -4,
    /// Heap free of a null, freed, or non-heap pointer.
    InvalidPointer = -5,
    /// Arena or stack storage was already released.
    Released = -6,
    /// Push does not fit on the stack.
    StackOverflow = -7,
    /// Pop on an empty stack.
    StackUnderflow = -8,
    /// Pointer access outside the span it was issued for.
    OutOfBounds = -9,
    /// Allocation configuration failed validation.
    ConfigError = -10,
    /// Internal error (e.g. poisoned handle table after a prior panic).
    InternalError = -20,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl RawmemStatus {
    /// Every status, in declaration order.
    pub const ALL: [RawmemStatus; 14] = [
        Self::Ok,
        Self::ArenaExhausted,
        Self::InvalidHandle,
        Self::InvalidArgument,
        Self::AllocationFailure,
        Self::InvalidSize,
        Self::InvalidPointer,
        Self::Released,
        Self::StackOverflow,
        Self::StackUnderflow,
        Self::OutOfBounds,
        Self::ConfigError,
        Self::InternalError,
        Self::Panicked,
    ];

    /// Map a raw code back to a status.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| *s as i32 == code)
    }

    /// Static, NUL-terminated description for hosts to surface.
    pub fn message(self) -> &'static CStr {
        match self {
            Self::Ok => c"ok",
            Self::ArenaExhausted => c"Arena out of memory",
            Self::InvalidHandle => c"invalid handle",
            Self::InvalidArgument => c"invalid argument",
            Self::AllocationFailure => c"malloc failed",
            Self::InvalidSize => c"invalid allocation size",
            Self::InvalidPointer => c"invalid or freed pointer",
            Self::Released => c"storage already freed",
            Self::StackOverflow => c"Stack overflow",
            Self::StackUnderflow => c"Stack underflow",
            Self::OutOfBounds => c"pointer offset out of bounds",
            Self::ConfigError => c"invalid allocation config",
            Self::InternalError => c"internal error",
            Self::Panicked => c"panic at FFI boundary",
        }
    }
}

impl From<&MemError> for RawmemStatus {
    fn from(e: &MemError) -> Self {
        match e {
            MemError::AllocationFailure { .. } => Self::AllocationFailure,
            MemError::InvalidSize { .. } => Self::InvalidSize,
            MemError::InvalidPointer => Self::InvalidPointer,
            MemError::Released => Self::Released,
            MemError::StackOverflow { .. } => Self::StackOverflow,
            MemError::StackUnderflow => Self::StackUnderflow,
            MemError::OutOfBounds { .. } => Self::OutOfBounds,
            MemError::Config(_) => Self::ConfigError,
        }
    }
}

/// Describe a status code. Unknown codes get a generic message.
///
/// The returned string is static and must not be freed.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_status_message(status: i32) -> *const c_char {
    RawmemStatus::from_code(status)
        .map_or(c"unknown status", RawmemStatus::message)
        .as_ptr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rawmem_core::{ConfigError, ARENA_EXHAUSTED};

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(RawmemStatus::Ok as i32, 0);
        assert_eq!(RawmemStatus::ArenaExhausted as i32, 1);
        assert_eq!(RawmemStatus::InvalidHandle as i32, -1);
        assert_eq!(RawmemStatus::InvalidArgument as i32, -2);
        assert_eq!(RawmemStatus::AllocationFailure as i32, -3);
        assert_eq!(RawmemStatus::InvalidSize as i32, -4);
        assert_eq!(RawmemStatus::InvalidPointer as i32, -5);
        assert_eq!(RawmemStatus::Released as i32, -6);
        assert_eq!(RawmemStatus::StackOverflow as i32, -7);
        assert_eq!(RawmemStatus::StackUnderflow as i32, -8);
        assert_eq!(RawmemStatus::OutOfBounds as i32, -9);
        assert_eq!(RawmemStatus::ConfigError as i32, -10);
        assert_eq!(RawmemStatus::InternalError as i32, -20);
        assert_eq!(RawmemStatus::Panicked as i32, -128);
    }

    #[test]
    fn from_code_round_trips_every_status() {
        for status in RawmemStatus::ALL {
            assert_eq!(RawmemStatus::from_code(status as i32), Some(status));
        }
        assert_eq!(RawmemStatus::from_code(42), None);
    }

    #[test]
    fn exhaustion_message_matches_core() {
        assert_eq!(
            RawmemStatus::ArenaExhausted.message().to_str().unwrap(),
            ARENA_EXHAUSTED
        );
    }

    #[test]
    fn invalid_pointer_message_fits_access_and_free() {
        assert_eq!(
            RawmemStatus::InvalidPointer.message().to_str().unwrap(),
            "invalid or freed pointer"
        );
    }

    #[test]
    fn mem_error_to_status() {
        assert_eq!(
            RawmemStatus::from(&MemError::AllocationFailure { size: 1 }),
            RawmemStatus::AllocationFailure
        );
        assert_eq!(
            RawmemStatus::from(&MemError::InvalidPointer),
            RawmemStatus::InvalidPointer
        );
        assert_eq!(
            RawmemStatus::from(&MemError::StackOverflow {
                requested: 2,
                available: 1
            }),
            RawmemStatus::StackOverflow
        );
        assert_eq!(
            RawmemStatus::from(&MemError::StackUnderflow),
            RawmemStatus::StackUnderflow
        );
        assert_eq!(
            RawmemStatus::from(&MemError::Config(ConfigError::ZeroMaxBytes)),
            RawmemStatus::ConfigError
        );
    }

    #[test]
    #[allow(unsafe_code)]
    fn status_message_is_nul_terminated() {
        let msg = rawmem_status_message(RawmemStatus::StackUnderflow as i32);
        // SAFETY: the function returns a pointer to a static C string.
        let s = unsafe { CStr::from_ptr(msg) };
        assert_eq!(s.to_str().unwrap(), "Stack underflow");

        let unknown = rawmem_status_message(99);
        // SAFETY: as above.
        let s = unsafe { CStr::from_ptr(unknown) };
        assert_eq!(s.to_str().unwrap(), "unknown status");
    }
}
