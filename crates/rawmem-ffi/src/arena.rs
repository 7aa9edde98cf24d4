//! Arena FFI: create, alloc, reset, free, destroy.
//!
//! `rawmem_arena_free` releases storage but keeps the handle (freeing again
//! is a no-op); `rawmem_arena_destroy` drops the handle and any storage
//! still held.

use std::sync::Mutex;

use rawmem_alloc::Arena;
use tracing::debug;

use crate::handle::{HandleKind, HandleTable};
use crate::pointer::pointers;
use crate::status::RawmemStatus;

static ARENAS: Mutex<HandleTable<Arena>> = Mutex::new(HandleTable::new(HandleKind::Arena));

/// Create an arena of `capacity` bytes and write its handle to `arena_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_arena_new(capacity: usize, arena_out: *mut u64) -> i32 {
    ffi_guard!({
        if arena_out.is_null() {
            return RawmemStatus::InvalidArgument as i32;
        }
        let arena = match Arena::new(capacity) {
            Ok(a) => a,
            Err(e) => return RawmemStatus::from(&e) as i32,
        };
        let Ok(handle) = ffi_lock!(ARENAS).insert(arena) else {
            return RawmemStatus::AllocationFailure as i32;
        };
        // SAFETY: arena_out is non-null and valid per caller contract.
        unsafe { *arena_out = handle };
        RawmemStatus::Ok as i32
    })
}

/// Bump-allocate `size` bytes and write a pointer handle to `ptr_out`.
///
/// Returns `ArenaExhausted` (positive, not an error) and writes 0 to
/// `ptr_out` when the arena cannot fit the request; the arena is unchanged.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_arena_alloc(arena: u64, size: usize, ptr_out: *mut u64) -> i32 {
    ffi_guard!({
        if ptr_out.is_null() {
            return RawmemStatus::InvalidArgument as i32;
        }
        // Lock order: pointers, then arenas.
        let mut ptrs = ffi_lock!(pointers());
        let mut arenas = ffi_lock!(ARENAS);
        let Some(a) = arenas.get_mut(arena) else {
            return RawmemStatus::InvalidHandle as i32;
        };
        // Checked first so a full table never strands bumped bytes.
        if !ptrs.has_room() {
            return RawmemStatus::AllocationFailure as i32;
        }
        let ptr = match a.alloc(size) {
            Ok(Some(p)) => p,
            Ok(None) => {
                // SAFETY: ptr_out is non-null and valid per caller contract.
                unsafe { *ptr_out = 0 };
                return RawmemStatus::ArenaExhausted as i32;
            }
            Err(e) => return RawmemStatus::from(&e) as i32,
        };
        let Ok(handle) = ptrs.insert(ptr) else {
            return RawmemStatus::AllocationFailure as i32;
        };
        // SAFETY: ptr_out is non-null and valid per caller contract.
        unsafe { *ptr_out = handle };
        RawmemStatus::Ok as i32
    })
}

/// Rewind the arena to empty without releasing storage.
///
/// Pointers issued before the reset must no longer be used.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_arena_reset(arena: u64) -> i32 {
    with_arena(arena, Arena::reset)
}

/// Release the arena's storage. The handle stays valid; freeing again is a
/// no-op and allocating afterwards returns `Released`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_arena_free(arena: u64) -> i32 {
    with_arena(arena, Arena::free)
}

/// Write the number of bytes handed out since creation or the last reset.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_arena_used(arena: u64, used_out: *mut usize) -> i32 {
    ffi_guard!({
        if used_out.is_null() {
            return RawmemStatus::InvalidArgument as i32;
        }
        let arenas = ffi_lock!(ARENAS);
        let Some(a) = arenas.get(arena) else {
            return RawmemStatus::InvalidHandle as i32;
        };
        // SAFETY: used_out is non-null and valid per caller contract.
        unsafe { *used_out = a.used() };
        RawmemStatus::Ok as i32
    })
}

/// Drop the arena handle, releasing storage if it is still held.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_arena_destroy(arena: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(ARENAS).remove(arena) {
            Some(a) => {
                debug!(handle = arena, capacity = a.capacity(), "arena handle destroyed");
                RawmemStatus::Ok as i32
            }
            None => RawmemStatus::InvalidHandle as i32,
        }
    })
}

fn with_arena(arena: u64, op: impl FnOnce(&mut Arena)) -> i32 {
    ffi_guard!({
        let mut arenas = ffi_lock!(ARENAS);
        let Some(a) = arenas.get_mut(arena) else {
            return RawmemStatus::InvalidHandle as i32;
        };
        op(a);
        RawmemStatus::Ok as i32
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::{rawmem_pointer_destroy, rawmem_pointer_read, rawmem_pointer_write};

    fn new_arena(capacity: usize) -> u64 {
        let mut h = 0u64;
        assert_eq!(rawmem_arena_new(capacity, &mut h), RawmemStatus::Ok as i32);
        h
    }

    fn used(arena: u64) -> usize {
        let mut n = usize::MAX;
        assert_eq!(rawmem_arena_used(arena, &mut n), RawmemStatus::Ok as i32);
        n
    }

    #[test]
    fn exhaustion_is_positive_sentinel() {
        let arena = new_arena(16);
        let mut p = 0u64;
        assert_eq!(rawmem_arena_alloc(arena, 10, &mut p), RawmemStatus::Ok as i32);
        let mut q = 99u64;
        assert_eq!(
            rawmem_arena_alloc(arena, 10, &mut q),
            RawmemStatus::ArenaExhausted as i32
        );
        assert_eq!(q, 0);
        assert_eq!(used(arena), 10);
        rawmem_pointer_destroy(p);
        rawmem_arena_destroy(arena);
    }

    #[test]
    fn arena_pointer_read_write() {
        let arena = new_arena(8);
        let mut p = 0u64;
        rawmem_arena_alloc(arena, 8, &mut p);
        assert_eq!(rawmem_pointer_write(p, 7, 42), RawmemStatus::Ok as i32);
        let mut v = 0u8;
        assert_eq!(rawmem_pointer_read(p, 7, &mut v), RawmemStatus::Ok as i32);
        assert_eq!(v, 42);
        rawmem_pointer_destroy(p);
        rawmem_arena_destroy(arena);
    }

    #[test]
    fn reset_restores_full_capacity() {
        let arena = new_arena(8);
        let mut p = 0u64;
        rawmem_arena_alloc(arena, 8, &mut p);
        rawmem_pointer_destroy(p);
        assert_eq!(rawmem_arena_reset(arena), RawmemStatus::Ok as i32);
        assert_eq!(used(arena), 0);
        assert_eq!(rawmem_arena_alloc(arena, 8, &mut p), RawmemStatus::Ok as i32);
        rawmem_pointer_destroy(p);
        rawmem_arena_destroy(arena);
    }

    #[test]
    fn free_is_idempotent_then_alloc_released() {
        let arena = new_arena(8);
        assert_eq!(rawmem_arena_free(arena), RawmemStatus::Ok as i32);
        assert_eq!(rawmem_arena_free(arena), RawmemStatus::Ok as i32);
        let mut p = 0u64;
        assert_eq!(
            rawmem_arena_alloc(arena, 1, &mut p),
            RawmemStatus::Released as i32
        );
        assert_eq!(rawmem_arena_destroy(arena), RawmemStatus::Ok as i32);
        assert_eq!(rawmem_arena_free(arena), RawmemStatus::InvalidHandle as i32);
    }

    #[test]
    fn zero_capacity_is_invalid_size() {
        let mut h = 0u64;
        assert_eq!(rawmem_arena_new(0, &mut h), RawmemStatus::InvalidSize as i32);
    }
}
