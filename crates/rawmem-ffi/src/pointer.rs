//! Pointer FFI: byte read/write, null test, and handle destroy.
//!
//! Heap and arena allocations share one pointer table, so every pointer
//! handle supports the same three operations regardless of where its memory
//! came from.

use std::sync::Mutex;

use rawmem_alloc::Pointer;
use tracing::debug;

use crate::handle::{HandleKind, HandleTable};
use crate::status::RawmemStatus;

static POINTERS: Mutex<HandleTable<Pointer>> =
    Mutex::new(HandleTable::new(HandleKind::Pointer));

pub(crate) fn pointers() -> &'static Mutex<HandleTable<Pointer>> {
    &POINTERS
}

/// Read the byte at `offset` within the pointer's span into `value_out`.
///
/// Offsets are checked against the span the pointer was issued for
/// (`OutOfBounds`); a freed heap pointer reports `InvalidPointer`. The host
/// must not read through an arena pointer after that arena was reset,
/// freed or destroyed.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_pointer_read(ptr: u64, offset: usize, value_out: *mut u8) -> i32 {
    ffi_guard!({
        if value_out.is_null() {
            return RawmemStatus::InvalidArgument as i32;
        }
        let table = ffi_lock!(POINTERS);
        let Some(p) = table.get(ptr) else {
            return RawmemStatus::InvalidHandle as i32;
        };
        // SAFETY: liveness of the owning allocation is the host's contract.
        match unsafe { p.read(offset) } {
            Ok(value) => {
                // SAFETY: value_out is non-null and valid per caller contract.
                unsafe { *value_out = value };
                RawmemStatus::Ok as i32
            }
            Err(e) => RawmemStatus::from(&e) as i32,
        }
    })
}

/// Store `value`, truncated to its low byte, at `offset` within the
/// pointer's span.
///
/// Same checks and host contract as [`rawmem_pointer_read`].
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_pointer_write(ptr: u64, offset: usize, value: i64) -> i32 {
    ffi_guard!({
        let table = ffi_lock!(POINTERS);
        let Some(p) = table.get(ptr) else {
            return RawmemStatus::InvalidHandle as i32;
        };
        // SAFETY: liveness of the owning allocation is the host's contract.
        match unsafe { p.write(offset, value as u8) } {
            Ok(()) => RawmemStatus::Ok as i32,
            Err(e) => RawmemStatus::from(&e) as i32,
        }
    })
}

/// Write 1 to `is_null_out` if the handle is unknown or its address is
/// null (a freed heap pointer), 0 otherwise.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_pointer_is_null(ptr: u64, is_null_out: *mut u8) -> i32 {
    ffi_guard!({
        if is_null_out.is_null() {
            return RawmemStatus::InvalidArgument as i32;
        }
        let is_null = ffi_lock!(POINTERS).get(ptr).is_none_or(Pointer::is_null);
        // SAFETY: is_null_out is non-null and valid per caller contract.
        unsafe { *is_null_out = u8::from(is_null) };
        RawmemStatus::Ok as i32
    })
}

/// Drop a pointer handle.
///
/// Does not release memory: a heap allocation whose handle is destroyed
/// before `rawmem_heap_free` stays allocated until process exit.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_pointer_destroy(ptr: u64) -> i32 {
    ffi_guard!({
        let mut table = ffi_lock!(POINTERS);
        match table.remove(ptr) {
            Some(p) => {
                debug!(
                    handle = ptr,
                    addr = p.addr(),
                    live = table.len(),
                    "pointer handle destroyed"
                );
                RawmemStatus::Ok as i32
            }
            None => RawmemStatus::InvalidHandle as i32,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::{rawmem_heap_free, rawmem_heap_malloc};

    fn malloc(size: usize) -> u64 {
        let mut h = 0u64;
        assert_eq!(rawmem_heap_malloc(size, &mut h), RawmemStatus::Ok as i32);
        h
    }

    #[test]
    fn write_truncates_to_low_byte() {
        let h = malloc(2);
        assert_eq!(rawmem_pointer_write(h, 0, 0x1FF), RawmemStatus::Ok as i32);
        assert_eq!(rawmem_pointer_write(h, 1, -1), RawmemStatus::Ok as i32);
        let mut v = 0u8;
        assert_eq!(rawmem_pointer_read(h, 0, &mut v), RawmemStatus::Ok as i32);
        assert_eq!(v, 0xFF);
        assert_eq!(rawmem_pointer_read(h, 1, &mut v), RawmemStatus::Ok as i32);
        assert_eq!(v, 0xFF);
        rawmem_heap_free(h);
        rawmem_pointer_destroy(h);
    }

    #[test]
    fn read_past_span_is_out_of_bounds() {
        let h = malloc(4);
        let mut v = 0u8;
        assert_eq!(
            rawmem_pointer_read(h, 4, &mut v),
            RawmemStatus::OutOfBounds as i32
        );
        assert_eq!(
            rawmem_pointer_write(h, 100, 1),
            RawmemStatus::OutOfBounds as i32
        );
        rawmem_heap_free(h);
        rawmem_pointer_destroy(h);
    }

    #[test]
    fn unknown_handle_is_null() {
        let mut out = 0u8;
        assert_eq!(rawmem_pointer_is_null(0, &mut out), RawmemStatus::Ok as i32);
        assert_eq!(out, 1);
    }

    #[test]
    fn null_out_params_rejected() {
        let h = malloc(1);
        assert_eq!(
            rawmem_pointer_read(h, 0, std::ptr::null_mut()),
            RawmemStatus::InvalidArgument as i32
        );
        assert_eq!(
            rawmem_pointer_is_null(h, std::ptr::null_mut()),
            RawmemStatus::InvalidArgument as i32
        );
        rawmem_heap_free(h);
        rawmem_pointer_destroy(h);
    }

    #[test]
    fn destroy_twice_is_invalid_handle() {
        let h = malloc(1);
        rawmem_heap_free(h);
        assert_eq!(rawmem_pointer_destroy(h), RawmemStatus::Ok as i32);
        assert_eq!(
            rawmem_pointer_destroy(h),
            RawmemStatus::InvalidHandle as i32
        );
        assert_eq!(rawmem_pointer_write(h, 0, 1), RawmemStatus::InvalidHandle as i32);
    }
}
