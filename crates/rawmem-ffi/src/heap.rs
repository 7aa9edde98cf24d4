//! Heap FFI: malloc, free, and live-allocation count.

use rawmem_alloc::{heap, registry};
use tracing::warn;

use crate::pointer::pointers;
use crate::status::RawmemStatus;

/// Allocate `size` zeroed bytes and write a pointer handle to `ptr_out`.
///
/// On failure nothing is allocated and `ptr_out` is left untouched.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_heap_malloc(size: usize, ptr_out: *mut u64) -> i32 {
    ffi_guard!({
        if ptr_out.is_null() {
            return RawmemStatus::InvalidArgument as i32;
        }
        // Lock before allocating so a poisoned table cannot strand memory.
        let mut table = ffi_lock!(pointers());
        if !table.has_room() {
            return RawmemStatus::AllocationFailure as i32;
        }
        let ptr = match heap::malloc(size) {
            Ok(p) => p,
            Err(e) => return RawmemStatus::from(&e) as i32,
        };
        let handle = match table.insert(ptr) {
            Ok(h) => h,
            Err(mut ptr) => {
                if let Err(e) = heap::free(&mut ptr) {
                    warn!(addr = ptr.addr(), error = %e, "unissued heap block not released");
                }
                return RawmemStatus::AllocationFailure as i32;
            }
        };
        // SAFETY: ptr_out is non-null and valid per caller contract.
        unsafe { *ptr_out = handle };
        RawmemStatus::Ok as i32
    })
}

/// Release the heap allocation behind a pointer handle.
///
/// The handle stays valid and now reports null. Freeing it again returns
/// `InvalidPointer`; arena pointers also return `InvalidPointer`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_heap_free(ptr: u64) -> i32 {
    ffi_guard!({
        let mut table = ffi_lock!(pointers());
        let Some(p) = table.get_mut(ptr) else {
            return RawmemStatus::InvalidHandle as i32;
        };
        match heap::free(p) {
            Ok(()) => RawmemStatus::Ok as i32,
            Err(e) => RawmemStatus::from(&e) as i32,
        }
    })
}

/// Write the number of live heap allocations in the process to `count_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_heap_live_count(count_out: *mut usize) -> i32 {
    ffi_guard!({
        if count_out.is_null() {
            return RawmemStatus::InvalidArgument as i32;
        }
        // SAFETY: count_out is non-null and valid per caller contract.
        unsafe { *count_out = registry::live_count() };
        RawmemStatus::Ok as i32
    })
}
