//! Stack FFI: create, push, pop, reset, free, destroy.

use std::sync::Mutex;

use rawmem_alloc::Stack;
use tracing::debug;

use crate::handle::{HandleKind, HandleTable};
use crate::status::RawmemStatus;

static STACKS: Mutex<HandleTable<Stack>> = Mutex::new(HandleTable::new(HandleKind::Stack));

/// Create a stack of `capacity` bytes and write its handle to `stack_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_stack_new(capacity: usize, stack_out: *mut u64) -> i32 {
    ffi_guard!({
        if stack_out.is_null() {
            return RawmemStatus::InvalidArgument as i32;
        }
        let stack = match Stack::new(capacity) {
            Ok(s) => s,
            Err(e) => return RawmemStatus::from(&e) as i32,
        };
        let Ok(handle) = ffi_lock!(STACKS).insert(stack) else {
            return RawmemStatus::AllocationFailure as i32;
        };
        // SAFETY: stack_out is non-null and valid per caller contract.
        unsafe { *stack_out = handle };
        RawmemStatus::Ok as i32
    })
}

/// Copy `len` bytes from `bytes` onto the stack.
///
/// `bytes` may be null only when `len` is 0. Returns `StackOverflow` and
/// leaves the stack untouched if the span does not fit.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_stack_push(stack: u64, bytes: *const u8, len: usize) -> i32 {
    ffi_guard!({
        let span: &[u8] = if len == 0 {
            &[]
        } else if bytes.is_null() {
            return RawmemStatus::InvalidArgument as i32;
        } else {
            // SAFETY: bytes points to len readable bytes per caller contract.
            unsafe { std::slice::from_raw_parts(bytes, len) }
        };
        let mut stacks = ffi_lock!(STACKS);
        let Some(s) = stacks.get_mut(stack) else {
            return RawmemStatus::InvalidHandle as i32;
        };
        match s.push(span) {
            Ok(()) => RawmemStatus::Ok as i32,
            Err(e) => RawmemStatus::from(&e) as i32,
        }
    })
}

/// Pop one byte into `value_out`. Returns `StackUnderflow` when empty.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_stack_pop(stack: u64, value_out: *mut u8) -> i32 {
    ffi_guard!({
        if value_out.is_null() {
            return RawmemStatus::InvalidArgument as i32;
        }
        let mut stacks = ffi_lock!(STACKS);
        let Some(s) = stacks.get_mut(stack) else {
            return RawmemStatus::InvalidHandle as i32;
        };
        match s.pop() {
            Ok(value) => {
                // SAFETY: value_out is non-null and valid per caller contract.
                unsafe { *value_out = value };
                RawmemStatus::Ok as i32
            }
            Err(e) => RawmemStatus::from(&e) as i32,
        }
    })
}

/// Write the number of bytes on the stack to `len_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_stack_len(stack: u64, len_out: *mut usize) -> i32 {
    ffi_guard!({
        if len_out.is_null() {
            return RawmemStatus::InvalidArgument as i32;
        }
        let stacks = ffi_lock!(STACKS);
        let Some(s) = stacks.get(stack) else {
            return RawmemStatus::InvalidHandle as i32;
        };
        // SAFETY: len_out is non-null and valid per caller contract.
        unsafe { *len_out = s.len() };
        RawmemStatus::Ok as i32
    })
}

/// Empty the stack without releasing storage.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_stack_reset(stack: u64) -> i32 {
    with_stack(stack, Stack::reset)
}

/// Release the stack's storage. The handle stays valid; freeing again is a
/// no-op.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_stack_free(stack: u64) -> i32 {
    with_stack(stack, Stack::free)
}

/// Drop the stack handle, releasing storage if it is still held.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rawmem_stack_destroy(stack: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(STACKS).remove(stack) {
            Some(s) => {
                debug!(handle = stack, capacity = s.capacity(), "stack handle destroyed");
                RawmemStatus::Ok as i32
            }
            None => RawmemStatus::InvalidHandle as i32,
        }
    })
}

fn with_stack(stack: u64, op: impl FnOnce(&mut Stack)) -> i32 {
    ffi_guard!({
        let mut stacks = ffi_lock!(STACKS);
        let Some(s) = stacks.get_mut(stack) else {
            return RawmemStatus::InvalidHandle as i32;
        };
        op(s);
        RawmemStatus::Ok as i32
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_stack(capacity: usize) -> u64 {
        let mut h = 0u64;
        assert_eq!(rawmem_stack_new(capacity, &mut h), RawmemStatus::Ok as i32);
        h
    }

    fn pop(stack: u64) -> Result<u8, i32> {
        let mut v = 0u8;
        match rawmem_stack_pop(stack, &mut v) {
            0 => Ok(v),
            status => Err(status),
        }
    }

    #[test]
    fn push_span_pop_bytes() {
        let s = new_stack(8);
        assert_eq!(rawmem_stack_push(s, b"AB".as_ptr(), 2), RawmemStatus::Ok as i32);
        assert_eq!(rawmem_stack_push(s, b"C".as_ptr(), 1), RawmemStatus::Ok as i32);
        assert_eq!(pop(s), Ok(b'C'));
        assert_eq!(pop(s), Ok(b'B'));
        rawmem_stack_destroy(s);
    }

    #[test]
    fn pop_empty_underflows() {
        let s = new_stack(4);
        assert_eq!(pop(s), Err(RawmemStatus::StackUnderflow as i32));
        rawmem_stack_destroy(s);
    }

    #[test]
    fn overflow_leaves_len_unchanged() {
        let s = new_stack(2);
        assert_eq!(
            rawmem_stack_push(s, b"abc".as_ptr(), 3),
            RawmemStatus::StackOverflow as i32
        );
        let mut len = 9usize;
        rawmem_stack_len(s, &mut len);
        assert_eq!(len, 0);
        rawmem_stack_destroy(s);
    }

    #[test]
    fn null_bytes_allowed_only_for_empty_push() {
        let s = new_stack(2);
        assert_eq!(
            rawmem_stack_push(s, std::ptr::null(), 0),
            RawmemStatus::Ok as i32
        );
        assert_eq!(
            rawmem_stack_push(s, std::ptr::null(), 1),
            RawmemStatus::InvalidArgument as i32
        );
        rawmem_stack_destroy(s);
    }

    #[test]
    fn reset_then_free_then_destroy() {
        let s = new_stack(2);
        rawmem_stack_push(s, b"z".as_ptr(), 1);
        assert_eq!(rawmem_stack_reset(s), RawmemStatus::Ok as i32);
        assert_eq!(pop(s), Err(RawmemStatus::StackUnderflow as i32));
        assert_eq!(rawmem_stack_free(s), RawmemStatus::Ok as i32);
        assert_eq!(rawmem_stack_free(s), RawmemStatus::Ok as i32);
        assert_eq!(
            rawmem_stack_push(s, b"z".as_ptr(), 1),
            RawmemStatus::Released as i32
        );
        assert_eq!(rawmem_stack_destroy(s), RawmemStatus::Ok as i32);
        assert_eq!(rawmem_stack_reset(s), RawmemStatus::InvalidHandle as i32);
    }

    #[test]
    fn stack_handle_rejected_by_arena_functions() {
        let s = new_stack(2);
        assert_eq!(
            crate::arena::rawmem_arena_reset(s),
            RawmemStatus::InvalidHandle as i32
        );
        rawmem_stack_destroy(s);
    }
}
