//! Low-level primitives over the system allocator.
//!
//! Every allocation and release in this crate goes through these functions.
//! Each `unsafe` block carries a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use rawmem_core::{AllocConfig, MemError};

/// Build the layout for a `size`-byte request under `config`.
///
/// Rejects zero-byte requests and requests above `config.max_bytes` before
/// the system allocator is consulted.
pub(crate) fn layout_for(size: usize, config: &AllocConfig) -> Result<Layout, MemError> {
    config.validate()?;
    if size == 0 {
        return Err(MemError::InvalidSize { size });
    }
    if size > config.max_bytes {
        return Err(MemError::AllocationFailure { size });
    }
    Layout::from_size_align(size, config.align).map_err(|_| MemError::AllocationFailure { size })
}

/// Allocate zero-initialised storage for `layout`.
///
/// Zeroing keeps every byte a pointer can read initialised.
pub(crate) fn allocate_zeroed(layout: Layout) -> Result<NonNull<u8>, MemError> {
    // SAFETY: `layout_for` is the only producer of layouts and never yields
    // a zero-sized one.
    let ptr = unsafe { alloc::alloc_zeroed(layout) };
    NonNull::new(ptr).ok_or(MemError::AllocationFailure {
        size: layout.size(),
    })
}

/// Return storage to the system allocator.
///
/// # Safety
///
/// `ptr` must come from [`allocate_zeroed`] with exactly `layout`, and must
/// not have been released already.
pub(crate) unsafe fn release(ptr: NonNull<u8>, layout: Layout) {
    // SAFETY: forwarded from the caller contract.
    unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
}

/// Copy `bytes` to `dst`.
///
/// # Safety
///
/// `dst` must be valid for `bytes.len()` writes and must not overlap `bytes`.
pub(crate) unsafe fn copy_in(dst: NonNull<u8>, bytes: &[u8]) {
    // SAFETY: forwarded from the caller contract.
    unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), dst.as_ptr(), bytes.len()) }
}

/// Read the byte at `src`.
///
/// # Safety
///
/// `src` must be valid for a one-byte read.
pub(crate) unsafe fn read_byte(src: *const u8) -> u8 {
    // SAFETY: forwarded from the caller contract.
    unsafe { src.read() }
}

/// Store `value` at `dst`.
///
/// # Safety
///
/// `dst` must be valid for a one-byte write.
pub(crate) unsafe fn write_byte(dst: *mut u8, value: u8) {
    // SAFETY: forwarded from the caller contract.
    unsafe { dst.write(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_rejected_before_allocating() {
        let result = layout_for(0, &AllocConfig::default());
        assert_eq!(result, Err(MemError::InvalidSize { size: 0 }));
    }

    #[test]
    fn ceiling_rejects_oversized_request() {
        let config = AllocConfig {
            max_bytes: 64,
            ..AllocConfig::default()
        };
        assert!(layout_for(64, &config).is_ok());
        assert_eq!(
            layout_for(65, &config),
            Err(MemError::AllocationFailure { size: 65 })
        );
    }

    #[test]
    fn invalid_config_surfaces_as_config_error() {
        let result = layout_for(8, &AllocConfig::with_align(3));
        assert!(matches!(result, Err(MemError::Config(_))));
    }

    #[test]
    fn allocation_is_zeroed_and_aligned() {
        let layout = layout_for(32, &AllocConfig::with_align(64)).unwrap();
        let ptr = allocate_zeroed(layout).unwrap();
        assert_eq!(ptr.as_ptr() as usize % 64, 0);
        // SAFETY: 32 bytes were just allocated at ptr.
        unsafe {
            for i in 0..32 {
                assert_eq!(read_byte(ptr.as_ptr().add(i)), 0);
            }
            write_byte(ptr.as_ptr().add(31), 0xAB);
            assert_eq!(read_byte(ptr.as_ptr().add(31)), 0xAB);
            release(ptr, layout);
        }
    }
}
