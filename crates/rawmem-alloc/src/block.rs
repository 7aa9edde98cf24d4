//! Contiguous raw memory blocks with a movable offset.
//!
//! A [`MemoryBlock`] is the storage primitive behind [`Arena`](crate::Arena)
//! and [`Stack`](crate::Stack): one system allocation of fixed size plus an
//! offset that the owner advances and rewinds. The block only enforces
//! `offset <= size`; what the offset means is up to the owner.

use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;

use rawmem_core::{AllocConfig, MemError};
use tracing::debug;

use crate::raw;

/// A single fixed-size allocation with a high-water offset.
///
/// Requests that would move the offset past `size` are rejected, never
/// clamped. After [`release`](MemoryBlock::release) the base is gone and
/// every operation that needs memory reports [`MemError::Released`].
pub struct MemoryBlock {
    /// Base of the allocation. `None` once released.
    base: Option<NonNull<u8>>,
    /// Layout the storage was allocated with; `layout.size()` is the capacity.
    layout: Layout,
    /// Bump position or stack top, depending on the owner.
    offset: usize,
}

// SAFETY: the block exclusively owns its allocation, the same way `Vec<u8>`
// owns its buffer. Raw addresses derived from it carry no aliasing guarantees.
#[allow(unsafe_code)]
unsafe impl Send for MemoryBlock {}

impl MemoryBlock {
    /// Allocate a zero-initialised block of `size` bytes.
    pub fn new(size: usize, config: &AllocConfig) -> Result<Self, MemError> {
        let layout = raw::layout_for(size, config)?;
        let base = raw::allocate_zeroed(layout)?;
        debug!(addr = base.as_ptr() as usize, size, "memory block allocated");
        Ok(Self {
            base: Some(base),
            layout,
            offset: 0,
        })
    }

    /// Total capacity in bytes. Unchanged by release.
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    /// Current offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes between the offset and the end of the block.
    pub fn remaining(&self) -> usize {
        self.size() - self.offset
    }

    /// Whether the backing storage has been released.
    pub fn is_released(&self) -> bool {
        self.base.is_none()
    }

    /// Base address as an integer, or 0 once released.
    pub fn base_addr(&self) -> usize {
        self.base.map_or(0, |b| b.as_ptr() as usize)
    }

    /// Advance the offset by `len` bytes.
    ///
    /// Returns the offset before the advance, or `None` (offset unchanged)
    /// if the block does not have `len` bytes left.
    pub fn claim(&mut self, len: usize) -> Option<usize> {
        let end = self.offset.checked_add(len)?;
        if end > self.size() {
            return None;
        }
        let start = self.offset;
        self.offset = end;
        Some(start)
    }

    /// Move the offset back by one byte.
    ///
    /// Returns the new offset, or `None` if the offset is already 0.
    pub fn retreat(&mut self) -> Option<usize> {
        self.offset = self.offset.checked_sub(1)?;
        Some(self.offset)
    }

    /// Rewind the offset to 0. Memory is neither released nor zeroed.
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Address of the byte at `at`, which must not exceed `size`.
    pub(crate) fn address_of(&self, at: usize) -> Result<NonNull<u8>, MemError> {
        debug_assert!(at <= self.size());
        let base = self.base.ok_or(MemError::Released)?;
        // `at <= size` keeps the result inside or one past the allocation,
        // so it cannot wrap to null.
        NonNull::new(base.as_ptr().wrapping_add(at)).ok_or(MemError::Released)
    }

    /// Release the backing storage.
    ///
    /// Returns `true` if storage was released by this call, `false` if it
    /// had already been released. The offset is left as it was.
    #[allow(unsafe_code)]
    pub fn release(&mut self) -> bool {
        let Some(base) = self.base.take() else {
            return false;
        };
        // SAFETY: `base` came from `allocate_zeroed(self.layout)` in `new`
        // and `take()` guarantees it is released at most once.
        unsafe { raw::release(base, self.layout) };
        debug!(addr = base.as_ptr() as usize, size = self.size(), "memory block released");
        true
    }
}

impl Drop for MemoryBlock {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for MemoryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBlock")
            .field("base", &format_args!("{:#x}", self.base_addr()))
            .field("size", &self.size())
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(size: usize) -> MemoryBlock {
        MemoryBlock::new(size, &AllocConfig::default()).unwrap()
    }

    #[test]
    fn new_block_is_empty() {
        let b = block(64);
        assert_eq!(b.size(), 64);
        assert_eq!(b.offset(), 0);
        assert_eq!(b.remaining(), 64);
        assert!(!b.is_released());
        assert_ne!(b.base_addr(), 0);
    }

    #[test]
    fn zero_size_block_rejected() {
        let result = MemoryBlock::new(0, &AllocConfig::default());
        assert!(matches!(result, Err(MemError::InvalidSize { size: 0 })));
    }

    #[test]
    fn claim_advances_and_returns_start() {
        let mut b = block(16);
        assert_eq!(b.claim(6), Some(0));
        assert_eq!(b.claim(10), Some(6));
        assert_eq!(b.offset(), 16);
        assert_eq!(b.remaining(), 0);
    }

    #[test]
    fn claim_past_end_leaves_offset_unchanged() {
        let mut b = block(16);
        b.claim(10).unwrap();
        assert_eq!(b.claim(7), None);
        assert_eq!(b.offset(), 10);
    }

    #[test]
    fn claim_overflow_is_rejected() {
        let mut b = block(16);
        b.claim(1).unwrap();
        assert_eq!(b.claim(usize::MAX), None);
        assert_eq!(b.offset(), 1);
    }

    #[test]
    fn retreat_stops_at_zero() {
        let mut b = block(4);
        b.claim(2).unwrap();
        assert_eq!(b.retreat(), Some(1));
        assert_eq!(b.retreat(), Some(0));
        assert_eq!(b.retreat(), None);
        assert_eq!(b.offset(), 0);
    }

    #[test]
    fn release_is_idempotent() {
        let mut b = block(8);
        assert!(b.release());
        assert!(b.is_released());
        assert!(!b.release());
        assert_eq!(b.base_addr(), 0);
        assert_eq!(b.size(), 8);
    }

    #[test]
    fn address_of_released_block_fails() {
        let mut b = block(8);
        assert!(b.address_of(4).is_ok());
        b.release();
        assert_eq!(b.address_of(4), Err(MemError::Released));
    }

    #[test]
    fn debug_output_names_fields() {
        let b = block(8);
        let s = format!("{b:?}");
        assert!(s.contains("size: 8"));
        assert!(s.contains("offset: 0"));
    }
}
