//! Fixed-capacity LIFO byte buffer.
//!
//! [`Stack::push`] copies a whole byte span onto the top; [`Stack::pop`]
//! removes a single byte. A two-byte push therefore takes two pops to undo.

use rawmem_core::{AllocConfig, MemError};
use tracing::{debug, trace};

use crate::block::MemoryBlock;
use crate::raw;

/// LIFO byte buffer over a single fixed-size block.
///
/// The block offset is always the exact number of bytes on the stack.
/// Overflow and underflow are hard errors.
#[derive(Debug)]
pub struct Stack {
    memory: MemoryBlock,
}

impl Stack {
    /// Create a stack of `capacity` bytes with the default [`AllocConfig`].
    pub fn new(capacity: usize) -> Result<Self, MemError> {
        Self::with_config(capacity, &AllocConfig::default())
    }

    /// Create a stack of `capacity` bytes under `config`.
    pub fn with_config(capacity: usize, config: &AllocConfig) -> Result<Self, MemError> {
        let memory = MemoryBlock::new(capacity, config)?;
        debug!(capacity, addr = memory.base_addr(), "stack created");
        Ok(Self { memory })
    }

    /// Copy `bytes` onto the top of the stack.
    ///
    /// Fails with [`MemError::StackOverflow`], leaving the stack untouched,
    /// if the span does not fit. An empty span is a no-op.
    #[allow(unsafe_code)]
    pub fn push(&mut self, bytes: &[u8]) -> Result<(), MemError> {
        if self.memory.is_released() {
            return Err(MemError::Released);
        }
        let available = self.memory.remaining();
        let Some(start) = self.memory.claim(bytes.len()) else {
            return Err(MemError::StackOverflow {
                requested: bytes.len(),
                available,
            });
        };
        let dst = self.memory.address_of(start)?;
        // SAFETY: `claim` reserved `bytes.len()` bytes at `start` inside the
        // live block, and a borrowed slice cannot alias block storage.
        unsafe { raw::copy_in(dst, bytes) };
        trace!(len = bytes.len(), top = self.memory.offset(), "stack push");
        Ok(())
    }

    /// Remove the top byte and return it.
    ///
    /// Fails with [`MemError::StackUnderflow`] on an empty stack.
    #[allow(unsafe_code)]
    pub fn pop(&mut self) -> Result<u8, MemError> {
        if self.memory.is_released() {
            return Err(MemError::Released);
        }
        let top = self.memory.retreat().ok_or(MemError::StackUnderflow)?;
        let src = self.memory.address_of(top)?;
        // SAFETY: `top < size` after `retreat`, inside the live block, and
        // every byte of the block was zero-initialised at allocation.
        let value = unsafe { raw::read_byte(src.as_ptr()) };
        trace!(value, top, "stack pop");
        Ok(value)
    }

    /// Empty the stack. Storage is kept and not zeroed.
    pub fn reset(&mut self) {
        self.memory.reset();
    }

    /// Release the backing storage. Freeing again is a no-op.
    pub fn free(&mut self) {
        if self.memory.release() {
            debug!(capacity = self.memory.size(), "stack freed");
        }
    }

    /// Bytes currently on the stack.
    pub fn len(&self) -> usize {
        self.memory.offset()
    }

    /// Whether the stack holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.memory.offset() == 0
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.memory.size()
    }

    /// Bytes that can still be pushed.
    pub fn remaining(&self) -> usize {
        self.memory.remaining()
    }

    /// Whether [`free`](Stack::free) has released the storage.
    pub fn is_freed(&self) -> bool {
        self.memory.is_released()
    }
}
