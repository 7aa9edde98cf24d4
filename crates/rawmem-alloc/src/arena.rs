//! Fixed-capacity bump allocator.
//!
//! [`Arena`] carves consecutive spans out of one [`MemoryBlock`] by
//! advancing its offset. Spans are never freed individually: [`Arena::reset`]
//! rewinds to the start and [`Arena::free`] releases the whole block.
//! Running out of space is an expected condition and comes back as
//! `Ok(None)`, not an error.

use rawmem_core::{AllocConfig, MemError, ARENA_EXHAUSTED};
use tracing::debug;

use crate::block::MemoryBlock;
use crate::pointer::{Origin, Pointer};

/// Bump allocator over a single fixed-size block.
///
/// Every pointer returned by [`alloc`](Arena::alloc) lies inside the block,
/// and spans issued since the last reset never overlap. Pointers issued
/// before a `reset` or `free` are not invalidated; using them afterwards is
/// the caller's hazard.
#[derive(Debug)]
pub struct Arena {
    memory: MemoryBlock,
}

impl Arena {
    /// Create an arena of `capacity` bytes with the default [`AllocConfig`].
    pub fn new(capacity: usize) -> Result<Self, MemError> {
        Self::with_config(capacity, &AllocConfig::default())
    }

    /// Create an arena of `capacity` bytes under `config`.
    pub fn with_config(capacity: usize, config: &AllocConfig) -> Result<Self, MemError> {
        let memory = MemoryBlock::new(capacity, config)?;
        debug!(capacity, addr = memory.base_addr(), "arena created");
        Ok(Self { memory })
    }

    /// Bump-allocate `size` bytes.
    ///
    /// Returns `Ok(Some(ptr))` with `ptr` at `base + offset`, then advances
    /// the offset by `size`. Returns `Ok(None)`, offset unchanged, when
    /// `offset + size > capacity`. Fails with [`MemError::Released`] after
    /// [`free`](Arena::free).
    pub fn alloc(&mut self, size: usize) -> Result<Option<Pointer>, MemError> {
        if self.memory.is_released() {
            return Err(MemError::Released);
        }
        let Some(start) = self.memory.claim(size) else {
            debug!(
                size,
                offset = self.memory.offset(),
                capacity = self.memory.size(),
                "{}",
                ARENA_EXHAUSTED
            );
            return Ok(None);
        };
        let addr = self.memory.address_of(start)?;
        Ok(Some(Pointer::new(addr, size, Origin::Arena)))
    }

    /// Rewind the offset to 0. Memory is kept and not zeroed.
    pub fn reset(&mut self) {
        self.memory.reset();
    }

    /// Release the backing storage. Freeing again is a no-op.
    pub fn free(&mut self) {
        if self.memory.release() {
            debug!(capacity = self.memory.size(), "arena freed");
        }
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.memory.size()
    }

    /// Bytes handed out since creation or the last reset.
    pub fn used(&self) -> usize {
        self.memory.offset()
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.memory.remaining()
    }

    /// Whether [`free`](Arena::free) has released the storage.
    pub fn is_freed(&self) -> bool {
        self.memory.is_released()
    }

    /// Base address of the block, 0 once freed.
    pub fn base_addr(&self) -> usize {
        self.memory.base_addr()
    }
}
