//! Heap, arena and stack allocators over raw memory.
//!
//! Hands out raw addresses a host can read and write byte-by-byte, with the
//! bookkeeping each strategy needs to keep those addresses honest. This crate
//! is one of two that may contain `unsafe` code (along with `rawmem-ffi`).
//!
//! # Architecture
//!
//! ```text
//! heap::malloc / heap::free ──► registry (process-wide, address → layout)
//! Arena ──► MemoryBlock (bump offset, reset, idempotent free)
//! Stack ──► MemoryBlock (LIFO offset, byte pop, idempotent free)
//! Pointer (address + span length) ◄── heap::malloc, Arena::alloc
//! ```
//!
//! # Free semantics
//!
//! - **Heap:** `free` nulls the pointer; a second `free` is `InvalidPointer`.
//! - **Arena / Stack:** `free` releases the block; a second `free` is a no-op.
//!
//! # Safety boundary
//!
//! Allocation and release are confined to `raw.rs`. Pointer access is
//! exposed as `unsafe fn`: the checked forms validate null and span extent,
//! but no form can prove the owning allocation is still live.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod block;
pub mod heap;
pub mod pointer;
mod raw;
pub mod registry;
pub mod stack;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use block::MemoryBlock;
pub use pointer::{Origin, Pointer};
pub use registry::HeapRegistry;
pub use stack::Stack;

pub use rawmem_core::{AllocConfig, ConfigError, MemError, ARENA_EXHAUSTED};
