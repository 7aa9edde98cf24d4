//! rawmem: unmanaged heap, arena and stack memory for embedding hosts.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the rawmem sub-crates. Hosts that bind through C should link `rawmem-ffi`
//! instead.
//!
//! # Quick start
//!
//! ```rust
//! use rawmem::prelude::*;
//!
//! let mut arena = Arena::new(32).unwrap();
//! let header = arena.alloc(8).unwrap().expect("fits");
//! let body = arena.alloc(24).unwrap().expect("fits");
//! assert!(arena.alloc(1).unwrap().is_none());
//! assert_eq!(body.addr() - header.addr(), 8);
//!
//! // SAFETY: the arena is live and has not been reset.
//! unsafe {
//!     body.write(0, b'x').unwrap();
//!     assert_eq!(body.read(0).unwrap(), b'x');
//! }
//!
//! let mut stack = Stack::new(4).unwrap();
//! stack.push(b"ok").unwrap();
//! assert_eq!(stack.pop().unwrap(), b'k');
//!
//! let mut ptr = heap::malloc(16).unwrap();
//! heap::free(&mut ptr).unwrap();
//! assert!(ptr.is_null());
//! assert!(matches!(heap::free(&mut ptr), Err(MemError::InvalidPointer)));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rawmem-core` | `MemError`, `AllocConfig` |
//! | [`alloc`] | `rawmem-alloc` | `Arena`, `Stack`, `Pointer`, heap registry |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Error taxonomy and allocation configuration (`rawmem-core`).
pub use rawmem_core as types;

/// Allocators and raw pointers (`rawmem-alloc`).
///
/// [`alloc::heap`] tracks individual allocations in a process-wide registry;
/// [`alloc::Arena`] and [`alloc::Stack`] carve one fixed block.
pub use rawmem_alloc as alloc;

/// Heap allocation (`malloc`/`free`) and live-allocation introspection.
pub use rawmem_alloc::{heap, registry};

/// Common imports for typical rawmem usage.
///
/// ```rust
/// use rawmem::prelude::*;
/// ```
pub mod prelude {
    pub use rawmem_alloc::{heap, Arena, Origin, Pointer, Stack};
    pub use rawmem_core::{AllocConfig, MemError, ARENA_EXHAUSTED};
}
