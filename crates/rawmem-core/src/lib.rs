//! Core types for the rawmem allocators.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! error taxonomy shared by every allocator and the FFI layer, and the
//! allocation configuration applied to each system allocation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;

pub use config::{AllocConfig, ConfigError};
pub use error::{MemError, ARENA_EXHAUSTED};
