//! C FFI bindings for the rawmem allocators.
//!
//! Exposes heap, arena, stack and pointer operations to an embedding host
//! as `extern "C"` functions over opaque `u64` handles. Every function
//! returns an `i32` [`RawmemStatus`](status::RawmemStatus). This crate is
//! one of two that may contain `unsafe` code (along with `rawmem-alloc`).
//!
//! Handles stay valid after `*_free` so hosts can still observe the freed
//! state (`rawmem_pointer_is_null`, repeated `rawmem_heap_free`); the
//! `*_destroy` functions drop the handle itself and are what a host
//! finalizer should call.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, converting a panic into `RawmemStatus::Panicked`.
macro_rules! ffi_guard {
    ($body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(status) => status,
            Err(_) => {
                tracing::error!("panic caught at FFI boundary");
                $crate::status::RawmemStatus::Panicked as i32
            }
        }
    };
}

/// Lock a handle table, returning `RawmemStatus::InternalError` from the
/// enclosing FFI body if the mutex is poisoned.
macro_rules! ffi_lock {
    ($table:expr) => {
        match $table.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::RawmemStatus::InternalError as i32,
        }
    };
}

pub mod arena;
pub(crate) mod handle;
pub mod heap;
pub mod pointer;
pub mod stack;
pub mod status;

pub use status::RawmemStatus;
