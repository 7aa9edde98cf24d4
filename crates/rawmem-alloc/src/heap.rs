//! General-purpose heap allocation tracked by the global registry.
//!
//! [`malloc`] hands out a [`Pointer`] to fresh zeroed storage and records it
//! in the [registry](crate::registry). [`free`] checks the registry before
//! releasing anything and nulls the pointer in place, so freeing twice is an
//! [`InvalidPointer`](MemError::InvalidPointer) error rather than a
//! double release. Heap storage is only ever returned by `free`; dropping a
//! `Pointer` leaves the allocation live until process exit.

use rawmem_core::{AllocConfig, MemError};
use tracing::{debug, warn};

use crate::pointer::{Origin, Pointer};
use crate::{raw, registry};

/// Allocate `size` bytes with the default [`AllocConfig`].
pub fn malloc(size: usize) -> Result<Pointer, MemError> {
    malloc_with_config(size, &AllocConfig::default())
}

/// Allocate `size` bytes under `config`.
///
/// Fails with [`MemError::AllocationFailure`] if the system allocator
/// refuses or `size` exceeds `config.max_bytes`, and with
/// [`MemError::InvalidSize`] for `size == 0`. Nothing is registered on
/// failure.
pub fn malloc_with_config(size: usize, config: &AllocConfig) -> Result<Pointer, MemError> {
    let layout = raw::layout_for(size, config)?;
    let base = raw::allocate_zeroed(layout).inspect_err(|_| {
        warn!(size, "system allocator refused heap request");
    })?;
    let addr = base.as_ptr() as usize;
    let fresh = registry::register(addr, layout);
    debug_assert!(fresh, "allocator returned a live address");
    debug!(addr, size, "heap malloc");
    Ok(Pointer::new(base, size, Origin::Heap))
}

/// Release the allocation behind `ptr` and null it.
///
/// Fails with [`MemError::InvalidPointer`] if `ptr` is null, was already
/// freed, or was not issued by [`malloc`]. Arena pointers are rejected by
/// origin before the registry is consulted, so a stale arena address that
/// now belongs to a heap block cannot release it. On failure nothing is
/// released and `ptr` is left as it was.
#[allow(unsafe_code)]
pub fn free(ptr: &mut Pointer) -> Result<(), MemError> {
    let Some(base) = ptr.as_non_null() else {
        warn!("heap free of null pointer");
        return Err(MemError::InvalidPointer);
    };
    let addr = base.as_ptr() as usize;
    if ptr.origin() != Some(Origin::Heap) {
        warn!(addr, origin = ?ptr.origin(), "heap free of non-heap pointer");
        return Err(MemError::InvalidPointer);
    }
    let Some(layout) = registry::unregister(addr) else {
        warn!(addr, "heap free of untracked address");
        return Err(MemError::InvalidPointer);
    };
    // SAFETY: the registry entry was created by `malloc_with_config` from
    // `allocate_zeroed(layout)` and `unregister` removed it, so this is the
    // only release of `base`.
    unsafe { raw::release(base, layout) };
    ptr.invalidate();
    debug!(addr, size = layout.size(), "heap free");
    Ok(())
}
