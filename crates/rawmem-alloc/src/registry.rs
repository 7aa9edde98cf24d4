//! Process-wide tracking of live heap allocations.
//!
//! Every address handed out by [`heap::malloc`](crate::heap::malloc) is
//! recorded here with its layout until [`heap::free`](crate::heap::free)
//! removes it. Presence is the liveness marker: `free` on an address that
//! is not present is rejected instead of double-releasing memory, and hosts
//! with their own collector can treat the registry as the root set that
//! keeps heap-backed wrappers reachable.
//!
//! The global instance is created on first use and never torn down.

use std::alloc::Layout;
use std::sync::{Mutex, OnceLock, PoisonError};

use indexmap::IndexMap;

/// Mapping from live heap address to the layout it was allocated with.
#[derive(Debug, Default)]
pub struct HeapRegistry {
    live: IndexMap<usize, Layout>,
}

impl HeapRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `addr` as live. Returns `false` if it was already present.
    pub fn register(&mut self, addr: usize, layout: Layout) -> bool {
        self.live.insert(addr, layout).is_none()
    }

    /// Remove `addr`, returning the layout it was registered with.
    pub fn unregister(&mut self, addr: usize) -> Option<Layout> {
        self.live.swap_remove(&addr)
    }

    /// Whether `addr` is currently live.
    pub fn is_live(&self, addr: usize) -> bool {
        self.live.contains_key(&addr)
    }

    /// Number of live allocations.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no allocation is live.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Total bytes across live allocations.
    pub fn live_bytes(&self) -> usize {
        self.live.values().map(Layout::size).sum()
    }
}

static REGISTRY: OnceLock<Mutex<HeapRegistry>> = OnceLock::new();

/// Run `f` against the global registry, creating it on first use.
///
/// The map is consistent after every single insert or remove, so a lock
/// poisoned by a panic elsewhere is recovered rather than propagated.
fn with_registry<R>(f: impl FnOnce(&mut HeapRegistry) -> R) -> R {
    let lock = REGISTRY.get_or_init(|| Mutex::new(HeapRegistry::new()));
    let mut guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

pub(crate) fn register(addr: usize, layout: Layout) -> bool {
    with_registry(|r| r.register(addr, layout))
}

pub(crate) fn unregister(addr: usize) -> Option<Layout> {
    with_registry(|r| r.unregister(addr))
}

/// Whether `addr` is a live heap allocation.
pub fn is_live(addr: usize) -> bool {
    with_registry(|r| r.is_live(addr))
}

/// Number of live heap allocations across the process.
pub fn live_count() -> usize {
    with_registry(|r| r.len())
}

/// Total bytes held by live heap allocations across the process.
pub fn live_bytes() -> usize {
    with_registry(|r| r.live_bytes())
}
