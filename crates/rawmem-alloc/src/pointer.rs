//! Raw pointers handed out by the heap and arena allocators.
//!
//! A [`Pointer`] is a view: it records an address and the length of the
//! span it was issued for, and owns nothing. The memory behind it belongs to
//! the heap registry or to an arena. Heap pointers are nulled in place by
//! [`heap::free`](crate::heap::free) so later use is detectable. Each pointer
//! also remembers its [`Origin`], so an arena address the system allocator
//! later reuses for a heap block is never mistaken for that block.

use std::fmt;
use std::ptr::{self, NonNull};

use rawmem_core::MemError;
use tracing::trace;

use crate::raw;

/// Allocator a [`Pointer`] was issued by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// [`heap::malloc`](crate::heap::malloc).
    Heap,
    /// [`Arena::alloc`](crate::Arena::alloc).
    Arena,
}

/// Address of a byte span plus the span length.
///
/// Byte access comes in two forms. The `*_unchecked` methods compute
/// `address + offset` and touch memory with no validation at all. The
/// checked methods reject a null pointer ([`MemError::InvalidPointer`]) and
/// offsets outside the issued span ([`MemError::OutOfBounds`]). Neither form
/// can tell whether the owner has since freed or reset the memory, so both
/// are `unsafe`.
pub struct Pointer {
    addr: Option<NonNull<u8>>,
    len: usize,
    origin: Option<Origin>,
}

// SAFETY: a `Pointer` is an address and a length. Every dereference goes
// through an `unsafe fn` whose contract covers the memory's owner.
#[allow(unsafe_code)]
unsafe impl Send for Pointer {}

impl Pointer {
    pub(crate) fn new(addr: NonNull<u8>, len: usize, origin: Origin) -> Self {
        Self {
            addr: Some(addr),
            len,
            origin: Some(origin),
        }
    }

    /// A pointer to nothing. Hosts use it for absent handles.
    pub fn null() -> Self {
        Self {
            addr: None,
            len: 0,
            origin: None,
        }
    }

    /// Whether the address is null, either from [`Pointer::null`] or
    /// because the heap allocation behind it was freed.
    pub fn is_null(&self) -> bool {
        self.addr.is_none()
    }

    /// The address as an integer, 0 when null.
    pub fn addr(&self) -> usize {
        self.addr.map_or(0, |a| a.as_ptr() as usize)
    }

    /// Length of the span this pointer was issued for, 0 when null.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Allocator that issued this pointer, `None` for [`Pointer::null`].
    ///
    /// A freed heap pointer keeps `Some(Origin::Heap)`.
    pub fn origin(&self) -> Option<Origin> {
        self.origin
    }

    /// Whether the span is zero bytes long.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn as_non_null(&self) -> Option<NonNull<u8>> {
        self.addr
    }

    pub(crate) fn invalidate(&mut self) {
        self.addr = None;
        self.len = 0;
    }

    fn raw_at(&self, offset: usize) -> *mut u8 {
        self.addr
            .map_or(ptr::null_mut(), NonNull::as_ptr)
            .wrapping_add(offset)
    }

    fn checked_at(&self, offset: usize) -> Result<*mut u8, MemError> {
        if self.addr.is_none() {
            return Err(MemError::InvalidPointer);
        }
        if offset >= self.len {
            return Err(MemError::OutOfBounds {
                offset,
                len: self.len,
            });
        }
        Ok(self.raw_at(offset))
    }

    /// Read the byte at `address + offset` with no validation.
    ///
    /// # Safety
    ///
    /// `address + offset` must lie inside a live allocation. Null pointers,
    /// offsets past the owning block, freed heap memory and arena memory
    /// after `reset` or `free` are all undefined behaviour.
    #[allow(unsafe_code)]
    pub unsafe fn read_unchecked(&self, offset: usize) -> u8 {
        // SAFETY: forwarded from the caller contract.
        unsafe { raw::read_byte(self.raw_at(offset)) }
    }

    /// Store `value` at `address + offset` with no validation.
    ///
    /// # Safety
    ///
    /// Same contract as [`Pointer::read_unchecked`].
    #[allow(unsafe_code)]
    pub unsafe fn write_unchecked(&self, offset: usize, value: u8) {
        // SAFETY: forwarded from the caller contract.
        unsafe { raw::write_byte(self.raw_at(offset), value) }
    }

    /// Read the byte at `offset` within the issued span.
    ///
    /// # Safety
    ///
    /// The memory the pointer was issued for must still be live: not freed
    /// through the heap, and not reset or freed through the owning arena.
    #[allow(unsafe_code)]
    pub unsafe fn read(&self, offset: usize) -> Result<u8, MemError> {
        let at = self.checked_at(offset)?;
        // SAFETY: `at` is inside the issued span; liveness is the caller's.
        let value = unsafe { raw::read_byte(at) };
        trace!(addr = at as usize, value, "pointer read");
        Ok(value)
    }

    /// Store `value` at `offset` within the issued span.
    ///
    /// # Safety
    ///
    /// Same contract as [`Pointer::read`].
    #[allow(unsafe_code)]
    pub unsafe fn write(&self, offset: usize, value: u8) -> Result<(), MemError> {
        let at = self.checked_at(offset)?;
        // SAFETY: `at` is inside the issued span; liveness is the caller's.
        unsafe { raw::write_byte(at, value) };
        trace!(addr = at as usize, value, "pointer write");
        Ok(())
    }
}

impl fmt::Debug for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pointer")
            .field("addr", &format_args!("{:#x}", self.addr()))
            .field("len", &self.len)
            .field("origin", &self.origin)
            .finish()
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr {
            Some(_) => write!(f, "Pointer({:#x}, len={})", self.addr(), self.len),
            None => write!(f, "Pointer(null)"),
        }
    }
}
