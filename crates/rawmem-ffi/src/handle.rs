//! Kind-tagged slot+generation handle tables.
//!
//! Every table belongs to one [`HandleKind`], and the kind is encoded into
//! each handle it issues. Passing an arena handle to a pointer function, a
//! destroyed handle, or a handle from a previous slot occupant all resolve
//! to `None` instead of touching the wrong object.

/// Which table a handle was issued by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum HandleKind {
    Pointer = 1,
    Arena = 2,
    Stack = 3,
}

/// Highest slot index a handle can encode (24 bits).
const MAX_SLOT: u32 = (1 << 24) - 1;

/// Handle encoding: bits 56..64 = kind, 32..56 = slot, 0..32 = generation.
fn encode(kind: HandleKind, slot: u32, generation: u32) -> u64 {
    ((kind as u64) << 56) | ((slot as u64) << 32) | generation as u64
}

fn decode(handle: u64) -> (u8, u32, u32) {
    let kind = (handle >> 56) as u8;
    let slot = ((handle >> 32) as u32) & MAX_SLOT;
    let generation = handle as u32;
    (kind, slot, generation)
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Owned values addressed by `u64` handles of a single kind.
///
/// Removal bumps the slot generation and returns the slot to the free list,
/// so stale handles never alias a newer value.
pub(crate) struct HandleTable<T> {
    kind: HandleKind,
    slots: Vec<Slot<T>>,
    free_slots: Vec<u32>,
    live: usize,
}

impl<T> HandleTable<T> {
    pub const fn new(kind: HandleKind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
            free_slots: Vec::new(),
            live: 0,
        }
    }

    /// Store `value` and return its handle.
    ///
    /// Once every encodable slot is in use the value is handed back as
    /// `Err` so the caller can dispose of it.
    pub fn insert(&mut self, value: T) -> Result<u64, T> {
        let slot_idx = match self.free_slots.pop() {
            Some(idx) => idx,
            None => {
                let Some(idx) = u32::try_from(self.slots.len())
                    .ok()
                    .filter(|&i| i <= MAX_SLOT)
                else {
                    return Err(value);
                };
                self.slots.push(Slot {
                    generation: 0,
                    value: None,
                });
                idx
            }
        };
        let slot = &mut self.slots[slot_idx as usize];
        slot.value = Some(value);
        self.live += 1;
        Ok(encode(self.kind, slot_idx, slot.generation))
    }

    /// Whether [`insert`](HandleTable::insert) would succeed.
    pub fn has_room(&self) -> bool {
        !self.free_slots.is_empty() || self.slots.len() <= MAX_SLOT as usize
    }

    fn resolve(&self, handle: u64) -> Option<usize> {
        let (kind, slot_idx, generation) = decode(handle);
        if kind != self.kind as u8 {
            return None;
        }
        let slot = self.slots.get(slot_idx as usize)?;
        (slot.generation == generation && slot.value.is_some()).then_some(slot_idx as usize)
    }

    pub fn get(&self, handle: u64) -> Option<&T> {
        let idx = self.resolve(handle)?;
        self.slots[idx].value.as_ref()
    }

    pub fn get_mut(&mut self, handle: u64) -> Option<&mut T> {
        let idx = self.resolve(handle)?;
        self.slots[idx].value.as_mut()
    }

    /// Take the value out and retire the handle.
    ///
    /// A slot whose generation wraps back to 0 is never reused, so a handle
    /// from its first occupant cannot come back to life.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let idx = self.resolve(handle)?;
        let slot = &mut self.slots[idx];
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation != 0 {
            self.free_slots.push(idx as u32);
        }
        self.live -= 1;
        Some(value)
    }

    /// Number of values currently stored.
    pub fn len(&self) -> usize {
        self.live
    }
}
