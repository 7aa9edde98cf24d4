//! Fixtures shared by the rawmem benchmarks.
//!
//! - [`SPAN_SIZES`]: request sizes swept by the allocation benches
//! - [`filled_arena`]: an arena already carved into fixed-size spans
//! - [`filled_stack`]: a stack pushed to capacity

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rawmem_alloc::{Arena, Stack};

/// Request sizes used by the allocation benches, in bytes.
pub const SPAN_SIZES: [usize; 4] = [8, 64, 512, 4096];

/// Capacity of the arenas and stacks built by the fixtures.
pub const BLOCK_CAPACITY: usize = 1 << 20;

/// Build an arena of [`BLOCK_CAPACITY`] bytes and allocate `span`-sized
/// pieces until it is exhausted. Returns the arena and the allocation count.
pub fn filled_arena(span: usize) -> (Arena, usize) {
    let mut arena = Arena::new(BLOCK_CAPACITY).unwrap();
    let mut count = 0;
    while arena.alloc(span).unwrap().is_some() {
        count += 1;
    }
    (arena, count)
}

/// Build a stack of [`BLOCK_CAPACITY`] bytes filled with a repeating pattern.
pub fn filled_stack() -> Stack {
    let mut stack = Stack::new(BLOCK_CAPACITY).unwrap();
    let chunk: Vec<u8> = (0..=255u8).collect();
    while stack.remaining() >= chunk.len() {
        stack.push(&chunk).unwrap();
    }
    stack
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_arena_is_exhausted() {
        let (arena, count) = filled_arena(64);
        assert_eq!(count, BLOCK_CAPACITY / 64);
        assert_eq!(arena.remaining(), 0);
    }

    #[test]
    fn filled_stack_is_full() {
        let stack = filled_stack();
        assert_eq!(stack.len(), BLOCK_CAPACITY);
    }
}
