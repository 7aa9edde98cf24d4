//! Allocation configuration parameters.

use thiserror::Error;

/// Configuration applied to every system allocation made by an allocator.
///
/// Validated at construction of each heap allocation, arena or stack; the
/// values are immutable once handed to an allocator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocConfig {
    /// Alignment of the base address in bytes.
    ///
    /// Default: 16, the guarantee C `malloc` gives on 64-bit targets.
    /// Must be a power of two.
    pub align: usize,

    /// Largest single allocation request accepted, in bytes.
    ///
    /// Requests above this fail with `AllocationFailure` before the system
    /// allocator is consulted. Default: `isize::MAX`.
    pub max_bytes: usize,
}

impl AllocConfig {
    /// Default base alignment.
    pub const DEFAULT_ALIGN: usize = 16;

    /// Default allocation ceiling.
    pub const DEFAULT_MAX_BYTES: usize = isize::MAX as usize;

    /// Create a config with the given alignment and the default ceiling.
    pub fn with_align(align: usize) -> Self {
        Self {
            align,
            ..Self::default()
        }
    }

    /// Check the invariants the allocators rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.align.is_power_of_two() {
            return Err(ConfigError::AlignmentNotPowerOfTwo { align: self.align });
        }
        if self.max_bytes == 0 {
            return Err(ConfigError::ZeroMaxBytes);
        }
        Ok(())
    }
}

impl Default for AllocConfig {
    fn default() -> Self {
        Self {
            align: Self::DEFAULT_ALIGN,
            max_bytes: Self::DEFAULT_MAX_BYTES,
        }
    }
}

/// Errors from [`AllocConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `align` is zero or not a power of two.
    #[error("alignment {align} is not a power of two")]
    AlignmentNotPowerOfTwo {
        /// The rejected alignment.
        align: usize,
    },
    /// `max_bytes` of zero would reject every request.
    #[error("max_bytes must be at least 1")]
    ZeroMaxBytes,
}
