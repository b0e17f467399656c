//! Error types for array configuration.

use thiserror::Error;

/// Rejected [`ArrayConfig`](crate::ArrayConfig) parameters.
///
/// Out-of-range keys are not represented here: they are caller bugs and
/// panic at the point of use.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A chunk must hold at least one slot.
    #[error("chunk size must be non-zero")]
    ZeroChunkSize,

    /// `num_chunks * chunk_size` does not fit in `usize`.
    #[error("capacity overflow: max_size {max_size} with chunk_size {chunk_size}")]
    CapacityOverflow { max_size: usize, chunk_size: usize },
}
