//! # two-level-array
//!
//! Fixed-capacity sparse arrays for dense integer key spaces where most keys
//! are empty at any given time (block IDs, slot indices).
//!
//! Storage is a two-level tree: a chunk directory sized once for the whole
//! key range, and fixed-size chunks of value slots allocated on demand. Access
//! is O(1) like a flat array, but memory is only spent on chunks that hold
//! something and growing never reallocates or copies existing chunks.
//!
//! Two variants share the key decomposition and directory:
//!
//! - [`TwoLevelArray`] frees a chunk as soon as its last value is cleared.
//! - [`NeverShrinkArray`] keeps every chunk it allocates, so slot references
//!   stay valid and values can be built in place.
//!
//! Values are stored as `Option<V>`; `None` is the empty value.
//!
//! ## Example
//!
//! ```rust
//! use two_level_array::{ArrayConfig, TwoLevelArray};
//!
//! let config = ArrayConfig::new(1 << 20, 1 << 12).unwrap();
//! let mut owners: TwoLevelArray<u64> = TwoLevelArray::with_config(config);
//! owners.insert(70_000, 7);
//!
//! assert_eq!(owners.get(70_000), Some(&7));
//! assert_eq!(owners.get(70_001), None);
//! assert_eq!(owners.allocated_chunks(), 1);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

mod config;
mod directory;
mod error;
mod never_shrink;
mod shrinking;

pub use config::{ArrayConfig, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_SIZE};
pub use directory::MemoryStats;
pub use error::ConfigError;
pub use never_shrink::NeverShrinkArray;
pub use shrinking::TwoLevelArray;

#[cfg(test)]
mod proptests;
