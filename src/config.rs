//! Array configuration and key decomposition.
//!
//! A key is split into a chunk index (which directory slot owns it) and a slot
//! index (which value inside that chunk). The directory always has
//! `max_size / chunk_size + 1` slots, so every key up to and including
//! `max_size` is addressable, plus the tail of the last chunk.

use crate::error::ConfigError;

/// Default number of value slots per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 16;

/// Default maximum key, used when no explicit bound is configured.
pub const DEFAULT_MAX_SIZE: usize = i32::MAX as usize;

/// Capacity parameters shared by both array variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayConfig {
    max_size: usize,
    chunk_size: usize,
    num_chunks: usize,
}

impl ArrayConfig {
    /// Validate and build a configuration.
    pub fn new(max_size: usize, chunk_size: usize) -> Result<Self, ConfigError> {
        if chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        let overflow = ConfigError::CapacityOverflow {
            max_size,
            chunk_size,
        };
        let num_chunks = (max_size / chunk_size).checked_add(1).ok_or(overflow)?;
        num_chunks.checked_mul(chunk_size).ok_or(overflow)?;
        Ok(Self {
            max_size,
            chunk_size,
            num_chunks,
        })
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Length of the chunk directory.
    #[inline]
    pub fn num_chunks(&self) -> usize {
        self.num_chunks
    }

    /// Number of addressable keys (`0..capacity()`).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.num_chunks * self.chunk_size
    }

    /// Whether `key` falls inside the directory. Never panics.
    #[inline]
    pub fn contains_key(&self, key: usize) -> bool {
        key / self.chunk_size < self.num_chunks
    }

    /// Chunk index for `key`.
    ///
    /// # Panics
    ///
    /// If `key` lies beyond the last chunk. This is a caller bug, not a
    /// recoverable condition.
    #[inline]
    pub fn chunk_index(&self, key: usize) -> usize {
        let chunk_index = key / self.chunk_size;
        if chunk_index >= self.num_chunks {
            key_out_of_range(key, chunk_index, self);
        }
        chunk_index
    }

    #[inline]
    pub fn slot_index(&self, key: usize) -> usize {
        key % self.chunk_size
    }

    /// Split `key` into `(chunk_index, slot_index)`, panicking if out of range.
    #[inline]
    pub fn locate(&self, key: usize) -> (usize, usize) {
        (self.chunk_index(key), self.slot_index(key))
    }
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            num_chunks: DEFAULT_MAX_SIZE / DEFAULT_CHUNK_SIZE + 1,
        }
    }
}

#[cold]
#[inline(never)]
#[track_caller]
fn key_out_of_range(key: usize, chunk_index: usize, config: &ArrayConfig) -> ! {
    panic!(
        "key {key} out of range: chunk_index < num_chunks violated ({chunk_index} >= {}), \
         max_size {} chunk_size {}",
        config.num_chunks, config.max_size, config.chunk_size
    )
}
