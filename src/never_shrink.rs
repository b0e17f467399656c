//! Sparse array whose chunks live as long as the array.

use std::fmt;

use crate::config::ArrayConfig;
use crate::directory::{Chunk, ChunkDirectory, MemoryStats};

type Slots<V> = Box<[Option<V>]>;

/// A two-level sparse array that never frees a chunk once allocated.
///
/// [`slot_mut`](Self::slot_mut) allocates the chunk covering a key on first
/// use and hands out the slot itself, so callers can build values in place.
/// Indexing alone is enough to allocate: the chunk stays even if nothing is
/// written through the returned reference. Chunks are released only by
/// [`clear`](Self::clear) or when the array is dropped.
///
/// ```rust
/// use two_level_array::{ArrayConfig, NeverShrinkArray};
///
/// let mut pending: NeverShrinkArray<Vec<u32>> =
///     NeverShrinkArray::with_config(ArrayConfig::new(1024, 64).unwrap());
/// pending.get_or_insert_with(70, Vec::new).push(1);
/// pending.get_or_insert_with(70, Vec::new).push(2);
/// assert_eq!(pending.get(70), Some(&vec![1, 2]));
///
/// *pending.slot_mut(70) = None;
/// assert_eq!(pending.get(70), None);
/// assert!(pending.is_chunk_allocated(1));
/// ```
///
/// # Panics
///
/// Every keyed operation panics if the key lies beyond the configured
/// capacity.
#[derive(Clone)]
pub struct NeverShrinkArray<V> {
    chunks: ChunkDirectory<Slots<V>>,
}

impl<V> NeverShrinkArray<V> {
    /// An empty array with [`ArrayConfig::default`].
    pub fn new() -> Self {
        Self::with_config(ArrayConfig::default())
    }

    pub fn with_config(config: ArrayConfig) -> Self {
        Self {
            chunks: ChunkDirectory::new(config),
        }
    }

    #[inline]
    pub fn config(&self) -> &ArrayConfig {
        self.chunks.config()
    }

    #[inline]
    pub fn allocated_chunks(&self) -> usize {
        self.chunks.allocated()
    }

    #[inline]
    pub fn is_chunk_allocated(&self, chunk_index: usize) -> bool {
        self.chunks.is_allocated(chunk_index)
    }

    /// The slot for `key`, allocating its chunk if needed.
    ///
    /// The chunk is never freed afterwards, so the slot keeps its address
    /// until the array is cleared or dropped.
    pub fn slot_mut(&mut self, key: usize) -> &mut Option<V> {
        let (chunk_index, slot_index) = self.config().locate(key);
        &mut self.chunks.get_or_alloc::<V>(chunk_index)[slot_index]
    }

    /// Read `key` without allocating.
    pub fn get(&self, key: usize) -> Option<&V> {
        let (chunk_index, slot_index) = self.config().locate(key);
        self.chunks.get(chunk_index)?[slot_index].as_ref()
    }

    /// The value at `key`, inserting `f()` if the slot is empty.
    pub fn get_or_insert_with<F>(&mut self, key: usize, f: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        self.slot_mut(key).get_or_insert_with(f)
    }

    /// Store `value` at `key` and return the previous value.
    #[inline]
    pub fn insert(&mut self, key: usize, value: V) -> Option<V> {
        self.slot_mut(key).replace(value)
    }

    /// Empty the slot at `key`. The chunk is kept.
    #[inline]
    pub fn take(&mut self, key: usize) -> Option<V> {
        self.slot_mut(key).take()
    }

    /// Free every chunk.
    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Bytes held by the directory and all allocated chunks.
    pub fn memory_usage(&self) -> usize {
        self.chunks.stats::<V>().total_bytes()
    }

    /// Memory accounting. Counting present values scans every allocated
    /// chunk.
    pub fn stats(&self) -> MemoryStats {
        let present_values = self
            .chunks
            .iter()
            .map(|(_, chunk)| chunk.slots().iter().filter(|v| v.is_some()).count())
            .sum();
        MemoryStats {
            present_values,
            ..self.chunks.stats::<V>()
        }
    }
}

impl<V> Default for NeverShrinkArray<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for NeverShrinkArray<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NeverShrinkArray")
            .field("config", self.config())
            .field("allocated_chunks", &self.allocated_chunks())
            .finish()
    }
}
