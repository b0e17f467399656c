//! Sparse array that frees a chunk as soon as its last value is cleared.

use std::fmt;

use crate::config::ArrayConfig;
use crate::directory::{empty_slots, Chunk, ChunkDirectory, MemoryStats};

/// Slots plus the number of them that hold a value.
///
/// `count` always equals the number of `Some` slots. A chunk whose count drops
/// to zero is freed by the same `set` that emptied it.
#[derive(Clone)]
struct CountedChunk<V> {
    count: usize,
    values: Box<[Option<V>]>,
}

impl<V> Chunk<V> for CountedChunk<V> {
    fn alloc(chunk_size: usize) -> Self {
        Self {
            count: 0,
            values: empty_slots(chunk_size),
        }
    }

    fn slots(&self) -> &[Option<V>] {
        &self.values
    }
}

/// A two-level sparse array whose memory tracks the number of occupied keys.
///
/// Keys are split into a chunk index and a slot index. A chunk is allocated
/// on the first write of a present value into its key range and freed the
/// moment every slot in it is empty again. Writing `None` into a range that
/// has no chunk does not allocate.
///
/// ```rust
/// use two_level_array::{ArrayConfig, TwoLevelArray};
///
/// let mut blocks: TwoLevelArray<&str> =
///     TwoLevelArray::with_config(ArrayConfig::new(16, 4).unwrap());
/// blocks.set(2, Some("a"));
/// assert_eq!(blocks.get(2), Some(&"a"));
/// assert_eq!(blocks.allocated_chunks(), 1);
///
/// blocks.set(2, None);
/// assert_eq!(blocks.get(2), None);
/// assert_eq!(blocks.allocated_chunks(), 0);
/// ```
///
/// # Panics
///
/// Every keyed operation panics if the key lies beyond the configured
/// capacity.
#[derive(Clone)]
pub struct TwoLevelArray<V> {
    chunks: ChunkDirectory<CountedChunk<V>>,
    len: usize,
}

impl<V> TwoLevelArray<V> {
    /// An empty array with [`ArrayConfig::default`].
    pub fn new() -> Self {
        Self::with_config(ArrayConfig::default())
    }

    pub fn with_config(config: ArrayConfig) -> Self {
        Self {
            chunks: ChunkDirectory::new(config),
            len: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &ArrayConfig {
        self.chunks.config()
    }

    /// Number of keys holding a present value.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn allocated_chunks(&self) -> usize {
        self.chunks.allocated()
    }

    #[inline]
    pub fn is_chunk_allocated(&self, chunk_index: usize) -> bool {
        self.chunks.is_allocated(chunk_index)
    }

    /// The value stored at `key`, or `None` if the key was never set, was
    /// cleared, or its chunk does not exist. Never allocates or frees.
    pub fn get(&self, key: usize) -> Option<&V> {
        let (chunk_index, slot_index) = self.config().locate(key);
        self.chunks.get(chunk_index)?.values[slot_index].as_ref()
    }

    /// By-value read of `key`.
    pub fn get_cloned(&self, key: usize) -> Option<V>
    where
        V: Clone,
    {
        self.get(key).cloned()
    }

    /// Mutable access to a present value. Presence cannot change through the
    /// returned reference, so chunk occupancy is unaffected.
    pub fn get_mut(&mut self, key: usize) -> Option<&mut V> {
        let (chunk_index, slot_index) = self.config().locate(key);
        self.chunks.get_mut(chunk_index)?.values[slot_index].as_mut()
    }

    #[inline]
    pub fn contains(&self, key: usize) -> bool {
        self.get(key).is_some()
    }

    /// Store `value` at `key` and return the previous value.
    ///
    /// Writing `None` into a chunk that does not exist is a no-op. Otherwise
    /// the chunk is allocated if needed, its occupancy count adjusted, and the
    /// chunk freed immediately if the write left it with no present values.
    pub fn set(&mut self, key: usize, value: Option<V>) -> Option<V> {
        let (chunk_index, slot_index) = self.config().locate(key);
        if value.is_none() && self.chunks.get(chunk_index).is_none() {
            return None;
        }

        let present = value.is_some();
        let chunk = self.chunks.get_or_alloc::<V>(chunk_index);
        let slot = &mut chunk.values[slot_index];
        if slot.is_some() {
            chunk.count -= 1;
        }
        let old = std::mem::replace(slot, value);
        if present {
            chunk.count += 1;
        }
        debug_assert!(chunk.count <= chunk.values.len());

        let remaining = chunk.count;
        if old.is_some() {
            self.len -= 1;
        }
        if present {
            self.len += 1;
        }
        if remaining == 0 {
            self.chunks.free(chunk_index);
        }
        old
    }

    /// Shorthand for `set(key, Some(value))`.
    #[inline]
    pub fn insert(&mut self, key: usize, value: V) -> Option<V> {
        self.set(key, Some(value))
    }

    /// Shorthand for `set(key, None)`.
    #[inline]
    pub fn remove(&mut self, key: usize) -> Option<V> {
        self.set(key, None)
    }

    /// Free every chunk.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
    }

    /// Bytes held by the directory and all allocated chunks.
    pub fn memory_usage(&self) -> usize {
        self.stats().total_bytes()
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            present_values: self.len,
            ..self.chunks.stats::<V>()
        }
    }
}

impl<V> Default for TwoLevelArray<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for TwoLevelArray<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwoLevelArray")
            .field("config", self.config())
            .field("len", &self.len)
            .field("allocated_chunks", &self.allocated_chunks())
            .finish()
    }
}

#[cfg(test)]
impl<V> TwoLevelArray<V> {
    /// Recount every chunk and check the occupancy bookkeeping.
    pub(crate) fn validate(&self) {
        let mut total = 0;
        let mut allocated = 0;
        for (chunk_index, chunk) in self.chunks.iter() {
            let present = chunk.slots().iter().filter(|v| v.is_some()).count();
            assert_eq!(
                chunk.count, present,
                "chunk {chunk_index}: count must match present slots"
            );
            assert_ne!(chunk.count, 0, "chunk {chunk_index}: empty chunk not freed");
            assert_eq!(chunk.values.len(), self.config().chunk_size());
            total += present;
            allocated += 1;
        }
        assert_eq!(total, self.len, "len must match present values");
        assert_eq!(allocated, self.chunks.allocated());
    }
}
