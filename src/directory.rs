//! Chunk directory shared by both array variants.
//!
//! The directory is a fixed-length vector with one optional chunk per chunk
//! index. A present entry exclusively owns its chunk; reclaiming a chunk is
//! `take()` on the entry. What a chunk stores and when it is reclaimed is up to
//! the variant built on top.

use crate::config::ArrayConfig;

/// Storage behind one directory entry.
pub(crate) trait Chunk<V> {
    /// A chunk of `chunk_size` empty slots.
    fn alloc(chunk_size: usize) -> Self;

    fn slots(&self) -> &[Option<V>];
}

/// `chunk_size` empty slots on the heap.
pub(crate) fn empty_slots<V>(chunk_size: usize) -> Box<[Option<V>]> {
    std::iter::repeat_with(|| None).take(chunk_size).collect()
}

/// Memory accounting for an array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Directory length (fixed at construction).
    pub num_chunks: usize,
    /// Chunks currently allocated.
    pub allocated_chunks: usize,
    /// Slots that hold a present value.
    pub present_values: usize,
    /// Bytes held by the directory vector itself.
    pub directory_bytes: usize,
    /// Bytes held by allocated chunk slots.
    pub chunk_bytes: usize,
}

impl MemoryStats {
    #[inline]
    pub fn total_bytes(&self) -> usize {
        self.directory_bytes + self.chunk_bytes
    }
}

#[derive(Clone)]
pub(crate) struct ChunkDirectory<C> {
    config: ArrayConfig,
    chunks: Vec<Option<C>>,
    allocated: usize,
}

impl<C> ChunkDirectory<C> {
    pub(crate) fn new(config: ArrayConfig) -> Self {
        let mut chunks = Vec::with_capacity(config.num_chunks());
        chunks.resize_with(config.num_chunks(), || None);
        tracing::debug!(
            max_size = config.max_size(),
            chunk_size = config.chunk_size(),
            num_chunks = config.num_chunks(),
            "chunk directory created"
        );
        Self {
            config,
            chunks,
            allocated: 0,
        }
    }

    #[inline]
    pub(crate) fn config(&self) -> &ArrayConfig {
        &self.config
    }

    #[inline]
    pub(crate) fn allocated(&self) -> usize {
        self.allocated
    }

    /// Whether `chunk_index` currently owns a chunk. Indices past the end of the
    /// directory are never allocated.
    #[inline]
    pub(crate) fn is_allocated(&self, chunk_index: usize) -> bool {
        matches!(self.chunks.get(chunk_index), Some(Some(_)))
    }

    #[inline]
    pub(crate) fn get(&self, chunk_index: usize) -> Option<&C> {
        self.chunks[chunk_index].as_ref()
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, chunk_index: usize) -> Option<&mut C> {
        self.chunks[chunk_index].as_mut()
    }

    /// The chunk at `chunk_index`, allocating it first if the entry is empty.
    pub(crate) fn get_or_alloc<V>(&mut self, chunk_index: usize) -> &mut C
    where
        C: Chunk<V>,
    {
        let chunk_size = self.config.chunk_size();
        let entry = &mut self.chunks[chunk_index];
        if entry.is_none() {
            tracing::trace!(chunk_index, "allocating chunk");
            self.allocated += 1;
        }
        entry.get_or_insert_with(|| C::alloc(chunk_size))
    }

    /// Drop the chunk at `chunk_index`, if any.
    pub(crate) fn free(&mut self, chunk_index: usize) {
        if self.chunks[chunk_index].take().is_some() {
            tracing::trace!(chunk_index, "freed chunk");
            self.allocated -= 1;
        }
    }

    /// Drop every chunk. The directory keeps its length.
    pub(crate) fn clear(&mut self) {
        let freed = self.allocated;
        for entry in &mut self.chunks {
            *entry = None;
        }
        self.allocated = 0;
        tracing::debug!(freed, "chunk directory cleared");
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &C)> + '_ {
        self.chunks
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.as_ref().map(|chunk| (i, chunk)))
    }

    /// Memory accounting; `present_values` is left for the caller to fill.
    pub(crate) fn stats<V>(&self) -> MemoryStats {
        MemoryStats {
            num_chunks: self.chunks.len(),
            allocated_chunks: self.allocated,
            present_values: 0,
            directory_bytes: self.chunks.capacity() * std::mem::size_of::<Option<C>>(),
            chunk_bytes: self.allocated
                * self.config.chunk_size()
                * std::mem::size_of::<Option<V>>(),
        }
    }
}

impl<V> Chunk<V> for Box<[Option<V>]> {
    fn alloc(chunk_size: usize) -> Self {
        empty_slots(chunk_size)
    }

    fn slots(&self) -> &[Option<V>] {
        self
    }
}
