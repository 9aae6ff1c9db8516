use crate::error::PoolError;
use alloc::vec::Vec;

const BITS: usize = usize::BITS as usize;

/// Per-block Free/Allocated tags of one sub-arena.
///
/// A set bit marks an allocated block. The bitmap lives outside the block
/// storage, so the tag stays valid while the caller owns the block's bytes.
pub struct BlockStates {
    words: Vec<usize>,
}

impl BlockStates {
    /// Creates a bitmap of `len` blocks, all free.
    ///
    /// The storage is reserved fallibly, so running out of memory is reported
    /// instead of aborting.
    pub fn new(len: usize) -> Result<Self, PoolError> {
        let count = len.div_ceil(BITS);
        let mut words = Vec::new();
        words.try_reserve_exact(count).map_err(|_| PoolError::OutOfMemory {
            size: count * core::mem::size_of::<usize>(),
        })?;
        words.resize(count, 0);
        Ok(Self { words })
    }

    #[inline]
    pub fn is_allocated(&self, index: usize) -> bool {
        self.words[index / BITS] & 1 << (index % BITS) != 0
    }

    #[inline]
    pub fn set_allocated(&mut self, index: usize) {
        self.words[index / BITS] |= 1 << (index % BITS);
    }

    #[inline]
    pub fn set_free(&mut self, index: usize) {
        self.words[index / BITS] &= !(1 << (index % BITS));
    }

    /// Returns the number of allocated blocks.
    pub fn allocated(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }
}
