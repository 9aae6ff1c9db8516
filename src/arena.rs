//! The backing region and its division into sub-arenas.
//!
//! The continuous memory region is split into three sub-arenas, one per size
//! class, placed back-to-back in the order small, medium, large. There is no
//! padding between them: each sub-arena starts exactly where the previous one
//! ends.

use crate::class::{BlockSizes, SizeClass};
use crate::config::PoolConfig;
use crate::error::PoolError;
use alloc::alloc::{alloc, dealloc};
use core::alloc::Layout;
use core::ops::Range;
use core::ptr::NonNull;

#[repr(C, align(16))]
struct Align([u8; 16]);

/// Alignment of the backing region.
pub const BACKING_ALIGN: usize = core::mem::align_of::<Align>();

/// Byte ranges of the sub-arenas inside the backing region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaLayout {
    ranges: [Range<usize>; 3],
    block_align: usize,
}

impl ArenaLayout {
    /// Computes sub-arena offsets for the given block counts.
    pub fn new<S: BlockSizes>(config: &PoolConfig) -> Result<Self, PoolError> {
        let mut ranges = [0..0, 0..0, 0..0];
        let mut offset = 0_usize;
        for class in SizeClass::ALL {
            let end = offset
                .checked_add(config.class_size::<S>(class)?)
                .ok_or(PoolError::CapacityOverflow)?;
            ranges[class.index()] = offset..end;
            offset = end;
        }
        Layout::from_size_align(offset, BACKING_ALIGN).map_err(|_| PoolError::CapacityOverflow)?;
        let block_align = SizeClass::ALL
            .into_iter()
            .map(|class| 1_usize << class.block_size::<S>().trailing_zeros())
            .fold(BACKING_ALIGN, usize::min);
        Ok(Self { ranges, block_align })
    }

    /// Returns the byte range of `class` relative to the region start.
    #[inline]
    pub fn range(&self, class: SizeClass) -> Range<usize> {
        self.ranges[class.index()].clone()
    }

    /// Returns the size of the whole region.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.ranges[2].end
    }

    /// Returns the alignment every block start is guaranteed to have.
    #[inline]
    pub fn block_align(&self) -> usize {
        self.block_align
    }
}

/// One contiguous heap allocation holding all sub-arenas.
///
/// The region is released when the value is dropped.
pub struct Backing {
    base: NonNull<u8>,
    layout: Layout,
}

impl Backing {
    /// Allocates an uninitialized region of `size` bytes.
    ///
    /// A zero-sized region performs no allocation.
    pub fn new(size: usize) -> Result<Self, PoolError> {
        let layout =
            Layout::from_size_align(size, BACKING_ALIGN).map_err(|_| PoolError::CapacityOverflow)?;
        if size == 0 {
            return Ok(Self { base: NonNull::<Align>::dangling().cast(), layout });
        }
        let base = unsafe { alloc(layout) };
        NonNull::new(base).map(|base| Self { base, layout }).ok_or(PoolError::OutOfMemory { size })
    }

    /// Returns the first address of the region.
    #[inline]
    pub fn base(&self) -> NonNull<u8> {
        self.base
    }

    /// Returns the size of the region.
    #[inline]
    pub fn size(&self) -> usize {
        self.layout.size()
    }
}

impl Drop for Backing {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            unsafe { dealloc(self.base.as_ptr(), self.layout) };
        }
    }
}
