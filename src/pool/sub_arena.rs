use super::states::BlockStates;
use crate::class::SizeClass;
use crate::error::PoolError;
use core::ptr::NonNull;

/// The set of free blocks of one size class.
///
/// It operates by connecting unallocated blocks together in a linked list,
/// using the first word of each unallocated block as a pointer to the next.
pub struct SubArena {
    /// Size class of the blocks. This field is immutable.
    class: SizeClass,
    /// Address of the first block. This field is immutable.
    start: NonNull<u8>,
    /// Block size. This field is immutable.
    size: usize,
    /// Number of blocks. This field is immutable.
    count: usize,
    /// Head of the free list.
    free: Option<NonNull<u8>>,
    /// Free/Allocated tag of every block.
    states: BlockStates,
}

/// A block named by its position inside its sub-arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockRef {
    /// Size class of the block.
    pub class: SizeClass,
    /// Index of the block, counting from the sub-arena start.
    pub index: usize,
}

impl SubArena {
    /// Threads `count` blocks of `size` bytes starting at `start` into a free
    /// list in ascending address order.
    ///
    /// # Safety
    ///
    /// * `start..start + size * count` must be writable memory owned by the
    ///   returned value for its whole lifetime.
    /// * `start` and `size` must keep every block aligned for a pointer.
    /// * `size` must be at least the size of a pointer, so it is nonzero and
    ///   every block can hold a free-list link.
    pub unsafe fn new(
        class: SizeClass,
        start: NonNull<u8>,
        size: usize,
        count: usize,
    ) -> Result<Self, PoolError> {
        let states = BlockStates::new(count)?;
        let mut next = None;
        for index in (0..count).rev() {
            let block = unsafe { NonNull::new_unchecked(start.as_ptr().add(index * size)) };
            unsafe { write_link(block, next) };
            next = Some(block);
        }
        Ok(Self { class, start, size, count, free: next, states })
    }

    /// Returns the size class.
    #[inline]
    pub fn class(&self) -> SizeClass {
        self.class
    }

    /// Returns the address of the first block.
    #[inline]
    pub fn start(&self) -> NonNull<u8> {
        self.start
    }

    /// Returns the block size.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.size
    }

    /// Returns the number of blocks.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.count
    }

    /// Returns the head of the free list, or `None` if the class is
    /// exhausted.
    #[inline]
    pub fn free_head(&self) -> Option<NonNull<u8>> {
        self.free
    }

    /// Returns the number of blocks currently lent out.
    pub fn allocated(&self) -> usize {
        self.states.allocated()
    }

    /// Checks if `ptr` falls inside `start..start + size * count`.
    #[inline]
    pub fn contains(&self, ptr: NonNull<u8>) -> bool {
        let start = self.start.as_ptr() as usize;
        let addr = ptr.as_ptr() as usize;
        addr >= start && addr - start < self.size * self.count
    }

    /// Returns the position of the block starting at `ptr`.
    ///
    /// # Errors
    ///
    /// * [`PoolError::ForeignPointer`] if `ptr` is outside the sub-arena.
    /// * [`PoolError::Misaligned`] if `ptr` isn't the start of a block.
    pub fn locate(&self, ptr: NonNull<u8>) -> Result<BlockRef, PoolError> {
        if !self.contains(ptr) {
            return Err(PoolError::ForeignPointer);
        }
        let offset = ptr.as_ptr() as usize - self.start.as_ptr() as usize;
        if offset % self.size == 0 {
            Ok(BlockRef { class: self.class, index: offset / self.size })
        } else {
            Err(PoolError::Misaligned { class: self.class })
        }
    }

    /// Takes one block from the free list.
    ///
    /// If this method returns `None`, then the sub-arena is exhausted.
    ///
    /// This operation has *O(1)* time complexity.
    pub fn pop(&mut self) -> Option<NonNull<u8>> {
        let block = self.free?;
        let index = (block.as_ptr() as usize - self.start.as_ptr() as usize) / self.size;
        self.free = unsafe { read_link(block) };
        self.states.set_allocated(index);
        Some(block)
    }

    /// Returns the block at `ptr` to the free list.
    ///
    /// The block becomes the new head, so it is the next one handed out.
    ///
    /// This operation has *O(1)* time complexity.
    pub fn push(&mut self, ptr: NonNull<u8>) -> Result<BlockRef, PoolError> {
        let block = self.locate(ptr)?;
        if !self.states.is_allocated(block.index) {
            return Err(PoolError::DoubleFree { class: self.class });
        }
        self.states.set_free(block.index);
        unsafe { write_link(ptr, self.free) };
        self.free = Some(ptr);
        Ok(block)
    }
}

#[allow(clippy::cast_ptr_alignment)]
unsafe fn write_link(block: NonNull<u8>, next: Option<NonNull<u8>>) {
    unsafe { block.as_ptr().cast::<Option<NonNull<u8>>>().write(next) };
}

#[allow(clippy::cast_ptr_alignment)]
unsafe fn read_link(block: NonNull<u8>) -> Option<NonNull<u8>> {
    unsafe { block.as_ptr().cast::<Option<NonNull<u8>>>().read() }
}
