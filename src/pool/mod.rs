//! The pool handle.

mod states;
mod sub_arena;

pub use self::sub_arena::{BlockRef, SubArena};

use crate::arena::{ArenaLayout, Backing};
use crate::class::{BlockSizes, DefaultSizes, SizeClass};
use crate::config::PoolConfig;
use crate::error::PoolError;
use core::marker::PhantomData;
use core::ptr::NonNull;
use tracing::{debug, trace, warn};

/// A closed-capacity pool of fixed-size blocks in three size classes.
///
/// The pool owns one contiguous backing region carved into a small, a medium
/// and a large sub-arena. Every block of a sub-arena starts out on that
/// class's free list. [`allocate`](Pool::allocate) pops a block from the list
/// of the smallest fitting class, [`free`](Pool::free) pushes it back. Both
/// operations have *O(1)* time complexity and never touch any other block.
///
/// The pool has no internal synchronization. Use [`LockedPool`] to share it
/// between execution contexts.
///
/// [`LockedPool`]: crate::LockedPool
///
/// # Examples
///
/// ```
/// use drone_pool::{Pool, SizeClass};
///
/// let mut pool = Pool::with_counts(5, 5, 5)?;
/// let block = pool.allocate(48)?;
/// assert_eq!(pool.class_of(block), Some(SizeClass::Small));
/// pool.free(block.as_ptr());
/// assert_eq!(pool.allocate(60)?, block);
/// # Ok::<(), drone_pool::PoolError>(())
/// ```
pub struct Pool<S: BlockSizes = DefaultSizes> {
    arenas: [SubArena; 3],
    backing: Backing,
    block_align: usize,
    sizes: PhantomData<S>,
}

unsafe impl<S: BlockSizes> Send for Pool<S> {}

impl Pool {
    /// Creates a pool with the default block sizes and the given counts.
    ///
    /// See [`Pool::new`].
    pub fn with_counts(small: usize, medium: usize, large: usize) -> Result<Self, PoolError> {
        Self::new(PoolConfig::new(small, medium, large))
    }
}

impl<S: BlockSizes> Pool<S> {
    /// Allocates the backing region and threads every block into its class's
    /// free list.
    ///
    /// # Errors
    ///
    /// * [`PoolError::CapacityOverflow`] if the total size overflows.
    /// * [`PoolError::OutOfMemory`] if the backing region or the block state
    ///   bitmaps can't be allocated. Nothing is leaked in that case.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let layout = ArenaLayout::new::<S>(&config)?;
        let backing = Backing::new(layout.total_size())?;
        let base = backing.base();
        let sub_arena = |class: SizeClass| {
            let start = unsafe { NonNull::new_unchecked(base.as_ptr().add(layout.range(class).start)) };
            unsafe { SubArena::new(class, start, class.block_size::<S>(), config.count(class)) }
        };
        let arenas =
            [sub_arena(SizeClass::Small)?, sub_arena(SizeClass::Medium)?, sub_arena(SizeClass::Large)?];
        debug!(
            small = config.small,
            medium = config.medium,
            large = config.large,
            total_size = backing.size(),
            "memory pool initialized"
        );
        Ok(Self { arenas, backing, block_align: layout.block_align(), sizes: PhantomData })
    }

    /// Allocates one block able to hold `size` bytes.
    ///
    /// The block comes from the smallest class whose block size is at least
    /// `size`. If that class is exhausted the call fails; a larger class is
    /// never used instead.
    ///
    /// The returned block is uninitialized and spans
    /// [`block_size`](SizeClass::block_size) bytes of its class, aligned to
    /// [`block_align`](Pool::block_align).
    ///
    /// # Errors
    ///
    /// * [`PoolError::ZeroSize`] if `size` is zero.
    /// * [`PoolError::Oversize`] if no class is large enough.
    /// * [`PoolError::Exhausted`] if the selected class has no free blocks.
    pub fn allocate(&mut self, size: usize) -> Result<NonNull<u8>, PoolError> {
        let class = SizeClass::for_size::<S>(size)?;
        let block = self.arenas[class.index()].pop().ok_or(PoolError::Exhausted(class))?;
        trace!(%class, size, ?block, "allocate");
        Ok(block)
    }

    /// Behaves like [`allocate`](Pool::allocate), but also ensures that the
    /// whole block is set to zero.
    pub fn allocate_zeroed(&mut self, size: usize) -> Result<NonNull<u8>, PoolError> {
        let block = self.allocate(size)?;
        let class = SizeClass::for_size::<S>(size)?;
        unsafe { block.as_ptr().write_bytes(0, class.block_size::<S>()) };
        Ok(block)
    }

    /// Returns the block at `ptr` to its class's free list.
    ///
    /// Null pointers, pointers outside the pool, pointers into the middle of a
    /// block, and already free blocks are ignored. Such calls leave the pool
    /// untouched and only emit a warning. Use [`try_free`](Pool::try_free) to
    /// observe the rejection.
    pub fn free(&mut self, ptr: *mut u8) {
        let Some(ptr) = NonNull::new(ptr) else {
            return;
        };
        if let Err(err) = self.try_free(ptr) {
            warn!(%err, ?ptr, "free ignored");
        }
    }

    /// Returns the block at `ptr` to its class's free list, reporting the class
    /// it belonged to.
    ///
    /// The freed block becomes the head of the list, so it is the next block
    /// handed out by that class.
    ///
    /// # Errors
    ///
    /// * [`PoolError::ForeignPointer`] if `ptr` is outside every sub-arena.
    /// * [`PoolError::Misaligned`] if `ptr` isn't the start of a block.
    /// * [`PoolError::DoubleFree`] if the block is already free.
    ///
    /// The pool is unchanged on error.
    pub fn try_free(&mut self, ptr: NonNull<u8>) -> Result<SizeClass, PoolError> {
        let arena = self
            .arenas
            .iter_mut()
            .find(|arena| arena.contains(ptr))
            .ok_or(PoolError::ForeignPointer)?;
        let block = arena.push(ptr)?;
        trace!(class = %block.class, index = block.index, "free");
        Ok(block.class)
    }

    /// Returns the class of the sub-arena containing `ptr`.
    pub fn class_of(&self, ptr: NonNull<u8>) -> Option<SizeClass> {
        self.arenas.iter().find(|arena| arena.contains(ptr)).map(SubArena::class)
    }

    /// Returns the class and index of the block starting at `ptr`.
    ///
    /// Returns `None` if `ptr` is outside the pool or not at a block boundary.
    pub fn locate(&self, ptr: NonNull<u8>) -> Option<BlockRef> {
        self.arenas.iter().find(|arena| arena.contains(ptr))?.locate(ptr).ok()
    }

    /// Returns the descriptor of `class`'s sub-arena.
    #[inline]
    pub fn sub_arena(&self, class: SizeClass) -> &SubArena {
        &self.arenas[class.index()]
    }

    /// Returns the size of the backing region in bytes.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.backing.size()
    }

    /// Returns the first address of the backing region.
    #[inline]
    pub fn base(&self) -> NonNull<u8> {
        self.backing.base()
    }

    /// Returns the alignment every block is guaranteed to have.
    #[inline]
    pub fn block_align(&self) -> usize {
        self.block_align
    }

    /// Releases the backing region and the handle.
    ///
    /// Blocks still lent out are not reclaimed: pointers to them dangle after
    /// this call.
    pub fn destroy(self) {
        drop(self);
    }
}

impl<S: BlockSizes> Drop for Pool<S> {
    fn drop(&mut self) {
        let outstanding: usize = self.arenas.iter().map(SubArena::allocated).sum();
        debug!(total_size = self.backing.size(), outstanding, "memory pool destroyed");
    }
}
