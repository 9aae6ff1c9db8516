use crate::class::SizeClass;
use thiserror::Error;

/// Errors reported by [`Pool`](crate::Pool) and
/// [`LockedPool`](crate::LockedPool) operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The total pool size overflows or can't be described as a layout.
    #[error("pool capacity overflows the address space")]
    CapacityOverflow,

    /// The backing region or the block bookkeeping couldn't be allocated.
    #[error("out of memory while allocating {size} bytes for the pool")]
    OutOfMemory {
        /// Number of bytes requested.
        size: usize,
    },

    /// A zero-sized block was requested.
    #[error("zero-sized allocation requested")]
    ZeroSize,

    /// The request doesn't fit the largest class.
    #[error("{size} bytes requested, but the largest block is {max} bytes")]
    Oversize {
        /// Number of bytes requested.
        size: usize,
        /// Block size of the largest class.
        max: usize,
    },

    /// The free list of the selected class is empty.
    #[error("{0} pool is exhausted")]
    Exhausted(SizeClass),

    /// The pointer doesn't belong to any sub-arena.
    #[error("pointer doesn't belong to the pool")]
    ForeignPointer,

    /// The pointer is inside a sub-arena but not at a block boundary.
    #[error("pointer doesn't point to the start of a {class} block")]
    Misaligned {
        /// Class of the sub-arena containing the pointer.
        class: SizeClass,
    },

    /// The block is already free.
    #[error("{class} block is already free")]
    DoubleFree {
        /// Class of the freed block.
        class: SizeClass,
    },

    /// The pool is locked by another execution context.
    #[error("pool is locked by another context")]
    Busy,
}
