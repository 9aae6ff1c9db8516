//! Fixed-size-class memory pools for [Drone], an Embedded Operating System.
//!
//! General-purpose allocators fragment and have unbounded latency, which is
//! unacceptable inside a real-time control loop. This crate carves one
//! contiguous backing region into three sub-arenas of fixed-size blocks, one
//! per [size class](SizeClass). Allocation and deallocation are *O(1)*: they
//! pop and push a singly-linked free list threaded through the free blocks
//! themselves.
//!
//! The backing region is laid out once, at initialization, and never grows:
//!
//! ```text
//! base                                                          base + total
//! | small × 64 B ... | medium × 512 B ...... | large × 2048 B ............ |
//! ```
//!
//! Every block carries a Free/Allocated tag kept outside the block storage, so
//! freeing a foreign pointer, a pointer into the middle of a block, or a block
//! which is already free is detected and rejected instead of corrupting the
//! free lists.
//!
//! # Usage
//!
//! ```
//! use drone_pool::{Pool, PoolError, SizeClass};
//!
//! let mut pool = Pool::with_counts(5, 5, 5)?;
//!
//! let frame = pool.allocate(300)?;
//! assert_eq!(pool.class_of(frame), Some(SizeClass::Medium));
//! unsafe { frame.as_ptr().write_bytes(0xAA, 512) };
//!
//! assert_eq!(pool.allocate(4096), Err(PoolError::Oversize { size: 4096, max: 2048 }));
//!
//! pool.free(frame.as_ptr());
//! pool.destroy();
//! # Ok::<(), PoolError>(())
//! ```
//!
//! Block sizes are chosen at compile-time through [`BlockSizes`]; block counts
//! are chosen at run-time through [`PoolConfig`].
//!
//! # Concurrency
//!
//! A [`Pool`] has no internal synchronization: every mutating operation takes
//! `&mut self`. Wrap it in a [`LockedPool`] to share it between a thread and
//! an interrupt handler.
//!
//! [Drone]: https://www.drone-os.com/

#![warn(missing_docs)]
#![no_std]

extern crate alloc;

pub mod arena;
pub mod class;
pub mod config;
pub mod locked;
pub mod pool;

mod error;

pub use self::class::{BlockSizes, DefaultSizes, SizeClass};
pub use self::config::PoolConfig;
pub use self::error::PoolError;
pub use self::locked::{LockedPool, PoolGuard};
pub use self::pool::{BlockRef, Pool, SubArena};
