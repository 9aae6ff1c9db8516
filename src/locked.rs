//! Non-blocking serialized access to a pool.

use crate::class::{BlockSizes, DefaultSizes, SizeClass};
use crate::error::PoolError;
use crate::pool::Pool;
use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::ptr::NonNull;

#[cfg(not(loom))]
use core::sync::atomic::AtomicBool;
use core::sync::atomic::Ordering::{Acquire, Release};
#[cfg(loom)]
use loom::sync::atomic::AtomicBool;

/// A [`Pool`] guarded by a try-lock.
///
/// The lock never blocks: an attempt to use a pool which is being used by
/// another execution context fails with [`PoolError::Busy`]. This makes it
/// suitable for sharing a pool between a thread and an interrupt handler that
/// may preempt it, where waiting for the preempted owner would deadlock.
///
/// # Examples
///
/// ```
/// use drone_pool::{LockedPool, Pool, PoolError};
///
/// let pool = LockedPool::new(Pool::with_counts(2, 0, 0)?);
/// let block = pool.allocate(16)?;
/// {
///     let mut guard = pool.try_lock().unwrap();
///     assert_eq!(pool.allocate(16), Err(PoolError::Busy));
///     guard.free(block.as_ptr());
/// }
/// assert_eq!(pool.allocate(16)?, block);
/// # Ok::<(), PoolError>(())
/// ```
pub struct LockedPool<S: BlockSizes = DefaultSizes> {
    lock: AtomicBool,
    pool: UnsafeCell<Pool<S>>,
}

/// An RAII implementation of a "scoped lock" of a [`LockedPool`]. When this
/// structure is dropped (falls out of scope), the lock will be unlocked.
///
/// The pool can be accessed through this guard via its `Deref` and `DerefMut`
/// implementations.
#[must_use]
pub struct PoolGuard<'a, S: BlockSizes = DefaultSizes> {
    locked: &'a LockedPool<S>,
}

unsafe impl<S: BlockSizes> Sync for LockedPool<S> where Pool<S>: Send {}

impl<S: BlockSizes> LockedPool<S> {
    /// Wraps `pool` in an unlocked `LockedPool`.
    #[inline]
    pub fn new(pool: Pool<S>) -> Self {
        Self { lock: AtomicBool::new(false), pool: UnsafeCell::new(pool) }
    }

    /// Attempts to acquire the lock.
    ///
    /// If the lock could not be acquired at this time, then `None` is returned.
    /// Otherwise, a RAII guard is returned. The lock will be unlocked when the
    /// guard is dropped.
    #[inline]
    pub fn try_lock(&self) -> Option<PoolGuard<'_, S>> {
        if self.lock.swap(true, Acquire) {
            None
        } else {
            Some(PoolGuard { locked: self })
        }
    }

    /// Allocates one block able to hold `size` bytes.
    ///
    /// # Errors
    ///
    /// [`PoolError::Busy`] if the pool is locked, or any error of
    /// [`Pool::allocate`].
    pub fn allocate(&self, size: usize) -> Result<NonNull<u8>, PoolError> {
        self.try_lock().ok_or(PoolError::Busy)?.allocate(size)
    }

    /// Returns the block at `ptr` to the pool.
    ///
    /// On [`PoolError::Busy`] the block is still owned by the caller, who
    /// should retry later.
    ///
    /// # Errors
    ///
    /// [`PoolError::Busy`] if the pool is locked, or any error of
    /// [`Pool::try_free`].
    pub fn try_free(&self, ptr: NonNull<u8>) -> Result<SizeClass, PoolError> {
        self.try_lock().ok_or(PoolError::Busy)?.try_free(ptr)
    }

    /// Returns a mutable reference to the underlying pool.
    ///
    /// Since this call borrows the `LockedPool` mutably, no actual locking
    /// needs to take place.
    #[inline]
    pub fn get_mut(&mut self) -> &mut Pool<S> {
        self.pool.get_mut()
    }

    /// Consumes this `LockedPool`, returning the underlying pool.
    #[inline]
    pub fn into_inner(self) -> Pool<S> {
        self.pool.into_inner()
    }
}

impl<S: BlockSizes> Deref for PoolGuard<'_, S> {
    type Target = Pool<S>;

    #[inline]
    fn deref(&self) -> &Pool<S> {
        unsafe { &*self.locked.pool.get() }
    }
}

impl<S: BlockSizes> DerefMut for PoolGuard<'_, S> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Pool<S> {
        unsafe { &mut *self.locked.pool.get() }
    }
}

impl<S: BlockSizes> Drop for PoolGuard<'_, S> {
    #[inline]
    fn drop(&mut self) {
        self.locked.lock.store(false, Release);
    }
}
