//! Run-time pool configuration.

use crate::class::{BlockSizes, SizeClass};
use crate::error::PoolError;

/// Number of blocks in each size class.
///
/// A zero count is legal: the corresponding class is inert and every
/// allocation from it fails with [`PoolError::Exhausted`].
///
/// # Examples
///
/// ```
/// use drone_pool::{DefaultSizes, PoolConfig, SizeClass};
///
/// let config = PoolConfig::new(5, 4, 1);
/// assert_eq!(config.count(SizeClass::Medium), 4);
/// assert_eq!(config.total_size::<DefaultSizes>(), Ok(5 * 64 + 4 * 512 + 2048));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PoolConfig {
    /// Number of small blocks.
    pub small: usize,
    /// Number of medium blocks.
    pub medium: usize,
    /// Number of large blocks.
    pub large: usize,
}

impl PoolConfig {
    /// Creates a new `PoolConfig`.
    #[inline]
    pub const fn new(small: usize, medium: usize, large: usize) -> Self {
        Self { small, medium, large }
    }

    /// Returns the block count of `class`.
    #[inline]
    pub const fn count(&self, class: SizeClass) -> usize {
        match class {
            SizeClass::Small => self.small,
            SizeClass::Medium => self.medium,
            SizeClass::Large => self.large,
        }
    }

    /// Returns the number of bytes occupied by `class`.
    pub fn class_size<S: BlockSizes>(&self, class: SizeClass) -> Result<usize, PoolError> {
        self.count(class).checked_mul(class.block_size::<S>()).ok_or(PoolError::CapacityOverflow)
    }

    /// Returns the size of the backing region holding all three classes.
    ///
    /// # Errors
    ///
    /// [`PoolError::CapacityOverflow`] if the size doesn't fit in `usize`.
    pub fn total_size<S: BlockSizes>(&self) -> Result<usize, PoolError> {
        SizeClass::ALL.into_iter().try_fold(0_usize, |total, class| {
            total.checked_add(self.class_size::<S>(class)?).ok_or(PoolError::CapacityOverflow)
        })
    }
}
