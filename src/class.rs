//! Size classes and their compile-time block sizes.

use crate::error::PoolError;
use core::{fmt, marker::PhantomData, mem};
use typenum::{Unsigned, U2048, U512, U64};

/// One of the three block-size tiers served by a [`Pool`](crate::Pool).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeClass {
    /// The smallest blocks. Occupies the beginning of the backing region.
    Small,
    /// Middle-sized blocks. Placed right after the small sub-arena.
    Medium,
    /// The largest blocks. Occupies the tail of the backing region.
    Large,
}

/// Compile-time block sizes of the three size classes.
///
/// Block sizes are type-level integers, so a misconfigured set of sizes is
/// rejected when the pool type is instantiated, not at run-time. Every size
/// must be able to hold one address, must be a multiple of the address
/// alignment, and sizes must be strictly ascending.
///
/// # Examples
///
/// ```
/// use drone_pool::{BlockSizes, Pool, PoolConfig};
/// use typenum::{U1024, U128, U32};
///
/// struct Packets;
///
/// impl BlockSizes for Packets {
///     type Small = U32;
///     type Medium = U128;
///     type Large = U1024;
/// }
///
/// let pool = Pool::<Packets>::new(PoolConfig::new(16, 8, 2)).unwrap();
/// assert_eq!(pool.total_size(), 16 * 32 + 8 * 128 + 2 * 1024);
/// ```
///
/// A small block must be able to hold a free-list link:
///
/// ```compile_fail,E0080
/// use drone_pool::{BlockSizes, SizeClass};
/// use typenum::{U2, U2048, U512};
///
/// struct Cramped;
///
/// impl BlockSizes for Cramped {
///     type Small = U2;
///     type Medium = U512;
///     type Large = U2048;
/// }
///
/// SizeClass::Small.block_size::<Cramped>();
/// ```
///
/// Every block size must keep links aligned:
///
/// ```compile_fail,E0080
/// use drone_pool::{BlockSizes, SizeClass};
/// use typenum::{U2048, U64, U65};
///
/// struct Ragged;
///
/// impl BlockSizes for Ragged {
///     type Small = U64;
///     type Medium = U65;
///     type Large = U2048;
/// }
///
/// SizeClass::Medium.block_size::<Ragged>();
/// ```
///
/// Sizes must grow from small to large:
///
/// ```compile_fail,E0080
/// use drone_pool::{BlockSizes, Pool, PoolConfig};
/// use typenum::{U2048, U512, U64};
///
/// struct Shuffled;
///
/// impl BlockSizes for Shuffled {
///     type Small = U512;
///     type Medium = U64;
///     type Large = U2048;
/// }
///
/// let _ = Pool::<Shuffled>::new(PoolConfig::new(1, 1, 1));
/// ```
pub trait BlockSizes {
    /// Block size of [`SizeClass::Small`].
    type Small: Unsigned;
    /// Block size of [`SizeClass::Medium`].
    type Medium: Unsigned;
    /// Block size of [`SizeClass::Large`].
    type Large: Unsigned;
}

/// The default class sizes: 64, 512 and 2048 bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultSizes;

impl BlockSizes for DefaultSizes {
    type Small = U64;
    type Medium = U512;
    type Large = U2048;
}

pub(crate) struct Sizes<S>(PhantomData<S>);

impl<S: BlockSizes> Sizes<S> {
    /// Block sizes indexed by [`SizeClass::index`].
    pub(crate) const ALL: [usize; 3] = {
        let sizes = [S::Small::USIZE, S::Medium::USIZE, S::Large::USIZE];
        assert!(sizes[0] >= mem::size_of::<usize>(), "small block can't hold a free-list link");
        let mut i = 0;
        while i < sizes.len() {
            assert!(sizes[i] % mem::align_of::<usize>() == 0, "block size breaks link alignment");
            i += 1;
        }
        assert!(sizes[0] < sizes[1] && sizes[1] < sizes[2], "block sizes must be ascending");
        sizes
    };
}

impl SizeClass {
    /// All classes in layout and classification order.
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Returns the block size of the class.
    #[inline]
    pub const fn block_size<S: BlockSizes>(self) -> usize {
        Sizes::<S>::ALL[self.index()]
    }

    /// Selects the smallest class whose blocks can hold `size` bytes.
    ///
    /// # Errors
    ///
    /// * [`PoolError::ZeroSize`] if `size` is zero.
    /// * [`PoolError::Oversize`] if `size` exceeds the largest block.
    pub fn for_size<S: BlockSizes>(size: usize) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::ZeroSize);
        }
        Self::ALL
            .into_iter()
            .find(|class| size <= class.block_size::<S>())
            .ok_or(PoolError::Oversize { size, max: Self::Large.block_size::<S>() })
    }

    /// Returns the position of the class in [`SizeClass::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        })
    }
}
