use core::ptr::NonNull;
use drone_pool::{DefaultSizes, Pool, PoolConfig, PoolError, SizeClass};
use std::collections::HashSet;

const COUNT: usize = 5;
const PATTERN: u8 = 0xAA;

fn make_pool() -> Pool {
    Pool::with_counts(COUNT, COUNT, COUNT).unwrap()
}

fn block_size(class: SizeClass) -> usize {
    class.block_size::<DefaultSizes>()
}

fn heads(pool: &Pool) -> [Option<NonNull<u8>>; 3] {
    SizeClass::ALL.map(|class| pool.sub_arena(class).free_head())
}

fn arena_range(pool: &Pool, class: SizeClass) -> std::ops::Range<usize> {
    let arena = pool.sub_arena(class);
    let start = arena.start().as_ptr() as usize;
    start..start + arena.block_size() * arena.block_count()
}

#[test]
fn exhaustion() {
    let mut pool = make_pool();
    for class in SizeClass::ALL {
        let size = block_size(class);
        let blocks = (0..COUNT).map(|_| pool.allocate(size).unwrap()).collect::<Vec<_>>();
        assert_eq!(blocks.iter().collect::<HashSet<_>>().len(), COUNT);
        assert_eq!(pool.allocate(size), Err(PoolError::Exhausted(class)));
        for block in &blocks {
            pool.free(block.as_ptr());
        }
        let again = (0..COUNT).map(|_| pool.allocate(size).unwrap()).collect::<Vec<_>>();
        assert_eq!(again.iter().collect::<HashSet<_>>().len(), COUNT);
        assert_eq!(pool.allocate(size), Err(PoolError::Exhausted(class)));
    }
}

#[test]
fn content_integrity() {
    let mut pool = make_pool();
    for class in SizeClass::ALL {
        let size = block_size(class);
        for request in [size - 1, size] {
            let block = pool.allocate(request).unwrap();
            unsafe { block.as_ptr().write_bytes(PATTERN, size) };
            let bytes = unsafe { std::slice::from_raw_parts(block.as_ptr(), size) };
            assert!(bytes.iter().all(|&byte| byte == PATTERN));
            pool.free(block.as_ptr());
        }
    }
}

#[test]
fn filled_neighbors_stay_intact() {
    let mut pool = make_pool();
    let mut blocks = Vec::new();
    for (i, class) in SizeClass::ALL.into_iter().enumerate() {
        for j in 0..COUNT {
            let block = pool.allocate(block_size(class)).unwrap();
            let value = (i * COUNT + j) as u8;
            unsafe { block.as_ptr().write_bytes(value, block_size(class)) };
            blocks.push((block, block_size(class), value));
        }
    }
    for (block, size, value) in blocks {
        let bytes = unsafe { std::slice::from_raw_parts(block.as_ptr(), size) };
        assert!(bytes.iter().all(|&byte| byte == value));
    }
}

#[test]
fn reallocation_identity() {
    let mut pool = make_pool();
    for class in SizeClass::ALL {
        let size = block_size(class);
        let first = pool.allocate(size).unwrap();
        pool.free(first.as_ptr());
        let second = pool.allocate(size / 2 + 1).unwrap();
        assert_eq!(first, second);
        pool.free(second.as_ptr());
    }
}

#[test]
fn lifo_interleave() {
    let mut pool = make_pool();
    for class in SizeClass::ALL {
        let size = block_size(class);
        let a = pool.allocate(size).unwrap();
        let b = pool.allocate(size).unwrap();
        let c = pool.allocate(size).unwrap();
        pool.free(b.as_ptr());
        let next = pool.allocate(size).unwrap();
        assert_eq!(next, b);
        assert_ne!(next, a);
        assert_ne!(next, c);
    }
}

#[test]
fn null_and_foreign_free() {
    let mut pool = make_pool();
    let block = pool.allocate(1).unwrap();
    let before = heads(&pool);

    pool.free(std::ptr::null_mut());
    assert_eq!(heads(&pool), before);

    let mut foreign = [0_u64; 8];
    let foreign = NonNull::new(foreign.as_mut_ptr().cast::<u8>()).unwrap();
    pool.free(foreign.as_ptr());
    assert_eq!(heads(&pool), before);
    assert_eq!(pool.try_free(foreign), Err(PoolError::ForeignPointer));

    let past_end = unsafe { pool.base().as_ptr().add(pool.total_size()) };
    pool.free(past_end);
    assert_eq!(heads(&pool), before);

    pool.free(block.as_ptr());
    assert_eq!(pool.allocate(1).unwrap(), block);
}

#[test]
fn double_free_rejected() {
    let mut pool = make_pool();
    let a = pool.allocate(100).unwrap();
    let b = pool.allocate(100).unwrap();
    assert_eq!(pool.try_free(a), Ok(SizeClass::Medium));
    let before = heads(&pool);
    assert_eq!(pool.try_free(a), Err(PoolError::DoubleFree { class: SizeClass::Medium }));
    pool.free(a.as_ptr());
    assert_eq!(heads(&pool), before);
    assert_eq!(pool.allocate(100).unwrap(), a);
    assert_ne!(pool.allocate(100).unwrap(), a);
    pool.free(b.as_ptr());
}

#[test]
fn mid_block_free_rejected() {
    let mut pool = make_pool();
    let block = pool.allocate(2048).unwrap();
    let inner = unsafe { NonNull::new_unchecked(block.as_ptr().add(64)) };
    let before = heads(&pool);
    assert_eq!(pool.try_free(inner), Err(PoolError::Misaligned { class: SizeClass::Large }));
    pool.free(inner.as_ptr());
    assert_eq!(heads(&pool), before);
    assert_eq!(pool.try_free(block), Ok(SizeClass::Large));
}

#[test]
fn cross_class_isolation() {
    let mut pool = make_pool();
    let ranges = SizeClass::ALL.map(|class| arena_range(&pool, class));
    for class in SizeClass::ALL {
        for _ in 0..COUNT {
            let addr = pool.allocate(block_size(class)).unwrap().as_ptr() as usize;
            for other in SizeClass::ALL {
                assert_eq!(ranges[other.index()].contains(&addr), other == class);
            }
        }
    }
    assert!(ranges[0].end <= ranges[1].start && ranges[1].end <= ranges[2].start);
}

#[test]
fn classification() {
    let mut pool = make_pool();
    for class in SizeClass::ALL {
        let block = pool.allocate(block_size(class)).unwrap();
        assert_eq!(pool.class_of(block), Some(class));
        assert_eq!(pool.try_free(block), Ok(class));
    }
}

#[test]
fn small_scenario() {
    let mut pool = make_pool();
    let first = (0..COUNT).map(|_| pool.allocate(64).unwrap()).collect::<Vec<_>>();
    assert_eq!(pool.allocate(64), Err(PoolError::Exhausted(SizeClass::Small)));
    for block in &first {
        pool.free(block.as_ptr());
    }
    let second = (0..COUNT).map(|_| pool.allocate(64).unwrap()).collect::<Vec<_>>();
    let reversed = first.iter().rev().copied().collect::<Vec<_>>();
    assert_eq!(second, reversed);
}

#[test]
fn inert_class() {
    let mut pool = Pool::with_counts(2, 0, 1).unwrap();
    assert_eq!(pool.allocate(100), Err(PoolError::Exhausted(SizeClass::Medium)));
    assert!(pool.sub_arena(SizeClass::Medium).free_head().is_none());
    let large = pool.allocate(1000).unwrap();
    assert_eq!(pool.class_of(large), Some(SizeClass::Large));
    assert_eq!(pool.try_free(large), Ok(SizeClass::Large));
}

#[test]
fn capacity_overflow() {
    assert_eq!(Pool::with_counts(usize::MAX, 0, 0).err(), Some(PoolError::CapacityOverflow));
    let config = PoolConfig::new(0, 0, usize::MAX / 2048);
    assert_eq!(Pool::<DefaultSizes>::new(config).err(), Some(PoolError::CapacityOverflow));
}

#[test]
fn destroy_with_outstanding_blocks() {
    let mut pool = make_pool();
    pool.allocate(1).unwrap();
    pool.allocate(1000).unwrap();
    pool.destroy();
}
