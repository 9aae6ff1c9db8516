use std::collections::BTreeMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::SeqCst;

/// Hit counters of every expected outcome, grouped by observation point.
pub type Statemap = BTreeMap<usize, BTreeMap<usize, AtomicUsize>>;

/// Builds a leaked [`Statemap`] listing the outcomes a model may produce.
macro_rules! statemap {
    ($($key:literal => [$($value:literal),*$(,)?]),*$(,)?) => {{
        #[allow(unused_mut)]
        let mut map = std::collections::BTreeMap::new();
        $(
            map.insert($key, {
                #[allow(unused_mut)]
                let mut inner = std::collections::BTreeMap::new();
                $(inner.insert($value, std::sync::atomic::AtomicUsize::new(0));)*
                inner
            });
        )*
        let map: &'static $crate::loom_helpers::Statemap = Box::leak(Box::new(map));
        map
    }};
}

/// Records one observed outcome, panicking if the model didn't expect it.
#[track_caller]
pub fn statemap_put(statemap: &'static Statemap, key: usize, value: usize) {
    let Some(map) = statemap.get(&key) else {
        panic!("unexpected observation point {key} (=> {value})");
    };
    let Some(counter) = map.get(&value) else {
        panic!("unexpected outcome {key} => {value}");
    };
    counter.fetch_add(1, SeqCst);
}

/// Checks that every expected outcome was observed at least once.
#[track_caller]
pub fn statemap_check_exhaustive(statemap: &'static Statemap) {
    for (key, state) in statemap {
        for (value, counter) in state {
            assert!(counter.load(SeqCst) != 0, "{key} => {value} never observed");
        }
    }
}
