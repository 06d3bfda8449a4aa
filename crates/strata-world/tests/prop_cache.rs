use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;
use strata_world::LossyPositionCache;
use strata_world::terrain::tile_cache::pack_pos;

#[test]
fn capacity_rounds_up_to_a_power_of_two() {
    assert_eq!(LossyPositionCache::<u8>::new(0).capacity(), 1);
    assert_eq!(LossyPositionCache::<u8>::new(100).capacity(), 128);
    assert_eq!(LossyPositionCache::<u8>::new(256).capacity(), 256);
}

#[test]
fn single_slot_cache_evicts_on_collision() {
    let cache = LossyPositionCache::new(1);
    cache.insert(1, 2, "a");
    cache.insert(3, 4, "b");
    assert_eq!(cache.get(1, 2), None);
    assert_eq!(cache.get(3, 4), Some("b"));
    let stats = cache.stats();
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
}

#[test]
fn get_or_insert_computes_once_per_resident_key() {
    let cache = LossyPositionCache::new(64);
    let calls = AtomicUsize::new(0);
    for _ in 0..5 {
        let v = cache.get_or_insert_with(-7, 9, || {
            calls.fetch_add(1, Ordering::Relaxed);
            42
        });
        assert_eq!(v, 42);
    }
    assert_eq!(calls.load(Ordering::Relaxed), 1);
    cache.clear();
    assert_eq!(cache.get(-7, 9), None);
    assert_eq!(cache.stats().entries, 0);
}

#[test]
fn concurrent_readers_and_writers_see_consistent_values() {
    let cache = LossyPositionCache::new(16);
    std::thread::scope(|s| {
        for t in 0..4 {
            let cache = &cache;
            s.spawn(move || {
                for i in 0..500 {
                    let x = (i * 7 + t) % 40;
                    let z = i % 13;
                    let v = cache.get_or_insert_with(x, z, || x * 1000 + z);
                    assert_eq!(v, x * 1000 + z);
                }
            });
        }
    });
    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, 2000);
}

proptest! {
    // Packed keys are unique per position
    #[test]
    fn packed_positions_are_injective(a in any::<(i32, i32)>(), b in any::<(i32, i32)>()) {
        prop_assume!(a != b);
        prop_assert_ne!(pack_pos(a.0, a.1), pack_pos(b.0, b.1));
    }

    // A hit always returns the value stored for that exact key
    #[test]
    fn hits_never_return_another_keys_value(keys in proptest::collection::vec(any::<(i16, i16)>(), 1..64)) {
        let cache = LossyPositionCache::new(8);
        for &(x, z) in &keys {
            cache.insert(x as i32, z as i32, (x, z));
        }
        for &(x, z) in &keys {
            if let Some(v) = cache.get(x as i32, z as i32) {
                prop_assert_eq!(v, (x, z));
            }
        }
        let last = keys[keys.len() - 1];
        prop_assert_eq!(cache.get(last.0 as i32, last.1 as i32), Some(last));
    }
}
