use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[inline]
pub fn pack_pos(x: i32, z: i32) -> u64 {
    ((x as u32 as u64) << 32) | (z as u32 as u64)
}

#[inline]
fn slot_index(key: u64, mask: usize) -> usize {
    let mut h = key ^ 0x9e37_79b9_7f4a_7c15;
    h ^= h >> 30;
    h = h.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94d0_49bb_1331_11eb);
    h ^= h >> 31;
    (h as usize) & mask
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LossyCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

/// Fixed-size position-keyed cache; a colliding insert overwrites the slot.
///
/// One mutex guards all slots. Values are computed outside the lock, so two
/// threads missing the same key may both compute; the later write wins.
pub struct LossyPositionCache<T> {
    slots: Mutex<Vec<Option<(u64, T)>>>,
    mask: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<T: Clone> LossyPositionCache<T> {
    /// `slots` is rounded up to a power of two.
    pub fn new(slots: usize) -> Self {
        let n = slots.max(1).next_power_of_two();
        let mut v = Vec::with_capacity(n);
        v.resize_with(n, || None);
        Self {
            slots: Mutex::new(v),
            mask: n - 1,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Option<(u64, T)>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, x: i32, z: i32) -> Option<T> {
        let key = pack_pos(x, z);
        let found = {
            let slots = self.lock();
            match &slots[slot_index(key, self.mask)] {
                Some((k, v)) if *k == key => Some(v.clone()),
                _ => None,
            }
        };
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    pub fn insert(&self, x: i32, z: i32, value: T) {
        let key = pack_pos(x, z);
        let mut slots = self.lock();
        let slot = &mut slots[slot_index(key, self.mask)];
        if matches!(slot, Some((k, _)) if *k != key) {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        *slot = Some((key, value));
    }

    pub fn get_or_insert_with(&self, x: i32, z: i32, make: impl FnOnce() -> T) -> T {
        if let Some(v) = self.get(x, z) {
            return v;
        }
        let value = make();
        self.insert(x, z, value.clone());
        value
    }

    pub fn clear(&self) {
        let mut slots = self.lock();
        let mut removed = 0u64;
        for slot in slots.iter_mut() {
            if slot.take().is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            self.evictions.fetch_add(removed, Ordering::Relaxed);
        }
    }

    pub fn stats(&self) -> LossyCacheStats {
        LossyCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: self.lock().iter().filter(|s| s.is_some()).count(),
        }
    }
}
