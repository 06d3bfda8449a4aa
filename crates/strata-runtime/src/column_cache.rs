use strata_world::{ColumnResult, LossyCacheStats, LossyPositionCache, TerrainGenerator};

/// Memoized out-of-tile column probes, keyed by block column.
///
/// Probes are pure, so a collision only costs a recomputation.
pub struct ProbeColumnCache {
    cache: LossyPositionCache<ColumnResult>,
}

impl ProbeColumnCache {
    pub fn new(slots: usize) -> Self {
        Self {
            cache: LossyPositionCache::new(slots),
        }
    }

    pub fn probe(&self, generator: &TerrainGenerator, x: i32, z: i32) -> ColumnResult {
        self.cache
            .get_or_insert_with(x, z, || generator.probe_column(x, z))
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> LossyCacheStats {
        self.cache.stats()
    }
}
