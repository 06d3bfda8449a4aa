use std::sync::Arc;

use strata_regions::{BlendGroup, RegionId, RegionTable, RegionTableError, fold_seed};

use super::aquifer::{AquiferNoise, AquiferSettings, AquiferSimulator, SurfaceEstimate};
use super::blend::{BlendGrid, QUART_BITS, probe_quart_weights};
use super::column::{ColumnHeightResolver, ColumnResult};
use super::flow::{FlowMap, NoiseFlowSource, RiverFlowSource};
use super::gen_ctx::TerrainCtx;
use super::tile_cache::{LossyCacheStats, LossyPositionCache};
use super::tile_coord::TileCoord;
use super::weights::WeightMap;
use crate::classifier::{NoiseClassifier, RegionClassifier};
use crate::worldgen::TerrainGenParams;

/// Surface height at quart resolution, memoized per quart point.
pub struct BlendedSurface {
    table: Arc<RegionTable>,
    classifier: Arc<dyn RegionClassifier>,
    cache: LossyPositionCache<i32>,
}

impl BlendedSurface {
    pub fn new(
        table: Arc<RegionTable>,
        classifier: Arc<dyn RegionClassifier>,
        slots: usize,
    ) -> Self {
        Self {
            table,
            classifier,
            cache: LossyPositionCache::new(slots),
        }
    }

    pub fn cache_stats(&self) -> LossyCacheStats {
        self.cache.stats()
    }

    fn compute(&self, qx: i32, qz: i32) -> i32 {
        let table = &*self.table;
        let weights = probe_quart_weights(
            &*self.classifier,
            qx,
            qz,
            &|id: RegionId| table.blend_group(id),
            BlendGroup::COUNT,
        );
        ColumnHeightResolver::new(table)
            .resolve(qx << QUART_BITS, qz << QUART_BITS, &weights)
            .surface_y()
    }
}

impl SurfaceEstimate for BlendedSurface {
    fn surface_level(&self, x: i32, z: i32) -> i32 {
        let qx = x >> QUART_BITS;
        let qz = z >> QUART_BITS;
        self.cache
            .get_or_insert_with(qx, qz, || self.compute(qx, qz))
    }
}

/// Everything tile generation needs that is shared across workers for one world.
pub struct TerrainGenerator {
    seed: i64,
    params: Arc<TerrainGenParams>,
    table: Arc<RegionTable>,
    classifier: Arc<dyn RegionClassifier>,
    flow: Arc<dyn RiverFlowSource>,
    aquifer_noise: Arc<AquiferNoise>,
    surface: Arc<BlendedSurface>,
}

impl TerrainGenerator {
    /// Generator with the noise-driven classifier and flow source.
    pub fn new(
        seed: i64,
        params: TerrainGenParams,
        table: Arc<RegionTable>,
    ) -> Result<Self, RegionTableError> {
        let classifier: Arc<dyn RegionClassifier> =
            Arc::new(NoiseClassifier::new(&table, &params, seed)?);
        let flow: Arc<dyn RiverFlowSource> =
            Arc::new(NoiseFlowSource::new(fold_seed(seed), params.flow_frequency));
        Ok(Self::with_sources(seed, params, table, classifier, flow))
    }

    pub fn with_sources(
        seed: i64,
        params: TerrainGenParams,
        table: Arc<RegionTable>,
        classifier: Arc<dyn RegionClassifier>,
        flow: Arc<dyn RiverFlowSource>,
    ) -> Self {
        let aquifer_noise = Arc::new(AquiferNoise::new(seed, &params));
        let surface = Arc::new(BlendedSurface::new(
            Arc::clone(&table),
            Arc::clone(&classifier),
            params.surface_cache_slots,
        ));
        log::info!(
            target: "worldgen",
            "terrain generator ready: seed={} regions={} y=[{}, {}] sea={} lava={} aquifer={}",
            seed,
            table.len(),
            params.min_y,
            params.max_y(),
            params.sea_level,
            params.lava_level,
            params.aquifer_enable
        );
        Self {
            seed,
            params: Arc::new(params),
            table,
            classifier,
            flow,
            aquifer_noise,
            surface,
        }
    }

    #[inline]
    pub fn seed(&self) -> i64 {
        self.seed
    }

    #[inline]
    pub fn params(&self) -> &TerrainGenParams {
        &self.params
    }

    #[inline]
    pub fn table(&self) -> &RegionTable {
        &self.table
    }

    #[inline]
    pub fn classifier(&self) -> &dyn RegionClassifier {
        &*self.classifier
    }

    #[inline]
    pub fn surface(&self) -> &BlendedSurface {
        &self.surface
    }

    pub fn make_ctx(&self) -> TerrainCtx {
        TerrainCtx::new(Arc::clone(&self.params))
    }

    pub fn blend_grid(&self, coord: TileCoord) -> BlendGrid {
        let table = &*self.table;
        BlendGrid::sample(
            &*self.classifier,
            coord.origin_x(),
            coord.origin_z(),
            &|id: RegionId| table.blend_group(id),
            BlendGroup::COUNT,
        )
    }

    pub fn flow_map(&self, coord: TileCoord) -> FlowMap {
        FlowMap::sample(
            &*self.flow,
            coord.origin_x(),
            coord.origin_z(),
            self.params.flow_min_magnitude,
        )
    }

    pub fn make_aquifer(&self, coord: TileCoord) -> AquiferSimulator {
        let surface: Arc<dyn SurfaceEstimate> = self.surface.clone();
        AquiferSimulator::new(
            coord.origin_x(),
            coord.origin_z(),
            AquiferSettings::from_params(&self.params),
            Arc::clone(&self.aquifer_noise),
            surface,
        )
    }

    /// Blended weights for one block column, identical to what a tile fill computes there.
    pub fn column_weights(&self, x: i32, z: i32) -> WeightMap {
        let table = &*self.table;
        let grouping = |id: RegionId| table.blend_group(id);
        let qx = x >> QUART_BITS;
        let qz = z >> QUART_BITS;
        let tx = (x & 3) as f64 / 4.0;
        let tz = (z & 3) as f64 / 4.0;
        let mut out = WeightMap::with_capacity(8);
        for (ox, oz, t) in [
            (0, 0, (1.0 - tx) * (1.0 - tz)),
            (1, 0, tx * (1.0 - tz)),
            (0, 1, (1.0 - tx) * tz),
            (1, 1, tx * tz),
        ] {
            if t > 0.0 {
                let corner = probe_quart_weights(
                    &*self.classifier,
                    qx + ox,
                    qz + oz,
                    &grouping,
                    BlendGroup::COUNT,
                );
                out.add_scaled(&corner, t);
            }
        }
        out
    }

    /// Height and dominant region of any column, without generating its tile.
    pub fn probe_column(&self, x: i32, z: i32) -> ColumnResult {
        let weights = self.column_weights(x, z);
        ColumnHeightResolver::new(&self.table).resolve(x, z, &weights)
    }
}
