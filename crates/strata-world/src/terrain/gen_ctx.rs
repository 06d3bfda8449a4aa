use std::sync::Arc;
use std::time::Duration;

use super::aquifer::AquiferStats;
use super::tile_cache::LossyCacheStats;
use super::weights::WeightMap;
use crate::worldgen::TerrainGenParams;

pub const TERRAIN_STAGE_COUNT: usize = 5;
pub const TERRAIN_STAGE_LABELS: [&str; TERRAIN_STAGE_COUNT] =
    ["blend", "height", "density", "aquifer", "flow"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerrainStage {
    Blend,
    Height,
    Density,
    Aquifer,
    Flow,
}

impl TerrainStage {
    pub const ALL: [TerrainStage; TERRAIN_STAGE_COUNT] = [
        TerrainStage::Blend,
        TerrainStage::Flow,
        TerrainStage::Height,
        TerrainStage::Density,
        TerrainStage::Aquifer,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            TerrainStage::Blend => 0,
            TerrainStage::Height => 1,
            TerrainStage::Density => 2,
            TerrainStage::Aquifer => 3,
            TerrainStage::Flow => 4,
        }
    }

    #[inline]
    pub const fn label(self) -> &'static str {
        TERRAIN_STAGE_LABELS[self.index()]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainStageSample {
    pub time_us: u32,
    pub calls: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileTiming {
    pub total_us: u32,
    pub fill_us: u32,
}

/// Per-tile generation summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainMetrics {
    pub stages: [TerrainStageSample; TERRAIN_STAGE_COUNT],
    pub aquifer: AquiferStats,
    pub surface_cache: LossyCacheStats,
    pub tile_timing: TileTiming,
}

impl TerrainMetrics {
    #[inline]
    pub fn stage(&self, stage: TerrainStage) -> TerrainStageSample {
        self.stages[stage.index()]
    }
}

#[derive(Clone, Debug, Default)]
pub struct TerrainProfiler {
    stage_ns: [u64; TERRAIN_STAGE_COUNT],
    stage_calls: [u32; TERRAIN_STAGE_COUNT],
}

impl TerrainProfiler {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn begin_stage(&mut self, stage: TerrainStage) {
        let c = &mut self.stage_calls[stage.index()];
        *c = c.saturating_add(1);
    }

    #[inline]
    pub fn record_stage_duration(&mut self, stage: TerrainStage, elapsed: Duration) {
        let ns = &mut self.stage_ns[stage.index()];
        *ns = ns.saturating_add(elapsed.as_nanos().min(u64::MAX as u128) as u64);
    }

    pub fn snapshot(&self) -> [TerrainStageSample; TERRAIN_STAGE_COUNT] {
        let mut out = [TerrainStageSample::default(); TERRAIN_STAGE_COUNT];
        for (i, s) in out.iter_mut().enumerate() {
            s.time_us = (self.stage_ns[i] / 1_000).min(u32::MAX as u64) as u32;
            s.calls = self.stage_calls[i];
        }
        out
    }
}

/// Scratch state owned by one worker; reused across tiles.
pub struct TerrainCtx {
    pub params: Arc<TerrainGenParams>,
    pub profiler: TerrainProfiler,
    pub column_weights: WeightMap,
}

impl TerrainCtx {
    pub fn new(params: Arc<TerrainGenParams>) -> Self {
        Self {
            params,
            profiler: TerrainProfiler::default(),
            column_weights: WeightMap::with_capacity(8),
        }
    }

    /// Clears per-tile state before the context is handed to a new job.
    pub fn prepare(&mut self) {
        self.profiler.reset();
        self.column_weights.clear();
    }
}
