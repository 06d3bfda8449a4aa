use strata_regions::{ColumnState, RegionId, RegionTable};

use super::column::ColumnResult;
use super::weights::WeightMap;
use crate::worldgen::TerrainGenParams;

#[derive(Clone, Copy, Debug)]
struct DensityTerm {
    region: RegionId,
    weight: f64,
    state: ColumnState,
}

/// Signed density per sample; positive is solid. Bound to one column at a time.
pub struct DensityFieldEvaluator<'t> {
    table: &'t RegionTable,
    air_threshold: f64,
    slide: f64,
    terms: Vec<DensityTerm>,
    height: f64,
}

impl<'t> DensityFieldEvaluator<'t> {
    pub fn new(table: &'t RegionTable, params: &TerrainGenParams) -> Self {
        Self::with_constants(table, params.air_threshold, params.slide)
    }

    pub fn with_constants(table: &'t RegionTable, air_threshold: f64, slide: f64) -> Self {
        Self {
            table,
            air_threshold,
            slide,
            terms: Vec::with_capacity(8),
            height: 0.0,
        }
    }

    /// Prepares every weighted region's density sampler for the column at `(x, z)`.
    pub fn set_column(&mut self, x: i32, z: i32, weights: &WeightMap, column: &ColumnResult) {
        self.terms.clear();
        self.height = column.height;
        for (region, weight) in weights.iter() {
            let mut state = ColumnState::default();
            self.table
                .region(region)
                .density_sampler()
                .set_column(&mut state, x, z);
            self.terms.push(DensityTerm {
                region,
                weight,
                state,
            });
        }
    }

    /// Density in `[-1, 1]` at height `y` of the bound column.
    pub fn density_at(&self, y: i32) -> f64 {
        let mut noise = 0.0;
        for term in &self.terms {
            let sampler = self.table.region(term.region).density_sampler();
            noise += sampler.noise(&term.state, y) * term.weight;
        }
        let mut density = self.air_threshold - noise;
        let yf = y as f64;
        if yf > self.height {
            density -= (yf - self.height) * self.slide;
        }
        density.clamp(-1.0, 1.0)
    }
}
