use strata_regions::{RegionId, RegionTable};

use super::weights::WeightMap;

/// Weight above which a river or shore partition dominates its column.
pub const DOMINANT_WEIGHT: f64 = 0.6;
/// Upper clamp of the height delta fed to [`remap_above_water`].
pub const MAX_ABOVE_WATER_DELTA: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnResult {
    pub height: f64,
    pub region: RegionId,
}

impl ColumnResult {
    /// Height truncated toward zero, as stored in per-tile height arrays.
    #[inline]
    pub fn surface_y(&self) -> i32 {
        self.height as i32
    }
}

/// Concave remap of a delta in `[0, 20]`: steep near zero, flattening toward 20.
#[inline]
pub fn remap_above_water(delta: f64) -> f64 {
    0.02 * delta * (40.0 - delta) - 0.48
}

#[derive(Default, Clone, Copy)]
struct Partition {
    height: f64,
    weight: f64,
    best: Option<RegionId>,
    best_weight: f64,
}

impl Partition {
    #[inline]
    fn push(&mut self, id: RegionId, weight: f64, weighted_height: f64) {
        self.height += weighted_height;
        self.weight += weight;
        self.track(id, weight);
    }

    #[inline]
    fn track(&mut self, id: RegionId, weight: f64) {
        if self.best_weight < weight {
            self.best = Some(id);
            self.best_weight = weight;
        }
    }
}

/// Resolves one column's height and dominant region from its blended weights.
///
/// Never writes shared state, so it doubles as a height probe outside the tile being filled.
#[derive(Clone, Copy)]
pub struct ColumnHeightResolver<'t> {
    table: &'t RegionTable,
}

impl<'t> ColumnHeightResolver<'t> {
    pub fn new(table: &'t RegionTable) -> Self {
        Self { table }
    }

    /// Panics on an empty weight map.
    pub fn resolve(&self, x: i32, z: i32, weights: &WeightMap) -> ColumnResult {
        let mut total_height = 0.0;
        let mut river = Partition::default();
        let mut shore = Partition::default();
        let mut normal = Partition::default();
        let mut oceanic = Partition::default();

        for (id, weight) in weights.iter() {
            let region = self.table.region(id);
            let h = weight * region.height_sampler().height(x, z);
            total_height += h;

            if region.is_river() {
                river.push(id, weight, h);
            } else if region.is_shore() {
                shore.push(id, weight, h);
            } else {
                normal.track(id, weight);
            }

            if region.is_salty() {
                oceanic.weight += weight;
                oceanic.track(id, weight);
            }
        }

        let mut actual = total_height;
        let mut dominant = None;
        if river.weight > DOMINANT_WEIGHT && river.best.is_some() {
            let river_mean = river.height / river.weight;
            let delta = (actual - river_mean).clamp(0.0, MAX_ABOVE_WATER_DELTA);
            let with_river = river_mean + remap_above_water(delta);

            let normal_weight = 1.0 - river.weight - shore.weight;
            let oceanic_contribution = if oceanic.weight == 0.0 || normal_weight == 0.0 {
                0.0
            } else {
                (oceanic.weight / normal_weight).clamp(0.0, 1.0)
            };
            if oceanic_contribution < 0.5 {
                actual = lerp(2.0 * oceanic_contribution, with_river, actual);
                dominant = river.best;
            } else {
                dominant = oceanic.best;
            }
        } else if river.weight > 0.0 && normal.best.is_some() {
            let adjusted = 0.6 * river.weight;
            actual = (total_height - river.height) * ((1.0 - adjusted) / (1.0 - river.weight))
                + river.height * (adjusted / river.weight);
            dominant = normal.best;
        } else if normal.best.is_some() {
            dominant = normal.best;
        }

        if (shore.weight > DOMINANT_WEIGHT || shore.best_weight > normal.best_weight)
            && shore.best.is_some()
        {
            let shore_mean = shore.height / shore.weight;
            let delta = actual - shore_mean;
            if delta > 0.0 {
                actual = shore_mean + remap_above_water(delta.min(MAX_ABOVE_WATER_DELTA));
            }
            dominant = shore.best;
        }

        let region = match dominant.or_else(|| weights.heaviest().map(|(id, _)| id)) {
            Some(id) => id,
            None => panic!("column ({}, {}) resolved from an empty weight map", x, z),
        };
        ColumnResult {
            height: actual,
            region,
        }
    }
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}
