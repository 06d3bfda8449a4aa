use fastnoise_lite::{FastNoiseLite, NoiseType};
use strata_regions::{RegionId, RegionTable, RegionTableError, SelectRange, fold_seed};

use crate::worldgen::TerrainGenParams;

/// Maps a block column to its discrete region classification.
pub trait RegionClassifier: Send + Sync {
    fn classify(&self, x: i32, z: i32) -> RegionId;
}

impl<F> RegionClassifier for F
where
    F: Fn(i32, i32) -> RegionId + Send + Sync,
{
    #[inline]
    fn classify(&self, x: i32, z: i32) -> RegionId {
        self(x, z)
    }
}

#[derive(Clone, Copy, Debug)]
struct Band {
    range: SelectRange,
    id: RegionId,
    salty: bool,
}

/// Continentalness bands from the region table with river channels cut along a
/// second noise field's zero contour.
pub struct NoiseClassifier {
    continent: FastNoiseLite,
    river: FastNoiseLite,
    river_width: f32,
    bands: Vec<Band>,
    river_region: Option<RegionId>,
}

impl NoiseClassifier {
    pub fn new(
        table: &RegionTable,
        params: &TerrainGenParams,
        seed: i64,
    ) -> Result<Self, RegionTableError> {
        let s = fold_seed(seed);
        let mut continent = FastNoiseLite::with_seed(s ^ 0x00C0_417E);
        continent.set_noise_type(Some(NoiseType::OpenSimplex2));
        continent.set_frequency(Some(params.continent_frequency));
        let mut river = FastNoiseLite::with_seed(s ^ 0x0041_7E25);
        river.set_noise_type(Some(NoiseType::OpenSimplex2));
        river.set_frequency(Some(params.river_frequency));

        let mut bands: Vec<Band> = table
            .iter()
            .filter(|r| !r.is_river())
            .filter_map(|r| {
                r.select.map(|range| Band {
                    range,
                    id: r.id,
                    salty: r.is_salty(),
                })
            })
            .collect();
        if bands.is_empty() {
            return Err(RegionTableError::Empty);
        }
        bands.sort_by(|a, b| a.range.min.total_cmp(&b.range.min));
        let river_region = match params.river_region.as_deref() {
            Some(name) => {
                let id = table
                    .id_by_name(name)
                    .ok_or_else(|| RegionTableError::UnknownRegion(name.to_string()))?;
                if !table.region(id).is_river() {
                    return Err(RegionTableError::InvalidParameter {
                        region: name.to_string(),
                        reason: "classifier river region is not tagged river".to_string(),
                    });
                }
                Some(id)
            }
            None => table.iter().find(|r| r.is_river()).map(|r| r.id),
        };
        if river_region.is_none() {
            log::warn!(target: "worldgen", "region table has no river region; rivers are disabled");
        }

        Ok(Self {
            continent,
            river,
            river_width: params.river_width,
            bands,
            river_region,
        })
    }

    pub fn continentalness(&self, x: i32, z: i32) -> f32 {
        let (fx, fz) = (x as f32, z as f32);
        let a = self.continent.get_noise_2d(fx, fz);
        let b = self.continent.get_noise_2d(fx * 2.0 + 173.0, fz * 2.0 - 91.0);
        (a + 0.5 * b) / 1.5
    }

    fn band_for(&self, c: f32) -> Band {
        // Out-of-range values snap to the nearest end band.
        match self.bands.iter().find(|b| b.range.contains(c)) {
            Some(b) => *b,
            None if c < self.bands[0].range.min => self.bands[0],
            None => self.bands[self.bands.len() - 1],
        }
    }
}

impl RegionClassifier for NoiseClassifier {
    fn classify(&self, x: i32, z: i32) -> RegionId {
        let band = self.band_for(self.continentalness(x, z));
        if let Some(river) = self.river_region {
            if !band.salty && self.river.get_noise_2d(x as f32, z as f32).abs() < self.river_width {
                return river;
            }
        }
        band.id
    }
}
