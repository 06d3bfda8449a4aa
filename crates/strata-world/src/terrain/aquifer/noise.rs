use fastnoise_lite::{FastNoiseLite, NoiseType};
use strata_regions::fold_seed;

use crate::worldgen::TerrainGenParams;

fn field(seed: i32, frequency: f32) -> FastNoiseLite {
    let mut n = FastNoiseLite::with_seed(seed);
    n.set_noise_type(Some(NoiseType::OpenSimplex2));
    n.set_frequency(Some(frequency));
    n
}

/// Seeded noise fields shared by every aquifer of one world.
pub struct AquiferNoise {
    barrier: FastNoiseLite,
    floodedness: FastNoiseLite,
    spread: FastNoiseLite,
    lava: FastNoiseLite,
    lattice_seed: u32,
}

impl AquiferNoise {
    pub fn new(seed: i64, params: &TerrainGenParams) -> Self {
        let s = fold_seed(seed);
        Self {
            barrier: field(s ^ 0x0BA5_51E5, params.barrier_frequency),
            floodedness: field(s ^ 0x0F10_0D3D, params.floodedness_frequency),
            spread: field(s ^ 0x05B2_EAD0, params.spread_frequency),
            lava: field(s ^ 0x01A7_A000, params.lava_frequency),
            lattice_seed: (s as u32) ^ 0xA9F1_3C07,
        }
    }

    #[inline]
    pub fn lattice_seed(&self) -> u32 {
        self.lattice_seed
    }

    #[inline]
    pub fn barrier(&self, x: f64, y: f64, z: f64) -> f64 {
        self.barrier.get_noise_3d(x as f32, y as f32, z as f32) as f64
    }

    #[inline]
    pub fn floodedness(&self, x: f64, y: f64, z: f64) -> f64 {
        self.floodedness.get_noise_3d(x as f32, y as f32, z as f32) as f64
    }

    #[inline]
    pub fn spread(&self, x: f64, y: f64, z: f64) -> f64 {
        self.spread.get_noise_3d(x as f32, y as f32, z as f32) as f64
    }

    #[inline]
    pub fn lava(&self, x: f64, y: f64, z: f64) -> f64 {
        self.lava.get_noise_3d(x as f32, y as f32, z as f32) as f64
    }
}
