use fastnoise_lite::{FastNoiseLite, NoiseType};

/// Terrain height of a region at a block column.
pub trait HeightSampler: Send + Sync {
    fn height(&self, x: i32, z: i32) -> f64;
}

impl<F> HeightSampler for F
where
    F: Fn(i32, i32) -> f64 + Send + Sync,
{
    #[inline]
    fn height(&self, x: i32, z: i32) -> f64 {
        self(x, z)
    }
}

/// Per-column scratch owned by the caller so samplers stay shareable across threads.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColumnState {
    pub x: i32,
    pub z: i32,
    pub cached: f64,
}

/// Vertical density profile of a region.
///
/// `set_column` runs once per column, `noise` once per sample in that column.
/// Values above the air threshold (0.4) read as air, values at or below zero as solid.
pub trait DensitySampler: Send + Sync {
    fn set_column(&self, state: &mut ColumnState, x: i32, z: i32) {
        state.x = x;
        state.z = z;
        state.cached = 0.0;
    }

    fn noise(&self, state: &ColumnState, y: i32) -> f64;
}

#[derive(Clone, Copy, Debug)]
pub struct ConstantHeight(pub f64);

impl HeightSampler for ConstantHeight {
    #[inline]
    fn height(&self, _x: i32, _z: i32) -> f64 {
        self.0
    }
}

pub struct NoiseHeight {
    noise: FastNoiseLite,
    base: f64,
    amplitude: f64,
    octaves: u32,
    persistence: f32,
    lacunarity: f32,
}

impl NoiseHeight {
    pub fn new(
        seed: i32,
        frequency: f32,
        base: f64,
        amplitude: f64,
        octaves: u32,
        persistence: f32,
        lacunarity: f32,
    ) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(frequency));
        Self {
            noise,
            base,
            amplitude,
            octaves: octaves.max(1),
            persistence,
            lacunarity,
        }
    }

    fn fractal(&self, x: f32, z: f32) -> f32 {
        let mut amp = 1.0_f32;
        let mut freq = 1.0_f32;
        let mut sum = 0.0_f32;
        let mut max_amp = 0.0_f32;
        for _ in 0..self.octaves {
            sum += self.noise.get_noise_2d(x * freq, z * freq) * amp;
            max_amp += amp;
            amp *= self.persistence;
            freq *= self.lacunarity;
        }
        if max_amp > 0.0 { sum / max_amp } else { sum }
    }
}

impl HeightSampler for NoiseHeight {
    fn height(&self, x: i32, z: i32) -> f64 {
        self.base + self.amplitude * self.fractal(x as f32, z as f32) as f64
    }
}

/// Never carves; the column is solid up to its blended height.
#[derive(Clone, Copy, Debug, Default)]
pub struct SolidDensity;

impl DensitySampler for SolidDensity {
    #[inline]
    fn noise(&self, _state: &ColumnState, _y: i32) -> f64 {
        0.0
    }
}

/// Carves overhangs with 3D noise, scaled by a per-column 2D strength.
pub struct CarvedDensity {
    strength: FastNoiseLite,
    carve: FastNoiseLite,
    amplitude: f64,
    y_scale: f32,
}

impl CarvedDensity {
    pub fn new(seed: i32, frequency: f32, amplitude: f64, y_scale: f32) -> Self {
        let mut strength = FastNoiseLite::with_seed(seed ^ 0x51A7_0C3D);
        strength.set_noise_type(Some(NoiseType::OpenSimplex2));
        strength.set_frequency(Some(frequency * 0.25));
        let mut carve = FastNoiseLite::with_seed(seed);
        carve.set_noise_type(Some(NoiseType::OpenSimplex2));
        carve.set_frequency(Some(frequency));
        Self {
            strength,
            carve,
            amplitude,
            y_scale,
        }
    }
}

impl DensitySampler for CarvedDensity {
    fn set_column(&self, state: &mut ColumnState, x: i32, z: i32) {
        state.x = x;
        state.z = z;
        let s = self.strength.get_noise_2d(x as f32, z as f32);
        state.cached = ((s + 1.0) * 0.5) as f64;
    }

    fn noise(&self, state: &ColumnState, y: i32) -> f64 {
        let n = self
            .carve
            .get_noise_3d(state.x as f32, y as f32 * self.y_scale, state.z as f32);
        self.amplitude * state.cached * (n.max(0.0) as f64)
    }
}
