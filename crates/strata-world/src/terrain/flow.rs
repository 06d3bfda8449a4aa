use fastnoise_lite::{FastNoiseLite, NoiseType};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlowVector {
    pub x: f32,
    pub z: f32,
}

impl FlowVector {
    pub const ZERO: FlowVector = FlowVector { x: 0.0, z: 0.0 };

    #[inline]
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    #[inline]
    fn scaled(self, t: f32) -> Self {
        Self {
            x: self.x * t,
            z: self.z * t,
        }
    }

    #[inline]
    fn plus(self, o: Self) -> Self {
        Self {
            x: self.x + o.x,
            z: self.z + o.z,
        }
    }
}

/// River flow at quart resolution (one sample per 4 blocks).
pub trait RiverFlowSource: Send + Sync {
    fn flow_at(&self, quart_x: i32, quart_z: i32) -> FlowVector;
}

impl<F> RiverFlowSource for F
where
    F: Fn(i32, i32) -> FlowVector + Send + Sync,
{
    #[inline]
    fn flow_at(&self, quart_x: i32, quart_z: i32) -> FlowVector {
        self(quart_x, quart_z)
    }
}

/// Flow along the contour lines of a seeded 2D field (perpendicular to its gradient).
pub struct NoiseFlowSource {
    noise: FastNoiseLite,
    frequency: f32,
}

impl NoiseFlowSource {
    pub fn new(seed: i32, frequency: f32) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed ^ 0x0F10_3A5E);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(frequency));
        Self { noise, frequency }
    }
}

impl RiverFlowSource for NoiseFlowSource {
    fn flow_at(&self, quart_x: i32, quart_z: i32) -> FlowVector {
        let bx = (quart_x << 2) as f32;
        let bz = (quart_z << 2) as f32;
        let gx = (self.noise.get_noise_2d(bx + 2.0, bz) - self.noise.get_noise_2d(bx - 2.0, bz)) / 4.0;
        let gz = (self.noise.get_noise_2d(bx, bz + 2.0) - self.noise.get_noise_2d(bx, bz - 2.0)) / 4.0;
        let len = (gx * gx + gz * gz).sqrt();
        if len <= f32::EPSILON {
            return FlowVector::ZERO;
        }
        let strength = (len / (self.frequency * 1.5)).min(1.0);
        FlowVector::new(-gz / len, gx / len).scaled(strength)
    }
}

pub const FLOW_GRID_WIDTH: usize = 5;

/// 5x5 flow samples covering one 16x16 tile at quart spacing.
#[derive(Clone, Debug)]
pub struct FlowMap {
    samples: [FlowVector; FLOW_GRID_WIDTH * FLOW_GRID_WIDTH],
    min_magnitude: f32,
}

impl FlowMap {
    pub fn sample(
        source: &dyn RiverFlowSource,
        origin_x: i32,
        origin_z: i32,
        min_magnitude: f32,
    ) -> Self {
        let qx = origin_x >> 2;
        let qz = origin_z >> 2;
        let mut samples = [FlowVector::ZERO; FLOW_GRID_WIDTH * FLOW_GRID_WIDTH];
        for z in 0..FLOW_GRID_WIDTH {
            for x in 0..FLOW_GRID_WIDTH {
                samples[x + z * FLOW_GRID_WIDTH] = source.flow_at(qx + x as i32, qz + z as i32);
            }
        }
        Self {
            samples,
            min_magnitude,
        }
    }

    #[inline]
    pub fn sample_at(&self, ix: usize, iz: usize) -> FlowVector {
        self.samples[ix + iz * FLOW_GRID_WIDTH]
    }

    /// Bilinear flow for a column, `local_x/z` in `0..16`; `None` below the minimum magnitude.
    pub fn flow_at(&self, local_x: usize, local_z: usize) -> Option<FlowVector> {
        let ix = local_x >> 2;
        let iz = local_z >> 2;
        let tx = (local_x & 3) as f32 / 4.0;
        let tz = (local_z & 3) as f32 / 4.0;
        let f = self
            .sample_at(ix, iz)
            .scaled((1.0 - tx) * (1.0 - tz))
            .plus(self.sample_at(ix + 1, iz).scaled(tx * (1.0 - tz)))
            .plus(self.sample_at(ix, iz + 1).scaled((1.0 - tx) * tz))
            .plus(self.sample_at(ix + 1, iz + 1).scaled(tx * tz));
        if f.length() < self.min_magnitude {
            None
        } else {
            Some(f)
        }
    }
}
