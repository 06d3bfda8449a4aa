//! Region type table and per-region height/density samplers.
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod sampler;
pub mod table;

pub use config::{DensityDef, HeightDef, RegionDef, RegionsConfig};
pub use error::RegionTableError;
pub use sampler::{
    CarvedDensity, ColumnState, ConstantHeight, DensitySampler, HeightSampler, NoiseHeight,
    SolidDensity,
};
pub use table::{BlendGroup, RegionId, RegionTable, RegionTags, RegionType, SelectRange};

/// Folds a 64-bit world seed into the 32-bit seed space used by the noise generators.
#[inline]
pub fn fold_seed(seed: i64) -> i32 {
    ((seed ^ (seed >> 32)) as u32) as i32
}
