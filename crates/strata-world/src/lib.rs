//! Terrain shaping: classification blending, column heights, density and aquifers.
#![forbid(unsafe_code)]

pub mod classifier;
pub mod terrain;
pub mod worldgen;

pub use classifier::{NoiseClassifier, RegionClassifier};
pub use terrain::*;
pub use worldgen::{ConfigError, TerrainGenConfig, TerrainGenParams, load_params_from_path};
