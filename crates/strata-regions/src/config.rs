use serde::Deserialize;

use crate::table::BlendGroup;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct RegionsConfig {
    #[serde(default)]
    pub regions: Vec<RegionDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegionDef {
    pub name: String,
    #[serde(default)]
    pub river: bool,
    #[serde(default)]
    pub shore: bool,
    #[serde(default)]
    pub salty: bool,
    #[serde(default = "default_blend")]
    pub blend: BlendGroup,
    /// Continentalness interval `[min, max)` in which the classifier picks this region.
    #[serde(default)]
    pub continent: Option<[f32; 2]>,
    #[serde(default)]
    pub height: Option<HeightDef>,
    #[serde(default)]
    pub density: Option<DensityDef>,
}

fn default_blend() -> BlendGroup {
    BlendGroup::Land
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HeightDef {
    Constant {
        value: f64,
    },
    Noise {
        base: f64,
        amplitude: f64,
        #[serde(default = "default_height_frequency")]
        frequency: f32,
        #[serde(default = "default_octaves")]
        octaves: u32,
        #[serde(default = "default_persistence")]
        persistence: f32,
        #[serde(default = "default_lacunarity")]
        lacunarity: f32,
        #[serde(default)]
        salt: i32,
    },
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DensityDef {
    Solid,
    Carved {
        #[serde(default = "default_carve_frequency")]
        frequency: f32,
        #[serde(default = "default_carve_amplitude")]
        amplitude: f64,
        #[serde(default = "default_y_scale")]
        y_scale: f32,
        #[serde(default)]
        salt: i32,
    },
}

fn default_height_frequency() -> f32 {
    0.004
}
fn default_octaves() -> u32 {
    3
}
fn default_persistence() -> f32 {
    0.5
}
fn default_lacunarity() -> f32 {
    2.0
}
fn default_carve_frequency() -> f32 {
    0.03
}
fn default_carve_amplitude() -> f64 {
    1.0
}
fn default_y_scale() -> f32 {
    1.5
}
