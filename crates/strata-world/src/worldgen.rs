use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

const BUILTIN_TERRAIN: &str = include_str!("../../../assets/worldgen/terrain.toml");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TerrainGenConfig {
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default)]
    pub density: Density,
    #[serde(default)]
    pub aquifer: Aquifer,
    #[serde(default)]
    pub classifier: Classifier,
    #[serde(default)]
    pub river_flow: RiverFlow,
    #[serde(default)]
    pub cache: Cache,
    #[serde(default)]
    pub runtime: Runtime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Bounds {
    #[serde(default = "default_min_y")]
    pub min_y: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default = "default_sea_level")]
    pub sea_level: i32,
    /// Defaults to ten blocks above `min_y`.
    #[serde(default)]
    pub lava_level: Option<i32>,
}
fn default_min_y() -> i32 {
    -64
}
fn default_height() -> i32 {
    384
}
fn default_sea_level() -> i32 {
    63
}
impl Default for Bounds {
    fn default() -> Self {
        Self {
            min_y: default_min_y(),
            height: default_height(),
            sea_level: default_sea_level(),
            lava_level: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Density {
    #[serde(default = "default_air_threshold")]
    pub air_threshold: f64,
    #[serde(default = "default_slide")]
    pub slide: f64,
}
fn default_air_threshold() -> f64 {
    0.4
}
fn default_slide() -> f64 {
    0.2
}
impl Default for Density {
    fn default() -> Self {
        Self {
            air_threshold: default_air_threshold(),
            slide: default_slide(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Aquifer {
    #[serde(default = "default_aquifer_enable")]
    pub enable: bool,
    #[serde(default = "default_barrier_freq")]
    pub barrier_frequency: f32,
    #[serde(default = "default_flood_freq")]
    pub floodedness_frequency: f32,
    #[serde(default = "default_spread_freq")]
    pub spread_frequency: f32,
    #[serde(default = "default_lava_freq")]
    pub lava_frequency: f32,
    #[serde(default = "default_lava_pocket_max_y")]
    pub lava_pocket_max_y: i32,
    #[serde(default = "default_lava_threshold")]
    pub lava_threshold: f64,
}
fn default_aquifer_enable() -> bool {
    true
}
fn default_barrier_freq() -> f32 {
    0.12
}
fn default_flood_freq() -> f32 {
    0.009
}
fn default_spread_freq() -> f32 {
    0.35
}
fn default_lava_freq() -> f32 {
    0.6
}
fn default_lava_pocket_max_y() -> i32 {
    -10
}
fn default_lava_threshold() -> f64 {
    0.3
}
impl Default for Aquifer {
    fn default() -> Self {
        Self {
            enable: default_aquifer_enable(),
            barrier_frequency: default_barrier_freq(),
            floodedness_frequency: default_flood_freq(),
            spread_frequency: default_spread_freq(),
            lava_frequency: default_lava_freq(),
            lava_pocket_max_y: default_lava_pocket_max_y(),
            lava_threshold: default_lava_threshold(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Classifier {
    #[serde(default = "default_continent_freq")]
    pub continent_frequency: f32,
    #[serde(default = "default_river_freq")]
    pub river_frequency: f32,
    #[serde(default = "default_river_width")]
    pub river_width: f32,
    /// Region cut into river channels; the first river-tagged region when unset.
    #[serde(default)]
    pub river_region: Option<String>,
}
fn default_continent_freq() -> f32 {
    0.0016
}
fn default_river_freq() -> f32 {
    0.0025
}
fn default_river_width() -> f32 {
    0.045
}
impl Default for Classifier {
    fn default() -> Self {
        Self {
            continent_frequency: default_continent_freq(),
            river_frequency: default_river_freq(),
            river_width: default_river_width(),
            river_region: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RiverFlow {
    #[serde(default = "default_flow_freq")]
    pub frequency: f32,
    #[serde(default = "default_flow_min")]
    pub min_magnitude: f32,
}
fn default_flow_freq() -> f32 {
    0.0025
}
fn default_flow_min() -> f32 {
    0.05
}
impl Default for RiverFlow {
    fn default() -> Self {
        Self {
            frequency: default_flow_freq(),
            min_magnitude: default_flow_min(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Cache {
    #[serde(default = "default_aquifer_slots")]
    pub aquifer_slots: usize,
    #[serde(default = "default_surface_slots")]
    pub surface_slots: usize,
    #[serde(default = "default_column_slots")]
    pub column_slots: usize,
}
fn default_aquifer_slots() -> usize {
    256
}
fn default_surface_slots() -> usize {
    4096
}
fn default_column_slots() -> usize {
    1024
}
impl Default for Cache {
    fn default() -> Self {
        Self {
            aquifer_slots: default_aquifer_slots(),
            surface_slots: default_surface_slots(),
            column_slots: default_column_slots(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct Runtime {
    /// Zero means one worker per available core.
    #[serde(default)]
    pub workers: usize,
}

#[derive(Clone, Debug)]
pub struct TerrainGenParams {
    pub min_y: i32,
    pub height: i32,
    pub sea_level: i32,
    pub lava_level: i32,
    pub air_threshold: f64,
    pub slide: f64,
    pub aquifer_enable: bool,
    pub barrier_frequency: f32,
    pub floodedness_frequency: f32,
    pub spread_frequency: f32,
    pub lava_frequency: f32,
    pub lava_pocket_max_y: i32,
    pub lava_threshold: f64,
    pub continent_frequency: f32,
    pub river_frequency: f32,
    pub river_width: f32,
    pub river_region: Option<String>,
    pub flow_frequency: f32,
    pub flow_min_magnitude: f32,
    pub aquifer_cache_slots: usize,
    pub surface_cache_slots: usize,
    pub column_cache_slots: usize,
    pub workers: usize,
}

impl Default for TerrainGenParams {
    fn default() -> Self {
        Self::from_config(&TerrainGenConfig::default())
    }
}

impl TerrainGenParams {
    pub fn from_config(cfg: &TerrainGenConfig) -> Self {
        Self {
            min_y: cfg.bounds.min_y,
            height: cfg.bounds.height,
            sea_level: cfg.bounds.sea_level,
            lava_level: cfg.bounds.lava_level.unwrap_or(cfg.bounds.min_y + 10),
            air_threshold: cfg.density.air_threshold,
            slide: cfg.density.slide,
            aquifer_enable: cfg.aquifer.enable,
            barrier_frequency: cfg.aquifer.barrier_frequency,
            floodedness_frequency: cfg.aquifer.floodedness_frequency,
            spread_frequency: cfg.aquifer.spread_frequency,
            lava_frequency: cfg.aquifer.lava_frequency,
            lava_pocket_max_y: cfg.aquifer.lava_pocket_max_y,
            lava_threshold: cfg.aquifer.lava_threshold,
            continent_frequency: cfg.classifier.continent_frequency,
            river_frequency: cfg.classifier.river_frequency,
            river_width: cfg.classifier.river_width,
            river_region: cfg.classifier.river_region.clone(),
            flow_frequency: cfg.river_flow.frequency,
            flow_min_magnitude: cfg.river_flow.min_magnitude,
            aquifer_cache_slots: cfg.cache.aquifer_slots,
            surface_cache_slots: cfg.cache.surface_slots,
            column_cache_slots: cfg.cache.column_slots,
            workers: cfg.runtime.workers,
        }
    }

    pub fn builtin() -> Result<Self, Box<dyn Error>> {
        let cfg: TerrainGenConfig = toml::from_str(BUILTIN_TERRAIN)?;
        let params = Self::from_config(&cfg);
        params.validate()?;
        Ok(params)
    }

    #[inline]
    pub fn max_y(&self) -> i32 {
        self.min_y + self.height - 1
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.height <= 0 {
            return Err(ConfigError::Bounds(format!(
                "height must be positive, got {}",
                self.height
            )));
        }
        if self.sea_level < self.min_y || self.sea_level > self.max_y() {
            return Err(ConfigError::Bounds(format!(
                "sea level {} lies outside [{}, {}]",
                self.sea_level,
                self.min_y,
                self.max_y()
            )));
        }
        if self.lava_level < self.min_y {
            return Err(ConfigError::Bounds(format!(
                "lava level {} lies below min_y {}",
                self.lava_level, self.min_y
            )));
        }
        for (name, slots) in [
            ("aquifer_slots", self.aquifer_cache_slots),
            ("surface_slots", self.surface_cache_slots),
            ("column_slots", self.column_cache_slots),
        ] {
            if slots == 0 || !slots.is_power_of_two() {
                return Err(ConfigError::CacheSlots { name, slots });
            }
        }
        Ok(())
    }
}

pub fn load_params_from_path(path: &Path) -> Result<TerrainGenParams, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: TerrainGenConfig = toml::from_str(&s)?;
    let params = TerrainGenParams::from_config(&cfg);
    params.validate()?;
    log::info!(target: "worldgen", "loaded terrain parameters from {}", path.display());
    Ok(params)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Bounds(String),
    CacheSlots { name: &'static str, slots: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Bounds(msg) => write!(f, "invalid vertical bounds: {}", msg),
            ConfigError::CacheSlots { name, slots } => {
                write!(f, "cache.{} must be a non-zero power of two, got {}", name, slots)
            }
        }
    }
}

impl Error for ConfigError {}
