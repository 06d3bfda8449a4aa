use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::config::{DensityDef, HeightDef, RegionDef, RegionsConfig};
use crate::error::RegionTableError;
use crate::fold_seed;
use crate::sampler::{
    CarvedDensity, ConstantHeight, DensitySampler, HeightSampler, NoiseHeight, SolidDensity,
};

pub type RegionId = u16;

const BUILTIN_REGIONS: &str = include_str!("../../../assets/worldgen/regions.toml");

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RegionTags {
    pub river: bool,
    pub shore: bool,
    pub salty: bool,
}

/// Which coarse group a region is re-weighted with during blending.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendGroup {
    /// Kept at local resolution, never re-weighted from the coarse map.
    Local,
    Land,
    Ocean,
    River,
}

impl BlendGroup {
    pub const COUNT: usize = 3;

    #[inline]
    pub fn index(self) -> Option<usize> {
        match self {
            BlendGroup::Local => None,
            BlendGroup::Land => Some(0),
            BlendGroup::Ocean => Some(1),
            BlendGroup::River => Some(2),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SelectRange {
    pub min: f32,
    pub max: f32,
}

impl SelectRange {
    #[inline]
    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v < self.max
    }
}

pub struct RegionType {
    pub id: RegionId,
    pub name: String,
    pub tags: RegionTags,
    pub blend: BlendGroup,
    pub select: Option<SelectRange>,
    height: Box<dyn HeightSampler>,
    density: Box<dyn DensitySampler>,
}

impl RegionType {
    #[inline]
    pub fn height_sampler(&self) -> &dyn HeightSampler {
        self.height.as_ref()
    }

    #[inline]
    pub fn density_sampler(&self) -> &dyn DensitySampler {
        self.density.as_ref()
    }

    #[inline]
    pub fn is_river(&self) -> bool {
        self.tags.river
    }

    #[inline]
    pub fn is_shore(&self) -> bool {
        self.tags.shore
    }

    #[inline]
    pub fn is_salty(&self) -> bool {
        self.tags.salty
    }
}

impl fmt::Debug for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionType")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("blend", &self.blend)
            .field("select", &self.select)
            .finish_non_exhaustive()
    }
}

/// Immutable after construction; shared by reference across every generator thread.
#[derive(Default, Debug)]
pub struct RegionTable {
    regions: Vec<RegionType>,
    by_name: HashMap<String, RegionId>,
}

impl RegionTable {
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    #[inline]
    pub fn get(&self, id: RegionId) -> Option<&RegionType> {
        self.regions.get(id as usize)
    }

    /// Panics when `id` was never registered: weight maps only ever carry ids handed out by this table.
    #[inline]
    pub fn region(&self, id: RegionId) -> &RegionType {
        match self.regions.get(id as usize) {
            Some(r) => r,
            None => panic!(
                "region id {} is not registered ({} regions known)",
                id,
                self.regions.len()
            ),
        }
    }

    pub fn id_by_name(&self, name: &str) -> Option<RegionId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionType> {
        self.regions.iter()
    }

    #[inline]
    pub fn blend_group(&self, id: RegionId) -> Option<usize> {
        self.region(id).blend.index()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        tags: RegionTags,
        blend: BlendGroup,
        select: Option<SelectRange>,
        height: Box<dyn HeightSampler>,
        density: Box<dyn DensitySampler>,
    ) -> Result<RegionId, RegionTableError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(RegionTableError::DuplicateName(name));
        }
        if self.regions.len() >= RegionId::MAX as usize {
            return Err(RegionTableError::TooManyRegions(self.regions.len() + 1));
        }
        let id = self.regions.len() as RegionId;
        self.by_name.insert(name.clone(), id);
        self.regions.push(RegionType {
            id,
            name,
            tags,
            blend,
            select,
            height,
            density,
        });
        Ok(id)
    }

    pub fn load_from_path(path: impl AsRef<Path>, seed: i64) -> Result<Self, RegionTableError> {
        let s = fs::read_to_string(path.as_ref())?;
        let cfg: RegionsConfig = toml::from_str(&s)?;
        log::info!(
            target: "regions",
            "loaded {} region definitions from {}",
            cfg.regions.len(),
            path.as_ref().display()
        );
        Self::from_configs(&cfg, seed)
    }

    pub fn builtin(seed: i64) -> Result<Self, RegionTableError> {
        let cfg: RegionsConfig = toml::from_str(BUILTIN_REGIONS)?;
        Self::from_configs(&cfg, seed)
    }

    pub fn from_configs(cfg: &RegionsConfig, seed: i64) -> Result<Self, RegionTableError> {
        if cfg.regions.is_empty() {
            return Err(RegionTableError::Empty);
        }
        let base_seed = fold_seed(seed);
        let mut table = RegionTable::new();
        for (i, def) in cfg.regions.iter().enumerate() {
            let region_seed = base_seed ^ (i as i32).wrapping_mul(0x2C1B_3C6D);
            let height = build_height(def, region_seed)?;
            let density = build_density(def, region_seed)?;
            let select = match def.continent {
                Some([min, max]) if !(min < max) => {
                    return Err(RegionTableError::InvalidParameter {
                        region: def.name.clone(),
                        reason: format!("continent range [{}, {}) is empty", min, max),
                    });
                }
                Some([min, max]) => Some(SelectRange { min, max }),
                None => None,
            };
            let tags = RegionTags {
                river: def.river,
                shore: def.shore,
                salty: def.salty,
            };
            table.register(def.name.clone(), tags, def.blend, select, height, density)?;
        }
        for r in table.iter() {
            if r.select.is_none() && !r.is_river() {
                log::warn!(
                    target: "regions",
                    "region '{}' has no continent range and is not a river; the classifier never selects it",
                    r.name
                );
            }
        }
        Ok(table)
    }
}

fn build_height(def: &RegionDef, seed: i32) -> Result<Box<dyn HeightSampler>, RegionTableError> {
    match &def.height {
        None => Err(RegionTableError::MissingSampler {
            region: def.name.clone(),
            sampler: "height",
        }),
        Some(HeightDef::Constant { value }) => Ok(Box::new(ConstantHeight(*value))),
        Some(HeightDef::Noise {
            base,
            amplitude,
            frequency,
            octaves,
            persistence,
            lacunarity,
            salt,
        }) => {
            if *octaves == 0 {
                return Err(invalid(def, "height octaves must be at least 1"));
            }
            if !(*frequency > 0.0) {
                return Err(invalid(def, "height frequency must be positive"));
            }
            Ok(Box::new(NoiseHeight::new(
                seed ^ *salt,
                *frequency,
                *base,
                *amplitude,
                *octaves,
                *persistence,
                *lacunarity,
            )))
        }
    }
}

fn build_density(def: &RegionDef, seed: i32) -> Result<Box<dyn DensitySampler>, RegionTableError> {
    match &def.density {
        None => Err(RegionTableError::MissingSampler {
            region: def.name.clone(),
            sampler: "density",
        }),
        Some(DensityDef::Solid) => Ok(Box::new(SolidDensity)),
        Some(DensityDef::Carved {
            frequency,
            amplitude,
            y_scale,
            salt,
        }) => {
            if !(*frequency > 0.0) {
                return Err(invalid(def, "density frequency must be positive"));
            }
            Ok(Box::new(CarvedDensity::new(
                seed ^ *salt ^ 0x0D3E_5171,
                *frequency,
                *amplitude,
                *y_scale,
            )))
        }
    }
}

fn invalid(def: &RegionDef, reason: &str) -> RegionTableError {
    RegionTableError::InvalidParameter {
        region: def.name.clone(),
        reason: reason.to_string(),
    }
}
