//! Underground fluid resolution for one tile.
//!
//! Space is divided into 16x12x16 cells, each holding one jittered lattice point with its own
//! fluid status (level and type). A non-solid point takes the status of its nearest lattice point,
//! unless the pressure between the nearest pockets pushes it back to solid, which is what carves
//! stone walls between neighbouring pockets at different levels.

mod fluid;
mod lattice;
mod noise;
mod surface;

pub use fluid::{FluidStatus, FluidType, GlobalFluidTable, WAY_BELOW_MIN_Y};
pub use lattice::{
    LatticeBounds, X_SPACING, Y_SPACING, Z_SPACING, grid_x, grid_y, grid_z, lattice_point,
    similarity,
};
pub use noise::AquiferNoise;
pub use surface::SurfaceEstimate;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::worldgen::TerrainGenParams;

/// Density at or below which a point is treated as open sky and skips the lattice.
pub const SKY_DENSITY: f64 = -64.0;

/// Surface probe pattern around a lattice point, in units of 16 blocks.
const SURFACE_SAMPLING_OFFSETS: [(i32, i32); 13] = [
    (-2, -1),
    (-1, -1),
    (0, -1),
    (1, -1),
    (-3, 0),
    (-2, 0),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-2, 1),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const SURFACE_SLACK: i32 = 8;
const VERTICAL_RANGE: i32 = 12;

#[inline]
fn flowing_update_similarity() -> f64 {
    similarity(100, 144)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

#[inline]
fn map(v: f64, from_a: f64, from_b: f64, to_a: f64, to_b: f64) -> f64 {
    lerp((v - from_a) / (from_b - from_a), to_a, to_b)
}

#[inline]
fn clamped_map(v: f64, from_a: f64, from_b: f64, to_a: f64, to_b: f64) -> f64 {
    lerp(((v - from_a) / (from_b - from_a)).clamp(0.0, 1.0), to_a, to_b)
}

#[inline]
fn quantize(v: f64, step: i32) -> i32 {
    (v / step as f64).floor() as i32 * step
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AquiferSettings {
    pub enabled: bool,
    pub min_y: i32,
    pub height: i32,
    pub sea_level: i32,
    pub lava_level: i32,
    pub lava_pocket_max_y: i32,
    pub lava_threshold: f64,
}

impl AquiferSettings {
    pub fn from_params(params: &TerrainGenParams) -> Self {
        Self {
            enabled: params.aquifer_enable,
            min_y: params.min_y,
            height: params.height,
            sea_level: params.sea_level,
            lava_level: params.lava_level,
            lava_pocket_max_y: params.lava_pocket_max_y,
            lava_threshold: params.lava_threshold,
        }
    }
}

/// Result of one substance query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubstanceSample {
    /// `None` means solid: the base terrain material stays.
    pub substance: Option<FluidType>,
    /// The point sits near a pocket boundary and its fluid should be ticked once placed.
    pub schedule_fluid_update: bool,
}

impl SubstanceSample {
    const SOLID: SubstanceSample = SubstanceSample {
        substance: None,
        schedule_fluid_update: false,
    };

    #[inline]
    fn settled(fluid: FluidType) -> Self {
        Self {
            substance: Some(fluid),
            schedule_fluid_update: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AquiferStats {
    /// Nearest-neighbour searches through the lattice.
    pub lattice_queries: u64,
    /// Fluid statuses computed (cache misses).
    pub status_computations: u64,
}

/// Per-tile aquifer. Caches are filled lazily and shared across threads through `&self`.
pub struct AquiferSimulator {
    settings: AquiferSettings,
    global: GlobalFluidTable,
    noise: Arc<AquiferNoise>,
    surface: Arc<dyn SurfaceEstimate>,
    bounds: LatticeBounds,
    locations: Box<[OnceLock<[i32; 3]>]>,
    statuses: Box<[OnceLock<FluidStatus>]>,
    lattice_queries: AtomicU64,
    status_computations: AtomicU64,
}

impl AquiferSimulator {
    /// Simulator for the 16x16 tile whose minimum block corner is `(origin_x, origin_z)`.
    pub fn new(
        origin_x: i32,
        origin_z: i32,
        settings: AquiferSettings,
        noise: Arc<AquiferNoise>,
        surface: Arc<dyn SurfaceEstimate>,
    ) -> Self {
        let bounds =
            LatticeBounds::for_volume(origin_x, origin_z, 16, settings.min_y, settings.height);
        let slots = bounds.len();
        log::trace!(
            target: "aquifer",
            "aquifer for tile at ({}, {}) covering {} lattice cells",
            origin_x,
            origin_z,
            slots
        );
        Self {
            settings,
            global: GlobalFluidTable::new(settings.lava_level, settings.sea_level),
            noise,
            surface,
            bounds,
            locations: (0..slots).map(|_| OnceLock::new()).collect(),
            statuses: (0..slots).map(|_| OnceLock::new()).collect(),
            lattice_queries: AtomicU64::new(0),
            status_computations: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn global(&self) -> &GlobalFluidTable {
        &self.global
    }

    #[inline]
    pub fn bounds(&self) -> LatticeBounds {
        self.bounds
    }

    pub fn stats(&self) -> AquiferStats {
        AquiferStats {
            lattice_queries: self.lattice_queries.load(Ordering::Relaxed),
            status_computations: self.status_computations.load(Ordering::Relaxed),
        }
    }

    /// Fluid (or air) at a non-solid point, `None` where the point stays solid.
    pub fn compute_substance(
        &self,
        x: i32,
        y: i32,
        z: i32,
        base_density: f64,
        blended_density: f64,
    ) -> Option<FluidType> {
        self.sample(x, y, z, base_density, blended_density).substance
    }

    pub fn sample(
        &self,
        x: i32,
        y: i32,
        z: i32,
        base_density: f64,
        blended_density: f64,
    ) -> SubstanceSample {
        if base_density <= SKY_DENSITY {
            return SubstanceSample::settled(self.global.at(y));
        }
        if blended_density > 0.0 {
            return SubstanceSample::SOLID;
        }
        if !self.settings.enabled {
            return SubstanceSample::settled(self.global.at(y));
        }

        let global = self.global.status(y);
        if global.at(y) == FluidType::Lava {
            return SubstanceSample::settled(FluidType::Lava);
        }

        self.lattice_queries.fetch_add(1, Ordering::Relaxed);
        let center_x = grid_x(x);
        let center_y = grid_y(y);
        let center_z = grid_z(z);

        let mut dist = [i32::MAX; 3];
        let mut nearest = [[0i32; 3]; 3];
        for gy in center_y - 1..=center_y + 1 {
            for gz in center_z - 1..=center_z + 1 {
                for gx in center_x - 1..=center_x + 1 {
                    let p = self.lattice_point(gx, gy, gz);
                    let dx = p[0] - x;
                    let dy = p[1] - y;
                    let dz = p[2] - z;
                    let d = dx * dx + dy * dy + dz * dz;
                    if d <= dist[0] {
                        nearest[2] = nearest[1];
                        nearest[1] = nearest[0];
                        nearest[0] = p;
                        dist[2] = dist[1];
                        dist[1] = dist[0];
                        dist[0] = d;
                    } else if d <= dist[1] {
                        nearest[2] = nearest[1];
                        nearest[1] = p;
                        dist[2] = dist[1];
                        dist[1] = d;
                    } else if d <= dist[2] {
                        nearest[2] = p;
                        dist[2] = d;
                    }
                }
            }
        }

        let status1 = self.status_at_point(nearest[0]);
        let status2 = self.status_at_point(nearest[1]);
        let status3 = self.status_at_point(nearest[2]);

        let sim12 = similarity(dist[0], dist[1]);
        let sim13 = similarity(dist[0], dist[2]);
        let sim23 = similarity(dist[1], dist[2]);

        let state = status1.at(y);
        let contribution = if state == FluidType::Water && self.global.at(y - 1) == FluidType::Lava
        {
            1.0
        } else if sim12 > -1.0 {
            let barrier = OnceLock::new();
            let barrier_at = || {
                *barrier.get_or_init(|| self.noise.barrier(x as f64, y as f64 * 0.5, z as f64))
            };
            let p12 = pressure(y, status1, status2, barrier_at);
            let p13 = pressure(y, status1, status3, barrier_at);
            let p23 = pressure(y, status2, status3, barrier_at);
            let cs12 = sim12.max(0.0);
            let cs13 = sim13.max(0.0);
            let cs23 = sim23.max(0.0);
            (2.0 * cs12 * p12.max((p13 * cs13).max(p23 * cs23))).max(0.0)
        } else {
            0.0
        };

        if blended_density + contribution <= 0.0 {
            SubstanceSample {
                substance: Some(state),
                schedule_fluid_update: sim12 >= flowing_update_similarity(),
            }
        } else {
            SubstanceSample::SOLID
        }
    }

    /// Jittered point of a lattice cell, cached when the cell lies inside this tile's bounds.
    pub fn lattice_point(&self, gx: i32, gy: i32, gz: i32) -> [i32; 3] {
        let seed = self.noise.lattice_seed();
        match self.bounds.index(gx, gy, gz) {
            Some(i) => *self.locations[i].get_or_init(|| lattice_point(seed, gx, gy, gz)),
            None => lattice_point(seed, gx, gy, gz),
        }
    }

    /// Fluid status of a lattice cell.
    pub fn cell_status(&self, gx: i32, gy: i32, gz: i32) -> FluidStatus {
        self.status_at_point(self.lattice_point(gx, gy, gz))
    }

    pub fn cached_locations(&self) -> Vec<Option<[i32; 3]>> {
        self.locations.iter().map(|c| c.get().copied()).collect()
    }

    pub fn cached_statuses(&self) -> Vec<Option<FluidStatus>> {
        self.statuses.iter().map(|c| c.get().copied()).collect()
    }

    fn status_at_point(&self, p: [i32; 3]) -> FluidStatus {
        let [x, y, z] = p;
        match self.bounds.index(grid_x(x), grid_y(y), grid_z(z)) {
            Some(i) => *self.statuses[i].get_or_init(|| self.compute_fluid(x, y, z)),
            None => self.compute_fluid(x, y, z),
        }
    }

    fn compute_fluid(&self, x: i32, y: i32, z: i32) -> FluidStatus {
        self.status_computations.fetch_add(1, Ordering::Relaxed);
        let global = self.global.status(y);
        let max_y = y + VERTICAL_RANGE;
        let min_y = y - VERTICAL_RANGE;

        let mut min_surface = i32::MAX;
        let mut under_sea = false;
        for &(ox, oz) in SURFACE_SAMPLING_OFFSETS.iter() {
            let sx = x + (ox << 4);
            let sz = z + (oz << 4);
            let surface = self.surface.surface_level(sx, sz);
            let slack = surface + SURFACE_SLACK;
            let at_center = ox == 0 && oz == 0;
            if at_center && min_y > slack {
                return global;
            }
            let reaches_surface = max_y > slack;
            if reaches_surface || at_center {
                let offset_status = self.global.status(slack);
                if offset_status.at(slack).is_fluid() {
                    if at_center {
                        under_sea = true;
                    }
                    if reaches_surface {
                        return offset_status;
                    }
                }
            }
            min_surface = min_surface.min(surface);
        }

        let delta = (min_surface + SURFACE_SLACK - y) as f64;
        let depth = if under_sea {
            clamped_map(delta, 0.0, 64.0, 1.0, 0.0)
        } else {
            0.0
        };
        let flood = self
            .noise
            .floodedness(x as f64, y as f64 * 0.67, z as f64)
            .clamp(-1.0, 1.0);
        let full_threshold = map(depth, 1.0, 0.0, -0.3, 0.8);
        if flood > full_threshold {
            return global;
        }
        let empty_threshold = map(depth, 1.0, 0.0, -0.8, 0.4);
        if flood <= empty_threshold {
            return FluidStatus::new(WAY_BELOW_MIN_Y, global.fluid_type);
        }

        let cell_x = x.div_euclid(16);
        let cell_y = y.div_euclid(40);
        let cell_z = z.div_euclid(16);
        let center_y = cell_y * 40 + 20;
        let spread = self
            .noise
            .spread(cell_x as f64, cell_y as f64 / 1.4, cell_z as f64)
            * 10.0;
        let level = center_y + quantize(spread, 3);
        FluidStatus::new(
            min_surface.min(level),
            self.pocket_fluid(x, y, z, global, level),
        )
    }

    fn pocket_fluid(&self, x: i32, y: i32, z: i32, global: FluidStatus, level: i32) -> FluidType {
        if level <= self.settings.lava_pocket_max_y {
            let v = self.noise.lava(
                x.div_euclid(64) as f64,
                y.div_euclid(40) as f64,
                z.div_euclid(64) as f64,
            );
            if v.abs() > self.settings.lava_threshold {
                return FluidType::Lava;
            }
        }
        global.fluid_type
    }
}

/// Pressure between two pockets as seen from height `y`.
///
/// Water against lava is always 1 and equal levels are always 0. Otherwise pressure peaks at the
/// average of the two levels and falls off away from it. `barrier` is only evaluated when the
/// pressure lands inside `[-2, 2]`.
pub fn pressure(
    y: i32,
    left: FluidStatus,
    right: FluidStatus,
    barrier: impl FnOnce() -> f64,
) -> f64 {
    let l = left.at(y);
    let r = right.at(y);
    if (l == FluidType::Lava && r == FluidType::Water) || (l == FluidType::Water && r == FluidType::Lava)
    {
        return 1.0;
    }
    let delta = (left.fluid_level - right.fluid_level).abs();
    if delta == 0 {
        return 0.0;
    }
    let average = 0.5 * (left.fluid_level as f64 + right.fluid_level as f64);
    let above = y as f64 - average;
    let near = 0.5 * delta as f64 - above.abs();
    let p = if above > 0.0 {
        near / if near > 0.0 { 1.5 } else { 2.5 }
    } else {
        (near + 3.0) / if near > -3.0 { 3.0 } else { 10.0 }
    };
    if !(-2.0..=2.0).contains(&p) {
        return p;
    }
    p + barrier()
}
