//! Tile buffers and the fill driver that turns terrain fields into per-voxel materials.
#![forbid(unsafe_code)]

mod fill;
mod mask;

use strata_regions::RegionId;
use strata_world::{ColumnResult, FlowVector, FluidType, TerrainMetrics, TileCoord};

pub use fill::{generate_tile, generate_tile_buffer};
pub use mask::CarvingMask;

/// Final classification of one voxel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    Air,
    Solid(RegionId),
    /// Water or lava; river water carries its flow.
    Fluid(FluidType, Option<FlowVector>),
}

impl Material {
    #[inline]
    pub fn is_air(self) -> bool {
        matches!(self, Material::Air)
    }

    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(self, Material::Solid(_))
    }

    #[inline]
    pub fn fluid(self) -> Option<FluidType> {
        match self {
            Material::Fluid(f, _) => Some(f),
            _ => None,
        }
    }

    /// Lava is the only light-emitting material the fill produces.
    #[inline]
    pub fn emits_light(self) -> bool {
        matches!(self, Material::Fluid(FluidType::Lava, _))
    }
}

#[derive(Clone, Debug)]
pub struct ChunkBuf {
    pub coord: TileCoord,
    pub sx: usize,
    pub sy: usize,
    pub sz: usize,
    pub min_y: i32,
    pub cells: Vec<Material>,
}

impl ChunkBuf {
    pub fn new_air(coord: TileCoord, sx: usize, sy: usize, sz: usize, min_y: i32) -> Self {
        Self {
            coord,
            sx,
            sy,
            sz,
            min_y,
            cells: vec![Material::Air; sx * sy * sz],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.sz + z) * self.sx + x
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> Material {
        self.cells[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set_local(&mut self, x: usize, y: usize, z: usize, m: Material) {
        let i = self.idx(x, y, z);
        self.cells[i] = m;
    }

    #[inline]
    pub fn contains_world(&self, wx: i32, wy: i32, wz: i32) -> bool {
        let base_x = self.coord.tx * self.sx as i32;
        let base_z = self.coord.tz * self.sz as i32;
        if wy < self.min_y || wy >= self.min_y + self.sy as i32 {
            return false;
        }
        wx >= base_x && wx < base_x + self.sx as i32 && wz >= base_z && wz < base_z + self.sz as i32
    }

    #[inline]
    pub fn get_world(&self, wx: i32, wy: i32, wz: i32) -> Option<Material> {
        if !self.contains_world(wx, wy, wz) {
            return None;
        }
        let lx = (wx - self.coord.tx * self.sx as i32) as usize;
        let ly = (wy - self.min_y) as usize;
        let lz = (wz - self.coord.tz * self.sz as i32) as usize;
        Some(self.get_local(lx, ly, lz))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkOccupancy {
    Empty,
    Populated,
}

impl ChunkOccupancy {
    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, ChunkOccupancy::Empty)
    }

    #[inline]
    pub fn has_blocks(self) -> bool {
        matches!(self, ChunkOccupancy::Populated)
    }
}

/// Everything one tile fill produces.
#[derive(Clone, Debug)]
pub struct TileGenerateResult {
    pub buf: ChunkBuf,
    pub occupancy: ChunkOccupancy,
    /// Indexed `x + 16 * z`.
    pub columns: Vec<ColumnResult>,
    /// Highest non-air voxel per column, `min_y - 1` for an empty column.
    pub world_surface: Vec<i32>,
    /// Highest solid voxel per column, `min_y - 1` when the column has none.
    pub ocean_floor: Vec<i32>,
    pub carving_mask: CarvingMask,
    /// Fluid voxels near a pocket boundary that need a scheduled update.
    pub fluid_updates: Vec<[i32; 3]>,
    pub light_sources: Vec<[i32; 3]>,
    pub terrain_metrics: TerrainMetrics,
}

impl TileGenerateResult {
    #[inline]
    pub fn column(&self, local_x: usize, local_z: usize) -> &ColumnResult {
        &self.columns[local_x + self.buf.sx * local_z]
    }
}
