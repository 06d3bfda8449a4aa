//! Multi-resolution region blending.
//!
//! A tile's weights come from two convolutions of the classifier with the same
//! 9x9 kernel: a coarse pass with one sample per 16 blocks (4x4 maps around the
//! tile) and a medium pass with one sample per 4 blocks (7x7 maps, the tile plus
//! one quart ring). The coarse maps are blended bilinearly onto each quart point
//! and then re-weight the medium map group by group, so wide groups (oceans,
//! land) blend over long distances while local regions keep sharp borders.

use strata_regions::RegionId;

use super::kernel::{Kernel, kernel_9x9};
use super::weights::WeightMap;
use crate::classifier::RegionClassifier;

/// Blocks per coarse sample, as a shift.
pub const COARSE_BITS: i32 = 4;
/// Blocks per quart sample, as a shift.
pub const QUART_BITS: i32 = 2;
/// Quart samples per grid edge (the tile's four plus a ring on each side, plus the far edge).
pub const GRID_WIDTH: usize = 7;
const COARSE_WIDTH: usize = 4;

/// Convolves the classifier with `kernel` around the sample point
/// `origin + (offset << bits)` and accumulates into `out`.
pub fn sample_kernel_weights(
    out: &mut WeightMap,
    classifier: &dyn RegionClassifier,
    kernel: &Kernel,
    bits: i32,
    origin_x: i32,
    origin_z: i32,
    offset_x: i32,
    offset_z: i32,
) {
    let r = kernel.radius();
    for dx in -r..=r {
        for dz in -r..=r {
            let w = kernel.weight(dx, dz);
            let bx = origin_x + ((offset_x + dx) << bits);
            let bz = origin_z + ((offset_z + dz) << bits);
            out.add(classifier.classify(bx, bz), w);
        }
    }
}

/// Re-weights grouped entries of `local` from the coarse group proportions.
///
/// Each group's local weight is redistributed across the coarse entries of the
/// same group, proportionally to their coarse share. Ungrouped entries are untouched,
/// and so is any group the coarse map does not contain (features narrower than a
/// coarse cell stay at local resolution).
pub fn compose_group_weights<G>(local: &mut WeightMap, coarse: &WeightMap, grouping: &G, groups: usize)
where
    G: Fn(RegionId) -> Option<usize> + ?Sized,
{
    let mut max_weights = vec![0.0_f64; groups];
    for (id, w) in coarse.iter() {
        if let Some(g) = grouping(id) {
            max_weights[g] += w;
        }
    }

    let mut actual_weights = vec![0.0_f64; groups];
    local.retain(|id, w| match grouping(id) {
        Some(g) if max_weights[g] > 0.0 => {
            actual_weights[g] += w;
            false
        }
        _ => true,
    });

    for (id, w) in coarse.iter() {
        if let Some(g) = grouping(id) {
            if actual_weights[g] > 0.0 && max_weights[g] > 0.0 {
                local.set(id, w * actual_weights[g] / max_weights[g]);
            }
        }
    }
}

/// 7x7 quart-resolution weight maps for one 16x16 tile.
#[derive(Clone, Debug)]
pub struct BlendGrid {
    origin_x: i32,
    origin_z: i32,
    cells: Vec<WeightMap>,
}

impl BlendGrid {
    /// `origin` is the tile's minimum block corner and must be 16-aligned.
    pub fn sample<G>(
        classifier: &dyn RegionClassifier,
        origin_x: i32,
        origin_z: i32,
        grouping: &G,
        groups: usize,
    ) -> Self
    where
        G: Fn(RegionId) -> Option<usize> + ?Sized,
    {
        debug_assert!(origin_x & 15 == 0 && origin_z & 15 == 0);
        let kernel = kernel_9x9();

        // (0, 0) is the coarse cell at (-1, -1) relative to the tile.
        let mut coarse: Vec<WeightMap> = Vec::with_capacity(COARSE_WIDTH * COARSE_WIDTH);
        for z in 0..COARSE_WIDTH as i32 {
            for x in 0..COARSE_WIDTH as i32 {
                let mut m = WeightMap::with_capacity(8);
                sample_kernel_weights(
                    &mut m,
                    classifier,
                    kernel,
                    COARSE_BITS,
                    origin_x,
                    origin_z,
                    x - 1,
                    z - 1,
                );
                coarse.push(m);
            }
        }
        let coarse_at = |ix: i32, iz: i32| &coarse[ix as usize + (iz as usize) * COARSE_WIDTH];

        let mut cells = Vec::with_capacity(GRID_WIDTH * GRID_WIDTH);
        let mut wide = WeightMap::with_capacity(8);
        for z in 0..GRID_WIDTH as i32 {
            for x in 0..GRID_WIDTH as i32 {
                let mut local = WeightMap::with_capacity(8);
                sample_kernel_weights(
                    &mut local,
                    classifier,
                    kernel,
                    QUART_BITS,
                    origin_x,
                    origin_z,
                    x - 1,
                    z - 1,
                );

                let bx = origin_x + ((x - 1) << QUART_BITS);
                let bz = origin_z + ((z - 1) << QUART_BITS);
                let lerp_x = (bx - ((bx >> COARSE_BITS) << COARSE_BITS)) as f64 / 16.0;
                let lerp_z = (bz - ((bz >> COARSE_BITS) << COARSE_BITS)) as f64 / 16.0;
                let ix = ((bx - origin_x) >> COARSE_BITS) + 1;
                let iz = ((bz - origin_z) >> COARSE_BITS) + 1;

                wide.clear();
                wide.add_scaled(coarse_at(ix, iz), (1.0 - lerp_x) * (1.0 - lerp_z));
                wide.add_scaled(coarse_at(ix + 1, iz), lerp_x * (1.0 - lerp_z));
                wide.add_scaled(coarse_at(ix, iz + 1), (1.0 - lerp_x) * lerp_z);
                wide.add_scaled(coarse_at(ix + 1, iz + 1), lerp_x * lerp_z);

                compose_group_weights(&mut local, &wide, grouping, groups);
                cells.push(local);
            }
        }

        Self {
            origin_x,
            origin_z,
            cells,
        }
    }

    #[inline]
    pub fn origin(&self) -> (i32, i32) {
        (self.origin_x, self.origin_z)
    }

    /// Quart map at grid index `(qx, qz)`, where `(1, 1)` is the tile origin.
    #[inline]
    pub fn cell(&self, qx: usize, qz: usize) -> &WeightMap {
        &self.cells[qx + qz * GRID_WIDTH]
    }

    /// Bilinear blend of the four quart maps around a column, `local_x/z` in `0..16`.
    pub fn column_weights(&self, local_x: usize, local_z: usize, out: &mut WeightMap) {
        let ix = (local_x >> QUART_BITS) + 1;
        let iz = (local_z >> QUART_BITS) + 1;
        let lerp_x = (local_x & 3) as f64 / 4.0;
        let lerp_z = (local_z & 3) as f64 / 4.0;
        out.clear();
        out.add_scaled(self.cell(ix, iz), (1.0 - lerp_x) * (1.0 - lerp_z));
        out.add_scaled(self.cell(ix + 1, iz), lerp_x * (1.0 - lerp_z));
        out.add_scaled(self.cell(ix, iz + 1), (1.0 - lerp_x) * lerp_z);
        out.add_scaled(self.cell(ix + 1, iz + 1), lerp_x * lerp_z);
    }
}

/// Weights at an arbitrary quart point, matching the value a tile grid stores there.
pub fn probe_quart_weights<G>(
    classifier: &dyn RegionClassifier,
    quart_x: i32,
    quart_z: i32,
    grouping: &G,
    groups: usize,
) -> WeightMap
where
    G: Fn(RegionId) -> Option<usize> + ?Sized,
{
    let kernel = kernel_9x9();
    let bx = quart_x << QUART_BITS;
    let bz = quart_z << QUART_BITS;

    let mut local = WeightMap::with_capacity(8);
    sample_kernel_weights(&mut local, classifier, kernel, QUART_BITS, bx, bz, 0, 0);

    let cx = (bx >> COARSE_BITS) << COARSE_BITS;
    let cz = (bz >> COARSE_BITS) << COARSE_BITS;
    let lerp_x = (bx - cx) as f64 / 16.0;
    let lerp_z = (bz - cz) as f64 / 16.0;
    let mut wide = WeightMap::with_capacity(8);
    let corners = [
        (0, 0, (1.0 - lerp_x) * (1.0 - lerp_z)),
        (1, 0, lerp_x * (1.0 - lerp_z)),
        (0, 1, (1.0 - lerp_x) * lerp_z),
        (1, 1, lerp_x * lerp_z),
    ];
    let mut corner = WeightMap::with_capacity(8);
    for (ox, oz, t) in corners {
        if t > 0.0 {
            corner.clear();
            sample_kernel_weights(&mut corner, classifier, kernel, COARSE_BITS, cx, cz, ox, oz);
            wide.add_scaled(&corner, t);
        }
    }

    compose_group_weights(&mut local, &wide, grouping, groups);
    local
}
