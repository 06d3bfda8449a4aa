pub const X_SPACING: i32 = 16;
pub const Y_SPACING: i32 = 12;
pub const Z_SPACING: i32 = 16;

const X_RANGE: u32 = 10;
const Y_RANGE: u32 = 9;
const Z_RANGE: u32 = 10;

#[inline]
pub fn grid_x(x: i32) -> i32 {
    x.div_euclid(X_SPACING)
}

#[inline]
pub fn grid_y(y: i32) -> i32 {
    y.div_euclid(Y_SPACING)
}

#[inline]
pub fn grid_z(z: i32) -> i32 {
    z.div_euclid(Z_SPACING)
}

/// Similarity of two squared distances: 1 when equal, falling by 1 per 25 of difference.
#[inline]
pub fn similarity(first: i32, second: i32) -> f64 {
    1.0 - (second - first).abs() as f64 / 25.0
}

fn uhash32(mut a: u32) -> u32 {
    a ^= a >> 16;
    a = a.wrapping_mul(0x7feb_352d);
    a ^= a >> 15;
    a = a.wrapping_mul(0x846c_a68b);
    a ^= a >> 16;
    a
}

#[inline]
fn hash3(x: i32, y: i32, z: i32, seed: u32) -> u32 {
    let mut h = seed ^ 0x9e37_79b9;
    h ^= uhash32((x as u32).wrapping_add(0x85eb_ca6b));
    h ^= uhash32((y as u32).wrapping_add(0xc2b2_ae35));
    h ^= uhash32((z as u32).wrapping_add(0x27d4_eb2f));
    uhash32(h)
}

/// Jittered lattice point of grid cell `(gx, gy, gz)`, in block coordinates.
pub fn lattice_point(seed: u32, gx: i32, gy: i32, gz: i32) -> [i32; 3] {
    let jx = hash3(gx, gy, gz, seed ^ 0x068b_c021) % X_RANGE;
    let jy = hash3(gx, gy, gz, seed ^ 0x02e1_b213) % Y_RANGE;
    let jz = hash3(gx, gy, gz, seed ^ 0x0f1a_1234) % Z_RANGE;
    [
        gx * X_SPACING + jx as i32,
        gy * Y_SPACING + jy as i32,
        gz * Z_SPACING + jz as i32,
    ]
}

/// Grid cells covered by one simulator's caches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatticeBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub min_z: i32,
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
}

impl LatticeBounds {
    /// Cells within one step of any cell touched by a block in the volume.
    pub fn for_volume(min_x: i32, min_z: i32, size_xz: i32, min_y: i32, height: i32) -> Self {
        let lo_x = grid_x(min_x) - 1;
        let hi_x = grid_x(min_x + size_xz - 1) + 1;
        let lo_z = grid_z(min_z) - 1;
        let hi_z = grid_z(min_z + size_xz - 1) + 1;
        let lo_y = grid_y(min_y) - 1;
        let hi_y = grid_y(min_y + height - 1) + 1;
        Self {
            min_x: lo_x,
            min_y: lo_y,
            min_z: lo_z,
            size_x: (hi_x - lo_x + 1) as usize,
            size_y: (hi_y - lo_y + 1) as usize,
            size_z: (hi_z - lo_z + 1) as usize,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size_x * self.size_y * self.size_z
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cache slot of a grid cell, `None` outside the covered cells.
    #[inline]
    pub fn index(&self, gx: i32, gy: i32, gz: i32) -> Option<usize> {
        let dx = gx - self.min_x;
        let dy = gy - self.min_y;
        let dz = gz - self.min_z;
        if dx < 0 || dy < 0 || dz < 0 {
            return None;
        }
        let (dx, dy, dz) = (dx as usize, dy as usize, dz as usize);
        if dx >= self.size_x || dy >= self.size_y || dz >= self.size_z {
            return None;
        }
        Some((dy * self.size_z + dz) * self.size_x + dx)
    }
}
