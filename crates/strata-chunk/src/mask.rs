/// Bit per voxel marking open space carved below a column's first solid voxel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarvingMask {
    sx: usize,
    sy: usize,
    sz: usize,
    min_y: i32,
    bits: Vec<u64>,
}

impl CarvingMask {
    pub fn new(sx: usize, sy: usize, sz: usize, min_y: i32) -> Self {
        let n = sx * sy * sz;
        Self {
            sx,
            sy,
            sz,
            min_y,
            bits: vec![0; n.div_ceil(64)],
        }
    }

    #[inline]
    fn bit(&self, x: usize, y: i32, z: usize) -> Option<usize> {
        let ly = y - self.min_y;
        if x >= self.sx || z >= self.sz || ly < 0 || ly as usize >= self.sy {
            return None;
        }
        Some((ly as usize * self.sz + z) * self.sx + x)
    }

    /// Marks local column `(x, z)` at world height `y`; out-of-range positions are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: i32, z: usize) {
        if let Some(i) = self.bit(x, y, z) {
            self.bits[i >> 6] |= 1u64 << (i & 63);
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: i32, z: usize) -> bool {
        match self.bit(x, y, z) {
            Some(i) => self.bits[i >> 6] & (1u64 << (i & 63)) != 0,
            None => false,
        }
    }

    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }
}
