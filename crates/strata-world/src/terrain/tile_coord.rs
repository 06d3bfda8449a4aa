pub const TILE_SIZE: usize = 16;

/// Horizontal tile index; a tile spans `TILE_SIZE` blocks on x and z and the full world height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub tx: i32,
    pub tz: i32,
}

impl TileCoord {
    #[inline]
    pub const fn new(tx: i32, tz: i32) -> Self {
        Self { tx, tz }
    }

    #[inline]
    pub const fn origin_x(self) -> i32 {
        self.tx << 4
    }

    #[inline]
    pub const fn origin_z(self) -> i32 {
        self.tz << 4
    }
}
