/// Fluid level used for pockets that are empty all the way down.
pub const WAY_BELOW_MIN_Y: i32 = -32512;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FluidType {
    Air,
    Water,
    Lava,
}

impl FluidType {
    #[inline]
    pub fn is_fluid(self) -> bool {
        !matches!(self, FluidType::Air)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FluidStatus {
    pub fluid_level: i32,
    pub fluid_type: FluidType,
}

impl FluidStatus {
    #[inline]
    pub const fn new(fluid_level: i32, fluid_type: FluidType) -> Self {
        Self {
            fluid_level,
            fluid_type,
        }
    }

    /// Fluid present at `y`: the status's type below its level, air at or above it.
    #[inline]
    pub fn at(&self, y: i32) -> FluidType {
        if y < self.fluid_level {
            self.fluid_type
        } else {
            FluidType::Air
        }
    }
}

/// Two-level table: lava up to the lava level, sea water above it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlobalFluidTable {
    lava: FluidStatus,
    sea: FluidStatus,
}

impl GlobalFluidTable {
    pub const fn new(lava_level: i32, sea_level: i32) -> Self {
        Self {
            lava: FluidStatus::new(lava_level, FluidType::Lava),
            sea: FluidStatus::new(sea_level, FluidType::Water),
        }
    }

    #[inline]
    pub fn status(&self, y: i32) -> FluidStatus {
        if y < self.lava.fluid_level {
            self.lava
        } else {
            self.sea
        }
    }

    #[inline]
    pub fn at(&self, y: i32) -> FluidType {
        self.status(y).at(y)
    }

    #[inline]
    pub fn sea_level(&self) -> i32 {
        self.sea.fluid_level
    }

    #[inline]
    pub fn lava_level(&self) -> i32 {
        self.lava.fluid_level
    }
}
