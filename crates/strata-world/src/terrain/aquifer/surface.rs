/// Approximate terrain surface height near a column, used to judge how deep a lattice point sits.
pub trait SurfaceEstimate: Send + Sync {
    fn surface_level(&self, x: i32, z: i32) -> i32;
}

impl<F> SurfaceEstimate for F
where
    F: Fn(i32, i32) -> i32 + Send + Sync,
{
    #[inline]
    fn surface_level(&self, x: i32, z: i32) -> i32 {
        self(x, z)
    }
}
