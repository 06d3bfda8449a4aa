pub mod aquifer;
pub mod blend;
pub mod column;
pub mod density;
pub mod flow;
mod gen_ctx;
mod generator;
pub mod kernel;
pub mod tile_cache;
mod tile_coord;
pub mod weights;

pub use aquifer::{
    AquiferNoise, AquiferSettings, AquiferSimulator, AquiferStats, FluidStatus, FluidType,
    GlobalFluidTable, SubstanceSample, SurfaceEstimate,
};
pub use blend::{BlendGrid, probe_quart_weights};
pub use column::{ColumnHeightResolver, ColumnResult};
pub use density::DensityFieldEvaluator;
pub use flow::{FlowMap, FlowVector, NoiseFlowSource, RiverFlowSource};
pub use gen_ctx::{
    TERRAIN_STAGE_COUNT, TERRAIN_STAGE_LABELS, TerrainCtx, TerrainMetrics, TerrainProfiler,
    TerrainStage, TerrainStageSample, TileTiming,
};
pub use generator::{BlendedSurface, TerrainGenerator};
pub use kernel::Kernel;
pub use tile_cache::{LossyCacheStats, LossyPositionCache};
pub use tile_coord::{TILE_SIZE, TileCoord};
pub use weights::WeightMap;
