use std::time::Instant;

use strata_world::{
    AquiferSimulator, ColumnHeightResolver, DensityFieldEvaluator, FluidType, TILE_SIZE,
    TerrainCtx, TerrainGenerator, TerrainMetrics, TerrainStage, TileCoord, TileTiming,
};

use crate::{CarvingMask, ChunkBuf, ChunkOccupancy, Material, TileGenerateResult};

/// Fills one tile, column by column and top-down within each column.
///
/// Voxels above `1 + max(height, sea_level)` are never evaluated and stay air.
/// `aquifer` must have been built for `coord`.
pub fn generate_tile(
    generator: &TerrainGenerator,
    ctx: &mut TerrainCtx,
    coord: TileCoord,
    aquifer: &AquiferSimulator,
) -> TileGenerateResult {
    let total_start = Instant::now();
    ctx.prepare();
    let params = generator.params();
    let table = generator.table();
    let (sx, sz) = (TILE_SIZE, TILE_SIZE);
    let sy = params.height as usize;
    let min_y = params.min_y;
    let max_y = params.max_y();
    let sea = params.sea_level;
    let origin_x = coord.origin_x();
    let origin_z = coord.origin_z();

    ctx.profiler.begin_stage(TerrainStage::Blend);
    let stage_start = Instant::now();
    let grid = generator.blend_grid(coord);
    ctx.profiler
        .record_stage_duration(TerrainStage::Blend, stage_start.elapsed());

    ctx.profiler.begin_stage(TerrainStage::Flow);
    let stage_start = Instant::now();
    let flows = generator.flow_map(coord);
    ctx.profiler
        .record_stage_duration(TerrainStage::Flow, stage_start.elapsed());

    let resolver = ColumnHeightResolver::new(table);
    let mut density = DensityFieldEvaluator::new(table, params);
    let mut buf = ChunkBuf::new_air(coord, sx, sy, sz, min_y);
    let mut carving_mask = CarvingMask::new(sx, sy, sz, min_y);
    let mut columns = Vec::with_capacity(sx * sz);
    let mut world_surface = vec![min_y - 1; sx * sz];
    let mut ocean_floor = vec![min_y - 1; sx * sz];
    let mut fluid_updates = Vec::new();
    let mut light_sources = Vec::new();
    let mut has_blocks = false;

    let fill_start = Instant::now();
    for lz in 0..sz {
        for lx in 0..sx {
            let x = origin_x + lx as i32;
            let z = origin_z + lz as i32;
            let col = lx + sx * lz;

            ctx.profiler.begin_stage(TerrainStage::Height);
            let stage_start = Instant::now();
            grid.column_weights(lx, lz, &mut ctx.column_weights);
            let column = resolver.resolve(x, z, &ctx.column_weights);
            ctx.profiler
                .record_stage_duration(TerrainStage::Height, stage_start.elapsed());
            columns.push(column);

            let height = column.surface_y();
            let flow = if table.region(column.region).is_river() {
                flows.flow_at(lx, lz)
            } else {
                None
            };
            // Rivers may sit below sea level, so the band starts at whichever is lower
            let flowing_floor = (sea - 4).min(height);
            density.set_column(x, z, &ctx.column_weights, &column);

            let top = (1 + height.max(sea)).min(max_y);
            let mut top_placed = false;
            let mut top_solid_placed = false;
            for y in (min_y..=top).rev() {
                ctx.profiler.begin_stage(TerrainStage::Density);
                let stage_start = Instant::now();
                let d = density.density_at(y);
                ctx.profiler
                    .record_stage_duration(TerrainStage::Density, stage_start.elapsed());

                ctx.profiler.begin_stage(TerrainStage::Aquifer);
                let stage_start = Instant::now();
                // d is clamped to [-1, 1], so the aquifer's sky-density cutoff never applies here
                let sample = aquifer.sample(x, y, z, d, d);
                ctx.profiler
                    .record_stage_duration(TerrainStage::Aquifer, stage_start.elapsed());

                let material = match sample.substance {
                    None => Material::Solid(column.region),
                    Some(FluidType::Air) => Material::Air,
                    Some(FluidType::Water) if flow.is_some() && y >= flowing_floor => {
                        Material::Fluid(FluidType::Water, flow)
                    }
                    Some(f) => Material::Fluid(f, None),
                };

                let ly = (y - min_y) as usize;
                match material {
                    Material::Air => {
                        if top_solid_placed {
                            carving_mask.set(lx, y, lz);
                        }
                    }
                    Material::Fluid(..) => {
                        buf.set_local(lx, ly, lz, material);
                        has_blocks = true;
                        if sample.schedule_fluid_update {
                            fluid_updates.push([x, y, z]);
                        }
                        if material.emits_light() {
                            light_sources.push([x, y, z]);
                        }
                        if !top_placed {
                            top_placed = true;
                            world_surface[col] = y;
                        }
                        if top_solid_placed {
                            carving_mask.set(lx, y, lz);
                        }
                    }
                    Material::Solid(_) => {
                        buf.set_local(lx, ly, lz, material);
                        has_blocks = true;
                        if !top_placed {
                            top_placed = true;
                            world_surface[col] = y;
                        }
                        if !top_solid_placed {
                            top_solid_placed = true;
                            ocean_floor[col] = y;
                        }
                    }
                }
            }
        }
    }
    let fill_us = fill_start.elapsed().as_micros().min(u32::MAX as u128) as u32;

    let terrain_metrics = TerrainMetrics {
        stages: ctx.profiler.snapshot(),
        aquifer: aquifer.stats(),
        surface_cache: generator.surface().cache_stats(),
        tile_timing: TileTiming {
            total_us: total_start.elapsed().as_micros().min(u32::MAX as u128) as u32,
            fill_us,
        },
    };
    log::debug!(
        target: "fill",
        "tile ({}, {}) filled in {}us: {} fluid updates, {} light sources, {} carved",
        coord.tx,
        coord.tz,
        terrain_metrics.tile_timing.total_us,
        fluid_updates.len(),
        light_sources.len(),
        carving_mask.count()
    );

    TileGenerateResult {
        buf,
        occupancy: if has_blocks {
            ChunkOccupancy::Populated
        } else {
            ChunkOccupancy::Empty
        },
        columns,
        world_surface,
        ocean_floor,
        carving_mask,
        fluid_updates,
        light_sources,
        terrain_metrics,
    }
}

/// Fills a tile with a fresh context and aquifer.
pub fn generate_tile_buffer(generator: &TerrainGenerator, coord: TileCoord) -> TileGenerateResult {
    let mut ctx = generator.make_ctx();
    let aquifer = generator.make_aquifer(coord);
    generate_tile(generator, &mut ctx, coord, &aquifer)
}
