use std::sync::Arc;

use proptest::prelude::*;
use strata_world::terrain::aquifer::{
    LatticeBounds, X_SPACING, Y_SPACING, Z_SPACING, lattice_point, pressure, similarity,
};
use strata_world::{
    AquiferNoise, AquiferSettings, AquiferSimulator, FluidStatus, FluidType, SurfaceEstimate,
    TerrainGenParams,
};

fn simulator(seed: i64, tile_x: i32, tile_z: i32, surface: i32) -> AquiferSimulator {
    let params = TerrainGenParams::default();
    let noise = Arc::new(AquiferNoise::new(seed, &params));
    let surface: Arc<dyn SurfaceEstimate> = Arc::new(move |_x: i32, _z: i32| surface);
    AquiferSimulator::new(
        tile_x << 4,
        tile_z << 4,
        AquiferSettings::from_params(&params),
        noise,
        surface,
    )
}

fn no_barrier() -> f64 {
    panic!("barrier noise sampled")
}

#[test]
fn pressure_at_the_average_level_uses_the_near_average_branch() {
    let upper = FluidStatus::new(60, FluidType::Water);
    let lower = FluidStatus::new(40, FluidType::Water);
    // delta 20, offset from the average 0: (10 + 3) / 3, outside [-2, 2]
    let p = pressure(50, upper, lower, no_barrier);
    assert!((p - 13.0 / 3.0).abs() < 1e-12, "pressure {p}");
    assert_eq!(pressure(50, lower, upper, no_barrier), p);
}

#[test]
fn pressure_above_the_average_falls_off_faster() {
    let upper = FluidStatus::new(60, FluidType::Water);
    let lower = FluidStatus::new(40, FluidType::Water);
    // offset 4 above: near = 10 - 4 = 6, 6 / 1.5
    assert!((pressure(54, upper, lower, no_barrier) - 4.0).abs() < 1e-12);
    // offset 16 above: near = -6, -6 / 2.5
    assert!((pressure(66, upper, lower, no_barrier) + 2.4).abs() < 1e-12);
}

#[test]
fn pressure_inside_the_band_adds_barrier_noise_once() {
    let a = FluidStatus::new(52, FluidType::Water);
    let b = FluidStatus::new(50, FluidType::Water);
    let mut calls = 0;
    // near = 1 - 0, (1 + 3) / 3
    let p = pressure(51, a, b, || {
        calls += 1;
        0.25
    });
    assert_eq!(calls, 1);
    assert!((p - (4.0 / 3.0 + 0.25)).abs() < 1e-12);
}

#[test]
fn pressure_special_cases() {
    let water = FluidStatus::new(60, FluidType::Water);
    let lava = FluidStatus::new(40, FluidType::Lava);
    assert_eq!(pressure(30, water, lava, no_barrier), 1.0);
    assert_eq!(pressure(30, lava, water, no_barrier), 1.0);
    let same = FluidStatus::new(60, FluidType::Lava);
    assert_eq!(pressure(30, water, FluidStatus::new(60, FluidType::Water), no_barrier), 0.0);
    // Above the lava level the lava pocket reads as air, so the levels decide
    assert!(pressure(50, water, lava, no_barrier) != 1.0);
    assert_eq!(pressure(70, same, water, no_barrier), 0.0);
}

#[test]
fn similarity_and_flowing_threshold() {
    assert_eq!(similarity(10, 10), 1.0);
    assert_eq!(similarity(10, 35), 0.0);
    assert!((similarity(100, 144) + 0.76).abs() < 1e-12);
}

#[test]
fn sky_density_defers_to_the_global_table() {
    let sim = simulator(1, 0, 0, 64);
    let sea = sim.global().sea_level();
    let lava = sim.global().lava_level();
    assert_eq!(sim.compute_substance(3, sea - 10, 3, -100.0, 0.5), Some(FluidType::Water));
    assert_eq!(sim.compute_substance(3, sea + 10, 3, -100.0, 0.5), Some(FluidType::Air));
    assert_eq!(sim.compute_substance(3, lava - 1, 3, -100.0, 0.5), Some(FluidType::Lava));
    assert_eq!(sim.stats().lattice_queries, 0);
    assert!(sim.cached_statuses().iter().all(Option::is_none));
}

#[test]
fn below_lava_level_is_lava_without_lattice_lookup() {
    let sim = simulator(2, 4, -9, 64);
    let lava = sim.global().lava_level();
    let s = sim.sample(7, lava - 3, 9, -0.5, -0.5);
    assert_eq!(s.substance, Some(FluidType::Lava));
    assert!(!s.schedule_fluid_update);
    let stats = sim.stats();
    assert_eq!(stats.lattice_queries, 0);
    assert_eq!(stats.status_computations, 0);
    assert!(sim.cached_locations().iter().all(Option::is_none));
}

#[test]
fn positive_density_stays_solid() {
    let sim = simulator(3, 0, 0, 64);
    assert_eq!(sim.compute_substance(1, 10, 1, 0.3, 0.3), None);
    assert_eq!(sim.stats().lattice_queries, 0);
}

#[test]
fn open_non_solid_point_consults_the_lattice() {
    let sim = simulator(4, 0, 0, 64);
    let _ = sim.sample(8, 20, 8, -0.8, -0.8);
    let stats = sim.stats();
    assert_eq!(stats.lattice_queries, 1);
    assert!(stats.status_computations >= 1 && stats.status_computations <= 3);
}

#[test]
fn high_above_the_surface_points_read_as_global_table() {
    let sim = simulator(5, 2, 2, -40);
    // More than 12 + 8 blocks over the estimated surface: every nearby lattice point is global
    let y = 40;
    let s = sim.sample(40, y, 40, -1.0, -1.0);
    let gx = 40_i32.div_euclid(X_SPACING);
    let gy = y.div_euclid(Y_SPACING);
    let gz = 40_i32.div_euclid(Z_SPACING);
    let status = sim.cell_status(gx, gy, gz);
    let p = sim.lattice_point(gx, gy, gz);
    assert_eq!(status, sim.global().status(p[1]));
    // All three nearest pockets share the sea level, so there is no pressure to wall them off
    assert_eq!(s.substance, Some(FluidType::Water));
}

#[test]
fn disabled_aquifer_uses_the_global_table() {
    let mut params = TerrainGenParams::default();
    params.aquifer_enable = false;
    let noise = Arc::new(AquiferNoise::new(9, &params));
    let surface: Arc<dyn SurfaceEstimate> = Arc::new(|_x: i32, _z: i32| 64);
    let sim = AquiferSimulator::new(0, 0, AquiferSettings::from_params(&params), noise, surface);
    assert_eq!(sim.compute_substance(5, 0, 5, 0.0, -0.2), Some(FluidType::Water));
    assert_eq!(sim.compute_substance(5, 100, 5, 0.0, -0.2), Some(FluidType::Air));
    assert_eq!(sim.stats().lattice_queries, 0);
}

#[test]
fn bounds_cover_the_tile_with_a_margin() {
    let b = LatticeBounds::for_volume(32, -16, 16, -64, 384);
    assert_eq!(b.min_x, 1);
    assert_eq!(b.size_x, 3);
    assert_eq!(b.min_z, -2);
    assert_eq!(b.size_z, 3);
    assert_eq!(b.min_y, (-64_i32).div_euclid(12) - 1);
    assert!(b.index(0, 0, 0).is_none());
    assert!(b.index(2, 0, -1).is_some());
}

proptest! {
    #[test]
    fn jitter_stays_inside_its_cell(seed in any::<u32>(), gx in -1000i32..1000, gy in -20i32..40, gz in -1000i32..1000) {
        let [x, y, z] = lattice_point(seed, gx, gy, gz);
        prop_assert!((gx * 16..gx * 16 + 10).contains(&x));
        prop_assert!((gy * 12..gy * 12 + 9).contains(&y));
        prop_assert!((gz * 16..gz * 16 + 10).contains(&z));
    }

    // Two identical queries on a fresh simulator agree, and the second adds nothing to the caches
    #[test]
    fn substance_queries_are_idempotent(seed in any::<i64>(), lx in 0i32..16, y in -50i32..120, lz in 0i32..16, density in -1.0f64..0.0) {
        let sim = simulator(seed, 1, 1, 64);
        let first = sim.sample(16 + lx, y, 16 + lz, density, density);
        let locations = sim.cached_locations();
        let statuses = sim.cached_statuses();
        let second = sim.sample(16 + lx, y, 16 + lz, density, density);
        prop_assert_eq!(first, second);
        prop_assert_eq!(locations, sim.cached_locations());
        prop_assert_eq!(statuses, sim.cached_statuses());
    }

    // Cached lattice data does not depend on which queries filled it
    #[test]
    fn lattice_cache_is_order_independent(seed in any::<i64>(), ys in proptest::collection::vec(-50i32..150, 1..12)) {
        let forward = simulator(seed, -3, 2, 70);
        let backward = simulator(seed, -3, 2, 70);
        let ox = -48;
        let oz = 32;
        for (i, &y) in ys.iter().enumerate() {
            let _ = forward.sample(ox + (i as i32 % 16), y, oz + (i as i32 * 7 % 16), -0.5, -0.5);
        }
        for (i, &y) in ys.iter().enumerate().rev() {
            let _ = backward.sample(ox + (i as i32 % 16), y, oz + (i as i32 * 7 % 16), -0.5, -0.5);
        }
        prop_assert_eq!(forward.cached_locations(), backward.cached_locations());
        prop_assert_eq!(forward.cached_statuses(), backward.cached_statuses());

        let fresh = simulator(seed, -3, 2, 70);
        let b = fresh.bounds();
        for gy in b.min_y..b.min_y + b.size_y as i32 {
            let gx = b.min_x + 1;
            let gz = b.min_z + 1;
            prop_assert_eq!(fresh.lattice_point(gx, gy, gz), forward.lattice_point(gx, gy, gz));
            prop_assert_eq!(fresh.cell_status(gx, gy, gz), forward.cell_status(gx, gy, gz));
        }
    }

    // The sky short-circuit ignores the lattice at every height
    #[test]
    fn sky_short_circuit_matches_global(seed in any::<i64>(), y in -64i32..320, blended in -1.0f64..1.0) {
        let sim = simulator(seed, 0, 0, 64);
        prop_assert_eq!(sim.compute_substance(0, y, 0, -64.0, blended), Some(sim.global().at(y)));
        prop_assert_eq!(sim.stats().lattice_queries, 0);
    }
}
