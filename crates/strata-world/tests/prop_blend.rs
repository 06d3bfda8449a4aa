use std::sync::Arc;

use proptest::prelude::*;
use strata_regions::{BlendGroup, RegionId, RegionTable, RegionTags, SolidDensity};
use strata_world::terrain::blend::{GRID_WIDTH, sample_kernel_weights};
use strata_world::terrain::kernel::{kernel_5x5, kernel_9x9};
use strata_world::{
    BlendGrid, FlowVector, RegionClassifier, RiverFlowSource, TerrainGenParams, TerrainGenerator,
    TileCoord, WeightMap,
};

fn two_region_table() -> RegionTable {
    let mut table = RegionTable::new();
    for (name, h) in [("low", 60.0), ("high", 70.0)] {
        table
            .register(
                name,
                RegionTags::default(),
                BlendGroup::Land,
                None,
                Box::new(move |_x: i32, _z: i32| h),
                Box::new(SolidDensity),
            )
            .expect("register");
    }
    table
}

/// Checkerboard of 40-block cells over the two land regions.
fn checker(x: i32, z: i32) -> RegionId {
    ((x.div_euclid(40) + z.div_euclid(40)).rem_euclid(2)) as RegionId
}

/// A straight border at x = 0.
fn step(x: i32, _z: i32) -> RegionId {
    if x < 0 { 0 } else { 1 }
}

fn generator(classifier: fn(i32, i32) -> RegionId) -> TerrainGenerator {
    let classifier: Arc<dyn RegionClassifier> = Arc::new(classifier);
    let flow: Arc<dyn RiverFlowSource> = Arc::new(|_qx: i32, _qz: i32| FlowVector::ZERO);
    TerrainGenerator::with_sources(
        7,
        TerrainGenParams::default(),
        Arc::new(two_region_table()),
        classifier,
        flow,
    )
}

/// Plains with an 8-block River-group stripe every 64 blocks, narrower than a coarse cell.
fn striped_table() -> RegionTable {
    let mut table = RegionTable::new();
    table
        .register(
            "plains",
            RegionTags::default(),
            BlendGroup::Land,
            None,
            Box::new(|_x: i32, _z: i32| 64.0),
            Box::new(SolidDensity),
        )
        .expect("register plains");
    table
        .register(
            "river",
            RegionTags {
                river: true,
                ..RegionTags::default()
            },
            BlendGroup::River,
            None,
            Box::new(|_x: i32, _z: i32| 40.0),
            Box::new(SolidDensity),
        )
        .expect("register river");
    table
}

fn stripe(x: i32, _z: i32) -> RegionId {
    if (4..12).contains(&x.rem_euclid(64)) { 1 } else { 0 }
}

fn bits(m: &WeightMap) -> Vec<(RegionId, u64)> {
    m.iter().map(|(id, w)| (id, w.to_bits())).collect()
}

#[test]
fn kernels_are_normalized() {
    assert!((kernel_9x9().sum() - 1.0).abs() < 1e-9);
    assert!((kernel_5x5().sum() - 1.0).abs() < 1e-9);
    assert_eq!(kernel_9x9().width(), 9);
    assert_eq!(kernel_5x5().width(), 5);
    // Corners of the 9x9 parabola fall exactly to zero
    assert_eq!(kernel_9x9().weight(4, 4), 0.0);
    assert!(kernel_9x9().values().iter().all(|&v| v >= 0.0));
}

#[test]
fn uniform_classifier_gives_unit_weight() {
    let classify = |_x: i32, _z: i32| 0 as RegionId;
    let mut m = WeightMap::new();
    sample_kernel_weights(&mut m, &classify, kernel_9x9(), 2, 0, 0, 0, 0);
    assert_eq!(m.len(), 1);
    assert!((m.get(0) - 1.0).abs() < 1e-9);
}

#[test]
fn grid_matches_probe_at_every_column() {
    let g = generator(checker);
    let coord = TileCoord::new(3, -2);
    let grid = g.blend_grid(coord);
    let mut out = WeightMap::new();
    for lz in 0..16 {
        for lx in 0..16 {
            grid.column_weights(lx, lz, &mut out);
            let probed = g.column_weights(coord.origin_x() + lx as i32, coord.origin_z() + lz as i32);
            assert_eq!(bits(&out), bits(&probed), "column ({lx}, {lz})");
        }
    }
}

#[test]
fn step_border_changes_height_gradually() {
    let g = generator(step);
    let mut prev = g.probe_column(-48, 5).height;
    for x in -47..48 {
        let h = g.probe_column(x, 5).height;
        assert!((h - prev).abs() <= 1.0, "jump {prev} -> {h} at x={x}");
        assert!((60.0 - 1e-9..=70.0 + 1e-9).contains(&h));
        prev = h;
    }
    assert!((g.probe_column(-200, 0).height - 60.0).abs() < 1e-9);
    assert!((g.probe_column(200, 0).height - 70.0).abs() < 1e-9);
}

#[test]
fn narrow_river_keeps_its_weight_inside_the_stripe() {
    let table = striped_table();
    let grid = BlendGrid::sample(&stripe, 0, 0, &|id: RegionId| table.blend_group(id), BlendGroup::COUNT);
    let mut out = WeightMap::new();
    grid.column_weights(8, 8, &mut out);
    assert!((out.total() - 1.0).abs() < 1e-6, "total {}", out.total());
    assert!(out.get(1) > 0.2, "river weight {}", out.get(1));
}

proptest! {
    // A river stripe too narrow for the coarse pass still blends to unit mass
    #[test]
    fn narrow_river_stripe_stays_normalized(tx in -200i32..200, tz in -200i32..200, lx in 0usize..16, lz in 0usize..16) {
        let table = striped_table();
        let grid = BlendGrid::sample(&stripe, tx << 4, tz << 4, &|id: RegionId| table.blend_group(id), BlendGroup::COUNT);
        let mut out = WeightMap::new();
        grid.column_weights(lx, lz, &mut out);
        let total = out.total();
        prop_assert!((0.95..=1.0 + 1e-9).contains(&total), "total {}", total);
    }

    // Interior column weights stay within [0.95, 1] of unit mass
    #[test]
    fn column_weights_are_normalized(tx in -500i32..500, tz in -500i32..500, lx in 0usize..16, lz in 0usize..16) {
        let table = two_region_table();
        let classify = |x: i32, z: i32| checker(x, z);
        let grid = BlendGrid::sample(&classify, tx << 4, tz << 4, &|id: RegionId| table.blend_group(id), BlendGroup::COUNT);
        let mut out = WeightMap::new();
        grid.column_weights(lx, lz, &mut out);
        let total = out.total();
        prop_assert!((0.95..=1.0 + 1e-9).contains(&total), "total {}", total);
    }

    // Every quart cell of the grid is itself normalized
    #[test]
    fn grid_cells_are_normalized(tx in -500i32..500, tz in -500i32..500, qx in 0usize..GRID_WIDTH, qz in 0usize..GRID_WIDTH) {
        let table = two_region_table();
        let classify = |x: i32, z: i32| checker(x, z);
        let grid = BlendGrid::sample(&classify, tx << 4, tz << 4, &|id: RegionId| table.blend_group(id), BlendGroup::COUNT);
        let total = grid.cell(qx, qz).total();
        prop_assert!((0.95..=1.0 + 1e-9).contains(&total), "total {}", total);
    }

    // Adjacent columns never differ by more than one block between constant regions
    #[test]
    fn adjacent_columns_are_continuous(x in -2_000i32..2_000, z in -2_000i32..2_000) {
        let g = generator(checker);
        let h = g.probe_column(x, z).height;
        prop_assert!((h - g.probe_column(x + 1, z).height).abs() <= 1.0);
        prop_assert!((h - g.probe_column(x, z + 1).height).abs() <= 1.0);
    }

    // Repeated sampling is bit-identical
    #[test]
    fn blending_is_deterministic(tx in -100i32..100, tz in -100i32..100) {
        let g = generator(checker);
        let a = g.blend_grid(TileCoord::new(tx, tz));
        let b = g.blend_grid(TileCoord::new(tx, tz));
        for qz in 0..GRID_WIDTH {
            for qx in 0..GRID_WIDTH {
                prop_assert_eq!(bits(a.cell(qx, qz)), bits(b.cell(qx, qz)));
            }
        }
    }
}
