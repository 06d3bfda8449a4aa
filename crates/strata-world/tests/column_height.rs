use strata_regions::{BlendGroup, RegionId, RegionTable, RegionTags, SolidDensity};
use strata_world::terrain::column::remap_above_water;
use strata_world::{ColumnHeightResolver, WeightMap};

struct Fixture {
    table: RegionTable,
    plains: RegionId,
    highlands: RegionId,
    river: RegionId,
    shore: RegionId,
    ocean: RegionId,
}

fn fixture() -> Fixture {
    let mut table = RegionTable::new();
    let mut add = |name: &str, tags: RegionTags, blend: BlendGroup, h: f64| {
        table
            .register(
                name,
                tags,
                blend,
                None,
                Box::new(move |_x: i32, _z: i32| h),
                Box::new(SolidDensity),
            )
            .expect("register")
    };
    let plains = add("plains", RegionTags::default(), BlendGroup::Land, 64.0);
    let highlands = add("highlands", RegionTags::default(), BlendGroup::Land, 90.0);
    let river = add(
        "river",
        RegionTags {
            river: true,
            ..RegionTags::default()
        },
        BlendGroup::River,
        40.0,
    );
    let shore = add(
        "shore",
        RegionTags {
            shore: true,
            ..RegionTags::default()
        },
        BlendGroup::Local,
        60.0,
    );
    let ocean = add(
        "ocean",
        RegionTags {
            salty: true,
            ..RegionTags::default()
        },
        BlendGroup::Ocean,
        20.0,
    );
    Fixture {
        table,
        plains,
        highlands,
        river,
        shore,
        ocean,
    }
}

fn weights(entries: &[(RegionId, f64)]) -> WeightMap {
    entries.iter().copied().collect()
}

#[test]
fn single_region_column_keeps_its_height_exactly() {
    let f = fixture();
    let resolver = ColumnHeightResolver::new(&f.table);
    let r = resolver.resolve(12, -40, &weights(&[(f.plains, 1.0)]));
    assert_eq!(r.height, 64.0);
    assert_eq!(r.region, f.plains);
}

#[test]
fn dominant_river_remaps_height_above_the_river() {
    let f = fixture();
    let resolver = ColumnHeightResolver::new(&f.table);
    // 0.8 * 40 + 0.2 * 90 = 50
    let r = resolver.resolve(0, 0, &weights(&[(f.river, 0.8), (f.highlands, 0.2)]));
    assert!((remap_above_water(10.0) - 5.52).abs() < 1e-12);
    assert!((r.height - 45.52).abs() < 1e-9, "height {}", r.height);
    assert_eq!(r.region, f.river);
}

#[test]
fn partial_river_blends_with_reduced_weight() {
    let f = fixture();
    let resolver = ColumnHeightResolver::new(&f.table);
    // river 0.3 * 40 = 12, highlands 0.7 * 90 = 63, total 75
    let r = resolver.resolve(0, 0, &weights(&[(f.river, 0.3), (f.highlands, 0.7)]));
    let expected = 63.0 * (1.0 - 0.18) / 0.7 + 12.0 * 0.18 / 0.3;
    assert!((r.height - expected).abs() < 1e-9, "height {}", r.height);
    assert_eq!(r.region, f.highlands);
}

#[test]
fn river_meeting_the_ocean_yields_to_the_ocean() {
    let f = fixture();
    let resolver = ColumnHeightResolver::new(&f.table);
    let r = resolver.resolve(0, 0, &weights(&[(f.river, 0.7), (f.ocean, 0.3)]));
    assert!((r.height - 34.0).abs() < 1e-9, "height {}", r.height);
    assert_eq!(r.region, f.ocean);
}

#[test]
fn dominant_shore_flattens_toward_its_mean() {
    let f = fixture();
    let resolver = ColumnHeightResolver::new(&f.table);
    // 0.7 * 60 + 0.3 * 90 = 69, nine above the shore
    let r = resolver.resolve(0, 0, &weights(&[(f.shore, 0.7), (f.highlands, 0.3)]));
    assert!((r.height - (60.0 + remap_above_water(9.0))).abs() < 1e-9, "height {}", r.height);
    assert_eq!(r.region, f.shore);
}

#[test]
fn shore_below_its_mean_keeps_blended_height() {
    let f = fixture();
    let resolver = ColumnHeightResolver::new(&f.table);
    // 0.7 * 60 + 0.3 * 20 = 48, under the shore mean
    let r = resolver.resolve(0, 0, &weights(&[(f.shore, 0.7), (f.ocean, 0.3)]));
    assert!((r.height - 48.0).abs() < 1e-9);
    assert_eq!(r.region, f.shore);
}

#[test]
fn remap_is_concave_and_clamped_input_tops_out() {
    assert!((remap_above_water(0.0) + 0.48).abs() < 1e-12);
    assert!((remap_above_water(20.0) - 7.52).abs() < 1e-12);
    let mut prev_step = f64::INFINITY;
    for d in 0..20 {
        let step = remap_above_water(d as f64 + 1.0) - remap_above_water(d as f64);
        assert!(step < prev_step);
        prev_step = step;
    }
}

#[test]
fn mixed_column_without_dominant_partition_uses_heaviest_normal_region() {
    let f = fixture();
    let resolver = ColumnHeightResolver::new(&f.table);
    let r = resolver.resolve(0, 0, &weights(&[(f.plains, 0.4), (f.highlands, 0.6)]));
    assert!((r.height - (0.4 * 64.0 + 0.6 * 90.0)).abs() < 1e-9);
    assert_eq!(r.region, f.highlands);
}

#[test]
#[should_panic(expected = "empty weight map")]
fn empty_weight_map_is_fatal() {
    let f = fixture();
    ColumnHeightResolver::new(&f.table).resolve(0, 0, &WeightMap::new());
}

#[test]
#[should_panic(expected = "not registered")]
fn unknown_region_in_weights_is_fatal() {
    let f = fixture();
    ColumnHeightResolver::new(&f.table).resolve(0, 0, &weights(&[(99, 1.0)]));
}
