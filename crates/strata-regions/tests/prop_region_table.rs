use proptest::prelude::*;
use strata_regions::{
    BlendGroup, ColumnState, RegionTable, RegionTableError, RegionTags, RegionsConfig,
};

fn parse(src: &str) -> RegionsConfig {
    toml::from_str(src).expect("config parses")
}

#[test]
fn builtin_table_loads_with_expected_tags() {
    let table = RegionTable::builtin(42).expect("builtin table");
    assert!(table.len() >= 5);
    let river = table.id_by_name("river").expect("river region");
    assert!(table.region(river).is_river());
    assert_eq!(table.region(river).blend, BlendGroup::River);
    let ocean = table.id_by_name("ocean").expect("ocean region");
    assert!(table.region(ocean).is_salty());
    let shore = table.id_by_name("shore").expect("shore region");
    assert!(table.region(shore).is_shore());
    assert_eq!(table.blend_group(shore), None);
}

#[test]
fn duplicate_names_are_rejected() {
    let cfg = parse(
        r#"
        [[regions]]
        name = "a"
        height = { kind = "constant", value = 1.0 }
        density = { kind = "solid" }
        [[regions]]
        name = "a"
        height = { kind = "constant", value = 2.0 }
        density = { kind = "solid" }
        "#,
    );
    let err = RegionTable::from_configs(&cfg, 1).unwrap_err();
    assert!(matches!(err, RegionTableError::DuplicateName(ref n) if n == "a"));
}

#[test]
fn missing_density_sampler_is_a_config_error() {
    let cfg = parse(
        r#"
        [[regions]]
        name = "bare"
        height = { kind = "constant", value = 1.0 }
        "#,
    );
    let err = RegionTable::from_configs(&cfg, 1).unwrap_err();
    match err {
        RegionTableError::MissingSampler { region, sampler } => {
            assert_eq!(region, "bare");
            assert_eq!(sampler, "density");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_table_and_bad_ranges_are_rejected() {
    let empty = RegionsConfig::default();
    assert!(matches!(
        RegionTable::from_configs(&empty, 0),
        Err(RegionTableError::Empty)
    ));
    let cfg = parse(
        r#"
        [[regions]]
        name = "inverted"
        continent = [0.5, 0.1]
        height = { kind = "constant", value = 1.0 }
        density = { kind = "solid" }
        "#,
    );
    assert!(matches!(
        RegionTable::from_configs(&cfg, 0),
        Err(RegionTableError::InvalidParameter { .. })
    ));
}

#[test]
#[should_panic(expected = "not registered")]
fn unregistered_region_lookup_panics() {
    let table = RegionTable::new();
    let _ = table.region(3);
}

#[test]
fn closures_register_as_samplers() {
    let mut table = RegionTable::new();
    let id = table
        .register(
            "flat",
            RegionTags::default(),
            BlendGroup::Land,
            None,
            Box::new(|_x: i32, _z: i32| 64.0),
            Box::new(strata_regions::SolidDensity),
        )
        .expect("register");
    assert_eq!(table.region(id).height_sampler().height(10, -10), 64.0);
}

proptest! {
    // Samplers built from the same seed agree everywhere
    #[test]
    fn samplers_are_deterministic_per_seed(seed in any::<i64>(), x in -100_000i32..100_000, z in -100_000i32..100_000, y in -64i32..320) {
        let a = RegionTable::builtin(seed).unwrap();
        let b = RegionTable::builtin(seed).unwrap();
        for (ra, rb) in a.iter().zip(b.iter()) {
            prop_assert_eq!(ra.height_sampler().height(x, z).to_bits(), rb.height_sampler().height(x, z).to_bits());
            let mut sa = ColumnState::default();
            let mut sb = ColumnState::default();
            ra.density_sampler().set_column(&mut sa, x, z);
            rb.density_sampler().set_column(&mut sb, x, z);
            prop_assert_eq!(ra.density_sampler().noise(&sa, y).to_bits(), rb.density_sampler().noise(&sb, y).to_bits());
        }
    }

    // Carving noise never reports solid-biased (negative) values
    #[test]
    fn density_noise_is_non_negative(seed in any::<i64>(), x in -10_000i32..10_000, z in -10_000i32..10_000, y in -64i32..320) {
        let table = RegionTable::builtin(seed).unwrap();
        for r in table.iter() {
            let mut state = ColumnState::default();
            r.density_sampler().set_column(&mut state, x, z);
            prop_assert!(r.density_sampler().noise(&state, y) >= 0.0);
        }
    }
}
