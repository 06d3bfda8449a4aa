use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use hashbrown::HashMap;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode, WriteLogger};
use strata_chunk::{Material, TileGenerateResult};
use strata_regions::RegionTable;
use strata_runtime::Runtime;
use strata_world::{
    FluidType, TERRAIN_STAGE_COUNT, TerrainGenParams, TerrainGenerator, TerrainStage, TileCoord,
    load_params_from_path,
};

#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Generate a square of terrain tiles and summarize them")]
struct Args {
    /// World seed
    #[arg(long, default_value_t = 0)]
    seed: i64,
    /// Tiles generated on each side of the origin tile
    #[arg(long, default_value_t = 2)]
    radius: u32,
    /// Terrain parameters TOML (defaults to the built-in table)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Region table TOML (defaults to the built-in table)
    #[arg(long)]
    regions: Option<PathBuf>,
    /// Worker threads; overrides the config, 0 uses every core
    #[arg(long)]
    workers: Option<usize>,
    /// Also write debug logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    match log_file {
        Some(path) => {
            CombinedLogger::init(vec![
                TermLogger::new(
                    LevelFilter::Info,
                    Config::default(),
                    TerminalMode::Mixed,
                    ColorChoice::Auto,
                ),
                WriteLogger::new(LevelFilter::Debug, Config::default(), File::create(path)?),
            ])?;
        }
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .init();
        }
    }
    Ok(())
}

struct Summary {
    tiles: usize,
    columns_by_region: HashMap<String, usize>,
    water: u64,
    flowing: u64,
    lava: u64,
    fluid_updates: usize,
    carved: usize,
    min_height: i32,
    max_height: i32,
    gen_ms: u64,
    stage_us: [u64; TERRAIN_STAGE_COUNT],
}

impl Summary {
    fn new() -> Self {
        Self {
            tiles: 0,
            columns_by_region: HashMap::new(),
            water: 0,
            flowing: 0,
            lava: 0,
            fluid_updates: 0,
            carved: 0,
            min_height: i32::MAX,
            max_height: i32::MIN,
            gen_ms: 0,
            stage_us: [0; TERRAIN_STAGE_COUNT],
        }
    }

    fn add(&mut self, table: &RegionTable, tile: &TileGenerateResult, gen_ms: u32) {
        self.tiles += 1;
        self.gen_ms += u64::from(gen_ms);
        for column in &tile.columns {
            let name = &table.region(column.region).name;
            *self.columns_by_region.entry(name.clone()).or_insert(0) += 1;
            let h = column.surface_y();
            self.min_height = self.min_height.min(h);
            self.max_height = self.max_height.max(h);
        }
        for m in &tile.buf.cells {
            match *m {
                Material::Fluid(FluidType::Water, Some(_)) => {
                    self.water += 1;
                    self.flowing += 1;
                }
                Material::Fluid(FluidType::Water, None) => self.water += 1,
                Material::Fluid(FluidType::Lava, _) => self.lava += 1,
                _ => {}
            }
        }
        for (total, sample) in self.stage_us.iter_mut().zip(&tile.terrain_metrics.stages) {
            *total += u64::from(sample.time_us);
        }
        self.fluid_updates += tile.fluid_updates.len();
        self.carved += tile.carving_mask.count();
    }

    fn log(&self) {
        log::info!(
            "{} tiles in {}ms of worker time; column heights [{}, {}]",
            self.tiles,
            self.gen_ms,
            self.min_height,
            self.max_height
        );
        let mut regions: Vec<_> = self.columns_by_region.iter().collect();
        regions.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (name, count) in regions {
            log::info!("  {:<12} {:>8} columns", name, count);
        }
        log::info!(
            "water {} ({} flowing), lava {}, scheduled fluid updates {}, carved {}",
            self.water,
            self.flowing,
            self.lava,
            self.fluid_updates,
            self.carved
        );
        for stage in TerrainStage::ALL {
            log::info!("  {:<8} {:>10}us", stage.label(), self.stage_us[stage.index()]);
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let params = match &args.config {
        Some(path) => load_params_from_path(path)?,
        None => TerrainGenParams::builtin()?,
    };
    let table = match &args.regions {
        Some(path) => RegionTable::load_from_path(path, args.seed)?,
        None => RegionTable::builtin(args.seed)?,
    };
    let workers = args.workers.unwrap_or(params.workers);
    let table = Arc::new(table);
    let generator = Arc::new(TerrainGenerator::new(args.seed, params, Arc::clone(&table))?);
    let runtime = Runtime::new(Arc::clone(&generator), workers)?;

    let r = args.radius as i32;
    let started = Instant::now();
    let mut submitted = 0usize;
    for tz in -r..=r {
        for tx in -r..=r {
            runtime.submit(TileCoord::new(tx, tz));
            submitted += 1;
        }
    }
    log::info!(
        "generating {} tiles with {} workers (seed {})",
        submitted,
        runtime.workers,
        args.seed
    );

    let mut summary = Summary::new();
    for out in runtime.wait_results(submitted, Duration::from_secs(600)) {
        summary.add(&table, &out.result, out.t_gen_ms);
    }
    if summary.tiles < submitted {
        log::warn!("only {}/{} tiles finished", summary.tiles, submitted);
    }
    log::info!("done in {:.2?}", started.elapsed());
    summary.log();

    let stats = runtime.stats();
    for (name, cache) in [
        ("aquifer", stats.aquifer_cache),
        ("probe", stats.probe_cache),
        ("surface", generator.surface().cache_stats()),
    ] {
        log::info!(
            "{} cache: {} hits, {} misses, {} evictions, {} entries",
            name,
            cache.hits,
            cache.misses,
            cache.evictions,
            cache.entries
        );
    }
    Ok(())
}
