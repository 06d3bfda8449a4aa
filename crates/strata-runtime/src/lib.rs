//! Parallel tile generation: worker pool, job and result queues, shared caches.
#![forbid(unsafe_code)]

mod column_cache;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use strata_chunk::{TileGenerateResult, generate_tile};
use strata_world::{
    AquiferSimulator, ColumnResult, LossyCacheStats, LossyPositionCache, TerrainCtx,
    TerrainGenerator, TileCoord,
};

pub use crate::column_cache::ProbeColumnCache;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileJob {
    pub coord: TileCoord,
    pub job_id: u64,
}

pub struct TileJobOut {
    pub coord: TileCoord,
    pub job_id: u64,
    pub result: TileGenerateResult,
    pub t_total_ms: u32,
    pub t_gen_ms: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub queued: usize,
    pub inflight: usize,
    pub completed: u64,
    pub contexts: usize,
    pub aquifer_cache: LossyCacheStats,
    pub probe_cache: LossyCacheStats,
}

type AquiferCache = LossyPositionCache<Arc<AquiferSimulator>>;

fn elapsed_ms(t0: Instant) -> u32 {
    t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
}

fn aquifer_for(cache: &AquiferCache, generator: &TerrainGenerator, coord: TileCoord) -> Arc<AquiferSimulator> {
    cache.get_or_insert_with(coord.tx, coord.tz, || {
        Arc::new(generator.make_aquifer(coord))
    })
}

fn process_tile_job(
    job: TileJob,
    generator: &TerrainGenerator,
    ctx: &mut TerrainCtx,
    aquifers: &AquiferCache,
) -> TileJobOut {
    let TileJob { coord, job_id } = job;
    let t_job_start = Instant::now();
    let aquifer = aquifer_for(aquifers, generator, coord);

    let t0 = Instant::now();
    let result = generate_tile(generator, ctx, coord, &aquifer);
    let t_gen_ms = elapsed_ms(t0);

    TileJobOut {
        coord,
        job_id,
        result,
        t_total_ms: elapsed_ms(t_job_start),
        t_gen_ms,
    }
}

pub struct Runtime {
    generator: Arc<TerrainGenerator>,
    job_tx: Sender<TileJob>,
    res_rx: Receiver<TileJobOut>,
    _pool: Arc<ThreadPool>,
    queued: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    completed: Arc<AtomicU64>,
    next_job_id: AtomicU64,
    pub workers: usize,
    contexts: Arc<AtomicUsize>,
    aquifers: Arc<AquiferCache>,
    probes: Arc<ProbeColumnCache>,
}

impl Runtime {
    /// `workers == 0` uses every available core.
    pub fn new(generator: Arc<TerrainGenerator>, workers: usize) -> Result<Self, ThreadPoolBuildError> {
        let (job_tx, job_rx) = unbounded::<TileJob>();
        let (res_tx, res_rx) = unbounded::<TileJobOut>();

        let workers = if workers == 0 {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(8)
        } else {
            workers
        };
        let params = generator.params();
        let contexts = Arc::new(AtomicUsize::new(0));
        let aquifers = Arc::new(AquiferCache::new(params.aquifer_cache_slots));
        let probes = Arc::new(ProbeColumnCache::new(params.column_cache_slots));

        let queued = Arc::new(AtomicUsize::new(0));
        let inflight = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicU64::new(0));

        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("strata-gen-{i}"))
                .build()?,
        );
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let generator = Arc::clone(&generator);
            let contexts = Arc::clone(&contexts);
            let aquifers = Arc::clone(&aquifers);
            let queued = Arc::clone(&queued);
            let inflight = Arc::clone(&inflight);
            let completed = Arc::clone(&completed);
            pool.spawn(move || {
                // one context per worker, built on its first job
                let mut ctx: Option<TerrainCtx> = None;
                while let Ok(job) = rx.recv() {
                    queued.fetch_sub(1, Ordering::Relaxed);
                    inflight.fetch_add(1, Ordering::Relaxed);
                    let ctx = ctx.get_or_insert_with(|| {
                        contexts.fetch_add(1, Ordering::Relaxed);
                        generator.make_ctx()
                    });
                    let out = process_tile_job(job, generator.as_ref(), ctx, aquifers.as_ref());
                    inflight.fetch_sub(1, Ordering::Relaxed);
                    completed.fetch_add(1, Ordering::Relaxed);
                    // counters settle before the result is visible
                    let _ = tx.send(out);
                }
            });
        }
        log::info!(
            target: "runtime",
            "tile runtime started: workers={} aquifer_slots={} probe_slots={}",
            workers,
            aquifers.capacity(),
            params.column_cache_slots
        );

        Ok(Self {
            generator,
            job_tx,
            res_rx,
            _pool: pool,
            queued,
            inflight,
            completed,
            next_job_id: AtomicU64::new(1),
            workers,
            contexts,
            aquifers,
            probes,
        })
    }

    #[inline]
    pub fn generator(&self) -> &Arc<TerrainGenerator> {
        &self.generator
    }

    /// Queues one tile and returns its job id.
    pub fn submit(&self, coord: TileCoord) -> u64 {
        let job_id = self.next_job_id.fetch_add(1, Ordering::Relaxed);
        self.queued.fetch_add(1, Ordering::Relaxed);
        if self.job_tx.send(TileJob { coord, job_id }).is_err() {
            self.queued.fetch_sub(1, Ordering::Relaxed);
            log::warn!(target: "runtime", "job queue closed, dropping tile ({}, {})", coord.tx, coord.tz);
        }
        job_id
    }

    /// Results finished so far; never blocks.
    pub fn drain_results(&self) -> Vec<TileJobOut> {
        self.res_rx.try_iter().collect()
    }

    /// Blocks until `count` results arrived or `timeout` passed with none arriving.
    pub fn wait_results(&self, count: usize, timeout: Duration) -> Vec<TileJobOut> {
        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            match self.res_rx.recv_timeout(timeout) {
                Ok(r) => out.push(r),
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!(
                        target: "runtime",
                        "timed out waiting for results: {}/{} received",
                        out.len(),
                        count
                    );
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        out
    }

    /// Aquifer shared by every job on `coord`, built on first use.
    pub fn aquifer(&self, coord: TileCoord) -> Arc<AquiferSimulator> {
        aquifer_for(&self.aquifers, &self.generator, coord)
    }

    /// Height and dominant region at any column, memoized.
    pub fn probe_column(&self, x: i32, z: i32) -> ColumnResult {
        self.probes.probe(&self.generator, x, z)
    }

    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            queued: self.queued.load(Ordering::Relaxed),
            inflight: self.inflight.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            contexts: self.contexts.load(Ordering::Relaxed),
            aquifer_cache: self.aquifers.stats(),
            probe_cache: self.probes.stats(),
        }
    }
}
