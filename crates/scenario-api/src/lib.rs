//! In-process scenario service: fingerprint-keyed result cache, baseline sources,
//! optional SQLite archive, and the HTTP adapter.

pub mod baseline;
pub mod cache;
pub mod clock;
pub mod config;
mod persistence;
mod server;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use contracts::{
    BaselineSourceKind, BaselineState, CacheStats, ScenarioParameters, SimulationResult,
};
use scenario_core::{
    DefaultDistributionPolicy, ScenarioIdentity, SimulationError, SimulationPipeline,
};
use thiserror::Error;
use tracing::{info, warn};

use baseline::{BaselineError, BaselineSource};
use cache::ResultCache;
use clock::{Clock, SystemClock};
use config::ServiceConfig;
pub use persistence::{ArchivedResultSummary, PersistenceError, SqliteResultStore};
pub use server::{router, serve, AppState, ServerError};

/// Baseline imagery year every scenario is measured against.
pub const BASELINE_YEAR: i32 = 2020;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("result cache unavailable: {0}")]
    CacheUnavailable(String),
    #[error("baseline unavailable: {0}")]
    BaselineUnavailable(#[from] BaselineError),
    #[error("baseline {baseline} does not match requested {requested}")]
    RegionMismatch { requested: String, baseline: String },
}

/// Result of a compute-or-fetch call.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub result: Arc<SimulationResult>,
    pub cache_hit: bool,
}

#[derive(Debug)]
pub struct ScenarioService {
    pipeline: SimulationPipeline,
    cache: Mutex<ResultCache>,
    clock: Arc<dyn Clock>,
    archive: Option<Mutex<SqliteResultStore>>,
    last_persistence_error: Mutex<Option<String>>,
}

impl Default for ScenarioService {
    fn default() -> Self {
        Self::new(SimulationPipeline::default(), ResultCache::default())
    }
}

impl ScenarioService {
    pub fn new(pipeline: SimulationPipeline, cache: ResultCache) -> Self {
        Self::with_clock(pipeline, cache, Arc::new(SystemClock))
    }

    /// `clock` stamps `generated_at`; the cache keeps its own clock.
    pub fn with_clock(
        pipeline: SimulationPipeline,
        cache: ResultCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pipeline,
            cache: Mutex::new(cache),
            clock,
            archive: None,
            last_persistence_error: Mutex::new(None),
        }
    }

    /// Builds the service and, when `sqlite_path` is set, attaches the archive.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, PersistenceError> {
        let pipeline = SimulationPipeline::new(
            ScenarioIdentity::with_length(config.fingerprint_length),
            DefaultDistributionPolicy::default(),
        );
        let mut service = Self::new(
            pipeline,
            ResultCache::new(config.cache_max_size, config.cache_ttl),
        );
        if let Some(path) = config.sqlite_path.as_deref() {
            service.attach_sqlite_store(path)?;
        }
        Ok(service)
    }

    pub fn attach_sqlite_store(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let store = SqliteResultStore::open(path)?;
        self.archive = Some(Mutex::new(store));
        Ok(())
    }

    pub fn has_archive(&self) -> bool {
        self.archive.is_some()
    }

    pub fn fingerprint(
        &self,
        region: &str,
        baseline_year: i32,
        scenario: &ScenarioParameters,
    ) -> String {
        self.pipeline
            .identity()
            .fingerprint(region, baseline_year, scenario)
    }

    /// Returns the cached result for this scenario or computes and caches it.
    pub fn compute_or_fetch(
        &self,
        region: &str,
        baseline_year: i32,
        baseline: &BaselineState,
        scenario: &ScenarioParameters,
    ) -> Result<ScenarioOutcome, ServiceError> {
        self.compute_or_fetch_from(
            region,
            baseline_year,
            baseline,
            scenario,
            BaselineSourceKind::Supplied,
        )
    }

    /// Like [`Self::compute_or_fetch`], but only asks `source` for the
    /// baseline on a cache miss.
    pub fn compute_or_fetch_with(
        &self,
        scenario: &ScenarioParameters,
        baseline_year: i32,
        source: &dyn BaselineSource,
    ) -> Result<ScenarioOutcome, ServiceError> {
        let region = scenario.region.as_str();
        let key = self.fingerprint(region, baseline_year, scenario);
        if let Some(result) = self.lock_cache()?.get(&key) {
            return Ok(ScenarioOutcome {
                result,
                cache_hit: true,
            });
        }

        let baseline = source.load(region, baseline_year)?;
        self.compute_or_fetch_from(region, baseline_year, &baseline, scenario, source.kind())
    }

    fn compute_or_fetch_from(
        &self,
        region: &str,
        baseline_year: i32,
        baseline: &BaselineState,
        scenario: &ScenarioParameters,
        source_kind: BaselineSourceKind,
    ) -> Result<ScenarioOutcome, ServiceError> {
        if baseline.region != region || baseline.baseline_year != baseline_year {
            return Err(ServiceError::RegionMismatch {
                requested: format!("{region}@{baseline_year}"),
                baseline: format!("{}@{}", baseline.region, baseline.baseline_year),
            });
        }

        let key = self.fingerprint(region, baseline_year, scenario);
        if let Some(result) = self.lock_cache()?.get(&key) {
            return Ok(ScenarioOutcome {
                result,
                cache_hit: true,
            });
        }

        self.compute_and_store(key, baseline, scenario, source_kind)
    }

    /// Cache first, then the archive when one is attached.
    pub fn lookup(&self, scenario_id: &str) -> Result<Option<Arc<SimulationResult>>, ServiceError> {
        if let Some(result) = self.lock_cache()?.get(scenario_id) {
            return Ok(Some(result));
        }

        let Some(archive) = self.archive.as_ref() else {
            return Ok(None);
        };
        let store = archive
            .lock()
            .map_err(|_| ServiceError::CacheUnavailable("archive lock poisoned".to_string()))?;
        store
            .load_result(scenario_id)
            .map(|found| found.map(Arc::new))
            .map_err(|err| ServiceError::CacheUnavailable(err.to_string()))
    }

    /// Clears the in-memory cache. The archive is left untouched.
    pub fn invalidate_all(&self) -> Result<usize, ServiceError> {
        let cleared = self.lock_cache()?.clear();
        info!(cleared, "result cache cleared");
        Ok(cleared)
    }

    pub fn cache_stats(&self) -> Result<CacheStats, ServiceError> {
        Ok(self.lock_cache()?.stats())
    }

    pub fn archived_results(
        &self,
        limit: usize,
    ) -> Result<Vec<ArchivedResultSummary>, PersistenceError> {
        let Some(archive) = self.archive.as_ref() else {
            return Err(PersistenceError::NotAttached);
        };
        let store = archive.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        store.list_results(limit)
    }

    pub fn last_persistence_error(&self) -> Option<String> {
        self.last_persistence_error
            .lock()
            .map(|slot| slot.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn compute_and_store(
        &self,
        key: String,
        baseline: &BaselineState,
        scenario: &ScenarioParameters,
        source_kind: BaselineSourceKind,
    ) -> Result<ScenarioOutcome, ServiceError> {
        // Computed outside the lock; concurrent misses for one key both run
        // and the later insert wins.
        let mut result = self.pipeline.run_at(baseline, scenario, self.clock.now())?;
        result.metadata.baseline_source = source_kind;
        let result = Arc::new(result);
        self.lock_cache()?.set(key, Arc::clone(&result));
        self.archive_if_enabled(&result);

        Ok(ScenarioOutcome {
            result,
            cache_hit: false,
        })
    }

    fn archive_if_enabled(&self, result: &SimulationResult) {
        let Some(archive) = self.archive.as_ref() else {
            return;
        };

        let outcome = match archive.lock() {
            Ok(mut store) => store.persist_result(result).map_err(|err| err.to_string()),
            Err(_) => Err("archive lock poisoned".to_string()),
        };

        let mut slot = self
            .last_persistence_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match outcome {
            Ok(()) => *slot = None,
            Err(message) => {
                warn!(scenario_id = %result.scenario_id, error = %message, "failed to archive result");
                *slot = Some(message);
            }
        }
    }

    fn lock_cache(&self) -> Result<MutexGuard<'_, ResultCache>, ServiceError> {
        self.cache
            .lock()
            .map_err(|_| ServiceError::CacheUnavailable("cache lock poisoned".to_string()))
    }
}
