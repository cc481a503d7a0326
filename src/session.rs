//! Application state for one interactive run
//!
//! A [`Session`] owns everything that outlives a single comparison: loaded
//! models, the history, and the current threshold. Handlers take it by
//! `&mut` and the engine components stay stateless.

use crate::comparison::{check_inputs, CompareConfig, ComparisonRecord};
use crate::error::{EngineError, EngineResult};
use crate::history::{HistoryStore, PointRole};
use crate::projection::fit_projection;
use crate::providers::ProviderCache;
use crate::settings::Settings;
use anyhow::Result;
use serde::Serialize;

pub struct Session {
    providers: ProviderCache,
    history: HistoryStore,
    threshold: f32,
}

impl Session {
    /// Session over the built-in model registry, sized from settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut session = Self::with_providers(ProviderCache::new()?, settings.history_capacity);
        session.set_threshold(settings.threshold)?;
        Ok(session)
    }

    pub fn with_providers(providers: ProviderCache, history_capacity: usize) -> Self {
        Self {
            providers,
            history: HistoryStore::with_capacity(history_capacity),
            threshold: crate::comparison::DEFAULT_THRESHOLD,
        }
    }

    /// Compare two texts and keep the result.
    ///
    /// Input is checked before any model is loaded. On error nothing is
    /// recorded and history is unchanged.
    pub fn run_comparison(
        &mut self,
        scraped_raw: &str,
        query_raw: &str,
        config: &CompareConfig,
    ) -> EngineResult<&ComparisonRecord> {
        check_inputs(scraped_raw, query_raw)?;
        config.validate()?;

        let handle = self.providers.get_or_load(&config.model)?;
        let record = handle.compare(scraped_raw, query_raw, config)?;
        Ok(self.history.insert(record))
    }

    /// Most recent successful comparison
    pub fn last(&self) -> Option<&ComparisonRecord> {
        self.history.latest()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f32) -> EngineResult<()> {
        if !threshold.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "threshold must be a finite number, got {}",
                threshold
            )));
        }
        self.threshold = threshold;
        Ok(())
    }

    pub fn providers(&self) -> &ProviderCache {
        &self.providers
    }

    /// Projection of the whole history
    pub fn history_map(&self) -> EngineResult<HistoryMap> {
        build_history_map(&self.history, self.history.capacity())
    }
}

/// One labelled point of the history map
#[derive(Debug, Clone, Serialize)]
pub struct MapPoint {
    pub role: PointRole,
    /// Source record index, 0 = newest
    pub age: usize,
    pub time: String,
    pub x: f32,
    pub y: f32,
    /// Belongs to the newest record
    pub latest: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryMap {
    pub model: String,
    pub points: Vec<MapPoint>,
    pub explained_variance_ratio: [f32; 2],
}

/// Project the pooled vectors of up to `limit` recent records to 2D.
///
/// Fails with [`EngineError::InsufficientData`] when fewer than three vectors
/// are available, which callers render as an empty map.
pub fn build_history_map(store: &HistoryStore, limit: usize) -> EngineResult<HistoryMap> {
    let pooled = store.pooled_points(limit);
    let vectors: Vec<&[f32]> = pooled.iter().map(|p| p.vector).collect();
    let projection = fit_projection(&vectors)?;

    let points = pooled
        .iter()
        .zip(projection.points.iter())
        .map(|(p, xy)| MapPoint {
            role: p.role,
            age: p.age,
            time: p.timestamp.format("%H:%M:%S").to_string(),
            x: xy.x,
            y: xy.y,
            latest: p.age == 0,
        })
        .collect();

    Ok(HistoryMap {
        model: store.latest().map(|r| r.model.clone()).unwrap_or_default(),
        points,
        explained_variance_ratio: projection.explained_variance_ratio,
    })
}
