//! Fetch/cache service.
//!
//! Returns the cached entities for a year or asks the generator for them.
//! Every failure degrades to [`HistoryData::fallback`]; callers never see an
//! error from this layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use tokio::sync::RwLock;
use tracing::Instrument;

use crate::cache::{CacheStats, HistoryCache};
use crate::generator::{GeminiGenerator, GenerationRequest, HistoryGenerator};
use crate::types::config::Config;
use crate::types::history::HistoryData;

/// Cache counters plus the insertion time of one year.
#[derive(Debug, Clone)]
pub struct CacheStatus {
    pub stats: CacheStats,
    pub cached_at: Option<DateTime<Utc>>,
}

/// Year-keyed fetch service in front of a [`HistoryGenerator`].
pub struct HistoryService {
    generator: Arc<dyn HistoryGenerator>,
    cache: RwLock<HistoryCache>,
}

impl HistoryService {
    /// Creates a service in front of `generator`.
    pub fn new(generator: Arc<dyn HistoryGenerator>) -> Self {
        Self {
            generator,
            cache: RwLock::new(HistoryCache::new()),
        }
    }

    /// Creates a service backed by the configured Gemini model.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(GeminiGenerator::from_config(&config.gemini)))
    }

    /// Name of the underlying generator.
    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Returns the entities for `year`, from cache when possible.
    ///
    /// Successful generations are cached before being returned; fallbacks are
    /// not, so a later call for the same year tries again.
    pub async fn fetch_historical_data(&self, year: i32) -> Arc<HistoryData> {
        if let Some(cached) = self.cache.read().await.get(year) {
            tracing::debug!(year, "Cache hit");
            return cached;
        }
        tracing::debug!(year, "Cache miss");

        let request = GenerationRequest::new(year);
        let span = tracing::info_span!(
            "generate",
            request_id = %request.request_id,
            generator = self.generator.name(),
            year
        );

        match self.generator.generate(&request).instrument(span).await {
            Ok(data) => {
                if data.year != year {
                    tracing::warn!(
                        year,
                        returned_year = data.year,
                        "Generator answered for a different year"
                    );
                }
                let entities = data.entities.len();
                let stored = self.cache.write().await.insert(year, data);
                tracing::info!(year, entities, "Historical data cached");
                stored
            }
            Err(e) => {
                tracing::error!(year, error = %e, "Error fetching historical data");
                Arc::new(HistoryData::fallback(year))
            }
        }
    }

    /// Whether `year` is already cached.
    pub async fn is_cached(&self, year: i32) -> bool {
        self.cache.read().await.contains(year)
    }

    /// Cached years in ascending order.
    pub async fn cached_years(&self) -> Vec<i32> {
        self.cache.read().await.years()
    }

    /// Hit/miss counters and size of the cache.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    /// Cache status for a render loop that cannot await.
    ///
    /// Returns `None` while a write holds the lock.
    pub fn try_cache_status(&self, year: i32) -> Option<CacheStatus> {
        let cache = self.cache.try_read().ok()?;
        Some(CacheStatus {
            stats: cache.stats(),
            cached_at: cache.cached_at(year),
        })
    }
}
