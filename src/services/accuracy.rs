//! Running accuracy statistics and performance weighting for indicators.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::types::{IndicatorAccuracy, PredictionOutcome};
use dashmap::DashMap;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Redis key prefix for accuracy stats.
const REDIS_ACCURACY_PREFIX: &str = "factor_engine:accuracy:";

/// Store for per-indicator accuracy stats and derived performance multipliers.
///
/// Stats are mutated only through `record_outcome`, which the prediction
/// tracker invokes once per resolution.
pub struct AccuracyScorer {
    /// Accuracy stats keyed by indicator name.
    stats: DashMap<String, IndicatorAccuracy>,
    /// Redis connection for persistence.
    redis: RwLock<Option<ConnectionManager>>,
    config: Arc<EngineConfig>,
}

impl AccuracyScorer {
    /// Create a new accuracy scorer.
    pub fn new(config: Arc<EngineConfig>) -> Arc<Self> {
        Arc::new(Self {
            stats: DashMap::new(),
            redis: RwLock::new(None),
            config,
        })
    }

    /// Connect to Redis for persistence.
    pub async fn connect_redis(&self, redis_url: &str) {
        match redis::Client::open(redis_url) {
            Ok(client) => match ConnectionManager::new(client).await {
                Ok(conn) => {
                    info!("AccuracyScorer connected to Redis");
                    *self.redis.write().await = Some(conn);
                }
                Err(e) => {
                    warn!("Failed to connect AccuracyScorer to Redis: {}", e);
                }
            },
            Err(e) => {
                warn!("Invalid Redis URL for AccuracyScorer: {}", e);
            }
        }
    }

    /// Record a resolved prediction outcome for an indicator.
    ///
    /// The increment happens under the map's entry guard, so concurrent
    /// resolutions for the same indicator cannot lose updates.
    pub async fn record_outcome(&self, indicator: &str, outcome: PredictionOutcome) -> Result<()> {
        {
            let mut entry = self
                .stats
                .entry(indicator.to_string())
                .or_insert_with(|| IndicatorAccuracy::new(indicator.to_string()));
            entry.record_outcome(outcome);
            debug!(
                "Updated accuracy for {}: {:.1}% ({} total)",
                indicator, entry.average_accuracy, entry.total_predictions
            );
        }

        self.save_stats(indicator).await
    }

    /// Get accuracy stats for an indicator.
    ///
    /// Indicators with no resolved predictions return all-zero stats; this
    /// is a normal state, not an error.
    pub async fn get_indicator_accuracy(&self, indicator: &str) -> IndicatorAccuracy {
        if let Some(entry) = self.stats.get(indicator) {
            return entry.clone();
        }

        // Try to load from Redis
        self.load_stats(indicator).await;
        self.stats
            .get(indicator)
            .map(|e| e.clone())
            .unwrap_or_else(|| IndicatorAccuracy::new(indicator.to_string()))
    }

    /// Derive the performance weight multiplier for an indicator.
    ///
    /// Below the minimum sample size the multiplier is the neutral 1.0.
    /// Above it the curve runs 0.5x at 0% accuracy through 2.0x at 100%,
    /// clamped to the configured floor and ceiling.
    pub async fn get_performance_score(&self, indicator: &str) -> f64 {
        let stats = self.get_indicator_accuracy(indicator).await;

        if stats.total_predictions < self.config.min_sample_size {
            return 1.0;
        }

        (0.5 + (stats.average_accuracy / 100.0) * 1.5)
            .clamp(self.config.performance_floor, self.config.performance_ceiling)
    }

    /// Get all tracked accuracy stats.
    pub fn all_accuracies(&self) -> Vec<IndicatorAccuracy> {
        self.stats.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Save stats for one indicator to Redis.
    async fn save_stats(&self, indicator: &str) -> Result<()> {
        // Serialize before awaiting so no map guard is held across the call
        let json = match self.stats.get(indicator) {
            Some(entry) => serde_json::to_string(entry.value())?,
            None => return Ok(()),
        };

        let conn_guard = self.redis.read().await;
        let Some(ref conn) = *conn_guard else {
            return Ok(());
        };

        let redis_key = format!("{}{}", REDIS_ACCURACY_PREFIX, indicator);
        let mut conn = conn.clone();
        conn.set::<_, _, ()>(&redis_key, json).await?;
        Ok(())
    }

    /// Load stats for one indicator from Redis.
    async fn load_stats(&self, indicator: &str) {
        let conn_guard = self.redis.read().await;
        let Some(ref conn) = *conn_guard else {
            return;
        };

        let redis_key = format!("{}{}", REDIS_ACCURACY_PREFIX, indicator);
        let mut conn = conn.clone();

        if let Ok(json) = conn.get::<_, String>(&redis_key).await {
            if let Ok(stats) = serde_json::from_str::<IndicatorAccuracy>(&json) {
                self.stats.insert(indicator.to_string(), stats);
            }
        }
    }

    /// Load all accuracy stats from Redis.
    pub async fn load_all_from_redis(&self) {
        let conn_guard = self.redis.read().await;
        let Some(ref conn) = *conn_guard else {
            return;
        };

        let mut conn = conn.clone();
        let pattern = format!("{}*", REDIS_ACCURACY_PREFIX);

        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(&mut conn)
            .await
            .unwrap_or_default();

        let mut loaded = 0;
        for key in keys {
            if let Ok(json) = conn.get::<_, String>(&key).await {
                if let Ok(stats) = serde_json::from_str::<IndicatorAccuracy>(&json) {
                    let store_key = key
                        .strip_prefix(REDIS_ACCURACY_PREFIX)
                        .unwrap_or(&key)
                        .to_string();
                    self.stats.insert(store_key, stats);
                    loaded += 1;
                }
            }
        }

        if loaded > 0 {
            info!("Loaded {} accuracy records from Redis", loaded);
        }
    }
}
