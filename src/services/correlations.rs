//! Correlation storage between tradable symbols and market factors.

use crate::error::{EngineError, Result};
use crate::types::{CorrelatedFactor, CorrelationRecord};
use dashmap::DashMap;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Redis key prefix for correlation records.
const REDIS_CORRELATIONS_PREFIX: &str = "factor_engine:correlations:";

/// Store for directional (symbol, factor) correlation records.
pub struct CorrelationStore {
    /// Correlation records: key = "{subject}:{factor}" (lowercased).
    records: DashMap<String, CorrelationRecord>,
    /// Redis connection for persistence.
    redis: RwLock<Option<ConnectionManager>>,
}

impl CorrelationStore {
    /// Create a new correlation store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            records: DashMap::new(),
            redis: RwLock::new(None),
        })
    }

    /// Connect to Redis for persistence.
    pub async fn connect_redis(&self, redis_url: &str) {
        match redis::Client::open(redis_url) {
            Ok(client) => match ConnectionManager::new(client).await {
                Ok(conn) => {
                    info!("CorrelationStore connected to Redis");
                    *self.redis.write().await = Some(conn);
                }
                Err(e) => {
                    warn!("Failed to connect CorrelationStore to Redis: {}", e);
                }
            },
            Err(e) => {
                warn!("Invalid Redis URL for CorrelationStore: {}", e);
            }
        }
    }

    fn store_key(subject: &str, factor: &str) -> String {
        format!("{}:{}", subject.to_lowercase(), factor.to_lowercase())
    }

    /// Upsert the correlation record for a (subject, factor) pair.
    ///
    /// Last writer wins per pair. Coefficients outside [-1, 1] are rejected,
    /// never clamped.
    pub async fn set_correlation(&self, subject: &str, factor: &str, coefficient: f64) -> Result<()> {
        if !(-1.0..=1.0).contains(&coefficient) {
            return Err(EngineError::Validation(format!(
                "correlation coefficient must be in [-1, 1], got {}",
                coefficient
            )));
        }

        let key = Self::store_key(subject, factor);
        let record = CorrelationRecord::new(subject, factor, coefficient);
        debug!(
            "Set correlation {} -> {}: {:.4}",
            record.subject_symbol, record.factor_symbol, coefficient
        );
        self.records.insert(key.clone(), record);

        self.save_record(&key).await
    }

    /// Get the stored coefficient for a pair, or 0.0 when the pair is unknown.
    ///
    /// Absence means "no evidence of relationship" and is a valid neutral
    /// default, not an error.
    pub async fn analyze_correlation(&self, subject: &str, factor: &str) -> f64 {
        let key = Self::store_key(subject, factor);

        if let Some(entry) = self.records.get(&key) {
            return entry.coefficient;
        }

        // Try to load from Redis
        self.load_record(&key).await;
        self.records.get(&key).map(|e| e.coefficient).unwrap_or(0.0)
    }

    /// Get every factor whose correlation magnitude clears `threshold`,
    /// strongest first, ties broken by factor name.
    pub fn get_correlated_factors(&self, subject: &str, threshold: f64) -> Vec<CorrelatedFactor> {
        let prefix = format!("{}:", subject.to_lowercase());

        let mut factors: Vec<CorrelatedFactor> = self
            .records
            .iter()
            .filter(|entry| {
                entry.key().starts_with(&prefix) && entry.value().coefficient.abs() >= threshold
            })
            .map(|entry| CorrelatedFactor {
                factor: entry.value().factor_symbol.clone(),
                correlation: entry.value().coefficient,
            })
            .collect();

        factors.sort_by(|a, b| {
            b.correlation
                .abs()
                .partial_cmp(&a.correlation.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.factor.cmp(&b.factor))
        });

        factors
    }

    /// Full dump of all stored correlations, keyed "SUBJECT:FACTOR".
    pub fn get_correlation_matrix(&self) -> HashMap<String, f64> {
        self.records
            .iter()
            .map(|entry| {
                let record = entry.value();
                (
                    format!("{}:{}", record.subject_symbol, record.factor_symbol),
                    record.coefficient,
                )
            })
            .collect()
    }

    /// Number of stored correlation records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Save one record to Redis. Write failures propagate to the caller.
    async fn save_record(&self, key: &str) -> Result<()> {
        // Serialize before awaiting so no map guard is held across the call
        let json = match self.records.get(key) {
            Some(entry) => serde_json::to_string(entry.value())?,
            None => return Ok(()),
        };

        let conn_guard = self.redis.read().await;
        let Some(ref conn) = *conn_guard else {
            return Ok(());
        };

        let redis_key = format!("{}{}", REDIS_CORRELATIONS_PREFIX, key);
        let mut conn = conn.clone();
        conn.set::<_, _, ()>(&redis_key, json).await?;
        Ok(())
    }

    /// Load one record from Redis. Read failures degrade to the in-memory view.
    async fn load_record(&self, key: &str) {
        let conn_guard = self.redis.read().await;
        let Some(ref conn) = *conn_guard else {
            return;
        };

        let redis_key = format!("{}{}", REDIS_CORRELATIONS_PREFIX, key);
        let mut conn = conn.clone();

        if let Ok(json) = conn.get::<_, String>(&redis_key).await {
            if let Ok(record) = serde_json::from_str::<CorrelationRecord>(&json) {
                self.records.insert(key.to_string(), record);
            }
        }
    }

    /// Load all correlation records from Redis.
    pub async fn load_all_from_redis(&self) {
        let conn_guard = self.redis.read().await;
        let Some(ref conn) = *conn_guard else {
            return;
        };

        let mut conn = conn.clone();
        let pattern = format!("{}*", REDIS_CORRELATIONS_PREFIX);

        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(&mut conn)
            .await
            .unwrap_or_default();

        let mut loaded = 0;
        for key in keys {
            if let Ok(json) = conn.get::<_, String>(&key).await {
                if let Ok(record) = serde_json::from_str::<CorrelationRecord>(&json) {
                    let store_key = key
                        .strip_prefix(REDIS_CORRELATIONS_PREFIX)
                        .unwrap_or(&key)
                        .to_string();
                    self.records.insert(store_key, record);
                    loaded += 1;
                }
            }
        }

        if loaded > 0 {
            info!("Loaded {} correlation records from Redis", loaded);
        }
    }
}

impl Default for CorrelationStore {
    fn default() -> Self {
        Self {
            records: DashMap::new(),
            redis: RwLock::new(None),
        }
    }
}
