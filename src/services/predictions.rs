//! Prediction recording and one-shot resolution.

use crate::error::{EngineError, Result};
use crate::services::{AccuracyScorer, SqliteStore};
use crate::types::{PredictionOutcome, PredictionRecord, TradeAction};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Tracker for pending indicator predictions and their resolutions.
///
/// Each prediction transitions from pending to a terminal state exactly
/// once; the winning resolution is the only one that feeds the accuracy
/// scorer.
pub struct PredictionTracker {
    /// Prediction records keyed by id.
    predictions: DashMap<Uuid, PredictionRecord>,
    /// Accuracy scorer notified once per resolution.
    accuracy: Arc<AccuracyScorer>,
    /// SQLite store for permanent prediction history.
    sqlite: RwLock<Option<Arc<SqliteStore>>>,
}

impl PredictionTracker {
    /// Create a new prediction tracker.
    pub fn new(accuracy: Arc<AccuracyScorer>) -> Arc<Self> {
        Arc::new(Self {
            predictions: DashMap::new(),
            accuracy,
            sqlite: RwLock::new(None),
        })
    }

    /// Connect SQLite store for permanent persistence.
    pub async fn connect_sqlite(&self, sqlite_store: Arc<SqliteStore>) {
        info!("PredictionTracker connected to SQLite");
        *self.sqlite.write().await = Some(sqlite_store);
    }

    /// Record a new pending prediction and return its id.
    ///
    /// Accuracy stats are untouched until the prediction resolves.
    pub async fn track_indicator_prediction(
        &self,
        indicator: &str,
        symbol: &str,
        action: TradeAction,
        confidence: f64,
        price_at_prediction: f64,
        horizon: &str,
    ) -> Result<Uuid> {
        if !(0.0..=100.0).contains(&confidence) {
            return Err(EngineError::Validation(format!(
                "confidence must be in [0, 100], got {}",
                confidence
            )));
        }

        let record = PredictionRecord::new(
            indicator.to_string(),
            symbol.to_uppercase(),
            action,
            confidence,
            price_at_prediction,
            horizon.to_string(),
        );
        let id = record.id;

        if let Some(sqlite) = self.sqlite.read().await.as_ref() {
            sqlite.archive_prediction(&record)?;
        }

        self.predictions.insert(id, record);
        debug!("Tracked {} prediction {} for {}", indicator, id, symbol);

        Ok(id)
    }

    /// Resolve a pending prediction into a terminal outcome.
    ///
    /// The pending check and the transition happen under the entry guard,
    /// so concurrent resolutions racing on the same id have exactly one
    /// winner; the losers get `AlreadyResolved`.
    pub async fn update_indicator_accuracy(
        &self,
        id: Uuid,
        outcome: PredictionOutcome,
        actual_price: f64,
    ) -> Result<()> {
        let resolved = {
            let mut entry = self
                .predictions
                .get_mut(&id)
                .ok_or_else(|| EngineError::NotFound(format!("prediction {}", id)))?;

            if !entry.is_pending() {
                return Err(EngineError::AlreadyResolved(id));
            }

            entry.resolve(outcome, actual_price);
            entry.clone()
        };

        debug!(
            "Resolved prediction {} for {}: {:?}",
            id, resolved.indicator, outcome
        );

        // Exactly-once side effects: only the winning transition reaches here.
        self.accuracy
            .record_outcome(&resolved.indicator, outcome)
            .await?;

        if let Some(sqlite) = self.sqlite.read().await.as_ref() {
            sqlite.archive_prediction(&resolved)?;
        }

        Ok(())
    }

    /// Get a prediction by id.
    pub fn get_prediction(&self, id: Uuid) -> Option<PredictionRecord> {
        self.predictions.get(&id).map(|e| e.clone())
    }

    /// Get predictions for a symbol, newest first. Empty symbol returns all.
    pub fn get_predictions(&self, symbol: &str) -> Vec<PredictionRecord> {
        let symbol_upper = symbol.to_uppercase();
        let mut predictions: Vec<PredictionRecord> = self
            .predictions
            .iter()
            .filter(|entry| symbol_upper.is_empty() || entry.value().symbol == symbol_upper)
            .map(|entry| entry.value().clone())
            .collect();

        predictions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        predictions
    }

    /// Number of predictions still awaiting resolution.
    pub fn pending_count(&self) -> usize {
        self.predictions
            .iter()
            .filter(|entry| entry.value().is_pending())
            .count()
    }

    /// Load recent prediction history from SQLite on startup.
    pub async fn load_from_sqlite(&self, limit: usize) {
        let sqlite_guard = self.sqlite.read().await;
        let Some(ref sqlite) = *sqlite_guard else {
            warn!("Cannot load predictions: SQLite not connected");
            return;
        };

        let predictions = sqlite.get_all_predictions(limit);

        let mut loaded = 0;
        let mut pending = 0;
        for prediction in predictions {
            if prediction.is_pending() {
                pending += 1;
            }
            self.predictions.insert(prediction.id, prediction);
            loaded += 1;
        }

        if loaded > 0 {
            info!(
                "Loaded {} predictions from SQLite ({} pending resolution)",
                loaded, pending
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::types::PredictionStatus;

    fn tracker() -> (Arc<PredictionTracker>, Arc<AccuracyScorer>) {
        let accuracy = AccuracyScorer::new(Arc::new(EngineConfig::default()));
        (PredictionTracker::new(accuracy.clone()), accuracy)
    }

    #[tokio::test]
    async fn test_track_creates_pending_record() {
        let (tracker, _) = tracker();

        let id = tracker
            .track_indicator_prediction("RSI", "BTC", TradeAction::Buy, 75.0, 50000.0, "1d")
            .await
            .unwrap();

        let record = tracker.get_prediction(id).unwrap();
        assert_eq!(record.indicator, "RSI");
        assert_eq!(record.symbol, "BTC");
        assert_eq!(record.action, TradeAction::Buy);
        assert_eq!(record.confidence, 75.0);
        assert_eq!(record.horizon, "1d");
        assert_eq!(record.status, PredictionStatus::Pending);
    }

    #[tokio::test]
    async fn test_track_rejects_bad_confidence() {
        let (tracker, _) = tracker();

        for confidence in [-1.0, 100.5, f64::NAN] {
            let err = tracker
                .track_indicator_prediction("RSI", "BTC", TradeAction::Buy, confidence, 1.0, "1d")
                .await
                .unwrap_err();
            assert!(matches!(err, EngineError::Validation(_)));
        }

        assert_eq!(tracker.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_track_does_not_touch_accuracy() {
        let (tracker, accuracy) = tracker();

        tracker
            .track_indicator_prediction("RSI", "BTC", TradeAction::Buy, 75.0, 50000.0, "1d")
            .await
            .unwrap();

        let stats = accuracy.get_indicator_accuracy("RSI").await;
        assert_eq!(stats.total_predictions, 0);
    }

    #[tokio::test]
    async fn test_resolve_updates_record_and_accuracy() {
        let (tracker, accuracy) = tracker();

        let id = tracker
            .track_indicator_prediction("RSI", "BTC", TradeAction::Buy, 75.0, 50000.0, "1d")
            .await
            .unwrap();

        tracker
            .update_indicator_accuracy(id, PredictionOutcome::Correct, 52000.0)
            .await
            .unwrap();

        let record = tracker.get_prediction(id).unwrap();
        assert_eq!(record.status, PredictionStatus::Correct);
        assert_eq!(record.actual_price, Some(52000.0));
        assert!(record.resolved_at.is_some());

        let stats = accuracy.get_indicator_accuracy("RSI").await;
        assert_eq!(stats.total_predictions, 1);
        assert_eq!(stats.correct_predictions, 1);
    }

    #[tokio::test]
    async fn test_double_resolve_fails() {
        let (tracker, accuracy) = tracker();

        let id = tracker
            .track_indicator_prediction("RSI", "BTC", TradeAction::Sell, 60.0, 50000.0, "1w")
            .await
            .unwrap();

        tracker
            .update_indicator_accuracy(id, PredictionOutcome::Incorrect, 51000.0)
            .await
            .unwrap();

        let err = tracker
            .update_indicator_accuracy(id, PredictionOutcome::Correct, 48000.0)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::AlreadyResolved(_)));

        // Only the first resolution counted
        let stats = accuracy.get_indicator_accuracy("RSI").await;
        assert_eq!(stats.total_predictions, 1);
        assert_eq!(stats.correct_predictions, 0);
    }

    #[tokio::test]
    async fn test_resolve_unknown_id_fails() {
        let (tracker, _) = tracker();

        let err = tracker
            .update_indicator_accuracy(Uuid::new_v4(), PredictionOutcome::Correct, 1.0)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_resolutions_single_winner() {
        let (tracker, accuracy) = tracker();

        let id = tracker
            .track_indicator_prediction("RSI", "BTC", TradeAction::Buy, 75.0, 50000.0, "1d")
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let tracker = tracker.clone();
            handles.push(tokio::spawn(async move {
                tracker
                    .update_indicator_accuracy(id, PredictionOutcome::Correct, 52000.0)
                    .await
            }));
        }

        let mut wins = 0;
        let mut already_resolved = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => wins += 1,
                Err(EngineError::AlreadyResolved(_)) => already_resolved += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(already_resolved, 9);

        let stats = accuracy.get_indicator_accuracy("RSI").await;
        assert_eq!(stats.total_predictions, 1);
    }

    #[tokio::test]
    async fn test_get_predictions_filters_and_sorts() {
        let (tracker, _) = tracker();

        tracker
            .track_indicator_prediction("RSI", "BTC", TradeAction::Buy, 70.0, 1.0, "1d")
            .await
            .unwrap();
        tracker
            .track_indicator_prediction("MACD", "BTC", TradeAction::Sell, 55.0, 1.0, "1d")
            .await
            .unwrap();
        tracker
            .track_indicator_prediction("RSI", "ETH", TradeAction::Hold, 40.0, 1.0, "1w")
            .await
            .unwrap();

        assert_eq!(tracker.get_predictions("BTC").len(), 2);
        assert_eq!(tracker.get_predictions("btc").len(), 2);
        assert_eq!(tracker.get_predictions("ETH").len(), 1);
        assert_eq!(tracker.get_predictions("").len(), 3);
    }

    #[tokio::test]
    async fn test_sqlite_archive_round_trip() {
        let (tracker, _) = tracker();
        let sqlite = Arc::new(SqliteStore::new_in_memory().unwrap());
        tracker.connect_sqlite(sqlite.clone()).await;

        let id = tracker
            .track_indicator_prediction("RSI", "BTC", TradeAction::Buy, 75.0, 50000.0, "1d")
            .await
            .unwrap();
        tracker
            .update_indicator_accuracy(id, PredictionOutcome::Correct, 52000.0)
            .await
            .unwrap();

        let archived = sqlite.get_prediction(id).unwrap();
        assert_eq!(archived.action, TradeAction::Buy);
        assert_eq!(archived.confidence, 75.0);
        assert_eq!(archived.horizon, "1d");
        assert_eq!(archived.status, PredictionStatus::Correct);

        // A fresh tracker re-hydrates from the archive
        let accuracy = AccuracyScorer::new(Arc::new(EngineConfig::default()));
        let fresh = PredictionTracker::new(accuracy);
        fresh.connect_sqlite(sqlite).await;
        fresh.load_from_sqlite(500).await;
        assert!(fresh.get_prediction(id).is_some());
    }
}
