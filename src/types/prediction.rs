use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trade action attached to a prediction or recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl TradeAction {
    /// Parse from string. Anything outside the closed set is rejected.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "buy" => Some(Self::Buy),
            "sell" => Some(Self::Sell),
            "hold" => Some(Self::Hold),
            _ => None,
        }
    }

    /// Stable string form used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Hold => "hold",
        }
    }

    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::Hold => "Hold",
        }
    }
}

/// Outcome of a resolved prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionOutcome {
    Correct,
    Incorrect,
}

impl PredictionOutcome {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "correct" => Some(Self::Correct),
            "incorrect" => Some(Self::Incorrect),
            _ => None,
        }
    }

    /// Stable string form used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
        }
    }
}

/// Lifecycle state of a prediction. Pending is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Pending,
    Correct,
    Incorrect,
}

impl PredictionStatus {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "correct" => Some(Self::Correct),
            "incorrect" => Some(Self::Incorrect),
            _ => None,
        }
    }

    /// Stable string form used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
        }
    }
}

impl From<PredictionOutcome> for PredictionStatus {
    fn from(outcome: PredictionOutcome) -> Self {
        match outcome {
            PredictionOutcome::Correct => Self::Correct,
            PredictionOutcome::Incorrect => Self::Incorrect,
        }
    }
}

/// A recorded indicator prediction awaiting or holding its resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    /// Unique prediction ID.
    pub id: Uuid,
    /// Indicator that made the prediction (e.g., "RSI", "MACD").
    pub indicator: String,
    /// Symbol this prediction is for.
    pub symbol: String,
    /// Predicted action.
    pub action: TradeAction,
    /// Confidence at prediction time (0-100).
    pub confidence: f64,
    /// Price when the prediction was made.
    pub price_at_prediction: f64,
    /// Caller-defined time bucket label (e.g., "1d"). Opaque to the engine.
    pub horizon: String,
    /// Current lifecycle state.
    pub status: PredictionStatus,
    /// Observed price at resolution time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_price: Option<f64>,
    /// Unix timestamp (milliseconds) of resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<i64>,
    /// Unix timestamp (milliseconds) when the prediction was made.
    pub created_at: i64,
}

impl PredictionRecord {
    /// Create a new pending prediction.
    pub fn new(
        indicator: String,
        symbol: String,
        action: TradeAction,
        confidence: f64,
        price_at_prediction: f64,
        horizon: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            indicator,
            symbol,
            action,
            confidence,
            price_at_prediction,
            horizon,
            status: PredictionStatus::Pending,
            actual_price: None,
            resolved_at: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// True while the prediction has not reached a terminal state.
    pub fn is_pending(&self) -> bool {
        self.status == PredictionStatus::Pending
    }

    /// Move the record to its terminal state. Callers must check
    /// `is_pending` first; the transition is one-way.
    pub fn resolve(&mut self, outcome: PredictionOutcome, actual_price: f64) {
        self.status = outcome.into();
        self.actual_price = Some(actual_price);
        self.resolved_at = Some(chrono::Utc::now().timestamp_millis());
    }
}

/// Running accuracy statistics for a single indicator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorAccuracy {
    /// Indicator name.
    pub indicator: String,
    /// Total resolved predictions.
    pub total_predictions: u32,
    /// Resolved predictions that were correct.
    pub correct_predictions: u32,
    /// Accuracy percentage: correct / total * 100 (0 when no resolutions).
    pub average_accuracy: f64,
    /// Unix timestamp (milliseconds) when last updated.
    pub last_updated: i64,
}

impl IndicatorAccuracy {
    /// Create zeroed stats for an indicator.
    pub fn new(indicator: String) -> Self {
        Self {
            indicator,
            total_predictions: 0,
            correct_predictions: 0,
            average_accuracy: 0.0,
            last_updated: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Record a resolved prediction outcome.
    pub fn record_outcome(&mut self, outcome: PredictionOutcome) {
        self.total_predictions += 1;
        if outcome == PredictionOutcome::Correct {
            self.correct_predictions += 1;
        }
        self.average_accuracy = if self.total_predictions > 0 {
            (self.correct_predictions as f64 / self.total_predictions as f64) * 100.0
        } else {
            0.0
        };
        self.last_updated = chrono::Utc::now().timestamp_millis();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_action_parsing() {
        assert_eq!(TradeAction::from_str("buy"), Some(TradeAction::Buy));
        assert_eq!(TradeAction::from_str("SELL"), Some(TradeAction::Sell));
        assert_eq!(TradeAction::from_str("Hold"), Some(TradeAction::Hold));
        assert_eq!(TradeAction::from_str("short"), None);
        assert_eq!(TradeAction::from_str(""), None);
    }

    #[test]
    fn test_status_from_outcome() {
        assert_eq!(
            PredictionStatus::from(PredictionOutcome::Correct),
            PredictionStatus::Correct
        );
        assert_eq!(
            PredictionStatus::from(PredictionOutcome::Incorrect),
            PredictionStatus::Incorrect
        );
    }

    #[test]
    fn test_prediction_starts_pending() {
        let record = PredictionRecord::new(
            "RSI".to_string(),
            "BTC".to_string(),
            TradeAction::Buy,
            75.0,
            50000.0,
            "1d".to_string(),
        );
        assert!(record.is_pending());
        assert!(record.actual_price.is_none());
        assert!(record.resolved_at.is_none());
    }

    #[test]
    fn test_prediction_resolve() {
        let mut record = PredictionRecord::new(
            "MACD".to_string(),
            "ETH".to_string(),
            TradeAction::Sell,
            60.0,
            3000.0,
            "1w".to_string(),
        );
        record.resolve(PredictionOutcome::Correct, 2800.0);
        assert_eq!(record.status, PredictionStatus::Correct);
        assert_eq!(record.actual_price, Some(2800.0));
        assert!(record.resolved_at.is_some());
        assert!(!record.is_pending());
    }

    #[test]
    fn test_accuracy_running_average() {
        let mut stats = IndicatorAccuracy::new("RSI".to_string());
        assert_eq!(stats.average_accuracy, 0.0);

        stats.record_outcome(PredictionOutcome::Correct);
        assert_eq!(stats.average_accuracy, 100.0);

        stats.record_outcome(PredictionOutcome::Incorrect);
        assert_eq!(stats.total_predictions, 2);
        assert_eq!(stats.correct_predictions, 1);
        assert_eq!(stats.average_accuracy, 50.0);
    }
}
