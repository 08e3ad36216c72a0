use crate::types::TradeAction;
use serde::{Deserialize, Serialize};

/// A macro-factor sentiment reading supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorReading {
    /// Factor symbol (e.g., "SP500", "VIX").
    pub symbol: String,
    /// Current factor value, normalized to [-1, 1].
    pub value: f64,
}

/// A technical-indicator signal reading supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorReading {
    /// Indicator name (e.g., "RSI", "MACD").
    pub name: String,
    /// Current signal value, normalized to [-1, 1].
    pub value: f64,
}

/// Per-factor detail of the factor leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorContribution {
    /// Factor symbol.
    pub factor: String,
    /// Reading value supplied by the caller.
    pub value: f64,
    /// Stored correlation used as the weight (0.0 for unknown pairs).
    pub correlation: f64,
    /// value * correlation.
    pub weighted_contribution: f64,
}

/// Per-indicator detail of the indicator leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorContribution {
    /// Indicator name.
    pub indicator: String,
    /// Reading value supplied by the caller.
    pub value: f64,
    /// Performance multiplier applied to the reading.
    pub performance_weight: f64,
    /// Historical accuracy percentage, if the indicator has resolved history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

/// Aggregated factor leg of a weighted score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorAnalysis {
    /// Sum of contributions divided by the sum of absolute weights (0 with no evidence).
    pub normalized_score: f64,
    /// Sum of absolute correlation weights.
    pub total_weight: f64,
    /// Number of factor readings analyzed.
    pub factors_analyzed: u32,
    /// Per-factor breakdown.
    pub contributions: Vec<FactorContribution>,
}

/// Aggregated indicator leg of a weighted score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorAnalysis {
    /// Sum of contributions divided by the sum of performance weights (0 with no evidence).
    pub normalized_score: f64,
    /// Sum of performance weights.
    pub total_weight: f64,
    /// Number of indicator readings analyzed.
    pub indicators_analyzed: u32,
    /// Per-indicator breakdown.
    pub contributions: Vec<IndicatorContribution>,
}

/// Qualitative strength band for a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStrength {
    Weak,
    Moderate,
    Strong,
}

impl SignalStrength {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Weak => "Weak",
            Self::Moderate => "Moderate",
            Self::Strong => "Strong",
        }
    }
}

/// Risk band, inverse to confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Buy/sell/hold recommendation derived from a weighted score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// The action: Buy, Sell, or Hold.
    pub action: TradeAction,
    /// Strength band derived from the score magnitude.
    pub strength: SignalStrength,
    /// Risk band derived from confidence.
    pub risk_level: RiskLevel,
    /// Short justifications, strongest contributors first.
    pub reasoning: Vec<String>,
}

/// Full result of a weighted-score calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedScore {
    /// Symbol this score is for.
    pub symbol: String,
    /// Macro-factor leg.
    pub factor_analysis: FactorAnalysis,
    /// Technical-indicator leg.
    pub indicator_analysis: IndicatorAnalysis,
    /// Blended normalized score in [-1, 1].
    pub weighted_score: f64,
    /// Evidence-volume confidence (0-1).
    pub confidence: f64,
    /// Derived recommendation.
    pub recommendation: Recommendation,
    /// Unix timestamp (milliseconds) when computed.
    pub timestamp: i64,
}
