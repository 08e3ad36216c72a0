use serde::{Deserialize, Serialize};

/// Stored correlation between a tradable symbol and a market factor.
///
/// The pair is directional: the coefficient describes how `factor_symbol`
/// relates to `subject_symbol`, and the reverse pair is a separate record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationRecord {
    /// Symbol being analyzed (e.g., "AAPL").
    pub subject_symbol: String,
    /// Macro or technical factor symbol (e.g., "SP500", "VIX").
    pub factor_symbol: String,
    /// Correlation coefficient in [-1, 1]. Sign is direction, magnitude is strength.
    pub coefficient: f64,
    /// Unix timestamp (milliseconds) of the last write.
    pub updated_at: i64,
}

impl CorrelationRecord {
    /// Create a new record stamped with the current time.
    pub fn new(subject_symbol: &str, factor_symbol: &str, coefficient: f64) -> Self {
        Self {
            subject_symbol: subject_symbol.to_uppercase(),
            factor_symbol: factor_symbol.to_uppercase(),
            coefficient,
            updated_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// A factor that cleared a correlation-strength threshold for some symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelatedFactor {
    /// Factor symbol.
    pub factor: String,
    /// Stored correlation coefficient.
    pub correlation: f64,
}
