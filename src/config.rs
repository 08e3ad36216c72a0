use std::env;

/// Scoring policy configuration.
///
/// The blend weight, action thresholds and strength bands are tuning
/// constants rather than derived values, so they are all overridable
/// through environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Weight of the macro-factor leg in the combined score (0-1).
    /// The indicator leg gets `1.0 - factor_blend_weight`.
    pub factor_blend_weight: f64,
    /// Combined score above which the recommendation is Buy.
    pub buy_threshold: f64,
    /// Combined score below which the recommendation is Sell.
    pub sell_threshold: f64,
    /// Absolute score below which a recommendation is Weak.
    pub weak_band: f64,
    /// Absolute score below which a recommendation is Moderate (Strong above).
    pub moderate_band: f64,
    /// Resolved predictions required before accuracy influences weighting.
    pub min_sample_size: u32,
    /// Lower clamp for the indicator performance multiplier.
    pub performance_floor: f64,
    /// Upper clamp for the indicator performance multiplier.
    pub performance_ceiling: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            factor_blend_weight: 0.4,
            buy_threshold: 0.3,
            sell_threshold: -0.3,
            weak_band: 0.15,
            moderate_band: 0.45,
            min_sample_size: 5,
            performance_floor: 0.5,
            performance_ceiling: 2.0,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            factor_blend_weight: env::var("FACTOR_BLEND_WEIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.factor_blend_weight),
            buy_threshold: env::var("BUY_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.buy_threshold),
            sell_threshold: env::var("SELL_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sell_threshold),
            weak_band: env::var("WEAK_BAND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.weak_band),
            moderate_band: env::var("MODERATE_BAND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.moderate_band),
            min_sample_size: env::var("MIN_SAMPLE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_sample_size),
            performance_floor: env::var("PERFORMANCE_FLOOR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.performance_floor),
            performance_ceiling: env::var("PERFORMANCE_CEILING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.performance_ceiling),
        }
    }
}
