pub mod correlation;
pub mod prediction;
pub mod scoring;

pub use correlation::{CorrelatedFactor, CorrelationRecord};
pub use prediction::{
    IndicatorAccuracy, PredictionOutcome, PredictionRecord, PredictionStatus, TradeAction,
};
pub use scoring::{
    FactorAnalysis, FactorContribution, FactorReading, IndicatorAnalysis, IndicatorContribution,
    IndicatorReading, Recommendation, RiskLevel, SignalStrength, WeightedScore,
};
