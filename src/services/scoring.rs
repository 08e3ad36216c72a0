//! Composite scoring across macro factors and technical indicators.

use crate::config::EngineConfig;
use crate::services::{AccuracyScorer, CorrelationStore};
use crate::types::{
    FactorAnalysis, FactorContribution, FactorReading, IndicatorAnalysis, IndicatorContribution,
    IndicatorReading, Recommendation, RiskLevel, SignalStrength, TradeAction, WeightedScore,
};
use std::sync::Arc;
use tracing::debug;

/// Orchestrator combining correlation evidence and indicator track records
/// into a single weighted recommendation.
///
/// Reads are snapshot reads: a concurrently updated correlation or accuracy
/// record may or may not be visible, which is an accepted trade-off.
pub struct WeightedScoringEngine {
    correlations: Arc<CorrelationStore>,
    accuracy: Arc<AccuracyScorer>,
    config: Arc<EngineConfig>,
}

impl WeightedScoringEngine {
    /// Create a new scoring engine over the given stores.
    pub fn new(
        correlations: Arc<CorrelationStore>,
        accuracy: Arc<AccuracyScorer>,
        config: Arc<EngineConfig>,
    ) -> Arc<Self> {
        Arc::new(Self {
            correlations,
            accuracy,
            config,
        })
    }

    /// Compute the blended weighted score for a symbol.
    ///
    /// Pure read: consults the correlation store and accuracy scorer but
    /// mutates nothing.
    pub async fn calculate_weighted_score(
        &self,
        symbol: &str,
        market_factors: &[FactorReading],
        technical_indicators: &[IndicatorReading],
    ) -> WeightedScore {
        let factor_analysis = self.analyze_factors(symbol, market_factors).await;
        let indicator_analysis = self.analyze_indicators(technical_indicators).await;

        let alpha = self.config.factor_blend_weight;
        let weighted_score = alpha * factor_analysis.normalized_score
            + (1.0 - alpha) * indicator_analysis.normalized_score;

        let confidence = Self::confidence(&factor_analysis, &indicator_analysis);
        let recommendation =
            self.build_recommendation(weighted_score, confidence, &factor_analysis, &indicator_analysis);

        debug!(
            "Scored {}: {:.3} (confidence {:.2}, {:?})",
            symbol, weighted_score, confidence, recommendation.action
        );

        WeightedScore {
            symbol: symbol.to_uppercase(),
            factor_analysis,
            indicator_analysis,
            weighted_score,
            confidence,
            recommendation,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Weight each factor reading by its stored correlation.
    async fn analyze_factors(&self, symbol: &str, factors: &[FactorReading]) -> FactorAnalysis {
        let mut contributions = Vec::with_capacity(factors.len());
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for factor in factors {
            let correlation = self
                .correlations
                .analyze_correlation(symbol, &factor.symbol)
                .await;
            let weighted_contribution = factor.value * correlation;

            weighted_sum += weighted_contribution;
            total_weight += correlation.abs();

            contributions.push(FactorContribution {
                factor: factor.symbol.to_uppercase(),
                value: factor.value,
                correlation,
                weighted_contribution,
            });
        }

        let normalized_score = if total_weight > 0.0 {
            weighted_sum / total_weight
        } else {
            // No correlation evidence at all: neutral, not an error
            0.0
        };

        FactorAnalysis {
            normalized_score,
            total_weight,
            factors_analyzed: factors.len() as u32,
            contributions,
        }
    }

    /// Weight each indicator reading by its historical performance multiplier.
    async fn analyze_indicators(&self, indicators: &[IndicatorReading]) -> IndicatorAnalysis {
        let mut contributions = Vec::with_capacity(indicators.len());
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for indicator in indicators {
            let performance_weight = self.accuracy.get_performance_score(&indicator.name).await;
            let stats = self.accuracy.get_indicator_accuracy(&indicator.name).await;
            let accuracy = (stats.total_predictions > 0).then_some(stats.average_accuracy);

            weighted_sum += indicator.value * performance_weight;
            total_weight += performance_weight;

            contributions.push(IndicatorContribution {
                indicator: indicator.name.clone(),
                value: indicator.value,
                performance_weight,
                accuracy,
            });
        }

        let normalized_score = if total_weight > 0.0 {
            weighted_sum / total_weight
        } else {
            0.0
        };

        IndicatorAnalysis {
            normalized_score,
            total_weight,
            indicators_analyzed: indicators.len() as u32,
            contributions,
        }
    }

    /// Evidence-volume confidence: 0 with no inputs, saturating toward 1 as
    /// analyzed inputs and total weights grow.
    fn confidence(factors: &FactorAnalysis, indicators: &IndicatorAnalysis) -> f64 {
        let evidence = (factors.factors_analyzed + indicators.indicators_analyzed) as f64;
        if evidence == 0.0 {
            return 0.0;
        }

        let weight_mass = factors.total_weight + indicators.total_weight;
        let count_term = evidence / (evidence + 4.0);
        let weight_term = weight_mass / (weight_mass + 2.0);

        ((count_term + weight_term) / 2.0).min(1.0)
    }

    /// Derive action, strength, risk and reasoning from the blended score.
    fn build_recommendation(
        &self,
        weighted_score: f64,
        confidence: f64,
        factors: &FactorAnalysis,
        indicators: &IndicatorAnalysis,
    ) -> Recommendation {
        let action = if weighted_score > self.config.buy_threshold {
            TradeAction::Buy
        } else if weighted_score < self.config.sell_threshold {
            TradeAction::Sell
        } else {
            TradeAction::Hold
        };

        let magnitude = weighted_score.abs();
        let strength = if magnitude < self.config.weak_band {
            SignalStrength::Weak
        } else if magnitude < self.config.moderate_band {
            SignalStrength::Moderate
        } else {
            SignalStrength::Strong
        };

        let risk_level = if confidence >= 0.7 {
            RiskLevel::Low
        } else if confidence >= 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        };

        let mut reasoning = Vec::new();

        if let Some(top) = factors
            .contributions
            .iter()
            .max_by(|a, b| {
                a.weighted_contribution
                    .abs()
                    .partial_cmp(&b.weighted_contribution.abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .filter(|c| c.correlation != 0.0)
        {
            reasoning.push(format!(
                "{} correlation {:.2} contributed {:+.2}",
                top.factor, top.correlation, top.weighted_contribution
            ));
        }

        if let Some(top) = indicators.contributions.iter().max_by(|a, b| {
            (a.value * a.performance_weight)
                .abs()
                .partial_cmp(&(b.value * b.performance_weight).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        }) {
            let detail = match top.accuracy {
                Some(accuracy) => format!("{:.0}% historical accuracy", accuracy),
                None => "no track record yet".to_string(),
            };
            reasoning.push(format!(
                "{} ({}) contributed {:+.2} at {:.2}x weight",
                top.indicator,
                detail,
                top.value * top.performance_weight,
                top.performance_weight
            ));
        }

        if reasoning.is_empty() {
            reasoning.push("No factor or indicator evidence available".to_string());
        }

        Recommendation {
            action,
            strength,
            risk_level,
            reasoning,
        }
    }
}
