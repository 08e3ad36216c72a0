//! Integration tests for the end-to-end weighted scoring flow.

use factor_engine::{
    AccuracyScorer, CorrelationStore, EngineConfig, FactorReading, IndicatorReading,
    PredictionOutcome, PredictionTracker, RiskLevel, SignalStrength, TradeAction,
    WeightedScoringEngine,
};
use std::sync::Arc;

struct Fixture {
    correlations: Arc<CorrelationStore>,
    tracker: Arc<PredictionTracker>,
    engine: Arc<WeightedScoringEngine>,
}

fn setup() -> Fixture {
    let config = Arc::new(EngineConfig::default());
    let correlations = CorrelationStore::new();
    let accuracy = AccuracyScorer::new(config.clone());
    let tracker = PredictionTracker::new(accuracy.clone());
    let engine = WeightedScoringEngine::new(correlations.clone(), accuracy, config);

    Fixture {
        correlations,
        tracker,
        engine,
    }
}

fn factor(symbol: &str, value: f64) -> FactorReading {
    FactorReading {
        symbol: symbol.to_string(),
        value,
    }
}

fn indicator(name: &str, value: f64) -> IndicatorReading {
    IndicatorReading {
        name: name.to_string(),
        value,
    }
}

#[tokio::test]
async fn test_no_evidence_returns_neutral_hold() {
    let fx = setup();

    let score = fx.engine.calculate_weighted_score("AAPL", &[], &[]).await;

    assert_eq!(score.weighted_score, 0.0);
    assert_eq!(score.confidence, 0.0);
    assert_eq!(score.recommendation.action, TradeAction::Hold);
    assert_eq!(score.recommendation.risk_level, RiskLevel::High);
}

#[tokio::test]
async fn test_bullish_evidence_produces_buy() {
    let fx = setup();
    fx.correlations
        .set_correlation("AAPL", "SP500", 0.85)
        .await
        .unwrap();
    fx.correlations
        .set_correlation("AAPL", "NASDAQ", 0.92)
        .await
        .unwrap();

    let score = fx
        .engine
        .calculate_weighted_score(
            "AAPL",
            &[factor("SP500", 0.9), factor("NASDAQ", 0.8)],
            &[indicator("RSI", 0.7), indicator("MACD", 0.6)],
        )
        .await;

    assert!(score.weighted_score > 0.3);
    assert_eq!(score.recommendation.action, TradeAction::Buy);
    assert!(matches!(
        score.recommendation.strength,
        SignalStrength::Moderate | SignalStrength::Strong
    ));
    assert!(!score.recommendation.reasoning.is_empty());
}

#[tokio::test]
async fn test_bearish_evidence_produces_sell() {
    let fx = setup();
    fx.correlations
        .set_correlation("TSLA", "SP500", 0.8)
        .await
        .unwrap();

    let score = fx
        .engine
        .calculate_weighted_score(
            "TSLA",
            &[factor("SP500", -0.9)],
            &[indicator("RSI", -0.8), indicator("MACD", -0.7)],
        )
        .await;

    assert!(score.weighted_score < -0.3);
    assert_eq!(score.recommendation.action, TradeAction::Sell);
}

#[tokio::test]
async fn test_negative_correlation_inverts_contribution() {
    let fx = setup();
    fx.correlations
        .set_correlation("AAPL", "VIX", -0.9)
        .await
        .unwrap();

    // Rising fear index with negative correlation pushes the score down
    let score = fx
        .engine
        .calculate_weighted_score("AAPL", &[factor("VIX", 1.0)], &[])
        .await;

    assert!(score.factor_analysis.normalized_score < 0.0);
    assert!(score.weighted_score < 0.0);
}

#[tokio::test]
async fn test_indicator_track_record_shifts_the_blend() {
    let fx = setup();

    // Give RSI a proven track record, MACD a losing one
    for _ in 0..6 {
        let id = fx
            .tracker
            .track_indicator_prediction("RSI", "BTC", TradeAction::Buy, 80.0, 50000.0, "1d")
            .await
            .unwrap();
        fx.tracker
            .update_indicator_accuracy(id, PredictionOutcome::Correct, 51000.0)
            .await
            .unwrap();

        let id = fx
            .tracker
            .track_indicator_prediction("MACD", "BTC", TradeAction::Sell, 70.0, 50000.0, "1d")
            .await
            .unwrap();
        fx.tracker
            .update_indicator_accuracy(id, PredictionOutcome::Incorrect, 51000.0)
            .await
            .unwrap();
    }

    // Conflicting signals of equal magnitude: the proven indicator wins
    let score = fx
        .engine
        .calculate_weighted_score("BTC", &[], &[indicator("RSI", 0.8), indicator("MACD", -0.8)])
        .await;

    assert!(score.indicator_analysis.normalized_score > 0.0);
    assert!(score.weighted_score > 0.0);

    let rsi = &score.indicator_analysis.contributions[0];
    let macd = &score.indicator_analysis.contributions[1];
    assert_eq!(rsi.accuracy, Some(100.0));
    assert_eq!(macd.accuracy, Some(0.0));
    assert!(rsi.performance_weight > macd.performance_weight);
}

#[tokio::test]
async fn test_stale_reads_tolerated_during_writes() {
    let fx = setup();
    fx.correlations
        .set_correlation("AAPL", "SP500", 0.5)
        .await
        .unwrap();

    // Concurrent reads and writes: every observed score must be coherent
    // with either the old or the new coefficient, never an error.
    let writer = {
        let correlations = fx.correlations.clone();
        tokio::spawn(async move {
            for i in 0..50 {
                let c = if i % 2 == 0 { 0.5 } else { 0.9 };
                correlations.set_correlation("AAPL", "SP500", c).await.unwrap();
            }
        })
    };

    for _ in 0..50 {
        let score = fx
            .engine
            .calculate_weighted_score("AAPL", &[factor("SP500", 1.0)], &[])
            .await;
        let normalized = score.factor_analysis.normalized_score;
        assert!((normalized - 1.0).abs() < 1e-9 || normalized == 0.0);
    }

    writer.await.unwrap();
}

#[tokio::test]
async fn test_result_serializes_camel_case() {
    let fx = setup();
    fx.correlations
        .set_correlation("AAPL", "SP500", 0.85)
        .await
        .unwrap();

    let score = fx
        .engine
        .calculate_weighted_score("AAPL", &[factor("SP500", 0.9)], &[indicator("RSI", 0.5)])
        .await;

    let json = serde_json::to_value(&score).unwrap();
    assert!(json.get("factorAnalysis").is_some());
    assert!(json.get("indicatorAnalysis").is_some());
    assert!(json.get("weightedScore").is_some());
    assert!(json["factorAnalysis"].get("normalizedScore").is_some());
    assert_eq!(json["recommendation"]["action"], "buy");
}
