//! Market factor correlation and accuracy-weighted scoring engine.
//!
//! Stores directional symbol/factor correlations, tracks the resolution
//! history of indicator predictions, and blends both evidence sources into
//! a normalized buy/sell/hold recommendation with confidence and risk bands.
//!
//! The components are constructed explicitly and wired by reference:
//!
//! ```no_run
//! use std::sync::Arc;
//! use factor_engine::config::EngineConfig;
//! use factor_engine::services::{
//!     AccuracyScorer, CorrelationStore, PredictionTracker, WeightedScoringEngine,
//! };
//!
//! let config = Arc::new(EngineConfig::from_env());
//! let correlations = CorrelationStore::new();
//! let accuracy = AccuracyScorer::new(config.clone());
//! let tracker = PredictionTracker::new(accuracy.clone());
//! let engine = WeightedScoringEngine::new(correlations, accuracy, config);
//! # let _ = (tracker, engine);
//! ```

pub mod config;
pub mod error;
pub mod services;
pub mod types;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use services::{
    AccuracyScorer, CorrelationStore, PredictionTracker, SqliteStore, WeightedScoringEngine,
};
pub use types::*;
