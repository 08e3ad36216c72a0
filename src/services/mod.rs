pub mod accuracy;
pub mod correlations;
pub mod predictions;
pub mod scoring;
pub mod sqlite_store;

pub use accuracy::AccuracyScorer;
pub use correlations::CorrelationStore;
pub use predictions::PredictionTracker;
pub use scoring::WeightedScoringEngine;
pub use sqlite_store::SqliteStore;
