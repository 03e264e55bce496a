pub mod aggregator;
pub mod catalog;
pub mod curator;
pub mod engine;
pub mod ingest;
pub mod jitter;
pub mod preferences;
pub mod providers;
pub mod scoring;
pub mod seeds;
pub mod watched;

pub use engine::{ImportOutcome, RecommendationEngine};
pub use providers::{MovieProvider, TmdbProvider};
