//! Batch generation pipeline.
//!
//! Ties the sampler, the arrangement engine and the record writer
//! together into per-scene tasks, sequentially or across a worker pool.

pub mod config;
pub mod driver;

pub use config::GenerationConfig;
pub use driver::{BatchDriver, BatchSummary, SceneArtifact, SceneError, SceneOutcome};
