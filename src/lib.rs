//! scene-forge: labeled tabletop scene synthesis for grasp datasets.
//!
//! This library samples reproducible scene compositions from an object
//! manifest, delegates physical placement to an external arrangement
//! engine, persists per-scene pose records, and filters precomputed
//! grasp sets down to the collision-free subset for a gripper.

// Core modules
pub mod cli;
pub mod engine;
pub mod error;
pub mod grasp;
pub mod manifest;
pub mod pipeline;
pub mod pose;
pub mod record;
pub mod scene;
pub mod viz;

// Re-export commonly used error types
pub use error::{
    ArrangementError, CollisionError, ConfigError, GraspError, ManifestError, RecordError,
    SamplerError, VizError,
};
