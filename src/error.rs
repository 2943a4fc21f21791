//! Error types for scene-forge operations.
//!
//! Defines error types for the major subsystems:
//! - Configuration and CLI validation
//! - Object manifest loading
//! - Scene composition sampling
//! - Arrangement engine calls
//! - Collision queries and grasp filtering
//! - Scene record persistence

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while validating the run configuration.
///
/// Configuration errors are fatal: they are reported before any scene is
/// generated and map to a non-zero process exit.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Path does not exist: {0}")]
    MissingPath(PathBuf),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Missing required setting: {0}")]
    MissingSetting(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading an object manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Unsupported manifest format for '{path}': {detail}")]
    UnsupportedFormat { path: PathBuf, detail: String },

    #[error("Manifest '{0}' contains no objects")]
    Empty(PathBuf),

    #[error("Object name '{0}' is reserved for the record format")]
    ReservedName(String),

    #[error("Invalid scale {scale} for object '{name}': must be finite and positive")]
    InvalidScale { name: String, scale: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the scene composition sampler.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// The object pool is too small to compose a scene. The driver skips
    /// the scene and logs the skip; it never clamps silently.
    #[error(
        "Insufficient objects to compose a scene: pool has {available}, need at least {minimum}"
    )]
    InsufficientObjects { available: usize, minimum: usize },
}

/// Errors raised at the arrangement engine boundary.
#[derive(Debug, Error)]
pub enum ArrangementError {
    /// The engine could not place the requested objects within its own
    /// retry budget. Recoverable: the affected scene is skipped.
    #[error("Engine rejected the arrangement: {0}")]
    Rejected(String),

    /// The engine response violated the one-pose-per-object contract.
    #[error("Engine returned no pose for object '{0}'")]
    MissingPose(String),

    #[error("Engine returned a pose for unknown object '{0}'")]
    UnexpectedPose(String),

    #[error("Engine transport error: {0}")]
    Transport(String),

    #[error("Engine returned an invalid pose for '{name}': {detail}")]
    InvalidPose { name: String, detail: String },
}

/// Errors raised by collision queries.
///
/// A collision error is fatal only for the single grasp being tested; the
/// filter logs it, discards that grasp and continues.
#[derive(Debug, Error)]
pub enum CollisionError {
    #[error("Malformed transform: {0}")]
    InvalidTransform(String),

    #[error("Collision query failed: {0}")]
    Query(String),
}

/// Errors raised while loading grasp sets.
#[derive(Debug, Error)]
pub enum GraspError {
    #[error("No grasp set found for object '{0}'")]
    NotFound(String),

    #[error("Grasp set for '{name}' has {transforms} transforms but {flags} success flags")]
    LengthMismatch {
        name: String,
        transforms: usize,
        flags: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while persisting or reading scene records.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to persist record for scene {scene_id}: {detail}")]
    PersistFailed { scene_id: u64, detail: String },

    #[error("Record '{path}' is malformed: {detail}")]
    Malformed { path: PathBuf, detail: String },
}

/// Errors raised by the visualization boundary.
#[derive(Debug, Error)]
pub enum VizError {
    #[error("Viewer transport error: {0}")]
    Transport(String),

    #[error("Viewer rejected the scene: {0}")]
    Rejected(String),
}
