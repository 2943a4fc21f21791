//! Generation run configuration.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Default number of scenes per run.
pub const DEFAULT_NUM_SCENES: u64 = 10;

/// Default cap on grasps kept per object.
pub const DEFAULT_GRASPS_PER_OBJECT: usize = 20;

/// Configuration for one batch generation run.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Number of scenes to generate; scene indices run `0..num_scenes`.
    pub num_scenes: u64,
    /// Extra uniform scale applied to the support mesh.
    pub support_scale: f64,
    /// Cap for the grasp collision filter.
    pub grasps_per_object: usize,
    /// Run scene tasks across a worker pool instead of sequentially.
    pub parallel: bool,
    /// Worker pool size for parallel mode.
    pub num_workers: usize,
    /// Directory scene records are written to.
    pub output_dir: PathBuf,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            num_scenes: DEFAULT_NUM_SCENES,
            support_scale: 1.0,
            grasps_per_object: DEFAULT_GRASPS_PER_OBJECT,
            parallel: false,
            num_workers: num_cpus::get(),
            output_dir: PathBuf::from("./generated-scenes"),
        }
    }
}

impl GenerationConfig {
    /// Sets the scene count.
    pub fn with_num_scenes(mut self, num_scenes: u64) -> Self {
        self.num_scenes = num_scenes;
        self
    }

    /// Sets the support scale multiplier.
    pub fn with_support_scale(mut self, support_scale: f64) -> Self {
        self.support_scale = support_scale;
        self
    }

    /// Sets the per-object grasp cap.
    pub fn with_grasps_per_object(mut self, cap: usize) -> Self {
        self.grasps_per_object = cap;
        self
    }

    /// Enables or disables parallel mode.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the worker pool size.
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Sets the output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.support_scale.is_finite() || self.support_scale <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "support_scale".to_string(),
                message: format!("{} is not a positive finite scale", self.support_scale),
            });
        }
        if self.grasps_per_object == 0 {
            return Err(ConfigError::InvalidValue {
                key: "num_grasps_per_object".to_string(),
                message: "cap must be at least 1".to_string(),
            });
        }
        if self.num_workers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "num_workers".to_string(),
                message: "worker pool needs at least one worker".to_string(),
            });
        }
        Ok(())
    }
}
