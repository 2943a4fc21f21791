//! Precomputed grasp sets.
//!
//! A grasp set holds candidate gripper transforms for one object,
//! expressed in the object's local frame, with one success flag per
//! transform from the upstream grasp planner. Sets are loaded through
//! [`GraspSource`]; the bundled source reads one JSON file per object:
//!
//! ```json
//! { "transforms": [[[...], ...]], "success": [true, false, ...] }
//! ```

pub mod filter;

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::GraspError;
use crate::pose::Pose;

pub use filter::filter_collision_free;

/// Grasp candidates for one object, in its local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GraspSet {
    transforms: Vec<Pose>,
    success: Vec<bool>,
}

impl GraspSet {
    /// Builds a set, checking that flags and transforms line up.
    pub fn try_new(
        name: &str,
        transforms: Vec<Pose>,
        success: Vec<bool>,
    ) -> Result<Self, GraspError> {
        if transforms.len() != success.len() {
            return Err(GraspError::LengthMismatch {
                name: name.to_string(),
                transforms: transforms.len(),
                flags: success.len(),
            });
        }
        Ok(Self {
            transforms,
            success,
        })
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// The planner-successful grasps, in original order.
    pub fn successful(&self) -> impl Iterator<Item = &Pose> {
        self.transforms
            .iter()
            .zip(self.success.iter())
            .filter_map(|(t, ok)| ok.then_some(t))
    }
}

/// Loads per-object grasp sets.
pub trait GraspSource: Send + Sync {
    fn load(&self, object_name: &str) -> Result<GraspSet, GraspError>;
}

/// On-disk shape of one grasp file.
#[derive(Debug, Deserialize)]
struct GraspFile {
    transforms: Vec<Pose>,
    success: Vec<bool>,
}

/// Grasp source reading `{object_name}.json` under a root directory.
pub struct JsonGraspSource {
    root: PathBuf,
}

impl JsonGraspSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn grasp_path(&self, object_name: &str) -> PathBuf {
        self.root.join(format!("{object_name}.json"))
    }
}

impl GraspSource for JsonGraspSource {
    fn load(&self, object_name: &str) -> Result<GraspSet, GraspError> {
        let path = self.grasp_path(object_name);
        if !path.exists() {
            return Err(GraspError::NotFound(object_name.to_string()));
        }

        let bytes = fs::read(&path)?;
        let file: GraspFile = serde_json::from_slice(&bytes)?;
        GraspSet::try_new(object_name, file.transforms, file.success)
    }
}
