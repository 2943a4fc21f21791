//! The arrangement engine boundary.
//!
//! The engine is the external collaborator that turns a scene composition
//! into physically resting, non-colliding poses, answers collision
//! queries against the arranged geometry, and renders scenes. This crate
//! only consumes its contract; placement itself is never computed here.
//!
//! The contract asserted locally is narrow: an arrangement returns
//! exactly one well-formed pose per requested object, and an engine
//! failure is recoverable per scene.

pub mod client;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ArrangementError, CollisionError, VizError};
use crate::pose::Pose;
use crate::record::SceneRecord;
use crate::scene::{MeshRef, SceneComposition};
use crate::viz::GripperMarker;

pub use client::EngineClient;

/// Token identifying an arranged scene's geometry on the engine side.
///
/// Collision queries and rendering refer to the scene through this
/// handle; the geometry itself never crosses the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneHandle(String);

impl SceneHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A successfully arranged scene: the engine-side handle plus one pose
/// per composed object.
#[derive(Debug, Clone)]
pub struct ArrangedScene {
    pub scene: SceneHandle,
    pub poses: BTreeMap<String, Pose>,
}

/// Computes resting poses for a composition's objects on its support.
#[async_trait]
pub trait ArrangementEngine: Send + Sync {
    /// Arranges the composition.
    ///
    /// # Errors
    ///
    /// [`ArrangementError::Rejected`] when the engine finds no solution
    /// within its own retry budget; contract violations and transport
    /// failures map to the other variants. All are recoverable per scene.
    async fn arrange(&self, composition: &SceneComposition)
        -> Result<ArrangedScene, ArrangementError>;
}

/// Answers whether a mesh placed at a transform intersects an arranged
/// scene's geometry.
#[async_trait]
pub trait CollisionOracle: Send + Sync {
    async fn in_collision(
        &self,
        scene: &SceneHandle,
        mesh: &MeshRef,
        transform: &Pose,
    ) -> Result<bool, CollisionError>;
}

/// Renders a scene record together with gripper markers.
///
/// The gripper-marker factory (color to renderable geometry) lives behind
/// this boundary; the crate only supplies colors and transforms.
#[async_trait]
pub trait SceneViewer: Send + Sync {
    async fn show(
        &self,
        record: &SceneRecord,
        markers: &[GripperMarker],
    ) -> Result<(), VizError>;
}

/// Checks the one-pose-per-object contract on an engine response.
pub fn validate_poses(
    composition: &SceneComposition,
    poses: &BTreeMap<String, Pose>,
) -> Result<(), ArrangementError> {
    for object in &composition.objects {
        let pose = poses
            .get(&object.name)
            .ok_or_else(|| ArrangementError::MissingPose(object.name.clone()))?;
        if let Some(defect) = pose.defect() {
            return Err(ArrangementError::InvalidPose {
                name: object.name.clone(),
                detail: defect,
            });
        }
    }
    for name in poses.keys() {
        if !composition.objects.iter().any(|o| &o.name == name) {
            return Err(ArrangementError::UnexpectedPose(name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MeshRef, ObjectRecord};

    fn composition(names: &[&str]) -> SceneComposition {
        SceneComposition {
            scene_id: 0,
            objects: names
                .iter()
                .map(|n| ObjectRecord::new(*n, MeshRef::new(format!("/m/{n}.obj"), 1.0)))
                .collect(),
            support: ObjectRecord::new("table", MeshRef::new("/m/table.obj", 1.0)),
        }
    }

    fn poses_for(names: &[&str]) -> BTreeMap<String, Pose> {
        names
            .iter()
            .map(|n| (n.to_string(), Pose::identity()))
            .collect()
    }

    #[test]
    fn test_validate_accepts_exact_cover() {
        let composition = composition(&["bowl", "mug"]);
        let poses = poses_for(&["bowl", "mug"]);

        assert!(validate_poses(&composition, &poses).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_pose() {
        let composition = composition(&["bowl", "mug"]);
        let poses = poses_for(&["bowl"]);

        let err = validate_poses(&composition, &poses).expect_err("must fail");
        assert!(matches!(err, ArrangementError::MissingPose(name) if name == "mug"));
    }

    #[test]
    fn test_validate_rejects_unexpected_pose() {
        let composition = composition(&["bowl"]);
        let poses = poses_for(&["bowl", "vase"]);

        let err = validate_poses(&composition, &poses).expect_err("must fail");
        assert!(matches!(err, ArrangementError::UnexpectedPose(name) if name == "vase"));
    }

    #[test]
    fn test_validate_rejects_malformed_pose() {
        let composition = composition(&["bowl"]);
        let mut poses = poses_for(&["bowl"]);
        let mut rows = Pose::identity().to_rows();
        rows[0][0] = f64::INFINITY;
        poses.insert("bowl".to_string(), Pose::from_rows(rows));

        let err = validate_poses(&composition, &poses).expect_err("must fail");
        assert!(matches!(err, ArrangementError::InvalidPose { .. }));
    }
}
