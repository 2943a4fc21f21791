//! Grasp visualization support.
//!
//! A [`GripperMarker`] is the transient proxy for one grasp pose: a color
//! plus a world transform. Markers are handed to the viewer boundary and
//! never persisted.

use serde::Serialize;

use crate::pose::Pose;

/// Marker color for grasps that survived collision filtering.
pub const COLLISION_FREE_COLOR: [u8; 3] = [0, 255, 0];

/// Renderable proxy for one grasp pose.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GripperMarker {
    /// RGB color the viewer renders the gripper with.
    pub color: [u8; 3],
    /// Gripper placement in scene coordinates.
    pub transform: Pose,
}

impl GripperMarker {
    /// A marker for a collision-free grasp.
    pub fn collision_free(transform: Pose) -> Self {
        Self {
            color: COLLISION_FREE_COLOR,
            transform,
        }
    }
}

/// Builds collision-free markers for a set of world-space grasps.
pub fn markers_for(grasps: &[Pose]) -> Vec<GripperMarker> {
    grasps
        .iter()
        .map(|g| GripperMarker::collision_free(*g))
        .collect()
}
