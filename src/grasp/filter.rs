//! Collision filtering of grasp candidates.
//!
//! Given an object's pose in an arranged scene and its precomputed grasp
//! set, keep the planner-successful grasps, cap them, compose each into
//! scene coordinates and discard the ones whose gripper placement
//! collides with the scene.

use tracing::warn;

use crate::engine::{CollisionOracle, SceneHandle};
use crate::pose::Pose;
use crate::scene::MeshRef;

use super::GraspSet;

/// Returns the collision-free grasps for one object, in scene
/// coordinates.
///
/// The selection is order-preserving throughout: planner-successful
/// grasps are kept in their original order, truncated to the first `cap`
/// (a truncation, not a quality ranking), and survivors come back in the
/// same relative order. A failed collision query discards only the grasp
/// being tested.
///
/// An empty result is a normal outcome, not an error.
pub async fn filter_collision_free(
    object_pose: &Pose,
    grasps: &GraspSet,
    cap: usize,
    gripper: &MeshRef,
    scene: &SceneHandle,
    oracle: &dyn CollisionOracle,
) -> Vec<Pose> {
    let mut survivors = Vec::new();

    for grasp in grasps.successful().take(cap) {
        let world = object_pose.compose(grasp);
        match oracle.in_collision(scene, gripper, &world).await {
            Ok(true) => {}
            Ok(false) => survivors.push(world),
            Err(e) => {
                warn!(scene = scene.as_str(), error = %e, "collision query failed, discarding grasp");
            }
        }
    }

    survivors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollisionError;
    use async_trait::async_trait;

    /// Oracle whose answer is a function of the queried transform.
    struct FnOracle<F>(F);

    #[async_trait]
    impl<F> CollisionOracle for FnOracle<F>
    where
        F: Fn(&Pose) -> Result<bool, CollisionError> + Send + Sync,
    {
        async fn in_collision(
            &self,
            _scene: &SceneHandle,
            _mesh: &MeshRef,
            transform: &Pose,
        ) -> Result<bool, CollisionError> {
            (self.0)(transform)
        }
    }

    fn grasp_row(count: usize) -> Vec<Pose> {
        (0..count)
            .map(|i| Pose::from_translation(i as f64, 0.0, 0.0))
            .collect()
    }

    fn scene() -> SceneHandle {
        SceneHandle::new("scene-test")
    }

    fn gripper() -> MeshRef {
        MeshRef::new("/m/gripper.stl", 1.0)
    }

    #[tokio::test]
    async fn test_cap_truncates_in_original_order() {
        // 20 successful, all collision-free, cap 5: exactly the first 5.
        let set = GraspSet::try_new("mug", grasp_row(20), vec![true; 20]).expect("set");
        let oracle = FnOracle(|_: &Pose| Ok(false));

        let free = filter_collision_free(
            &Pose::identity(),
            &set,
            5,
            &gripper(),
            &scene(),
            &oracle,
        )
        .await;

        let xs: Vec<f64> = free.iter().map(|p| p.translation()[0]).collect();
        assert_eq!(xs, [0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[tokio::test]
    async fn test_success_mask_applies_before_cap() {
        let success: Vec<bool> = (0..10).map(|i| i % 2 == 1).collect();
        let set = GraspSet::try_new("mug", grasp_row(10), success).expect("set");
        let oracle = FnOracle(|_: &Pose| Ok(false));

        let free = filter_collision_free(
            &Pose::identity(),
            &set,
            3,
            &gripper(),
            &scene(),
            &oracle,
        )
        .await;

        // First three odd-indexed grasps, not the first three overall.
        let xs: Vec<f64> = free.iter().map(|p| p.translation()[0]).collect();
        assert_eq!(xs, [1.0, 3.0, 5.0]);
    }

    #[tokio::test]
    async fn test_grasps_compose_with_object_pose() {
        let set = GraspSet::try_new("mug", grasp_row(2), vec![true; 2]).expect("set");
        let oracle = FnOracle(|_: &Pose| Ok(false));
        let object_pose = Pose::from_translation(10.0, 0.0, 0.0);

        let free =
            filter_collision_free(&object_pose, &set, 20, &gripper(), &scene(), &oracle).await;

        let xs: Vec<f64> = free.iter().map(|p| p.translation()[0]).collect();
        assert_eq!(xs, [10.0, 11.0]);
    }

    #[tokio::test]
    async fn test_colliding_grasps_are_dropped() {
        let set = GraspSet::try_new("mug", grasp_row(4), vec![true; 4]).expect("set");
        // Everything past x=1 collides.
        let oracle = FnOracle(|p: &Pose| Ok(p.translation()[0] > 1.0));

        let free = filter_collision_free(
            &Pose::identity(),
            &set,
            20,
            &gripper(),
            &scene(),
            &oracle,
        )
        .await;

        let xs: Vec<f64> = free.iter().map(|p| p.translation()[0]).collect();
        assert_eq!(xs, [0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_all_failed_flags_yield_empty_result() {
        let set = GraspSet::try_new("mug", grasp_row(8), vec![false; 8]).expect("set");
        let oracle = FnOracle(|_: &Pose| Ok(false));

        let free = filter_collision_free(
            &Pose::identity(),
            &set,
            20,
            &gripper(),
            &scene(),
            &oracle,
        )
        .await;

        assert!(free.is_empty());
    }

    #[tokio::test]
    async fn test_query_error_discards_only_that_grasp() {
        let set = GraspSet::try_new("mug", grasp_row(3), vec![true; 3]).expect("set");
        let oracle = FnOracle(|p: &Pose| {
            if p.translation()[0] == 1.0 {
                Err(CollisionError::Query("probe failed".to_string()))
            } else {
                Ok(false)
            }
        });

        let free = filter_collision_free(
            &Pose::identity(),
            &set,
            20,
            &gripper(),
            &scene(),
            &oracle,
        )
        .await;

        let xs: Vec<f64> = free.iter().map(|p| p.translation()[0]).collect();
        assert_eq!(xs, [0.0, 2.0]);
    }
}
