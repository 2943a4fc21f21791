//! HTTP client for the external arrangement engine.
//!
//! The engine is a service exposing three JSON endpoints:
//!
//! - `POST {base}/scenes/arrange`: place a composition, returning a
//!   scene token and one pose per object
//! - `POST {base}/collision/check`: test a mesh at a transform against
//!   an arranged scene
//! - `POST {base}/scenes/show`: render a scene record with gripper
//!   markers
//!
//! A 422 response from the arrangement endpoint means the engine gave up
//! within its own retry budget; that maps to the recoverable
//! [`ArrangementError::Rejected`]. The CLI points the client at the
//! service via `--engine-url` or the `SCENE_ENGINE_URL` environment
//! variable.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{ArrangementError, CollisionError, VizError};
use crate::pose::Pose;
use crate::record::SceneRecord;
use crate::scene::{MeshRef, ObjectRecord, SceneComposition};
use crate::viz::GripperMarker;

use super::{
    validate_poses, ArrangedScene, ArrangementEngine, CollisionOracle, SceneHandle, SceneViewer,
};

/// Arrangement and collision calls block on real physics; give them room.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Client for an arrangement engine service.
pub struct EngineClient {
    base_url: String,
    http_client: Client,
}

impl EngineClient {
    /// Creates a client for the engine at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// One mesh as the engine sees it.
#[derive(Debug, Serialize)]
struct MeshSpec {
    name: String,
    path: PathBuf,
    scale: f64,
}

impl From<&ObjectRecord> for MeshSpec {
    fn from(record: &ObjectRecord) -> Self {
        Self {
            name: record.name.clone(),
            path: record.mesh.path.clone(),
            scale: record.mesh.scale,
        }
    }
}

#[derive(Debug, Serialize)]
struct ArrangeRequest {
    objects: Vec<MeshSpec>,
    support: MeshSpec,
}

#[derive(Debug, Deserialize)]
struct ArrangeResponse {
    scene: String,
    poses: BTreeMap<String, Pose>,
}

#[derive(Debug, Serialize)]
struct CollisionRequest<'a> {
    scene: &'a SceneHandle,
    mesh: &'a MeshRef,
    transform: &'a Pose,
}

#[derive(Debug, Deserialize)]
struct CollisionResponse {
    collision: bool,
}

#[derive(Debug, Serialize)]
struct ShowRequest<'a> {
    record: &'a SceneRecord,
    markers: &'a [GripperMarker],
}

#[async_trait]
impl ArrangementEngine for EngineClient {
    async fn arrange(
        &self,
        composition: &SceneComposition,
    ) -> Result<ArrangedScene, ArrangementError> {
        let request = ArrangeRequest {
            objects: composition.objects.iter().map(MeshSpec::from).collect(),
            support: MeshSpec::from(&composition.support),
        };

        let response = self
            .http_client
            .post(self.endpoint("/scenes/arrange"))
            .json(&request)
            .send()
            .await
            .map_err(|e| ArrangementError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let reason = response.text().await.unwrap_or_default();
            return Err(ArrangementError::Rejected(reason));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArrangementError::Transport(format!(
                "engine returned {status}: {body}"
            )));
        }

        let parsed: ArrangeResponse = response
            .json()
            .await
            .map_err(|e| ArrangementError::Transport(format!("invalid response body: {e}")))?;

        validate_poses(composition, &parsed.poses)?;

        Ok(ArrangedScene {
            scene: SceneHandle::new(parsed.scene),
            poses: parsed.poses,
        })
    }
}

#[async_trait]
impl CollisionOracle for EngineClient {
    async fn in_collision(
        &self,
        scene: &SceneHandle,
        mesh: &MeshRef,
        transform: &Pose,
    ) -> Result<bool, CollisionError> {
        if let Some(defect) = transform.defect() {
            return Err(CollisionError::InvalidTransform(defect));
        }

        let request = CollisionRequest {
            scene,
            mesh,
            transform,
        };

        let response = self
            .http_client
            .post(self.endpoint("/collision/check"))
            .json(&request)
            .send()
            .await
            .map_err(|e| CollisionError::Query(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollisionError::Query(format!(
                "engine returned {status}: {body}"
            )));
        }

        let parsed: CollisionResponse = response
            .json()
            .await
            .map_err(|e| CollisionError::Query(format!("invalid response body: {e}")))?;

        Ok(parsed.collision)
    }
}

#[async_trait]
impl SceneViewer for EngineClient {
    async fn show(
        &self,
        record: &SceneRecord,
        markers: &[GripperMarker],
    ) -> Result<(), VizError> {
        let request = ShowRequest { record, markers };

        let response = self
            .http_client
            .post(self.endpoint("/scenes/show"))
            .json(&request)
            .send()
            .await
            .map_err(|e| VizError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VizError::Rejected(format!(
                "engine returned {status}: {body}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = EngineClient::new("http://localhost:9000/");
        assert_eq!(
            client.endpoint("/scenes/arrange"),
            "http://localhost:9000/scenes/arrange"
        );
    }

    #[test]
    fn test_malformed_transform_is_rejected_before_any_request() {
        let client = EngineClient::new("http://localhost:9000");
        let scene = SceneHandle::new("scene-1");
        let mesh = MeshRef::new("/m/gripper.stl", 1.0);
        let mut rows = Pose::identity().to_rows();
        rows[2][2] = f64::NAN;
        let bad = Pose::from_rows(rows);

        let result = futures::executor::block_on(client.in_collision(&scene, &mesh, &bad));

        assert!(matches!(result, Err(CollisionError::InvalidTransform(_))));
    }
}
