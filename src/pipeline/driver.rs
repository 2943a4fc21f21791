//! Batch scene generation.
//!
//! The driver iterates scene indices and runs sample → arrange → persist
//! for each, either sequentially or across a bounded worker pool. Every
//! scene task is independent: it seeds its own generator from the scene
//! index and writes its own record file, so no state is shared between
//! tasks and no ordering is guaranteed between scenes; only per-scene
//! determinism holds.
//!
//! Results come back as an explicit [`BatchSummary`]. Anything that runs
//! after generation (the grasp visualization pass) consumes that
//! collection; nothing reads "the most recent scene" out of band.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::engine::{ArrangementEngine, SceneHandle};
use crate::error::{ArrangementError, RecordError, SamplerError};
use crate::record::{PoseRecordWriter, SceneRecord};
use crate::scene::{ObjectPool, SceneSampler};

use super::GenerationConfig;

/// Why a single scene failed. Never aborts the batch.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Sampler(#[from] SamplerError),

    #[error(transparent)]
    Arrangement(#[from] ArrangementError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// A successfully generated scene.
#[derive(Debug, Clone)]
pub struct SceneArtifact {
    pub scene_id: u64,
    /// The persisted record, as written.
    pub record: SceneRecord,
    /// Where the record was written.
    pub record_path: PathBuf,
    /// Engine-side handle for collision queries against this scene.
    pub scene: SceneHandle,
}

/// Outcome of one scene task.
#[derive(Debug)]
pub enum SceneOutcome {
    Generated(SceneArtifact),
    Skipped { scene_id: u64, reason: SceneError },
}

impl SceneOutcome {
    pub fn scene_id(&self) -> u64 {
        match self {
            SceneOutcome::Generated(artifact) => artifact.scene_id,
            SceneOutcome::Skipped { scene_id, .. } => *scene_id,
        }
    }
}

/// Accumulated results of one batch run.
///
/// This is the driver-owned accumulator: all bookkeeping that a run needs
/// (counts, artifacts for the viz pass) lives here, never in process-wide
/// state.
#[derive(Debug)]
pub struct BatchSummary {
    outcomes: Vec<SceneOutcome>,
}

impl BatchSummary {
    pub fn outcomes(&self) -> &[SceneOutcome] {
        &self.outcomes
    }

    /// Scenes requested in this run.
    pub fn requested(&self) -> usize {
        self.outcomes.len()
    }

    pub fn generated(&self) -> usize {
        self.artifacts().count()
    }

    pub fn skipped(&self) -> usize {
        self.requested() - self.generated()
    }

    /// The generated scenes, in scene-index order.
    pub fn artifacts(&self) -> impl Iterator<Item = &SceneArtifact> {
        self.outcomes.iter().filter_map(|o| match o {
            SceneOutcome::Generated(artifact) => Some(artifact),
            SceneOutcome::Skipped { .. } => None,
        })
    }
}

/// Drives batch generation over scene indices.
pub struct BatchDriver {
    engine: Arc<dyn ArrangementEngine>,
    sampler: SceneSampler,
    writer: PoseRecordWriter,
    config: GenerationConfig,
}

impl BatchDriver {
    pub fn new(
        engine: Arc<dyn ArrangementEngine>,
        sampler: SceneSampler,
        writer: PoseRecordWriter,
        config: GenerationConfig,
    ) -> Self {
        Self {
            engine,
            sampler,
            writer,
            config,
        }
    }

    /// Generates `num_scenes` scenes from the pool.
    ///
    /// Per-scene failures are logged and recorded as skips; the batch
    /// always runs to completion in both modes.
    pub async fn run(&self, pool: &ObjectPool) -> BatchSummary {
        let outcomes = if self.config.parallel {
            self.run_parallel(pool).await
        } else {
            self.run_sequential(pool).await
        };

        let summary = BatchSummary { outcomes };
        info!(
            requested = summary.requested(),
            generated = summary.generated(),
            skipped = summary.skipped(),
            "batch complete"
        );
        summary
    }

    async fn run_sequential(&self, pool: &ObjectPool) -> Vec<SceneOutcome> {
        let mut outcomes = Vec::with_capacity(self.config.num_scenes as usize);
        for scene_id in 0..self.config.num_scenes {
            outcomes.push(self.generate_scene(scene_id, pool).await);
        }
        outcomes
    }

    async fn run_parallel(&self, pool: &ObjectPool) -> Vec<SceneOutcome> {
        let limiter = Arc::new(Semaphore::new(self.config.num_workers));

        let futures: Vec<_> = (0..self.config.num_scenes)
            .map(|scene_id| {
                let limiter = Arc::clone(&limiter);
                async move {
                    // The semaphore lives for the whole run; acquire only
                    // fails on a closed semaphore.
                    let _permit = limiter.acquire().await.expect("limiter closed mid-run");
                    self.generate_scene(scene_id, pool).await
                }
            })
            .collect();

        // join_all keeps submission order, so outcomes line up with
        // scene indices regardless of completion order.
        join_all(futures).await
    }

    async fn generate_scene(&self, scene_id: u64, pool: &ObjectPool) -> SceneOutcome {
        match self.try_generate(scene_id, pool).await {
            Ok(artifact) => {
                info!(
                    scene_id,
                    objects = artifact.record.objects().len(),
                    path = %artifact.record_path.display(),
                    "scene generated"
                );
                SceneOutcome::Generated(artifact)
            }
            Err(reason) => {
                warn!(scene_id, error = %reason, "scene skipped");
                SceneOutcome::Skipped { scene_id, reason }
            }
        }
    }

    async fn try_generate(
        &self,
        scene_id: u64,
        pool: &ObjectPool,
    ) -> Result<SceneArtifact, SceneError> {
        let composition = self.sampler.sample(scene_id, pool)?;
        let arranged = self.engine.arrange(&composition).await?;

        let mut record = SceneRecord::new(scene_id, composition.support.source_path());
        for object in &composition.objects {
            let pose = arranged
                .poses
                .get(&object.name)
                .ok_or_else(|| ArrangementError::MissingPose(object.name.clone()))?;
            record.add_object(&object.name, object.source_path(), *pose);
        }

        let record_path = self.writer.write(&record)?;

        Ok(SceneArtifact {
            scene_id,
            record,
            record_path,
            scene: arranged.scene,
        })
    }
}
