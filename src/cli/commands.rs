//! CLI command definition for scene-forge.
//!
//! One-shot interface: read the object and support manifests, generate a
//! batch of scene records, and optionally filter and show the
//! collision-free grasps for every generated scene.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use crate::engine::{EngineClient, SceneViewer};
use crate::error::ConfigError;
use crate::grasp::{filter_collision_free, GraspSource, JsonGraspSource};
use crate::manifest;
use crate::pipeline::config::{DEFAULT_GRASPS_PER_OBJECT, DEFAULT_NUM_SCENES};
use crate::pipeline::{BatchDriver, BatchSummary, GenerationConfig};
use crate::record::PoseRecordWriter;
use crate::scene::{MeshRef, SceneSampler};
use crate::viz;

/// Default directory for generated scene records.
const DEFAULT_OUTPUT_DIR: &str = "./generated-scenes";

/// Default gripper collision mesh used for grasp filtering.
const DEFAULT_GRIPPER_MESH: &str = "data/franka_gripper_collision_mesh.stl";

/// Random tabletop scene generator for grasp datasets.
#[derive(Parser)]
#[command(name = "scene-forge")]
#[command(about = "Generate random scene arrangements and filter grasps that are in collision")]
#[command(version)]
pub struct Cli {
    /// Object manifest (JSON; HDF5 catalogs must be converted first).
    #[arg(long = "objects_json")]
    pub objects_json: PathBuf,

    /// Manifest for the support object.
    #[arg(long)]
    pub support: PathBuf,

    /// Scale factor of the support mesh.
    #[arg(long = "support_scale", default_value_t = 1.0)]
    pub support_scale: f64,

    /// Process scenes with a worker pool.
    #[arg(long)]
    pub multiprocessing: bool,

    /// Number of scenes to create.
    #[arg(long = "num_scenes", default_value_t = DEFAULT_NUM_SCENES)]
    pub num_scenes: u64,

    /// Show all grasps that are not in collision.
    #[arg(long = "show_grasps")]
    pub show_grasps: bool,

    /// Maximum number of grasps to keep per object.
    #[arg(long = "num_grasps_per_object", default_value_t = DEFAULT_GRASPS_PER_OBJECT)]
    pub num_grasps_per_object: usize,

    /// Directory scene records are written to.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Base URL of the arrangement engine service.
    #[arg(long = "engine-url", env = "SCENE_ENGINE_URL")]
    pub engine_url: String,

    /// Gripper collision mesh used for grasp filtering.
    #[arg(long, default_value = DEFAULT_GRIPPER_MESH)]
    pub gripper: PathBuf,

    /// Directory of per-object grasp JSON files (required with --show_grasps).
    #[arg(long = "grasp-root")]
    pub grasp_root: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

/// Parses CLI arguments from the process environment.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Runs the generation command.
///
/// Configuration and manifest failures abort with a non-zero exit;
/// per-scene failures are logged, counted and skipped.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    validate(&cli)?;

    let config = GenerationConfig::default()
        .with_num_scenes(cli.num_scenes)
        .with_support_scale(cli.support_scale)
        .with_grasps_per_object(cli.num_grasps_per_object)
        .with_parallel(cli.multiprocessing)
        .with_output_dir(&cli.output);
    config.validate()?;

    let pool = manifest::load_objects(&cli.objects_json)?;
    let support = manifest::load_support(&cli.support, cli.support_scale)?;
    info!(
        objects = pool.len(),
        support = %support.name,
        "loaded manifests"
    );

    let engine = Arc::new(EngineClient::new(&cli.engine_url));
    let driver = BatchDriver::new(
        engine.clone(),
        SceneSampler::new(support),
        PoseRecordWriter::new(&cli.output),
        config.clone(),
    );

    let summary = driver.run(&pool).await;

    if cli.show_grasps {
        show_grasps(&cli, &config, &engine, &summary).await?;
    }

    Ok(())
}

/// The grasp visualization pass.
///
/// Consumes the explicit artifact collection from the run, so it sees
/// every generated scene in both execution modes.
async fn show_grasps(
    cli: &Cli,
    config: &GenerationConfig,
    engine: &EngineClient,
    summary: &BatchSummary,
) -> anyhow::Result<()> {
    let grasp_root = cli
        .grasp_root
        .as_ref()
        .ok_or_else(|| ConfigError::MissingSetting("grasp-root".to_string()))?;
    let source = JsonGraspSource::new(grasp_root);
    let gripper = MeshRef::new(&cli.gripper, 1.0);

    for artifact in summary.artifacts() {
        let mut markers = Vec::new();
        for (name, placed) in artifact.record.objects() {
            let set = match source.load(name) {
                Ok(set) => set,
                Err(e) => {
                    warn!(object = %name, error = %e, "no usable grasp set, skipping object");
                    continue;
                }
            };

            let free = filter_collision_free(
                &placed.pose,
                &set,
                config.grasps_per_object,
                &gripper,
                &artifact.scene,
                engine,
            )
            .await;

            info!(
                scene_id = artifact.scene_id,
                object = %name,
                collision_free = free.len(),
                "filtered grasps"
            );
            markers.extend(viz::markers_for(&free));
        }

        if let Err(e) = engine.show(&artifact.record, &markers).await {
            warn!(scene_id = artifact.scene_id, error = %e, "viewer failed for scene");
        }
    }

    Ok(())
}

fn validate(cli: &Cli) -> Result<(), ConfigError> {
    if !cli.objects_json.exists() {
        return Err(ConfigError::MissingPath(cli.objects_json.clone()));
    }
    if !cli.support.exists() {
        return Err(ConfigError::MissingPath(cli.support.clone()));
    }
    if cli.engine_url.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "engine-url".to_string(),
            message: "engine URL must not be empty".to_string(),
        });
    }
    if cli.show_grasps {
        match &cli.grasp_root {
            None => {
                return Err(ConfigError::MissingSetting(
                    "grasp-root (required with --show_grasps)".to_string(),
                ))
            }
            Some(root) if !root.exists() => {
                return Err(ConfigError::MissingPath(root.clone()));
            }
            Some(_) => {}
        }
    }
    Ok(())
}
