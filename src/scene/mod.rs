//! Scene composition types.
//!
//! A scene is composed from an [`ObjectPool`] loaded once at startup. The
//! pool holds opaque mesh references; geometry never enters this crate and
//! stays behind the arrangement engine boundary.

pub mod sampler;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use sampler::SceneSampler;

/// Opaque handle to a mesh known to the arrangement engine.
///
/// The engine resolves the path; this crate only carries it around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshRef {
    /// Source path of the mesh file.
    pub path: PathBuf,
    /// Uniform scale applied when the engine loads the mesh.
    pub scale: f64,
}

impl MeshRef {
    pub fn new(path: impl Into<PathBuf>, scale: f64) -> Self {
        Self {
            path: path.into(),
            scale,
        }
    }
}

/// One object from the manifest: a unique name plus its mesh handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Name, unique within the manifest.
    pub name: String,
    /// Mesh handle; its path doubles as the record's source path.
    pub mesh: MeshRef,
}

impl ObjectRecord {
    pub fn new(name: impl Into<String>, mesh: MeshRef) -> Self {
        Self {
            name: name.into(),
            mesh,
        }
    }

    /// The path persisted into scene records for this object.
    pub fn source_path(&self) -> &PathBuf {
        &self.mesh.path
    }
}

/// The startup-loaded set of candidate objects.
///
/// Pool order is stable (the manifest loader sorts by name) and is part of
/// the per-scene determinism contract: the sampler draws indices into this
/// order.
#[derive(Debug, Clone)]
pub struct ObjectPool {
    objects: Vec<ObjectRecord>,
}

impl ObjectPool {
    /// Wraps an already-ordered list of objects.
    pub fn new(objects: Vec<ObjectRecord>) -> Self {
        Self { objects }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The objects in pool order.
    pub fn objects(&self) -> &[ObjectRecord] {
        &self.objects
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.objects.iter()
    }
}

/// The objects chosen for one scene, ready for arrangement.
///
/// Created per scene and consumed immediately by the engine; contains no
/// object twice.
#[derive(Debug, Clone)]
pub struct SceneComposition {
    /// Scene index; also the seed the composition was sampled with.
    pub scene_id: u64,
    /// Chosen objects in draw order.
    pub objects: Vec<ObjectRecord>,
    /// The support surface the objects rest on.
    pub support: ObjectRecord,
}

impl SceneComposition {
    /// Names of the chosen objects, in draw order.
    pub fn object_names(&self) -> Vec<&str> {
        self.objects.iter().map(|o| o.name.as_str()).collect()
    }
}
