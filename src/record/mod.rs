//! Persisted scene records.
//!
//! One record per scene: every placed object keyed by name, each entry
//! holding the object's pose and source path, plus a fixed
//! `"support_object"` entry with the support's path. Keys serialize in
//! sorted order and poses keep full float precision, so writing the same
//! record twice produces byte-identical files.

pub mod writer;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::RecordError;
use crate::pose::Pose;

pub use writer::PoseRecordWriter;

/// Fixed record key mapping to the support mesh's path. Object names must
/// not collide with it; the manifest loader rejects the collision.
pub const SUPPORT_KEY: &str = "support_object";

/// Filename prefix for persisted records.
const FILE_PREFIX: &str = "scene_";

/// One placed object in a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject {
    /// Source path of the object's mesh.
    pub path: PathBuf,
    /// Pose in scene coordinates, row-major.
    pub pose: Pose,
}

/// The terminal artifact of one generated scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRecord {
    /// Scene index; encoded in the record's filename, not its body.
    pub scene_id: u64,
    objects: BTreeMap<String, PlacedObject>,
    support_path: PathBuf,
}

impl SceneRecord {
    /// Creates an empty record for a scene on the given support.
    pub fn new(scene_id: u64, support_path: impl Into<PathBuf>) -> Self {
        Self {
            scene_id,
            objects: BTreeMap::new(),
            support_path: support_path.into(),
        }
    }

    /// Adds one placed object.
    pub fn add_object(&mut self, name: impl Into<String>, path: impl Into<PathBuf>, pose: Pose) {
        self.objects.insert(
            name.into(),
            PlacedObject {
                path: path.into(),
                pose,
            },
        );
    }

    /// The placed objects, keyed by name.
    pub fn objects(&self) -> &BTreeMap<String, PlacedObject> {
        &self.objects
    }

    /// The support mesh's path.
    pub fn support_path(&self) -> &Path {
        &self.support_path
    }

    /// The filename this record persists under.
    pub fn file_name(scene_id: u64) -> String {
        format!("{FILE_PREFIX}{scene_id:05}.json")
    }

    /// Reads a record back from a persisted file.
    ///
    /// The scene index is recovered from the filename.
    pub fn from_path(path: &Path) -> Result<Self, RecordError> {
        let scene_id = parse_scene_id(path).ok_or_else(|| RecordError::Malformed {
            path: path.to_path_buf(),
            detail: format!("filename does not match {FILE_PREFIX}NNNNN.json"),
        })?;

        let bytes = std::fs::read(path)?;
        let mut entries: BTreeMap<String, serde_json::Value> = serde_json::from_slice(&bytes)?;

        let support_value = entries.remove(SUPPORT_KEY).ok_or_else(|| RecordError::Malformed {
            path: path.to_path_buf(),
            detail: format!("missing '{SUPPORT_KEY}' entry"),
        })?;
        let support_path: PathBuf = serde_json::from_value(support_value)?;

        let mut objects = BTreeMap::new();
        for (name, value) in entries {
            let placed: PlacedObject = serde_json::from_value(value)?;
            objects.insert(name, placed);
        }

        Ok(Self {
            scene_id,
            objects,
            support_path,
        })
    }
}

impl Serialize for SceneRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Objects and the support entry share one sorted keyspace.
        let mut map = serializer.serialize_map(Some(self.objects.len() + 1))?;
        let mut support_written = false;
        for (name, placed) in &self.objects {
            if !support_written && SUPPORT_KEY < name.as_str() {
                map.serialize_entry(SUPPORT_KEY, &self.support_path)?;
                support_written = true;
            }
            map.serialize_entry(name, placed)?;
        }
        if !support_written {
            map.serialize_entry(SUPPORT_KEY, &self.support_path)?;
        }
        map.end()
    }
}

fn parse_scene_id(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.strip_prefix(FILE_PREFIX)?;
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> SceneRecord {
        let mut record = SceneRecord::new(7, "/meshes/table.obj");
        record.add_object(
            "mug",
            "/meshes/mug.obj",
            Pose::from_translation(0.1, 0.2, 1.0 / 3.0),
        );
        record.add_object("bowl", "/meshes/bowl.obj", Pose::identity());
        record
    }

    #[test]
    fn test_keys_serialize_sorted_with_support_interleaved() {
        let json = serde_json::to_string(&sample_record()).expect("serialize");

        let bowl = json.find("\"bowl\"").expect("bowl key");
        let mug = json.find("\"mug\"").expect("mug key");
        let support = json.find("\"support_object\"").expect("support key");

        // Sorted order: bowl < mug < support_object.
        assert!(bowl < mug);
        assert!(mug < support);
    }

    #[test]
    fn test_support_sorts_before_later_names() {
        let mut record = SceneRecord::new(0, "/meshes/table.obj");
        record.add_object("vase", "/meshes/vase.obj", Pose::identity());

        let json = serde_json::to_string(&record).expect("serialize");
        let support = json.find("\"support_object\"").expect("support key");
        let vase = json.find("\"vase\"").expect("vase key");

        assert!(support < vase);
    }

    #[test]
    fn test_file_name_is_zero_padded() {
        assert_eq!(SceneRecord::file_name(7), "scene_00007.json");
        assert_eq!(SceneRecord::file_name(12345), "scene_12345.json");
    }

    #[test]
    fn test_parse_scene_id_from_path() {
        assert_eq!(parse_scene_id(Path::new("/out/scene_00042.json")), Some(42));
        assert_eq!(parse_scene_id(Path::new("/out/other.json")), None);
    }

    #[test]
    fn test_serialized_entry_shape() {
        let json = serde_json::to_value(&sample_record()).expect("serialize");

        assert_eq!(json["mug"]["path"], "/meshes/mug.obj");
        assert!(json["mug"]["pose"].is_array());
        assert_eq!(json["support_object"], "/meshes/table.obj");
    }
}
