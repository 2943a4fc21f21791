//! Scene record persistence.
//!
//! Records are written as `scene_{:05}.json` under a single output
//! directory, pretty-printed with four-space indentation. Writes go
//! through a tempfile in the same directory and an atomic rename, so
//! regenerating a scene overwrites its record without ever exposing a
//! partial file.

use std::io::Write as _;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::RecordError;

use super::SceneRecord;

/// Writes scene records to an output directory.
#[derive(Debug, Clone)]
pub struct PoseRecordWriter {
    output_dir: PathBuf,
}

impl PoseRecordWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// The path a given scene's record persists under.
    pub fn record_path(&self, scene_id: u64) -> PathBuf {
        self.output_dir.join(SceneRecord::file_name(scene_id))
    }

    /// Persists a record, overwriting any previous record for the scene.
    pub fn write(&self, record: &SceneRecord) -> Result<PathBuf, RecordError> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.record_path(record.scene_id);
        let bytes = render(record)?;

        let mut tmp = NamedTempFile::new_in(&self.output_dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&path).map_err(|e| RecordError::PersistFailed {
            scene_id: record.scene_id,
            detail: e.to_string(),
        })?;

        debug!(scene_id = record.scene_id, path = %path.display(), "wrote scene record");
        Ok(path)
    }
}

/// Renders a record with the stable on-disk formatting.
fn render(record: &SceneRecord) -> Result<Vec<u8>, RecordError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut serializer)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Pose;

    fn sample_record(scene_id: u64) -> SceneRecord {
        let mut record = SceneRecord::new(scene_id, "/meshes/table.obj");
        record.add_object(
            "mug",
            "/meshes/mug.obj",
            Pose::from_translation(0.1 + 0.2, -1.0 / 3.0, 0.75),
        );
        record.add_object("bowl", "/meshes/bowl.obj", Pose::identity());
        record
    }

    #[test]
    fn test_write_creates_zero_padded_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = PoseRecordWriter::new(dir.path());

        let path = writer.write(&sample_record(3)).expect("write");

        assert_eq!(path.file_name().unwrap(), "scene_00003.json");
        assert!(path.exists());
    }

    #[test]
    fn test_rewrite_is_byte_identical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = PoseRecordWriter::new(dir.path());
        let record = sample_record(11);

        let path = writer.write(&record).expect("first write");
        let first = std::fs::read(&path).expect("read");
        writer.write(&record).expect("second write");
        let second = std::fs::read(&path).expect("read");

        assert_eq!(first, second);
    }

    #[test]
    fn test_round_trip_preserves_poses_and_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = PoseRecordWriter::new(dir.path());
        let record = sample_record(21);

        let path = writer.write(&record).expect("write");
        let decoded = SceneRecord::from_path(&path).expect("read back");

        assert_eq!(decoded, record);
    }

    #[test]
    fn test_write_uses_four_space_indent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = PoseRecordWriter::new(dir.path());

        let path = writer.write(&sample_record(0)).expect("write");
        let text = std::fs::read_to_string(&path).expect("read");

        assert!(text.contains("\n    \"bowl\""));
    }

    #[test]
    fn test_overwrite_replaces_previous_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = PoseRecordWriter::new(dir.path());

        writer.write(&sample_record(5)).expect("write");

        let mut replacement = SceneRecord::new(5, "/meshes/desk.obj");
        replacement.add_object("cup", "/meshes/cup.obj", Pose::identity());
        let path = writer.write(&replacement).expect("overwrite");

        let decoded = SceneRecord::from_path(&path).expect("read back");
        assert_eq!(decoded, replacement);
        assert!(!decoded.objects().contains_key("mug"));
    }
}
