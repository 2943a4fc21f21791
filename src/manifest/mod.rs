//! Object manifest loading.
//!
//! A manifest maps object names to mesh files and scales:
//!
//! ```json
//! { "mug_01": { "filepath": "/meshes/mug_01.obj", "object_scale": 1.0 } }
//! ```
//!
//! Format selection happens in exactly one place: the loader sniffs the
//! file content (HDF5 signature vs JSON), falls back to the extension,
//! and dispatches to the matching [`ManifestReader`]. Binary HDF5
//! catalogs are recognized but not parsed here; they are reported with
//! guidance to convert to the JSON form.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ManifestError;
use crate::record::SUPPORT_KEY;
use crate::scene::{MeshRef, ObjectPool, ObjectRecord};

/// The 8-byte signature that opens every HDF5 file.
const HDF5_SIGNATURE: [u8; 8] = [0x89, b'H', b'D', b'F', b'\r', b'\n', 0x1a, b'\n'];

/// Manifest formats the loader can tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Hdf5,
}

impl ManifestFormat {
    /// Detects the format from content, falling back to the extension.
    pub fn detect(path: &Path, bytes: &[u8]) -> Self {
        if bytes.starts_with(&HDF5_SIGNATURE) {
            return Self::Hdf5;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("h5") | Some("hdf5") => Self::Hdf5,
            _ => Self::Json,
        }
    }
}

/// A reader for one manifest format.
pub trait ManifestReader {
    /// Parses manifest bytes into object records in name order.
    fn read(&self, path: &Path, bytes: &[u8]) -> Result<Vec<ObjectRecord>, ManifestError>;
}

/// On-disk shape of one manifest entry.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    filepath: PathBuf,
    object_scale: f64,
}

/// Reader for JSON manifests.
pub struct JsonManifestReader;

impl ManifestReader for JsonManifestReader {
    fn read(&self, _path: &Path, bytes: &[u8]) -> Result<Vec<ObjectRecord>, ManifestError> {
        let entries: BTreeMap<String, ManifestEntry> = serde_json::from_slice(bytes)?;

        let mut records = Vec::with_capacity(entries.len());
        for (name, entry) in entries {
            if name == SUPPORT_KEY {
                return Err(ManifestError::ReservedName(name));
            }
            if !entry.object_scale.is_finite() || entry.object_scale <= 0.0 {
                return Err(ManifestError::InvalidScale {
                    name,
                    scale: entry.object_scale,
                });
            }
            records.push(ObjectRecord::new(
                name,
                MeshRef::new(entry.filepath, entry.object_scale),
            ));
        }
        Ok(records)
    }
}

/// Reader stub for HDF5 catalogs.
///
/// The format is detected so the failure names the real problem instead
/// of a JSON parse error on binary bytes.
pub struct Hdf5ManifestReader;

impl ManifestReader for Hdf5ManifestReader {
    fn read(&self, path: &Path, _bytes: &[u8]) -> Result<Vec<ObjectRecord>, ManifestError> {
        Err(ManifestError::UnsupportedFormat {
            path: path.to_path_buf(),
            detail: "binary HDF5 catalogs are not parsed; convert to the JSON manifest form"
                .to_string(),
        })
    }
}

fn reader_for(format: ManifestFormat) -> &'static dyn ManifestReader {
    match format {
        ManifestFormat::Json => &JsonManifestReader,
        ManifestFormat::Hdf5 => &Hdf5ManifestReader,
    }
}

fn read_records(path: &Path) -> Result<Vec<ObjectRecord>, ManifestError> {
    let bytes = fs::read(path)?;
    let format = ManifestFormat::detect(path, &bytes);
    reader_for(format).read(path, &bytes)
}

/// Loads the object pool from a manifest file.
///
/// Records come back in name order; that order is what scene sampling
/// indexes into.
pub fn load_objects(path: &Path) -> Result<ObjectPool, ManifestError> {
    let records = read_records(path)?;
    if records.is_empty() {
        return Err(ManifestError::Empty(path.to_path_buf()));
    }
    Ok(ObjectPool::new(records))
}

/// Loads the support object: the manifest's first entry in name order,
/// with `scale_multiplier` applied on top of its own scale.
pub fn load_support(path: &Path, scale_multiplier: f64) -> Result<ObjectRecord, ManifestError> {
    let records = read_records(path)?;
    let mut support = records
        .into_iter()
        .next()
        .ok_or_else(|| ManifestError::Empty(path.to_path_buf()))?;
    support.mesh.scale *= scale_multiplier;
    Ok(support)
}
