//! Rigid transforms for object and grasp poses.
//!
//! A [`Pose`] is a 4x4 homogeneous transform (rotation + translation, no
//! scale or shear) at `f64` precision. Poses serialize as a nested 4x4
//! array in row-major order so that persisted records are stable and
//! round-trip at full floating-point precision.

use nalgebra::{Matrix4, Vector3};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tolerance for the affine bottom row of a homogeneous transform.
const AFFINE_EPS: f64 = 1e-9;

/// Tolerance for orthonormality of the rotation block. Loose enough to
/// absorb float drift from composing valid rigid transforms.
const ROTATION_EPS: f64 = 1e-6;

/// A rigid 4x4 homogeneous transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose(Matrix4<f64>);

impl Pose {
    /// The identity transform.
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    /// Builds a pose from a row-major 4x4 array.
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        let mut m = Matrix4::zeros();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                m[(r, c)] = *value;
            }
        }
        Self(m)
    }

    /// A pure translation pose.
    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self(Matrix4::new_translation(&Vector3::new(x, y, z)))
    }

    /// Returns the transform as a row-major 4x4 array.
    pub fn to_rows(&self) -> [[f64; 4]; 4] {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = self.0[(r, c)];
            }
        }
        rows
    }

    /// Composes `self` with a transform expressed in `self`'s local frame.
    ///
    /// For a grasp `g` in an object's local frame and the object's pose
    /// `p` in the scene, `p.compose(&g)` is the grasp in scene
    /// coordinates.
    pub fn compose(&self, local: &Pose) -> Pose {
        Pose(self.0 * local.0)
    }

    /// The translation component.
    pub fn translation(&self) -> [f64; 3] {
        [self.0[(0, 3)], self.0[(1, 3)], self.0[(2, 3)]]
    }

    /// Returns a description of the first structural defect, if any.
    ///
    /// A well-formed pose has only finite entries, an affine bottom row
    /// of `[0, 0, 0, 1]`, and an orthonormal rotation block. Callers map
    /// a defect to their own error type (an invalid engine response or a
    /// malformed collision query).
    pub fn defect(&self) -> Option<String> {
        for r in 0..4 {
            for c in 0..4 {
                if !self.0[(r, c)].is_finite() {
                    return Some(format!("non-finite entry at row {r}, column {c}"));
                }
            }
        }

        let bottom = [self.0[(3, 0)], self.0[(3, 1)], self.0[(3, 2)], self.0[(3, 3)]];
        let expected = [0.0, 0.0, 0.0, 1.0];
        for (c, (got, want)) in bottom.iter().zip(expected.iter()).enumerate() {
            if (got - want).abs() > AFFINE_EPS {
                return Some(format!("bottom row entry {c} is {got}, expected {want}"));
            }
        }

        let rot = self.0.fixed_view::<3, 3>(0, 0);
        let gram = rot.transpose() * rot;
        for r in 0..3 {
            for c in 0..3 {
                let want = if r == c { 1.0 } else { 0.0 };
                if (gram[(r, c)] - want).abs() > ROTATION_EPS {
                    return Some("rotation block is not orthonormal (scale or shear)".to_string());
                }
            }
        }

        None
    }
}

impl Serialize for Pose {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_rows().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Pose {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = <Vec<Vec<f64>>>::deserialize(deserializer)?;
        if rows.len() != 4 || rows.iter().any(|r| r.len() != 4) {
            return Err(D::Error::custom("pose must be a 4x4 matrix"));
        }
        let mut fixed = [[0.0; 4]; 4];
        for (r, row) in rows.iter().enumerate() {
            fixed[r].copy_from_slice(row);
        }
        Ok(Pose::from_rows(fixed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_round_trip() {
        let rows = [
            [0.0, -1.0, 0.0, 0.125],
            [1.0, 0.0, 0.0, -2.5],
            [0.0, 0.0, 1.0, 0.75],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let pose = Pose::from_rows(rows);
        assert_eq!(pose.to_rows(), rows);
    }

    #[test]
    fn test_serde_preserves_full_precision() {
        let rows = [
            [1.0, 0.0, 0.0, 1.0 / 3.0],
            [0.0, 1.0, 0.0, 0.1 + 0.2],
            [0.0, 0.0, 1.0, f64::MIN_POSITIVE],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let pose = Pose::from_rows(rows);

        let json = serde_json::to_string(&pose).expect("serialize");
        let decoded: Pose = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(decoded.to_rows(), rows);
    }

    #[test]
    fn test_compose_applies_local_frame() {
        let object = Pose::from_translation(1.0, 2.0, 3.0);
        let grasp = Pose::from_translation(0.5, 0.0, -1.0);

        let world = object.compose(&grasp);

        assert_eq!(world.translation(), [1.5, 2.0, 2.0]);
    }

    #[test]
    fn test_identity_has_no_defect() {
        assert!(Pose::identity().defect().is_none());
    }

    #[test]
    fn test_defect_detects_non_finite_entry() {
        let mut rows = Pose::identity().to_rows();
        rows[1][2] = f64::NAN;

        let defect = Pose::from_rows(rows).defect().expect("defect");
        assert!(defect.contains("non-finite"));
    }

    #[test]
    fn test_defect_detects_projective_bottom_row() {
        let mut rows = Pose::identity().to_rows();
        rows[3][0] = 0.25;

        assert!(Pose::from_rows(rows).defect().is_some());
    }

    #[test]
    fn test_defect_detects_scale() {
        let mut rows = Pose::identity().to_rows();
        rows[0][0] = 2.0;

        let defect = Pose::from_rows(rows).defect().expect("defect");
        assert!(defect.contains("orthonormal"));
    }

    #[test]
    fn test_deserialize_rejects_wrong_shape() {
        let json = "[[1.0, 0.0], [0.0, 1.0]]";
        assert!(serde_json::from_str::<Pose>(json).is_err());
    }
}
