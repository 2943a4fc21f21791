//! Deterministic scene composition sampling.
//!
//! Each scene index seeds its own ChaCha8 generator, so a scene is
//! reproducible from `(scene_id, pool)` alone, independent of call order
//! and of how many scenes run concurrently. The object count is drawn
//! from a normal distribution and clamped; the objects themselves are
//! drawn uniformly without replacement.

use rand::prelude::*;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;

use crate::error::SamplerError;
use crate::scene::{ObjectPool, ObjectRecord, SceneComposition};

/// Fewest objects a scene may contain.
pub const MIN_OBJECTS: usize = 2;

/// Most objects a scene may contain.
pub const MAX_OBJECTS: usize = 9;

/// Mean of the object-count distribution.
const COUNT_MEAN: f64 = 5.0;

/// Standard deviation of the object-count distribution.
const COUNT_STD_DEV: f64 = 2.5;

/// Samples which objects populate a scene.
///
/// The sampler owns no generator state: a fresh `ChaCha8Rng` is seeded
/// from the scene index on every call, which is what makes parallel
/// generation safe without any shared RNG.
#[derive(Debug, Clone)]
pub struct SceneSampler {
    support: ObjectRecord,
}

impl SceneSampler {
    /// Creates a sampler that composes scenes on the given support.
    pub fn new(support: ObjectRecord) -> Self {
        Self { support }
    }

    /// The support surface compositions are built on.
    pub fn support(&self) -> &ObjectRecord {
        &self.support
    }

    /// Samples the composition for `scene_id`.
    ///
    /// The object count is `round(5 + 2.5 * Z)` for a standard-normal
    /// `Z`, clamped to `[MIN_OBJECTS, MAX_OBJECTS]` and then to the pool
    /// size. Indices are drawn uniformly without replacement.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::InsufficientObjects`] when the pool holds
    /// fewer than [`MIN_OBJECTS`] objects.
    pub fn sample(
        &self,
        scene_id: u64,
        pool: &ObjectPool,
    ) -> Result<SceneComposition, SamplerError> {
        if pool.len() < MIN_OBJECTS {
            return Err(SamplerError::InsufficientObjects {
                available: pool.len(),
                minimum: MIN_OBJECTS,
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(scene_id);

        let normal =
            Normal::new(COUNT_MEAN, COUNT_STD_DEV).expect("count distribution parameters are valid");
        let drawn: f64 = rng.sample(normal);
        let count = (drawn.round() as i64).clamp(MIN_OBJECTS as i64, MAX_OBJECTS as i64) as usize;
        let count = count.min(pool.len());

        let objects: Vec<ObjectRecord> = index::sample(&mut rng, pool.len(), count)
            .iter()
            .map(|i| pool.objects()[i].clone())
            .collect();

        Ok(SceneComposition {
            scene_id,
            objects,
            support: self.support.clone(),
        })
    }
}
