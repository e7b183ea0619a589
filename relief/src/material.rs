use tracing::{debug, warn};

use crate::{field::ScalarField, Error, Result};

/// The material index of every sample of a field. With `n` thresholds there
/// are `n + 1` materials, numbered from 0, and a sample belongs to the
/// material whose index is the number of thresholds at or below its value.
#[derive(Debug, Clone)]
pub struct MaterialAssignment {
    thresholds: Vec<f32>,
    indices: Vec<usize>,
}

impl MaterialAssignment {
    /// Assigns materials from strictly ascending, finite thresholds.
    pub fn new(field: &ScalarField, thresholds: &[f32]) -> Result<Self> {
        if thresholds.iter().any(|x| !x.is_finite()) {
            return Err(Error::invalid("material thresholds must be finite"));
        }

        if thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::invalid(
                "material thresholds must be strictly ascending",
            ));
        }

        let indices = field
            .samples()
            .iter()
            .map(|&value| thresholds.partition_point(|&threshold| threshold <= value))
            .collect();

        Ok(Self {
            thresholds: thresholds.to_vec(),
            indices,
        })
    }

    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }

    pub fn material_count(&self) -> usize {
        self.thresholds.len() + 1
    }

    /// Material of each sample, in the field's row-major order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Which samples belong to `material`.
    pub fn active(&self, material: usize) -> Vec<bool> {
        self.indices.iter().map(|&x| x == material).collect()
    }

    /// Number of samples in each material.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.material_count()];
        for &idx in &self.indices {
            counts[idx] += 1;
        }
        counts
    }

    /// Produces one field per material. Samples of other materials are pushed
    /// down to the floor (the top of the base, or the lowest sample if that is
    /// below zero), so every field keeps the original footprint and the
    /// resulting meshes line up when loaded together.
    pub fn split(&self, field: &ScalarField) -> Result<Vec<ScalarField>> {
        if self.indices.len() != field.samples().len() {
            return Err(Error::invalid(
                "material assignment was made for a different field",
            ));
        }

        let floor = field.value_range().0.min(0.0);
        let counts = self.counts();

        (0..self.material_count())
            .map(|material| {
                if counts[material] == 0 {
                    warn!("Material {material} has no samples");
                }

                let samples = field
                    .samples()
                    .iter()
                    .zip(&self.indices)
                    .map(|(&value, &idx)| if idx == material { value } else { floor })
                    .collect();
                field.with_samples(samples)
            })
            .collect()
    }
}

/// The value halfway through a field's range, used when no thresholds are
/// configured.
pub fn midpoint_threshold(field: &ScalarField) -> f32 {
    let (min, max) = field.value_range();
    (min + max) / 2.0
}

/// Splits a field into one aligned field per material, see
/// [`MaterialAssignment`].
pub fn split_by_material(field: &ScalarField, thresholds: &[f32]) -> Result<Vec<ScalarField>> {
    let assignment = MaterialAssignment::new(field, thresholds)?;
    debug!(
        "Splitting field into {} materials with {:?} samples each",
        assignment.material_count(),
        assignment.counts()
    );
    assignment.split(field)
}
