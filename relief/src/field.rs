use crate::{Error, Result};

/// A regular grid of heights in mm, stored row-major. Row 0 is the back
/// (far, +y) edge of the model, matching how images are laid out.
///
/// Fields are validated once on construction and never change afterwards:
/// both sides have at least two samples, every sample is finite, the cell
/// size is positive and the base thickness is not negative.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    width: usize,
    height: usize,
    samples: Box<[f32]>,

    cell_size: f32,
    base_thickness: f32,
    range: (f32, f32),
}

impl ScalarField {
    pub fn new(
        width: usize,
        height: usize,
        samples: Vec<f32>,
        cell_size: f32,
        base_thickness: f32,
    ) -> Result<Self> {
        if width < 2 || height < 2 {
            return Err(Error::invalid(format!(
                "field must be at least 2x2 samples, got {width}x{height}"
            )));
        }

        if samples.len() != width * height {
            return Err(Error::invalid(format!(
                "expected {} samples for a {width}x{height} field, got {}",
                width * height,
                samples.len()
            )));
        }

        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(Error::invalid(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }

        if !(base_thickness.is_finite() && base_thickness >= 0.0) {
            return Err(Error::invalid(format!(
                "base thickness must not be negative, got {base_thickness}"
            )));
        }

        if let Some(idx) = samples.iter().position(|x| !x.is_finite()) {
            return Err(Error::invalid(format!(
                "sample ({}, {}) is not finite",
                idx % width,
                idx / width
            )));
        }

        let range = samples
            .iter()
            .fold((f32::MAX, f32::MIN), |(min, max), &x| (min.min(x), max.max(x)));

        Ok(Self {
            width,
            height,
            samples: samples.into_boxed_slice(),
            cell_size,
            base_thickness,
            range,
        })
    }

    /// Builds a field by evaluating `sample(x, y)` for every grid position in
    /// row-major order.
    pub fn from_fn(
        width: usize,
        height: usize,
        cell_size: f32,
        base_thickness: f32,
        mut sample: impl FnMut(usize, usize) -> f32,
    ) -> Result<Self> {
        let mut samples = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                samples.push(sample(x, y));
            }
        }

        Self::new(width, height, samples, cell_size, base_thickness)
    }

    /// Creates a field with the same size, spacing and base as this one but
    /// with new samples.
    pub fn with_samples(&self, samples: Vec<f32>) -> Result<Self> {
        Self::new(
            self.width,
            self.height,
            samples,
            self.cell_size,
            self.base_thickness,
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn base_thickness(&self) -> f32 {
        self.base_thickness
    }

    /// The smallest and largest sample.
    pub fn value_range(&self) -> (f32, f32) {
        self.range
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.samples[self.index(x, y)]
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// Physical size of the grid in mm along x and y.
    pub fn footprint(&self) -> (f32, f32) {
        (
            (self.width - 1) as f32 * self.cell_size,
            (self.height - 1) as f32 * self.cell_size,
        )
    }
}
