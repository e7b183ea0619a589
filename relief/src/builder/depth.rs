use common::config::DepthConfig;
use image::{GrayImage, Luma};
use imageproc::{filter::gaussian_blur_f32, gradients::sobel_gradients};
use tracing::debug;

use super::{check_image, check_non_negative, check_positive, downsample, Brightness};
use crate::{field::ScalarField, Error, Result};

/// Rough depth from a single image. This is a heuristic, not a learned
/// model: bright, smooth regions are pushed up and dark, busy regions down.
///
/// The estimate is `brightness * w + (1 - edges) * (1 - w)` with `edges` the
/// normalized Sobel gradient magnitude. It is then Gaussian smoothed, since
/// the gradient amplifies pixel noise, and stretched to `[0, max_height]`.
pub fn build_depth_field(image: &Brightness, config: &DepthConfig) -> Result<ScalarField> {
    check_image(image, config.resolution)?;
    check_non_negative("max height", config.max_height)?;
    check_non_negative("base thickness", config.base_thickness)?;
    check_non_negative("smoothing sigma", config.smoothing_sigma)?;
    check_positive("cell size", config.cell_size)?;
    if !(0.0..=1.0).contains(&config.brightness_weight) {
        return Err(Error::invalid(format!(
            "brightness weight must be within 0 and 1, got {}",
            config.brightness_weight
        )));
    }

    let image = downsample(image, config.resolution, config.resample);
    let (width, height) = image.dimensions();
    let brightness = image
        .pixels()
        .map(|p| p[0].clamp(0.0, 1.0))
        .collect::<Vec<_>>();

    let gray = GrayImage::from_fn(width, height, |x, y| {
        Luma([(brightness[(y * width + x) as usize] * 255.0).round() as u8])
    });
    let edges = normalize(
        sobel_gradients(&gray)
            .pixels()
            .map(|p| p[0] as f32)
            .collect(),
    );

    let weight = config.brightness_weight;
    let depth = Brightness::from_fn(width, height, |x, y| {
        let idx = (y * width + x) as usize;
        Luma([brightness[idx] * weight + (1.0 - edges[idx]) * (1.0 - weight)])
    });

    let depth = normalize(
        smooth(depth, config.smoothing_sigma)
            .pixels()
            .map(|p| p[0])
            .collect(),
    );
    let (width, height) = (width as usize, height as usize);
    debug!("Estimated depth for {width}x{height} image");

    ScalarField::new(
        width,
        height,
        depth.into_iter().map(|x| x * config.max_height).collect(),
        config.cell_size,
        config.base_thickness,
    )
}

/// Stretches values to `[0, 1]`. Constant input maps to all zeros.
fn normalize(mut values: Vec<f32>) -> Vec<f32> {
    let (min, max) = values
        .iter()
        .fold((f32::MAX, f32::MIN), |(min, max), &x| (min.min(x), max.max(x)));

    let range = max - min;
    for value in values.iter_mut() {
        *value = if range > 1e-6 {
            (*value - min) / range
        } else {
            0.0
        };
    }

    values
}

/// Gaussian blur with edge pixels repeated past the border. A sigma of zero
/// leaves the image untouched.
fn smooth(image: Brightness, sigma: f32) -> Brightness {
    if sigma > 0.0 {
        gaussian_blur_f32(&image, sigma)
    } else {
        image
    }
}
