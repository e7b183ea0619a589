//! Producers of [`ScalarField`](crate::field::ScalarField)s, one per input
//! kind. A new mode only needs a new function that returns a valid field.

use common::config::Resample;
use image::{
    imageops::{self, FilterType},
    GrayImage, ImageBuffer, Luma,
};

use crate::{Error, Result};

pub mod braille;
pub mod depth;
pub mod height_map;
pub mod qr;
pub mod topo;

/// Normalized brightness in `[0, 1]`, one value per pixel.
pub type Brightness = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Converts an 8-bit grayscale image into normalized brightness.
pub fn brightness_from_gray(image: &GrayImage) -> Brightness {
    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y)[0] as f32 / 255.0])
    })
}

/// Shrinks `image` so its longest side is at most `resolution` pixels,
/// keeping the aspect ratio. Images that already fit are returned unchanged
/// and neither side ever drops below 2 pixels.
pub fn downsample(image: &Brightness, resolution: Option<u32>, resample: Resample) -> Brightness {
    let (width, height) = image.dimensions();
    let Some(resolution) = resolution else {
        return image.clone();
    };

    let longest = width.max(height);
    if longest <= resolution {
        return image.clone();
    }

    let scale = resolution as f32 / longest as f32;
    let shrink = |size: u32| ((size as f32 * scale).round() as u32).clamp(2.min(size), size);
    let (new_width, new_height) = (shrink(width), shrink(height));

    // the triangle filter widens with the scale factor, so every output pixel
    // is a weighted average of the source pixels it covers
    let filter = match resample {
        Resample::Nearest => FilterType::Nearest,
        Resample::Area => FilterType::Triangle,
    };
    imageops::resize(image, new_width, new_height, filter)
}

fn check_image(image: &Brightness, resolution: Option<u32>) -> Result<()> {
    let (width, height) = image.dimensions();
    if width < 2 || height < 2 {
        return Err(Error::invalid(format!(
            "image must be at least 2x2 pixels, got {width}x{height}"
        )));
    }

    if resolution.is_some_and(|x| x < 2) {
        return Err(Error::invalid("resolution must be at least 2 samples"));
    }

    Ok(())
}

fn check_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(format!("{name} must be positive, got {value}")))
    }
}

fn check_non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "{name} must not be negative, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Brightness {
        ImageBuffer::from_fn(width, height, |x, _| Luma([x as f32 / (width - 1) as f32]))
    }

    #[test]
    fn downsample_keeps_aspect() {
        let image = gradient(400, 200);

        for resample in [Resample::Nearest, Resample::Area] {
            let small = downsample(&image, Some(100), resample);
            assert_eq!(small.dimensions(), (100, 50));
            assert!(small.pixels().all(|p| (0.0..=1.0).contains(&p[0])));
        }
    }

    #[test]
    fn area_downsample_keeps_levels() {
        let flat = ImageBuffer::from_pixel(200, 200, Luma([0.5_f32]));
        let small = downsample(&flat, Some(100), Resample::Area);
        assert_eq!(small.dimensions(), (100, 100));
        assert!(small.pixels().all(|p| (p[0] - 0.5).abs() < 1e-4));

        let ramp = gradient(400, 200);
        let mean = |image: &Brightness| {
            image.pixels().map(|p| p[0] as f64).sum::<f64>() / (image.width() * image.height()) as f64
        };
        let small = downsample(&ramp, Some(100), Resample::Area);
        assert!((mean(&small) - mean(&ramp)).abs() < 0.01);
        assert!(small.get_pixel(0, 0)[0] < 0.05);
        assert!(small.get_pixel(99, 0)[0] > 0.95);
    }

    #[test]
    fn downsample_never_grows() {
        let image = gradient(20, 10);
        assert_eq!(downsample(&image, Some(100), Resample::Area).dimensions(), (20, 10));
        assert_eq!(downsample(&image, None, Resample::Area).dimensions(), (20, 10));
    }

    #[test]
    fn downsample_keeps_two_samples() {
        let image = gradient(1000, 3);
        assert_eq!(downsample(&image, Some(10), Resample::Nearest).dimensions(), (10, 2));
    }

    #[test]
    fn gray_is_normalized() {
        let gray = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 0 } else { 255 }]));
        let brightness = brightness_from_gray(&gray);
        assert_eq!(brightness.get_pixel(0, 0)[0], 0.0);
        assert_eq!(brightness.get_pixel(1, 0)[0], 1.0);
    }
}
