use common::config::HeightMapConfig;
use tracing::debug;

use super::{check_image, check_non_negative, check_positive, downsample, Brightness};
use crate::{field::ScalarField, Result};

/// Brightness relief: each pixel becomes a sample at
/// `brightness * max_height`, after optional downsampling. A uniform image
/// gives a flat field, which still meshes to a closed box thanks to the base.
pub fn build_height_map_field(image: &Brightness, config: &HeightMapConfig) -> Result<ScalarField> {
    check_image(image, config.resolution)?;
    check_non_negative("max height", config.max_height)?;
    check_non_negative("base thickness", config.base_thickness)?;
    check_positive("cell size", config.cell_size)?;

    let image = downsample(image, config.resolution, config.resample);
    let (width, height) = image.dimensions();
    debug!("Sampling {width}x{height} height map");

    ScalarField::from_fn(
        width as usize,
        height as usize,
        config.cell_size,
        config.base_thickness,
        |x, y| image.get_pixel(x as u32, y as u32)[0].clamp(0.0, 1.0) * config.max_height,
    )
}

#[cfg(test)]
mod tests {
    use common::config::Resample;
    use image::{ImageBuffer, Luma};

    use super::*;
    use crate::{mesh::generate_mesh, Error};

    #[test]
    fn scales_brightness() {
        let image = ImageBuffer::from_fn(3, 2, |x, _| Luma([x as f32 / 2.0]));
        let config = HeightMapConfig {
            max_height: 4.0,
            ..Default::default()
        };

        let field = build_height_map_field(&image, &config).unwrap();
        assert_eq!((field.width(), field.height()), (3, 2));
        assert_eq!(field.samples(), &[0.0, 2.0, 4.0, 0.0, 2.0, 4.0]);
        assert_eq!(field.base_thickness(), config.base_thickness);
    }

    #[test]
    fn uniform_image_makes_a_box() {
        let image = ImageBuffer::from_pixel(10, 10, Luma([0.0]));
        let field = build_height_map_field(&image, &HeightMapConfig::default()).unwrap();
        assert_eq!(field.value_range(), (0.0, 0.0));

        let mesh = generate_mesh(&field).unwrap();
        let (min, max) = mesh.bounds();
        assert_eq!(max.z - min.z, 2.0);
        assert!((mesh.volume() - 9.0 * 9.0 * 2.0).abs() < 1e-3);
    }

    #[test]
    fn bounds_resolution() {
        let image = ImageBuffer::from_pixel(300, 150, Luma([0.5]));
        let config = HeightMapConfig {
            resolution: Some(60),
            resample: Resample::Nearest,
            ..Default::default()
        };

        let field = build_height_map_field(&image, &config).unwrap();
        assert_eq!((field.width(), field.height()), (60, 30));
    }

    #[test]
    fn default_downsampling_keeps_heights() {
        let image = ImageBuffer::from_pixel(200, 200, Luma([0.5]));
        let config = HeightMapConfig::default();

        let field = build_height_map_field(&image, &config).unwrap();
        assert_eq!((field.width(), field.height()), (100, 100));

        let (min, max) = field.value_range();
        assert!((min - 5.0).abs() < 1e-3 && (max - 5.0).abs() < 1e-3);
    }

    #[test]
    fn rejects_tiny_images() {
        let image = ImageBuffer::from_pixel(1, 5, Luma([0.5]));
        let result = build_height_map_field(&image, &HeightMapConfig::default());
        assert!(matches!(result, Err(Error::InputValidation(_))));
    }
}
