use common::config::{Interpolation, TopoConfig};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use tracing::debug;

use super::{check_non_negative, check_positive};
use crate::{field::ScalarField, Error, Result};

/// One elevation sample. Latitude and longitude are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// Spreads scattered elevation points onto a square
/// `grid_resolution` x `grid_resolution` field.
///
/// Points are projected to a plane (longitude shrunk by the cosine of the
/// mean latitude), the grid spans their bounding box with north at row 0, and
/// elevations are re-based so the lowest point sits at zero before
/// `vertical_scale` is applied.
pub fn build_topo_field(points: &[GeoPoint], config: &TopoConfig) -> Result<ScalarField> {
    if points.len() < 3 {
        return Err(Error::InsufficientData {
            points: points.len(),
        });
    }

    if config.grid_resolution < 2 {
        return Err(Error::invalid("grid resolution must be at least 2"));
    }

    check_positive("cell size", config.cell_size)?;
    check_non_negative("base thickness", config.base_thickness)?;
    check_non_negative("vertical scale", config.vertical_scale)?;
    if let Interpolation::InverseDistance { power } = config.interpolation {
        check_positive("interpolation power", power)?;
    }

    if let Some(idx) = points.iter().position(|p| {
        !(p.latitude.is_finite() && p.longitude.is_finite() && p.elevation.is_finite())
    }) {
        return Err(Error::invalid(format!("point {idx} is not finite")));
    }

    let mean_latitude = points.iter().map(|p| p.latitude).sum::<f64>() / points.len() as f64;
    let shrink = mean_latitude.to_radians().cos();
    let projected = points
        .iter()
        .map(|p| (p.longitude * shrink, p.latitude, p.elevation))
        .collect::<Vec<_>>();

    let (min, max) = projected.iter().fold(
        ((f64::MAX, f64::MAX, f64::MAX), (f64::MIN, f64::MIN, f64::MIN)),
        |(min, max), &(x, y, e)| {
            (
                (min.0.min(x), min.1.min(y), min.2.min(e)),
                (max.0.max(x), max.1.max(y), max.2.max(e)),
            )
        },
    );

    let size = config.grid_resolution as usize;
    let step = |extent: f64| extent / (size - 1) as f64;
    let (step_x, step_y) = (step(max.0 - min.0), step(max.1 - min.1));
    debug!(
        "Interpolating {} points onto a {size}x{size} grid",
        points.len()
    );

    let samples = (0..size)
        .into_par_iter()
        .map(|row| {
            let y = max.1 - row as f64 * step_y;
            (0..size)
                .map(|col| {
                    let x = min.0 + col as f64 * step_x;
                    let elevation = match config.interpolation {
                        Interpolation::Nearest => nearest(&projected, x, y),
                        Interpolation::InverseDistance { power } => {
                            inverse_distance(&projected, x, y, power as f64)
                        }
                    };
                    ((elevation - min.2).max(0.0) * config.vertical_scale as f64) as f32
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .concat();

    ScalarField::new(
        size,
        size,
        samples,
        config.cell_size,
        config.base_thickness,
    )
}

fn distance_squared((px, py, _): (f64, f64, f64), x: f64, y: f64) -> f64 {
    (px - x).powi(2) + (py - y).powi(2)
}

fn nearest(points: &[(f64, f64, f64)], x: f64, y: f64) -> f64 {
    points
        .iter()
        .min_by_key(|&&p| OrderedFloat(distance_squared(p, x, y)))
        .map(|p| p.2)
        .unwrap_or_default()
}

fn inverse_distance(points: &[(f64, f64, f64)], x: f64, y: f64, power: f64) -> f64 {
    let (mut weighted, mut total) = (0.0, 0.0);
    for &point in points {
        let distance = distance_squared(point, x, y);
        if distance == 0.0 {
            return point.2;
        }

        let weight = distance.powf(-power / 2.0);
        weighted += weight * point.2;
        total += weight;
    }

    weighted / total
}
