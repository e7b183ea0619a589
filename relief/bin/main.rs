use std::{
    f64::consts::TAU,
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use qrcode::{Color, QrCode};
use rayon::prelude::*;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

use args::{Args, Mode};
use common::config::{Config, Interpolation};
use relief::{
    builder::{brightness_from_gray, qr::ModuleMatrix, topo::GeoPoint, Brightness},
    generate_mesh,
    material::{midpoint_threshold, MaterialAssignment},
    stl::decode_stl,
    write_stl, ScalarField,
};

mod args;

const DEFAULT_CONFIG: &str = "relief.toml";

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };
    let filter = filter::Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("relief", level)
        .with_target("common", level);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config `{}`", path.display()))?,
        None => Config::load_or_default(Path::new(DEFAULT_CONFIG)),
    };
    args.apply(&mut config);

    let now = Instant::now();
    match args.mode {
        Mode::Heightmap {
            input,
            output,
            image,
        } => {
            let height_map = &mut config.height_map;
            image.apply(
                &mut height_map.max_height,
                &mut height_map.base_thickness,
                &mut height_map.resolution,
                &mut height_map.resample,
            );

            let field = relief::build_height_map_field(&load_image(&input)?, height_map)?;
            save(&field, &output, &config.header)?;
        }
        Mode::Topo {
            csv,
            demo,
            output,
            grid_resolution,
            vertical_scale,
            nearest,
        } => {
            let topo = &mut config.topo;
            if let Some(value) = grid_resolution {
                topo.grid_resolution = value;
            }
            if let Some(value) = vertical_scale {
                topo.vertical_scale = value;
            }
            if nearest {
                topo.interpolation = Interpolation::Nearest;
            }

            let points = match csv {
                Some(path) if !demo => read_points(&path)?,
                _ => demo_terrain(),
            };
            println!("Loaded {} elevation points", points.len());

            let field = relief::build_topo_field(&points, topo)?;
            save(&field, &output, &config.header)?;
        }
        Mode::Braille {
            text,
            output,
            dot_height,
        } => {
            if let Some(value) = dot_height {
                config.braille.dot_height = value;
            }

            let field = relief::build_braille_field(&text, &config.braille)?;
            save(&field, &output, &config.header)?;
        }
        Mode::Qr {
            payload,
            output,
            module_size,
            stamp,
        } => {
            if let Some(value) = module_size {
                config.qr.module_size = value;
            }
            config.qr.stamp |= stamp;

            let matrix = qr_matrix(&payload)?;
            println!("Encoded payload as a {0}x{0} QR symbol", matrix.size());

            let field = relief::build_qr_field(&matrix, &config.qr)?;
            save(&field, &output, &config.header)?;
        }
        Mode::Depth {
            input,
            output,
            image,
        } => {
            let depth = &mut config.depth;
            image.apply(
                &mut depth.max_height,
                &mut depth.base_thickness,
                &mut depth.resolution,
                &mut depth.resample,
            );

            let field = relief::build_depth_field(&load_image(&input)?, depth)?;
            save(&field, &output, &config.header)?;
        }
        Mode::Multi {
            input,
            prefix,
            thresholds,
            image,
        } => {
            let height_map = &mut config.height_map;
            image.apply(
                &mut height_map.max_height,
                &mut height_map.base_thickness,
                &mut height_map.resolution,
                &mut height_map.resample,
            );
            if !thresholds.is_empty() {
                config.material.thresholds = thresholds;
            }

            let field = relief::build_height_map_field(&load_image(&input)?, height_map)?;
            save_materials(&field, &config.material.thresholds, &prefix, &config.header)?;
        }
        Mode::Inspect { input } => inspect(&input)?,
    }

    println!("Done. Elapsed: {:.1}s", now.elapsed().as_secs_f32());
    Ok(())
}

fn load_image(path: &Path) -> Result<Brightness> {
    let image = image::open(path)
        .with_context(|| format!("Failed to open image `{}`", path.display()))?
        .to_luma8();
    println!(
        "Loaded `{}`. {{ width: {}, height: {} }}",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(brightness_from_gray(&image))
}

fn save(field: &ScalarField, path: &Path, header: &str) -> Result<()> {
    let mesh = generate_mesh(field)?;
    write_stl(&mesh, path, header)
        .with_context(|| format!("Failed to write `{}`", path.display()))?;

    let (min, max) = mesh.bounds();
    let size = max - min;
    println!(
        "Wrote `{}`. {{ triangles: {}, size: {:.1}x{:.1}x{:.1}mm }}",
        path.display(),
        mesh.triangle_count(),
        size.x,
        size.y,
        size.z
    );
    Ok(())
}

fn save_materials(field: &ScalarField, thresholds: &[f32], prefix: &Path, header: &str) -> Result<()> {
    let thresholds = if thresholds.is_empty() {
        vec![midpoint_threshold(field)]
    } else {
        thresholds.to_vec()
    };

    let assignment = MaterialAssignment::new(field, &thresholds)?;
    let counts = assignment.counts();
    let fields = assignment.split(field)?;

    fields
        .par_iter()
        .enumerate()
        .filter(|(material, _)| counts[*material] > 0)
        .try_for_each(|(material, field)| {
            let path = material_path(prefix, material);
            save(field, &path, &format!("{header} (material {material})"))
        })?;

    let skipped = counts.iter().filter(|&&x| x == 0).count();
    if skipped > 0 {
        println!(" \\ Skipped {skipped} empty materials.");
    }
    Ok(())
}

fn material_path(prefix: &Path, material: usize) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!("_material_{material}.stl"));
    PathBuf::from(name)
}

/// Reads elevation points from a CSV file. Columns are found by their header
/// name so their order does not matter.
fn read_points(path: &Path) -> Result<Vec<GeoPoint>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open `{}`", path.display()))?;

    let headers = reader.headers()?.clone();
    let column = |names: &[&str]| {
        headers
            .iter()
            .position(|header| names.contains(&header.trim().to_lowercase().as_str()))
            .ok_or_else(|| anyhow!("Missing `{}` column in `{}`", names[0], path.display()))
    };
    let latitude = column(&["latitude", "lat"])?;
    let longitude = column(&["longitude", "lon", "long", "lng"])?;
    let elevation = column(&["elevation", "elev", "height", "altitude"])?;

    let mut points = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let value = |idx: usize| -> Result<f64> {
            let raw = record.get(idx).unwrap_or_default().trim();
            raw.parse()
                .with_context(|| format!("Invalid number `{raw}` on row {}", row + 1))
        };

        points.push(GeoPoint {
            latitude: value(latitude)?,
            longitude: value(longitude)?,
            elevation: value(elevation)?,
        });
    }

    Ok(points)
}

/// A 30x30 grid of points over roughly 1km of rolling hills.
fn demo_terrain() -> Vec<GeoPoint> {
    const SIZE: usize = 30;
    const ORIGIN: (f64, f64) = (46.55, 8.0);
    const EXTENT: f64 = 0.01;

    (0..SIZE * SIZE)
        .map(|i| {
            let (u, v) = (
                (i % SIZE) as f64 / (SIZE - 1) as f64,
                (i / SIZE) as f64 / (SIZE - 1) as f64,
            );
            let elevation = 1200.0
                + 80.0 * (u * TAU).sin() * (v * TAU * 0.5).cos()
                + 40.0 * (u * TAU * 2.0 + v * TAU * 1.5).sin()
                + 15.0 * (v * TAU * 4.0).cos();

            GeoPoint {
                latitude: ORIGIN.0 + v * EXTENT,
                longitude: ORIGIN.1 + u * EXTENT,
                elevation,
            }
        })
        .collect()
}

fn qr_matrix(payload: &str) -> Result<ModuleMatrix> {
    if payload.is_empty() {
        bail!("QR payload is empty");
    }

    let code = QrCode::new(payload.as_bytes()).map_err(|err| anyhow!("Failed to encode QR code: {err}"))?;
    let modules = code
        .to_colors()
        .into_iter()
        .map(|color| color == Color::Dark)
        .collect();
    Ok(ModuleMatrix::new(code.width(), modules)?)
}

fn inspect(path: &Path) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("Failed to read `{}`", path.display()))?;
    let file = decode_stl(&data)?;
    let (min, max) = file.mesh.bounds();

    println!("Header: {:?}", file.header.to_string());
    println!("Triangles: {}", file.mesh.triangle_count());
    println!(
        "Bounds: ({:.2}, {:.2}, {:.2}) to ({:.2}, {:.2}, {:.2})",
        min.x, min.y, min.z, max.x, max.y, max.z
    );
    println!("Volume: {:.2}mm³", file.mesh.volume());
    Ok(())
}
