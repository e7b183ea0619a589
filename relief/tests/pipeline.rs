use std::{fs, io::Cursor, path::Path};

use common::config::{BrailleConfig, HeightMapConfig, QrConfig, TopoConfig};
use image::{ImageBuffer, Luma};
use qrcode::{Color, QrCode};
use tempfile::TempDir;

use relief::{
    builder::{qr::ModuleMatrix, topo::GeoPoint, Brightness},
    build_braille_field, build_height_map_field, build_qr_field, build_topo_field,
    generate_mesh,
    mesh::expected_triangles,
    split_by_material,
    stl::{decode_stl, file_size},
    write_stl, Error, Mesh, ScalarField,
};

fn gradient(width: u32, height: u32) -> Brightness {
    ImageBuffer::from_fn(width, height, |x, y| {
        Luma([(x + y) as f32 / (width + height - 2) as f32])
    })
}

/// Writes `field` to `path`, then reads it back with both readers.
fn round_trip(field: &ScalarField, path: &Path) -> Mesh {
    let mesh = generate_mesh(field).unwrap();
    write_stl(&mesh, path, "pipeline test").unwrap();

    let data = fs::read(path).unwrap();
    assert_eq!(data.len(), file_size(mesh.triangle_count()));

    let file = decode_stl(&data).unwrap();
    assert_eq!(file.header.to_string(), "pipeline test");
    assert_eq!(file.mesh.triangles(), mesh.triangles());

    let indexed = stl_io::read_stl(&mut Cursor::new(&data)).unwrap();
    assert_eq!(indexed.faces.len(), mesh.triangle_count());

    // top samples plus the ring of base vertices under the edge
    let (width, height) = (field.width(), field.height());
    assert_eq!(
        indexed.vertices.len(),
        width * height + 2 * (width - 1) + 2 * (height - 1)
    );

    mesh
}

#[test]
fn height_map_to_file() {
    let dir = TempDir::new().unwrap();
    let config = HeightMapConfig {
        resolution: Some(32),
        ..Default::default()
    };

    let field = build_height_map_field(&gradient(64, 48), &config).unwrap();
    assert_eq!((field.width(), field.height()), (32, 24));

    let mesh = round_trip(&field, &dir.path().join("height_map.stl"));
    assert_eq!(mesh.triangle_count(), expected_triangles(32, 24));

    let (min, max) = mesh.bounds();
    assert_eq!(min.z, -config.base_thickness);
    // area averaging pulls the brightest corner slightly below full height
    assert!(max.z <= config.max_height && max.z > 0.95 * config.max_height);
    assert!(mesh.volume() > 0.0);
}

#[test]
fn identical_input_gives_identical_bytes() {
    let dir = TempDir::new().unwrap();
    let field = build_height_map_field(&gradient(20, 20), &HeightMapConfig::default()).unwrap();

    let (a, b) = (dir.path().join("a.stl"), dir.path().join("b.stl"));
    for path in [&a, &b] {
        write_stl(&generate_mesh(&field).unwrap(), path, "same").unwrap();
    }

    assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
}

#[test]
fn failed_writes_leave_nothing_behind() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.stl");

    let result = write_stl(&Mesh::default(), &path, "");
    assert!(matches!(result, Err(Error::EmptyMesh)));
    assert!(!path.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

    let field = build_height_map_field(&gradient(4, 4), &HeightMapConfig::default()).unwrap();
    let mesh = generate_mesh(&field).unwrap();
    let missing = dir.path().join("missing").join("out.stl");
    assert!(matches!(write_stl(&mesh, &missing, ""), Err(Error::Io(_))));
    assert!(!missing.exists());
}

#[test]
fn material_meshes_line_up() {
    let dir = TempDir::new().unwrap();
    let field = build_height_map_field(&gradient(16, 16), &HeightMapConfig::default()).unwrap();
    let fields = split_by_material(&field, &[5.0]).unwrap();
    assert_eq!(fields.len(), 2);

    let bounds = fields
        .iter()
        .enumerate()
        .map(|(material, part)| {
            let path = dir.path().join(format!("out_material_{material}.stl"));
            round_trip(part, &path).bounds()
        })
        .collect::<Vec<_>>();

    let (low, high) = (bounds[0], bounds[1]);
    assert_eq!(low.0.xy(), high.0.xy());
    assert_eq!(low.1.xy(), high.1.xy());
    assert!(low.1.z < 5.0);
    assert!(high.1.z >= 5.0);
}

#[test]
fn braille_plate() {
    let dir = TempDir::new().unwrap();
    let config = BrailleConfig::default();
    let field = build_braille_field("relief 3d", &config).unwrap();

    let mesh = round_trip(&field, &dir.path().join("braille.stl"));
    let (min, max) = mesh.bounds();
    assert_eq!(min.z, -config.base_thickness);
    assert!(max.z <= config.dot_height && max.z > 0.5 * config.dot_height);

    assert!(matches!(
        build_braille_field("ümlaut", &config),
        Err(Error::UnsupportedCharacter { position: 0, .. })
    ));
}

#[test]
fn qr_code_plate() {
    let dir = TempDir::new().unwrap();
    let code = QrCode::new(b"https://example.com").unwrap();
    let modules = code.to_colors().into_iter().map(|x| x == Color::Dark).collect();
    let matrix = ModuleMatrix::new(code.width(), modules).unwrap();

    let config = QrConfig::default();
    let field = build_qr_field(&matrix, &config).unwrap();
    let per_module = config.samples_per_module as usize;
    assert_eq!(field.width(), (code.width() + 8) * per_module + 1);

    let side = (code.width() + 8) as f32 * config.module_size;
    assert_eq!(field.footprint(), (side, side));

    let mesh = round_trip(&field, &dir.path().join("qr.stl"));
    let (_, max) = mesh.bounds();
    assert_eq!(max.z, config.module_height);
}

#[test]
fn topo_surface() {
    let dir = TempDir::new().unwrap();
    let points = (0..10)
        .flat_map(|y| (0..10).map(move |x| (x, y)))
        .map(|(x, y)| GeoPoint {
            latitude: 47.0 + y as f64 * 0.001,
            longitude: 8.0 + x as f64 * 0.001,
            elevation: 400.0 + (x * y) as f64,
        })
        .collect::<Vec<_>>();

    let config = TopoConfig {
        grid_resolution: 24,
        vertical_scale: 0.1,
        ..Default::default()
    };
    let field = build_topo_field(&points, &config).unwrap();
    assert_eq!((field.width(), field.height()), (24, 24));

    let (low, high) = field.value_range();
    assert_eq!(low, 0.0);
    assert!(high <= 81.0 * 0.1 + 1e-3);

    let mesh = round_trip(&field, &dir.path().join("topo.stl"));
    assert!(mesh.volume() > 0.0);

    assert!(matches!(
        build_topo_field(&points[..2], &config),
        Err(Error::InsufficientData { points: 2 })
    ));
}
