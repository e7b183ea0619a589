//! Binary STL, laid out as
//! ```text
//! UINT8[80]    – Header                 - 80 bytes
//! UINT32       – Number of triangles    - 04 bytes
//! foreach triangle                      - 50 bytes
//!     REAL32[3] – Normal vector         - 12 bytes
//!     REAL32[3] – Vertex 1              - 12 bytes
//!     REAL32[3] – Vertex 2              - 12 bytes
//!     REAL32[3] – Vertex 3              - 12 bytes
//!     UINT16    – Attribute byte count  - 02 bytes
//! end
//! ```
//! with every number little-endian.

use std::{io::Write, path::Path, time::Instant};

use common::serde::{Deserializer, DynamicSerializer, Serializer, SizedString, SliceDeserializer};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::{
    mesh::{Mesh, Triangle},
    Error, Pos, Result,
};

pub const HEADER_SIZE: usize = 80;
pub const TRIANGLE_SIZE: usize = 50;

pub type Header = SizedString<HEADER_SIZE>;

/// A decoded binary STL file.
#[derive(Debug, Clone)]
pub struct StlFile {
    pub header: Header,
    pub mesh: Mesh,
}

/// Size in bytes of a file holding `triangles` triangles.
pub fn file_size(triangles: usize) -> usize {
    HEADER_SIZE + 4 + TRIANGLE_SIZE * triangles
}

/// Encodes a mesh in memory. The comment is cut to 80 bytes and zero padded.
/// Headers starting with `solid` get a prefix, as readers take those for
/// ASCII STL.
pub fn encode_stl(mesh: &Mesh, header_comment: &str) -> Result<Vec<u8>> {
    if mesh.is_empty() {
        return Err(Error::EmptyMesh);
    }

    let count = u32::try_from(mesh.triangle_count()).map_err(|_| {
        Error::invalid(format!(
            "{} triangles do not fit in a binary STL",
            mesh.triangle_count()
        ))
    })?;

    let header = if header_comment.starts_with("solid") {
        warn!("STL header starts with `solid`, prefixing it");
        Header::new(format!("binary {header_comment}").as_bytes())
    } else {
        Header::new(header_comment.as_bytes())
    };

    let mut ser = DynamicSerializer::with_capacity(file_size(mesh.triangle_count()));
    ser.write_sized_string(&header);
    ser.write_u32_le(count);

    for triangle in mesh.triangles() {
        write_vec3(&mut ser, &triangle.normal);
        for vertex in &triangle.vertices {
            write_vec3(&mut ser, vertex);
        }
        ser.write_u16_le(0);
    }

    debug_assert_eq!(ser.pos(), file_size(mesh.triangle_count()));
    Ok(ser.into_inner())
}

/// Writes a mesh to `path`. The data goes to a temporary file in the same
/// directory first and is only moved into place once fully written, so a
/// failed write never leaves a partial file behind.
pub fn write_stl(mesh: &Mesh, path: impl AsRef<Path>, header_comment: &str) -> Result<()> {
    let path = path.as_ref();
    let start = Instant::now();
    let data = encode_stl(mesh, header_comment)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(&data)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;

    info!(
        "Wrote {} triangles to `{}` in {:?}",
        mesh.triangle_count(),
        path.display(),
        start.elapsed()
    );
    Ok(())
}

/// Decodes a binary STL file, keeping the stored normals and triangle order.
pub fn decode_stl(data: &[u8]) -> Result<StlFile> {
    let mut des = SliceDeserializer::new(data);
    if des.remaining() < file_size(0) {
        return Err(Error::invalid(format!(
            "STL file is {} bytes, shorter than the {} byte header",
            data.len(),
            file_size(0)
        )));
    }

    let header = Header::new(des.read_bytes(HEADER_SIZE));
    let count = des.read_u32_le() as usize;

    let expected = file_size(count);
    if data.len() != expected {
        return Err(Error::invalid(format!(
            "STL file with {count} triangles should be {expected} bytes, got {}",
            data.len()
        )));
    }

    let triangles = (0..count)
        .map(|_| {
            let normal = read_vec3(&mut des);
            let vertices = [read_vec3(&mut des), read_vec3(&mut des), read_vec3(&mut des)];
            des.advance_by(2);
            Triangle { normal, vertices }
        })
        .collect();

    Ok(StlFile {
        header,
        mesh: Mesh::new(triangles),
    })
}

fn write_vec3<T: Serializer>(ser: &mut T, vec: &Pos) {
    ser.write_f32_le(vec.x);
    ser.write_f32_le(vec.y);
    ser.write_f32_le(vec.z);
}

fn read_vec3<T: Deserializer>(des: &mut T) -> Pos {
    Pos::new(des.read_f32_le(), des.read_f32_le(), des.read_f32_le())
}
