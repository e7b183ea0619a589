use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{field::ScalarField, Error, Pos, Result};

/// Twice the area below which a triangle is treated as degenerate.
const MIN_DOUBLE_AREA: f32 = 1e-9;

/// A single facet with an outward facing unit normal. Vertices are wound
/// counter-clockwise when seen from outside the solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub normal: Pos,
    pub vertices: [Pos; 3],
}

/// An unindexed triangle soup, the same shape of data a binary STL file holds.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    dropped: usize,
    closed: bool,
}

impl Triangle {
    /// Creates a triangle, computing its normal from the winding. Returns
    /// `None` if the vertices are (close to) collinear.
    pub fn new(vertices: [Pos; 3]) -> Option<Self> {
        let [v0, v1, v2] = vertices;
        let cross = (v1 - v0).cross(&(v2 - v0));
        let length = cross.norm();

        (length > MIN_DOUBLE_AREA).then(|| Self {
            normal: cross / length,
            vertices,
        })
    }

    pub fn area(&self) -> f32 {
        let [v0, v1, v2] = self.vertices;
        (v1 - v0).cross(&(v2 - v0)).norm() / 2.0
    }
}

impl Mesh {
    /// Wraps an arbitrary triangle list. Nothing is known about whether it
    /// encloses a volume.
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self {
            triangles,
            dropped: 0,
            closed: false,
        }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Number of degenerate triangles left out while generating the mesh.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Advisory flag set when the mesh was generated as a closed solid.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Enclosed volume in mm³, only meaningful for closed meshes.
    pub fn volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|tri| {
                let [v0, v1, v2] = tri.vertices.map(|v| v.cast::<f64>());
                v0.dot(&v1.cross(&v2))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Get the minimum and maximum of each component of every vertex in the
    /// mesh. These points define the bounding box of the model.
    pub fn bounds(&self) -> (Pos, Pos) {
        self.triangles.iter().flat_map(|tri| tri.vertices).fold(
            (Pos::repeat(f32::MAX), Pos::repeat(f32::MIN)),
            |(min, max), v| (min.inf(&v), max.sup(&v)),
        )
    }
}

/// Number of triangles [`generate_mesh`] emits for a `width` x `height` field
/// before degenerate ones are dropped: the top surface, two per boundary
/// segment for the walls and two for the base. Sizes below 2x2 are not valid
/// fields and give zero.
pub fn expected_triangles(width: usize, height: usize) -> usize {
    if width < 2 || height < 2 {
        return 0;
    }

    let (quads_x, quads_y) = (width - 1, height - 1);
    2 * quads_x * quads_y + 2 * (2 * quads_x + 2 * quads_y) + 2
}

/// Turns a field into a closed solid: a top surface following the samples,
/// vertical walls around the outside and a flat base.
///
/// Sample `(x, y)` sits at `(x * cell, (height - 1 - y) * cell)` so an image
/// reads the right way round from above. The base is at
/// `min(0, lowest sample) - base_thickness`. Triangles are emitted top first
/// (row by row), then walls, then base, and the order only depends on the
/// field's size.
pub fn generate_mesh(field: &ScalarField) -> Result<Mesh> {
    let (width, height) = (field.width(), field.height());
    let cell = field.cell_size();

    let (min, max) = field.value_range();
    let bottom = min.min(0.0) - field.base_thickness();
    if max - bottom <= f32::EPSILON {
        return Err(Error::invalid(
            "field is flat at the base and has no thickness",
        ));
    }

    let position = |x: usize, y: usize, z: f32| {
        Pos::new(x as f32 * cell, (height - 1 - y) as f32 * cell, z)
    };
    let top = |x: usize, y: usize| position(x, y, field.get(x, y));

    // Each quad is split along the same diagonal (front left to back right).
    let mut triangles = (0..height - 1)
        .into_par_iter()
        .flat_map_iter(|y| {
            (0..width - 1)
                .flat_map(move |x| {
                    let (a, b) = (top(x, y + 1), top(x + 1, y + 1));
                    let (c, d) = (top(x + 1, y), top(x, y));
                    [Triangle::new([a, b, c]), Triangle::new([a, c, d])]
                })
                .flatten()
        })
        .collect::<Vec<_>>();

    // The boundary is walked counter-clockwise from above, so the outside is
    // always to the right of each segment.
    for (&(x0, y0), &(x1, y1)) in boundary_loop(width, height).iter().circular_tuple_windows() {
        let (t0, t1) = (top(x0, y0), top(x1, y1));
        let (b0, b1) = (position(x0, y0, bottom), position(x1, y1, bottom));
        triangles.extend(Triangle::new([b0, b1, t1]));
        triangles.extend(Triangle::new([b0, t1, t0]));
    }

    let (right, front) = (width - 1, height - 1);
    let corners = [
        position(0, front, bottom),
        position(right, front, bottom),
        position(right, 0, bottom),
        position(0, 0, bottom),
    ];
    triangles.extend(Triangle::new([corners[0], corners[2], corners[1]]));
    triangles.extend(Triangle::new([corners[0], corners[3], corners[2]]));

    let dropped = expected_triangles(width, height) - triangles.len();
    debug!(
        "Generated {} triangles from a {}x{} field ({} degenerate dropped)",
        triangles.len(),
        width,
        height,
        dropped
    );
    if dropped > 0 {
        warn!("Dropped {dropped} degenerate triangles, the mesh may have holes");
    }

    Ok(Mesh {
        triangles,
        dropped,
        closed: true,
    })
}

/// Grid positions around the edge of a field, counter-clockwise when viewed
/// from above, starting at the front left corner.
fn boundary_loop(width: usize, height: usize) -> Vec<(usize, usize)> {
    let (right, front) = (width - 1, height - 1);

    (0..right)
        .map(|x| (x, front))
        .chain((1..=front).rev().map(|y| (right, y)))
        .chain((1..=right).rev().map(|x| (x, 0)))
        .chain((0..front).map(|y| (0, y)))
        .collect()
}
