//! Turns 2D inputs (images, elevation points, text and QR matrices) into
//! closed triangle meshes and writes them out as binary STL.
//!
//! Every mode goes through the same pipeline: a builder from [`builder`]
//! produces a [`field::ScalarField`], [`mesh::generate_mesh`] turns it into a
//! [`mesh::Mesh`] and [`stl::write_stl`] saves it. [`material`] can split a
//! field into several aligned fields for multi-material prints.

use nalgebra::Vector3;

pub mod builder;
pub mod error;
pub mod field;
pub mod material;
pub mod mesh;
pub mod stl;

pub use builder::{
    braille::build_braille_field, depth::build_depth_field, height_map::build_height_map_field,
    qr::build_qr_field, topo::build_topo_field,
};
pub use error::{Error, Result};
pub use field::ScalarField;
pub use material::split_by_material;
pub use mesh::{generate_mesh, Mesh, Triangle};
pub use stl::write_stl;

pub type Pos = Vector3<f32>;
