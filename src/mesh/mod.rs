//! Core mesh data structures.
//!
//! The primary type is [`PolyMesh`], a face-vertex mesh: point positions, a
//! list of polygon cells (normally triangles) and an optional per-vertex color
//! attribute. This is the shape of data a viewer hands over after loading a
//! model, and the shape the weight engine reads.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a point
//! - [`CellId`] - Identifies a cell
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use harmonica::mesh::{PolyMesh, build_from_triangles};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();
//! ```

mod builder;
mod color;
mod index;
mod polymesh;
pub mod primitives;

pub use builder::{build_from_polygons, build_from_triangles, to_face_vertex};
pub use color::Rgb;
pub use index::{CellId, MeshIndex, VertexId};
pub use polymesh::PolyMesh;
