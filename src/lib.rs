//! # Harmonica
//!
//! Harmonic-like weight functions over triangle meshes, and the deformation,
//! colorization and smoothing operations that consume them.
//!
//! Given a mesh and a seed point, harmonica computes a scalar weight over the
//! points that peaks at the seed and falls off with distance. Three methods
//! are available:
//!
//! - **Ring falloff**: linear in breadth-first ring distance
//! - **Diffusion**: a unit impulse spread by repeated neighbor averaging
//! - **Laplace solve**: the cotangent-Laplace equation on a ring patch with a
//!   pinned boundary, solved with a sparse LU
//!
//! ## Quick Start
//!
//! ```
//! use harmonica::prelude::*;
//!
//! let mut mesh: PolyMesh = harmonica::mesh::primitives::icosphere(2).unwrap();
//! let seed = VertexId::new(0);
//!
//! let weights = solve_laplace(&mesh, seed, 4).unwrap();
//! weighted_translate(&mut mesh, seed, 0.25, &weights).unwrap();
//! colorize(&mut mesh, seed, &weights, &ColorRamp::default()).unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use harmonica::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.num_cells(), 4);
//! ```
//!
//! ## Choosing a Method at Runtime
//!
//! ```
//! use harmonica::prelude::*;
//!
//! let mesh: PolyMesh = harmonica::mesh::primitives::hex_disk(4).unwrap();
//! let method = WeightMethod::Diffusion { alpha: 0.9, iterations: 20 }.sanitized();
//!
//! let weights = method.compute(&mesh, VertexId::new(0), &Progress::none()).unwrap();
//! let values = weights.evaluate_all(mesh.num_vertices());
//! assert!(values.iter().all(|&w| w >= 0.0));
//! ```
//!
//! ## Cancellation
//!
//! Every long-running operation has a variant taking a [`Progress`](algo::Progress),
//! which can carry a [`CancelToken`](algo::CancelToken) and a deadline:
//!
//! ```
//! use std::time::Duration;
//! use harmonica::prelude::*;
//!
//! let mesh: PolyMesh = harmonica::mesh::primitives::icosphere(3).unwrap();
//! let progress = Progress::none().with_timeout(Duration::from_secs(10));
//! let options = LaplaceOptions::default().with_ring_count(5);
//!
//! match solve_laplace_with_options(&mesh, VertexId::new(0), &options, &progress) {
//!     Ok(weights) => println!("{} points weighted", weights.ordering().len()),
//!     Err(MeshError::Cancelled) => println!("gave up"),
//!     Err(err) => panic!("{}", err),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;
pub mod topology;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use harmonica::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::colorize::{colorize, ColorRamp};
    pub use crate::algo::deform::{vertex_normals, weighted_translate};
    pub use crate::algo::smooth::laplacian_smoothing;
    pub use crate::algo::weight::{
        laplacian_diffusion, simple_harmonic, solve_laplace, solve_laplace_with_options,
        DiffusionWeights, LaplaceOptions, LaplaceWeights, RingWeights, WeightFunction,
        WeightMethod, Weights,
    };
    pub use crate::algo::{CancelToken, Progress};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_triangles, to_face_vertex, CellId, MeshIndex, PolyMesh,
        Rgb, VertexId,
    };
    pub use crate::topology::{build_neighbor_map, build_ring_map, NeighborMap, RingMap};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
