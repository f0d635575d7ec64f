//! Uniform Laplacian smoothing.
//!
//! Each iteration replaces every point by the average of itself and its
//! neighbors, all with weight `1 / (degree + 1)`. New positions are computed
//! from the previous iteration only and written back at the end of the
//! iteration. Repeated application shrinks the mesh.
//!
//! # Example
//!
//! ```
//! use harmonica::prelude::*;
//! use harmonica::algo::smooth::{laplacian_smoothing_with_options, SmoothOptions};
//!
//! let mut mesh: PolyMesh = harmonica::mesh::primitives::icosphere(2).unwrap();
//!
//! // Plain call
//! laplacian_smoothing(&mut mesh, 2);
//!
//! // Parallel, cancellable
//! let options = SmoothOptions::default().with_iterations(3).with_parallel(true);
//! laplacian_smoothing_with_options(&mut mesh, &options, &Progress::none()).unwrap();
//! ```

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::algo::progress::Progress;
use crate::error::Result;
use crate::mesh::{MeshIndex, PolyMesh, VertexId};
use crate::topology::{build_neighbor_map, NeighborMap};

/// Options for mesh smoothing.
#[derive(Debug, Clone)]
pub struct SmoothOptions {
    /// Number of smoothing iterations.
    pub iterations: usize,

    /// Whether to evaluate points in parallel (default: false).
    pub parallel: bool,
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            parallel: false,
        }
    }
}

impl SmoothOptions {
    /// Create options with the specified number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Smooth `mesh` in place for `iterations` rounds.
///
/// Points without neighbors stay where they are. `iterations == 0` leaves the
/// mesh untouched.
pub fn laplacian_smoothing<I: MeshIndex>(mesh: &mut PolyMesh<I>, iterations: usize) {
    let neighbors = build_neighbor_map(mesh);
    for _ in 0..iterations {
        let next = smooth_step(mesh.positions(), &neighbors, false);
        mesh.positions = next;
    }
}

/// [`laplacian_smoothing`] with options, progress reporting and cancellation.
///
/// Iterations run on a private copy of the positions, which replaces the
/// mesh's only after the last one. On [`MeshError::Cancelled`] the mesh is
/// untouched.
///
/// [`MeshError::Cancelled`]: crate::error::MeshError::Cancelled
pub fn laplacian_smoothing_with_options<I: MeshIndex>(
    mesh: &mut PolyMesh<I>,
    options: &SmoothOptions,
    progress: &Progress,
) -> Result<()> {
    let neighbors = build_neighbor_map(mesh);
    let mut positions = mesh.positions().to_vec();
    for i in 0..options.iterations {
        progress.checkpoint(i, options.iterations, "Smoothing")?;
        positions = smooth_step(&positions, &neighbors, options.parallel);
    }
    mesh.set_positions(positions)?;
    tracing::debug!(
        iterations = options.iterations,
        parallel = options.parallel,
        vertices = mesh.num_vertices(),
        "smoothing finished"
    );
    Ok(())
}

/// One smoothing round over all points.
fn smooth_step<I: MeshIndex>(
    positions: &[Point3<f64>],
    neighbors: &NeighborMap<I>,
    parallel: bool,
) -> Vec<Point3<f64>> {
    let average = |i: usize| {
        let ns = neighbors.neighbors(VertexId::new(i));
        if ns.is_empty() {
            return positions[i];
        }
        let sum: Vector3<f64> = ns
            .iter()
            .fold(positions[i].coords, |acc, q| acc + positions[q.index()].coords);
        Point3::from(sum / (ns.len() + 1) as f64)
    };

    if parallel {
        (0..positions.len()).into_par_iter().map(average).collect()
    } else {
        (0..positions.len()).map(average).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::progress::CancelToken;
    use crate::error::MeshError;
    use crate::mesh::{build_from_triangles, primitives};

    fn create_tetrahedron() -> PolyMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let mut mesh: PolyMesh = primitives::icosphere(1).unwrap();
        let before = mesh.clone();
        laplacian_smoothing(&mut mesh, 0);
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_tetrahedron_collapses_to_centroid() {
        // Every point neighbors all others: one round sends each to the centroid.
        let mut mesh = create_tetrahedron();
        let centroid = Point3::new(0.5, 0.375, 0.25);
        laplacian_smoothing(&mut mesh, 1);
        for p in mesh.positions() {
            assert!((p - centroid).norm() < 1e-12);
        }
    }

    #[test]
    fn test_single_round_on_grid() {
        let mut mesh: PolyMesh = primitives::grid(2).unwrap();
        let before = mesh.clone();
        laplacian_smoothing(&mut mesh, 1);

        // Interior point of a symmetric neighborhood does not move
        assert!((mesh.position(VertexId::new(4)) - before.position(VertexId::new(4))).norm() < 1e-12);
        // Corner (0,0) with neighbors (1,0), (0,1), (1,1)
        let corner = mesh.position(VertexId::new(0));
        assert!((corner - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
        // Topology untouched
        assert_eq!(mesh.num_cells(), before.num_cells());
    }

    #[test]
    fn test_uses_previous_positions_only() {
        // Path of two triangles sharing an edge; compare against a manual
        // double-buffered update.
        let mut mesh: PolyMesh = primitives::grid(1).unwrap();
        let before: Vec<Point3<f64>> = mesh.positions().to_vec();
        let neighbors = build_neighbor_map(&mesh);
        laplacian_smoothing(&mut mesh, 1);

        for v in mesh.vertex_ids() {
            let ns = neighbors.neighbors(v);
            let mut sum = before[v.index()].coords;
            for q in ns {
                sum += before[q.index()].coords;
            }
            let expected = sum / (ns.len() + 1) as f64;
            assert!((mesh.position(v).coords - expected).norm() < 1e-12);
        }
    }

    #[test]
    fn test_isolated_point_stays() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(7.0, 7.0, 7.0),
        ];
        let mut mesh: PolyMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
        laplacian_smoothing(&mut mesh, 3);
        assert_eq!(*mesh.position(VertexId::new(3)), Point3::new(7.0, 7.0, 7.0));
    }

    #[test]
    fn test_sphere_shrinks() {
        let mut mesh: PolyMesh = primitives::icosphere(2).unwrap();
        laplacian_smoothing(&mut mesh, 5);
        for p in mesh.positions() {
            assert!(p.coords.norm() < 1.0);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut seq: PolyMesh = primitives::icosphere(2).unwrap();
        let mut par = seq.clone();
        let progress = Progress::none();

        let options = SmoothOptions::default().with_iterations(4);
        laplacian_smoothing_with_options(&mut seq, &options, &progress).unwrap();
        let options = options.with_parallel(true);
        laplacian_smoothing_with_options(&mut par, &options, &progress).unwrap();

        assert_eq!(seq.positions(), par.positions());
    }

    #[test]
    fn test_cancellation_keeps_mesh() {
        let mut mesh: PolyMesh = primitives::icosphere(1).unwrap();
        let before = mesh.clone();
        let token = CancelToken::new();
        token.cancel();
        let progress = Progress::none().with_cancel(token);
        let options = SmoothOptions::default().with_iterations(10);

        assert_eq!(
            laplacian_smoothing_with_options(&mut mesh, &options, &progress).unwrap_err(),
            MeshError::Cancelled
        );
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_cancel_between_iterations_keeps_mesh() {
        let mut mesh: PolyMesh = primitives::icosphere(1).unwrap();
        let before = mesh.clone();
        let token = CancelToken::new();
        let trigger = token.clone();
        let progress = Progress::new(move |current, _, _| {
            if current == 2 {
                trigger.cancel();
            }
        })
        .with_cancel(token);
        let options = SmoothOptions::default().with_iterations(10);

        assert_eq!(
            laplacian_smoothing_with_options(&mut mesh, &options, &progress).unwrap_err(),
            MeshError::Cancelled
        );
        assert_eq!(mesh, before);
    }
}
