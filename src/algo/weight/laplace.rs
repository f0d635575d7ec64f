//! Harmonic weights from a direct cotangent-Laplace solve.
//!
//! The patch is every point within `ring_count - 1` rings of the seed. On it we
//! solve `L x = e_seed` where `L` is the cotangent Laplacian of the patch
//! triangles and the outermost ring is pinned to zero (Dirichlet rows). The
//! weight of a patch point is `|x|` at that point.
//!
//! For an interior point `i` the assembled row reads
//!
//! ```text
//! sum_j w_ij (x_j - x_i) = 0        w_ij = (cot a_ij + cot b_ij) / 2
//! ```
//!
//! so away from the seed the solution is a weighted mean of its neighbors.

use std::time::Instant;

use nalgebra::{DVector, Point3};

use crate::algo::progress::Progress;
use crate::algo::sparse::{CsrMatrix, SparseLu};
use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, PolyMesh, VertexId};
use crate::topology::{build_ring_map_with_progress, RingMap};

use super::WeightFunction;

const UNMAPPED: u32 = u32::MAX;

/// Options for [`solve_laplace_with_options`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaplaceOptions {
    /// Number of ring-expansion rounds defining the patch.
    pub ring_count: usize,

    /// A triangle is skipped when the sine of one of its angles is at or
    /// below this value.
    pub degenerate_epsilon: f64,

    /// Relative pivot threshold of the sparse LU.
    pub pivot_tolerance: f64,
}

impl Default for LaplaceOptions {
    fn default() -> Self {
        Self {
            ring_count: 1,
            degenerate_epsilon: 1e-12,
            pivot_tolerance: 1e-12,
        }
    }
}

impl LaplaceOptions {
    /// Set the number of rings.
    pub fn with_ring_count(mut self, ring_count: usize) -> Self {
        self.ring_count = ring_count;
        self
    }

    /// Set the degenerate-triangle threshold.
    pub fn with_degenerate_epsilon(mut self, epsilon: f64) -> Self {
        self.degenerate_epsilon = epsilon;
        self
    }

    /// Set the pivot tolerance.
    pub fn with_pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = tolerance;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.ring_count == 0 {
            return Err(MeshError::invalid_param(
                "ring_count",
                self.ring_count,
                "must be at least 1",
            ));
        }
        if !(self.degenerate_epsilon.is_finite() && self.degenerate_epsilon >= 0.0) {
            return Err(MeshError::invalid_param(
                "degenerate_epsilon",
                self.degenerate_epsilon,
                "must be finite and non-negative",
            ));
        }
        if !(self.pivot_tolerance.is_finite() && self.pivot_tolerance >= 0.0) {
            return Err(MeshError::invalid_param(
                "pivot_tolerance",
                self.pivot_tolerance,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Dense local numbering of the points of a ring map.
///
/// Local indices follow the ring map's visit order: the seed is 0 and each
/// ring occupies a contiguous range. Indices from
/// [`last_ring_start`](Self::last_ring_start) on belong to the outermost
/// populated ring and form the Dirichlet boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalOrdering<I: MeshIndex = u32> {
    local: Vec<u32>,
    points: Vec<VertexId<I>>,
    last_ring_start: usize,
}

impl<I: MeshIndex> LocalOrdering<I> {
    /// Number the points of `ring_map`.
    pub fn new(ring_map: &RingMap<I>) -> Self {
        let points = ring_map.order().to_vec();
        let mut local = vec![UNMAPPED; ring_map.num_vertices()];
        for (i, p) in points.iter().enumerate() {
            local[p.index()] = i as u32;
        }
        let last_ring_start = ring_map
            .outermost_ring()
            .and_then(|r| ring_map.ring_start(r))
            .unwrap_or(0);

        Self {
            local,
            points,
            last_ring_start,
        }
    }

    /// Local index of a point, `None` outside the patch.
    #[inline]
    pub fn local(&self, v: VertexId<I>) -> Option<usize> {
        match self.local.get(v.index()) {
            Some(&i) if i != UNMAPPED => Some(i as usize),
            _ => None,
        }
    }

    /// Point with local index `i`.
    #[inline]
    pub fn point(&self, i: usize) -> VertexId<I> {
        self.points[i]
    }

    /// Patch points in local order.
    #[inline]
    pub fn points(&self) -> &[VertexId<I>] {
        &self.points
    }

    /// Number of patch points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True for an empty patch.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First local index of the boundary ring.
    #[inline]
    pub fn last_ring_start(&self) -> usize {
        self.last_ring_start
    }

    /// Check whether local index `i` is a boundary row.
    #[inline]
    pub fn is_boundary(&self, i: usize) -> bool {
        i >= self.last_ring_start
    }
}

/// Half cotangents of a triangle, opposite each edge.
///
/// Returns `[h01, h02, h12]` where `h01` is `0.5 * cot` of the angle at the
/// corner opposite edge (0, 1), and so on. `None` when any angle has a sine at
/// or below `epsilon`, including coincident corners.
fn half_cotangents(p: [&Point3<f64>; 3], epsilon: f64) -> Option<[f64; 3]> {
    // (i, j, opposite)
    const EDGES: [(usize, usize, usize); 3] = [(0, 1, 2), (0, 2, 1), (1, 2, 0)];

    let mut out = [0.0; 3];
    for (slot, &(i, j, o)) in EDGES.iter().enumerate() {
        let a = p[i] - p[o];
        let b = p[j] - p[o];
        let cross = a.cross(&b).norm();
        if cross <= epsilon * a.norm() * b.norm() {
            return None;
        }
        out[slot] = 0.5 * a.dot(&b) / cross;
    }
    Some(out)
}

/// Assemble the cotangent Laplacian of the patch described by `ordering`.
///
/// Only triangles whose three corners are in the patch contribute. Rows of
/// interior points (`i < last_ring_start`) receive the cotangent weights;
/// boundary rows are identity rows. Cells that are not triangles are ignored
/// and degenerate triangles (see [`LaplaceOptions::degenerate_epsilon`]) are
/// skipped whole.
///
/// Returns the matrix and the number of skipped degenerate triangles.
pub fn laplacian_matrix<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    ordering: &LocalOrdering<I>,
    degenerate_epsilon: f64,
) -> (CsrMatrix, usize) {
    let n = ordering.len();
    let boundary = ordering.last_ring_start();
    let mut triplets = Vec::new();
    let mut skipped_degenerate = 0usize;
    let mut skipped_polygons = 0usize;

    for (c, corners) in mesh.cells() {
        let &[a, b, d] = corners else {
            if corners.iter().all(|&v| ordering.local(v).is_some()) {
                skipped_polygons += 1;
            }
            continue;
        };
        let (Some(la), Some(lb), Some(ld)) = (ordering.local(a), ordering.local(b), ordering.local(d))
        else {
            continue;
        };
        let local = [la, lb, ld];

        let positions = [mesh.position(a), mesh.position(b), mesh.position(d)];
        let Some(half_cot) = half_cotangents(positions, degenerate_epsilon) else {
            skipped_degenerate += 1;
            tracing::debug!(cell = c.index(), "skipping degenerate triangle");
            continue;
        };

        for (&(i, j), h) in [(0, 1), (0, 2), (1, 2)].iter().zip(half_cot) {
            let (li, lj) = (local[i], local[j]);
            if li < boundary {
                triplets.push((li, lj, h));
                triplets.push((li, li, -h));
            }
            if lj < boundary {
                triplets.push((lj, li, h));
                triplets.push((lj, lj, -h));
            }
        }
    }

    for i in boundary..n {
        triplets.push((i, i, 1.0));
    }

    if skipped_polygons > 0 {
        tracing::debug!(count = skipped_polygons, "ignored non-triangle cells in Laplacian");
    }

    (CsrMatrix::from_triplets(n, n, triplets), skipped_degenerate)
}

/// Weights from the Laplace solve.
#[derive(Debug, Clone)]
pub struct LaplaceWeights<I: MeshIndex = u32> {
    seed: VertexId<I>,
    ring_count: usize,
    ordering: LocalOrdering<I>,
    solution: DVector<f64>,
    skipped_degenerate: usize,
}

impl<I: MeshIndex> LaplaceWeights<I> {
    /// The seed point.
    #[inline]
    pub fn seed(&self) -> VertexId<I> {
        self.seed
    }

    /// Number of ring-expansion rounds.
    #[inline]
    pub fn ring_count(&self) -> usize {
        self.ring_count
    }

    /// Local numbering of the patch.
    #[inline]
    pub fn ordering(&self) -> &LocalOrdering<I> {
        &self.ordering
    }

    /// Raw (signed) solution in local order.
    #[inline]
    pub fn solution(&self) -> &DVector<f64> {
        &self.solution
    }

    /// Number of degenerate triangles left out of the Laplacian.
    #[inline]
    pub fn skipped_degenerate(&self) -> usize {
        self.skipped_degenerate
    }
}

impl<I: MeshIndex> WeightFunction<I> for LaplaceWeights<I> {
    fn evaluate(&self, v: VertexId<I>) -> f64 {
        self.ordering
            .local(v)
            .map_or(0.0, |i| self.solution[i].abs())
    }
}

/// Solve for harmonic weights on the `ring_count`-ring patch around `seed`.
///
/// # Errors
///
/// - [`MeshError::SeedOutOfRange`] if the seed is not a mesh point
/// - [`MeshError::InvalidParameter`] if `ring_count` is 0
/// - [`MeshError::SolveFailed`] if the system is singular or the solution
///   is not finite
///
/// # Example
///
/// ```
/// use harmonica::prelude::*;
///
/// let mesh: PolyMesh = harmonica::mesh::primitives::hex_disk(3).unwrap();
/// let w = solve_laplace(&mesh, VertexId::new(0), 4).unwrap();
///
/// // Pinned boundary ring
/// let far = w.ordering().point(w.ordering().len() - 1);
/// assert_eq!(w.evaluate(far), 0.0);
/// assert!(w.evaluate(VertexId::new(0)) > 0.0);
/// ```
pub fn solve_laplace<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    seed: VertexId<I>,
    ring_count: usize,
) -> Result<LaplaceWeights<I>> {
    let options = LaplaceOptions::default().with_ring_count(ring_count);
    solve_laplace_with_options(mesh, seed, &options, &Progress::none())
}

/// [`solve_laplace`] with options, progress reporting and cancellation.
pub fn solve_laplace_with_options<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    seed: VertexId<I>,
    options: &LaplaceOptions,
    progress: &Progress,
) -> Result<LaplaceWeights<I>> {
    mesh.check_seed(seed)?;
    options.validate()?;

    let ring_map = build_ring_map_with_progress(mesh, seed, options.ring_count, progress)?;
    let ordering = LocalOrdering::new(&ring_map);
    let n = ordering.len();

    progress.checkpoint(0, 3, "Assembling Laplacian")?;
    let start = Instant::now();
    let (matrix, skipped_degenerate) =
        laplacian_matrix(mesh, &ordering, options.degenerate_epsilon);
    tracing::debug!(
        n,
        nnz = matrix.nnz(),
        boundary = n - ordering.last_ring_start(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
        "assembled Laplacian"
    );
    if skipped_degenerate > 0 {
        tracing::warn!(count = skipped_degenerate, "degenerate triangles left out of the solve");
    }

    progress.checkpoint(1, 3, "Factorizing")?;
    let start = Instant::now();
    let lu = SparseLu::factorize_with_tolerance(&matrix, options.pivot_tolerance).map_err(|err| {
        tracing::warn!(%err, "Laplace factorization failed");
        MeshError::SolveFailed {
            reason: err.to_string(),
        }
    })?;
    tracing::debug!(elapsed_ms = start.elapsed().as_secs_f64() * 1e3, "factorized Laplacian");

    progress.checkpoint(2, 3, "Solving")?;
    let mut rhs = DVector::zeros(n);
    rhs[0] = 1.0;
    let solution = lu.solve(&rhs).map_err(|err| {
        tracing::warn!(%err, "Laplace solve failed");
        err
    })?;

    Ok(LaplaceWeights {
        seed,
        ring_count: options.ring_count,
        ordering,
        solution,
        skipped_degenerate,
    })
}
