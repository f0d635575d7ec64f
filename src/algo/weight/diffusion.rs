//! Iterative diffusion of a unit impulse placed at the seed.
//!
//! Each round blends every point's value with the mean of its neighbors:
//!
//! ```text
//! next[p] = (1 - alpha) * current[p] + alpha * mean(current[q] for q in N(p))
//! ```
//!
//! Only points that hold a value or touch one are visited, so a round costs
//! time proportional to the current support rather than the mesh size.

use crate::algo::progress::Progress;
use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, PolyMesh, VertexId};
use crate::topology::build_neighbor_map;

use super::WeightFunction;

/// Sparse per-point values backed by dense storage.
///
/// Holds a value array and a presence flag per point, plus the list of
/// present points so clearing and iterating cost only the support size.
#[derive(Debug, Clone)]
pub struct SparseValues<I: MeshIndex = u32> {
    values: Vec<f64>,
    present: Vec<bool>,
    points: Vec<VertexId<I>>,
}

impl<I: MeshIndex> SparseValues<I> {
    /// Empty values for a mesh with `num_vertices` points.
    pub fn new(num_vertices: usize) -> Self {
        Self {
            values: vec![0.0; num_vertices],
            present: vec![false; num_vertices],
            points: Vec::new(),
        }
    }

    /// Stored value of `v`, `None` if absent.
    #[inline]
    pub fn get(&self, v: VertexId<I>) -> Option<f64> {
        let i = v.index();
        (self.present.get(i) == Some(&true)).then(|| self.values[i])
    }

    /// Stored value of `v`, 0 if absent.
    #[inline]
    pub fn value(&self, v: VertexId<I>) -> f64 {
        self.get(v).unwrap_or(0.0)
    }

    /// Check whether `v` holds a value.
    #[inline]
    pub fn contains(&self, v: VertexId<I>) -> bool {
        self.present.get(v.index()) == Some(&true)
    }

    /// Set the value of `v`.
    ///
    /// # Panics
    /// Panics if `v` is out of range.
    pub fn insert(&mut self, v: VertexId<I>, value: f64) {
        let i = v.index();
        if !self.present[i] {
            self.present[i] = true;
            self.points.push(v);
        }
        self.values[i] = value;
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        for &v in &self.points {
            self.present[v.index()] = false;
            self.values[v.index()] = 0.0;
        }
        self.points.clear();
    }

    /// Number of present points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no point holds a value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Present points in insertion order.
    #[inline]
    pub fn points(&self) -> &[VertexId<I>] {
        &self.points
    }

    /// Iterate over present points and their values.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId<I>, f64)> + '_ {
        self.points.iter().map(move |&v| (v, self.values[v.index()]))
    }
}

/// Options for [`laplacian_diffusion_with_options`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffusionOptions {
    /// Blend factor toward the neighbor mean, in `[0, 0.5)`.
    pub alpha: f64,

    /// Number of diffusion rounds.
    pub iterations: usize,
}

impl Default for DiffusionOptions {
    fn default() -> Self {
        Self {
            alpha: 0.25,
            iterations: 1,
        }
    }
}

impl DiffusionOptions {
    /// Set the blend factor.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the number of rounds.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.alpha.is_finite() && (0.0..0.5).contains(&self.alpha)) {
            return Err(MeshError::invalid_param("alpha", self.alpha, "must lie in [0, 0.5)"));
        }
        Ok(())
    }
}

/// Diffused weights.
#[derive(Debug, Clone)]
pub struct DiffusionWeights<I: MeshIndex = u32> {
    seed: VertexId<I>,
    options: DiffusionOptions,
    values: SparseValues<I>,
}

impl<I: MeshIndex> DiffusionWeights<I> {
    /// The seed point.
    #[inline]
    pub fn seed(&self) -> VertexId<I> {
        self.seed
    }

    /// Parameters the weights were computed with.
    #[inline]
    pub fn options(&self) -> &DiffusionOptions {
        &self.options
    }

    /// The diffused values.
    #[inline]
    pub fn values(&self) -> &SparseValues<I> {
        &self.values
    }
}

impl<I: MeshIndex> WeightFunction<I> for DiffusionWeights<I> {
    #[inline]
    fn evaluate(&self, v: VertexId<I>) -> f64 {
        self.values.value(v)
    }
}

/// Diffuse a unit impulse from `seed` for `iterations` rounds.
///
/// # Errors
///
/// - [`MeshError::SeedOutOfRange`] if the seed is not a mesh point
/// - [`MeshError::InvalidParameter`] if `alpha` is outside `[0, 0.5)`
///
/// # Example
///
/// ```
/// use harmonica::prelude::*;
///
/// let mesh: PolyMesh = harmonica::mesh::primitives::hex_disk(2).unwrap();
/// let w = laplacian_diffusion(&mesh, VertexId::new(0), 0.25, 1).unwrap();
///
/// // One round: the seed keeps 3/4 and each of its six neighbors gets 1/24.
/// assert!((w.evaluate(VertexId::new(0)) - 0.75).abs() < 1e-12);
/// ```
pub fn laplacian_diffusion<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    seed: VertexId<I>,
    alpha: f64,
    iterations: usize,
) -> Result<DiffusionWeights<I>> {
    let options = DiffusionOptions { alpha, iterations };
    laplacian_diffusion_with_options(mesh, seed, &options, &Progress::none())
}

/// [`laplacian_diffusion`] with options, progress reporting and cancellation.
pub fn laplacian_diffusion_with_options<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    seed: VertexId<I>,
    options: &DiffusionOptions,
    progress: &Progress,
) -> Result<DiffusionWeights<I>> {
    mesh.check_seed(seed)?;
    options.validate()?;

    let n = mesh.num_vertices();
    let neighbors = build_neighbor_map(mesh);
    let alpha = options.alpha;

    let mut current = SparseValues::new(n);
    current.insert(seed, 1.0);
    let mut next = SparseValues::new(n);

    // Round stamp marking points already queued as candidates
    let mut queued = vec![usize::MAX; n];
    let mut candidates = Vec::new();

    for round in 0..options.iterations {
        progress.checkpoint(round, options.iterations, "Diffusing")?;

        candidates.clear();
        for &p in current.points() {
            for &q in std::iter::once(&p).chain(neighbors.neighbors(p)) {
                if queued[q.index()] != round {
                    queued[q.index()] = round;
                    candidates.push(q);
                }
            }
        }

        next.clear();
        for &p in &candidates {
            let own = current.value(p);
            let ns = neighbors.neighbors(p);
            if ns.is_empty() {
                // No mean to blend toward
                if current.contains(p) {
                    next.insert(p, own);
                }
                continue;
            }

            let sum: f64 = ns.iter().map(|&q| current.value(q)).sum();
            if own != 0.0 || sum != 0.0 {
                next.insert(p, (1.0 - alpha) * own + alpha * sum / ns.len() as f64);
            }
        }

        std::mem::swap(&mut current, &mut next);
    }

    tracing::debug!(
        seed = seed.index(),
        alpha,
        iterations = options.iterations,
        support = current.len(),
        "diffusion finished"
    );

    Ok(DiffusionWeights {
        seed,
        options: *options,
        values: current,
    })
}
