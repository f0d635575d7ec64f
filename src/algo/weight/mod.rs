//! Harmonic-like weight functions centered on a seed point.
//!
//! Three methods compute a scalar weight over the mesh, peaking at the seed:
//!
//! - [`simple_harmonic`]: linear falloff over breadth-first rings
//! - [`laplacian_diffusion`]: repeated local averaging of a unit impulse
//! - [`solve_laplace`]: cotangent-Laplace equation on a ring patch with the
//!   outermost ring pinned to zero
//!
//! Each returns an owned result implementing [`WeightFunction`]. Consumers in
//! [`crate::algo::deform`] and [`crate::algo::colorize`] take any
//! `WeightFunction`, including plain closures.
//!
//! # Example
//!
//! ```
//! use harmonica::prelude::*;
//!
//! let mesh: PolyMesh = harmonica::mesh::primitives::grid(4).unwrap();
//! let seed = VertexId::new(12);
//!
//! let rings = simple_harmonic(&mesh, seed, 3).unwrap();
//! assert_eq!(rings.evaluate(seed), 1.0);
//!
//! // Method chosen at runtime
//! let method = WeightMethod::Diffusion { alpha: 0.25, iterations: 10 };
//! let weights = method.compute(&mesh, seed, &Progress::none()).unwrap();
//! assert!(weights.evaluate(seed) > 0.0);
//! ```

mod diffusion;
mod laplace;
mod ring;

pub use diffusion::{
    laplacian_diffusion, laplacian_diffusion_with_options, DiffusionOptions, DiffusionWeights,
    SparseValues,
};
pub use laplace::{
    laplacian_matrix, solve_laplace, solve_laplace_with_options, LaplaceOptions, LaplaceWeights,
    LocalOrdering,
};
pub use ring::{simple_harmonic, simple_harmonic_with_progress, RingWeights};

use crate::algo::progress::Progress;
use crate::error::Result;
use crate::mesh::{MeshIndex, PolyMesh, VertexId};

/// A scalar function over mesh points.
///
/// Points outside the function's domain evaluate to `0.0`; this is a
/// convention, not an error.
pub trait WeightFunction<I: MeshIndex = u32> {
    /// Weight of point `v`.
    fn evaluate(&self, v: VertexId<I>) -> f64;

    /// Evaluate every point `0..num_vertices`.
    fn evaluate_all(&self, num_vertices: usize) -> Vec<f64> {
        (0..num_vertices)
            .map(|i| self.evaluate(VertexId::new(i)))
            .collect()
    }
}

impl<I, F> WeightFunction<I> for F
where
    I: MeshIndex,
    F: Fn(VertexId<I>) -> f64,
{
    #[inline]
    fn evaluate(&self, v: VertexId<I>) -> f64 {
        self(v)
    }
}

/// Result of one of the built-in weight methods.
#[derive(Debug, Clone)]
pub enum Weights<I: MeshIndex = u32> {
    /// Ring-distance falloff.
    Ring(RingWeights<I>),
    /// Diffused impulse.
    Diffusion(DiffusionWeights<I>),
    /// Laplace solve on a ring patch.
    Laplace(LaplaceWeights<I>),
}

impl<I: MeshIndex> Weights<I> {
    /// The seed the weights were computed for.
    pub fn seed(&self) -> VertexId<I> {
        match self {
            Weights::Ring(w) => w.seed(),
            Weights::Diffusion(w) => w.seed(),
            Weights::Laplace(w) => w.seed(),
        }
    }

    /// Number of points with a stored weight.
    pub fn support_len(&self) -> usize {
        match self {
            Weights::Ring(w) => w.ring_map().len(),
            Weights::Diffusion(w) => w.values().len(),
            Weights::Laplace(w) => w.ordering().len(),
        }
    }
}

impl<I: MeshIndex> WeightFunction<I> for Weights<I> {
    fn evaluate(&self, v: VertexId<I>) -> f64 {
        match self {
            Weights::Ring(w) => w.evaluate(v),
            Weights::Diffusion(w) => w.evaluate(v),
            Weights::Laplace(w) => w.evaluate(v),
        }
    }
}

/// The weighting method and its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightMethod {
    /// [`simple_harmonic`] with the given number of rings.
    SimpleHarmonic {
        /// Number of ring-expansion rounds.
        ring_count: usize,
    },
    /// [`laplacian_diffusion`].
    Diffusion {
        /// Blend factor toward the neighbor mean.
        alpha: f64,
        /// Number of rounds.
        iterations: usize,
    },
    /// [`solve_laplace`] with the given number of rings.
    LaplaceSolve {
        /// Number of ring-expansion rounds.
        ring_count: usize,
    },
}

impl Default for WeightMethod {
    fn default() -> Self {
        WeightMethod::SimpleHarmonic { ring_count: 1 }
    }
}

impl WeightMethod {
    /// Largest alpha kept by [`sanitized`](Self::sanitized).
    pub const MAX_ALPHA: f64 = 0.49;

    /// Short name, as used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            WeightMethod::SimpleHarmonic { .. } => "simple",
            WeightMethod::Diffusion { .. } => "diffusion",
            WeightMethod::LaplaceSolve { .. } => "laplace",
        }
    }

    /// Clamp parameters into their usable ranges instead of rejecting them.
    ///
    /// Ring counts become at least 1 and alpha is clamped to `[0, 0.49]`
    /// (NaN becomes 0).
    pub fn sanitized(self) -> Self {
        match self {
            WeightMethod::SimpleHarmonic { ring_count } => WeightMethod::SimpleHarmonic {
                ring_count: ring_count.max(1),
            },
            WeightMethod::LaplaceSolve { ring_count } => WeightMethod::LaplaceSolve {
                ring_count: ring_count.max(1),
            },
            WeightMethod::Diffusion { alpha, iterations } => WeightMethod::Diffusion {
                alpha: if alpha.is_nan() {
                    0.0
                } else {
                    alpha.clamp(0.0, Self::MAX_ALPHA)
                },
                iterations,
            },
        }
    }

    /// Run the method for `seed`.
    pub fn compute<I: MeshIndex>(
        &self,
        mesh: &PolyMesh<I>,
        seed: VertexId<I>,
        progress: &Progress,
    ) -> Result<Weights<I>> {
        let _span =
            tracing::info_span!("weights", method = self.name(), seed = seed.index()).entered();

        let weights = match *self {
            WeightMethod::SimpleHarmonic { ring_count } => {
                Weights::Ring(simple_harmonic_with_progress(mesh, seed, ring_count, progress)?)
            }
            WeightMethod::Diffusion { alpha, iterations } => {
                let options = DiffusionOptions::default()
                    .with_alpha(alpha)
                    .with_iterations(iterations);
                Weights::Diffusion(laplacian_diffusion_with_options(
                    mesh, seed, &options, progress,
                )?)
            }
            WeightMethod::LaplaceSolve { ring_count } => {
                let options = LaplaceOptions::default().with_ring_count(ring_count);
                Weights::Laplace(solve_laplace_with_options(mesh, seed, &options, progress)?)
            }
        };

        tracing::info!(support = weights.support_len(), "weights computed");
        Ok(weights)
    }
}
