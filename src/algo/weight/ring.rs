//! Ring-distance falloff.

use crate::algo::progress::Progress;
use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, PolyMesh, VertexId};
use crate::topology::{build_ring_map_with_progress, RingMap};

use super::WeightFunction;

/// Linear falloff over breadth-first rings.
///
/// A point in ring `r` weighs `(ring_count - r) / ring_count`: the seed weighs
/// 1 and the outermost possible ring weighs `1 / ring_count`. Unreached points
/// weigh 0.
#[derive(Debug, Clone)]
pub struct RingWeights<I: MeshIndex = u32> {
    ring_map: RingMap<I>,
}

impl<I: MeshIndex> RingWeights<I> {
    /// The seed point.
    #[inline]
    pub fn seed(&self) -> VertexId<I> {
        self.ring_map.seed()
    }

    /// Number of expansion rounds.
    #[inline]
    pub fn ring_count(&self) -> usize {
        self.ring_map.ring_count()
    }

    /// The ring map backing the weights.
    #[inline]
    pub fn ring_map(&self) -> &RingMap<I> {
        &self.ring_map
    }
}

impl<I: MeshIndex> WeightFunction<I> for RingWeights<I> {
    fn evaluate(&self, v: VertexId<I>) -> f64 {
        match self.ring_map.ring(v) {
            Some(r) => {
                let rc = self.ring_map.ring_count() as f64;
                (rc - r as f64) / rc
            }
            None => 0.0,
        }
    }
}

/// Compute ring-distance weights around `seed`.
///
/// # Errors
///
/// - [`MeshError::SeedOutOfRange`] if the seed is not a mesh point
/// - [`MeshError::InvalidParameter`] if `ring_count` is 0
///
/// # Example
///
/// ```
/// use harmonica::prelude::*;
///
/// let mesh: PolyMesh = harmonica::mesh::primitives::grid(3).unwrap();
/// let w = simple_harmonic(&mesh, VertexId::new(5), 2).unwrap();
///
/// assert_eq!(w.evaluate(VertexId::new(5)), 1.0);
/// assert_eq!(w.evaluate(VertexId::new(6)), 0.5);
/// assert_eq!(w.evaluate(VertexId::new(15)), 0.0);
/// ```
pub fn simple_harmonic<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    seed: VertexId<I>,
    ring_count: usize,
) -> Result<RingWeights<I>> {
    simple_harmonic_with_progress(mesh, seed, ring_count, &Progress::none())
}

/// [`simple_harmonic`] with progress reporting and cancellation.
pub fn simple_harmonic_with_progress<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    seed: VertexId<I>,
    ring_count: usize,
    progress: &Progress,
) -> Result<RingWeights<I>> {
    mesh.check_seed(seed)?;
    if ring_count == 0 {
        return Err(MeshError::invalid_param("ring_count", ring_count, "must be at least 1"));
    }

    let ring_map = build_ring_map_with_progress(mesh, seed, ring_count, progress)?;
    Ok(RingWeights { ring_map })
}
