//! Weighted deformation along vertex normals.
//!
//! # Example
//!
//! ```
//! use harmonica::prelude::*;
//!
//! let mut mesh: PolyMesh = harmonica::mesh::primitives::icosphere(2).unwrap();
//! let seed = VertexId::new(0);
//! let weights = simple_harmonic(&mesh, seed, 4).unwrap();
//!
//! // Pull a bump out of the sphere around the seed
//! weighted_translate(&mut mesh, seed, 0.2, &weights).unwrap();
//! assert!((mesh.position(seed).coords.norm() - 1.2).abs() < 1e-9);
//! ```

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, PolyMesh, VertexId};

use super::weight::WeightFunction;

/// Area-weighted unit normals, one per point.
///
/// Each cell adds its area vector (fanned from its first corner) to all of its
/// corners. Points without incident area get a zero normal.
pub fn vertex_normals<I: MeshIndex>(mesh: &PolyMesh<I>) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); mesh.num_vertices()];
    for (c, corners) in mesh.cells() {
        let area = mesh.cell_area_vector(c);
        for v in corners {
            normals[v.index()] += area;
        }
    }

    for n in &mut normals {
        let len = n.norm();
        *n = if len > 1e-12 { *n / len } else { Vector3::zeros() };
    }
    normals
}

/// Move every point along its own normal by
/// `distance * weight(v) / weight(seed)`.
///
/// Nothing moves unless every new position could be computed.
///
/// # Errors
///
/// - [`MeshError::SeedOutOfRange`] if the seed is not a mesh point
/// - [`MeshError::InvalidParameter`] if `distance` or a weight is not finite
/// - [`MeshError::ZeroSeedWeight`] if the seed weight is zero or not finite
pub fn weighted_translate<I, W>(
    mesh: &mut PolyMesh<I>,
    seed: VertexId<I>,
    distance: f64,
    weight_fn: &W,
) -> Result<()>
where
    I: MeshIndex,
    W: WeightFunction<I> + ?Sized,
{
    mesh.check_seed(seed)?;
    if !distance.is_finite() {
        return Err(MeshError::invalid_param("distance", distance, "must be finite"));
    }
    if distance == 0.0 {
        return Ok(());
    }

    let seed_weight = weight_fn.evaluate(seed);
    if seed_weight == 0.0 || !seed_weight.is_finite() {
        return Err(MeshError::ZeroSeedWeight {
            weight: seed_weight,
        });
    }

    let normals = vertex_normals(mesh);
    let mut moved = 0usize;
    let mut positions: Vec<Point3<f64>> = Vec::with_capacity(mesh.num_vertices());
    for v in mesh.vertex_ids() {
        let w = weight_fn.evaluate(v);
        if !w.is_finite() {
            return Err(MeshError::invalid_param("weight", w, "must be finite"));
        }
        let offset = normals[v.index()] * (distance * w / seed_weight);
        if w != 0.0 {
            moved += 1;
        }
        positions.push(mesh.position(v) + offset);
    }

    mesh.set_positions(positions)?;
    tracing::debug!(seed = seed.index(), distance, moved, "weighted translate");
    Ok(())
}
