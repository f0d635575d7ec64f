//! Procedural meshes.
//!
//! Small generators used by the CLI, the benchmarks and the tests: a flat
//! grid, an icosphere and a hexagonal disk of equilateral triangles.

use std::collections::HashMap;

use nalgebra::Point3;

use super::builder::build_from_triangles;
use super::index::MeshIndex;
use super::polymesh::PolyMesh;
use crate::error::{MeshError, Result};

/// A flat grid of `(n + 1) x (n + 1)` points with unit spacing in the XY plane.
///
/// Point `(i, j)` has index `j * (n + 1) + i`. Every quad is split along its
/// `(i, j)`-`(i + 1, j + 1)` diagonal.
pub fn grid<I: MeshIndex>(n: usize) -> Result<PolyMesh<I>> {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    build_from_triangles(&vertices, &faces)
}

/// A unit icosphere: an icosahedron subdivided `subdivisions` times with every
/// new point projected back onto the sphere.
pub fn icosphere<I: MeshIndex>(subdivisions: usize) -> Result<PolyMesh<I>> {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let scale = 1.0 / (1.0 + phi * phi).sqrt();

    let mut vertices = vec![
        Point3::new(-1.0, phi, 0.0) * scale,
        Point3::new(1.0, phi, 0.0) * scale,
        Point3::new(-1.0, -phi, 0.0) * scale,
        Point3::new(1.0, -phi, 0.0) * scale,
        Point3::new(0.0, -1.0, phi) * scale,
        Point3::new(0.0, 1.0, phi) * scale,
        Point3::new(0.0, -1.0, -phi) * scale,
        Point3::new(0.0, 1.0, -phi) * scale,
        Point3::new(phi, 0.0, -1.0) * scale,
        Point3::new(phi, 0.0, 1.0) * scale,
        Point3::new(-phi, 0.0, -1.0) * scale,
        Point3::new(-phi, 0.0, 1.0) * scale,
    ];

    let mut faces = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut new_faces = Vec::with_capacity(faces.len() * 4);
        let mut edge_midpoints: HashMap<(usize, usize), usize> = HashMap::new();

        for face in &faces {
            let mut mids = [0usize; 3];

            for i in 0..3 {
                let v0 = face[i];
                let v1 = face[(i + 1) % 3];
                let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };

                mids[i] = *edge_midpoints.entry(key).or_insert_with(|| {
                    let mid = (vertices[v0].coords + vertices[v1].coords) / 2.0;
                    vertices.push(Point3::from(mid.normalize()));
                    vertices.len() - 1
                });
            }

            new_faces.push([face[0], mids[0], mids[2]]);
            new_faces.push([face[1], mids[1], mids[0]]);
            new_faces.push([face[2], mids[2], mids[1]]);
            new_faces.push([mids[0], mids[1], mids[2]]);
        }

        faces = new_faces;
    }

    build_from_triangles(&vertices, &faces)
}

/// A hexagonal disk of unit equilateral triangles.
///
/// Contains every lattice point within `radius` hexagonal steps of the
/// center, which is point 0 and sits at the origin. `hex_disk(1)` is the
/// classic one-ring fan: a center with six neighbors.
pub fn hex_disk<I: MeshIndex>(radius: usize) -> Result<PolyMesh<I>> {
    if radius == 0 {
        return Err(MeshError::invalid_param("radius", radius, "must be at least 1"));
    }
    let r = radius as i64;
    let inside = |q: i64, s: i64| q.abs().max(s.abs()).max((q + s).abs()) <= r;

    // Center first, then the rest in row order.
    let mut lattice: Vec<(i64, i64)> = vec![(0, 0)];
    for s in -r..=r {
        for q in -r..=r {
            if (q, s) != (0, 0) && inside(q, s) {
                lattice.push((q, s));
            }
        }
    }
    let index: HashMap<(i64, i64), usize> =
        lattice.iter().enumerate().map(|(i, &qs)| (qs, i)).collect();

    let half_sqrt3 = 3.0_f64.sqrt() / 2.0;
    let vertices: Vec<Point3<f64>> = lattice
        .iter()
        .map(|&(q, s)| Point3::new(q as f64 + s as f64 / 2.0, s as f64 * half_sqrt3, 0.0))
        .collect();

    // Iterate one step past the disk so down triangles anchored outside it
    // are still found.
    let mut faces = Vec::new();
    for (q, s) in (-r - 1..=r).flat_map(|s| (-r - 1..=r).map(move |q| (q, s))) {
        let up = [(q, s), (q + 1, s), (q, s + 1)];
        let down = [(q + 1, s), (q + 1, s + 1), (q, s + 1)];
        for tri in [up, down] {
            if let (Some(&a), Some(&b), Some(&c)) =
                (index.get(&tri[0]), index.get(&tri[1]), index.get(&tri[2]))
            {
                faces.push([a, b, c]);
            }
        }
    }

    build_from_triangles(&vertices, &faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::VertexId;

    #[test]
    fn test_grid_counts() {
        let mesh: PolyMesh = grid(3).unwrap();
        assert_eq!(mesh.num_vertices(), 16);
        assert_eq!(mesh.num_cells(), 18);
        assert_eq!(*mesh.position(VertexId::new(5)), Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_icosphere_counts_and_radius() {
        let base: PolyMesh = icosphere(0).unwrap();
        assert_eq!(base.num_vertices(), 12);
        assert_eq!(base.num_cells(), 20);

        let mesh: PolyMesh = icosphere(2).unwrap();
        // V = 10 * 4^k + 2, F = 20 * 4^k
        assert_eq!(mesh.num_vertices(), 162);
        assert_eq!(mesh.num_cells(), 320);
        for p in mesh.positions() {
            assert!((p.coords.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_icosphere_outward_orientation() {
        let mesh: PolyMesh = icosphere(1).unwrap();
        for c in mesh.cell_ids() {
            let [a, _, _] = mesh.triangle(c).unwrap();
            let n = mesh.cell_normal(c);
            assert!(n.dot(&mesh.position(a).coords) > 0.0, "{:?} faces inward", c);
        }
    }

    #[test]
    fn test_hex_disk_one_ring() {
        let mesh: PolyMesh = hex_disk(1).unwrap();
        assert_eq!(mesh.num_vertices(), 7);
        assert_eq!(mesh.num_cells(), 6);
        assert_eq!(*mesh.position(VertexId::new(0)), Point3::origin());
        for c in mesh.cell_ids() {
            let area = mesh.cell_area_vector(c);
            assert!((area.z - 3.0_f64.sqrt() / 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_hex_disk_counts() {
        // 3R(R+1) + 1 points, 6R^2 triangles
        let mesh: PolyMesh = hex_disk(3).unwrap();
        assert_eq!(mesh.num_vertices(), 37);
        assert_eq!(mesh.num_cells(), 54);
        assert!(hex_disk::<u32>(0).is_err());
    }
}
