//! Mesh construction utilities.
//!
//! Builds [`PolyMesh`] values from the face-vertex lists produced by model
//! loaders and procedural generators, and converts back.

use nalgebra::Point3;

use super::index::MeshIndex;
use super::polymesh::PolyMesh;
use crate::error::Result;

/// Build a mesh from vertices and triangle faces.
///
/// Every face index must address an existing vertex. Degenerate faces
/// (repeated corners) are accepted as-is.
///
/// # Example
/// ```
/// use harmonica::mesh::{build_from_triangles, PolyMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_cells(), 1);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<PolyMesh<I>> {
    let mut mesh = PolyMesh::with_capacity(vertices.len(), faces.len());
    for &p in vertices {
        mesh.add_vertex(p);
    }
    for face in faces {
        mesh.add_cell(face)?;
    }
    Ok(mesh)
}

/// Build a mesh from vertices and arbitrary polygon cells.
pub fn build_from_polygons<I: MeshIndex, C: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    cells: &[C],
) -> Result<PolyMesh<I>> {
    let mut mesh = PolyMesh::with_capacity(vertices.len(), cells.len());
    for &p in vertices {
        mesh.add_vertex(p);
    }
    for cell in cells {
        mesh.add_cell(cell.as_ref())?;
    }
    Ok(mesh)
}

/// Convert a mesh back to face-vertex lists.
pub fn to_face_vertex<I: MeshIndex>(mesh: &PolyMesh<I>) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let vertices = mesh.positions().to_vec();
    let cells = mesh
        .cells()
        .map(|(_, corners)| corners.iter().map(|v| v.index()).collect())
        .collect();
    (vertices, cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;
    use crate::mesh::{CellId, VertexId};

    #[test]
    fn test_build_tetrahedron() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];

        let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_cells(), 4);
        assert!(mesh.is_triangulated());
        assert_eq!(
            mesh.triangle(CellId::new(2)),
            Some([VertexId::new(1), VertexId::new(2), VertexId::new(3)])
        );
    }

    #[test]
    fn test_invalid_index_rejected() {
        let vertices = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let result: Result<PolyMesh> = build_from_triangles(&vertices, &[[0, 1, 2]]);
        assert_eq!(
            result.unwrap_err(),
            MeshError::InvalidVertexIndex { cell: 0, vertex: 2 }
        );
    }

    #[test]
    fn test_degenerate_face_accepted() {
        let vertices = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let mesh: PolyMesh = build_from_triangles(&vertices, &[[0, 1, 1]]).unwrap();
        assert_eq!(mesh.num_cells(), 1);
    }

    #[test]
    fn test_empty_input() {
        let mesh: PolyMesh = build_from_triangles(&[], &[]).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_polygon_round_trip() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let cells = vec![vec![0, 1, 2, 3]];
        let mesh: PolyMesh<u16> = build_from_polygons(&vertices, &cells).unwrap();
        let (v, c) = to_face_vertex(&mesh);
        assert_eq!(v, vertices);
        assert_eq!(c, cells);
    }
}
