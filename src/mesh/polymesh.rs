//! Face-vertex polygon mesh.
//!
//! [`PolyMesh`] stores point positions, a list of polygon cells and an optional
//! per-vertex color attribute. Cells are kept in a flat index array with an
//! offsets table, so a cell is a contiguous slice of [`VertexId`]s.
//!
//! Cells are expected to be triangles. Other polygons are stored as given: the
//! neighbor and ring queries treat them as a clique of their corners, the
//! cotangent Laplacian ignores them. Duplicate corners and non-manifold edges
//! are not detected.

use nalgebra::{Point3, Vector3};

use super::color::Rgb;
use super::index::{CellId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// A polygon mesh with per-vertex attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyMesh<I: MeshIndex = u32> {
    /// Point positions.
    pub(crate) positions: Vec<Point3<f64>>,

    /// `cell_offsets[c]..cell_offsets[c + 1]` is the corner range of cell `c`.
    pub(crate) cell_offsets: Vec<usize>,

    /// Corner indices of all cells, back to back.
    pub(crate) cell_indices: Vec<VertexId<I>>,

    /// Optional per-vertex colors, one per point when present.
    pub(crate) colors: Option<Vec<Rgb>>,
}

impl<I: MeshIndex> Default for PolyMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> PolyMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            cell_offsets: vec![0],
            cell_indices: Vec::new(),
            colors: None,
        }
    }

    /// Create a mesh with pre-allocated capacity for triangles.
    pub fn with_capacity(num_vertices: usize, num_cells: usize) -> Self {
        let mut cell_offsets = Vec::with_capacity(num_cells + 1);
        cell_offsets.push(0);
        Self {
            positions: Vec::with_capacity(num_vertices),
            cell_offsets,
            cell_indices: Vec::with_capacity(num_cells * 3),
            colors: None,
        }
    }

    // ==================== Accessors ====================

    /// Get the number of points.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of cells.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cell_offsets.len() - 1
    }

    /// True when the mesh has neither points nor cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.num_cells() == 0
    }

    /// Check whether `v` addresses a point of this mesh.
    #[inline]
    pub fn contains_vertex(&self, v: VertexId<I>) -> bool {
        v.is_valid() && v.index() < self.positions.len()
    }

    /// Validate a seed point, as handed over by a picker.
    pub fn check_seed(&self, seed: VertexId<I>) -> Result<()> {
        if self.contains_vertex(seed) {
            Ok(())
        } else {
            Err(MeshError::SeedOutOfRange {
                seed: seed.index(),
                num_vertices: self.num_vertices(),
            })
        }
    }

    /// Get the position of a point.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.positions[v.index()]
    }

    /// Set the position of a point.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.positions[v.index()] = pos;
    }

    /// All point positions.
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Replace all point positions at once. Topology is untouched.
    pub fn set_positions(&mut self, positions: Vec<Point3<f64>>) -> Result<()> {
        if positions.len() != self.positions.len() {
            return Err(MeshError::AttributeLength {
                len: positions.len(),
                num_vertices: self.positions.len(),
            });
        }
        self.positions = positions;
        Ok(())
    }

    /// Get the corners of a cell.
    #[inline]
    pub fn cell(&self, c: CellId<I>) -> &[VertexId<I>] {
        let i = c.index();
        &self.cell_indices[self.cell_offsets[i]..self.cell_offsets[i + 1]]
    }

    /// Get the corners of a cell if it is a triangle.
    #[inline]
    pub fn triangle(&self, c: CellId<I>) -> Option<[VertexId<I>; 3]> {
        match *self.cell(c) {
            [a, b, d] => Some([a, b, d]),
            _ => None,
        }
    }

    // ==================== Iteration ====================

    /// Iterate over all point IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.positions.len()).map(VertexId::new)
    }

    /// Iterate over all cell IDs.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId<I>> + '_ {
        (0..self.num_cells()).map(CellId::new)
    }

    /// Iterate over all cells with their corners.
    pub fn cells(&self) -> impl Iterator<Item = (CellId<I>, &[VertexId<I>])> + '_ {
        self.cell_offsets
            .windows(2)
            .enumerate()
            .map(move |(i, w)| (CellId::new(i), &self.cell_indices[w[0]..w[1]]))
    }

    /// Iterate over the triangle cells, skipping any other polygon.
    pub fn triangles(&self) -> impl Iterator<Item = (CellId<I>, [VertexId<I>; 3])> + '_ {
        self.cells().filter_map(|(c, corners)| match *corners {
            [a, b, d] => Some((c, [a, b, d])),
            _ => None,
        })
    }

    /// True when every cell is a triangle.
    pub fn is_triangulated(&self) -> bool {
        self.cell_offsets.windows(2).all(|w| w[1] - w[0] == 3)
    }

    // ==================== Geometry ====================

    /// Area vector of a cell (normal direction, length = area).
    ///
    /// Polygons are fanned from their first corner.
    pub fn cell_area_vector(&self, c: CellId<I>) -> Vector3<f64> {
        let corners = self.cell(c);
        let p0 = self.position(corners[0]);
        let mut sum = Vector3::zeros();
        for pair in corners[1..].windows(2) {
            let e1 = self.position(pair[0]) - p0;
            let e2 = self.position(pair[1]) - p0;
            sum += e1.cross(&e2);
        }
        0.5 * sum
    }

    /// Unit normal of a cell, zero for degenerate cells.
    pub fn cell_normal(&self, c: CellId<I>) -> Vector3<f64> {
        let n = self.cell_area_vector(c);
        let len = n.norm();
        if len > 1e-12 {
            n / len
        } else {
            Vector3::zeros()
        }
    }

    /// Axis-aligned bounding box, `None` for a mesh without points.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.positions.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in &self.positions[1..] {
            for k in 0..3 {
                min[k] = min[k].min(p[k]);
                max[k] = max[k].max(p[k]);
            }
        }
        Some((min, max))
    }

    // ==================== Colors ====================

    /// The per-vertex color attribute, if any.
    #[inline]
    pub fn colors(&self) -> Option<&[Rgb]> {
        self.colors.as_deref()
    }

    /// Color of a single point, if the attribute exists.
    #[inline]
    pub fn color(&self, v: VertexId<I>) -> Option<Rgb> {
        self.colors.as_ref().map(|c| c[v.index()])
    }

    /// Replace the color attribute.
    pub fn set_colors(&mut self, colors: Vec<Rgb>) -> Result<()> {
        if colors.len() != self.positions.len() {
            return Err(MeshError::AttributeLength {
                len: colors.len(),
                num_vertices: self.positions.len(),
            });
        }
        self.colors = Some(colors);
        Ok(())
    }

    /// Fill every point with the same color, creating the attribute if needed.
    pub fn fill_colors(&mut self, color: Rgb) {
        self.colors = Some(vec![color; self.positions.len()]);
    }

    /// Drop the color attribute.
    pub fn clear_colors(&mut self) {
        self.colors = None;
    }

    // ==================== Editing ====================

    /// Append a point and return its ID.
    ///
    /// An existing color attribute is extended with white.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.positions.len());
        self.positions.push(position);
        if let Some(colors) = self.colors.as_mut() {
            colors.push(Rgb::WHITE);
        }
        id
    }

    /// Append a cell after validating its corners.
    pub fn add_cell(&mut self, corners: &[usize]) -> Result<CellId<I>> {
        let cell = self.num_cells();
        if corners.len() < 3 {
            return Err(MeshError::InvalidCell {
                cell,
                len: corners.len(),
            });
        }
        if let Some(&bad) = corners.iter().find(|&&v| v >= self.positions.len()) {
            return Err(MeshError::InvalidVertexIndex { cell, vertex: bad });
        }
        self.cell_indices
            .extend(corners.iter().map(|&v| VertexId::<I>::new(v)));
        self.cell_offsets.push(self.cell_indices.len());
        Ok(CellId::new(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_and_triangle() -> PolyMesh {
        let mut mesh = PolyMesh::new();
        for p in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ] {
            mesh.add_vertex(p);
        }
        mesh.add_cell(&[0, 1, 2, 3]).unwrap();
        mesh.add_cell(&[1, 4, 2]).unwrap();
        mesh
    }

    #[test]
    fn test_cells_and_triangles() {
        let mesh = quad_and_triangle();
        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.num_cells(), 2);
        assert!(!mesh.is_triangulated());

        assert_eq!(mesh.cell(CellId::new(0)).len(), 4);
        assert!(mesh.triangle(CellId::new(0)).is_none());

        let tris: Vec<_> = mesh.triangles().collect();
        assert_eq!(tris.len(), 1);
        assert_eq!(tris[0].0, CellId::new(1));
        assert_eq!(tris[0].1, [VertexId::new(1), VertexId::new(4), VertexId::new(2)]);
    }

    #[test]
    fn test_add_cell_validation() {
        let mut mesh = quad_and_triangle();
        assert_eq!(
            mesh.add_cell(&[0, 1]),
            Err(MeshError::InvalidCell { cell: 2, len: 2 })
        );
        assert_eq!(
            mesh.add_cell(&[0, 1, 9]),
            Err(MeshError::InvalidVertexIndex { cell: 2, vertex: 9 })
        );
        // Failed inserts leave the mesh untouched
        assert_eq!(mesh.num_cells(), 2);
    }

    #[test]
    fn test_cell_area_and_normal() {
        let mesh = quad_and_triangle();
        let area = mesh.cell_area_vector(CellId::new(0));
        assert!((area.z - 1.0).abs() < 1e-12);
        let n = mesh.cell_normal(CellId::new(1));
        assert!((n - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_seed_check() {
        let mesh = quad_and_triangle();
        assert!(mesh.check_seed(VertexId::new(4)).is_ok());
        assert_eq!(
            mesh.check_seed(VertexId::new(5)),
            Err(MeshError::SeedOutOfRange { seed: 5, num_vertices: 5 })
        );
        assert!(mesh.check_seed(VertexId::invalid()).is_err());
    }

    #[test]
    fn test_colors() {
        let mut mesh = quad_and_triangle();
        assert!(mesh.colors().is_none());

        mesh.fill_colors(Rgb::RED);
        assert_eq!(mesh.color(VertexId::new(3)), Some(Rgb::RED));

        mesh.add_vertex(Point3::origin());
        assert_eq!(mesh.colors().unwrap().len(), 6);
        assert_eq!(mesh.color(VertexId::new(5)), Some(Rgb::WHITE));

        assert!(mesh.set_colors(vec![Rgb::BLUE; 2]).is_err());
        mesh.clear_colors();
        assert!(mesh.color(VertexId::new(0)).is_none());
    }

    #[test]
    fn test_bounding_box() {
        let mesh = quad_and_triangle();
        let (min, max) = mesh.bounding_box().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(2.0, 1.0, 0.0));
        assert!(PolyMesh::<u32>::new().bounding_box().is_none());
    }
}
