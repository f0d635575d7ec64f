//! Point-to-cell incidence.

use crate::mesh::{CellId, MeshIndex, PolyMesh, VertexId};

/// For every point, the cells it is a corner of.
#[derive(Debug, Clone)]
pub struct CellIncidence<I: MeshIndex = u32> {
    offsets: Vec<usize>,
    cells: Vec<CellId<I>>,
}

impl<I: MeshIndex> CellIncidence<I> {
    /// Build the incidence table with a counting pass and a fill pass.
    pub fn build(mesh: &PolyMesh<I>) -> Self {
        let n = mesh.num_vertices();
        let mut counts = vec![0usize; n + 1];
        for (_, corners) in mesh.cells() {
            for v in corners {
                counts[v.index() + 1] += 1;
            }
        }
        for i in 0..n {
            counts[i + 1] += counts[i];
        }

        let offsets = counts;
        let mut cursor = offsets.clone();
        let mut cells = vec![CellId::invalid(); offsets[n]];
        for (c, corners) in mesh.cells() {
            for v in corners {
                let slot = &mut cursor[v.index()];
                cells[*slot] = c;
                *slot += 1;
            }
        }

        // A repeated corner lists its cell twice
        let mut compact_offsets = Vec::with_capacity(n + 1);
        let mut compact = Vec::with_capacity(cells.len());
        compact_offsets.push(0);
        for w in offsets.windows(2) {
            let start = compact.len();
            for &c in &cells[w[0]..w[1]] {
                if !compact[start..].contains(&c) {
                    compact.push(c);
                }
            }
            compact_offsets.push(compact.len());
        }

        Self {
            offsets: compact_offsets,
            cells: compact,
        }
    }

    /// Cells having `v` as a corner, in ascending order.
    #[inline]
    pub fn cells_of(&self, v: VertexId<I>) -> &[CellId<I>] {
        let i = v.index();
        &self.cells[self.offsets[i]..self.offsets[i + 1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_triangles, primitives};
    use nalgebra::Point3;

    #[test]
    fn test_grid_incidence() {
        let mesh: PolyMesh = primitives::grid(1).unwrap();
        let inc = CellIncidence::build(&mesh);
        assert_eq!(inc.cells_of(VertexId::new(0)), &[CellId::new(0), CellId::new(1)]);
        assert_eq!(inc.cells_of(VertexId::new(1)), &[CellId::new(0)]);
        assert_eq!(inc.cells_of(VertexId::new(2)), &[CellId::new(1)]);
    }

    #[test]
    fn test_repeated_corner_listed_once() {
        let vertices = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let mesh: PolyMesh = build_from_triangles(&vertices, &[[0, 1, 1]]).unwrap();
        let inc = CellIncidence::build(&mesh);
        assert_eq!(inc.cells_of(VertexId::new(1)), &[CellId::new(0)]);
    }
}
