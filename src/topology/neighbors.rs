//! Point adjacency derived from cell connectivity.

use crate::mesh::{MeshIndex, PolyMesh, VertexId};

/// For every point, the points that share at least one cell with it.
///
/// Neighbor lists are sorted and free of duplicates. The relation is
/// symmetric for any mesh built from cells, since every cell contributes both
/// directions of each corner pair.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborMap<I: MeshIndex = u32> {
    /// `offsets[v]..offsets[v + 1]` is the neighbor range of point `v`.
    offsets: Vec<usize>,
    neighbors: Vec<VertexId<I>>,
}

impl<I: MeshIndex> NeighborMap<I> {
    /// Build the map in one pass over the cells of `mesh`.
    ///
    /// Every ordered pair of corners `(a, b)` of a cell with `a != b` makes
    /// `b` a neighbor of `a`. A corner repeated inside a degenerate cell does
    /// not make a point its own neighbor.
    pub fn build(mesh: &PolyMesh<I>) -> Self {
        let n = mesh.num_vertices();
        let mut lists: Vec<Vec<VertexId<I>>> = vec![Vec::new(); n];

        for (_, corners) in mesh.cells() {
            for &a in corners {
                for &b in corners {
                    if a != b {
                        lists[a.index()].push(b);
                    }
                }
            }
        }

        let mut offsets = Vec::with_capacity(n + 1);
        let mut neighbors = Vec::new();
        offsets.push(0);
        for mut list in lists {
            list.sort_unstable();
            list.dedup();
            neighbors.extend(list);
            offsets.push(neighbors.len());
        }

        tracing::debug!(
            vertices = n,
            entries = neighbors.len(),
            "built neighbor map"
        );

        Self { offsets, neighbors }
    }

    /// Neighbors of a point. Empty for isolated points.
    #[inline]
    pub fn neighbors(&self, v: VertexId<I>) -> &[VertexId<I>] {
        let i = v.index();
        &self.neighbors[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Number of neighbors of a point.
    #[inline]
    pub fn degree(&self, v: VertexId<I>) -> usize {
        let i = v.index();
        self.offsets[i + 1] - self.offsets[i]
    }

    /// Check whether `b` is a neighbor of `a`.
    pub fn are_neighbors(&self, a: VertexId<I>, b: VertexId<I>) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    /// Number of points covered by the map (the mesh point count).
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// True when the map covers no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of directed neighbor entries.
    #[inline]
    pub fn num_entries(&self) -> usize {
        self.neighbors.len()
    }

    /// Iterate over every point with its neighbors.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId<I>, &[VertexId<I>])> + '_ {
        self.offsets
            .windows(2)
            .enumerate()
            .map(move |(i, w)| (VertexId::new(i), &self.neighbors[w[0]..w[1]]))
    }

    /// Check that `b ∈ N(a)` implies `a ∈ N(b)` for every entry.
    pub fn is_symmetric(&self) -> bool {
        self.iter()
            .all(|(a, ns)| ns.iter().all(|&b| self.are_neighbors(b, a)))
    }
}

/// Build the [`NeighborMap`] of a mesh.
///
/// # Example
///
/// ```
/// use harmonica::prelude::*;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh: PolyMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// let map = build_neighbor_map(&mesh);
/// assert_eq!(map.neighbors(VertexId::new(0)), &[VertexId::new(1), VertexId::new(2)]);
/// ```
pub fn build_neighbor_map<I: MeshIndex>(mesh: &PolyMesh<I>) -> NeighborMap<I> {
    NeighborMap::build(mesh)
}
