//! Breadth-first ring expansion around a seed point.
//!
//! Rings grow through cell membership: a point joins ring `r + 1` when it is a
//! corner of any cell that also has a corner in ring `r`. For triangle meshes
//! this is the same as edge adjacency, but the expansion never consults an
//! edge structure, so it works unchanged on polygon soups.

use crate::algo::progress::Progress;
use crate::error::Result;
use crate::mesh::{MeshIndex, PolyMesh, VertexId};

use super::incidence::CellIncidence;

const UNREACHED: u32 = u32::MAX;

/// Ring distance of every point reached from a seed.
///
/// Backed by an array indexed by point ID plus the visit order. The visit
/// order starts with the seed and is grouped by ring; inside a ring, points
/// appear in discovery order. Each point keeps the first ring it was reached
/// in.
#[derive(Debug, Clone, PartialEq)]
pub struct RingMap<I: MeshIndex = u32> {
    seed: VertexId<I>,
    ring_count: usize,
    rings: Vec<u32>,
    order: Vec<VertexId<I>>,
    /// `ring_starts[r]..ring_starts[r + 1]` is the slice of `order` in ring `r`.
    ring_starts: Vec<usize>,
}

impl<I: MeshIndex> RingMap<I> {
    /// The seed point (ring 0).
    #[inline]
    pub fn seed(&self) -> VertexId<I> {
        self.seed
    }

    /// Number of expansion rounds requested.
    #[inline]
    pub fn ring_count(&self) -> usize {
        self.ring_count
    }

    /// Ring of a point, `None` if it was not reached.
    #[inline]
    pub fn ring(&self, v: VertexId<I>) -> Option<usize> {
        match self.rings.get(v.index()) {
            Some(&r) if r != UNREACHED => Some(r as usize),
            _ => None,
        }
    }

    /// Check whether a point was reached.
    #[inline]
    pub fn contains(&self, v: VertexId<I>) -> bool {
        self.ring(v).is_some()
    }

    /// Number of reached points.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no point was reached (`ring_count == 0`).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Point count of the mesh the map was built on.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.rings.len()
    }

    /// Reached points, seed first, grouped by ring.
    #[inline]
    pub fn order(&self) -> &[VertexId<I>] {
        &self.order
    }

    /// Number of non-empty rings.
    #[inline]
    pub fn num_rings(&self) -> usize {
        self.ring_starts.len() - 1
    }

    /// Points of ring `r`; empty if the ring was never populated.
    pub fn ring_members(&self, r: usize) -> &[VertexId<I>] {
        if r < self.num_rings() {
            &self.order[self.ring_starts[r]..self.ring_starts[r + 1]]
        } else {
            &[]
        }
    }

    /// Position in [`order`](Self::order) where ring `r` begins.
    pub fn ring_start(&self, r: usize) -> Option<usize> {
        (r < self.num_rings()).then(|| self.ring_starts[r])
    }

    /// The outermost populated ring.
    pub fn outermost_ring(&self) -> Option<usize> {
        self.num_rings().checked_sub(1)
    }

    /// Iterate over reached points with their rings, in visit order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId<I>, usize)> + '_ {
        self.order
            .iter()
            .map(move |&v| (v, self.rings[v.index()] as usize))
    }
}

/// Build the ring map of `seed` out to `ring_count` rounds.
///
/// Round `r` assigns ring `r`, so the map holds rings `0..ring_count` and a
/// point `ring_count` or more steps away is absent. `ring_count == 0` yields
/// an empty map.
///
/// # Errors
///
/// [`MeshError::SeedOutOfRange`](crate::error::MeshError::SeedOutOfRange) if
/// the seed is not a mesh point.
pub fn build_ring_map<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    seed: VertexId<I>,
    ring_count: usize,
) -> Result<RingMap<I>> {
    build_ring_map_with_progress(mesh, seed, ring_count, &Progress::none())
}

/// [`build_ring_map`] with progress reporting and cancellation between rounds.
pub fn build_ring_map_with_progress<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    seed: VertexId<I>,
    ring_count: usize,
    progress: &Progress,
) -> Result<RingMap<I>> {
    mesh.check_seed(seed)?;

    let n = mesh.num_vertices();
    let incidence = CellIncidence::build(mesh);
    let mut rings = vec![UNREACHED; n];
    // Round stamp of the last frontier a point was queued into.
    let mut queued = vec![UNREACHED; n];
    let mut order = Vec::new();
    let mut ring_starts = vec![0];

    let mut frontier = vec![seed];
    let mut next = Vec::new();

    for round in 0..ring_count {
        progress.checkpoint(round, ring_count, "Expanding rings")?;
        let r = round as u32;

        for &p in &frontier {
            if rings[p.index()] != UNREACHED {
                continue;
            }
            rings[p.index()] = r;
            order.push(p);

            for &c in incidence.cells_of(p) {
                for &q in mesh.cell(c) {
                    let qi = q.index();
                    if q != p && rings[qi] == UNREACHED && queued[qi] != r {
                        queued[qi] = r;
                        next.push(q);
                    }
                }
            }
        }

        if order.len() == *ring_starts.last().unwrap_or(&0) {
            // Nothing new: the component is exhausted.
            break;
        }
        ring_starts.push(order.len());

        frontier.clear();
        std::mem::swap(&mut frontier, &mut next);
    }

    tracing::debug!(
        seed = seed.index(),
        ring_count,
        reached = order.len(),
        rings = ring_starts.len() - 1,
        "built ring map"
    );

    Ok(RingMap {
        seed,
        ring_count,
        rings,
        order,
        ring_starts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;
    use crate::mesh::{build_from_triangles, primitives};
    use nalgebra::Point3;
    use std::collections::BTreeSet;

    fn ids(v: &[usize]) -> BTreeSet<VertexId> {
        v.iter().map(|&i| VertexId::new(i)).collect()
    }

    fn reached(map: &RingMap) -> BTreeSet<VertexId> {
        map.order().iter().copied().collect()
    }

    #[test]
    fn test_single_round_is_seed_only() {
        let mesh: PolyMesh = primitives::grid(3).unwrap();
        let map = build_ring_map(&mesh, VertexId::new(5), 1).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.ring(VertexId::new(5)), Some(0));
        assert_eq!(map.ring(VertexId::new(6)), None);
    }

    #[test]
    fn test_zero_rings_is_empty() {
        let mesh: PolyMesh = primitives::grid(3).unwrap();
        let map = build_ring_map(&mesh, VertexId::new(5), 0).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.outermost_ring(), None);
        assert!(!map.contains(VertexId::new(5)));
    }

    #[test]
    fn test_grid_two_rings() {
        // 4x4 grid, seed (1,1). Two rounds: ring 0 = seed, ring 1 = its six
        // triangle neighbors.
        let mesh: PolyMesh = primitives::grid(3).unwrap();
        let map = build_ring_map(&mesh, VertexId::new(5), 2).unwrap();

        assert_eq!(reached(&map), ids(&[0, 1, 4, 5, 6, 9, 10]));
        assert_eq!(map.ring(VertexId::new(5)), Some(0));
        for i in [0, 1, 4, 6, 9, 10] {
            assert_eq!(map.ring(VertexId::new(i)), Some(1));
        }
    }

    #[test]
    fn test_grid_three_rings_reach_distance_two() {
        let mesh: PolyMesh = primitives::grid(3).unwrap();
        let map = build_ring_map(&mesh, VertexId::new(5), 3).unwrap();

        // Everything within two triangle hops of (1,1). Only (3,0) and (0,3)
        // are three hops away.
        let all: Vec<usize> = (0..16).filter(|&i| i != 3 && i != 12).collect();
        assert_eq!(reached(&map), ids(&all));

        assert_eq!(map.ring(VertexId::new(15)), Some(2));
        assert_eq!(map.ring(VertexId::new(2)), Some(2));
        assert_eq!(map.ring(VertexId::new(8)), Some(2));
        assert_eq!(map.ring(VertexId::new(3)), None);
        assert_eq!(map.ring(VertexId::new(12)), None);
        assert_eq!(map.num_rings(), 3);
    }

    #[test]
    fn test_order_is_grouped_by_ring() {
        let mesh: PolyMesh = primitives::grid(4).unwrap();
        let map = build_ring_map(&mesh, VertexId::new(12), 3).unwrap();

        assert_eq!(map.order()[0], VertexId::new(12));
        let mut last = 0;
        for (_, r) in map.iter() {
            assert!(r >= last);
            last = r;
        }
        for r in 0..map.num_rings() {
            let start = map.ring_start(r).unwrap();
            assert_eq!(map.order()[start..start + map.ring_members(r).len()], *map.ring_members(r));
            assert!(map.ring_members(r).iter().all(|&v| map.ring(v) == Some(r)));
        }
    }

    #[test]
    fn test_exhausted_component_stops_early() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(9.0, 9.0, 9.0),
        ];
        let mesh: PolyMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
        let map = build_ring_map(&mesh, VertexId::new(0), 10).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.num_rings(), 2);
        assert_eq!(map.outermost_ring(), Some(1));
        assert_eq!(map.ring_count(), 10);
        assert!(!map.contains(VertexId::new(3)));
    }

    #[test]
    fn test_icosphere_rings_match_bfs() {
        use crate::topology::build_neighbor_map;
        use std::collections::VecDeque;

        let mesh: PolyMesh = primitives::icosphere(2).unwrap();
        let neighbors = build_neighbor_map(&mesh);
        let seed = VertexId::new(0);

        // Plain BFS over the neighbor graph
        let mut dist = vec![usize::MAX; mesh.num_vertices()];
        dist[0] = 0;
        let mut queue = VecDeque::from([seed]);
        while let Some(v) = queue.pop_front() {
            for &w in neighbors.neighbors(v) {
                if dist[w.index()] == usize::MAX {
                    dist[w.index()] = dist[v.index()] + 1;
                    queue.push_back(w);
                }
            }
        }

        let map = build_ring_map(&mesh, seed, 4).unwrap();
        for v in mesh.vertex_ids() {
            let expected = (dist[v.index()] < 4).then_some(dist[v.index()]);
            assert_eq!(map.ring(v), expected, "{:?}", v);
        }
    }

    #[test]
    fn test_invalid_seed() {
        let mesh: PolyMesh = primitives::grid(2).unwrap();
        assert_eq!(
            build_ring_map(&mesh, VertexId::new(9), 2).unwrap_err(),
            MeshError::SeedOutOfRange { seed: 9, num_vertices: 9 }
        );
    }

    #[test]
    fn test_cancelled_expansion() {
        use crate::algo::progress::CancelToken;

        let mesh: PolyMesh = primitives::grid(2).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let progress = Progress::none().with_cancel(token);
        assert_eq!(
            build_ring_map_with_progress(&mesh, VertexId::new(0), 3, &progress).unwrap_err(),
            MeshError::Cancelled
        );
    }
}
