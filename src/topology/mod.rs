//! Topology indices built from a mesh's cell list.
//!
//! - [`NeighborMap`]: points sharing a cell with each point
//! - [`RingMap`]: breadth-first ring distance from a seed
//! - [`CellIncidence`]: cells around each point
//!
//! All three are rebuilt from scratch on every call and go stale as soon as
//! the mesh's cells change. Point positions do not affect them.

mod incidence;
mod neighbors;
mod rings;

pub use incidence::CellIncidence;
pub use neighbors::{build_neighbor_map, NeighborMap};
pub use rings::{build_ring_map, build_ring_map_with_progress, RingMap};
