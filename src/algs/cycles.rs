//! Planar-graph face finding by wall-following.
//!
//! Given a planar straight-line embedded graph (node coordinates plus
//! undirected edges), every node's incident neighbors are put into
//! counterclockwise rotational order; oriented face cycles then fall out of
//! a wall-following walk that always takes the predecessor of the incoming
//! direction in that ordering. The same sorted-local-adjacency idea drives
//! the ordered-neighbor queries of the half-edge mesh.
//!
//! Cycles are deduplicated by their vertex set: the two directions of an
//! undirected edge may trace the same cycle (a lone face) or two different
//! ones. The unbounded outer face is the unique clockwise cycle — the one
//! with negative [`signed_area_xy`] — whenever the graph has more than one
//! face.

use crate::geometry::predicates::{Point2, sorted_ccw_xy};
use crate::mesh_error::MeshHalfedgeError;
use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use std::collections::BTreeSet;

/// Node identifier in a [`PlanarGraph`].
pub type NodeKey = u64;

/// A straight-line embedded graph: node coordinates plus undirected edges.
///
/// Nodes and neighbors keep insertion order, so cycle discovery is
/// deterministic for a given construction sequence.
#[derive(Clone, Debug, Default)]
pub struct PlanarGraph {
    coordinates: HashMap<NodeKey, Point2>,
    adjacency: HashMap<NodeKey, Vec<NodeKey>>,
    order: Vec<NodeKey>,
}

impl PlanarGraph {
    /// Empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or move) a node at the given XY position.
    pub fn add_node(&mut self, key: NodeKey, xy: Point2) {
        if self.coordinates.insert(key, xy).is_none() {
            self.adjacency.insert(key, Vec::new());
            self.order.push(key);
        }
    }

    /// Add an undirected edge between two existing nodes.
    ///
    /// Adding the same edge twice is a no-op.
    ///
    /// # Errors
    /// [`MeshHalfedgeError::UnknownNode`] naming the missing endpoint.
    pub fn add_edge(&mut self, u: NodeKey, v: NodeKey) -> Result<(), MeshHalfedgeError> {
        for key in [u, v] {
            if !self.coordinates.contains_key(&key) {
                return Err(MeshHalfedgeError::UnknownNode(key));
            }
        }
        let row = self.adjacency.get_mut(&u).unwrap();
        if !row.contains(&v) {
            row.push(v);
            self.adjacency.get_mut(&v).unwrap().push(u);
        }
        Ok(())
    }

    /// Node keys in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.order.iter().copied()
    }

    /// A node's XY position.
    pub fn node_position(&self, key: NodeKey) -> Option<Point2> {
        self.coordinates.get(&key).copied()
    }

    /// A node's neighbors in insertion order.
    pub fn neighbors(&self, key: NodeKey) -> Option<&[NodeKey]> {
        self.adjacency.get(&key).map(|row| row.as_slice())
    }

    /// A node's neighbors in counterclockwise rotational order.
    pub fn sorted_neighbors_ccw(&self, key: NodeKey) -> Option<Vec<NodeKey>> {
        let center = self.coordinates.get(&key)?;
        let keyed: Vec<(NodeKey, Point2)> = self.adjacency[&key]
            .iter()
            .map(|&nbr| (nbr, self.coordinates[&nbr]))
            .collect();
        Some(sorted_ccw_xy(*center, &keyed))
    }

    /// Find all oriented face cycles of the embedding.
    ///
    /// Walks every directed edge exactly once: from `(u, v)`, the walk moves
    /// to the predecessor of `u` in `v`'s counterclockwise neighbor ordering
    /// and repeats until it returns to `u`. Distinct cycles (by vertex set)
    /// are returned in discovery order.
    pub fn find_cycles(&self) -> Vec<Vec<NodeKey>> {
        let ordered: HashMap<NodeKey, Vec<NodeKey>> = self
            .order
            .iter()
            .map(|&key| (key, self.sorted_neighbors_ccw(key).unwrap()))
            .collect();
        let mut used: HashSet<(NodeKey, NodeKey)> = HashSet::new();
        let mut found: HashSet<BTreeSet<NodeKey>> = HashSet::new();
        let mut cycles = Vec::new();
        for &u in &self.order {
            for &v in &self.adjacency[&u] {
                if used.contains(&(u, v)) {
                    continue;
                }
                let cycle = walk_cycle(&ordered, u, v, &mut used);
                let key: BTreeSet<NodeKey> = cycle.iter().copied().collect();
                if found.insert(key) {
                    cycles.push(cycle);
                }
            }
        }
        cycles
    }
}

/// Trace one face cycle starting along `start_u -> start_v`, marking every
/// directed edge it consumes.
fn walk_cycle(
    ordered: &HashMap<NodeKey, Vec<NodeKey>>,
    start_u: NodeKey,
    start_v: NodeKey,
    used: &mut HashSet<(NodeKey, NodeKey)>,
) -> Vec<NodeKey> {
    let mut cycle = vec![start_u];
    let (mut u, mut v) = (start_u, start_v);
    loop {
        used.insert((u, v));
        if v == start_u {
            break;
        }
        cycle.push(v);
        let nbrs = &ordered[&v];
        let i = nbrs.iter().position(|&x| x == u).unwrap();
        let next = nbrs[(i + nbrs.len() - 1) % nbrs.len()];
        u = v;
        v = next;
    }
    cycle
}

/// Shoelace signed area of a cycle of XY points: positive for
/// counterclockwise, negative for clockwise.
pub fn signed_area_xy(points: &[Point2]) -> f64 {
    0.5 * points
        .iter()
        .circular_tuple_windows()
        .map(|(a, b)| a[0] * b[1] - b[0] * a[1])
        .sum::<f64>()
}
