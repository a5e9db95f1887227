//! Connection Graph
//!
//! Undirected adjacency between occupied lattice cells. An edge means the
//! two blocks are physically bonded and their connection offsets agree.
//! Edges are stored in both directions and set semantics apply.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::world::LatticeCoord;

/// Adjacency sets keyed by lattice coordinate.
#[derive(Debug, Clone, Default)]
pub struct ConnectionGraph {
    edges: HashMap<LatticeCoord, BTreeSet<LatticeCoord>>,
}

impl ConnectionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an undirected edge. Self-edges are refused.
    ///
    /// Returns true if the edge is new.
    pub fn add_connection(&mut self, a: LatticeCoord, b: LatticeCoord) -> bool {
        if a == b {
            log::debug!("[Connections] self-edge at {a} refused");
            return false;
        }
        let added = self.edges.entry(a).or_default().insert(b);
        self.edges.entry(b).or_default().insert(a);
        added
    }

    /// Delete `coord` and strip it from every neighbour's set.
    pub fn remove_connections(&mut self, coord: LatticeCoord) {
        let Some(neighbors) = self.edges.remove(&coord) else {
            return;
        };
        for n in neighbors {
            let now_empty = match self.edges.get_mut(&n) {
                Some(set) => {
                    set.remove(&coord);
                    set.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.edges.remove(&n);
            }
        }
    }

    /// Neighbours of `coord` in ascending order.
    pub fn neighbors(&self, coord: LatticeCoord) -> impl Iterator<Item = LatticeCoord> + '_ {
        self.edges.get(&coord).into_iter().flatten().copied()
    }

    pub fn is_connected(&self, a: LatticeCoord, b: LatticeCoord) -> bool {
        self.edges.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Coordinates that have at least one edge.
    pub fn keys(&self) -> impl Iterator<Item = LatticeCoord> + '_ {
        self.edges.keys().copied()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    /// Every coordinate reachable from `start` through present edges,
    /// `start` included.
    pub fn reachable_from(&self, start: LatticeCoord) -> HashSet<LatticeCoord> {
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(coord) = queue.pop_front() {
            for neighbor in self.neighbors(coord) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        visited
    }

    /// Every stored edge has its reverse.
    pub fn is_symmetric(&self) -> bool {
        self.edges
            .iter()
            .all(|(a, set)| set.iter().all(|b| self.is_connected(*b, *a)))
    }
}
