//! Ring (irreducible cycle) enumeration and ring-size statistics.
//!
//! A *ring* is a simple cycle with no shortcut: for every pair of its
//! vertices, the shortest path through the graph is no shorter than the
//! shorter way around the ring. Two triangles sharing an edge therefore
//! contribute two 3-rings but no 4-ring, while an empty square is a 4-ring.

use std::collections::VecDeque;
use std::fmt;

use hashbrown::HashMap;

use crate::graph::Graph;

/// Largest ring size considered by the topology repairer.
pub const DEFAULT_MAX_RING_SIZE: usize = 6;

/// Enumerate all rings with at most `max_size` vertices.
///
/// Each ring is reported once, starting at its smallest vertex and walking
/// toward the smaller of that vertex's two ring neighbors.
pub fn find_rings(graph: &Graph, max_size: usize) -> Vec<Vec<u32>> {
    let mut rings = Vec::new();
    if max_size < 3 {
        return rings;
    }

    let mut path = Vec::with_capacity(max_size);
    for start in 0..graph.vertex_count() as u32 {
        path.clear();
        path.push(start);
        extend_path(graph, max_size, &mut path, &mut rings);
    }
    rings
}

/// Depth-first extension of `path` through vertices larger than its start.
fn extend_path(graph: &Graph, max_size: usize, path: &mut Vec<u32>, rings: &mut Vec<Vec<u32>>) {
    let start = path[0];
    let last = path[path.len() - 1];

    for next in graph.neighbors(last) {
        if next == start {
            // Closing edge; the direction check drops the mirrored walk.
            if path.len() >= 3 && path[1] < last && is_shortcut_free(graph, path) {
                rings.push(path.clone());
            }
            continue;
        }
        if next < start || path.len() == max_size || path.contains(&next) {
            continue;
        }
        path.push(next);
        extend_path(graph, max_size, path, rings);
        path.pop();
    }
}

/// Whether no two vertices of `ring` are joined by a path shorter than
/// their separation along the ring.
pub fn is_shortcut_free(graph: &Graph, ring: &[u32]) -> bool {
    let size = ring.len();
    if size <= 3 {
        return true;
    }

    for a in 0..size {
        // A shortcut has length < size / 2, so the search never needs to go deeper.
        let depth = size / 2 - 1;
        let distances = bounded_distances(graph, ring[a], depth);
        for b in a + 2..size {
            let along = (b - a).min(size - (b - a));
            if let Some(&through) = distances.get(&ring[b]) {
                if through < along {
                    return false;
                }
            }
        }
    }
    true
}

/// Breadth-first distances from `source`, truncated at `max_depth` hops.
fn bounded_distances(graph: &Graph, source: u32, max_depth: usize) -> HashMap<u32, usize> {
    let mut distances = HashMap::new();
    let mut queue = VecDeque::new();
    distances.insert(source, 0);
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        let depth = distances[&v];
        if depth == max_depth {
            continue;
        }
        for w in graph.neighbors(v) {
            if !distances.contains_key(&w) {
                distances.insert(w, depth + 1);
                queue.push_back(w);
            }
        }
    }
    distances
}

/// Frequency of ring sizes, indexed by size (`counts[k]` = number of `k`-rings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingHistogram {
    counts: Vec<usize>,
}

impl RingHistogram {
    /// Tally rings of `graph` up to `max_size`.
    pub fn from_graph(graph: &Graph, max_size: usize) -> Self {
        Self::from_rings(&find_rings(graph, max_size), max_size)
    }

    /// Tally a precomputed ring list. Rings larger than `max_size` are ignored.
    pub fn from_rings(rings: &[Vec<u32>], max_size: usize) -> Self {
        let mut counts = vec![0; max_size + 1];
        for ring in rings {
            if let Some(slot) = counts.get_mut(ring.len()) {
                *slot += 1;
            }
        }
        Self { counts }
    }

    /// Number of rings with `size` vertices.
    #[inline]
    pub fn count(&self, size: usize) -> usize {
        self.counts.get(size).copied().unwrap_or(0)
    }

    /// Raw counts, indexed by ring size.
    #[inline]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Total number of rings.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl fmt::Display for RingHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.counts)
    }
}

/// Ring histogram with the default bucket range (sizes 0..=6).
pub fn ring_histogram(graph: &Graph) -> RingHistogram {
    RingHistogram::from_graph(graph, DEFAULT_MAX_RING_SIZE)
}
