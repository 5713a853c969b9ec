//! Undirected simple graph over point indices, with bounded clique enumeration.

use std::collections::BTreeSet;

/// Canonical (smaller, larger) key for an undirected edge.
#[inline]
pub fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Undirected simple graph with vertices `0..vertex_count`.
///
/// Neighbor sets are ordered so that clique and ring enumeration visit
/// vertices in a reproducible order. No edge weights are stored; lengths are
/// recomputed from positions and the cell when needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: Vec<BTreeSet<u32>>,
}

impl Graph {
    /// Create an edgeless graph with `vertex_count` vertices.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            adjacency: vec![BTreeSet::new(); vertex_count],
        }
    }

    /// Create a graph from an edge list. Self-loops are ignored.
    pub fn from_edges(vertex_count: usize, edges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut graph = Self::new(vertex_count);
        for (a, b) in edges {
            graph.add_edge(a, b);
        }
        graph
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Add an undirected edge, growing the vertex set if needed.
    ///
    /// Returns `true` if the edge was not already present. Self-loops are
    /// rejected and return `false`.
    pub fn add_edge(&mut self, a: u32, b: u32) -> bool {
        if a == b {
            return false;
        }
        let needed = a.max(b) as usize + 1;
        if needed > self.adjacency.len() {
            self.adjacency.resize(needed, BTreeSet::new());
        }
        let inserted = self.adjacency[a as usize].insert(b);
        self.adjacency[b as usize].insert(a);
        inserted
    }

    /// Remove an undirected edge. Returns `true` if it was present.
    pub fn remove_edge(&mut self, a: u32, b: u32) -> bool {
        let removed = self
            .adjacency
            .get_mut(a as usize)
            .is_some_and(|set| set.remove(&b));
        if removed {
            self.adjacency[b as usize].remove(&a);
        }
        removed
    }

    /// Whether `a` and `b` are adjacent.
    #[inline]
    pub fn has_edge(&self, a: u32, b: u32) -> bool {
        self.adjacency
            .get(a as usize)
            .is_some_and(|set| set.contains(&b))
    }

    /// Neighbors of `v` in ascending order.
    pub fn neighbors(&self, v: u32) -> impl Iterator<Item = u32> + '_ {
        self.adjacency
            .get(v as usize)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Degree of `v` (0 for vertices outside the graph).
    pub fn degree(&self, v: u32) -> usize {
        self.adjacency.get(v as usize).map_or(0, BTreeSet::len)
    }

    /// Iterate over edges as canonical `(smaller, larger)` pairs in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(a, set)| {
            let a = a as u32;
            set.range(a + 1..).map(move |&b| (a, b))
        })
    }

    /// Neighbors of `v` greater than `floor`.
    fn upper_neighbors(&self, v: u32, floor: u32) -> impl Iterator<Item = u32> + '_ {
        self.adjacency[v as usize].range(floor + 1..).copied()
    }

    /// All 3-cliques as ascending triples `[i, j, k]`, ordered lexicographically.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        let mut triangles = Vec::new();
        for i in 0..self.vertex_count() as u32 {
            for j in self.upper_neighbors(i, i) {
                for k in self.upper_neighbors(j, j) {
                    if self.has_edge(i, k) {
                        triangles.push([i, j, k]);
                    }
                }
            }
        }
        triangles
    }

    /// All 4-cliques as ascending quadruples, ordered lexicographically.
    pub fn tetrahedra(&self) -> Vec<[u32; 4]> {
        let mut tetrahedra = Vec::new();
        for [i, j, k] in self.triangles() {
            for l in self.upper_neighbors(k, k) {
                if self.has_edge(i, l) && self.has_edge(j, l) {
                    tetrahedra.push([i, j, k, l]);
                }
            }
        }
        tetrahedra
    }
}
