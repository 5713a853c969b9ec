//! Bond graph construction with removal of degenerate tetrahedral bonds.

use hashbrown::{HashMap, HashSet};
use nalgebra::Point3;
use tracing::{debug, info};

use crate::cell::Cell;
use crate::error::{TopologyError, TopologyResult};
use crate::graph::{edge_key, Graph};
use crate::neighbors::{NeighborPair, PairFinder};

/// The bond network over point indices.
pub type BondGraph = Graph;

/// Summary of a bond graph build.
#[derive(Debug, Clone, Default)]
pub struct BondReport {
    /// Candidate pairs returned by the neighbor search.
    pub candidate_count: usize,

    /// 4-cliques found in the candidate graph.
    pub tetrahedron_count: usize,

    /// Distinct bonds removed (longest edge of each tetrahedron).
    pub removed: Vec<(u32, u32)>,

    /// Bonds remaining after removal.
    pub bond_count: usize,
}

/// Build the bond graph of `points` using `finder` for candidate pairs within `cutoff`.
///
/// Every tetrahedron (4-clique) of the candidate graph loses its longest
/// edge. The graph always has one vertex per point.
pub fn build_bond_graph<F: PairFinder + ?Sized>(
    points: &[Point3<f64>],
    cell: &Cell,
    cutoff: f64,
    finder: &F,
) -> TopologyResult<(BondGraph, BondReport)> {
    let pairs = finder.pairs(points, cell, cutoff)?;
    bond_graph_from_pairs(points.len(), &pairs)
}

/// Build the bond graph from a precomputed candidate pair list.
///
/// Pair distances are looked up by canonical key, so the list may contain
/// `(i, j)` or `(j, i)` in any order.
pub fn bond_graph_from_pairs(
    vertex_count: usize,
    pairs: &[NeighborPair],
) -> TopologyResult<(BondGraph, BondReport)> {
    let mut lengths: HashMap<(u32, u32), f64> = HashMap::with_capacity(pairs.len());
    for pair in pairs {
        if pair.i as usize >= vertex_count || pair.j as usize >= vertex_count {
            return Err(TopologyError::InvalidInput {
                details: format!(
                    "pair ({}, {}) references a point outside 0..{}",
                    pair.i, pair.j, vertex_count
                ),
            });
        }
        if pair.i == pair.j {
            continue;
        }
        lengths.insert(edge_key(pair.i, pair.j), pair.distance);
    }

    let mut graph = Graph::from_edges(vertex_count, lengths.keys().copied());
    let tetrahedra = graph.tetrahedra();

    let mut removed: Vec<(u32, u32)> = Vec::new();
    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    for tetra in &tetrahedra {
        let longest = longest_edge(tetra, &lengths);
        debug!("Tetrahedron {:?}: longest bond {:?}", tetra, longest);
        if seen.insert(longest) {
            removed.push(longest);
        }
    }

    for &(a, b) in &removed {
        graph.remove_edge(a, b);
    }

    let report = BondReport {
        candidate_count: lengths.len(),
        tetrahedron_count: tetrahedra.len(),
        removed,
        bond_count: graph.edge_count(),
    };

    info!(
        "Bond graph: {} candidates, {} tetrahedra, {} bonds removed, {} remain",
        report.candidate_count,
        report.tetrahedron_count,
        report.removed.len(),
        report.bond_count
    );

    Ok((graph, report))
}

/// Longest of the six edges of a tetrahedron.
///
/// Edges are visited in combination order (ab, ac, ad, bc, bd, cd); the
/// first of several equally long edges wins.
fn longest_edge(tetra: &[u32; 4], lengths: &HashMap<(u32, u32), f64>) -> (u32, u32) {
    let mut best = edge_key(tetra[0], tetra[1]);
    let mut best_length = f64::NEG_INFINITY;
    for a in 0..4 {
        for b in a + 1..4 {
            let key = edge_key(tetra[a], tetra[b]);
            // Every edge of a clique comes from the pair list.
            let length = lengths.get(&key).copied().unwrap_or(f64::NEG_INFINITY);
            if length > best_length {
                best = key;
                best_length = length;
            }
        }
    }
    best
}
