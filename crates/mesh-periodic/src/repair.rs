//! Topology repair: split every quadrilateral ring along its shorter diagonal.

use nalgebra::Point3;
use tracing::{debug, info};

use crate::bonds::BondGraph;
use crate::cell::Cell;
use crate::error::{TopologyError, TopologyResult};
use crate::rings::{find_rings, RingHistogram, DEFAULT_MAX_RING_SIZE};

/// Outcome of a repair pass.
#[derive(Debug, Clone)]
pub struct RepairReport {
    /// Ring histogram of the graph as it was passed in.
    pub histogram_before: RingHistogram,

    /// Ring histogram after the diagonals were inserted.
    pub histogram_after: RingHistogram,

    /// Diagonals inserted, one per 4-ring of the input.
    pub diagonals: Vec<(u32, u32)>,

    /// Diagonals that were not already bonds.
    pub added_count: usize,
}

impl RepairReport {
    /// Whether the repaired graph has no ring other than triangles (up to size 6).
    pub fn is_triangulated(&self) -> bool {
        let counts = self.histogram_after.counts();
        counts.iter().enumerate().all(|(size, &n)| size == 3 || n == 0)
    }
}

/// Triangulate the bond graph in one pass.
///
/// Every ring of up to six members must be a triangle or a quadrilateral;
/// anything else is reported as [`TopologyError::MalformedTopology`] before
/// the graph is touched. Each quadrilateral `(v0, v1, v2, v3)` receives the
/// shorter of its two periodic diagonals, `v0–v2` winning ties. The pass is
/// not iterated; callers that need a fixed point can inspect
/// `histogram_after` and call again.
pub fn repair_topology(
    graph: &mut BondGraph,
    points: &[Point3<f64>],
    cell: &Cell,
) -> TopologyResult<RepairReport> {
    if graph.vertex_count() > points.len() {
        return Err(TopologyError::InvalidInput {
            details: format!(
                "graph has {} vertices but only {} points were given",
                graph.vertex_count(),
                points.len()
            ),
        });
    }

    let rings = find_rings(graph, DEFAULT_MAX_RING_SIZE);
    let histogram_before = RingHistogram::from_rings(&rings, DEFAULT_MAX_RING_SIZE);
    info!("Ring histogram before repair: {}", histogram_before);

    let mut diagonals = Vec::new();
    for ring in &rings {
        match ring.len() {
            3 => {}
            4 => diagonals.push(shorter_diagonal(ring, points, cell)),
            length => {
                return Err(TopologyError::MalformedTopology {
                    length,
                    ring: ring.clone(),
                })
            }
        }
    }

    let mut added_count = 0;
    for &(a, b) in &diagonals {
        if graph.add_edge(a, b) {
            added_count += 1;
        } else {
            debug!("Diagonal ({}, {}) already bonded", a, b);
        }
    }

    let histogram_after = RingHistogram::from_graph(graph, DEFAULT_MAX_RING_SIZE);
    info!(
        "Ring histogram after repair: {} ({} diagonals added)",
        histogram_after, added_count
    );

    Ok(RepairReport {
        histogram_before,
        histogram_after,
        diagonals,
        added_count,
    })
}

/// The shorter diagonal of quadrilateral ring `(v0, v1, v2, v3)`.
fn shorter_diagonal(ring: &[u32], points: &[Point3<f64>], cell: &Cell) -> (u32, u32) {
    let p = |k: usize| &points[ring[k] as usize];
    let d1 = cell.displacement(p(2), p(0)).norm_squared();
    let d2 = cell.displacement(p(3), p(1)).norm_squared();

    if d1 > d2 {
        (ring[1], ring[3])
    } else {
        (ring[0], ring[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    fn big_cell() -> Cell {
        Cell::orthorhombic(20.0, 20.0, 20.0).unwrap()
    }

    fn square_graph() -> Graph {
        Graph::from_edges(4, [(0, 1), (1, 2), (2, 3), (3, 0)])
    }

    #[test]
    fn test_square_split_by_shorter_diagonal() {
        // Rhombus: 0–2 is the long axis, 1–3 the short one.
        let points = vec![
            Point3::new(5.0, 5.0, 5.0),
            Point3::new(6.0, 5.6, 5.0),
            Point3::new(7.0, 5.0, 5.0),
            Point3::new(6.0, 4.4, 5.0),
        ];
        let mut graph = square_graph();
        let report = repair_topology(&mut graph, &points, &big_cell()).unwrap();

        assert_eq!(report.diagonals, vec![(1, 3)]);
        assert!(graph.has_edge(1, 3));
        assert!(!graph.has_edge(0, 2));
        assert_eq!(report.histogram_before.count(4), 1);
        assert_eq!(report.histogram_after.count(4), 0);
        assert_eq!(report.histogram_after.count(3), 2);
        assert!(report.is_triangulated());
    }

    #[test]
    fn test_equal_diagonals_prefer_first() {
        let points = vec![
            Point3::new(5.0, 5.0, 5.0),
            Point3::new(6.0, 5.0, 5.0),
            Point3::new(6.0, 6.0, 5.0),
            Point3::new(5.0, 6.0, 5.0),
        ];
        let mut graph = square_graph();
        let report = repair_topology(&mut graph, &points, &big_cell()).unwrap();
        assert_eq!(report.diagonals, vec![(0, 2)]);
    }

    #[test]
    fn test_diagonal_uses_minimum_image() {
        // The square straddles the cell boundary along x.
        let cell = Cell::orthorhombic(10.0, 10.0, 10.0).unwrap();
        let points = vec![
            Point3::new(9.5, 5.0, 5.0),
            Point3::new(0.3, 5.5, 5.0),
            Point3::new(1.1, 5.0, 5.0),
            Point3::new(0.3, 4.5, 5.0),
        ];
        let mut graph = square_graph();
        let report = repair_topology(&mut graph, &points, &cell).unwrap();
        // Wrapped 0–2 spans 1.6, 1–3 spans 1.0.
        assert_eq!(report.diagonals, vec![(1, 3)]);
    }

    #[test]
    fn test_shared_diagonal_added_once() {
        // Four paths of length two between 0 and 2 form six 4-rings, all of
        // which pick the short 0–2 diagonal.
        let points = vec![
            Point3::new(5.0, 5.0, 5.0),
            Point3::new(5.5, 6.0, 5.0),
            Point3::new(6.0, 5.0, 5.0),
            Point3::new(5.5, 4.0, 5.0),
            Point3::new(5.5, 5.0, 6.0),
            Point3::new(5.5, 5.0, 4.0),
        ];
        let mut graph = Graph::new(6);
        for a in [1, 3, 4, 5] {
            graph.add_edge(0, a);
            graph.add_edge(a, 2);
        }
        let before = graph.edge_count();

        let report = repair_topology(&mut graph, &points, &big_cell()).unwrap();
        assert_eq!(report.histogram_before.count(4), 6);
        assert_eq!(report.diagonals.len(), 6);
        assert!(report.diagonals.iter().all(|&d| d == (0, 2)));
        assert_eq!(report.added_count, 1);
        assert_eq!(graph.edge_count(), before + 1);
        assert_eq!(report.histogram_after.count(3), 4);
        assert!(report.is_triangulated());
    }

    #[test]
    fn test_pentagon_is_malformed() {
        let points: Vec<_> = (0..5)
            .map(|k| {
                let angle = k as f64 * std::f64::consts::TAU / 5.0;
                Point3::new(10.0 + angle.cos(), 10.0 + angle.sin(), 10.0)
            })
            .collect();
        let mut graph = Graph::from_edges(5, (0..5).map(|k| (k, (k + 1) % 5)));
        let before = graph.clone();

        let err = repair_topology(&mut graph, &points, &big_cell()).unwrap_err();
        match err {
            TopologyError::MalformedTopology { length, ring } => {
                assert_eq!(length, 5);
                assert_eq!(ring.len(), 5);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(graph, before, "graph must be untouched on failure");
    }

    #[test]
    fn test_points_shorter_than_graph_rejected() {
        let mut graph = square_graph();
        let result = repair_topology(&mut graph, &[Point3::origin()], &big_cell());
        assert!(matches!(result, Err(TopologyError::InvalidInput { .. })));
    }
}
