//! Dual graph of a triangulated bond network.
//!
//! Every triangle becomes a dual vertex located at its periodic centroid;
//! two dual vertices are joined when their triangles share a bond.

use nalgebra::{Point3, Vector3};
use tracing::{debug, info, warn};

use crate::adjacency::FaceAdjacency;
use crate::bonds::BondGraph;
use crate::cell::Cell;
use crate::error::{TopologyError, TopologyResult};
use crate::graph::Graph;

/// Dual of a triangulated bond graph.
#[derive(Debug, Clone)]
pub struct DualGraph {
    /// Triangles of the bond graph; dual vertex `t` is `triangles[t]`.
    pub triangles: Vec<[u32; 3]>,

    /// Centroid of each triangle, unwrapped around its first vertex.
    pub centroids: Vec<Point3<f64>>,

    /// Face adjacency: one edge per bond shared by two triangles.
    pub graph: Graph,

    /// Bonds bordered by more than two triangles. Only the first two
    /// triangles of such a bond are connected in `graph`.
    pub non_manifold_edges: Vec<(u32, u32)>,

    /// Bonds bordered by a single triangle.
    pub boundary_edge_count: usize,
}

impl DualGraph {
    /// Number of dual vertices (triangles).
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of dual edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether every bond borders at most two triangles.
    #[inline]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edges.is_empty()
    }
}

/// Build the dual graph of `graph`.
///
/// Triangles are the 3-cliques of the bond graph in lexicographic order.
pub fn dualize(points: &[Point3<f64>], cell: &Cell, graph: &BondGraph) -> TopologyResult<DualGraph> {
    if graph.vertex_count() > points.len() {
        return Err(TopologyError::InvalidInput {
            details: format!(
                "graph has {} vertices but only {} points were given",
                graph.vertex_count(),
                points.len()
            ),
        });
    }

    let triangles = graph.triangles();
    let centroids: Vec<Point3<f64>> = triangles
        .iter()
        .map(|tri| triangle_centroid(points, cell, tri))
        .collect();

    let adjacency = FaceAdjacency::build(&triangles);
    let mut dual = Graph::new(triangles.len());
    for faces in adjacency.edge_to_faces.values() {
        if let [first, second, ..] = faces.as_slice() {
            dual.add_edge(*first, *second);
        }
    }

    let non_manifold_edges = adjacency.non_manifold_edges();

    for &(a, b) in &non_manifold_edges {
        if let Some(faces) = adjacency.faces_for_edge(a, b) {
            warn!(
                "Bond ({}, {}) borders {} triangles {:?}; only the first two are connected",
                a,
                b,
                faces.len(),
                faces
            );
        }
    }

    let boundary_edge_count = adjacency.boundary_edge_count();
    if boundary_edge_count > 0 {
        debug!("{} bonds border a single triangle", boundary_edge_count);
    }

    info!(
        "Dual graph: {} vertices, {} edges ({} non-manifold bonds)",
        triangles.len(),
        dual.edge_count(),
        non_manifold_edges.len()
    );

    Ok(DualGraph {
        triangles,
        centroids,
        graph: dual,
        non_manifold_edges,
        boundary_edge_count,
    })
}

/// Centroid of a triangle with its vertices unwrapped around `tri[0]`.
fn triangle_centroid(points: &[Point3<f64>], cell: &Cell, tri: &[u32; 3]) -> Point3<f64> {
    let origin = points[tri[0] as usize];
    let offset: Vector3<f64> = tri[1..]
        .iter()
        .map(|&v| cell.displacement(&points[v as usize], &origin))
        .sum();
    origin + offset / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn big_cell() -> Cell {
        Cell::orthorhombic(20.0, 20.0, 20.0).unwrap()
    }

    fn diamond() -> (Vec<Point3<f64>>, Graph) {
        // Two triangles sharing the 0–2 bond.
        let points = vec![
            Point3::new(5.0, 5.0, 5.0),
            Point3::new(6.0, 6.0, 5.0),
            Point3::new(7.0, 5.0, 5.0),
            Point3::new(6.0, 4.0, 5.0),
        ];
        let graph = Graph::from_edges(4, [(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)]);
        (points, graph)
    }

    #[test]
    fn test_shared_edge_gives_one_dual_edge() {
        let (points, graph) = diamond();
        let dual = dualize(&points, &big_cell(), &graph).unwrap();

        assert_eq!(dual.vertex_count(), 2);
        assert_eq!(dual.edge_count(), 1);
        assert!(dual.graph.has_edge(0, 1));
        assert_eq!(dual.boundary_edge_count, 4);
        assert!(dual.is_manifold());
    }

    #[test]
    fn test_centroids() {
        let (points, graph) = diamond();
        let dual = dualize(&points, &big_cell(), &graph).unwrap();

        assert_eq!(dual.triangles, vec![[0, 1, 2], [0, 2, 3]]);
        assert_relative_eq!(dual.centroids[0], Point3::new(6.0, 16.0 / 3.0, 5.0), epsilon = 1e-12);
        assert_relative_eq!(dual.centroids[1], Point3::new(6.0, 14.0 / 3.0, 5.0), epsilon = 1e-12);
    }

    #[test]
    fn test_centroid_unwrapped_across_boundary() {
        let cell = Cell::orthorhombic(10.0, 10.0, 10.0).unwrap();
        let points = vec![
            Point3::new(9.8, 5.0, 5.0),
            Point3::new(0.4, 5.0, 5.0),
            Point3::new(0.1, 5.6, 5.0),
        ];
        let graph = Graph::from_edges(3, [(0, 1), (1, 2), (0, 2)]);
        let dual = dualize(&points, &cell, &graph).unwrap();

        // Unwrapped around 9.8: x = (9.8 + 10.4 + 10.1) / 3.
        assert_relative_eq!(dual.centroids[0].x, 10.1, epsilon = 1e-12);
        assert_relative_eq!(dual.centroids[0].y, 5.2, epsilon = 1e-12);
    }

    #[test]
    fn test_tetrahedron_surface_dual() {
        let points = vec![
            Point3::new(5.0, 5.0, 5.0),
            Point3::new(6.0, 5.0, 5.0),
            Point3::new(5.5, 6.0, 5.0),
            Point3::new(5.5, 5.5, 6.0),
        ];
        let graph = Graph::from_edges(4, [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        let dual = dualize(&points, &big_cell(), &graph).unwrap();

        // The dual of a tetrahedron is a tetrahedron.
        assert_eq!(dual.vertex_count(), 4);
        assert_eq!(dual.edge_count(), 6);
        for t in 0..4 {
            assert_eq!(dual.graph.degree(t), 3);
        }
        assert_eq!(dual.boundary_edge_count, 0);
    }

    #[test]
    fn test_non_manifold_bond_reported() {
        // Three triangles hinged on the 0–1 bond.
        let points = vec![
            Point3::new(5.0, 5.0, 5.0),
            Point3::new(6.0, 5.0, 5.0),
            Point3::new(5.5, 6.0, 5.0),
            Point3::new(5.5, 4.0, 5.0),
            Point3::new(5.5, 5.0, 6.0),
        ];
        let graph = Graph::from_edges(5, [(0, 1), (0, 2), (1, 2), (0, 3), (1, 3), (0, 4), (1, 4)]);
        let dual = dualize(&points, &big_cell(), &graph).unwrap();

        assert_eq!(dual.vertex_count(), 3);
        assert_eq!(dual.non_manifold_edges, vec![(0, 1)]);
        assert!(!dual.is_manifold());
        assert_eq!(dual.edge_count(), 1);
        assert!(dual.graph.has_edge(0, 1));
    }

    #[test]
    fn test_points_shorter_than_graph_rejected() {
        let (_, graph) = diamond();
        let result = dualize(&[Point3::origin()], &big_cell(), &graph);
        assert!(matches!(result, Err(TopologyError::InvalidInput { .. })));
    }
}
