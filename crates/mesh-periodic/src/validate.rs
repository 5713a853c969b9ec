//! Topology validation and reporting.

use tracing::{debug, info, warn};

use crate::adjacency::FaceAdjacency;
use crate::bonds::BondGraph;
use crate::rings::RingHistogram;

/// Validation report for a bond graph.
#[derive(Debug, Clone)]
pub struct TopologyReport {
    /// Total vertex count.
    pub vertex_count: usize,

    /// Total bond count.
    pub edge_count: usize,

    /// Number of 3-cliques.
    pub triangle_count: usize,

    /// Number of 4-cliques.
    pub tetrahedron_count: usize,

    /// Ring sizes up to the requested maximum.
    pub ring_histogram: RingHistogram,

    /// Bonds bordered by exactly one triangle.
    pub boundary_edge_count: usize,

    /// Bonds bordered by more than two triangles.
    pub non_manifold_edge_count: usize,

    /// Bonds that belong to no triangle.
    pub bare_edge_count: usize,

    /// Vertices with no bonds.
    pub isolated_vertex_count: usize,
}

impl TopologyReport {
    /// Whether every ring is a triangle and every bond lies in one.
    pub fn is_triangulated(&self) -> bool {
        let rings_ok = self
            .ring_histogram
            .counts()
            .iter()
            .enumerate()
            .all(|(size, &n)| size == 3 || n == 0);
        rings_ok && self.bare_edge_count == 0
    }

    /// Whether the triangles form a closed 2-manifold.
    pub fn is_closed_manifold(&self) -> bool {
        self.boundary_edge_count == 0 && self.non_manifold_edge_count == 0
    }
}

impl std::fmt::Display for TopologyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Topology Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Bonds: {}", self.edge_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(f, "  Tetrahedra: {}", self.tetrahedron_count)?;
        writeln!(f, "  Rings: {}", self.ring_histogram)?;

        writeln!(
            f,
            "  Triangulated: {} (bare bonds: {})",
            if self.is_triangulated() { "yes" } else { "NO" },
            self.bare_edge_count
        )?;

        writeln!(
            f,
            "  Closed manifold: {} (boundary bonds: {}, non-manifold bonds: {})",
            if self.is_closed_manifold() { "yes" } else { "NO" },
            self.boundary_edge_count,
            self.non_manifold_edge_count
        )?;

        if self.isolated_vertex_count > 0 {
            writeln!(f, "  Isolated vertices: {}", self.isolated_vertex_count)?;
        }

        Ok(())
    }
}

/// Validate a bond graph and return a report.
pub fn validate_topology(graph: &BondGraph, max_ring_size: usize) -> TopologyReport {
    let triangles = graph.triangles();
    let adjacency = FaceAdjacency::build(&triangles);

    let bare_edge_count = graph
        .edges()
        .filter(|&(a, b)| adjacency.faces_for_edge(a, b).is_none())
        .count();
    let isolated_vertex_count = (0..graph.vertex_count() as u32)
        .filter(|&v| graph.degree(v) == 0)
        .count();

    let report = TopologyReport {
        vertex_count: graph.vertex_count(),
        edge_count: graph.edge_count(),
        triangle_count: triangles.len(),
        tetrahedron_count: graph.tetrahedra().len(),
        ring_histogram: RingHistogram::from_graph(graph, max_ring_size),
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edges().len(),
        bare_edge_count,
        isolated_vertex_count,
    };

    if !report.is_triangulated() {
        warn!(
            "Bond graph is not triangulated: rings {}, {} bare bonds",
            report.ring_histogram, report.bare_edge_count
        );
    }

    if report.non_manifold_edge_count > 0 {
        warn!(
            "Bond graph is not manifold: {} bonds border more than two triangles",
            report.non_manifold_edge_count
        );
    }

    debug!("{}", report);

    report
}

/// Log a summary of topology validation.
pub fn log_validation(report: &TopologyReport) {
    info!(
        "Topology: {} vertices, {} bonds, {} triangles, rings {}",
        report.vertex_count, report.edge_count, report.triangle_count, report.ring_histogram
    );

    if report.is_triangulated() && report.is_closed_manifold() {
        info!("Bond graph is a closed triangulated surface");
    } else {
        if report.boundary_edge_count > 0 {
            warn!("Open: {} boundary bonds", report.boundary_edge_count);
        }
        if report.non_manifold_edge_count > 0 {
            warn!("Not manifold: {} non-manifold bonds", report.non_manifold_edge_count);
        }
    }
}
