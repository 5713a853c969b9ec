//! End-to-end topology derivation: first shell, bonds, repair.

use nalgebra::Point3;
use tracing::info;

use crate::bonds::{build_bond_graph, BondGraph, BondReport};
use crate::cell::Cell;
use crate::config::TopologyConfig;
use crate::error::TopologyResult;
use crate::neighbors::{CellListPairs, PairFinder, PeakDistance};
use crate::repair::{repair_topology, RepairReport};
use crate::validate::{log_validation, validate_topology, TopologyReport};

/// A repaired bond topology together with the diagnostics of each stage.
#[derive(Debug, Clone)]
pub struct Topology {
    /// Triangulated bond graph.
    pub graph: BondGraph,

    /// Estimated first-shell distance.
    pub first_shell: f64,

    /// Bond cutoff derived from the first shell.
    pub cutoff: f64,

    /// Bond construction summary.
    pub bonds: BondReport,

    /// Repair pass summary.
    pub repair: RepairReport,

    /// Validation of the final graph.
    pub report: TopologyReport,
}

/// Derive the triangulated bond topology of `points` with the default
/// neighbor search and first-shell estimator.
pub fn derive_topology(points: &[Point3<f64>], cell: &Cell, config: &TopologyConfig) -> TopologyResult<Topology> {
    let estimator = config.first_shell.estimator();
    derive_topology_with(points, cell, config, &CellListPairs, &estimator)
}

/// Derive the triangulated bond topology of `points` using caller-supplied collaborators.
///
/// 1. Estimate the first-shell distance and scale it by `cutoff_scale`
/// 2. Build the bond graph, dropping the longest bond of every tetrahedron
/// 3. Split every 4-ring along its shorter diagonal
/// 4. Validate the result
pub fn derive_topology_with<F, E>(
    points: &[Point3<f64>],
    cell: &Cell,
    config: &TopologyConfig,
    finder: &F,
    estimator: &E,
) -> TopologyResult<Topology>
where
    F: PairFinder + ?Sized,
    E: PeakDistance + ?Sized,
{
    config.validate()?;

    let first_shell = estimator.estimate(points, cell)?;
    let cutoff = first_shell * config.cutoff_scale;
    info!("First shell {:.4}, bond cutoff {:.4}", first_shell, cutoff);

    let (mut graph, bonds) = build_bond_graph(points, cell, cutoff, finder)?;
    let repair = repair_topology(&mut graph, points, cell)?;

    let report = validate_topology(&graph, config.max_ring_size);
    log_validation(&report);

    Ok(Topology {
        graph,
        first_shell,
        cutoff,
        bonds,
        repair,
        report,
    })
}
