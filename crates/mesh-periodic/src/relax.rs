//! Spring relaxation ("quench") of points along the bond graph.
//!
//! Every bond acts as a Hookean spring of unit stiffness and zero rest
//! length, so the network contracts uniformly while its shape relaxes.
//! Positions are advanced by explicit Euler steps without velocities.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bonds::BondGraph;
use crate::cell::Cell;
use crate::error::{TopologyError, TopologyResult};
use crate::neighbors::PeakDistance;
use crate::snapshot::FrameSink;

/// Parameters for a relaxation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuenchParams {
    /// Euler time step.
    pub dt: f64,

    /// Number of steps to run.
    pub max_steps: usize,

    /// Stop early once the energy changes by less than this between steps.
    /// `None` always runs `max_steps`.
    pub energy_tolerance: Option<f64>,
}

impl Default for QuenchParams {
    fn default() -> Self {
        Self {
            dt: 0.01,
            max_steps: 100,
            energy_tolerance: None,
        }
    }
}

impl QuenchParams {
    /// Set the time step.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set the number of steps.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Enable early termination on a small energy change.
    pub fn with_energy_tolerance(mut self, tolerance: f64) -> Self {
        self.energy_tolerance = Some(tolerance);
        self
    }
}

/// Per-step record of a relaxation run.
#[derive(Debug, Clone, Default)]
pub struct QuenchReport {
    /// Spring energy evaluated at the start of each step.
    pub energies: Vec<f64>,

    /// First-shell distance after each step.
    pub first_shell: Vec<f64>,

    /// Whether the run stopped on `energy_tolerance`.
    pub converged: bool,
}

impl QuenchReport {
    /// Number of steps taken.
    pub fn steps(&self) -> usize {
        self.energies.len()
    }
}

/// Spring forces on every point and the total spring energy.
///
/// For each bond `(i, j)` with minimum-image displacement `d = x_i - x_j`,
/// `i` is pulled by `-d`, `j` by `+d`, and the energy grows by `|d|² / 2`.
/// A zero-length bond is rejected since its direction is undefined.
pub fn compute_forces(
    points: &[Point3<f64>],
    cell: &Cell,
    graph: &BondGraph,
) -> TopologyResult<(Vec<Vector3<f64>>, f64)> {
    if graph.vertex_count() > points.len() {
        return Err(TopologyError::InvalidInput {
            details: format!(
                "graph has {} vertices but only {} points were given",
                graph.vertex_count(),
                points.len()
            ),
        });
    }

    let mut forces = vec![Vector3::zeros(); points.len()];
    let mut energy = 0.0;

    for (i, j) in graph.edges() {
        let d = cell.displacement(&points[i as usize], &points[j as usize]);
        let r = d.norm();
        if !(r > 0.0 && r.is_finite()) {
            return Err(TopologyError::DegenerateGeometry {
                details: format!("bond ({}, {}) has length {}", i, j, r),
            });
        }
        let pull = (d / r) * r;
        forces[i as usize] -= pull;
        forces[j as usize] += pull;
        energy += r * r / 2.0;
    }

    Ok((forces, energy))
}

/// Relax `points` in place along `graph`.
///
/// Each step evaluates the spring forces, moves every point by
/// `force * dt`, re-estimates the first-shell distance with `estimator`, and
/// hands the new configuration to `sink` when one is given. The bond graph is
/// not rebuilt during the run.
///
/// If any step fails, `points` are restored to their input positions before
/// the error is returned.
pub fn quench(
    points: &mut [Point3<f64>],
    cell: &Cell,
    graph: &BondGraph,
    params: &QuenchParams,
    estimator: &dyn PeakDistance,
    sink: Option<&mut dyn FrameSink>,
) -> TopologyResult<QuenchReport> {
    if !(params.dt > 0.0 && params.dt.is_finite()) {
        return Err(TopologyError::InvalidInput {
            details: format!("time step must be positive and finite, got {}", params.dt),
        });
    }

    let initial = points.to_vec();
    let result = run_steps(points, cell, graph, params, estimator, sink);
    if let Err(e) = &result {
        warn!("Quench failed, restoring input positions: {}", e);
        points.copy_from_slice(&initial);
    }
    result
}

fn run_steps(
    points: &mut [Point3<f64>],
    cell: &Cell,
    graph: &BondGraph,
    params: &QuenchParams,
    estimator: &dyn PeakDistance,
    mut sink: Option<&mut dyn FrameSink>,
) -> TopologyResult<QuenchReport> {
    info!(
        "Quench: {} points, {} bonds, dt = {}, up to {} steps",
        points.len(),
        graph.edge_count(),
        params.dt,
        params.max_steps
    );

    let mut report = QuenchReport::default();
    for step in 0..params.max_steps {
        let (forces, energy) = compute_forces(points, cell, graph)?;
        info!("Step {}: energy {:.6}", step, energy);

        for (p, f) in points.iter_mut().zip(&forces) {
            *p += f * params.dt;
        }

        let rpeak = estimator.estimate(points, cell)?;
        debug!("Step {}: first shell {:.6}", step, rpeak);

        if let Some(sink) = sink.as_deref_mut() {
            sink.write_frame(points, cell, graph)?;
        }

        let previous = report.energies.last().copied();
        report.energies.push(energy);
        report.first_shell.push(rpeak);

        if let (Some(tolerance), Some(previous)) = (params.energy_tolerance, previous) {
            if (previous - energy).abs() < tolerance {
                info!("Quench converged after {} steps", step + 1);
                report.converged = true;
                break;
            }
        }
    }

    if let &[.., before, last] = report.energies.as_slice() {
        if last > before {
            warn!("Energy rose on the final step ({:.6} → {:.6})", before, last);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::snapshot::YaplotWriter;
    use approx::assert_relative_eq;

    /// Reports the minimum-image distance between the first two points.
    struct PairSpacing;

    impl PeakDistance for PairSpacing {
        fn estimate(&self, points: &[Point3<f64>], cell: &Cell) -> TopologyResult<f64> {
            Ok(cell.distance(&points[0], &points[1]))
        }
    }

    fn two_body() -> (Vec<Point3<f64>>, Cell, Graph) {
        let points = vec![Point3::new(1.0, 1.0, 1.0), Point3::new(3.0, 1.0, 1.0)];
        let cell = Cell::orthorhombic(10.0, 10.0, 10.0).unwrap();
        let graph = Graph::from_edges(2, [(0, 1)]);
        (points, cell, graph)
    }

    #[test]
    fn test_forces_two_body() {
        let (points, cell, graph) = two_body();
        let (forces, energy) = compute_forces(&points, &cell, &graph).unwrap();

        assert_relative_eq!(forces[0], Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(forces[1], Vector3::new(-2.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(energy, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_forces_use_minimum_image() {
        let points = vec![Point3::new(9.5, 1.0, 1.0), Point3::new(0.5, 1.0, 1.0)];
        let cell = Cell::orthorhombic(10.0, 10.0, 10.0).unwrap();
        let graph = Graph::from_edges(2, [(0, 1)]);
        let (forces, energy) = compute_forces(&points, &cell, &graph).unwrap();

        // The bond wraps through the boundary, so point 0 is pulled toward +x.
        assert_relative_eq!(forces[0].x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(energy, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_forces_sum_to_zero() {
        let points = vec![
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 1.5, 1.0),
            Point3::new(1.2, 2.1, 1.7),
        ];
        let cell = Cell::orthorhombic(5.0, 5.0, 5.0).unwrap();
        let graph = Graph::from_edges(3, [(0, 1), (1, 2), (0, 2)]);
        let (forces, energy) = compute_forces(&points, &cell, &graph).unwrap();

        let total: Vector3<f64> = forces.iter().sum();
        assert_relative_eq!(total, Vector3::zeros(), epsilon = 1e-12);
        assert!(energy >= 0.0);
    }

    #[test]
    fn test_zero_length_bond_rejected() {
        let points = vec![Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 1.0)];
        let cell = Cell::orthorhombic(5.0, 5.0, 5.0).unwrap();
        let graph = Graph::from_edges(2, [(0, 1)]);
        let result = compute_forces(&points, &cell, &graph);
        assert!(matches!(result, Err(TopologyError::DegenerateGeometry { .. })));
    }

    #[test]
    fn test_energy_non_increasing() {
        let (mut points, cell, graph) = two_body();
        let params = QuenchParams::default().with_max_steps(20);
        let report = quench(&mut points, &cell, &graph, &params, &PairSpacing, None).unwrap();

        assert_eq!(report.steps(), 20);
        assert!(!report.converged);
        for pair in report.energies.windows(2) {
            assert!(pair[1] <= pair[0], "energy rose: {} -> {}", pair[0], pair[1]);
        }
        // Each step scales the bond by (1 - 2 dt).
        assert_relative_eq!(report.first_shell[0], 2.0 * 0.98, epsilon = 1e-12);
        assert_relative_eq!(report.first_shell[19], 2.0 * 0.98_f64.powi(20), epsilon = 1e-9);
    }

    #[test]
    fn test_center_of_mass_fixed() {
        let (mut points, cell, graph) = two_body();
        quench(&mut points, &cell, &graph, &QuenchParams::default(), &PairSpacing, None).unwrap();
        let center = (points[0].coords + points[1].coords) / 2.0;
        assert_relative_eq!(center, Vector3::new(2.0, 1.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn test_energy_tolerance_stops_early() {
        let (mut points, cell, graph) = two_body();
        let params = QuenchParams::default()
            .with_dt(0.2)
            .with_max_steps(1000)
            .with_energy_tolerance(1e-6);
        let report = quench(&mut points, &cell, &graph, &params, &PairSpacing, None).unwrap();
        assert!(report.converged);
        assert!(report.steps() < 1000);
    }

    #[test]
    fn test_frames_written_each_step() {
        let (mut points, cell, graph) = two_body();
        let mut writer = YaplotWriter::new(Vec::new());
        let params = QuenchParams::default().with_max_steps(5);
        quench(&mut points, &cell, &graph, &params, &PairSpacing, Some(&mut writer)).unwrap();
        assert_eq!(writer.frame_count(), 5);
    }

    /// Returns a fixed spacing without looking at the points.
    struct FixedSpacing;

    impl PeakDistance for FixedSpacing {
        fn estimate(&self, _points: &[Point3<f64>], _cell: &Cell) -> TopologyResult<f64> {
            Ok(1.0)
        }
    }

    #[test]
    fn test_failed_run_restores_points() {
        // With dt = 0.5 the first step collapses the bond, so the second
        // step hits a zero-length bond.
        let (mut points, cell, graph) = two_body();
        let before = points.clone();
        let params = QuenchParams::default().with_dt(0.5).with_max_steps(3);

        let result = quench(&mut points, &cell, &graph, &params, &FixedSpacing, None);
        assert!(matches!(result, Err(TopologyError::DegenerateGeometry { .. })));
        assert_eq!(points, before);
    }

    #[test]
    fn test_invalid_time_step() {
        let (mut points, cell, graph) = two_body();
        let params = QuenchParams::default().with_dt(0.0);
        let result = quench(&mut points, &cell, &graph, &params, &PairSpacing, None);
        assert!(matches!(result, Err(TopologyError::InvalidInput { .. })));
    }
}
