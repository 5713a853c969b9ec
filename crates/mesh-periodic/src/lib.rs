//! Bond topology of point sets in a periodic cell.
//!
//! This crate derives the bond network of a near-tetrahedral packing of points
//! in a triclinic periodic cell and post-processes it:
//!
//! - **Bonds**: neighbor pairs within a cutoff, minus the longest edge of every tetrahedron
//! - **Repair**: split each 4-membered ring along its shorter diagonal
//! - **Dual**: one vertex per triangle, joined across shared bonds
//! - **Relaxation**: explicit Euler quench of the bond network as zero-length springs
//! - **Diagnostics**: ring histograms, validation reports, and yaplot frames
//!
//! # Example
//!
//! ```no_run
//! use mesh_periodic::{derive_topology, dualize, Cell, TopologyConfig};
//! use nalgebra::Point3;
//!
//! let cell = Cell::orthorhombic(10.0, 10.0, 10.0).unwrap();
//! let points: Vec<Point3<f64>> = load_points();
//!
//! // First shell, bonds and repair in one pass
//! let topology = derive_topology(&points, &cell, &TopologyConfig::default()).unwrap();
//! println!("{}", topology.report);
//!
//! // Triangle adjacency of the repaired network
//! let dual = dualize(&points, &cell, &topology.graph).unwrap();
//! println!("{} dual vertices", dual.vertex_count());
//! # fn load_points() -> Vec<Point3<f64>> { Vec::new() }
//! ```

mod error;

pub mod adjacency;
pub mod bonds;
pub mod cell;
pub mod config;
pub mod dual;
pub mod graph;
pub mod neighbors;
pub mod pipeline;
pub mod relax;
pub mod repair;
pub mod rings;
pub mod snapshot;
pub mod validate;

// Re-export core types at crate root
pub use cell::Cell;
pub use error::{TopologyError, TopologyResult};
pub use graph::Graph;

pub use adjacency::FaceAdjacency;

// Re-export commonly used functions
pub use bonds::{bond_graph_from_pairs, build_bond_graph, BondGraph, BondReport};
pub use config::{FirstShellParams, TopologyConfig};
pub use dual::{dualize, DualGraph};
pub use neighbors::{CellListPairs, NearestNeighborPeak, NeighborPair, PairFinder, PeakDistance};
pub use pipeline::{derive_topology, derive_topology_with, Topology};
pub use relax::{compute_forces, quench, QuenchParams, QuenchReport};
pub use repair::{repair_topology, RepairReport};
pub use rings::{find_rings, ring_histogram, RingHistogram};
pub use snapshot::{FrameSink, YaplotWriter};
pub use validate::{validate_topology, TopologyReport};
