//! Error types for periodic topology operations.

use thiserror::Error;

/// Result type alias for topology operations.
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Errors that can occur while deriving, repairing or relaxing a periodic topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// A ring that is neither a triangle nor a quadrilateral was found during repair.
    ///
    /// The input is expected to be a near-tetrahedral packing; anything else
    /// means the bond graph is malformed and cannot be triangulated in one pass.
    #[error("malformed topology: found a {length}-membered ring {ring:?}, expected 3 or 4")]
    MalformedTopology { length: usize, ring: Vec<u32> },

    /// The cell matrix cannot be inverted.
    #[error("cell matrix is singular (determinant = {determinant:e})")]
    SingularCell { determinant: f64 },

    /// Geometry that would produce NaN or infinite values.
    #[error("degenerate geometry: {details}")]
    DegenerateGeometry { details: String },

    /// Caller supplied parameters or indices outside the valid range.
    #[error("invalid input: {details}")]
    InvalidInput { details: String },

    /// The peak-distance estimator found no pair of points within its search radius.
    #[error("no neighbor pairs within {cutoff:.4}")]
    NoNeighbors { cutoff: f64 },

    /// Configuration could not be parsed or serialized.
    #[error("configuration error: {details}")]
    Config { details: String },

    /// Error writing a visualization frame.
    #[error("failed to write frame: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
