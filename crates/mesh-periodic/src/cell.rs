//! Periodic cell and minimum-image metric.

use nalgebra::{Matrix3, Point3, Vector3};

use crate::error::{TopologyError, TopologyResult};

/// Determinants below this magnitude are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// A triclinic periodic unit cell.
///
/// The three lattice vectors are the *rows* of the cell matrix, so a
/// fractional row vector `f` maps to Cartesian coordinates as `f · M`.
/// The inverse is computed once on construction and reused by every
/// displacement query.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Lattice vectors as rows.
    matrix: Matrix3<f64>,

    /// Inverse of `matrix`.
    inverse: Matrix3<f64>,
}

impl Cell {
    /// Create a cell from a matrix whose rows are the lattice vectors.
    pub fn new(matrix: Matrix3<f64>) -> TopologyResult<Self> {
        let determinant = matrix.determinant();
        if !determinant.is_finite() || determinant.abs() < SINGULAR_EPSILON {
            return Err(TopologyError::SingularCell { determinant });
        }

        let inverse = matrix
            .try_inverse()
            .ok_or(TopologyError::SingularCell { determinant })?;

        Ok(Self { matrix, inverse })
    }

    /// Create a cell from three lattice vectors.
    pub fn from_vectors(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> TopologyResult<Self> {
        Self::new(Matrix3::from_rows(&[a.transpose(), b.transpose(), c.transpose()]))
    }

    /// Create a rectangular cell with the given edge lengths.
    pub fn orthorhombic(lx: f64, ly: f64, lz: f64) -> TopologyResult<Self> {
        Self::new(Matrix3::from_diagonal(&Vector3::new(lx, ly, lz)))
    }

    /// The cell matrix (lattice vectors as rows).
    #[inline]
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Lattice vector `axis` (0, 1 or 2).
    #[inline]
    pub fn lattice_vector(&self, axis: usize) -> Vector3<f64> {
        self.matrix.row(axis).transpose()
    }

    /// Cell volume.
    pub fn volume(&self) -> f64 {
        self.matrix.determinant().abs()
    }

    /// Distance between opposite faces of the cell, per axis.
    ///
    /// A neighbor search with cutoff `rc` can use `floor(width / rc)` bins
    /// along each axis.
    pub fn perpendicular_widths(&self) -> [f64; 3] {
        let a = self.lattice_vector(0);
        let b = self.lattice_vector(1);
        let c = self.lattice_vector(2);
        let volume = self.volume();
        [
            volume / b.cross(&c).norm(),
            volume / c.cross(&a).norm(),
            volume / a.cross(&b).norm(),
        ]
    }

    /// Convert a Cartesian vector to fractional coordinates.
    #[inline]
    pub fn to_fractional(&self, v: &Vector3<f64>) -> Vector3<f64> {
        // Row vector v · M⁻¹ written as a column product.
        self.inverse.tr_mul(v)
    }

    /// Convert a fractional vector to Cartesian coordinates.
    #[inline]
    pub fn to_cartesian(&self, f: &Vector3<f64>) -> Vector3<f64> {
        self.matrix.tr_mul(f)
    }

    /// Wrap a Cartesian displacement to its minimum image.
    ///
    /// Each fractional component of the result lies in [-0.5, 0.5).
    pub fn minimum_image(&self, d: Vector3<f64>) -> Vector3<f64> {
        let shift = self.to_fractional(&d).map(|f| (f + 0.5).floor());
        d - self.to_cartesian(&shift)
    }

    /// Minimum-image displacement `a - b`.
    #[inline]
    pub fn displacement(&self, a: &Point3<f64>, b: &Point3<f64>) -> Vector3<f64> {
        self.minimum_image(a - b)
    }

    /// Minimum-image distance between two points.
    #[inline]
    pub fn distance(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        self.displacement(a, b).norm()
    }

    /// Translate a point into the home cell (fractional coordinates in [0, 1)).
    pub fn wrap_point(&self, p: &Point3<f64>) -> Point3<f64> {
        let shift = self.to_fractional(&p.coords).map(f64::floor);
        p - self.to_cartesian(&shift)
    }
}
