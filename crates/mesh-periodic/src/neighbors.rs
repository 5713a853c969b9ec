//! Neighbor search and first-shell distance estimation.
//!
//! Both are collaborators of the topology engine and are reached through
//! the [`PairFinder`] and [`PeakDistance`] traits. The default
//! implementations here work for any triclinic cell.

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::debug;

use crate::cell::Cell;
use crate::error::{TopologyError, TopologyResult};

/// A pair of point indices with their minimum-image distance.
///
/// The index order is not canonical; consumers must accept `(i, j)` and `(j, i)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborPair {
    pub i: u32,
    pub j: u32,
    pub distance: f64,
}

/// Finds all pairs of points within a cutoff under periodic wrap.
pub trait PairFinder {
    /// Every pair of distinct points closer than `cutoff` must appear at least once.
    fn pairs(&self, points: &[Point3<f64>], cell: &Cell, cutoff: f64) -> TopologyResult<Vec<NeighborPair>>;
}

/// Estimates the characteristic first-neighbor spacing of a point set.
pub trait PeakDistance {
    /// Typical first-neighbor distance of `points` under the cell's wrap.
    fn estimate(&self, points: &[Point3<f64>], cell: &Cell) -> TopologyResult<f64>;
}

/// Periodic cell-list neighbor search.
///
/// Points are binned by fractional coordinate; each bin is compared with
/// its 26 periodic neighbors. When the cell is too thin for three bins along
/// some axis, every pair is checked directly under the minimum-image
/// convention. In both cases the cutoff is assumed to be below half the
/// smallest perpendicular width of the cell, so each pair has one image in range.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellListPairs;

impl CellListPairs {
    fn all_pairs(points: &[Point3<f64>], cell: &Cell, cutoff: f64) -> Vec<NeighborPair> {
        let mut pairs = Vec::new();
        for i in 0..points.len() {
            for j in i + 1..points.len() {
                let distance = cell.distance(&points[i], &points[j]);
                if distance <= cutoff {
                    pairs.push(NeighborPair {
                        i: i as u32,
                        j: j as u32,
                        distance,
                    });
                }
            }
        }
        pairs
    }

    fn binned_pairs(points: &[Point3<f64>], cell: &Cell, cutoff: f64, bins: [i64; 3]) -> Vec<NeighborPair> {
        let mut grid: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
        for (idx, p) in points.iter().enumerate() {
            let f = cell.to_fractional(&cell.wrap_point(p).coords);
            let key = (
                bin_index(f.x, bins[0]),
                bin_index(f.y, bins[1]),
                bin_index(f.z, bins[2]),
            );
            grid.entry(key).or_default().push(idx as u32);
        }

        let mut pairs = Vec::new();
        for (&(bx, by, bz), members) in &grid {
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let neighbor = (
                            (bx + dx).rem_euclid(bins[0]),
                            (by + dy).rem_euclid(bins[1]),
                            (bz + dz).rem_euclid(bins[2]),
                        );
                        let Some(candidates) = grid.get(&neighbor) else {
                            continue;
                        };
                        for &i in members {
                            for &j in candidates {
                                // Each unordered pair is seen from both bins; keep one.
                                if j <= i {
                                    continue;
                                }
                                let distance = cell.distance(&points[i as usize], &points[j as usize]);
                                if distance <= cutoff {
                                    pairs.push(NeighborPair { i, j, distance });
                                }
                            }
                        }
                    }
                }
            }
        }
        pairs
    }
}

/// Bin index for fractional coordinate `f` in [0, 1).
fn bin_index(f: f64, bins: i64) -> i64 {
    ((f * bins as f64).floor() as i64).clamp(0, bins - 1)
}

impl PairFinder for CellListPairs {
    fn pairs(&self, points: &[Point3<f64>], cell: &Cell, cutoff: f64) -> TopologyResult<Vec<NeighborPair>> {
        if !(cutoff > 0.0 && cutoff.is_finite()) {
            return Err(TopologyError::InvalidInput {
                details: format!("cutoff must be positive and finite, got {}", cutoff),
            });
        }
        if let Some(idx) = points.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(TopologyError::DegenerateGeometry {
                details: format!("point {} has non-finite coordinates", idx),
            });
        }

        let widths = cell.perpendicular_widths();
        let bins = widths.map(|w| (w / cutoff).floor() as i64);

        let mut pairs = if bins.iter().all(|&n| n >= 3) {
            Self::binned_pairs(points, cell, cutoff, bins)
        } else {
            Self::all_pairs(points, cell, cutoff)
        };
        pairs.sort_by_key(|p| (p.i, p.j));

        debug!(
            "Found {} pairs within {:.4} among {} points (bins {:?})",
            pairs.len(),
            cutoff,
            points.len(),
            bins
        );
        Ok(pairs)
    }
}

/// First-shell estimator: the mode of the nearest-neighbor distance distribution.
///
/// Nearest neighbors are searched within `search_scale` times the mean
/// interparticle spacing `(V / N)^(1/3)`. The distances are histogrammed into
/// `bins` bins between zero and the largest one; the center of the fullest
/// bin is returned.
#[derive(Debug, Clone)]
pub struct NearestNeighborPeak<F = CellListPairs> {
    /// Neighbor search used to collect candidate distances.
    pub finder: F,

    /// Number of histogram bins.
    pub bins: usize,

    /// Search radius as a multiple of `(V / N)^(1/3)`.
    pub search_scale: f64,
}

impl Default for NearestNeighborPeak {
    fn default() -> Self {
        Self {
            finder: CellListPairs,
            bins: 64,
            search_scale: 2.0,
        }
    }
}

impl NearestNeighborPeak {
    /// Estimator with a custom bin count and search scale.
    pub fn new(bins: usize, search_scale: f64) -> Self {
        Self {
            bins,
            search_scale,
            ..Default::default()
        }
    }
}

impl<F: PairFinder> PeakDistance for NearestNeighborPeak<F> {
    fn estimate(&self, points: &[Point3<f64>], cell: &Cell) -> TopologyResult<f64> {
        if points.len() < 2 {
            return Err(TopologyError::InvalidInput {
                details: format!("need at least 2 points to estimate spacing, got {}", points.len()),
            });
        }
        if self.bins == 0 {
            return Err(TopologyError::InvalidInput {
                details: "first-shell histogram needs at least one bin".to_string(),
            });
        }

        let spacing = (cell.volume() / points.len() as f64).cbrt();
        let cutoff = spacing * self.search_scale;
        let pairs = self.finder.pairs(points, cell, cutoff)?;

        let mut nearest = vec![f64::INFINITY; points.len()];
        for pair in &pairs {
            let (i, j) = (pair.i as usize, pair.j as usize);
            nearest[i] = nearest[i].min(pair.distance);
            nearest[j] = nearest[j].min(pair.distance);
        }
        let nearest: Vec<f64> = nearest.into_iter().filter(|d| d.is_finite()).collect();

        let longest = nearest.iter().copied().fold(0.0, f64::max);
        if nearest.is_empty() || longest <= 0.0 {
            return Err(TopologyError::NoNeighbors { cutoff });
        }

        let width = longest / self.bins as f64;
        let mut counts = vec![0usize; self.bins];
        for d in &nearest {
            let bin = ((d / width) as usize).min(self.bins - 1);
            counts[bin] += 1;
        }

        // First bin wins ties.
        let mut peak = 0;
        for (bin, &count) in counts.iter().enumerate() {
            if count > counts[peak] {
                peak = bin;
            }
        }
        Ok((peak as f64 + 0.5) * width)
    }
}
