//! Edge-to-triangle adjacency of a triangulated bond graph.

use hashbrown::HashMap;

use crate::graph::edge_key;

/// Bonds of a triangle set, each mapped to the triangles it borders.
///
/// Triangle lists keep triangle-index order, so the first two entries of a
/// bond are the lowest-numbered triangles on it.
#[derive(Debug, Clone)]
pub struct FaceAdjacency {
    /// Canonical bond `(min, max)` → indices of the triangles containing it.
    pub edge_to_faces: HashMap<(u32, u32), Vec<u32>>,
}

impl FaceAdjacency {
    /// Index every bond of `triangles`.
    pub fn build(triangles: &[[u32; 3]]) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), Vec<u32>> = HashMap::new();

        for (t, &[i, j, k]) in triangles.iter().enumerate() {
            for (a, b) in [(i, j), (j, k), (i, k)] {
                edge_to_faces.entry(edge_key(a, b)).or_default().push(t as u32);
            }
        }

        Self { edge_to_faces }
    }

    /// Bonds shared by three or more triangles, in ascending order.
    pub fn non_manifold_edges(&self) -> Vec<(u32, u32)> {
        let mut edges: Vec<_> = self
            .edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() > 2)
            .map(|(&edge, _)| edge)
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Number of bonds that belong to a single triangle.
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_to_faces.values().filter(|faces| faces.len() == 1).count()
    }

    /// Triangles on bond `a–b`, if any.
    pub fn faces_for_edge(&self, a: u32, b: u32) -> Option<&[u32]> {
        self.edge_to_faces.get(&edge_key(a, b)).map(Vec::as_slice)
    }
}
