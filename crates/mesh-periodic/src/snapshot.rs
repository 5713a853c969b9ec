//! Frame output for relaxation runs.
//!
//! [`YaplotWriter`] renders each frame as one page of the yaplot text
//! format: cell edges on layer 1, points as circles, and every ring of up to
//! eight members as a polygon whose layer and color equal its size.

use std::io::Write;

use nalgebra::{Point3, Vector3};

use crate::bonds::BondGraph;
use crate::cell::Cell;
use crate::error::{TopologyError, TopologyResult};
use crate::rings::find_rings;

/// Largest ring drawn in a frame.
pub const FRAME_MAX_RING_SIZE: usize = 8;

/// Receives one frame per relaxation step.
pub trait FrameSink {
    fn write_frame(&mut self, points: &[Point3<f64>], cell: &Cell, graph: &BondGraph) -> TopologyResult<()>;
}

/// Writes frames as yaplot pages.
#[derive(Debug)]
pub struct YaplotWriter<W: Write> {
    writer: W,
    frames: usize,
}

impl<W: Write> YaplotWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, frames: 0 }
    }

    /// Number of frames written so far.
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for YaplotWriter<W> {
    fn write_frame(&mut self, points: &[Point3<f64>], cell: &Cell, graph: &BondGraph) -> TopologyResult<()> {
        let page = render_frame(points, cell, graph)?;
        self.writer.write_all(page.as_bytes())?;
        self.frames += 1;
        Ok(())
    }
}

/// Render one yaplot page.
pub fn render_frame(points: &[Point3<f64>], cell: &Cell, graph: &BondGraph) -> TopologyResult<String> {
    if graph.vertex_count() > points.len() {
        return Err(TopologyError::InvalidInput {
            details: format!(
                "graph has {} vertices but only {} points were given",
                graph.vertex_count(),
                points.len()
            ),
        });
    }

    let mut frame = String::new();

    frame.push_str("@ 7 128 255 128\n");
    frame.push_str("y 1\n");
    frame.push_str("@ 0\n");

    // Cell axes, centered on the origin.
    let center = (cell.lattice_vector(0) + cell.lattice_vector(1) + cell.lattice_vector(2)) / 2.0;
    for axis in 0..3 {
        let tip = cell.lattice_vector(axis) - center;
        frame.push_str(&format!(
            "l {} {} {} {} {} {}\n",
            tip.x, tip.y, tip.z, -center.x, -center.y, -center.z
        ));
    }

    frame.push_str("r 0.2\n");
    for p in points {
        frame.push_str(&format!("c {} {} {}\n", p.x, p.y, p.z));
    }

    for ring in find_rings(graph, FRAME_MAX_RING_SIZE) {
        let origin = points[ring[0] as usize];
        let offsets: Vec<_> = ring
            .iter()
            .map(|&v| cell.displacement(&points[v as usize], &origin))
            .collect();
        let centroid = origin + offsets.iter().sum::<Vector3<f64>>() / ring.len() as f64;
        // Shift so the ring's centroid sits in the home cell.
        let shift = cell.wrap_point(&centroid) - centroid;

        frame.push_str(&format!("y {}\n", ring.len()));
        frame.push_str(&format!("@ {}\n", ring.len()));
        frame.push_str(&format!("p {}", ring.len()));
        for offset in &offsets {
            let v = origin + *offset + shift;
            frame.push_str(&format!(" {} {} {}", v.x, v.y, v.z));
        }
        frame.push('\n');
    }

    // Blank line starts a new page.
    frame.push('\n');
    Ok(frame)
}
