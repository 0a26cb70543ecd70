//! Grid data structure: a subdivided plane of vertices and faces.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building a grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Grid needs at least one segment per axis, got {0}x{1}")]
    NoSegments(u32, u32),
    #[error("Invalid plane size: {0}x{1} (must be finite and positive)")]
    InvalidSize(f32, f32),
    #[error("Vertex count {actual} does not match a {width_segments}x{height_segments} grid (expected {expected})")]
    VertexCountMismatch {
        width_segments: u32,
        height_segments: u32,
        expected: usize,
        actual: usize,
    },
}

/// A polygon of the grid, referencing vertices by index.
///
/// Faces built by [`Grid::plane`] are triangles. Host-supplied faces may be
/// quads; other corner counts are representable so they can be reported
/// rather than silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub corners: Vec<u32>,
}

impl Face {
    pub fn tri(a: u32, b: u32, c: u32) -> Self {
        Self { corners: vec![a, b, c] }
    }

    pub fn quad(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self { corners: vec![a, b, c, d] }
    }

    /// Number of corners.
    pub fn arity(&self) -> usize {
        self.corners.len()
    }

    /// Splits the face into triangles: quads as `(a, b, d)` and `(b, c, d)`.
    ///
    /// Returns an empty list for any other arity.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        match self.corners.as_slice() {
            &[a, b, c] => vec![[a, b, c]],
            &[a, b, c, d] => vec![[a, b, d], [b, c, d]],
            _ => Vec::new(),
        }
    }
}

/// Scalar min/max of vertex elevation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationRange {
    pub min: f32,
    pub max: f32,
}

impl ElevationRange {
    /// `max - min`; zero for a perfectly flat grid.
    pub fn range(&self) -> f32 {
        (self.max - self.min).max(0.0)
    }

    pub fn is_flat(&self) -> bool {
        self.range() == 0.0
    }
}

/// A (width_segments + 1) x (height_segments + 1) grid of vertices in row-major order.
///
/// `x` and `y` are fixed at construction; only `z` (elevation) is mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    /// Subdivisions along x.
    pub width_segments: u32,
    /// Subdivisions along y.
    pub height_segments: u32,
    /// Planar extent in world units.
    pub size: Vec2,
    /// Vertex positions.
    pub vertices: Vec<Vec3>,
    /// Faces referencing `vertices`.
    pub faces: Vec<Face>,
    /// Per-vertex normals, kept in sync by [`Grid::compute_vertex_normals`].
    pub normals: Vec<Vec3>,
}

impl Grid {
    /// Builds a flat plane centred on the origin.
    ///
    /// Rows run from `y = +height/2` down to `-height/2`, columns from
    /// `x = -width/2` to `+width/2`. Each cell is split into two triangles.
    ///
    /// # Arguments
    /// * `width`, `height` - Plane extent in world units
    /// * `width_segments`, `height_segments` - Subdivisions per axis
    pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Result<Self, GridError> {
        if width_segments == 0 || height_segments == 0 {
            return Err(GridError::NoSegments(width_segments, height_segments));
        }
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(GridError::InvalidSize(width, height));
        }

        let cols = width_segments + 1;
        let rows = height_segments + 1;
        let seg_w = width / width_segments as f32;
        let seg_h = height / height_segments as f32;
        let half_w = width / 2.0;
        let half_h = height / 2.0;

        let mut vertices = Vec::with_capacity((cols * rows) as usize);
        for iy in 0..rows {
            let y = iy as f32 * seg_h - half_h;
            for ix in 0..cols {
                let x = ix as f32 * seg_w - half_w;
                vertices.push(Vec3::new(x, -y, 0.0));
            }
        }

        let mut faces = Vec::with_capacity((width_segments * height_segments * 2) as usize);
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = ix + cols * iy;
                let b = ix + cols * (iy + 1);
                let c = (ix + 1) + cols * (iy + 1);
                let d = (ix + 1) + cols * iy;
                faces.push(Face::tri(a, b, d));
                faces.push(Face::tri(b, c, d));
            }
        }

        let mut grid = Self {
            width_segments,
            height_segments,
            size: Vec2::new(width, height),
            normals: vec![Vec3::Z; vertices.len()],
            vertices,
            faces,
        };
        grid.compute_vertex_normals();
        Ok(grid)
    }

    /// Wraps host-supplied vertices and faces.
    pub fn from_parts(
        width_segments: u32,
        height_segments: u32,
        size: Vec2,
        vertices: Vec<Vec3>,
        faces: Vec<Face>,
    ) -> Result<Self, GridError> {
        if width_segments == 0 || height_segments == 0 {
            return Err(GridError::NoSegments(width_segments, height_segments));
        }
        let expected = (width_segments as usize + 1) * (height_segments as usize + 1);
        if vertices.len() != expected {
            return Err(GridError::VertexCountMismatch {
                width_segments,
                height_segments,
                expected,
                actual: vertices.len(),
            });
        }

        let mut grid = Self {
            width_segments,
            height_segments,
            size,
            normals: vec![Vec3::Z; vertices.len()],
            vertices,
            faces,
        };
        grid.compute_vertex_normals();
        Ok(grid)
    }

    /// Grid resolution as understood by erosion and export (segments along x).
    pub fn resolution(&self) -> u32 {
        self.width_segments
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles, counting quads as two.
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|f| f.triangles().len()).sum()
    }

    /// Vertex spacing along x in world units.
    pub fn cell_size(&self) -> f32 {
        self.size.x / self.width_segments as f32
    }

    /// Largest `|x|` or `|y|` over all vertices; 0 for an empty grid.
    pub fn planar_extent(&self) -> f64 {
        self.vertices
            .iter()
            .map(|v| v.x.abs().max(v.y.abs()) as f64)
            .fold(0.0, f64::max)
    }

    /// Copies elevation out into a flat row-major buffer.
    pub fn heights(&self) -> Vec<f32> {
        self.vertices.iter().map(|v| v.z).collect()
    }

    /// Writes a flat row-major elevation buffer back into the vertices.
    ///
    /// Extra values are ignored; missing values leave vertices untouched.
    pub fn set_heights(&mut self, heights: &[f32]) {
        for (vertex, &z) in self.vertices.iter_mut().zip(heights) {
            vertex.z = z;
        }
    }

    /// Flattens the grid: every `z` becomes exactly 0, then normals are rebuilt.
    pub fn reset(&mut self) {
        for vertex in &mut self.vertices {
            vertex.z = 0.0;
        }
        self.compute_vertex_normals();
    }

    /// Recomputes per-vertex normals from the current faces.
    ///
    /// Face normals are area weighted and summed into each corner. Faces
    /// that are neither triangles nor quads, or that reference missing
    /// vertices, contribute nothing.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for face in &self.faces {
            for [a, b, c] in face.triangles() {
                let (a, b, c) = (a as usize, b as usize, c as usize);
                let (Some(&pa), Some(&pb), Some(&pc)) =
                    (self.vertices.get(a), self.vertices.get(b), self.vertices.get(c))
                else {
                    continue;
                };
                let n = (pc - pb).cross(pa - pb);
                normals[a] += n;
                normals[b] += n;
                normals[c] += n;
            }
        }

        for n in &mut normals {
            *n = n.try_normalize().unwrap_or(Vec3::Z);
        }
        self.normals = normals;
    }

    /// Scans all vertices for the elevation min/max.
    ///
    /// An empty grid reports `0..0`.
    pub fn elevation_range(&self) -> ElevationRange {
        if self.vertices.is_empty() {
            return ElevationRange { min: 0.0, max: 0.0 };
        }

        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for vertex in &self.vertices {
            min = min.min(vertex.z);
            max = max.max(vertex.z);
        }
        ElevationRange { min, max }
    }
}
