//! Elevation to color mapping and per-face color assignment.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::color::{Color, ANCHOR_MARKER, NEUTRAL_GRAY};
use crate::terrain::{Face, Grid};

/// One color per vertex, in vertex order.
pub type ColorBuffer = Vec<Color>;

/// Errors that can occur while assigning colors to faces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("Face {face} has {corners} corners (only triangles and quads are supported)")]
    UnsupportedFaceArity { face: usize, corners: usize },
    #[error("Face {face} references vertex {vertex}, but only {colors} colors exist")]
    CornerOutOfRange { face: usize, vertex: u32, colors: usize },
}

/// How elevation is turned into color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// No mode selected; every vertex gets [`NEUTRAL_GRAY`].
    #[default]
    Unset,
    /// Grayscale proportional to elevation.
    Clay,
    /// Hue band from orange (low) to red (high).
    Heatmap,
}

impl ColorMode {
    /// Reads a stored option value. Unknown values fall back to [`ColorMode::Unset`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => ColorMode::Unset,
            Some("clay") => ColorMode::Clay,
            Some("heatmap") => ColorMode::Heatmap,
            Some(other) => {
                warn!(mode = other, "unrecognized color mode, using neutral gray");
                ColorMode::Unset
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorMode::Unset => "unset",
            ColorMode::Clay => "clay",
            ColorMode::Heatmap => "heatmap",
        }
    }
}

/// Corner colors of one face, in corner order.
pub type FaceColors = Vec<Color>;

/// Per-vertex colors plus the per-face copies a renderer consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct Shading {
    pub colors: ColorBuffer,
    pub face_colors: Vec<FaceColors>,
}

/// Colors every vertex of `grid` by its elevation.
///
/// The elevation range is scanned fresh on every call. A flat grid maps
/// every fraction to 0. Vertex 0 is always painted [`ANCHOR_MARKER`] to
/// mark the grid origin in renders and exported maps.
pub fn color_vertices(grid: &Grid, mode: ColorMode) -> ColorBuffer {
    let range = grid.elevation_range();
    let z_range = range.range();
    let z_max = range.max;

    let fraction = |numerator: f32| -> f32 {
        if z_range > 0.0 {
            numerator / z_range
        } else {
            0.0
        }
    };

    let mut colors: ColorBuffer = grid
        .vertices
        .iter()
        .map(|vertex| match mode {
            ColorMode::Clay => Color::gray(fraction(0.7 * vertex.z)),
            ColorMode::Heatmap => Color::from_hsl(fraction(0.1 * (z_max - vertex.z)), 1.0, 0.5),
            ColorMode::Unset => NEUTRAL_GRAY,
        })
        .collect();

    if let Some(first) = colors.first_mut() {
        *first = ANCHOR_MARKER;
    }

    debug!(
        mode = mode.name(),
        vertices = colors.len(),
        z_min = range.min,
        z_max,
        "vertex colors computed"
    );
    colors
}

/// Copies vertex colors into per-face corner lists.
///
/// Fails on the first face that is not a triangle or quad, or that points
/// past the color buffer. No partial face list is returned on error.
pub fn assign_face_colors(faces: &[Face], colors: &[Color]) -> Result<Vec<FaceColors>, ColorError> {
    faces
        .iter()
        .enumerate()
        .map(|(face_index, face)| -> Result<FaceColors, ColorError> {
            let corners = face.arity();
            if corners != 3 && corners != 4 {
                return Err(ColorError::UnsupportedFaceArity {
                    face: face_index,
                    corners,
                });
            }

            face.corners
                .iter()
                .map(|&vertex| {
                    colors
                        .get(vertex as usize)
                        .copied()
                        .ok_or(ColorError::CornerOutOfRange {
                            face: face_index,
                            vertex,
                            colors: colors.len(),
                        })
                })
                .collect()
        })
        .collect()
}

/// Computes vertex colors and face colors in one go.
pub fn shade(grid: &Grid, mode: ColorMode) -> Result<Shading, ColorError> {
    let colors = color_vertices(grid, mode);
    let face_colors = assign_face_colors(&grid.faces, &colors)?;
    Ok(Shading { colors, face_colors })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_grid() -> Grid {
        let mut grid = Grid::plane(10.0, 10.0, 3, 3).unwrap();
        for (i, v) in grid.vertices.iter_mut().enumerate() {
            v.z = i as f32 - 4.0;
        }
        grid
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!(ColorMode::parse(Some("clay")), ColorMode::Clay);
        assert_eq!(ColorMode::parse(Some("heatmap")), ColorMode::Heatmap);
        assert_eq!(ColorMode::parse(Some("sepia")), ColorMode::Unset);
        assert_eq!(ColorMode::parse(Some("")), ColorMode::Unset);
        assert_eq!(ColorMode::parse(None), ColorMode::Unset);
    }

    #[test]
    fn test_clay_formula() {
        let grid = ramp_grid();
        let colors = color_vertices(&grid, ColorMode::Clay);
        // z in [-4, 11], range 15.
        let expected = 0.7 * (5.0 - 4.0) / 15.0;
        assert!((colors[5].r - expected).abs() < 1e-6);
        assert_eq!(colors[5].r, colors[5].g);
        assert_eq!(colors[5].g, colors[5].b);
    }

    #[test]
    fn test_clay_extremes() {
        let grid = ramp_grid();
        let colors = color_vertices(&grid, ColorMode::Clay);
        let (min_i, max_i) = (1, grid.vertex_count() - 1);
        for (i, c) in colors.iter().enumerate().skip(1) {
            assert!(c.r <= colors[max_i].r, "vertex {} brighter than zMax", i);
            assert!(c.r >= colors[min_i].r, "vertex {} darker than the lowest", i);
        }
    }

    #[test]
    fn test_heatmap_formula() {
        let grid = ramp_grid();
        let colors = color_vertices(&grid, ColorMode::Heatmap);
        // Highest vertex: hue 0 -> pure red.
        let top = colors[grid.vertex_count() - 1];
        assert!((top.r - 1.0).abs() < 1e-6 && top.g.abs() < 1e-6 && top.b.abs() < 1e-5);
        // Vertex 1 (z = -3): hue = 0.1 * 14 / 15.
        let expected = Color::from_hsl(0.1 * 14.0 / 15.0, 1.0, 0.5);
        assert_eq!(colors[1], expected);
    }

    #[test]
    fn test_flat_grid_has_no_nan() {
        let grid = Grid::plane(10.0, 10.0, 2, 2).unwrap();
        for mode in [ColorMode::Clay, ColorMode::Heatmap] {
            let colors = color_vertices(&grid, mode);
            assert!(colors.iter().all(|c| c.to_array().iter().all(|v| v.is_finite())));
        }
        let clay = color_vertices(&grid, ColorMode::Clay);
        assert_eq!(clay[1], Color::gray(0.0));
    }

    #[test]
    fn test_anchor_marker_always_set() {
        let grid = ramp_grid();
        for mode in [ColorMode::Unset, ColorMode::Clay, ColorMode::Heatmap] {
            assert_eq!(color_vertices(&grid, mode)[0], ANCHOR_MARKER);
        }
    }

    #[test]
    fn test_unset_mode_is_neutral_gray() {
        let colors = color_vertices(&ramp_grid(), ColorMode::Unset);
        assert!(colors.iter().skip(1).all(|&c| c == NEUTRAL_GRAY));
    }

    #[test]
    fn test_face_colors_follow_corners() {
        let grid = ramp_grid();
        let shading = shade(&grid, ColorMode::Clay).unwrap();
        assert_eq!(shading.face_colors.len(), grid.faces.len());
        for (face, corners) in grid.faces.iter().zip(&shading.face_colors) {
            assert_eq!(corners.len(), 3);
            for (&v, c) in face.corners.iter().zip(corners) {
                assert_eq!(*c, shading.colors[v as usize]);
            }
        }
    }

    #[test]
    fn test_quad_faces() {
        let colors = vec![Color::gray(0.1), Color::gray(0.2), Color::gray(0.3), Color::gray(0.4)];
        let faces = vec![Face::quad(3, 2, 1, 0)];
        let out = assign_face_colors(&faces, &colors).unwrap();
        assert_eq!(out[0], vec![colors[3], colors[2], colors[1], colors[0]]);
    }

    #[test]
    fn test_unsupported_arity() {
        let colors = vec![Color::gray(0.0); 5];
        let faces = vec![Face::tri(0, 1, 2), Face { corners: vec![0, 1, 2, 3, 4] }];
        assert_eq!(
            assign_face_colors(&faces, &colors),
            Err(ColorError::UnsupportedFaceArity { face: 1, corners: 5 })
        );
    }

    #[test]
    fn test_corner_out_of_range() {
        let colors = vec![Color::gray(0.0); 3];
        let faces = vec![Face::tri(0, 1, 7)];
        assert!(matches!(
            assign_face_colors(&faces, &colors),
            Err(ColorError::CornerOutOfRange { vertex: 7, .. })
        ));
    }
}
