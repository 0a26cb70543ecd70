//! Elevation shading.
//!
//! Maps finished elevations to per-vertex colors under a selectable mode
//! and fans them out to per-face corner colors for rendering.

mod color;
mod mapper;

pub use color::{Color, ANCHOR_MARKER, NEUTRAL_GRAY};
pub use mapper::{
    assign_face_colors, color_vertices, shade, ColorBuffer, ColorError, ColorMode, FaceColors, Shading,
};
