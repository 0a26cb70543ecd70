//! Heightmap tile rasterization from a vertex color buffer.

use image::{Rgba, RgbaImage};
use thiserror::Error;
use tracing::debug;

use super::surface::DrawSurface;
use crate::shading::Color;

/// Largest tile resolution (in segments) the exporter will rasterize.
pub const MAX_TILE_RESOLUTION: u32 = 256;

/// Background painted behind the tile.
pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 255, 255]);

/// Errors that can occur during heightmap export.
#[derive(Error, Debug)]
pub enum HeightmapExportError {
    #[error("No drawing surface available")]
    SurfaceUnavailable,
    #[error("Color buffer is empty")]
    EmptyColorBuffer,
    #[error("Invalid grid resolution: {0}")]
    InvalidResolution(u32),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Tile resolution for a grid: `min(grid_resolution, 256)`.
pub fn tile_resolution(grid_resolution: u32) -> u32 {
    grid_resolution.min(MAX_TILE_RESOLUTION)
}

/// Converts a `[0, 1]` channel to a byte, rounding and clamping. NaN maps to 0.
#[inline]
pub fn channel_to_byte(channel: f32) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Packs the first `min(colors.len(), limit)` colors into RGBA bytes.
///
/// Alpha is always 255. Order follows the color buffer (row-major vertex order).
pub fn pack_pixels(colors: &[Color], limit: usize) -> Vec<u8> {
    let pixels: Vec<[u8; 4]> = colors
        .iter()
        .take(limit)
        .map(|c| [channel_to_byte(c.r), channel_to_byte(c.g), channel_to_byte(c.b), 255])
        .collect();
    bytemuck::cast_slice(&pixels).to_vec()
}

/// A rasterized heightmap tile.
///
/// Grids finer than [`MAX_TILE_RESOLUTION`] are not resampled: the tile
/// holds the first `257 * 257` colors of the flat buffer as-is. Rows of
/// such grids therefore wrap inside the tile. This caps memory and time at
/// the cost of fidelity; area averaging would be the quality fix.
#[derive(Debug, Clone)]
pub struct HeightmapTile {
    /// Tile resolution in segments; the image is `resolution + 1` pixels square.
    pub resolution: u32,
    /// Display scale that stretches the tile to a 256-unit target.
    pub scaling_factor: f32,
    /// Packed RGBA bytes, exactly `4 * min(colors, side^2)` long.
    pub pixels: Vec<u8>,
    /// The pixels laid out as an image, padded with transparent black.
    pub image: RgbaImage,
}

impl HeightmapTile {
    /// Builds a tile from a vertex color buffer.
    pub fn from_colors(colors: &[Color], grid_resolution: u32) -> Result<Self, HeightmapExportError> {
        if colors.is_empty() {
            return Err(HeightmapExportError::EmptyColorBuffer);
        }
        if grid_resolution == 0 {
            return Err(HeightmapExportError::InvalidResolution(grid_resolution));
        }

        let resolution = tile_resolution(grid_resolution);
        let side = resolution + 1;
        let pixels = pack_pixels(colors, (side * side) as usize);

        let mut image = RgbaImage::new(side, side);
        let raw: &mut [u8] = &mut image;
        raw[..pixels.len()].copy_from_slice(&pixels);

        Ok(Self {
            resolution,
            scaling_factor: MAX_TILE_RESOLUTION as f32 / resolution as f32,
            pixels,
            image,
        })
    }

    /// Tile side length in pixels.
    pub fn side(&self) -> u32 {
        self.resolution + 1
    }
}

/// Rasterizes `colors` and draws the tile onto `surface`.
///
/// The surface is cleared to [`BACKGROUND`], scaled by the tile's scaling
/// factor, and the tile drawn at the origin.
///
/// # Returns
/// The tile that was drawn, or [`HeightmapExportError::SurfaceUnavailable`]
/// when there is no surface to draw on.
pub fn generate_map(
    colors: &[Color],
    grid_resolution: u32,
    surface: Option<&mut dyn DrawSurface>,
) -> Result<HeightmapTile, HeightmapExportError> {
    let surface = surface.ok_or(HeightmapExportError::SurfaceUnavailable)?;
    let tile = HeightmapTile::from_colors(colors, grid_resolution)?;

    surface.fill(BACKGROUND);
    surface.set_scale(tile.scaling_factor);
    surface.draw_image(&tile.image, 0, 0);

    debug!(
        resolution = tile.resolution,
        scaling_factor = tile.scaling_factor,
        bytes = tile.pixels.len(),
        "heightmap drawn"
    );
    Ok(tile)
}
