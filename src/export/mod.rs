//! Heightmap export.
//!
//! Packs the vertex color buffer into an 8-bit RGBA tile capped at
//! 256 segments, draws it onto a [`DrawSurface`], and writes PNG files.

mod heightmap;
mod png;
mod surface;

pub use heightmap::{
    channel_to_byte, generate_map, pack_pixels, tile_resolution, HeightmapExportError, HeightmapTile, BACKGROUND,
    MAX_TILE_RESOLUTION,
};
pub use png::{export_heightmap_png, write_rgba_png, PngExportOptions};
pub use surface::{DrawSurface, RasterSurface, Viewport};
