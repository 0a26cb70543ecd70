//! PNG output for heightmap tiles and raster surfaces.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageEncoder, RgbaImage};

use super::heightmap::{HeightmapExportError, HeightmapTile};
use super::surface::RasterSurface;

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

/// Writes an RGBA image as an 8-bit PNG.
pub fn write_rgba_png(image: &RgbaImage, path: &Path, options: &PngExportOptions) -> Result<(), HeightmapExportError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);

    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;

    Ok(())
}

/// Exports the raw (unscaled) heightmap tile.
pub fn export_heightmap_png(tile: &HeightmapTile, path: &Path) -> Result<(), HeightmapExportError> {
    write_rgba_png(&tile.image, path, &PngExportOptions::default())
}

impl RasterSurface {
    /// Saves the surface contents, background and scaled tile included.
    pub fn save_png(&self, path: &Path) -> Result<(), HeightmapExportError> {
        write_rgba_png(self.canvas(), path, &PngExportOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{generate_map, Viewport};
    use crate::shading::Color;
    use tempfile::tempdir;

    #[test]
    fn test_export_tile_png() {
        let colors: Vec<Color> = (0..25).map(|i| Color::gray(i as f32 / 24.0)).collect();
        let tile = HeightmapTile::from_colors(&colors, 4).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("tile.png");
        export_heightmap_png(&tile, &path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (5, 5));
        assert_eq!(decoded.as_raw(), tile.image.as_raw());
    }

    #[test]
    fn test_save_surface_png() {
        let mut surface = RasterSurface::from_viewport(Viewport::new(64, 2, 1)).unwrap();
        let colors = vec![Color::gray(0.25); 9];
        generate_map(&colors, 2, Some(&mut surface)).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("surface.png");
        surface.save_png(&path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (128, 64));
    }

    #[test]
    fn test_unwritable_path() {
        let colors = vec![Color::gray(0.5); 4];
        let tile = HeightmapTile::from_colors(&colors, 1).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("tile.png");
        assert!(matches!(export_heightmap_png(&tile, &path), Err(HeightmapExportError::Io(_))));
    }
}
