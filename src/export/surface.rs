//! Drawing surfaces the heightmap tile is rasterized onto.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// A 2D target with fill, scale transform, and image draw.
pub trait DrawSurface {
    /// Surface size in pixels as `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Clears the whole surface to `color`.
    fn fill(&mut self, color: Rgba<u8>);

    /// Sets the scale transform applied to subsequent draws.
    fn set_scale(&mut self, factor: f32);

    /// Draws `image` with its top-left corner at `(x, y)` in unscaled units.
    fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64);
}

/// Host viewport the output surface is sized from.
///
/// The surface keeps `height` and takes the viewport's aspect ratio for its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub height: u32,
    pub client_width: u32,
    pub client_height: u32,
}

impl Viewport {
    pub fn new(height: u32, client_width: u32, client_height: u32) -> Self {
        Self {
            height,
            client_width,
            client_height,
        }
    }

    /// A square viewport of `side` pixels.
    pub fn square(side: u32) -> Self {
        Self::new(side, side, side)
    }

    /// Surface width: `height * client_width / client_height`.
    ///
    /// `None` when `client_height` is zero or the width does not fit a `u32`.
    pub fn width(&self) -> Option<u32> {
        if self.client_height == 0 {
            return None;
        }
        u32::try_from(self.height as u64 * self.client_width as u64 / self.client_height as u64).ok()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::square(256)
    }
}

/// An in-memory RGBA surface.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    canvas: RgbaImage,
    scale: f32,
}

impl RasterSurface {
    /// Creates a surface sized from `viewport`.
    ///
    /// Returns `None` when the viewport has no area or its width overflows.
    pub fn from_viewport(viewport: Viewport) -> Option<Self> {
        let width = viewport.width()?;
        let height = viewport.height;
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            canvas: RgbaImage::new(width, height),
            scale: 1.0,
        })
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

impl DrawSurface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = color;
        }
    }

    fn set_scale(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.scale = factor;
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64) {
        let scale = self.scale;
        let dx = (x as f32 * scale).round() as i64;
        let dy = (y as f32 * scale).round() as i64;

        if scale == 1.0 {
            imageops::overlay(&mut self.canvas, image, dx, dy);
            return;
        }

        let (w, h) = image.dimensions();
        let sw = ((w as f32 * scale).round() as u32).max(1);
        let sh = ((h as f32 * scale).round() as u32).max(1);
        let scaled = imageops::resize(image, sw, sh, FilterType::Nearest);
        imageops::overlay(&mut self.canvas, &scaled, dx, dy);
    }
}
