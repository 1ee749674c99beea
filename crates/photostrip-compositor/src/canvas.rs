//! The strip drawing surface.
//!
//! Wraps a `tiny-skia` pixmap (via `resvg`'s re-export, so SVG text
//! overlays and bitmaps share one surface). Pixmaps store premultiplied
//! RGBA; conversion to and from the `image` crate's straight RGBA
//! happens at the edges.

use image::{ImageEncoder, RgbaImage};
use resvg::tiny_skia::{ColorU8, FilterQuality, IntSize, Pixmap, PixmapPaint, Transform};

use crate::layout::Slot;
use crate::text::TextRenderer;
use crate::types::StripError;

/// Canvas owned by a single composition call.
pub struct StripCanvas {
    pixmap: Pixmap,
}

impl StripCanvas {
    /// Allocate a `width` x `height` canvas filled with opaque white.
    ///
    /// # Errors
    ///
    /// Returns [`StripError::RenderTarget`] if the size is zero or too
    /// large to allocate.
    pub fn new(width: u32, height: u32) -> Result<Self, StripError> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            StripError::RenderTarget(format!("cannot allocate {width}x{height} canvas"))
        })?;
        pixmap.fill(resvg::tiny_skia::Color::WHITE);
        Ok(Self { pixmap })
    }

    /// Canvas width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Canvas height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Rasterise an SVG overlay onto the canvas.
    ///
    /// # Errors
    ///
    /// Returns [`StripError::RenderTarget`] if the overlay cannot be parsed.
    pub fn draw_overlay(&mut self, renderer: &TextRenderer, svg: &str) -> Result<(), StripError> {
        renderer
            .draw(svg, &mut self.pixmap)
            .map_err(|e| StripError::RenderTarget(format!("text overlay: {e}")))
    }

    /// Draw `image` stretched to exactly fill `slot`.
    ///
    /// X and Y are scaled independently, so the native aspect ratio is
    /// not preserved. Sampling is bilinear.
    ///
    /// # Errors
    ///
    /// Returns [`StripError::RenderTarget`] if the image has a zero
    /// dimension and cannot become a pixmap.
    #[allow(clippy::cast_precision_loss)]
    pub fn draw_stretched(&mut self, image: &RgbaImage, slot: Slot) -> Result<(), StripError> {
        let source = rgba_to_pixmap(image)?;

        let sx = slot.width / image.width() as f32;
        let sy = slot.height / image.height() as f32;
        let transform = Transform::from_row(sx, 0.0, 0.0, sy, slot.x, slot.y);

        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
        Ok(())
    }

    /// Convert the canvas to a straight-alpha `RgbaImage`.
    #[must_use]
    pub fn to_rgba_image(&self) -> RgbaImage {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let mut img = RgbaImage::new(width, height);
        for (dst, src) in img.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        img
    }

    /// Encode the canvas as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`StripError::Encode`] if PNG encoding fails.
    pub fn encode_png(&self) -> Result<Vec<u8>, StripError> {
        let img = self.to_rgba_image();
        let mut png_bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(
                img.as_raw(),
                img.width(),
                img.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(StripError::Encode)?;
        Ok(png_bytes)
    }
}

/// Premultiply a straight-alpha image into a pixmap.
fn rgba_to_pixmap(image: &RgbaImage) -> Result<Pixmap, StripError> {
    let size = IntSize::from_wh(image.width(), image.height()).ok_or_else(|| {
        StripError::RenderTarget(format!(
            "cannot draw {}x{} image",
            image.width(),
            image.height()
        ))
    })?;

    let mut data = Vec::with_capacity(image.as_raw().len());
    for p in image.pixels() {
        let [r, g, b, a] = p.0;
        let c = ColorU8::from_rgba(r, g, b, a).premultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    Pixmap::from_vec(data, size)
        .ok_or_else(|| StripError::RenderTarget("pixmap buffer size mismatch".into()))
}
