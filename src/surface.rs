//! The bitmap surface an export is assembled on.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia;

use crate::color::Color;
use crate::decode::DecodedSvg;
use crate::error::{Error, Result};

/// Largest side length a surface may have, in pixels.
pub const MAX_SIDE: u32 = 16_384;

/// An RGBA drawing surface, initially fully transparent.
#[derive(Debug, Clone)]
pub struct Surface {
    image: RgbaImage,
}

/// Placement of a logo in the middle of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoLayout {
    pub x: i64,
    pub y: i64,
    pub side: u32,
    pub padding: u32,
}

impl LogoLayout {
    /// Centers a square whose side is `ratio` of the surface width.
    ///
    /// Positions are computed in floating point and rounded to whole pixels.
    pub fn centered(width: u32, height: u32, ratio: f32, padding: u32) -> Self {
        let side = width as f32 * ratio;
        let x = (width as f32 - side) / 2.0;
        let y = (height as f32 - side) / 2.0;
        Self {
            x: x.round() as i64,
            y: y.round() as i64,
            side: (side.round() as u32).max(1),
            padding,
        }
    }

    /// The background-colored rectangle painted under the logo: `(x, y, side)`.
    pub fn padded(&self) -> (i64, i64, u32) {
        let pad = self.padding as i64;
        (self.x - pad, self.y - pad, self.side + 2 * self.padding)
    }
}

impl Surface {
    /// Creates a transparent surface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CanvasContextUnavailable`] for zero or oversized dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || width > MAX_SIDE || height > MAX_SIDE {
            return Err(Error::CanvasContextUnavailable { width, height });
        }
        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Draws a decoded SVG at (0, 0), scaled to fill the whole surface.
    pub fn draw_svg(&mut self, svg: &DecodedSvg) -> Result<()> {
        let (width, height) = self.image.dimensions();
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or(Error::CanvasContextUnavailable { width, height })?;

        let (svg_w, svg_h) = svg.size();
        let transform =
            tiny_skia::Transform::from_scale(width as f32 / svg_w, height as f32 / svg_h);
        resvg::render(svg.tree(), transform, &mut pixmap.as_mut());

        imageops::overlay(&mut self.image, &pixmap_to_rgba(&pixmap), 0, 0);
        Ok(())
    }

    /// Fills a rectangle with an opaque color. Parts outside the surface are clipped.
    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Color) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width as i64).min(self.image.width() as i64);
        let y1 = (y + height as i64).min(self.image.height() as i64);
        let pixel = color.to_rgba();
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px as u32, py as u32, pixel);
            }
        }
    }

    /// Draws `img` stretched to `width`×`height` at (x, y), alpha-blended over the surface.
    pub fn draw_image(&mut self, img: &RgbaImage, x: i64, y: i64, width: u32, height: u32) {
        if img.dimensions() == (width, height) {
            imageops::overlay(&mut self.image, img, x, y);
        } else {
            let scaled = imageops::resize(img, width, height, FilterType::Triangle);
            imageops::overlay(&mut self.image, &scaled, x, y);
        }
    }

    /// Paints the padding square in `background`, then the logo on top of it.
    pub fn composite_logo(&mut self, logo: &RgbaImage, layout: &LogoLayout, background: Color) {
        let (px, py, pside) = layout.padded();
        self.fill_rect(px, py, pside, pside, background);
        self.draw_image(logo, layout.x, layout.y, layout.side, layout.side);
    }

    /// Encodes the surface as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }
}

/// Converts a premultiplied tiny-skia pixmap into a straight-alpha RGBA image.
pub(crate) fn pixmap_to_rgba(pixmap: &tiny_skia::Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_url::DataUrl;
    use crate::decode::decode_code;

    const RED: Color = Color::new(255, 0, 0);

    #[test]
    fn test_new_rejects_bad_sizes() {
        assert!(matches!(
            Surface::new(0, 10),
            Err(Error::CanvasContextUnavailable { width: 0, height: 10 })
        ));
        assert!(Surface::new(MAX_SIDE + 1, 1).is_err());
        let surface = Surface::new(3, 2).unwrap();
        assert_eq!(surface.image().get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_layout_for_default_size() {
        let layout = LogoLayout::centered(256, 256, 0.20, 4);
        assert_eq!(layout, LogoLayout { x: 102, y: 102, side: 51, padding: 4 });
        assert_eq!(layout.padded(), (98, 98, 59));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.fill_rect(-2, -2, 4, 4, RED);
        assert_eq!(surface.image().get_pixel(0, 0), &RED.to_rgba());
        assert_eq!(surface.image().get_pixel(1, 1), &RED.to_rgba());
        assert_eq!(surface.image().get_pixel(2, 2), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_composite_logo_keeps_padding_color() {
        let mut surface = Surface::new(100, 100).unwrap();
        surface.fill_rect(0, 0, 100, 100, Color::BLACK);
        let logo = RgbaImage::from_pixel(20, 20, RED.to_rgba());
        let layout = LogoLayout::centered(100, 100, 0.20, 4);

        surface.composite_logo(&logo, &layout, Color::WHITE);

        let img = surface.image();
        assert_eq!(img.get_pixel(50, 50), &RED.to_rgba());
        assert_eq!(img.get_pixel(37, 37), &Color::WHITE.to_rgba());
        assert_eq!(img.get_pixel(35, 35), &Color::BLACK.to_rgba());
    }

    #[test]
    fn test_draw_image_stretches() {
        let mut surface = Surface::new(30, 30).unwrap();
        let logo = RgbaImage::from_pixel(3, 6, RED.to_rgba());
        surface.draw_image(&logo, 5, 5, 20, 20);

        let img = surface.image();
        let Rgba([r, g, b, a]) = *img.get_pixel(15, 15);
        assert!(r > 250 && g < 5 && b < 5 && a > 250);
        assert_eq!(img.get_pixel(2, 2), &Rgba([0, 0, 0, 0]));
        assert_eq!(img.get_pixel(27, 27), &Rgba([0, 0, 0, 0]));
    }

    #[tokio::test]
    async fn test_draw_svg_scales_to_fill() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2" viewBox="0 0 2 2" shape-rendering="crispEdges"><path fill="#ffffff" d="M0,0h2v2H0z"/><path fill="#000000" d="M0,0h1v1H0z"/></svg>"##;
        let decoded = decode_code(DataUrl::from_svg(svg).to_string()).await.unwrap();

        let mut surface = Surface::new(64, 64).unwrap();
        surface.draw_svg(&decoded).unwrap();

        let img = surface.image();
        assert_eq!(img.get_pixel(10, 10), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(50, 10), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(50, 50), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_encode_png_round_trip() {
        let mut surface = Surface::new(5, 3).unwrap();
        surface.fill_rect(0, 0, 5, 3, RED);
        let png = surface.encode_png().unwrap();
        let back = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(back.dimensions(), (5, 3));
        assert_eq!(back.get_pixel(4, 2), &RED.to_rgba());
    }
}
