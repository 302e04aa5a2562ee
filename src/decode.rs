//! Asynchronous image decoding.
//!
//! Both decoders run on tokio's blocking pool so the caller's task only suspends while the
//! bytes are parsed. They are independent: the export pipeline awaits one, then the other.

use std::sync::Arc;

use image::RgbaImage;
use resvg::{tiny_skia, usvg};

use crate::data_url::DataUrl;
use crate::error::{Error, Result};
use crate::surface;

/// A decoded vector image, ready to be drawn at any size.
pub struct DecodedSvg {
    tree: usvg::Tree,
}

impl DecodedSvg {
    /// Intrinsic size of the document, from its `width`/`height` attributes or viewBox.
    pub fn size(&self) -> (f32, f32) {
        let size = self.tree.size();
        (size.width(), size.height())
    }

    pub(crate) fn tree(&self) -> &usvg::Tree {
        &self.tree
    }
}

/// Decodes the encoded QR drawing.
///
/// # Errors
///
/// Any failure (malformed data URL, wrong media type, unparsable SVG) is reported as
/// [`Error::RenderDecode`].
pub async fn decode_code(source: String) -> Result<DecodedSvg> {
    tokio::task::spawn_blocking(move || {
        let url: DataUrl = source
            .parse()
            .map_err(|e: Error| Error::render_decode(e.to_string()))?;
        if !url.is_svg() {
            return Err(Error::render_decode(format!(
                "expected {}, got {}",
                crate::data_url::SVG_MIME,
                url.mime()
            )));
        }
        let tree = parse_svg(url.bytes()).map_err(Error::render_decode)?;
        Ok(DecodedSvg { tree })
    })
    .await
    .map_err(|e| Error::render_decode(e.to_string()))?
}

/// Decodes a logo into an RGBA bitmap.
///
/// Raster formats are decoded at their natural size. SVG logos are rasterized directly at
/// `side`×`side`, the size they will be drawn at.
///
/// # Errors
///
/// Any failure is reported as [`Error::LogoDecode`].
pub async fn decode_logo(logo: Arc<DataUrl>, side: u32) -> Result<RgbaImage> {
    tokio::task::spawn_blocking(move || {
        if logo.is_svg() {
            let tree = parse_svg(logo.bytes()).map_err(Error::logo_decode)?;
            let side = side.max(1);
            let mut pixmap = tiny_skia::Pixmap::new(side, side)
                .ok_or_else(|| Error::logo_decode(format!("cannot allocate {side}x{side} logo")))?;
            let size = tree.size();
            let transform = tiny_skia::Transform::from_scale(
                side as f32 / size.width(),
                side as f32 / size.height(),
            );
            resvg::render(&tree, transform, &mut pixmap.as_mut());
            Ok(surface::pixmap_to_rgba(&pixmap))
        } else {
            image::load_from_memory(logo.bytes())
                .map(|img| img.to_rgba8())
                .map_err(|e| Error::logo_decode(e.to_string()))
        }
    })
    .await
    .map_err(|e| Error::logo_decode(e.to_string()))?
}

fn parse_svg(bytes: &[u8]) -> std::result::Result<usvg::Tree, String> {
    let options = usvg::Options::default();
    usvg::Tree::from_data(bytes, &options).map_err(|e| e.to_string())
}
