//! QR code rendering into a scalable vector drawing.
//!
//! [`render`] encodes text with the requested error-correction level and returns a
//! [`VectorDrawing`] handle. The handle is what gets displayed and, later, exported: the
//! caller keeps it instead of looking the drawing up again.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::config::ExportConfig;
use crate::error::{Error, Result};

/// Width of the quiet zone drawn around the symbol when the margin is enabled, in modules.
pub const MARGIN_MODULES: usize = 4;

/// The error correction level in a QR Code symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcLevel {
    /// The QR Code can tolerate about 7% erroneous codewords.
    Low,
    /// The QR Code can tolerate about 15% erroneous codewords.
    Medium,
    /// The QR Code can tolerate about 25% erroneous codewords.
    Quartile,
    /// The QR Code can tolerate about 30% erroneous codewords.
    High,
}

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::Low => qrcode::EcLevel::L,
            EcLevel::Medium => qrcode::EcLevel::M,
            EcLevel::Quartile => qrcode::EcLevel::Q,
            EcLevel::High => qrcode::EcLevel::H,
        }
    }
}

/// Inputs of a single rendering besides the text itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Side length of the drawing in pixels.
    pub size: u32,
    pub foreground: Color,
    pub background: Color,
    pub level: EcLevel,
    pub include_margin: bool,
}

impl RenderOptions {
    pub fn new(config: &ExportConfig, foreground: Color, background: Color) -> Self {
        Self {
            size: config.size,
            foreground,
            background,
            level: config.error_correction,
            include_margin: config.include_margin,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(&ExportConfig::default(), Color::BLACK, Color::WHITE)
    }
}

/// A rendered QR code: the module matrix plus everything needed to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDrawing {
    text: String,
    /// Row-major, `width * width` entries, `true` for dark modules.
    modules: Vec<bool>,
    width: usize,
    margin: usize,
    size: u32,
    display: (u32, u32),
    foreground: Color,
    background: Color,
    level: EcLevel,
}

/// Renders `text` as a QR code drawing.
///
/// Returns `Ok(None)` for empty text: there is nothing to draw and a placeholder should be
/// shown instead.
///
/// # Errors
///
/// Returns [`Error::DataTooLong`] if the text does not fit in a version 40 symbol at the
/// requested level.
///
/// # Example
///
/// ```rust
/// use qrlogo::render::{render, RenderOptions};
///
/// let drawing = render("Hello, World!", &RenderOptions::default()).unwrap().unwrap();
/// assert!(drawing.serialize().contains("<svg"));
/// assert!(render("", &RenderOptions::default()).unwrap().is_none());
/// ```
pub fn render(text: &str, options: &RenderOptions) -> Result<Option<VectorDrawing>> {
    if text.is_empty() {
        return Ok(None);
    }

    let code = qrcode::QrCode::with_error_correction_level(text.as_bytes(), options.level.into())
        .map_err(|e| Error::DataTooLong {
            message: e.to_string(),
        })?;
    let width = code.width();
    let modules = code
        .to_colors()
        .into_iter()
        .map(|c| c == qrcode::Color::Dark)
        .collect();

    tracing::debug!(
        modules = width,
        level = ?options.level,
        chars = text.chars().count(),
        "rendered QR code"
    );

    Ok(Some(VectorDrawing {
        text: text.to_string(),
        modules,
        width,
        margin: if options.include_margin { MARGIN_MODULES } else { 0 },
        size: options.size,
        display: (options.size, options.size),
        foreground: options.foreground,
        background: options.background,
        level: options.level,
    }))
}

impl VectorDrawing {
    /// The encoded text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of modules per side of the symbol, without the quiet zone.
    pub fn module_count(&self) -> usize {
        self.width
    }

    /// Number of cells per side of the viewBox, quiet zone included.
    pub fn cell_count(&self) -> usize {
        self.width + 2 * self.margin
    }

    pub fn margin(&self) -> usize {
        self.margin
    }

    pub fn foreground(&self) -> Color {
        self.foreground
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn level(&self) -> EcLevel {
        self.level
    }

    /// Returns whether the module at (x, y) is dark. Coordinates outside the symbol,
    /// including the quiet zone, are light.
    pub fn is_dark(&self, x: i32, y: i32) -> bool {
        let w = self.width as i32;
        (0..w).contains(&x) && (0..w).contains(&y) && self.modules[(y * w + x) as usize]
    }

    /// Size the drawing currently occupies on screen, in pixels.
    pub fn display_size(&self) -> (u32, u32) {
        self.display
    }

    /// Records the size the drawing was laid out at. A zero dimension means the layout
    /// did not report one.
    pub fn with_display_size(mut self, width: u32, height: u32) -> Self {
        self.display = (width, height);
        self
    }

    /// Serializes the drawing to a standalone SVG document.
    ///
    /// The encoded text is echoed into the `<title>` node. Dark modules are merged into one
    /// path with a subpath per horizontal run. The string always uses Unix newlines.
    pub fn serialize(&self) -> String {
        let cells = self.cell_count();
        let mut result = String::new();
        result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
        result += &format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{0}\" height=\"{0}\" viewBox=\"0 0 {1} {1}\">\n",
            self.size, cells
        );
        result += &format!("\t<title>{}</title>\n", escape_xml(&self.text));
        result += &format!(
            "\t<path fill=\"{}\" d=\"M0,0h{1}v{1}H0z\" shape-rendering=\"crispEdges\"/>\n",
            self.background, cells
        );
        result += &format!("\t<path fill=\"{}\" d=\"", self.foreground);

        let mut first = true;
        for y in 0..self.width {
            let row = &self.modules[y * self.width..(y + 1) * self.width];
            let mut x = 0;
            while x < self.width {
                if !row[x] {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < self.width && row[x] {
                    x += 1;
                }
                if !first {
                    result += " ";
                }
                first = false;
                result += &format!(
                    "M{},{}h{}v1H{}z",
                    start + self.margin,
                    y + self.margin,
                    x - start,
                    start + self.margin
                );
            }
        }

        result += "\" shape-rendering=\"crispEdges\"/>\n";
        result += "</svg>\n";
        result
    }

    /// Draws the code with block characters for a terminal, with a 4-module border.
    pub fn to_ascii(&self) -> String {
        let border = MARGIN_MODULES as i32;
        let size = self.width as i32;
        let mut out = String::new();
        for y in -border..size + border {
            for x in -border..size + border {
                let c = if self.is_dark(x, y) { '█' } else { ' ' };
                out.push(c);
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}

/// Escapes text for an XML text node, dropping characters XML 1.0 cannot carry.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out += "&amp;",
            '<' => out += "&lt;",
            '>' => out += "&gt;",
            '"' => out += "&quot;",
            '\'' => out += "&apos;",
            '\t' | '\n' | '\r' => out.push(c),
            c if c < ' ' || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}
