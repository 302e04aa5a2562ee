//! Embeddable data references (`data:` URLs) and the logo file reader.
//!
//! A [`DataUrl`] carries a media type and the raw bytes it describes. Its textual form is
//! always `data:<mime>;base64,<payload>`, which an image decoder can consume without any
//! external fetch.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{Error, Result};

pub const SVG_MIME: &str = "image/svg+xml";
pub const PNG_MIME: &str = "image/png";

/// A self-contained, inline-encoded resource.
#[derive(Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime: String,
    bytes: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Wraps a serialized SVG document.
    ///
    /// The markup is transcoded to UTF-8 before the base64 step, so any Unicode text in the
    /// document survives the trip intact.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrlogo::data_url::DataUrl;
    ///
    /// let url = DataUrl::from_svg("<svg><title>héllo 🦀</title></svg>");
    /// let parsed: DataUrl = url.to_string().parse().unwrap();
    /// assert_eq!(parsed.text().unwrap(), "<svg><title>héllo 🦀</title></svg>");
    /// ```
    pub fn from_svg(svg: &str) -> Self {
        Self::new(SVG_MIME, svg.as_bytes().to_vec())
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn is_svg(&self) -> bool {
        self.mime.eq_ignore_ascii_case(SVG_MIME)
    }

    /// Interprets the payload as UTF-8 text.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.bytes).map_err(|e| Error::invalid_data_url(e.to_string()))
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

// Payloads can be megabytes; keep them out of debug output.
impl fmt::Debug for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataUrl")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl FromStr for DataUrl {
    type Err = Error;

    /// Parses `data:[<mime>][;param=value...];base64,<payload>`.
    ///
    /// Only base64 payloads are accepted, the form [`DataUrl`] itself prints. A missing
    /// media type defaults to `text/plain` as for any `data:` URL.
    fn from_str(s: &str) -> Result<Self> {
        let rest = s
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| Error::invalid_data_url("missing `data:` scheme"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::invalid_data_url("missing `,` separator"))?;

        let mut params = header.split(';');
        let mime = match params.next() {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => "text/plain".to_string(),
        };
        let base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

        if !base64 {
            return Err(Error::invalid_data_url("payload is not base64-encoded"));
        }
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact)
            .map_err(|e| Error::invalid_data_url(e.to_string()))?;

        Ok(Self { mime, bytes })
    }
}

/// Guesses the media type of an uploaded file from its contents, then its extension.
pub fn sniff_mime(path: &Path, bytes: &[u8]) -> Option<&'static str> {
    if let Ok(format) = image::guess_format(bytes) {
        return Some(format.to_mime_type());
    }

    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if ext == "svg" {
        return Some(SVG_MIME);
    }
    image::ImageFormat::from_extension(&ext).map(|f| f.to_mime_type())
}

/// Reads a user-selected file into an embeddable reference.
///
/// Only image media types are accepted, mirroring an `accept="image/*"` file picker.
///
/// # Errors
///
/// Returns [`Error::FileRead`] if the file cannot be read or is not an image.
pub async fn read_file(path: impl AsRef<Path>) -> Result<DataUrl> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::file_read(path, e.to_string()))?;

    let mime = sniff_mime(path, &bytes)
        .filter(|m| m.starts_with("image/"))
        .ok_or_else(|| Error::file_read(path, "not an image"))?;

    tracing::debug!(path = %path.display(), mime, len = bytes.len(), "read logo file");
    Ok(DataUrl::new(mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_base64_data_url() {
        let url = DataUrl::new(PNG_MIME, b"hello".to_vec());
        assert_eq!(url.to_string(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_svg_unicode_survives() {
        // Multi-byte and astral-plane characters must not be truncated.
        let svg = "<svg><title>日本語 𝄞 émoji 👍🏽</title></svg>";
        let encoded = DataUrl::from_svg(svg).to_string();
        assert!(encoded.starts_with("data:image/svg+xml;base64,"));
        assert!(encoded.is_ascii());

        let decoded: DataUrl = encoded.parse().unwrap();
        assert!(decoded.is_svg());
        assert_eq!(decoded.text().unwrap(), svg);
    }

    #[test]
    fn test_parse_rejects_non_base64_payloads() {
        assert!(matches!(
            "data:text/plain,%+1".parse::<DataUrl>(),
            Err(Error::InvalidDataUrl { .. })
        ));
        assert!(matches!(
            "data:image/svg+xml;charset=utf-8,%3Csvg%3E".parse::<DataUrl>(),
            Err(Error::InvalidDataUrl { .. })
        ));
    }

    #[test]
    fn test_parse_defaults_and_errors() {
        let url: DataUrl = "data:;base64,YWJj".parse().unwrap();
        assert_eq!(url.mime(), "text/plain");
        assert_eq!(url.bytes(), b"abc");

        let url: DataUrl = "data:image/svg+xml;charset=utf-8;base64,PHN2Zz4=".parse().unwrap();
        assert!(url.is_svg());
        assert_eq!(url.text().unwrap(), "<svg>");

        assert!("http://example.com/logo.png".parse::<DataUrl>().is_err());
        assert!("data:image/png;base64".parse::<DataUrl>().is_err());
        assert!("data:image/png;base64,!!!".parse::<DataUrl>().is_err());
    }

    #[test]
    fn test_debug_hides_payload() {
        let url = DataUrl::new(PNG_MIME, vec![0u8; 4096]);
        assert_eq!(format!("{url:?}"), "DataUrl { mime: \"image/png\", len: 4096 }");
    }

    #[tokio::test]
    async fn test_read_file_sniffs_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.bin");
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        img.save_with_format(&path, image::ImageFormat::Png).unwrap();

        let url = read_file(&path).await.unwrap();
        assert_eq!(url.mime(), PNG_MIME);
        assert!(!url.bytes().is_empty());
    }

    #[tokio::test]
    async fn test_read_file_accepts_svg_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.svg");
        std::fs::write(&path, "<svg xmlns=\"http://www.w3.org/2000/svg\"/>").unwrap();

        let url = read_file(&path).await.unwrap();
        assert!(url.is_svg());
    }

    #[tokio::test]
    async fn test_read_file_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "just text").unwrap();

        assert!(matches!(read_file(&path).await, Err(Error::FileRead { .. })));
        assert!(matches!(
            read_file(dir.path().join("missing.png")).await,
            Err(Error::FileRead { .. })
        ));
    }
}
