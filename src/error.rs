//! Error types for rendering, decoding and exporting QR codes.

use std::path::PathBuf;

/// Top-level error type for qrlogo operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// There is no rendered drawing to export (the text is empty).
    #[error("QR code drawing not found, nothing to export")]
    MissingRenderTarget,

    /// A bitmap surface of the requested size could not be created.
    #[error("could not prepare a {width}x{height} drawing surface")]
    CanvasContextUnavailable { width: u32, height: u32 },

    /// The serialized QR drawing could not be decoded into an image.
    #[error("could not load QR code image: {message}")]
    RenderDecode { message: String },

    /// The logo could not be decoded. Exports continue without it.
    #[error("could not load logo: {message}")]
    LogoDecode { message: String },

    /// A logo file could not be read or is not an image.
    #[error("could not read {path}: {message}")]
    FileRead { path: PathBuf, message: String },

    /// The text does not fit in a QR symbol at the requested error-correction level.
    #[error("text cannot be encoded: {message}")]
    DataTooLong { message: String },

    #[error("invalid color value {value:?}, expected #rgb or #rrggbb")]
    InvalidColor { value: String },

    #[error("invalid data URL: {message}")]
    InvalidDataUrl { message: String },

    /// Another export is still running on the same exporter.
    #[error("an export is already in progress")]
    ExportInProgress,

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn render_decode(msg: impl Into<String>) -> Self {
        Self::RenderDecode {
            message: msg.into(),
        }
    }

    pub fn logo_decode(msg: impl Into<String>) -> Self {
        Self::LogoDecode {
            message: msg.into(),
        }
    }

    pub fn file_read(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::FileRead {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn invalid_data_url(msg: impl Into<String>) -> Self {
        Self::InvalidDataUrl {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error aborts the operation that raised it.
    ///
    /// Logo failures and overlapping exports are reported as warnings; everything
    /// else ends the export.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::LogoDecode { .. } | Self::ExportInProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logo_errors_are_not_fatal() {
        assert!(!Error::logo_decode("bad png").is_fatal());
        assert!(!Error::ExportInProgress.is_fatal());
        assert!(Error::MissingRenderTarget.is_fatal());
        assert!(Error::render_decode("bad svg").is_fatal());
    }

    #[test]
    fn test_messages() {
        let err = Error::CanvasContextUnavailable {
            width: 0,
            height: 12,
        };
        assert_eq!(err.to_string(), "could not prepare a 0x12 drawing surface");
        assert_eq!(
            Error::file_read("logo.txt", "not an image").to_string(),
            "could not read logo.txt: not an image"
        );
    }
}
