//! The application store: session state, the drawing derived from it, and the actions
//! that feed the export pipeline.

use std::path::Path;

use crate::config::ExportConfig;
use crate::data_url;
use crate::error::Result;
use crate::export::{DownloadSink, ExportReport, Exporter, Notifier};
use crate::render::{self, RenderOptions, VectorDrawing};
use crate::state::{Action, SessionState};

/// What the preview area shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preview<'a> {
    /// No text yet.
    Placeholder,
    Code(&'a VectorDrawing),
    /// The text could not be encoded.
    Unrenderable(&'a str),
}

/// Shown in the preview area while there is no text.
pub const PLACEHOLDER_TEXT: &str = "Enter text or URL to generate your QR code.";

/// Holds the current session and keeps the rendered drawing in sync with it.
pub struct App<N, S> {
    state: SessionState,
    drawing: Option<VectorDrawing>,
    render_error: Option<String>,
    exporter: Exporter<N, S>,
}

impl<N: Notifier, S: DownloadSink> App<N, S> {
    pub fn new(config: ExportConfig, notifier: N, sink: S) -> Self {
        Self {
            state: SessionState::default(),
            drawing: None,
            render_error: None,
            exporter: Exporter::new(config, notifier, sink),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn exporter(&self) -> &Exporter<N, S> {
        &self.exporter
    }

    /// The drawing handle for the current text and colors, if any.
    pub fn drawing(&self) -> Option<&VectorDrawing> {
        self.drawing.as_ref()
    }

    pub fn preview(&self) -> Preview<'_> {
        match (&self.drawing, &self.render_error) {
            (Some(drawing), _) => Preview::Code(drawing),
            (None, Some(err)) => Preview::Unrenderable(err),
            (None, None) => Preview::Placeholder,
        }
    }

    /// Applies an action and re-renders the drawing if the action changed it.
    pub fn dispatch(&mut self, action: Action) -> &SessionState {
        let rerender = action.affects_drawing();
        tracing::trace!(?action, "dispatch");
        self.state = std::mem::take(&mut self.state).apply(action);
        if rerender {
            self.rerender();
        }
        &self.state
    }

    fn rerender(&mut self) {
        let options = RenderOptions::new(
            self.exporter.config(),
            self.state.foreground,
            self.state.background,
        );
        match render::render(&self.state.text, &options) {
            Ok(drawing) => {
                self.drawing = drawing;
                self.render_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot render QR code");
                self.drawing = None;
                self.render_error = Some(e.to_string());
            }
        }
    }

    /// Reads a logo file and makes it the session logo.
    ///
    /// A file that cannot be read leaves the current logo in place; the failure is only
    /// logged.
    pub async fn upload_logo(&mut self, path: impl AsRef<Path>) -> bool {
        match data_url::read_file(path).await {
            Ok(logo) => {
                self.dispatch(Action::SetLogo(Some(logo)));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "logo upload ignored");
                false
            }
        }
    }

    /// Exports the current drawing.
    pub async fn export(&self) -> Result<ExportReport> {
        self.exporter
            .export_as_image(self.drawing.as_ref(), &self.state)
            .await
    }

    /// Exports, skipping the pipeline entirely when there is nothing to export.
    ///
    /// Mirrors a download button that is disabled while the text is empty.
    pub async fn export_if_ready(&self) -> Option<Result<ExportReport>> {
        if !self.state.has_code() {
            return None;
        }
        Some(self.export().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::error::Error;
    use crate::export::{LogoOutcome, MemorySink, NoticeLevel, RecordingNotifier};

    fn app() -> App<RecordingNotifier, MemorySink> {
        App::new(ExportConfig::default(), RecordingNotifier::new(), MemorySink::new())
    }

    fn write_png(path: &Path) {
        image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 128, 0, 255]))
            .save_with_format(path, image::ImageFormat::Png)
            .unwrap();
    }

    #[test]
    fn test_drawing_follows_text() {
        let mut app = app();
        assert_eq!(app.preview(), Preview::Placeholder);

        app.dispatch(Action::SetText("hello".into()));
        assert!(matches!(app.preview(), Preview::Code(d) if d.text() == "hello"));

        app.dispatch(Action::SetText(String::new()));
        assert_eq!(app.preview(), Preview::Placeholder);
        assert!(app.drawing().is_none());
    }

    #[test]
    fn test_colors_rerender() {
        let mut app = app();
        app.dispatch(Action::SetText("hello".into()));
        app.dispatch(Action::SetForeground(Color::new(1, 2, 3)));
        let drawing = app.drawing().unwrap();
        assert_eq!(drawing.foreground(), Color::new(1, 2, 3));
        assert_eq!(drawing.background(), Color::WHITE);
        assert_eq!(app.state().revision, 2);
    }

    #[test]
    fn test_unrenderable_text() {
        let mut app = app();
        app.dispatch(Action::SetText("x".repeat(3000)));
        assert!(matches!(app.preview(), Preview::Unrenderable(_)));

        app.dispatch(Action::SetText("ok".into()));
        assert!(matches!(app.preview(), Preview::Code(_)));
    }

    #[tokio::test]
    async fn test_export_without_text() {
        let app = app();
        assert!(app.export_if_ready().await.is_none());

        let err = app.export().await.unwrap_err();
        assert!(matches!(err, Error::MissingRenderTarget));
        assert_eq!(app.exporter().notifier().count(NoticeLevel::Alert), 1);
        assert!(app.exporter().sink().downloads().is_empty());
    }

    #[tokio::test]
    async fn test_upload_then_export() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        write_png(&logo);

        let mut app = app();
        app.dispatch(Action::SetText("https://example.com".into()));
        assert!(app.upload_logo(&logo).await);
        assert!(app.state().logo.is_some());

        let report = app.export_if_ready().await.unwrap().unwrap();
        assert_eq!(report.logo, LogoOutcome::Composited);
        assert_eq!(app.exporter().sink().downloads().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_previous_logo() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        write_png(&logo);
        let text = dir.path().join("readme.txt");
        std::fs::write(&text, "hello").unwrap();

        let mut app = app();
        assert!(app.upload_logo(&logo).await);
        let before = app.state().clone();

        assert!(!app.upload_logo(&text).await);
        assert!(!app.upload_logo(dir.path().join("missing.png")).await);
        assert_eq!(app.state(), &before);
        assert!(app.exporter().notifier().notices().is_empty());
    }
}
