//! The export pipeline: rendered drawing (plus optional logo) to a downloadable PNG.
//!
//! ```text
//! Idle → Locating → Serializing → DecodingCode → RasterizingNoLogo ─┐
//!                                             └→ CompositingLogo ───┴→ Finalized
//! ```
//!
//! `Locating` fails with [`Error::MissingRenderTarget`] and `DecodingCode` with
//! [`Error::RenderDecode`]; both end the export. A logo that fails to decode is reported as
//! a warning and the export falls back to the plain code.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::ExportConfig;
use crate::data_url::{DataUrl, PNG_MIME};
use crate::decode;
use crate::error::{Error, Result};
use crate::render::VectorDrawing;
use crate::state::SessionState;
use crate::surface::{LogoLayout, Surface};

/// Steps an export goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Idle,
    Locating,
    Serializing,
    DecodingCode,
    RasterizingNoLogo,
    CompositingLogo,
    Finalized,
}

/// What happened to the logo during an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoOutcome {
    /// The session had no logo.
    Absent,
    Composited,
    /// The logo failed to decode and was left out.
    Omitted { reason: String },
}

/// Summary of a finished export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub logo: LogoOutcome,
    /// Every stage entered, in order.
    pub stages: Vec<ExportStage>,
    /// Size of the encoded PNG in bytes.
    pub bytes: usize,
}

/// A transient download link: a file name and the encoded file behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    file_name: String,
    bytes: Vec<u8>,
}

impl DownloadLink {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The `data:image/png;base64,...` URL the link points at.
    pub fn href(&self) -> String {
        format!("data:{PNG_MIME};base64,{}", STANDARD.encode(&self.bytes))
    }
}

/// Receives finished downloads.
pub trait DownloadSink {
    fn deliver(&self, link: &DownloadLink) -> io::Result<()>;
}

/// Saves downloads into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, link: &DownloadLink) -> PathBuf {
        self.dir.join(link.file_name())
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, link: &DownloadLink) -> io::Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let path = self.path_for(link);
        fs::write(&path, link.bytes())?;
        tracing::info!(path = %path.display(), bytes = link.bytes().len(), "saved download");
        Ok(())
    }
}

/// Keeps downloads in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    downloads: Mutex<Vec<DownloadLink>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<DownloadLink> {
        self.downloads.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&self, link: &DownloadLink) -> io::Result<()> {
        self.downloads
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "download list poisoned"))?
            .push(link.clone());
        Ok(())
    }
}

/// Shows errors to the user.
///
/// `alert` is used for errors that end an export, `warn` for the ones it survives.
pub trait Notifier {
    fn alert(&self, error: &Error);
    fn warn(&self, error: &Error);
}

/// Prints notifications to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, error: &Error) {
        eprintln!("Error: {error}");
    }

    fn warn(&self, error: &Error) {
        eprintln!("Warning: {error}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Alert,
    Warning,
}

/// Records notifications instead of showing them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices().iter().filter(|(l, _)| *l == level).count()
    }

    fn record(&self, level: NoticeLevel, error: &Error) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push((level, error.to_string()));
        }
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, error: &Error) {
        self.record(NoticeLevel::Alert, error);
    }

    fn warn(&self, error: &Error) {
        self.record(NoticeLevel::Warning, error);
    }
}

/// Runs exports and reports their failures.
///
/// One exporter runs one export at a time: a call made while another is suspended is
/// rejected with [`Error::ExportInProgress`].
pub struct Exporter<N, S> {
    config: ExportConfig,
    notifier: N,
    sink: S,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when an export ends, however it ends.
pub(crate) struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<N: Notifier, S: DownloadSink> Exporter<N, S> {
    pub fn new(config: ExportConfig, notifier: N, sink: S) -> Self {
        Self {
            config,
            notifier,
            sink,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub(crate) fn try_begin(&self) -> Result<InFlight<'_>> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(Error::ExportInProgress);
        }
        Ok(InFlight(&self.in_flight))
    }

    /// Exports `target` as a PNG and hands it to the sink.
    ///
    /// `target` is the drawing handle returned by [`render`](crate::render::render);
    /// `state` supplies the background color and the logo. Errors are reported through
    /// the notifier before being returned.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingRenderTarget`] if there is no drawing.
    /// - [`Error::RenderDecode`] if the serialized drawing cannot be decoded.
    /// - [`Error::CanvasContextUnavailable`] if the surface cannot be allocated.
    /// - [`Error::ExportInProgress`] if another export is running.
    /// - [`Error::Io`] if the sink fails to store the file.
    pub async fn export_as_image(
        &self,
        target: Option<&VectorDrawing>,
        state: &SessionState,
    ) -> Result<ExportReport> {
        let _guard = match self.try_begin() {
            Ok(guard) => guard,
            Err(e) => {
                self.report(&e);
                return Err(e);
            }
        };

        let mut report = ExportReport {
            file_name: self.config.file_name.clone(),
            width: 0,
            height: 0,
            logo: LogoOutcome::Absent,
            stages: vec![ExportStage::Idle],
            bytes: 0,
        };

        match self.run(target, state, &mut report).await {
            Ok(()) => Ok(report),
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        target: Option<&VectorDrawing>,
        state: &SessionState,
        report: &mut ExportReport,
    ) -> Result<()> {
        let background = state.background;
        let logo = state.logo.clone();

        enter(report, ExportStage::Locating);
        let drawing = target.ok_or(Error::MissingRenderTarget)?;

        enter(report, ExportStage::Serializing);
        let source = DataUrl::from_svg(&drawing.serialize()).to_string();

        enter(report, ExportStage::DecodingCode);
        let decoded = decode::decode_code(source).await?;

        let (width, height) = self.surface_size(drawing);
        report.width = width;
        report.height = height;

        let mut surface = Surface::new(width, height)?;
        match logo {
            None => {
                enter(report, ExportStage::RasterizingNoLogo);
                surface.draw_svg(&decoded)?;
            }
            Some(logo) => {
                surface.draw_svg(&decoded)?;
                enter(report, ExportStage::CompositingLogo);

                let layout = LogoLayout::centered(
                    width,
                    height,
                    self.config.logo_ratio,
                    self.config.logo_padding,
                );
                match decode::decode_logo(logo, layout.side).await {
                    Ok(image) => {
                        surface.composite_logo(&image, &layout, background);
                        report.logo = LogoOutcome::Composited;
                    }
                    Err(e) => {
                        self.report(&e);
                        report.logo = LogoOutcome::Omitted {
                            reason: e.to_string(),
                        };
                        enter(report, ExportStage::RasterizingNoLogo);
                    }
                }
            }
        }

        let png = surface.encode_png()?;
        report.bytes = png.len();
        let link = DownloadLink::new(self.config.file_name.clone(), png);
        self.sink.deliver(&link)?;
        drop(link);

        enter(report, ExportStage::Finalized);
        tracing::info!(
            file = %report.file_name,
            width,
            height,
            bytes = report.bytes,
            logo = ?report.logo,
            "exported QR code"
        );
        Ok(())
    }

    /// Displayed size of the drawing, each zero dimension replaced by the fallback.
    fn surface_size(&self, drawing: &VectorDrawing) -> (u32, u32) {
        let (w, h) = drawing.display_size();
        let fallback = self.config.fallback_size;
        (
            if w == 0 { fallback } else { w },
            if h == 0 { fallback } else { h },
        )
    }

    fn report(&self, error: &Error) {
        if error.is_fatal() {
            tracing::error!(%error, "export failed");
            self.notifier.alert(error);
        } else {
            tracing::warn!(%error, "export degraded");
            self.notifier.warn(error);
        }
    }
}

fn enter(report: &mut ExportReport, stage: ExportStage) {
    tracing::debug!(?stage, "export stage");
    report.stages.push(stage);
}
