//! # qrlogo
//!
//! A Rust library for rendering QR codes with custom colors and an optional centered logo,
//! and exporting them as PNG images.
//!
//! `qrlogo` keeps the user's choices (text, colors, logo) in an immutable session state,
//! renders the QR code as a scalable vector drawing, and turns that drawing into a single
//! flattened PNG on demand. A logo that cannot be decoded never blocks the export: the code
//! is saved without it and a warning is reported.
//!
//! ## Features
//!
//! - Render any Unicode text as a QR code at one of four error-correction levels.
//! - Serialize drawings to standalone SVG documents and `data:` URLs.
//! - Composite PNG, JPEG, GIF, WebP, BMP, ICO or SVG logos with a background-colored pad.
//! - Export to `qr-code.png` through a pluggable download sink.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrlogo = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Export a QR code with a logo into the `output` directory:
//!
//! ```rust,no_run
//! use qrlogo::app::App;
//! use qrlogo::config::ExportConfig;
//! use qrlogo::export::{DirectorySink, StderrNotifier};
//! use qrlogo::state::Action;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut app = App::new(
//!         ExportConfig::default(),
//!         StderrNotifier,
//!         DirectorySink::new("output"),
//!     );
//!     app.dispatch(Action::SetText("https://example.com".into()));
//!     app.dispatch(Action::SetForeground("#ffa500".parse().unwrap()));
//!     app.upload_logo("logo.png").await;
//!
//!     let report = app.export().await.expect("export failed");
//!     println!("saved {} ({}x{})", report.file_name, report.width, report.height);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Session store wiring state, rendering and export together.
//! - [`export`]: The export pipeline, download sinks and notifiers.
//! - [`render`]: QR code rendering into vector drawings.
//! - [`decode`]: Asynchronous SVG and logo decoding.
//! - [`surface`]: The bitmap surface exports are assembled on.
//! - [`state`]: Session state and its transitions.
//! - [`data_url`]: `data:` URL encoding and logo file reading.

#![forbid(unsafe_code)]

pub mod app;
pub mod color;
pub mod config;
pub mod data_url;
pub mod decode;
pub mod error;
pub mod export;
pub mod logging;
pub mod render;
pub mod state;
pub mod surface;

pub use error::{Error, Result};
