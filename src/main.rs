//! qrlogo CLI: render text as a QR code, optionally stamp a logo on it, and save it as PNG.
//!
//! Usage:
//!   qrlogo [OPTIONS] <TEXT>

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use qrlogo::app::{App, Preview, PLACEHOLDER_TEXT};
use qrlogo::color::Color;
use qrlogo::config::Config;
use qrlogo::export::{DirectorySink, StderrNotifier};
use qrlogo::logging::init_logging;
use qrlogo::state::Action;

#[derive(Parser)]
#[command(
    name = "qrlogo",
    about = "Create a QR code with custom colors and an optional logo",
    version,
    author
)]
struct Cli {
    /// URL or text to encode
    text: String,

    /// Foreground color
    #[arg(long, default_value = "#000000")]
    fg: Color,

    /// Background color
    #[arg(long, default_value = "#ffffff")]
    bg: Color,

    /// Logo image to place in the middle of the code
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Directory the PNG is saved to
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the code to the terminal before exporting
    #[arg(long)]
    preview: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "qrlogo failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))
            .inspect_err(|e| eprintln!("Error: {e:#}"))?,
        None => Config::default(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    config.logging.json |= cli.json_logs;
    init_logging(&config.logging);

    let mut app = App::new(config.export, StderrNotifier, DirectorySink::new(&cli.out));
    app.dispatch(Action::SetForeground(cli.fg));
    app.dispatch(Action::SetBackground(cli.bg));
    app.dispatch(Action::SetText(cli.text));
    if let Some(logo) = &cli.logo {
        app.upload_logo(logo).await;
    }

    if cli.preview {
        match app.preview() {
            Preview::Code(drawing) => print!("{}", drawing.to_ascii()),
            Preview::Placeholder => println!("{PLACEHOLDER_TEXT}"),
            Preview::Unrenderable(reason) => eprintln!("Error: {reason}"),
        }
    }

    // Alerts and warnings have already been shown by the notifier.
    let report = app.export().await?;
    println!(
        "{} ({}x{})",
        cli.out.join(&report.file_name).display(),
        report.width,
        report.height
    );
    Ok(())
}
