use std::fs::File;
use std::io::{Write, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use crossterm::{
    cursor::MoveToColumn,
    execute,
    style::Print,
    terminal::{Clear, ClearType, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use simplelog::{Config, LevelFilter, WriteLogger};

use folio::event_source::KeyboardEventSource;
use folio::panic_handler::initialize_panic_handler;
use folio::settings::load_settings;
use folio::viewer::commands::parse_script;
use folio::viewer::{ImageBackend, RenderBackend, Viewport};
use folio::{CellSize, ViewerController, ViewerStatus, export_frame, run_with_event_source};

const FRAME_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    /// PDF for `.pdf` files, page images otherwise
    Auto,
    Pdf,
    Images,
}

#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(about = "Browse a paginated document as cover and two-page spreads")]
#[command(version)]
struct Cli {
    /// PDF file, page image, or directory of page images
    #[arg(value_name = "LOCATOR")]
    locator: String,

    #[arg(long, value_enum, default_value_t = BackendKind::Auto)]
    backend: BackendKind,

    /// Viewport width in pixels (default: terminal width x cell width)
    #[arg(long)]
    width: Option<u32>,

    /// Viewport height in pixels (default: terminal height x cell height)
    #[arg(long)]
    height: Option<u32>,

    #[arg(long)]
    fullscreen: bool,

    /// Settings file (default: <config dir>/folio/config.yaml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory receiving the displayed pages as PNG files
    #[arg(long, value_name = "DIR", default_value = "folio-out")]
    out: PathBuf,

    /// Run headless: comma separated commands, e.g. "next,next,zoom-in"
    #[arg(long, value_name = "CMDS")]
    script: Option<String>,

    #[arg(long, default_value_t = 10)]
    cell_width: u16,

    #[arg(long, default_value_t = 20)]
    cell_height: u16,

    #[arg(long, value_name = "PATH", default_value = "folio.log")]
    log_file: PathBuf,

    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    WriteLogger::init(
        cli.log_level,
        Config::default(),
        File::create(&cli.log_file)
            .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?,
    )?;
    info!("Starting folio on {}", cli.locator);

    let settings = load_settings(cli.config.as_deref());
    let backend = select_backend(cli.backend, &cli.locator)?;
    let cell = CellSize::new(cli.cell_width.max(1), cli.cell_height.max(1));
    let viewport = initial_viewport(&cli, cell).with_fullscreen(cli.fullscreen);

    let mut viewer = ViewerController::with_viewport(backend, &settings, viewport);
    viewer.open(&cli.locator);

    let result = match cli.script.as_deref() {
        Some(script) => run_script(&mut viewer, script, &cli.out),
        None => run_interactive(&mut viewer, cell, &cli.out),
    };

    if let Err(err) = &result {
        error!("Application error: {err:?}");
    }
    info!("Shutting down folio");
    result
}

fn select_backend(kind: BackendKind, locator: &str) -> Result<Arc<dyn RenderBackend>> {
    let is_pdf = Path::new(locator)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    match (kind, is_pdf) {
        (BackendKind::Images, _) | (BackendKind::Auto, false) => Ok(Arc::new(ImageBackend::new())),
        (BackendKind::Pdf, _) | (BackendKind::Auto, true) => pdf_backend(),
    }
}

#[cfg(feature = "pdf")]
fn pdf_backend() -> Result<Arc<dyn RenderBackend>> {
    Ok(Arc::new(folio::viewer::MupdfBackend::new()))
}

#[cfg(not(feature = "pdf"))]
fn pdf_backend() -> Result<Arc<dyn RenderBackend>> {
    bail!("PDF support not compiled in; rebuild with --features pdf")
}

fn initial_viewport(cli: &Cli, cell: CellSize) -> Viewport {
    let fallback = Viewport::default();
    let (term_width, term_height) = crossterm::terminal::size()
        .map(|(columns, rows)| cell.viewport_pixels(columns, rows))
        .unwrap_or((fallback.width, fallback.height));
    Viewport::new(
        cli.width.unwrap_or(term_width),
        cli.height.unwrap_or(term_height),
    )
}

fn run_script(viewer: &mut ViewerController, script: &str, out: &Path) -> Result<()> {
    let commands = parse_script(script)?;
    viewer.wait_until_idle(FRAME_TIMEOUT);

    for command in commands {
        viewer.dispatch(command);
        if !viewer.wait_until_idle(FRAME_TIMEOUT) {
            bail!("Timed out waiting for the viewer after {command:?}");
        }
    }

    if !viewer.is_closed() {
        for path in export_frame(viewer, out)? {
            println!("{}", path.display());
        }
    }
    println!("{}", viewer.status_line());

    match viewer.status() {
        ViewerStatus::Error(err) => Err(err.into()),
        _ => Ok(()),
    }
}

fn run_interactive(viewer: &mut ViewerController, cell: CellSize, out: &Path) -> Result<()> {
    initialize_panic_handler();
    enable_raw_mode()?;

    let mut events = KeyboardEventSource;
    let result = run_with_event_source(viewer, &mut events, cell, FRAME_TIMEOUT, |viewer| {
        export_frame(viewer, out)?;
        let mut stdout = stdout();
        execute!(
            stdout,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(viewer.status_line())
        )?;
        stdout.flush()?;
        Ok(())
    });

    disable_raw_mode()?;
    println!();
    result
}
