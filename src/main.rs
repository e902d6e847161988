mod app;
mod chunk;
mod clipboard;
mod config;
mod dataset;
mod editor;
mod error;
mod fileio;
mod format;
mod gridview;
mod history;
mod keymap;
mod mode;
mod selection;
mod textcodec;
mod ui;
mod util;

use std::io::{self, Write};
use std::panic;
use std::path::PathBuf;

use tracing::{error, info};
use tracing_subscriber::fmt::writer::MakeWriter;

use crossterm::{
    cursor::MoveToColumn,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::App;
use config::Config;
use fileio::FileIO;
use format::DataFormat;

/// Parse command line arguments.
/// Returns (file_path, format_hint, read_only).
fn parse_args() -> (Option<PathBuf>, Option<DataFormat>, bool) {
    let args: Vec<String> = std::env::args().collect();
    let mut file_path: Option<PathBuf> = None;
    let mut format_hint: Option<DataFormat> = None;
    let mut read_only = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-f" | "--format" => {
                if i + 1 < args.len() {
                    format_hint = match DataFormat::from_tag(&args[i + 1]) {
                        Some(f) => Some(f),
                        None => {
                            eprintln!(
                                "Invalid format: '{}'. Use series, points, field, or raster.",
                                args[i + 1]
                            );
                            std::process::exit(1);
                        }
                    };
                    i += 2;
                } else {
                    eprintln!("Error: --format requires an argument");
                    std::process::exit(1);
                }
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--read-only" => {
                read_only = true;
                i += 1;
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
            _ => {
                file_path = Some(PathBuf::from(&args[i]));
                i += 1;
            }
        }
    }

    (file_path, format_hint, read_only)
}

/// Restore the terminal before the default panic output runs.
fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();

        match info.location() {
            Some(loc) => error!(file = loc.file(), line = loc.line(), "panic"),
            None => error!("panic"),
        }
        if let Some(s) = info.payload().downcast_ref::<&str>() {
            error!(message = %s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            error!(message = %s);
        }

        default_hook(info);
    }));
}

/// A `MakeWriter` for `tracing` that drops out of the alternate screen
/// for the duration of each write, so log lines land on the main screen
/// instead of corrupting the grid.
pub struct MainScreenWriter;

impl<'a> MakeWriter<'a> for MainScreenWriter {
    type Writer = MainScreenHandle;

    fn make_writer(&'a self) -> Self::Writer {
        MainScreenHandle
    }
}

pub struct MainScreenHandle;

impl Write for MainScreenHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut stdout = io::stdout();
        execute!(stdout, LeaveAlternateScreen)?;
        println!();
        execute!(stdout, MoveToColumn(0))?;
        let written = stdout.write(buf);
        execute!(stdout, MoveToColumn(0))?;
        stdout.flush()?;
        execute!(stdout, EnterAlternateScreen)?;
        written
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

fn print_help() {
    eprintln!("packtab - A terminal editor for packed numeric datasets");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    packtab [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -f, --format <FORMAT>  Dataset format (series, points, field, raster)");
    eprintln!("    --read-only            Read only mode");
    eprintln!("    -h, --help             Print this help message");
    eprintln!();
    eprintln!("If no format is specified, it is inferred from the file content:");
    eprintln!("unequal line lengths give a raster, otherwise the column count decides.");
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(MainScreenWriter)
        .init();
    info!("packtab started");

    install_panic_hook();

    let (file_path, format_hint, read_only) = parse_args();

    let config = Config::load_default();
    let file_io = FileIO::new(file_path, format_hint, read_only, config.max_cells);

    let load_result = file_io.load_dataset().map_err(|e| {
        error!(error = %e, "Failed to load dataset");
        e
    })?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(load_result.dataset, file_io, config);

    // Show any warnings from loading (e.g., "New file")
    if !load_result.warnings.is_empty() {
        app.message = Some(load_result.warnings.join("; "));
    }

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}
