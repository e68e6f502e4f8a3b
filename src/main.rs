use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use booth_pdf::{FontPaths, Layout, REGULAR_FONT_FILE, SEMIBOLD_FONT_FILE, find_font_file};

/// Split a voter-roll workbook into one printable PDF per polling booth.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Source workbook (.xlsx); the first sheet is read
    input: PathBuf,

    /// Directory the Booth_<n>.pdf files are written to (created if missing)
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Ward number shown in the title
    #[arg(short, long)]
    ward: String,

    /// Regular-weight font (defaults to NotoSansDevanagari-Regular.ttf from the font directories)
    #[arg(long)]
    font_regular: Option<PathBuf>,

    /// Semi-bold font for the column headers
    #[arg(long)]
    font_bold: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn resolve_font(explicit: &Option<PathBuf>, file_name: &str) -> Result<PathBuf, booth_pdf::Error> {
    match explicit {
        Some(path) => Ok(path.clone()),
        None => find_font_file(file_name)
            .ok_or_else(|| booth_pdf::Error::FontNotFound(file_name.to_string())),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let fonts = match (
        resolve_font(&args.font_regular, REGULAR_FONT_FILE),
        resolve_font(&args.font_bold, SEMIBOLD_FONT_FILE),
    ) {
        (Ok(regular), Ok(semibold)) => FontPaths { regular, semibold },
        (Err(e), _) | (_, Err(e)) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match booth_pdf::generate_booth_pdfs_with(
        &args.input,
        &args.output_dir,
        &args.ward,
        &Layout::default(),
        &fonts,
    ) {
        Ok(reports) => {
            log::info!("{} booth documents written to {}", reports.len(), args.output_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e} ({:?})", e.kind());
            ExitCode::FAILURE
        }
    }
}
