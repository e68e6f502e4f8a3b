mod booths;
mod config;
mod error;
mod fonts;
mod model;
mod pdf;
mod raster;
mod sheet;

pub use booths::{group_by_booth, load_records, records_from_sheet, sort_records};
pub use config::{
    A4_HEIGHT, A4_WIDTH, Column, FontPaths, Layout, REGULAR_FONT_FILE, SEMIBOLD_FONT_FILE, TitleText,
};
pub use error::{Error, ErrorKind};
pub use fonts::{Font, FontFace, Fonts, find_font_file};
pub use model::{BoothGroup, BoothReport, Record, Sheet};
pub use pdf::{
    PageCursor, PagePlan, RenderedBooth, booth_file_name, paginate, render_booth_pdf,
    write_booth_pdf,
};
pub use raster::{render_row, render_title};
pub use sheet::{read_xlsx, read_xlsx_bytes};

use std::path::Path;
use std::time::Instant;

/// Split the voter roll at `source` into one PDF per booth under `output_dir`,
/// using the default layout and the Devanagari fonts found in the font directories.
pub fn generate_booth_pdfs(
    source: &Path,
    output_dir: &Path,
    ward: &str,
) -> Result<Vec<BoothReport>, Error> {
    let layout = Layout::default();
    let fonts = FontPaths::discover()?;
    generate_booth_pdfs_with(source, output_dir, ward, &layout, &fonts)
}

/// Same as [`generate_booth_pdfs`] with an explicit layout and font files.
///
/// Booths are written one after another; the first failure stops the run and
/// documents already written stay in place.
pub fn generate_booth_pdfs_with(
    source: &Path,
    output_dir: &Path,
    ward: &str,
    layout: &Layout,
    font_paths: &FontPaths,
) -> Result<Vec<BoothReport>, Error> {
    let t0 = Instant::now();

    let mut records = load_records(source, layout)?;
    sort_records(&mut records, layout.sort_keys);
    let groups = group_by_booth(records, layout.booth_column);
    let t_load = t0.elapsed();

    std::fs::create_dir_all(output_dir).map_err(|e| Error::output(output_dir, e))?;
    let fonts = Fonts::load(font_paths, layout)?;

    let mut reports = Vec::with_capacity(groups.len());
    for group in &groups {
        reports.push(write_booth_pdf(group, output_dir, ward, layout, &fonts)?);
    }
    let t_total = t0.elapsed();

    log::info!(
        "Timing: load={:.1}ms, render={:.1}ms, total={:.1}ms ({} booths, {} pages)",
        t_load.as_secs_f64() * 1000.0,
        (t_total - t_load).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        reports.len(),
        reports.iter().map(|r| r.pages).sum::<usize>(),
    );

    Ok(reports)
}
