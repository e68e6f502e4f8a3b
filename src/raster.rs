//! Supersampled bitmaps for the table rows and the first-page banner.
//!
//! Everything here works in bitmap pixels: layout lengths multiplied by
//! `Layout::scale`. Coordinates are top-left origin, y down.

use image::RgbImage;
use tiny_skia::{FillRule, Paint, Pixmap, Transform};

use crate::config::Layout;
use crate::error::Error;
use crate::fonts::Font;

fn canvas(width: u32, height: u32) -> Result<Pixmap, Error> {
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| Error::Raster(format!("cannot allocate {width}x{height} bitmap")))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    Ok(pixmap)
}

fn ink(anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, 255);
    paint.anti_alias = anti_alias;
    paint
}

fn fill_band(pixmap: &mut Pixmap, left: f32, top: f32, right: f32, bottom: f32) {
    if let Some(rect) = tiny_skia::Rect::from_ltrb(left, top, right, bottom) {
        pixmap.fill_rect(rect, &ink(false), Transform::identity(), None);
    }
}

/// Outline the inclusive pixel box `[x0, y0] ..= [x1, y1]` with lines `thickness`
/// pixels wide, drawn inward. Parts outside the bitmap are clipped.
fn draw_box(pixmap: &mut Pixmap, x0: u32, y0: u32, x1: u32, y1: u32, thickness: u32) {
    let (l, t) = (x0 as f32, y0 as f32);
    let (r, b) = ((x1 + 1) as f32, (y1 + 1) as f32);
    let w = thickness as f32;
    fill_band(pixmap, l, t, r, t + w);
    fill_band(pixmap, l, b - w, r, b);
    fill_band(pixmap, l, t, l + w, b);
    fill_band(pixmap, r - w, t, r, b);
}

fn draw_text(pixmap: &mut Pixmap, font: &Font, text: &str, left: f32, top: f32) -> Result<(), Error> {
    if text.is_empty() {
        return Ok(());
    }
    if let Some(path) = font.text_path(text, left, top)? {
        pixmap.fill_path(&path, &ink(true), FillRule::Winding, Transform::identity(), None);
    }
    Ok(())
}

fn into_rgb(pixmap: Pixmap) -> Result<RgbImage, Error> {
    let (w, h) = (pixmap.width(), pixmap.height());
    // Opaque white background, so premultiplied RGBA is plain RGBA.
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    RgbImage::from_raw(w, h, rgb).ok_or_else(|| Error::Raster("bitmap size mismatch".into()))
}

/// Top of the em box for text centered in a band `height` pixels tall. Centered on
/// the em size, not on measured glyph height; goes negative when the em is taller.
fn text_top(height: u32, em: u32) -> f32 {
    (i64::from(height) - i64::from(em)).div_euclid(2) as f32
}

/// Render one table row. `values` pairs up with `layout.columns`; extra values are ignored
/// and missing ones leave their cell empty.
///
/// Text is not clipped to its cell: a long value runs on over the next columns.
pub fn render_row(values: &[&str], font: &Font, bold: bool, layout: &Layout) -> Result<RgbImage, Error> {
    let s = layout.scale;
    let height = layout.row_height * s;
    let mut pixmap = canvas(layout.table_width() * s, height)?;

    let thickness = if bold { 2 * s } else { s };
    let top = text_top(height, font.px_size());

    for (i, (column, x)) in layout.columns.iter().zip(layout.column_offsets()).enumerate() {
        let x_px = x * s;
        let w_px = column.width * s;
        draw_box(&mut pixmap, x_px, 0, x_px + w_px, height, thickness);

        let text = values.get(i).copied().unwrap_or("");
        draw_text(&mut pixmap, font, text, (x_px + layout.text_inset * s) as f32, top)?;
    }

    into_rgb(pixmap)
}

/// Render the two-line banner spanning the page width. Each line is centered on
/// its own measured width.
pub fn render_title(title: &str, subtitle: &str, font: &Font, layout: &Layout) -> Result<RgbImage, Error> {
    let s = layout.scale;
    let span = layout.page_width * s as f32;
    let mut pixmap = canvas(span as u32, layout.title_height * s)?;

    for (line, offset) in [title, subtitle].into_iter().zip(layout.title_line_offsets) {
        let x = ((span - font.text_width(line)?) / 2.0).floor();
        draw_text(&mut pixmap, font, line, x, (offset * s) as f32)?;
    }

    into_rgb(pixmap)
}
