mod pages;

pub use pages::{PageCursor, PagePlan, paginate};

use std::path::{Path, PathBuf};

use image::RgbImage;
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, TextStr};

use crate::config::Layout;
use crate::error::Error;
use crate::fonts::Fonts;
use crate::model::{BoothGroup, BoothReport};
use crate::raster::{render_row, render_title};

/// A finished booth document held in memory.
pub struct RenderedBooth {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

/// Write `image` as PNG into the scratch directory, as a row image lives on disk
/// only until it has been embedded.
fn stage_png(image: &RgbImage, scratch: &Path, name: &str) -> Result<PathBuf, Error> {
    let path = scratch.join(name);
    image.save_with_format(&path, image::ImageFormat::Png)?;
    Ok(path)
}

struct DocumentWriter {
    pdf: Pdf,
    next_id: i32,
    catalog_id: Ref,
    pages_id: Ref,
    page_ids: Vec<Ref>,
    images: usize,
}

impl DocumentWriter {
    fn new() -> Self {
        DocumentWriter {
            pdf: Pdf::new(),
            next_id: 3,
            catalog_id: Ref::new(1),
            pages_id: Ref::new(2),
            page_ids: Vec::new(),
            images: 0,
        }
    }

    fn alloc(&mut self) -> Ref {
        let r = Ref::new(self.next_id);
        self.next_id += 1;
        r
    }

    /// Embed a staged PNG as a Flate-compressed RGB image XObject.
    fn embed_png(&mut self, path: &Path) -> Result<(String, Ref), Error> {
        let rgb = image::open(path)?.to_rgb8();
        let (w, h) = (rgb.width(), rgb.height());
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(rgb.as_raw(), 6);

        let xobj_ref = self.alloc();
        self.images += 1;
        let pdf_name = format!("Im{}", self.images);

        let mut xobj = self.pdf.image_xobject(xobj_ref, &compressed);
        xobj.filter(Filter::FlateDecode);
        xobj.width(w as i32);
        xobj.height(h as i32);
        xobj.color_space().device_rgb();
        xobj.bits_per_component(8);

        Ok((pdf_name, xobj_ref))
    }

    fn add_page(&mut self, content: Content, xobjects: &[(String, Ref)], layout: &Layout) {
        let page_id = self.alloc();
        let content_id = self.alloc();

        let raw = content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        self.pdf
            .stream(content_id, &compressed)
            .filter(Filter::FlateDecode);

        let mut page = self.pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, layout.page_width, layout.page_height))
            .parent(self.pages_id)
            .contents(content_id);
        {
            let mut resources = page.resources();
            let mut pairs = resources.x_objects();
            for (name, xobj_ref) in xobjects {
                pairs.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
        drop(page);

        self.page_ids.push(page_id);
    }

    fn finish(mut self, title: &str) -> Vec<u8> {
        let info_id = self.alloc();
        self.pdf
            .document_info(info_id)
            .title(TextStr(title))
            .producer(TextStr("booth-pdf"));
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.pdf
            .pages(self.pages_id)
            .kids(self.page_ids.iter().copied())
            .count(self.page_ids.len() as i32);
        self.pdf.finish()
    }
}

/// Draw an embedded image into the rectangle with bottom-left corner `(x, y)`.
fn place(content: &mut Content, name: &str, x: f32, y: f32, width: f32, height: f32) {
    content.save_state();
    content.transform([width, 0.0, 0.0, height, x, y]);
    content.x_object(Name(name.as_bytes()));
    content.restore_state();
}

/// Lay out and render one booth. Transient row images are written to `scratch`.
pub fn render_booth_pdf(
    group: &BoothGroup,
    ward: &str,
    layout: &Layout,
    fonts: &Fonts,
    scratch: &Path,
) -> Result<RenderedBooth, Error> {
    let t0 = std::time::Instant::now();
    let plans = paginate(group.records.len(), layout);
    let mut doc = DocumentWriter::new();

    let table_width = layout.table_width() as f32;
    let row_height = layout.row_height as f32;

    let (title, subtitle) = layout.title.lines(ward);
    let title_img = render_title(&title, &subtitle, &fonts.title, layout)?;
    let title_xobj = doc.embed_png(&stage_png(&title_img, scratch, "title.png")?)?;

    let header_img = render_row(&layout.headers(), &fonts.header, true, layout)?;
    let header_xobj = doc.embed_png(&stage_png(&header_img, scratch, "header.png")?)?;

    let t_banner = t0.elapsed();

    for plan in &plans {
        let mut content = Content::new();
        let mut used: Vec<(String, Ref)> = Vec::with_capacity(plan.rows.len() + 2);

        if plan.title {
            let height = layout.title_height as f32;
            place(
                &mut content,
                &title_xobj.0,
                0.0,
                layout.page_height - height,
                layout.page_width,
                height,
            );
            used.push(title_xobj.clone());
        }

        place(
            &mut content,
            &header_xobj.0,
            layout.left_margin,
            plan.header_y,
            table_width,
            row_height,
        );
        used.push(header_xobj.clone());

        for &(index, y) in &plan.rows {
            let record = &group.records[index];
            let values = layout.row_values(&record.cells);
            let img = render_row(&values, &fonts.data, false, layout)?;
            let staged = stage_png(&img, scratch, &format!("row_{}.png", index + 1))?;
            let xobj = doc.embed_png(&staged)?;
            place(&mut content, &xobj.0, layout.left_margin, y, table_width, row_height);
            used.push(xobj);
        }

        log::debug!(
            "Booth {}: page {} with {} rows",
            group.key,
            plan.number,
            plan.rows.len()
        );
        doc.add_page(content, &used, layout);
    }

    let pages = plans.len();
    let bytes = doc.finish(&format!("Booth {}", group.key));

    log::debug!(
        "Booth {} render: banner={:.1}ms, total={:.1}ms ({} pages, {} bytes)",
        group.key,
        t_banner.as_secs_f64() * 1000.0,
        t0.elapsed().as_secs_f64() * 1000.0,
        pages,
        bytes.len(),
    );

    Ok(RenderedBooth { bytes, pages })
}

/// `Booth_<key>.pdf`, with characters that cannot appear in file names replaced.
pub fn booth_file_name(key: &str) -> String {
    let safe: String = key
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("Booth_{safe}.pdf")
}

/// Render one booth and save it into `output_dir`. The scratch directory for its
/// row images is removed when this returns, on success or failure.
pub fn write_booth_pdf(
    group: &BoothGroup,
    output_dir: &Path,
    ward: &str,
    layout: &Layout,
    fonts: &Fonts,
) -> Result<BoothReport, Error> {
    let scratch = tempfile::Builder::new()
        .prefix("booth-pdf-")
        .tempdir()
        .map_err(|e| Error::output(std::env::temp_dir(), e))?;

    let rendered = render_booth_pdf(group, ward, layout, fonts, scratch.path())?;

    let path = output_dir.join(booth_file_name(&group.key));
    std::fs::write(&path, &rendered.bytes).map_err(|e| Error::output(&path, e))?;
    log::info!("Created PDF: {}", path.display());

    Ok(BoothReport {
        key: group.key.clone(),
        path,
        pages: rendered.pages,
        rows: group.records.len(),
    })
}
