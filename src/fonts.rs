use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use memmap2::Mmap;
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use crate::config::{FontPaths, Layout, REGULAR_FONT_FILE, SEMIBOLD_FONT_FILE};
use crate::error::Error;

fn font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    // 1. User-configured directories via BOOTH_PDF_FONTS env var
    if let Ok(val) = std::env::var("BOOTH_PDF_FONTS") {
        let sep = if cfg!(windows) { ';' } else { ':' };
        for part in val.split(sep) {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                dirs.push(PathBuf::from(trimmed));
            }
        }
    }

    // 2. Fonts shipped next to the working directory
    dirs.push(PathBuf::from("fonts"));

    // 3. Platform-specific system font directories
    #[cfg(target_os = "macos")]
    {
        dirs.extend(["/Library/Fonts".into(), "/System/Library/Fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(&home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

/// Depth-first search of `dirs` for a file with the given name (case-insensitive).
fn find_in_dirs(dirs: Vec<PathBuf>, file_name: &str) -> Option<PathBuf> {
    let mut visited: HashSet<PathBuf> = HashSet::new();
    // Reverse so the first configured directory is searched first.
    let mut stack: Vec<PathBuf> = dirs.into_iter().rev().collect();
    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut subdirs = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                subdirs.push(path);
            } else if path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.eq_ignore_ascii_case(file_name))
            {
                return Some(path);
            }
        }
        subdirs.sort();
        stack.extend(subdirs.into_iter().rev());
    }
    None
}

pub fn find_font_file(file_name: &str) -> Option<PathBuf> {
    let t0 = std::time::Instant::now();
    let found = find_in_dirs(font_directories(), file_name);
    log::debug!(
        "Font search for {file_name}: {:.1}ms → {:?}",
        t0.elapsed().as_secs_f64() * 1000.0,
        found,
    );
    found
}

impl FontPaths {
    /// Locate the default Devanagari faces in the font directories.
    pub fn discover() -> Result<FontPaths, Error> {
        let regular = find_font_file(REGULAR_FONT_FILE)
            .ok_or_else(|| Error::FontNotFound(REGULAR_FONT_FILE.to_string()))?;
        let semibold = find_font_file(SEMIBOLD_FONT_FILE)
            .ok_or_else(|| Error::FontNotFound(SEMIBOLD_FONT_FILE.to_string()))?;
        Ok(FontPaths { regular, semibold })
    }
}

/// A memory-mapped font file that is known to parse.
pub struct FontFace {
    path: PathBuf,
    data: Mmap,
}

impl FontFace {
    pub fn open(path: &Path) -> Result<FontFace, Error> {
        let load_err = |reason: String| Error::FontLoad {
            path: path.to_path_buf(),
            reason,
        };
        let file = std::fs::File::open(path).map_err(|e| load_err(e.to_string()))?;
        let data = unsafe { Mmap::map(&file) }.map_err(|e| load_err(e.to_string()))?;
        Face::parse(&data, 0).map_err(|e| load_err(e.to_string()))?;
        if rustybuzz::Face::from_slice(&data, 0).is_none() {
            return Err(load_err("face cannot be shaped".into()));
        }
        Ok(FontFace {
            path: path.to_path_buf(),
            data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn face(&self) -> Result<Face<'_>, Error> {
        Face::parse(&self.data, 0).map_err(|e| Error::FontLoad {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn shaper(&self) -> Result<rustybuzz::Face<'_>, Error> {
        rustybuzz::Face::from_slice(&self.data, 0).ok_or_else(|| Error::FontLoad {
            path: self.path.clone(),
            reason: "face cannot be shaped".into(),
        })
    }
}

/// A glyph positioned relative to the start of a shaped run, in pixels.
/// `y` grows upward from the baseline.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlacedGlyph {
    pub(crate) id: u16,
    pub(crate) x: f32,
    pub(crate) y: f32,
}

pub(crate) struct ShapedText {
    pub(crate) glyphs: Vec<PlacedGlyph>,
    pub(crate) advance: f32,
}

/// A face at one pixel size (point size times the supersampling scale).
#[derive(Clone)]
pub struct Font {
    face: Arc<FontFace>,
    size_pt: u32,
    scale: u32,
}

impl Font {
    pub fn new(face: Arc<FontFace>, size_pt: u32, scale: u32) -> Self {
        Font {
            face,
            size_pt,
            scale,
        }
    }

    /// Em size in bitmap pixels.
    pub fn px_size(&self) -> u32 {
        self.size_pt * self.scale
    }

    fn px_per_unit(&self, face: &Face) -> f32 {
        self.px_size() as f32 / face.units_per_em() as f32
    }

    pub(crate) fn shape(&self, text: &str) -> Result<ShapedText, Error> {
        let face = self.face.face()?;
        let shaper = self.face.shaper()?;
        let k = self.px_per_unit(&face);

        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();
        let output = rustybuzz::shape(&shaper, &[], buffer);

        let mut pen = 0.0f32;
        let glyphs = output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, pos)| {
                let glyph = PlacedGlyph {
                    id: info.glyph_id as u16,
                    x: pen + pos.x_offset as f32 * k,
                    y: pos.y_offset as f32 * k,
                };
                pen += pos.x_advance as f32 * k;
                glyph
            })
            .collect();
        Ok(ShapedText {
            glyphs,
            advance: pen,
        })
    }

    /// Horizontal advance of `text` in pixels.
    pub fn text_width(&self, text: &str) -> Result<f32, Error> {
        Ok(self.shape(text)?.advance)
    }

    /// Outline of `text` with its ascender line at `top` and pen start at `left`,
    /// in bitmap coordinates (y down). `None` when nothing has an outline.
    pub fn text_path(&self, text: &str, left: f32, top: f32) -> Result<Option<tiny_skia::Path>, Error> {
        let shaped = self.shape(text)?;
        let face = self.face.face()?;
        let k = self.px_per_unit(&face);
        let baseline = top + face.ascender() as f32 * k;

        let mut sink = PathSink {
            builder: tiny_skia::PathBuilder::new(),
            scale: k,
            x: 0.0,
            y: 0.0,
        };
        for glyph in &shaped.glyphs {
            sink.x = left + glyph.x;
            sink.y = baseline - glyph.y;
            face.outline_glyph(GlyphId(glyph.id), &mut sink);
        }
        Ok(sink.builder.finish())
    }
}

/// Font units to bitmap pixels, flipping y.
struct PathSink {
    builder: tiny_skia::PathBuilder,
    scale: f32,
    x: f32,
    y: f32,
}

impl PathSink {
    fn pt(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x + x * self.scale, self.y - y * self.scale)
    }
}

impl OutlineBuilder for PathSink {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.pt(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.pt(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.pt(x1, y1);
        let (x, y) = self.pt(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.pt(x1, y1);
        let (x2, y2) = self.pt(x2, y2);
        let (x, y) = self.pt(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// The three sized fonts a run needs. Loaded once and shared by every booth.
pub struct Fonts {
    pub title: Font,
    pub header: Font,
    pub data: Font,
}

impl Fonts {
    pub fn load(paths: &FontPaths, layout: &Layout) -> Result<Fonts, Error> {
        let t0 = std::time::Instant::now();
        let regular = Arc::new(FontFace::open(&paths.regular)?);
        let semibold = if paths.semibold == paths.regular {
            Arc::clone(&regular)
        } else {
            Arc::new(FontFace::open(&paths.semibold)?)
        };
        log::info!(
            "Fonts loaded: regular={}, semibold={} ({:.1}ms)",
            regular.path().display(),
            semibold.path().display(),
            t0.elapsed().as_secs_f64() * 1000.0,
        );
        Ok(Fonts {
            title: Font::new(Arc::clone(&regular), layout.title_font_size, layout.scale),
            header: Font::new(semibold, layout.header_font_size, layout.scale),
            data: Font::new(regular, layout.data_font_size, layout.scale),
        })
    }
}
