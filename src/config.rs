use std::path::PathBuf;

/// A4 in points, matching the size every booth document is printed at.
pub const A4_WIDTH: f32 = 595.2756;
pub const A4_HEIGHT: f32 = 841.8898;

pub const REGULAR_FONT_FILE: &str = "NotoSansDevanagari-Regular.ttf";
pub const SEMIBOLD_FONT_FILE: &str = "NotoSansDevanagari-SemiBold.ttf";

/// One table column: the header label, which sheet column feeds it, and its width in points.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub header: String,
    pub source: usize,
    pub width: u32,
}

impl Column {
    pub fn new(header: &str, source: usize, width: u32) -> Self {
        Column {
            header: header.to_string(),
            source,
            width,
        }
    }
}

/// The two banner lines drawn on the first page. `{ward}` in `subtitle` is
/// replaced by the location label.
#[derive(Clone, Debug, PartialEq)]
pub struct TitleText {
    pub title: String,
    pub subtitle: String,
}

impl TitleText {
    pub fn lines(&self, ward: &str) -> (String, String) {
        (self.title.clone(), self.subtitle.replace("{ward}", ward))
    }
}

impl Default for TitleText {
    fn default() -> Self {
        TitleText {
            title: "महाराष्ट्र महानगरपालिका निवडणूक २०२५".to_string(),
            subtitle: "जळगाव महानगरपालिका ({ward}) प्रभाग {ward}".to_string(),
        }
    }
}

/// Everything that fixes the geometry of a booth document.
///
/// Lengths are PDF points unless noted. Bitmaps are rendered at `scale` times
/// these sizes and placed back at true size, so a row image is
/// `table_width() * scale` pixels wide.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub columns: Vec<Column>,
    pub page_width: f32,
    pub page_height: f32,
    pub row_height: u32,
    pub scale: u32,
    pub left_margin: f32,
    pub bottom_margin: f32,
    /// Left padding of cell text inside its border.
    pub text_inset: u32,
    pub title_font_size: u32,
    pub header_font_size: u32,
    pub data_font_size: u32,
    pub title_height: u32,
    /// Top of each banner line, measured down from the top of the title block.
    pub title_line_offsets: [u32; 2],
    /// Distance from the page top to the bottom edge of the header row on the first page.
    pub first_header_offset: f32,
    /// Same, for pages started by a page break.
    pub continuation_header_offset: f32,
    pub sort_keys: [usize; 2],
    pub booth_column: usize,
    pub title: TitleText,
}

impl Default for Layout {
    fn default() -> Self {
        let columns = vec![
            Column::new("बूथ नं.", 3, 38),
            Column::new("अ क्र.", 4, 33),
            Column::new("आडनाव", 6, 63),
            Column::new("नाव", 7, 90),
            Column::new("वडिलांचे/पतीचे नाव", 8, 100),
            Column::new("मतदान कार्ड", 17, 85),
            Column::new("वय", 15, 35),
            Column::new("लिंग", 14, 35),
            Column::new("विधानसभा क्र", 18, 70),
        ];
        Layout {
            columns,
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            row_height: 25,
            scale: 2,
            left_margin: 20.0,
            bottom_margin: 10.0,
            text_inset: 6,
            title_font_size: 14,
            header_font_size: 11,
            data_font_size: 10,
            title_height: 80,
            title_line_offsets: [5, 40],
            first_header_offset: 90.0,
            continuation_header_offset: 40.0,
            sort_keys: [9, 10],
            booth_column: 3,
            title: TitleText::default(),
        }
    }
}

impl Layout {
    pub fn table_width(&self) -> u32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }

    /// Pick this layout's cells out of a full sheet row, in column order.
    pub fn row_values<'a>(&self, cells: &'a [String]) -> Vec<&'a str> {
        self.columns
            .iter()
            .map(|c| cells.get(c.source).map(String::as_str).unwrap_or(""))
            .collect()
    }

    /// Highest sheet column index any part of the layout reads.
    pub fn max_required_column(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.source)
            .chain(self.sort_keys)
            .chain(std::iter::once(self.booth_column))
            .max()
            .unwrap_or(0)
    }

    /// X offset of every column's left edge, in points.
    pub fn column_offsets(&self) -> Vec<u32> {
        self.columns
            .iter()
            .scan(0u32, |x, c| {
                let left = *x;
                *x += c.width;
                Some(left)
            })
            .collect()
    }
}

/// Locations of the regular and semi-bold faces. The regular face draws the
/// title and data rows, the semi-bold face the column headers.
#[derive(Clone, Debug, PartialEq)]
pub struct FontPaths {
    pub regular: PathBuf,
    pub semibold: PathBuf,
}
