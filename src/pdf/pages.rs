use crate::config::Layout;

/// Vertical position and page count while one booth document is laid out.
///
/// PDF space: y grows upward, so moving down the page decreases `y`. Every
/// position handed out is the bottom edge of a row.
#[derive(Clone, Debug, PartialEq)]
pub struct PageCursor {
    y: f32,
    page: usize,
    rows_drawn: usize,
}

impl PageCursor {
    /// Cursor for page 1, positioned for the header row under the title.
    pub fn first_page(layout: &Layout) -> Self {
        PageCursor {
            y: layout.page_height - layout.first_header_offset,
            page: 1,
            rows_drawn: 0,
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_drawn(&self) -> usize {
        self.rows_drawn
    }

    /// True once the cursor has reached the bottom margin. Only asked before a data row.
    pub fn needs_break(&self, layout: &Layout) -> bool {
        self.y <= layout.bottom_margin
    }

    /// Move to the top of a fresh page, where the repeated header goes.
    pub fn break_page(&mut self, layout: &Layout) {
        self.page += 1;
        self.y = layout.page_height - layout.continuation_header_offset;
    }

    pub fn place_header(&mut self, layout: &Layout) -> f32 {
        let y = self.y;
        self.y -= layout.row_height as f32;
        y
    }

    pub fn place_row(&mut self, layout: &Layout) -> f32 {
        let y = self.y;
        self.y -= layout.row_height as f32;
        self.rows_drawn += 1;
        y
    }
}

/// Everything drawn on one page.
#[derive(Clone, Debug, PartialEq)]
pub struct PagePlan {
    pub number: usize,
    /// Only the first page carries the banner.
    pub title: bool,
    pub header_y: f32,
    /// (index into the booth's records, bottom edge y), top to bottom.
    pub rows: Vec<(usize, f32)>,
}

/// Lay out `row_count` data rows. Always yields at least the first page, which has
/// the title and header even with no rows. A page break happens only when a row
/// is still pending, so a full last page never leaves an empty one behind.
pub fn paginate(row_count: usize, layout: &Layout) -> Vec<PagePlan> {
    let mut cursor = PageCursor::first_page(layout);
    let mut pages = vec![PagePlan {
        number: cursor.page(),
        title: true,
        header_y: cursor.place_header(layout),
        rows: Vec::new(),
    }];

    for index in 0..row_count {
        if cursor.needs_break(layout) {
            cursor.break_page(layout);
            pages.push(PagePlan {
                number: cursor.page(),
                title: false,
                header_y: cursor.place_header(layout),
                rows: Vec::new(),
            });
        }
        let y = cursor.place_row(layout);
        if let Some(page) = pages.last_mut() {
            page.rows.push((index, y));
        }
    }

    debug_assert_eq!(cursor.rows_drawn(), row_count);
    pages
}
