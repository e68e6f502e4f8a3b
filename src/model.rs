use std::path::PathBuf;

/// One data row of the source sheet. Every cell is text; absent cells are "".
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Position among the sheet's data rows (the header row excluded).
    pub row: usize,
    pub cells: Vec<String>,
}

impl Record {
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

/// All records sharing one booth number, in sorted order.
#[derive(Clone, Debug, PartialEq)]
pub struct BoothGroup {
    pub key: String,
    pub records: Vec<Record>,
}

/// Header row plus data rows of the first worksheet, all cells as text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sheet {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Column count: the widest of the header and the data rows.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

/// What was produced for one booth.
#[derive(Clone, Debug, PartialEq)]
pub struct BoothReport {
    pub key: String,
    pub path: PathBuf,
    pub pages: usize,
    pub rows: usize,
}
