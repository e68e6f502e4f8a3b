#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use booth_pdf::FontPaths;

const SML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/data.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Voters" sheetId="1" r:id="rId7"/><sheet name="Other" sheetId="2" r:id="rId8"/></sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId8" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/other.xml"/>
<Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/data.xml"/>
</Relationships>"#;

/// Spreadsheet column letters for a 0-based index (0 → A, 26 → AA).
pub fn col_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8(name).unwrap()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Worksheet XML with every non-empty cell stored as an inline string.
pub fn inline_sheet_xml(rows: &[Vec<String>]) -> String {
    let mut xml = format!(r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{SML_NS}"><sheetData>"#);
    for (r, row) in rows.iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            xml.push_str(&format!(
                r#"<c r="{}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                col_name(c),
                r + 1,
                escape(value)
            ));
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Package a worksheet (and optional shared strings) as an .xlsx archive.
/// A decoy second sheet is included so tests notice if the wrong one is read.
pub fn xlsx_bytes(sheet_xml: &str, shared_strings: Option<&str>) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let decoy = inline_sheet_xml(&[vec!["decoy".to_string()]]);

    let mut parts: Vec<(&str, &str)> = vec![
        ("[Content_Types].xml", CONTENT_TYPES),
        ("xl/workbook.xml", WORKBOOK),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/worksheets/other.xml", decoy.as_str()),
        ("xl/worksheets/data.xml", sheet_xml),
    ];
    if let Some(sst) = shared_strings {
        parts.push(("xl/sharedStrings.xml", sst));
    }
    for (name, body) in parts {
        zip.start_file(name, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub const HEADER_LABELS: [&str; 19] = [
    "Sr", "Ward", "Part", "Booth", "SerialNo", "House", "Surname", "Name", "Relative", "Key1",
    "Key2", "Extra1", "Extra2", "Extra3", "Gender", "Age", "Extra4", "EPIC", "Assembly",
];

/// A 19-column voter row with the fields the default layout and sort read.
pub fn voter_row(booth: &str, key1: &str, key2: &str, name: &str) -> Vec<String> {
    let mut row = vec![String::new(); 19];
    row[3] = booth.to_string();
    row[4] = key2.to_string();
    row[6] = "Patil".to_string();
    row[7] = name.to_string();
    row[8] = "Ramesh".to_string();
    row[9] = key1.to_string();
    row[10] = key2.to_string();
    row[14] = "M".to_string();
    row[15] = "42".to_string();
    row[17] = format!("EPIC{name}");
    row[18] = "13".to_string();
    row
}

/// Write a voter-roll workbook (header row + `rows`) to `path`.
pub fn write_voter_roll(path: &Path, rows: &[Vec<String>]) {
    let mut all = vec![HEADER_LABELS.iter().map(|s| s.to_string()).collect::<Vec<_>>()];
    all.extend(rows.iter().cloned());
    std::fs::write(path, xlsx_bytes(&inline_sheet_xml(&all), None)).unwrap();
}

/// A TrueType face available on this machine. `BOOTH_PDF_TEST_FONT` wins; otherwise
/// the Devanagari face, then common Latin faces from the font directories.
pub fn test_font() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("BOOTH_PDF_TEST_FONT") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }
    [
        "NotoSansDevanagari-Regular.ttf",
        "DejaVuSans.ttf",
        "LiberationSans-Regular.ttf",
        "Arial.ttf",
    ]
    .iter()
    .find_map(|name| booth_pdf::find_font_file(name))
}

/// Both faces pointing at the test font, or `None` (and a note on stdout) to skip.
pub fn test_font_paths() -> Option<FontPaths> {
    let _ = env_logger::try_init();
    match test_font() {
        Some(path) => Some(FontPaths {
            regular: path.clone(),
            semibold: path,
        }),
        None => {
            println!("no TrueType font found; set BOOTH_PDF_TEST_FONT to run this test");
            None
        }
    }
}

/// Page count from the page tree's /Count entry.
pub fn pdf_page_count(bytes: &[u8]) -> Option<usize> {
    let needle = b"/Count ";
    let pos = bytes.windows(needle.len()).position(|w| w == needle)?;
    let digits: String = bytes[pos + needle.len()..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .map(|&b| b as char)
        .collect();
    digits.parse().ok()
}

/// Occurrences of `needle` in `bytes`.
pub fn count_occurrences(bytes: &[u8], needle: &[u8]) -> usize {
    bytes.windows(needle.len()).filter(|w| *w == needle).count()
}
