use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::Error;
use crate::model::Sheet;

const SML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const DEFAULT_SHEET: &str = "xl/worksheets/sheet1.xml";

/// Column count of a worksheet (`A` through `XFD`).
const MAX_COLUMNS: usize = 16384;

fn sml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(SML_NS))
}

fn sml_children<'a>(
    node: roxmltree::Node<'a, 'a>,
    name: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'a>> + 'a {
    node.children()
        .filter(move |n| n.tag_name().name() == name && n.tag_name().namespace() == Some(SML_NS))
}

fn read_zip_text<R: Read + Seek>(zip: &mut zip::ZipArchive<R>, name: &str) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

fn parse_rels_xml(xml_content: &str) -> HashMap<String, String> {
    let mut rels = HashMap::new();
    let Ok(xml) = roxmltree::Document::parse(xml_content) else {
        return rels;
    };
    for node in xml.root_element().children() {
        if node.tag_name().name() == "Relationship"
            && let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target"))
        {
            rels.insert(id.to_string(), target.to_string());
        }
    }
    rels
}

/// Targets in workbook.xml.rels are relative to `xl/` unless absolute.
fn resolve_part(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(abs) => abs.to_string(),
        None => format!("xl/{target}"),
    }
}

/// Zip entry name of the first worksheet in workbook order.
fn first_sheet_part<R: Read + Seek>(zip: &mut zip::ZipArchive<R>) -> String {
    let Some(workbook) = read_zip_text(zip, "xl/workbook.xml") else {
        return DEFAULT_SHEET.to_string();
    };
    let rels = read_zip_text(zip, "xl/_rels/workbook.xml.rels")
        .map(|x| parse_rels_xml(&x))
        .unwrap_or_default();
    let Ok(xml) = roxmltree::Document::parse(&workbook) else {
        return DEFAULT_SHEET.to_string();
    };
    sml(xml.root_element(), "sheets")
        .and_then(|sheets| sml(sheets, "sheet"))
        .and_then(|sheet| sheet.attribute((REL_NS, "id")))
        .and_then(|rid| rels.get(rid))
        .map(|target| resolve_part(target))
        .unwrap_or_else(|| DEFAULT_SHEET.to_string())
}

/// Concatenated text of a string item, skipping phonetic (`rPh`) runs.
fn item_text(si: roxmltree::Node) -> String {
    si.descendants()
        .filter(|n| n.tag_name().name() == "t" && n.tag_name().namespace() == Some(SML_NS))
        .filter(|t| !t.ancestors().any(|a| a.tag_name().name() == "rPh"))
        .filter_map(|t| t.text())
        .collect()
}

fn parse_shared_strings<R: Read + Seek>(
    zip: &mut zip::ZipArchive<R>,
) -> Result<Vec<String>, Error> {
    let Some(content) = read_zip_text(zip, "xl/sharedStrings.xml") else {
        return Ok(Vec::new());
    };
    let xml = roxmltree::Document::parse(&content)?;
    Ok(sml_children(xml.root_element(), "si").map(item_text).collect())
}

/// Split a cell reference like `AB12` into a 0-based column and 1-based row.
/// Columns past `XFD` are rejected.
pub(crate) fn parse_cell_ref(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut col = 0usize;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        col = col
            .checked_mul(26)?
            .checked_add(ch.to_ascii_uppercase() as usize - 'A' as usize + 1)?;
        if col > MAX_COLUMNS {
            return None;
        }
    }
    let row = digits.parse::<usize>().ok()?;
    Some((col - 1, row))
}

/// Text of a numeric cell the way a string-typed sheet load shows it:
/// whole numbers written without a point stay integers, anything with a point
/// or exponent goes through a float.
pub(crate) fn numeric_text(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains(['.', 'e', 'E']) {
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 => format!("{f:.1}"),
            Ok(f) => format!("{f}"),
            Err(_) => raw.to_string(),
        }
    } else {
        raw.parse::<i64>()
            .map(|i| i.to_string())
            .unwrap_or_else(|_| raw.to_string())
    }
}

fn cell_text(cell: roxmltree::Node, shared: &[String]) -> String {
    let value = sml(cell, "v").and_then(|v| v.text()).unwrap_or("");
    match cell.attribute("t").unwrap_or("n") {
        "s" => value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared.get(i))
            .cloned()
            .unwrap_or_default(),
        "inlineStr" => sml(cell, "is").map(item_text).unwrap_or_default(),
        "b" => match value.trim() {
            "1" => "True".to_string(),
            "0" => "False".to_string(),
            other => other.to_string(),
        },
        "str" | "e" | "d" => value.to_string(),
        _ if value.is_empty() => String::new(),
        _ => numeric_text(value),
    }
}

fn parse_worksheet(xml_content: &str, shared: &[String]) -> Result<Vec<Vec<String>>, Error> {
    let xml = roxmltree::Document::parse(xml_content)?;
    let data = sml(xml.root_element(), "sheetData")
        .ok_or_else(|| Error::InvalidWorkbook("worksheet has no sheetData".into()))?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for row in sml_children(data, "row") {
        let mut cells: Vec<String> = Vec::new();
        let mut next_col = 0usize;
        for cell in sml_children(row, "c") {
            let col = match cell.attribute("r") {
                Some(reference) => parse_cell_ref(reference).map(|(c, _)| c).ok_or_else(|| {
                    Error::InvalidWorkbook(format!("bad cell reference {reference:?}"))
                })?,
                None => next_col,
            };
            if col >= MAX_COLUMNS {
                return Err(Error::InvalidWorkbook("row has more than 16384 cells".into()));
            }
            next_col = col + 1;
            let text = cell_text(cell, shared);
            if cells.len() <= col {
                cells.resize(col + 1, String::new());
            }
            cells[col] = text;
        }
        // Blank rows below the header carry no record.
        if !rows.is_empty() && cells.iter().all(|c| c.is_empty()) {
            log::debug!("skipping blank worksheet row {:?}", row.attribute("r"));
            continue;
        }
        rows.push(cells);
    }
    Ok(rows)
}

fn read_archive<R: Read + Seek>(zip: &mut zip::ZipArchive<R>) -> Result<Sheet, Error> {
    let shared = parse_shared_strings(zip)?;
    let part = first_sheet_part(zip);
    let content = read_zip_text(zip, &part)
        .ok_or_else(|| Error::InvalidWorkbook(format!("missing worksheet {part}")))?;

    let mut rows = parse_worksheet(&content, &shared)?.into_iter();
    let header = rows.next().unwrap_or_default();
    let rows: Vec<Vec<String>> = rows.collect();
    log::debug!("{part}: {} columns, {} data rows", header.len(), rows.len());
    Ok(Sheet { header, rows })
}

/// Read the first worksheet of an `.xlsx` file. The first row is the header.
pub fn read_xlsx(path: &Path) -> Result<Sheet, Error> {
    let file = std::fs::File::open(path).map_err(|e| Error::Source {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|_| Error::InvalidWorkbook(format!("{} is not a ZIP archive", path.display())))?;
    read_archive(&mut zip)
}

pub fn read_xlsx_bytes(data: &[u8]) -> Result<Sheet, Error> {
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(data))
        .map_err(|_| Error::InvalidWorkbook("input is not a ZIP archive".into()))?;
    read_archive(&mut zip)
}
