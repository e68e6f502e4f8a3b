use std::collections::HashMap;
use std::path::Path;

use crate::config::Layout;
use crate::error::Error;
use crate::model::{BoothGroup, Record, Sheet};
use crate::sheet::read_xlsx;

/// Turn a parsed sheet into records, checking every column the layout reads exists.
pub fn records_from_sheet(sheet: Sheet, layout: &Layout) -> Result<Vec<Record>, Error> {
    let available = sheet.width();
    let required = layout.max_required_column();
    if required >= available {
        return Err(Error::MissingColumn {
            index: required,
            available,
        });
    }

    Ok(sheet
        .rows
        .into_iter()
        .enumerate()
        .map(|(row, mut cells)| {
            cells.resize(available, String::new());
            Record { row, cells }
        })
        .collect())
}

pub fn load_records(path: &Path, layout: &Layout) -> Result<Vec<Record>, Error> {
    let t0 = std::time::Instant::now();
    let sheet = read_xlsx(path)?;
    let records = records_from_sheet(sheet, layout)?;
    log::info!(
        "Loaded {} records from {} in {:.1}ms",
        records.len(),
        path.display(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(records)
}

/// Stable sort on the two key columns; equal keys keep their sheet order.
pub fn sort_records(records: &mut [Record], sort_keys: [usize; 2]) {
    let [first, second] = sort_keys;
    records.sort_by(|a, b| {
        a.cell(first)
            .cmp(b.cell(first))
            .then_with(|| a.cell(second).cmp(b.cell(second)))
    });
}

/// Partition sorted records by booth key. Groups come out in order of each
/// key's first appearance and keep the records' relative order.
pub fn group_by_booth(records: Vec<Record>, booth_column: usize) -> Vec<BoothGroup> {
    let mut groups: Vec<BoothGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in records {
        let key = record.cell(booth_column).to_string();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(BoothGroup {
                key,
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].records.push(record);
    }
    groups
}
