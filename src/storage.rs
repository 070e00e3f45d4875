use crate::constants::{
    HOUSE_ASSIGNMENTS_FILE, HOUSE_COMMITTEES_FILE, HOUSE_MEMBERS_FILE, HOUSE_SUBCOMMITTEES_FILE,
    METADATA_FILE, SENATE_ASSIGNMENTS_FILE, SENATORS_FILE,
};
use crate::error::Result;
use crate::types::{Chamber, HouseTables, MetadataRecord, SenateTables, TableRecord};
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One CSV file produced by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenTable {
    pub path: PathBuf,
    pub rows: usize,
}

fn csv_writer(path: &Path) -> Result<csv::Writer<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Necessary)
        .from_path(path)?)
}

/// Write `records` under a header row taken from `T::COLUMNS`.
/// Empty tables still get their header.
pub fn write_records<T: TableRecord>(path: &Path, records: &[T]) -> Result<WrittenTable> {
    let mut writer = csv_writer(path)?;
    writer.write_record(T::COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = records.len(), "Wrote table");
    Ok(WrittenTable {
        path: path.to_path_buf(),
        rows: records.len(),
    })
}

/// Write the metadata record as a header row of its own keys plus one data row.
pub fn write_metadata(path: &Path, record: &MetadataRecord) -> Result<WrittenTable> {
    let mut writer = csv_writer(path)?;
    writer.write_record(record.columns())?;
    writer.write_record(record.values())?;
    writer.flush()?;

    Ok(WrittenTable {
        path: path.to_path_buf(),
        rows: 1,
    })
}

pub fn chamber_dir(output_dir: &Path, chamber: Chamber) -> PathBuf {
    output_dir.join(chamber.as_str())
}

pub fn write_house_tables(output_dir: &Path, tables: &HouseTables) -> Result<Vec<WrittenTable>> {
    let dir = chamber_dir(output_dir, Chamber::House);
    Ok(vec![
        write_metadata(&dir.join(METADATA_FILE), &tables.metadata)?,
        write_records(&dir.join(HOUSE_MEMBERS_FILE), &tables.members)?,
        write_records(&dir.join(HOUSE_ASSIGNMENTS_FILE), &tables.assignments)?,
        write_records(&dir.join(HOUSE_COMMITTEES_FILE), &tables.committees)?,
        write_records(&dir.join(HOUSE_SUBCOMMITTEES_FILE), &tables.subcommittees)?,
    ])
}

pub fn write_senate_tables(output_dir: &Path, tables: &SenateTables) -> Result<Vec<WrittenTable>> {
    let dir = chamber_dir(output_dir, Chamber::Senate);
    Ok(vec![
        write_metadata(&dir.join(METADATA_FILE), &tables.metadata)?,
        write_records(&dir.join(SENATORS_FILE), &tables.senators)?,
        write_records(&dir.join(SENATE_ASSIGNMENTS_FILE), &tables.assignments)?,
    ])
}
