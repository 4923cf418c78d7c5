use crate::record::{CarRecord, CatalogEntry, REQUIRED_COLUMNS};
use crate::render::render_text;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use trimsight_core::{Error, Result};

/// Read the processed catalog CSV at `path`
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<CarRecord>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let records = read_catalog(file)?;
    tracing::info!(path = %path.display(), records = records.len(), "catalog loaded");
    Ok(records)
}

/// Parse catalog rows from any reader. The first line must be the header.
pub fn read_catalog<R: Read>(reader: R) -> Result<Vec<CarRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: HashSet<String> = reader
        .headers()
        .map_err(|e| Error::DataFormat(format!("unreadable header: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.contains(*column))
        .collect();
    if !missing.is_empty() {
        return Err(Error::DataFormat(format!(
            "missing columns: {}",
            missing.join(", ")
        )));
    }

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    for (row, result) in reader.deserialize::<CarRecord>().enumerate() {
        let record = result.map_err(|e| Error::DataFormat(format!("row {}: {}", row + 1, e)))?;
        validate(&record, row + 1)?;

        if !seen.insert(record.hack_id.clone()) {
            tracing::warn!(hack_id = %record.hack_id, row = row + 1, "duplicate hack-id in catalog");
        }
        records.push(record);
    }

    Ok(records)
}

/// Render every record, preserving catalog order
pub fn render_corpus(records: &[CarRecord]) -> Vec<CatalogEntry> {
    records
        .iter()
        .map(|record| CatalogEntry {
            hack_id: record.hack_id.clone(),
            text: render_text(record),
        })
        .collect()
}

/// Load the catalog and render it in one step
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogEntry>> {
    let records = load_catalog(path)?;
    Ok(render_corpus(&records))
}

fn validate(record: &CarRecord, row: usize) -> Result<()> {
    let required = [
        ("hack-id", &record.hack_id),
        ("make", &record.make),
        ("model", &record.model),
        ("trim", &record.trim),
    ];
    for (column, value) in required {
        if value.is_empty() {
            return Err(Error::DataFormat(format!("row {}: empty {}", row, column)));
        }
    }
    if !record.msrp.is_finite() {
        return Err(Error::DataFormat(format!("row {}: msrp is not a number", row)));
    }
    Ok(())
}
