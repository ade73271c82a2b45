//! CSV export of the current normalized dataset for offline inspection.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::data::cache::FreshnessCache;
use crate::data::record::Dataset;

#[derive(Debug)]
pub enum ExportError {
    NoData,
    Csv(csv::Error),
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => write!(f, "no dataset available to export"),
            Self::Csv(err) => write!(f, "failed to write csv: {err}"),
            Self::Io(err) => write!(f, "failed to prepare export path: {err}"),
        }
    }
}

const HEADER: &[&str] = &[
    "hospital",
    "zone",
    "pincode",
    "phonenumber",
    "general",
    "hdu",
    "icu",
    "icuwithventilator",
    "remarks",
    "timestamp",
    "type",
];

/// Fetch-if-stale, then write every record. Unknown counts become empty
/// cells, keeping the null/zero distinction visible in the export.
pub fn export_csv(
    cache: &mut FreshnessCache,
    now: DateTime<Utc>,
    path: impl AsRef<Path>,
) -> Result<usize, ExportError> {
    let dataset = cache.dataset(now).map_err(|_| ExportError::NoData)?;
    write_dataset(dataset, path)
}

fn write_dataset(dataset: &Dataset, path: impl AsRef<Path>) -> Result<usize, ExportError> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(ExportError::Io)?;
        }
    }
    let mut writer = csv::Writer::from_path(path).map_err(ExportError::Csv)?;
    writer.write_record(HEADER).map_err(ExportError::Csv)?;
    for record in &dataset.records {
        let row = [
            record.hospital.clone(),
            record.zone.clone(),
            record.pincode.clone(),
            record.phonenumber.clone(),
            count_cell(record.general),
            count_cell(record.hdu),
            count_cell(record.icu),
            count_cell(record.icuwithventilator),
            record.remarks.clone(),
            record.timestamp_raw.clone(),
            record.report_type.clone(),
        ];
        writer.write_record(&row).map_err(ExportError::Csv)?;
    }
    writer.flush().map_err(ExportError::Io)?;
    Ok(dataset.records.len())
}

fn count_cell(value: Option<u32>) -> String {
    value.map(|count| count.to_string()).unwrap_or_default()
}
