//! Canonical bed-report records and the immutable per-fetch dataset.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Cell value the sheet uses when a count is unknown.
pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub hospital: String,
    pub zone: String,
    pub pincode: String,
    pub phonenumber: String,
    pub general: Option<u32>,
    pub hdu: Option<u32>,
    pub icu: Option<u32>,
    pub icuwithventilator: Option<u32>,
    pub remarks: String,
    /// Verbatim timestamp cell, kept for display.
    pub timestamp_raw: String,
    /// Parsed submission time used for ordering; `None` when the cell does
    /// not parse, which sorts before every parsed time.
    pub timestamp: Option<NaiveDateTime>,
    pub report_type: String,
}

impl NormalizedRecord {
    /// Sum of the four bed counts with unknown fields counted as zero.
    /// Used only for the availability check, never for display.
    pub fn bed_total(&self) -> u32 {
        self.general.unwrap_or(0)
            + self.hdu.unwrap_or(0)
            + self.icu.unwrap_or(0)
            + self.icuwithventilator.unwrap_or(0)
    }

    pub fn has_beds(&self) -> bool {
        self.bed_total() > 0
    }
}

/// All retained records for one fetch cycle. Replaced wholesale on refresh,
/// never mutated record-by-record.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub records: Vec<NormalizedRecord>,
    pub fetched_at: DateTime<Utc>,
}

impl Dataset {
    pub fn new(records: Vec<NormalizedRecord>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            records,
            fetched_at,
        }
    }

    /// Sorted distinct non-empty zones across the dataset.
    pub fn distinct_zones(&self) -> Vec<String> {
        distinct(self.records.iter().map(|record| record.zone.as_str()))
    }

    /// Sorted distinct non-empty pincodes across the dataset.
    pub fn distinct_pincodes(&self) -> Vec<String> {
        distinct(self.records.iter().map(|record| record.pincode.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
