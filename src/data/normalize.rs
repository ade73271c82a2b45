//! Raw sheet rows -> canonical records.
//!
//! Policy for malformed rows: skip and record. A row missing a required
//! column is dropped and listed in the report; a refresh never aborts
//! because one submission is broken.

use chrono::NaiveDateTime;

use crate::data::record::{NormalizedRecord, PLACEHOLDER};
use crate::sheet::RawRow;

/// Affirmative token for the participation column. Case-sensitive substring
/// match, so form answers like "Yes, please list us" still pass.
pub const INTERESTED_TOKEN: &str = "Yes";

/// Facility categories retained in the working dataset (exact match).
pub const ACCEPTED_TYPES: &[&str] = &["Government", "Private"];

/// Timestamp formats seen in sheet submissions, form locale first.
const TIMESTAMP_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

// Source column names. The feed lowercases headers and strips spaces.
const COL_TIMESTAMP: &str = "timestamp";
const COL_HOSPITAL: &str = "hospitalname";
const COL_ZONE: &str = "zone";
const COL_PINCODE: &str = "pincode";
const COL_PHONE: &str = "phonenumber";
const COL_GENERAL: &str = "generalbeds";
const COL_HDU: &str = "hdubeds";
const COL_ICU: &str = "icubeds";
const COL_VENTILATOR: &str = "icuventilatorbeds";
const COL_REMARKS: &str = "remarks";
const COL_TYPE: &str = "type";
const COL_INTERESTED: &str = "interested";

/// Columns a row must carry to be usable at all.
const REQUIRED_COLUMNS: &[&str] = &[COL_HOSPITAL, COL_TIMESTAMP, COL_INTERESTED, COL_TYPE];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    pub row_index: usize,
    pub reason: String,
}

/// Outcome of one normalization pass: the retained records plus counters and
/// diagnostics for every dropped row.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeReport {
    pub total_rows: usize,
    pub retained: usize,
    pub dropped_not_interested: usize,
    pub dropped_type: usize,
    pub dropped_malformed: usize,
    pub malformed: Vec<MalformedRow>,
    pub records: Vec<NormalizedRecord>,
}

/// Pure function of the input rows; no side effects.
pub fn normalize(rows: &[RawRow]) -> NormalizeReport {
    let mut report = NormalizeReport {
        total_rows: rows.len(),
        retained: 0,
        dropped_not_interested: 0,
        dropped_type: 0,
        dropped_malformed: 0,
        malformed: Vec::new(),
        records: Vec::new(),
    };

    'rows: for (index, row) in rows.iter().enumerate() {
        for column in REQUIRED_COLUMNS {
            if !row.contains_key(*column) {
                report.dropped_malformed += 1;
                report.malformed.push(MalformedRow {
                    row_index: index,
                    reason: format!("missing required column '{column}'"),
                });
                continue 'rows;
            }
        }

        if !cell(row, COL_INTERESTED).contains(INTERESTED_TOKEN) {
            report.dropped_not_interested += 1;
            continue;
        }

        let report_type = cell(row, COL_TYPE).trim();
        if !ACCEPTED_TYPES.contains(&report_type) {
            report.dropped_type += 1;
            continue;
        }

        let hospital = cell(row, COL_HOSPITAL).trim();
        if hospital.is_empty() {
            report.dropped_malformed += 1;
            report.malformed.push(MalformedRow {
                row_index: index,
                reason: "empty hospital name".to_string(),
            });
            continue;
        }

        let timestamp_raw = cell(row, COL_TIMESTAMP).trim().to_string();
        report.records.push(NormalizedRecord {
            hospital: hospital.to_string(),
            zone: cell(row, COL_ZONE).trim().to_string(),
            pincode: cell(row, COL_PINCODE).trim().to_string(),
            phonenumber: cell(row, COL_PHONE).trim().to_string(),
            general: bed_count(row, COL_GENERAL),
            hdu: bed_count(row, COL_HDU),
            icu: bed_count(row, COL_ICU),
            icuwithventilator: bed_count(row, COL_VENTILATOR),
            remarks: cell(row, COL_REMARKS).trim().to_string(),
            timestamp: parse_timestamp(&timestamp_raw),
            timestamp_raw,
            report_type: report_type.to_string(),
        });
        report.retained += 1;
    }

    report
}

fn cell<'a>(row: &'a RawRow, column: &str) -> &'a str {
    row.get(column).map(String::as_str).unwrap_or("")
}

/// Placeholder, empty and unparseable cells are all "unknown", never zero.
fn bed_count(row: &RawRow, column: &str) -> Option<u32> {
    let value = cell(row, column).trim();
    if value.is_empty() || value == PLACEHOLDER {
        return None;
    }
    value.parse::<u32>().ok()
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
