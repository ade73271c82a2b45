//! Deterministic text rendering for chat replies and broadcasts.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::data::record::{Dataset, PLACEHOLDER};
use crate::data::state::TIME_FORMAT;
use crate::report::query::{query, HospitalStatus, QueryOutcome, ReportFilter};

/// Exact reply when a filter value matches nothing; callers rely on the
/// literal string to tell this apart from "no beds free".
pub const NO_HOSPITALS_MESSAGE: &str = "No hospitals found";

pub fn render_report(filter_value: &str, outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::NoHospitals => NO_HOSPITALS_MESSAGE.to_string(),
        QueryOutcome::NoneAvailable { tracked } => format!(
            "Bed availability for {filter_value}\n\nNo beds available in {tracked} tracked hospital(s)"
        ),
        QueryOutcome::Available { hospitals, .. } => {
            let mut message = format!("Bed availability for {filter_value}\n");
            for status in hospitals {
                let _ = write!(message, "\n{}", render_hospital(status));
            }
            message
        }
    }
}

fn render_hospital(status: &HospitalStatus) -> String {
    let mut block = format!("*{}*\n", status.hospital);
    let _ = writeln!(
        block,
        "Phone: {}",
        present_or_placeholder(&status.latest().phonenumber)
    );
    for entry in &status.entries {
        let _ = writeln!(block, "Last updated: {}", entry.timestamp_raw);
        let _ = writeln!(block, "General Beds: {}", count_cell(entry.general));
        let _ = writeln!(block, "HDU: {}", count_cell(entry.hdu));
        let _ = writeln!(block, "ICU: {}", count_cell(entry.icu));
        let _ = writeln!(block, "Ventilator ICU: {}", count_cell(entry.icuwithventilator));
        let _ = writeln!(block, "Remarks: {}", entry.remarks);
    }
    block
}

fn count_cell(value: Option<u32>) -> String {
    match value {
        Some(count) => count.to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

fn present_or_placeholder(value: &str) -> &str {
    if value.is_empty() {
        PLACEHOLDER
    } else {
        value
    }
}

/// Zone-by-zone summary with a timestamp banner, for the scheduled broadcast.
pub fn render_broadcast(dataset: &Dataset, now: DateTime<Utc>) -> String {
    let mut message = format!("Bed availability as of {}\n", now.format(TIME_FORMAT));
    let zones = dataset.distinct_zones();
    if zones.is_empty() {
        message.push_str("\nNo zones are reporting yet\n");
    } else {
        message.push('\n');
        for zone in &zones {
            let (with_beds, tracked) = zone_counts(dataset, zone);
            let _ = writeln!(message, "{zone}: {with_beds} of {tracked} hospital(s) with beds");
        }
    }
    message.push_str("\nSend /zone or /pincode for hospital details");
    message
}

fn zone_counts(dataset: &Dataset, zone: &str) -> (usize, usize) {
    match query(dataset, &ReportFilter::Zone(zone.to_string()), 1) {
        QueryOutcome::NoHospitals => (0, 0),
        QueryOutcome::NoneAvailable { tracked } => (0, tracked),
        QueryOutcome::Available { hospitals, tracked } => (hospitals.len(), tracked),
    }
}
