//! Zone/pincode filtering, per-hospital grouping and latest-status selection.

use std::collections::HashMap;

use crate::data::record::{Dataset, NormalizedRecord};

/// Filter key for a report: exact string equality on zone or pincode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFilter {
    Zone(String),
    Pincode(String),
}

impl ReportFilter {
    pub fn value(&self) -> &str {
        match self {
            Self::Zone(value) | Self::Pincode(value) => value,
        }
    }

    fn matches(&self, record: &NormalizedRecord) -> bool {
        match self {
            Self::Zone(value) => record.zone == *value,
            Self::Pincode(value) => record.pincode == *value,
        }
    }
}

/// Latest status logs for one hospital, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct HospitalStatus {
    pub hospital: String,
    pub entries: Vec<NormalizedRecord>,
}

impl HospitalStatus {
    /// Newest entry; grouping guarantees at least one.
    pub fn latest(&self) -> &NormalizedRecord {
        &self.entries[0]
    }

    /// Availability is judged on the latest entry only.
    pub fn has_beds(&self) -> bool {
        self.latest().has_beds()
    }
}

/// Query result, distinguishing "no such zone/pincode" from "hospitals
/// tracked but nothing free".
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    NoHospitals,
    NoneAvailable { tracked: usize },
    Available {
        hospitals: Vec<HospitalStatus>,
        tracked: usize,
    },
}

/// Group matching records by hospital (first-seen order), keep the
/// `latest_n` newest per hospital, and apply the availability rule.
pub fn query(dataset: &Dataset, filter: &ReportFilter, latest_n: usize) -> QueryOutcome {
    let latest_n = latest_n.max(1);

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&NormalizedRecord>> = HashMap::new();
    for record in &dataset.records {
        if !filter.matches(record) {
            continue;
        }
        if !groups.contains_key(&record.hospital) {
            order.push(record.hospital.clone());
        }
        groups.entry(record.hospital.clone()).or_default().push(record);
    }

    if order.is_empty() {
        return QueryOutcome::NoHospitals;
    }
    let tracked = order.len();

    let mut available = Vec::new();
    for hospital in order {
        let mut entries = groups.remove(&hospital).unwrap_or_default();
        // stable sort: sheet order breaks timestamp ties, unparsed sort last
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(latest_n);
        let status = HospitalStatus {
            hospital,
            entries: entries.into_iter().cloned().collect(),
        };
        if status.has_beds() {
            available.push(status);
        }
    }

    if available.is_empty() {
        QueryOutcome::NoneAvailable { tracked }
    } else {
        QueryOutcome::Available {
            hospitals: available,
            tracked,
        }
    }
}
