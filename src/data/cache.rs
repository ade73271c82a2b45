//! Freshness policy around the normalized dataset.
//!
//! Refetch when stale, swap the dataset wholesale, fall back to the last
//! good dataset when the source fails. The cache owns the persisted
//! `FreshnessState` and is the only writer of it.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::data::normalize::normalize;
use crate::data::record::Dataset;
use crate::data::state::{load_state, save_state, FreshnessState};
use crate::sheet::source::{FetchError, RowSource};

/// Returned while no fetch has ever succeeded, so callers can tell
/// "no data yet" apart from "no hospitals match".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUnavailable;

impl fmt::Display for DataUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no dataset has been fetched yet")
    }
}

/// Summary of one successful refresh, for logs and the fetch command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSummary {
    pub total_rows: usize,
    pub retained: usize,
    pub dropped_not_interested: usize,
    pub dropped_type: usize,
    pub dropped_malformed: usize,
    pub known_zones: usize,
    pub known_pincodes: usize,
}

pub struct FreshnessCache {
    source: Box<dyn RowSource>,
    state_path: PathBuf,
    refresh_interval: Duration,
    state: FreshnessState,
    dataset: Option<Dataset>,
}

impl FreshnessCache {
    pub fn open(
        source: Box<dyn RowSource>,
        state_path: impl Into<PathBuf>,
        refresh_interval_seconds: u64,
    ) -> Self {
        let state_path = state_path.into();
        let state = load_state(&state_path);
        Self {
            source,
            state_path,
            refresh_interval: Duration::seconds(refresh_interval_seconds as i64),
            state,
            dataset: None,
        }
    }

    pub fn state(&self) -> &FreshnessState {
        &self.state
    }

    /// Record count of the in-memory dataset, if any. Never fetches.
    pub fn cached_record_count(&self) -> Option<usize> {
        self.dataset.as_ref().map(|dataset| dataset.records.len())
    }

    /// The current dataset, refetching first when the cache is stale. A
    /// failed refetch falls back to the previous dataset; only a cache that
    /// has never held data reports `DataUnavailable`.
    pub fn dataset(&mut self, now: DateTime<Utc>) -> Result<&Dataset, DataUnavailable> {
        if self.is_stale(now) {
            if let Err(err) = self.refresh(now) {
                warn!("refresh failed, serving previous dataset: {err}");
            }
        }
        self.dataset.as_ref().ok_or(DataUnavailable)
    }

    /// Unconditional refetch; also used by the one-shot fetch command.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Result<RefreshSummary, FetchError> {
        let rows = self.source.fetch_rows()?;
        let report = normalize(&rows);
        for malformed in &report.malformed {
            warn!("skipped row {}: {}", malformed.row_index, malformed.reason);
        }

        let dataset = Dataset::new(report.records, now);
        let known_zones = dataset.distinct_zones();
        let known_pincodes = dataset.distinct_pincodes();
        let summary = RefreshSummary {
            total_rows: report.total_rows,
            retained: report.retained,
            dropped_not_interested: report.dropped_not_interested,
            dropped_type: report.dropped_type,
            dropped_malformed: report.dropped_malformed,
            known_zones: known_zones.len(),
            known_pincodes: known_pincodes.len(),
        };

        self.state.known_zones = known_zones;
        self.state.known_pincodes = known_pincodes;
        self.state.last_fetch_time = Some(now);
        self.dataset = Some(dataset);
        if let Err(err) = save_state(&self.state_path, &self.state) {
            warn!("failed to persist freshness state: {err}");
        }
        info!(
            "dataset refreshed: {} of {} rows retained",
            summary.retained, summary.total_rows
        );
        Ok(summary)
    }

    /// Whether the scheduled broadcast is due. No stored schedule fires at
    /// the next tick.
    pub fn broadcast_due(&self, now: DateTime<Utc>) -> bool {
        match self.state.next_broadcast_time {
            None => true,
            Some(next) => now >= next,
        }
    }

    pub fn schedule_next_broadcast(&mut self, now: DateTime<Utc>, interval_minutes: i64) {
        self.state.next_broadcast_time = Some(now + Duration::minutes(interval_minutes));
        if let Err(err) = save_state(&self.state_path, &self.state) {
            warn!("failed to persist broadcast schedule: {err}");
        }
    }

    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        // The persisted fetch time outlives the in-memory dataset across
        // restarts; without records a "fresh" timestamp cannot serve anyone.
        if self.dataset.is_none() {
            return true;
        }
        match self.state.last_fetch_time {
            None => true,
            Some(last) => now.signed_duration_since(last) > self.refresh_interval,
        }
    }
}
