//! Persisted freshness metadata.
//!
//! One small JSON file overwritten wholesale on every update. Readers must
//! tolerate the file being absent or malformed: both mean "never fetched".

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FreshnessState {
    pub last_fetch_time: Option<DateTime<Utc>>,
    pub next_broadcast_time: Option<DateTime<Utc>>,
    pub known_zones: Vec<String>,
    pub known_pincodes: Vec<String>,
}

impl FreshnessState {
    /// State on first run: no fetch, no schedule, no known filter values.
    pub fn never_fetched() -> Self {
        Self::default()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    last_fetch_time: Option<String>,
    #[serde(default)]
    next_broadcast_time: Option<String>,
    #[serde(default)]
    known_zones: Vec<String>,
    #[serde(default)]
    known_pincodes: Vec<String>,
}

#[derive(Debug)]
pub enum StateError {
    Serialize(serde_json::Error),
    Write(std::io::Error),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize state: {err}"),
            Self::Write(err) => write!(f, "failed to write state file: {err}"),
        }
    }
}

pub fn load_state(path: impl AsRef<Path>) -> FreshnessState {
    let Ok(raw) = fs::read_to_string(path) else {
        return FreshnessState::never_fetched();
    };
    let Ok(file) = serde_json::from_str::<StateFile>(&raw) else {
        return FreshnessState::never_fetched();
    };
    FreshnessState {
        last_fetch_time: file.last_fetch_time.as_deref().and_then(parse_time),
        next_broadcast_time: file.next_broadcast_time.as_deref().and_then(parse_time),
        known_zones: file.known_zones,
        known_pincodes: file.known_pincodes,
    }
}

pub fn save_state(path: impl AsRef<Path>, state: &FreshnessState) -> Result<(), StateError> {
    let file = StateFile {
        last_fetch_time: state.last_fetch_time.map(format_time),
        next_broadcast_time: state.next_broadcast_time.map(format_time),
        known_zones: state.known_zones.clone(),
        known_pincodes: state.known_pincodes.clone(),
    };
    let serialized = serde_json::to_string_pretty(&file).map_err(StateError::Serialize)?;
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(StateError::Write)?;
        }
    }
    fs::write(path, serialized).map_err(StateError::Write)
}

pub fn format_time(time: DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIME_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
