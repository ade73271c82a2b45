//! Row sources behind the fetch boundary.
//!
//! `FeedSource` pulls the sheet over HTTP with a bounded timeout; `FileSource`
//! reads a local JSON array of rows for development and tests. The cache only
//! sees the `RowSource` trait.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::sheet::feed::parse_list_feed;
use crate::sheet::RawRow;

#[derive(Debug)]
pub enum FetchError {
    Http(reqwest::Error),
    Status(u16),
    Read(std::io::Error),
    Parse(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "feed request failed: {err}"),
            Self::Status(code) => write!(f, "feed request returned HTTP {code}"),
            Self::Read(err) => write!(f, "failed to read rows file: {err}"),
            Self::Parse(msg) => write!(f, "failed to parse rows: {msg}"),
        }
    }
}

pub trait RowSource: Send {
    fn fetch_rows(&self) -> Result<Vec<RawRow>, FetchError>;
}

/// Remote sheet feed over HTTP.
pub struct FeedSource {
    url: String,
    client: reqwest::blocking::Client,
}

impl FeedSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Http)?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl RowSource for FeedSource {
    fn fetch_rows(&self) -> Result<Vec<RawRow>, FetchError> {
        let response = self.client.get(&self.url).send().map_err(FetchError::Http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text().map_err(FetchError::Http)?;
        parse_list_feed(&body).map_err(FetchError::Parse)
    }
}

/// Local JSON file holding an array of column->cell objects.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RowSource for FileSource {
    fn fetch_rows(&self) -> Result<Vec<RawRow>, FetchError> {
        let raw = fs::read_to_string(&self.path).map_err(FetchError::Read)?;
        serde_json::from_str::<Vec<RawRow>>(&raw).map_err(|err| FetchError::Parse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{FileSource, RowSource};

    fn unique_temp_path(name: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("bedwatch-{name}-{stamp}.json"))
    }

    #[test]
    fn file_source_reads_row_array() {
        let path = unique_temp_path("file-source");
        fs::write(&path, r#"[{"hospitalname": "A", "zone": "EAST"}]"#).expect("fixture write");

        let rows = FileSource::new(&path).fetch_rows().expect("rows should load");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("zone").map(String::as_str), Some("EAST"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn file_source_missing_file_is_a_read_error() {
        let source = FileSource::new(unique_temp_path("missing"));
        let err = source.fetch_rows().unwrap_err();
        assert!(err.to_string().contains("read"));
    }

    #[test]
    fn file_source_rejects_non_array_payloads() {
        let path = unique_temp_path("not-array");
        fs::write(&path, r#"{"hospitalname": "A"}"#).expect("fixture write");

        let err = FileSource::new(&path).fetch_rows().unwrap_err();
        assert!(err.to_string().contains("parse"));

        let _ = fs::remove_file(&path);
    }
}
