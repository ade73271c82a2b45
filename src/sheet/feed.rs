//! Parse the spreadsheet "list feed" JSON into raw rows.
//!
//! The feed wraps each row in `feed.entry[]`; cell columns are the keys with
//! a `gsx$` prefix and the cell text sits under `$t`. Column names arrive
//! already lowercased with spaces stripped.

use serde_json::Value;

use crate::sheet::RawRow;

const GSX_PREFIX: &str = "gsx$";

/// Parse a list-feed document into ordered rows. An absent `entry` array is
/// an empty sheet, not an error; a document without a `feed` object is.
pub fn parse_list_feed(input: &str) -> Result<Vec<RawRow>, String> {
    let payload: Value =
        serde_json::from_str(input).map_err(|err| format!("invalid feed json: {err}"))?;
    let feed = payload
        .get("feed")
        .ok_or_else(|| "expected top-level 'feed' object".to_string())?;
    let entries = match feed.get("entry") {
        None => return Ok(Vec::new()),
        Some(entries) => entries
            .as_array()
            .ok_or_else(|| "expected 'feed.entry' to be an array".to_string())?,
    };

    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(object) = entry.as_object() else {
            continue;
        };
        let mut row = RawRow::new();
        for (key, value) in object {
            let Some(column) = key.strip_prefix(GSX_PREFIX) else {
                continue;
            };
            let cell = value.get("$t").and_then(Value::as_str).unwrap_or("");
            row.insert(column.to_string(), cell.to_string());
        }
        rows.push(row);
    }
    Ok(rows)
}
