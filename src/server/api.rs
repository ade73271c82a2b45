//! Payload builders for the status API.

use std::sync::Mutex;

use chrono::Utc;

use crate::data::cache::FreshnessCache;
use crate::data::state::format_time;
use crate::report::query::{query, ReportFilter};
use crate::report::render::render_report;

#[derive(Debug)]
pub enum ReportQueryError {
    BadRequest(String),
    Unavailable(String),
    Internal(String),
}

pub fn health_payload() -> String {
    let body = serde_json::json!({
        "status": "ok",
        "service": "bedwatch",
        "version": env!("CARGO_PKG_VERSION"),
    });
    to_pretty(&body)
}

/// Freshness metadata only; never triggers a fetch.
pub fn status_payload(cache: &Mutex<FreshnessCache>) -> Result<String, String> {
    let guard = cache.lock().map_err(|_| "cache lock poisoned".to_string())?;
    let state = guard.state();
    let body = serde_json::json!({
        "last_fetch_time": state.last_fetch_time.map(format_time),
        "next_broadcast_time": state.next_broadcast_time.map(format_time),
        "known_zones": state.known_zones.len(),
        "known_pincodes": state.known_pincodes.len(),
        "records_cached": guard.cached_record_count(),
    });
    Ok(to_pretty(&body))
}

pub fn zones_payload(cache: &Mutex<FreshnessCache>) -> Result<String, String> {
    let guard = cache.lock().map_err(|_| "cache lock poisoned".to_string())?;
    Ok(to_pretty(&serde_json::json!({
        "zones": guard.state().known_zones,
    })))
}

pub fn pincodes_payload(cache: &Mutex<FreshnessCache>) -> Result<String, String> {
    let guard = cache.lock().map_err(|_| "cache lock poisoned".to_string())?;
    Ok(to_pretty(&serde_json::json!({
        "pincodes": guard.state().known_pincodes,
    })))
}

/// Text report for `?zone=` / `?pincode=`; refreshes the cache like any
/// other query path.
pub fn report_payload(
    query_string: &str,
    cache: &Mutex<FreshnessCache>,
    latest_n: usize,
) -> Result<String, ReportQueryError> {
    let filter = parse_report_query(query_string)?;
    let mut guard = cache
        .lock()
        .map_err(|_| ReportQueryError::Internal("cache lock poisoned".to_string()))?;
    match guard.dataset(Utc::now()) {
        Ok(dataset) => Ok(render_report(
            filter.value(),
            &query(dataset, &filter, latest_n),
        )),
        Err(err) => Err(ReportQueryError::Unavailable(err.to_string())),
    }
}

fn parse_report_query(query_string: &str) -> Result<ReportFilter, ReportQueryError> {
    for pair in query_string.split('&') {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next().unwrap_or("");
        let value = decode_component(parts.next().unwrap_or(""));
        match key {
            "zone" if !value.is_empty() => return Ok(ReportFilter::Zone(value)),
            "pincode" if !value.is_empty() => return Ok(ReportFilter::Pincode(value)),
            _ => {}
        }
    }
    Err(ReportQueryError::BadRequest(
        "expected a non-empty zone or pincode parameter".to_string(),
    ))
}

/// Minimal percent/plus decoding for filter values ("RR%20NAGAR", "RR+NAGAR").
fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'+' => {
                decoded.push(b' ');
                index += 1;
            }
            b'%' if index + 2 < bytes.len()
                && bytes[index + 1].is_ascii_hexdigit()
                && bytes[index + 2].is_ascii_hexdigit() =>
            {
                let byte = u8::from_str_radix(&raw[index + 1..index + 3], 16).unwrap_or(b'%');
                decoded.push(byte);
                index += 3;
            }
            other => {
                decoded.push(other);
                index += 1;
            }
        }
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

fn to_pretty(body: &serde_json::Value) -> String {
    serde_json::to_string_pretty(body).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::{decode_component, parse_report_query, ReportQueryError};
    use crate::report::query::ReportFilter;

    #[test]
    fn decodes_percent_and_plus_escapes() {
        assert_eq!(decode_component("RR%20NAGAR"), "RR NAGAR");
        assert_eq!(decode_component("RR+NAGAR"), "RR NAGAR");
        assert_eq!(decode_component("560034"), "560034");
        assert_eq!(decode_component("100%"), "100%");
    }

    #[test]
    fn parses_zone_and_pincode_parameters() {
        assert_eq!(
            parse_report_query("zone=EAST").ok(),
            Some(ReportFilter::Zone("EAST".to_string()))
        );
        assert_eq!(
            parse_report_query("pincode=560034").ok(),
            Some(ReportFilter::Pincode("560034".to_string()))
        );
        assert_eq!(
            parse_report_query("latest=2&zone=RR+NAGAR").ok(),
            Some(ReportFilter::Zone("RR NAGAR".to_string()))
        );
    }

    #[test]
    fn missing_or_empty_parameters_are_a_bad_request() {
        assert!(matches!(
            parse_report_query(""),
            Err(ReportQueryError::BadRequest(_))
        ));
        assert!(matches!(
            parse_report_query("zone="),
            Err(ReportQueryError::BadRequest(_))
        ));
        assert!(matches!(
            parse_report_query("hospital=A"),
            Err(ReportQueryError::BadRequest(_))
        ));
    }
}
