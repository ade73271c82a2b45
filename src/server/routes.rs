//! Route table for the status API.

use std::sync::Mutex;

use crate::data::cache::FreshnessCache;
use crate::server::api;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

pub fn route_request(
    method: &str,
    path_and_query: &str,
    cache: &Mutex<FreshnessCache>,
    latest_n: usize,
) -> HttpResponse {
    let (path, query_string) = match path_and_query.split_once('?') {
        Some((path, query)) => (path, query),
        None => (path_and_query, ""),
    };

    match (method, path) {
        ("GET", "/api/health") => ok_json(api::health_payload()),
        ("GET", "/api/status") => match api::status_payload(cache) {
            Ok(payload) => ok_json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err),
        },
        ("GET", "/api/zones") => match api::zones_payload(cache) {
            Ok(payload) => ok_json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err),
        },
        ("GET", "/api/pincodes") => match api::pincodes_payload(cache) {
            Ok(payload) => ok_json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err),
        },
        ("GET", "/api/report") => match api::report_payload(query_string, cache, latest_n) {
            Ok(report) => HttpResponse {
                status_code: 200,
                status_text: "OK",
                content_type: "text/plain; charset=utf-8",
                body: report,
            },
            Err(api::ReportQueryError::BadRequest(msg)) => {
                error_response(400, "Bad Request", &msg)
            }
            Err(api::ReportQueryError::Unavailable(msg)) => {
                error_response(503, "Service Unavailable", &msg)
            }
            Err(api::ReportQueryError::Internal(msg)) => {
                error_response(500, "Internal Server Error", &msg)
            }
        },
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn ok_json(body: String) -> HttpResponse {
    HttpResponse {
        status_code: 200,
        status_text: "OK",
        content_type: "application/json",
        body,
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    let body = serde_json::json!({
        "status": "error",
        "message": message,
    });
    let body_str = serde_json::to_string_pretty(&body)
        .unwrap_or_else(|_| r#"{"status":"error"}"#.to_string());
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: body_str,
    }
}
