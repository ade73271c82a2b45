//! Environment-driven configuration with code defaults. Every knob is a
//! BEDWATCH_* variable, so deployments stay config-file free.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_STATE_PATH: &str = "data/bedwatch_state.json";
pub const DEFAULT_EXPORT_PATH: &str = "data/bedwatch_export.csv";
const DEFAULT_API_URL: &str = "https://api.telegram.org";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_REFRESH_SECONDS: u64 = 60;
const DEFAULT_BROADCAST_MINUTES: i64 = 60;
const DEFAULT_LATEST_N: usize = 1;
const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_POLL_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Feed,
    File,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source: SourceKind,
    pub feed_url: Option<String>,
    pub source_path: Option<PathBuf>,
    pub state_path: PathBuf,
    pub api_url: String,
    pub bot_token: Option<String>,
    pub broadcast_chat: Option<i64>,
    pub refresh_seconds: u64,
    pub broadcast_minutes: i64,
    pub latest_n: usize,
    pub bind_addr: String,
    pub fetch_timeout_seconds: u64,
    pub poll_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let source = match env::var("BEDWATCH_SOURCE").as_deref() {
            Ok("file") => SourceKind::File,
            _ => SourceKind::Feed,
        };
        Self {
            source,
            feed_url: env::var("BEDWATCH_FEED_URL").ok(),
            source_path: env::var("BEDWATCH_SOURCE_PATH").ok().map(PathBuf::from),
            state_path: env::var("BEDWATCH_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH)),
            api_url: env::var("BEDWATCH_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            bot_token: env::var("BEDWATCH_BOT_TOKEN").ok(),
            broadcast_chat: env::var("BEDWATCH_BROADCAST_CHAT")
                .ok()
                .and_then(|raw| raw.parse().ok()),
            refresh_seconds: parse_env("BEDWATCH_REFRESH_SECONDS", DEFAULT_REFRESH_SECONDS),
            broadcast_minutes: parse_env("BEDWATCH_BROADCAST_MINUTES", DEFAULT_BROADCAST_MINUTES),
            latest_n: parse_env("BEDWATCH_LATEST_N", DEFAULT_LATEST_N),
            bind_addr: env::var("BEDWATCH_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            fetch_timeout_seconds: DEFAULT_FETCH_TIMEOUT_SECONDS,
            poll_timeout_seconds: DEFAULT_POLL_TIMEOUT_SECONDS,
        }
    }
}

fn parse_env<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            eprintln!("invalid {name} '{raw}', using the default");
            default
        }),
        Err(_) => default,
    }
}
