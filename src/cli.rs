//! Command dispatch: bedwatch <run|serve|fetch|query|export>.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use crate::bot::transport::HttpChatTransport;
use crate::bot::{run_bot, BotOptions};
use crate::config::{Config, SourceKind, DEFAULT_EXPORT_PATH};
use crate::data::cache::FreshnessCache;
use crate::export::export_csv;
use crate::report::query::{query, ReportFilter};
use crate::report::render::render_report;
use crate::server;
use crate::sheet::source::{FeedSource, FileSource, RowSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Run,
    Serve,
    Fetch,
    Query,
    Export,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("run") => Some(Command::Run),
        Some("serve") => Some(Command::Serve),
        Some("fetch") => Some(Command::Fetch),
        Some("query") => Some(Command::Query),
        Some("export") => Some(Command::Export),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Run) => handle_run(),
        Some(Command::Serve) => handle_serve(),
        Some(Command::Fetch) => handle_fetch(),
        Some(Command::Query) => handle_query(args),
        Some(Command::Export) => handle_export(args),
        None => {
            eprintln!("usage: bedwatch <run|serve|fetch|query|export>");
            2
        }
    }
}

fn build_source(config: &Config) -> Result<Box<dyn RowSource>, String> {
    match config.source {
        SourceKind::Feed => {
            let Some(url) = config.feed_url.as_deref() else {
                return Err(
                    "BEDWATCH_FEED_URL is required when BEDWATCH_SOURCE is 'feed'".to_string()
                );
            };
            let source = FeedSource::new(url, Duration::from_secs(config.fetch_timeout_seconds))
                .map_err(|err| err.to_string())?;
            Ok(Box::new(source))
        }
        SourceKind::File => {
            let Some(path) = config.source_path.clone() else {
                return Err(
                    "BEDWATCH_SOURCE_PATH is required when BEDWATCH_SOURCE is 'file'".to_string()
                );
            };
            Ok(Box::new(FileSource::new(path)))
        }
    }
}

fn open_cache(config: &Config) -> Result<FreshnessCache, String> {
    let source = build_source(config)?;
    Ok(FreshnessCache::open(
        source,
        config.state_path.clone(),
        config.refresh_seconds,
    ))
}

fn handle_run() -> i32 {
    let config = Config::from_env();
    let Some(token) = config.bot_token.clone() else {
        eprintln!("BEDWATCH_BOT_TOKEN is required for 'run'");
        return 1;
    };
    let cache = match open_cache(&config) {
        Ok(cache) => Arc::new(Mutex::new(cache)),
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let transport =
        match HttpChatTransport::new(&config.api_url, &token, config.poll_timeout_seconds) {
            Ok(transport) => Arc::new(transport),
            Err(err) => {
                eprintln!("failed to build chat transport: {err}");
                return 1;
            }
        };
    run_bot(
        cache,
        transport,
        BotOptions {
            latest_n: config.latest_n,
            broadcast_chat: config.broadcast_chat,
            broadcast_interval_minutes: config.broadcast_minutes,
        },
    )
}

fn handle_serve() -> i32 {
    let config = Config::from_env();
    let cache = match open_cache(&config) {
        Ok(cache) => Arc::new(Mutex::new(cache)),
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    match server::run_server(&config.bind_addr, cache, config.latest_n) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_fetch() -> i32 {
    let config = Config::from_env();
    let mut cache = match open_cache(&config) {
        Ok(cache) => cache,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    match cache.refresh(Utc::now()) {
        Ok(summary) => {
            println!(
                "fetch complete: rows={}, retained={}, dropped_not_interested={}, dropped_type={}, dropped_malformed={}, zones={}, pincodes={}",
                summary.total_rows,
                summary.retained,
                summary.dropped_not_interested,
                summary.dropped_type,
                summary.dropped_malformed,
                summary.known_zones,
                summary.known_pincodes
            );
            0
        }
        Err(err) => {
            eprintln!("fetch failed: {err}");
            1
        }
    }
}

fn handle_query(args: &[String]) -> i32 {
    let filter = match (args.get(2).map(String::as_str), args.get(3)) {
        (Some("zone"), Some(_)) => ReportFilter::Zone(args[3..].join(" ")),
        (Some("pincode"), Some(_)) => ReportFilter::Pincode(args[3..].join(" ")),
        _ => {
            eprintln!("usage: bedwatch query <zone|pincode> <value>");
            return 2;
        }
    };
    let config = Config::from_env();
    let mut cache = match open_cache(&config) {
        Ok(cache) => cache,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    match cache.dataset(Utc::now()) {
        Ok(dataset) => {
            println!(
                "{}",
                render_report(filter.value(), &query(dataset, &filter, config.latest_n))
            );
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn handle_export(args: &[String]) -> i32 {
    let path = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH));
    let config = Config::from_env();
    let mut cache = match open_cache(&config) {
        Ok(cache) => cache,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    match export_csv(&mut cache, Utc::now(), &path) {
        Ok(written) => {
            println!(
                "export complete: {written} record(s) written to {}",
                path.display()
            );
            0
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}
