//! Inbound command parsing and replies.
//!
//! `handle_command` is the catch-all boundary: callers always get a sendable
//! reply (or silence for non-commands), never an error. Internal failures
//! are logged in detail and collapsed into the generic message.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::error;

use crate::data::cache::FreshnessCache;
use crate::report::query::{query, ReportFilter};
use crate::report::render::render_report;

pub const UNAVAILABLE_MESSAGE: &str =
    "Bed data is not available yet, please try again in a minute.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong, please try again.";
pub const TEST_REPLY: &str = "200 OK!";

pub const HELP_TEXT: &str = "\
*Zone*\n\
- Send /zone to list the known zones\n\
- Send /zone <name> for the hospitals in that zone\n\
*Pincode*\n\
- Send /pincode to list the known pincodes\n\
- Send /pincode <code> for the hospitals in that pincode\n\
\n\
_Send /test to check whether the bot is online_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Zone(Option<String>),
    Pincode(Option<String>),
    Help,
    Test,
    /// Plain text or an unknown keyword; the bot stays silent.
    NotACommand,
}

/// Parse a message into a command. Keywords may carry a bot-name suffix
/// (`/zone@SomeBot`); filter values may contain spaces ("RR NAGAR").
pub fn parse_command(text: &str) -> BotCommand {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return BotCommand::NotACommand;
    }
    let mut parts = trimmed.split_whitespace();
    let Some(keyword) = parts.next() else {
        return BotCommand::NotACommand;
    };
    let keyword = keyword.split('@').next().unwrap_or(keyword);
    let argument = {
        let rest = parts.collect::<Vec<_>>().join(" ");
        if rest.is_empty() {
            None
        } else {
            Some(rest)
        }
    };
    match keyword {
        "/zone" => BotCommand::Zone(argument),
        "/pincode" => BotCommand::Pincode(argument),
        "/help" | "/start" => BotCommand::Help,
        "/test" => BotCommand::Test,
        _ => BotCommand::NotACommand,
    }
}

/// Execute a command against the shared cache. `None` means "do not reply".
pub fn handle_command(
    command: &BotCommand,
    cache: &Mutex<FreshnessCache>,
    latest_n: usize,
    now: DateTime<Utc>,
) -> Option<String> {
    match command {
        BotCommand::Zone(Some(value)) => Some(filtered_report(
            cache,
            ReportFilter::Zone(value.clone()),
            latest_n,
            now,
        )),
        BotCommand::Pincode(Some(value)) => Some(filtered_report(
            cache,
            ReportFilter::Pincode(value.clone()),
            latest_n,
            now,
        )),
        BotCommand::Zone(None) => Some(list_reply(cache, now, true)),
        BotCommand::Pincode(None) => Some(list_reply(cache, now, false)),
        BotCommand::Help => Some(HELP_TEXT.to_string()),
        BotCommand::Test => Some(TEST_REPLY.to_string()),
        BotCommand::NotACommand => None,
    }
}

fn filtered_report(
    cache: &Mutex<FreshnessCache>,
    filter: ReportFilter,
    latest_n: usize,
    now: DateTime<Utc>,
) -> String {
    let Ok(mut guard) = cache.lock() else {
        error!("cache lock poisoned while handling {filter:?}");
        return GENERIC_FAILURE_MESSAGE.to_string();
    };
    match guard.dataset(now) {
        Ok(dataset) => render_report(filter.value(), &query(dataset, &filter, latest_n)),
        Err(_) => UNAVAILABLE_MESSAGE.to_string(),
    }
}

fn list_reply(cache: &Mutex<FreshnessCache>, now: DateTime<Utc>, zones: bool) -> String {
    let Ok(mut guard) = cache.lock() else {
        error!("cache lock poisoned while listing filter values");
        return GENERIC_FAILURE_MESSAGE.to_string();
    };
    // refresh first so a first-run menu is not empty
    let _ = guard.dataset(now);
    let state = guard.state();
    let (label, keyword, values) = if zones {
        ("zone", "/zone", &state.known_zones)
    } else {
        ("pincode", "/pincode", &state.known_pincodes)
    };
    if values.is_empty() {
        return format!("No {label}s known yet, please try again in a minute.");
    }
    format!(
        "Which {label}'s hospitals do you want to check?\n{}\nReply with {keyword} <value>",
        values.join(", ")
    )
}
