//! Long-running bot: the inbound poll loop plus the broadcast scheduler
//! thread, sharing one `FreshnessCache` behind a mutex. Refresh-and-swap
//! happens under the lock, so a refresh in progress is never read half-done.

pub mod commands;
pub mod transport;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::data::cache::FreshnessCache;
use crate::report::render::render_broadcast;

use self::commands::{handle_command, parse_command, GENERIC_FAILURE_MESSAGE};
use self::transport::ChatTransport;

/// How often the scheduler thread checks whether a broadcast is due.
const BROADCAST_TICK: Duration = Duration::from_secs(15);
/// Backoff after a failed poll so a dead network does not spin the loop.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(1);

pub struct BotOptions {
    pub latest_n: usize,
    pub broadcast_chat: Option<i64>,
    pub broadcast_interval_minutes: i64,
}

/// Run the bot until the process is stopped. Each inbound update is handled
/// synchronously end-to-end; replies are best-effort.
pub fn run_bot(
    cache: Arc<Mutex<FreshnessCache>>,
    transport: Arc<dyn ChatTransport>,
    options: BotOptions,
) -> ! {
    if let Some(chat_id) = options.broadcast_chat {
        spawn_broadcast_scheduler(
            Arc::clone(&cache),
            Arc::clone(&transport),
            chat_id,
            options.broadcast_interval_minutes,
        );
    } else {
        info!("no broadcast chat configured, scheduler disabled");
    }

    info!("bot loop started");
    let mut offset = 0_i64;
    loop {
        let updates = match transport.poll_updates(offset) {
            Ok(updates) => updates,
            Err(err) => {
                warn!("poll failed: {err}");
                thread::sleep(POLL_RETRY_DELAY);
                continue;
            }
        };
        for update in updates {
            offset = offset.max(update.update_id + 1);
            if update.chat_id == 0 || update.text.trim().is_empty() {
                continue;
            }
            let command = parse_command(&update.text);
            let reply = catch_unwind(AssertUnwindSafe(|| {
                handle_command(&command, &cache, options.latest_n, Utc::now())
            }))
            .unwrap_or_else(|_| {
                error!("handler panicked on update {}", update.update_id);
                Some(GENERIC_FAILURE_MESSAGE.to_string())
            });
            if let Some(text) = reply {
                if let Err(err) = transport.send_message(update.chat_id, &text) {
                    error!("failed to send reply to chat {}: {err}", update.chat_id);
                }
            }
        }
    }
}

fn spawn_broadcast_scheduler(
    cache: Arc<Mutex<FreshnessCache>>,
    transport: Arc<dyn ChatTransport>,
    chat_id: i64,
    interval_minutes: i64,
) {
    thread::spawn(move || loop {
        thread::sleep(BROADCAST_TICK);
        let now = Utc::now();
        let due = match cache.lock() {
            Ok(guard) => guard.broadcast_due(now),
            Err(_) => {
                error!("cache lock poisoned in broadcast scheduler");
                false
            }
        };
        if !due {
            continue;
        }

        // Render under the lock, send outside it so a slow push never
        // blocks interactive queries.
        let message = match cache.lock() {
            Ok(mut guard) => guard.dataset(now).ok().map(|dataset| render_broadcast(dataset, now)),
            Err(_) => None,
        };
        match message {
            Some(text) => {
                if let Err(err) = transport.send_message(chat_id, &text) {
                    error!("broadcast to chat {chat_id} failed: {err}");
                } else {
                    info!("broadcast sent to chat {chat_id}");
                }
            }
            None => warn!("broadcast skipped, no dataset available"),
        }
        if let Ok(mut guard) = cache.lock() {
            guard.schedule_next_broadcast(now, interval_minutes);
        }
    });
}
