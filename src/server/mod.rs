//! Read-only HTTP status API sharing the cache and renderer with the bot.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};

use tracing::{error, info};

use crate::data::cache::FreshnessCache;

pub mod api;
pub mod routes;

pub fn run_server(
    bind_addr: &str,
    cache: Arc<Mutex<FreshnessCache>>,
    latest_n: usize,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    info!("status api listening on http://{bind_addr}");

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream, &cache, latest_n) {
                    error!("request error: {err}");
                }
            }
            Err(err) => error!("connection failed: {err}"),
        }
    }

    Ok(())
}

fn handle_connection(
    stream: &mut TcpStream,
    cache: &Mutex<FreshnessCache>,
    latest_n: usize,
) -> std::io::Result<()> {
    let mut buffer = [0_u8; 16_384];
    let bytes_read = stream.read(&mut buffer)?;
    if bytes_read == 0 {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buffer[..bytes_read]);
    let request_line = request.lines().next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or("GET");
    let path = request_parts.next().unwrap_or("/");

    let response = routes::route_request(method, path, cache, latest_n).to_http_string();
    stream.write_all(response.as_bytes())?;
    stream.flush()?;
    Ok(())
}
