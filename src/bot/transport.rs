//! Chat transport boundary.
//!
//! `ChatTransport` keeps the messaging service opaque to the rest of the
//! bot; `HttpChatTransport` implements it against a Telegram-shaped Bot API
//! (`getUpdates` long poll, `sendMessage`).

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug)]
pub enum TransportError {
    Http(reqwest::Error),
    Status(u16),
    Api(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "chat request failed: {err}"),
            Self::Status(code) => write!(f, "chat endpoint returned HTTP {code}"),
            Self::Api(msg) => write!(f, "chat endpoint rejected the call: {msg}"),
        }
    }
}

/// One inbound update. `text` is empty and `chat_id` zero for non-message
/// updates; their ids still advance the poll offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUpdate {
    pub update_id: i64,
    pub chat_id: i64,
    pub text: String,
}

pub trait ChatTransport: Send + Sync {
    fn poll_updates(&self, offset: i64) -> Result<Vec<ChatUpdate>, TransportError>;
    fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError>;
}

pub struct HttpChatTransport {
    base_url: String,
    poll_timeout_seconds: u64,
    client: reqwest::blocking::Client,
}

impl HttpChatTransport {
    /// `api_url` is the service root (e.g. https://api.telegram.org); the
    /// bot token becomes part of the method path.
    pub fn new(api_url: &str, token: &str, poll_timeout_seconds: u64) -> Result<Self, TransportError> {
        // client timeout must outlive the server-side long-poll window
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(poll_timeout_seconds + 20))
            .build()
            .map_err(TransportError::Http)?;
        Ok(Self {
            base_url: format!("{}/bot{token}", api_url.trim_end_matches('/')),
            poll_timeout_seconds,
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateEnvelope {
    update_id: i64,
    #[serde(default)]
    message: Option<MessageEnvelope>,
}

#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    chat: ChatEnvelope,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatEnvelope {
    id: i64,
}

fn envelope_to_update(envelope: UpdateEnvelope) -> ChatUpdate {
    let (chat_id, text) = match envelope.message {
        Some(message) => (message.chat.id, message.text.unwrap_or_default()),
        None => (0, String::new()),
    };
    ChatUpdate {
        update_id: envelope.update_id,
        chat_id,
        text,
    }
}

fn api_rejection(description: Option<String>) -> TransportError {
    TransportError::Api(description.unwrap_or_else(|| "unknown error".to_string()))
}

impl ChatTransport for HttpChatTransport {
    fn poll_updates(&self, offset: i64) -> Result<Vec<ChatUpdate>, TransportError> {
        let url = format!("{}/getUpdates", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", self.poll_timeout_seconds.to_string()),
            ])
            .send()
            .map_err(TransportError::Http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        let payload: ApiResponse<Vec<UpdateEnvelope>> =
            response.json().map_err(TransportError::Http)?;
        if !payload.ok {
            return Err(api_rejection(payload.description));
        }
        Ok(payload
            .result
            .unwrap_or_default()
            .into_iter()
            .map(envelope_to_update)
            .collect())
    }

    fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        let url = format!("{}/sendMessage", self.base_url);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(TransportError::Http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        let payload: ApiResponse<serde_json::Value> =
            response.json().map_err(TransportError::Http)?;
        if !payload.ok {
            return Err(api_rejection(payload.description));
        }
        Ok(())
    }
}
