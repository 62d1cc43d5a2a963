//! Defines the JSON protocol used for communication between dayline
//! and provider binaries over stdin/stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::RawEvent;
use crate::source::CalendarSource;
use chrono::{DateTime, Utc};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ListSources,
    ListEvents,
}

/// Request sent from dayline to provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Whether a failed request should be retried with the same session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AuthExpired,
    Transient,
}

/// Response sent from provider to dayline.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success {
        data: T,
    },
    Error {
        #[serde(default = "default_error_kind")]
        kind: ErrorKind,
        error: String,
    },
}

fn default_error_kind() -> ErrorKind {
    ErrorKind::Transient
}

const UNENCODABLE_ERROR: &str =
    r#"{"status":"error","kind":"transient","error":"Failed to encode response"}"#;

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data })
            .unwrap_or_else(|_| UNENCODABLE_ERROR.to_string())
    }
}

impl Response<()> {
    pub fn error(kind: ErrorKind, msg: &str) -> String {
        serde_json::to_string(&Response::<()>::Error {
            kind,
            error: msg.to_string(),
        })
        .unwrap_or_else(|_| UNENCODABLE_ERROR.to_string())
    }
}

/// List every calendar the account can see.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListSources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl ProviderCommand for ListSources {
    type Response = Vec<CalendarSource>;
    fn command() -> Command {
        Command::ListSources
    }
}

/// List the events of one calendar within `[from, to)`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    pub source_id: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<RawEvent>;
    fn command() -> Command {
        Command::ListEvents
    }
}
