//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `dayline-provider-google`) using JSON over stdin/stdout.
//!
//! Providers manage their own credentials and tokens. Core only passes the
//! account name from its config.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::debug;

use crate::date_range::DateRange;
use crate::error::{DaylineError, DaylineResult, ProviderError};
use crate::event::RawEvent;
use crate::remote::protocol::{
    Command, ErrorKind, ListEvents, ListSources, ProviderCommand, Request, Response,
};
use crate::source::{CalendarSource, CalendarSourceProvider};

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct Provider {
    name: String,
    account: Option<String>,
    timeout: Duration,
}

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider {
            name: name.to_string(),
            account: None,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_account(mut self, account: Option<String>) -> Self {
        self.account = account;
        self
    }

    /// Upper bound for a single provider call. A source that never answers
    /// would otherwise stall the whole merge.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binary_name(&self) -> String {
        format!("dayline-provider-{}", self.name)
    }

    fn binary_path(&self) -> DaylineResult<std::path::PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| DaylineError::ProviderNotInstalled(binary_name))
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> DaylineResult<C::Response> {
        timeout(self.timeout, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| DaylineError::ProviderTimeout(self.timeout.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> DaylineResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| DaylineError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| DaylineError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        debug!(provider = %self.name, ?command, "Calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DaylineError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DaylineError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(DaylineError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        parse_response(&response_str)
    }
}

fn parse_response<R: serde::de::DeserializeOwned>(response_str: &str) -> DaylineResult<R> {
    if response_str.trim().is_empty() {
        return Err(DaylineError::Provider("Provider returned no response".into()));
    }

    let response: Response<R> = serde_json::from_str(response_str)
        .map_err(|e| DaylineError::Provider(format!("Failed to parse response: {}", e)))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::Error {
            kind: ErrorKind::AuthExpired,
            error,
        } => Err(DaylineError::AuthExpired(error)),
        Response::Error {
            kind: ErrorKind::Transient,
            error,
        } => Err(DaylineError::Provider(error)),
    }
}

#[async_trait]
impl CalendarSourceProvider for Provider {
    async fn list_sources(&self) -> Result<Vec<CalendarSource>, ProviderError> {
        self.call(ListSources {
            account: self.account.clone(),
        })
        .await
        .map_err(ProviderError::from)
    }

    async fn list_events(
        &self,
        source_id: &str,
        window: &DateRange,
    ) -> Result<Vec<RawEvent>, ProviderError> {
        self.call(ListEvents {
            account: self.account.clone(),
            source_id: source_id.to_string(),
            from: window.from,
            to: window.to,
        })
        .await
        .map_err(ProviderError::from)
    }
}
