//! dayline-provider-google - Google Calendar provider for dayline
//!
//! This binary implements the dayline provider protocol, communicating
//! with dayline via JSON over stdin/stdout.
//!
//! The provider manages its own session:
//!   ~/.config/dayline/providers/google/session/{account}.toml

mod api;
mod commands;
mod error;
mod session;
mod types;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use dayline_core::remote::protocol::{Command, ErrorKind, Request, Response};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dayline_provider_google=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request).await,
            Err(e) => Response::error(
                ErrorKind::Transient,
                &format!("Failed to parse request: {}", e),
            ),
        };

        writeln!(stdout, "{}", response).context("Failed to write response")?;
        stdout.flush().context("Failed to flush stdout")?;
    }

    Ok(())
}

async fn handle_request(request: Request) -> String {
    debug!(command = ?request.command, "Handling request");

    let result = match request.command {
        Command::ListSources => commands::list_sources::handle(&request.params).await,
        Command::ListEvents => commands::list_events::handle(&request.params).await,
    };

    match result {
        Ok(data) => Response::success(data),
        Err(e) => {
            let kind = error::classify(&e);
            warn!(command = ?request.command, ?kind, error = %format!("{:#}", e), "Request failed");
            Response::error(kind, &format!("{:#}", e))
        }
    }
}
