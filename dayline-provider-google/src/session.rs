//! Google OAuth session, stored per account at
//! `<config>/dayline/providers/google/session/<account>.toml`.
//!
//! The file is supplied by the user. An expired access token is refreshed
//! against Google's token endpoint and written back.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AuthExpired;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Refresh this long before the recorded expiry so a request doesn't race it.
const EXPIRY_MARGIN_SECS: i64 = 60;

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("dayline")
        .join("providers")
        .join("google"))
}

fn session_dir() -> Result<PathBuf> {
    Ok(base_dir()?.join("session"))
}

#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    data: SessionData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl Session {
    /// Load the session for `account` (or the only session on disk) and
    /// refresh it if it has expired.
    pub async fn load_valid(account: Option<&str>) -> Result<Self> {
        let path = session_path(&session_dir()?, account)?;
        let mut session = Self::load_from(&path)?;

        if session.is_expired_at(Utc::now()) {
            session.refresh().await?;
        }

        Ok(session)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AuthExpired(format!(
                "Google session not found at {}",
                path.display()
            ))
            .into());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read Google session from {}", path.display()))?;

        let data: SessionData = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse Google session from {}", path.display()))?;

        Ok(Session {
            path: path.to_path_buf(),
            data,
        })
    }

    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write session to {}", self.path.display()))?;

        // Owner-only (0600), the file holds OAuth tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", self.path.display()))?;
        }

        Ok(())
    }

    pub fn access_token(&self) -> &str {
        &self.data.access_token
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.data.expires_at
    }

    async fn refresh(&mut self) -> Result<()> {
        let (Some(client_id), Some(client_secret)) =
            (&self.data.client_id, &self.data.client_secret)
        else {
            return Err(AuthExpired(
                "access token expired and the session has no client credentials to refresh it"
                    .into(),
            )
            .into());
        };

        debug!(path = %self.path.display(), "Refreshing Google access token");

        let response = reqwest::Client::new()
            .post(TOKEN_URL)
            .form(&[
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("refresh_token", self.data.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .context("Failed to send token refresh request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            // invalid_grant and friends: the refresh token itself is no good
            if status.is_client_error() {
                let message = format!("token refresh rejected ({status}): {error_text}");
                return Err(AuthExpired(message).into());
            }
            anyhow::bail!("Failed to refresh token ({status}): {error_text}");
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .context("Failed to parse token refresh response")?;

        self.apply_refresh(refreshed, Utc::now());
        self.save()?;
        info!("Refreshed Google access token");

        Ok(())
    }

    fn apply_refresh(&mut self, refreshed: RefreshResponse, now: DateTime<Utc>) {
        self.data.access_token = refreshed.access_token;
        self.data.expires_at = now + Duration::seconds(refreshed.expires_in);
        // Google usually keeps the existing refresh token
        if let Some(refresh_token) = refreshed.refresh_token.filter(|t| !t.is_empty()) {
            self.data.refresh_token = refresh_token;
        }
    }
}

/// Session file for `account`. Without an account, the only session file in
/// `dir` is used.
fn session_path(dir: &Path, account: Option<&str>) -> Result<PathBuf> {
    if let Some(account) = account {
        let slug = account.replace(['/', '\\', ':'], "_");
        return Ok(dir.join(format!("{slug}.toml")));
    }

    let mut candidates: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .collect(),
        Err(_) => Vec::new(),
    };

    match candidates.len() {
        0 => Err(AuthExpired(format!("no Google session found in {}", dir.display())).into()),
        1 => Ok(candidates.remove(0)),
        n => anyhow::bail!(
            "{n} Google sessions found in {}, set `account` in the dayline config",
            dir.display()
        ),
    }
}
