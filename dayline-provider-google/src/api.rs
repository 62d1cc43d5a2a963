//! Minimal Google Calendar API v3 client.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use dayline_core::{CalendarSource, RawEvent};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::AuthExpired;
use crate::types::{CalendarListPage, ErrorBody, EventsPage};

const API_BASE: &str = "https://www.googleapis.com/calendar/v3/";

/// 403 reasons that clear up by waiting, not by signing in again.
const RETRYABLE_FORBIDDEN_REASONS: &[&str] = &[
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "quotaExceeded",
    "dailyLimitExceeded",
];

pub struct GoogleApi {
    http: reqwest::Client,
    access_token: String,
    base: Url,
}

impl GoogleApi {
    pub fn new(access_token: &str) -> Result<Self> {
        Ok(GoogleApi {
            http: reqwest::Client::new(),
            access_token: access_token.to_string(),
            base: Url::parse(API_BASE).context("Invalid API base URL")?,
        })
    }

    pub async fn calendar_list(&self) -> Result<Vec<CalendarSource>> {
        let mut sources = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = calendar_list_url(&self.base, page_token.as_deref())?;
            let page: CalendarListPage = self.get(url).await.context("Failed to list calendars")?;

            sources.extend(page.items.into_iter().map(CalendarSource::from));
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(sources)
    }

    pub async fn events(
        &self,
        calendar_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<RawEvent>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = events_url(&self.base, calendar_id, from, to, page_token.as_deref())?;
            let page: EventsPage = self
                .get(url)
                .await
                .with_context(|| format!("Failed to list events of {calendar_id}"))?;

            events.extend(page.items);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(calendar_id, count = events.len(), "Fetched events");
        Ok(events)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("Request to Google Calendar failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if is_auth_failure(status, &body) {
                let message = format!("Google Calendar returned {status}: {body}");
                return Err(AuthExpired(message).into());
            }
            anyhow::bail!("Google Calendar returned {status}: {body}");
        }

        response
            .json()
            .await
            .context("Failed to parse Google Calendar response")
    }
}

/// Whether a failed request needs a new sign-in rather than a retry.
///
/// Google answers 403 both for missing permissions and for rate and quota
/// limits; the body's `error.errors[].reason` tells them apart.
fn is_auth_failure(status: StatusCode, body: &str) -> bool {
    match status {
        StatusCode::UNAUTHORIZED => true,
        StatusCode::FORBIDDEN => {
            let body: ErrorBody = serde_json::from_str(body).unwrap_or_default();
            let retryable = body
                .reasons()
                .any(|reason| RETRYABLE_FORBIDDEN_REASONS.contains(&reason));
            if retryable {
                debug!(%status, "Rate or quota limit, not a session problem");
            }
            !retryable
        }
        _ => false,
    }
}

fn calendar_list_url(base: &Url, page_token: Option<&str>) -> Result<Url> {
    let mut url = base.join("users/me/calendarList")?;
    if let Some(token) = page_token {
        url.query_pairs_mut().append_pair("pageToken", token);
    }
    Ok(url)
}

fn events_url(
    base: &Url,
    calendar_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    page_token: Option<&str>,
) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| anyhow::anyhow!("API base URL cannot have path segments"))?
        .pop_if_empty()
        .extend(["calendars", calendar_id, "events"]);

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("timeMin", &from.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("timeMax", &to.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");
        if let Some(token) = page_token {
            query.append_pair("pageToken", token);
        }
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base() -> Url {
        Url::parse(API_BASE).unwrap()
    }

    fn forbidden(reason: &str) -> String {
        serde_json::json!({
            "error": {
                "code": 403,
                "message": "denied",
                "errors": [{ "domain": "usageLimits", "reason": reason }],
            }
        })
        .to_string()
    }

    #[test]
    fn unauthorized_needs_sign_in() {
        assert!(is_auth_failure(StatusCode::UNAUTHORIZED, ""));
        assert!(is_auth_failure(StatusCode::UNAUTHORIZED, &forbidden("authError")));
    }

    #[test]
    fn rate_and_quota_limits_are_retryable() {
        for reason in [
            "rateLimitExceeded",
            "userRateLimitExceeded",
            "quotaExceeded",
            "dailyLimitExceeded",
        ] {
            assert!(
                !is_auth_failure(StatusCode::FORBIDDEN, &forbidden(reason)),
                "{reason} should be retryable"
            );
        }
    }

    #[test]
    fn other_forbidden_reasons_need_sign_in() {
        assert!(is_auth_failure(StatusCode::FORBIDDEN, &forbidden("insufficientPermissions")));
        assert!(is_auth_failure(StatusCode::FORBIDDEN, &forbidden("forbidden")));
        assert!(is_auth_failure(StatusCode::FORBIDDEN, "not json"));
    }

    #[test]
    fn server_errors_are_not_auth_failures() {
        assert!(!is_auth_failure(StatusCode::INTERNAL_SERVER_ERROR, ""));
        assert!(!is_auth_failure(StatusCode::TOO_MANY_REQUESTS, &forbidden("rateLimitExceeded")));
    }

    #[test]
    fn builds_calendar_list_url() {
        let url = calendar_list_url(&base(), None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/users/me/calendarList"
        );

        let url = calendar_list_url(&base(), Some("next")).unwrap();
        assert_eq!(url.query(), Some("pageToken=next"));
    }

    #[test]
    fn builds_events_url_with_escaped_calendar_id() {
        let from = Utc.with_ymd_and_hms(2025, 3, 19, 23, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 3, 20, 23, 0, 0).unwrap();

        let url = events_url(
            &base(),
            "en.usa#holiday@group.v.calendar.google.com",
            from,
            to,
            None,
        )
        .unwrap();

        assert_eq!(
            url.path(),
            "/calendar/v3/calendars/en.usa%23holiday@group.v.calendar.google.com/events"
        );
        assert_eq!(
            url.query(),
            Some(
                "timeMin=2025-03-19T23%3A00%3A00Z&timeMax=2025-03-20T23%3A00%3A00Z&singleEvents=true&orderBy=startTime"
            )
        );
    }
}
