//! Conditional polling of `GET /notifications`.
//!
//! The cursor is sent back as `If-Modified-Since`; GitHub answers 304 when
//! nothing changed since then. Every response carries the next cursor in its
//! `Date` header and the minimum delay before the next poll in
//! `X-Poll-Interval`.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{DATE, HeaderMap, IF_MODIFIED_SINCE};
use tokio_util::sync::CancellationToken;

use gh2ntfy_common::error::RelayError;
use gh2ntfy_common::types::{Cursor, Notification, PollResult};

use crate::client::GitHubClient;

const OPERATION: &str = "poll notifications";

/// Header carrying the server-suggested poll interval in seconds.
pub const POLL_INTERVAL_HEADER: &str = "x-poll-interval";

impl GitHubClient {
    /// Poll for notifications newer than `cursor`.
    pub async fn poll(
        &self,
        cursor: &Cursor,
        cancel: &CancellationToken,
    ) -> Result<PollResult, RelayError> {
        let mut request = self.get_path("/notifications");
        if let Some(since) = cursor.as_header() {
            request = request.header(IF_MODIFIED_SINCE, since);
        }

        let response = self.send(OPERATION, request, cancel).await?;
        let status = response.status();

        let changed = match status {
            StatusCode::OK => true,
            StatusCode::NOT_MODIFIED => false,
            other => {
                return Err(RelayError::Protocol {
                    operation: OPERATION,
                    status: other.as_u16(),
                });
            }
        };

        let headers = response.headers();
        let next_cursor = header_str(headers, DATE.as_str()).map(str::to_string);
        let poll_interval = parse_poll_interval(headers)?;

        let notifications = if changed {
            let body = response
                .bytes()
                .await
                .map_err(|e| RelayError::transport(OPERATION, e))?;
            serde_json::from_slice::<Vec<Notification>>(&body)
                .map_err(|e| RelayError::decode(OPERATION, e.to_string()))?
        } else {
            Vec::new()
        };

        tracing::debug!(
            status = status.as_u16(),
            count = notifications.len(),
            poll_interval_secs = poll_interval.as_secs(),
            cursor = next_cursor.as_deref().unwrap_or(""),
            "Polled notifications"
        );

        Ok(PollResult {
            notifications,
            cursor: next_cursor,
            poll_interval,
            changed,
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_poll_interval(headers: &HeaderMap) -> Result<Duration, RelayError> {
    let raw = header_str(headers, POLL_INTERVAL_HEADER)
        .ok_or_else(|| RelayError::decode(OPERATION, "missing X-Poll-Interval header"))?;
    let secs: u64 = raw.parse().map_err(|_| {
        RelayError::decode(OPERATION, format!("invalid X-Poll-Interval header: {raw:?}"))
    })?;
    Ok(Duration::from_secs(secs))
}
