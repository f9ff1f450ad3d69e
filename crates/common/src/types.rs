use std::time::Duration;

use serde::Deserialize;

/// A GitHub notification thread as returned by `GET /notifications`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Notification {
    pub subject: Subject,
    pub repository: Repository,
    #[serde(default)]
    pub unread: bool,
}

/// The item a notification is about (issue, pull request, release, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subject {
    pub title: String,
    /// API URL of the subject. GitHub sends `null` for some subject types.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub full_name: String,
}

/// Outcome of a single successful poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResult {
    pub notifications: Vec<Notification>,
    /// Server-issued cursor (the response `Date` header), if the server sent one.
    pub cursor: Option<String>,
    /// Server-suggested minimum delay before the next poll.
    pub poll_interval: Duration,
    /// `false` when the server answered 304 Not Modified.
    pub changed: bool,
}

/// Checkpoint sent back to GitHub as `If-Modified-Since` on the next poll.
///
/// Starts empty and is only ever replaced by a newer server value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor(Option<String>);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self(None)
        } else {
            Self(Some(value))
        }
    }

    pub fn as_header(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Move to the server's latest cursor. A missing or empty value keeps the current one.
    pub fn advance(&mut self, latest: Option<&str>) {
        if let Some(value) = latest.filter(|v| !v.is_empty()) {
            self.0 = Some(value.to_string());
        }
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.as_deref().unwrap_or("<none>"))
    }
}

/// Human-readable push message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardRequest {
    /// Plain-text body, `"<repo>: <title>"`
    pub body: String,
    /// Click-through target, when one could be resolved
    pub click: Option<String>,
}

impl ForwardRequest {
    pub fn new(notification: &Notification, click: Option<String>) -> Self {
        Self {
            body: format!(
                "{}: {}",
                notification.repository.full_name, notification.subject.title
            ),
            click: click.filter(|link| !link.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_deserializes_from_api_shape() {
        let raw = serde_json::json!([
            {
                "id": "1",
                "unread": true,
                "reason": "subscribed",
                "subject": {
                    "title": "Fix bug",
                    "url": "https://api.github.com/repos/org/repo/issues/1",
                    "type": "Issue"
                },
                "repository": { "id": 42, "full_name": "org/repo" }
            },
            {
                "subject": { "title": "CI failed", "url": null, "type": "CheckSuite" },
                "repository": { "full_name": "org/other" }
            }
        ]);

        let parsed: Vec<Notification> = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].subject.title, "Fix bug");
        assert_eq!(
            parsed[0].subject.url.as_deref(),
            Some("https://api.github.com/repos/org/repo/issues/1")
        );
        assert!(parsed[0].unread);
        assert_eq!(parsed[1].repository.full_name, "org/other");
        assert_eq!(parsed[1].subject.url, None);
        assert!(!parsed[1].unread);
    }

    #[test]
    fn test_cursor_advance() {
        let mut cursor = Cursor::default();
        assert_eq!(cursor.as_header(), None);

        cursor.advance(Some("Mon, 01 Jan 2024 00:00:00 GMT"));
        assert_eq!(cursor.as_header(), Some("Mon, 01 Jan 2024 00:00:00 GMT"));

        cursor.advance(None);
        cursor.advance(Some(""));
        assert_eq!(cursor, Cursor::new("Mon, 01 Jan 2024 00:00:00 GMT"));
    }

    #[test]
    fn test_forward_request_body() {
        let notification = Notification {
            subject: Subject {
                title: "Add feature".to_string(),
                url: None,
            },
            repository: Repository {
                full_name: "org/repo".to_string(),
            },
            unread: true,
        };

        let request = ForwardRequest::new(&notification, Some(String::new()));
        assert_eq!(request.body, "org/repo: Add feature");
        assert_eq!(request.click, None);

        let request = ForwardRequest::new(
            &notification,
            Some("https://github.com/org/repo/pull/2".to_string()),
        );
        assert_eq!(request.click.as_deref(), Some("https://github.com/org/repo/pull/2"));
    }
}
