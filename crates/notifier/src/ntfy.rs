use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use tokio_util::sync::CancellationToken;

use gh2ntfy_common::config::AppConfig;
use gh2ntfy_common::error::RelayError;
use gh2ntfy_common::http;
use gh2ntfy_common::types::ForwardRequest;

const OPERATION: &str = "forward to ntfy";

/// Posts notifications to a single ntfy topic URL.
#[derive(Clone)]
pub struct NtfyForwarder {
    http: reqwest::Client,
    destination: String,
    title: HeaderValue,
}

impl NtfyForwarder {
    pub fn new(destination: &str, title: &str, timeout: Duration) -> Result<Self, RelayError> {
        let title = HeaderValue::from_str(title)
            .map_err(|_| RelayError::Config("NTFY_TITLE is not a valid header value".into()))?;

        Ok(Self {
            http: http::build_client(HeaderMap::new(), timeout)?,
            destination: destination.to_string(),
            title,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, RelayError> {
        Self::new(&config.ntfy_url, &config.ntfy_title, config.request_timeout())
    }

    /// Deliver one push. Any transport failure or non-2xx answer is an error.
    pub async fn forward(
        &self,
        request: &ForwardRequest,
        cancel: &CancellationToken,
    ) -> Result<(), RelayError> {
        let mut builder = self
            .http
            .post(&self.destination)
            .header("Title", self.title.clone())
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(request.body.clone());

        if let Some(click) = &request.click {
            builder = builder.header("Click", click.as_str());
        }

        let response = http::send(OPERATION, builder, cancel).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Protocol {
                operation: OPERATION,
                status: status.as_u16(),
            });
        }

        tracing::debug!(
            body = %request.body,
            click = request.click.as_deref().unwrap_or(""),
            "Forwarded notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    fn forwarder(server: &MockServer) -> NtfyForwarder {
        NtfyForwarder::new(
            &server.url("/gh"),
            "GitHub Notification",
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_forward_with_click() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/gh")
                    .header("title", "GitHub Notification")
                    .header("click", "https://github.com/org/repo/issues/1")
                    .header_missing("authorization")
                    .body("org/repo: Fix bug");
                then.status(200);
            })
            .await;

        let request = ForwardRequest {
            body: "org/repo: Fix bug".to_string(),
            click: Some("https://github.com/org/repo/issues/1".to_string()),
        };
        forwarder(&server)
            .forward(&request, &CancellationToken::new())
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_forward_without_click() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/gh")
                    .header("title", "GitHub Notification")
                    .header_missing("click")
                    .body("org/repo: Add feature");
                then.status(200);
            })
            .await;

        let request = ForwardRequest {
            body: "org/repo: Add feature".to_string(),
            click: None,
        };
        forwarder(&server)
            .forward(&request, &CancellationToken::new())
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_push_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/gh");
                then.status(429).body("rate limited");
            })
            .await;

        let request = ForwardRequest {
            body: "org/repo: Fix bug".to_string(),
            click: None,
        };
        let err = forwarder(&server)
            .forward(&request, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn test_invalid_title_is_config_error() {
        let result = NtfyForwarder::new("https://ntfy.sh/t", "line\nbreak", Duration::from_secs(1));
        assert!(matches!(result, Err(RelayError::Config(_))));
    }
}
