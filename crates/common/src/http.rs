//! Shared outbound HTTP helpers.
//!
//! Every request the relay makes goes through [`send`], which races the
//! request against the shutdown token so a slow remote never delays exit.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use tokio_util::sync::CancellationToken;

use crate::error::RelayError;

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("gh2ntfy/", env!("CARGO_PKG_VERSION"));

/// Build a client with the given default headers and a per-request timeout.
pub fn build_client(
    headers: reqwest::header::HeaderMap,
    timeout: Duration,
) -> Result<Client, RelayError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))
}

/// Send a request, giving up as soon as `cancel` fires.
pub async fn send(
    operation: &'static str,
    request: RequestBuilder,
    cancel: &CancellationToken,
) -> Result<Response, RelayError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RelayError::Cancelled { operation }),
        result = request.send() => result.map_err(|e| RelayError::transport(operation, e)),
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use reqwest::header::HeaderMap;

    use super::*;

    #[tokio::test]
    async fn test_send_returns_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/ping").header("user-agent", USER_AGENT);
                then.status(204);
            })
            .await;

        let client = build_client(HeaderMap::new(), Duration::from_secs(2)).unwrap();
        let response = send("ping", client.get(server.url("/ping")), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 204);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_honors_cancellation() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200).delay(Duration::from_secs(5));
            })
            .await;

        let client = build_client(HeaderMap::new(), Duration::from_secs(30)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = send("slow", client.get(server.url("/slow")), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Cancelled { operation: "slow" }));
    }

    #[tokio::test]
    async fn test_send_times_out_as_transport_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/hang");
                then.status(200).delay(Duration::from_secs(5));
            })
            .await;

        let client = build_client(HeaderMap::new(), Duration::from_millis(200)).unwrap();
        let err = send("hang", client.get(server.url("/hang")), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            RelayError::Transport { operation, source } => {
                assert_eq!(operation, "hang");
                assert!(source.is_timeout());
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
