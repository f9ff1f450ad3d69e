use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response};
use tokio_util::sync::CancellationToken;

use gh2ntfy_common::config::AppConfig;
use gh2ntfy_common::error::RelayError;
use gh2ntfy_common::http;

/// REST API version pinned on every request.
pub const API_VERSION: &str = "2022-11-28";

/// Authenticated GitHub REST client. Performs no retries of its own.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
}

impl GitHubClient {
    pub fn new(api_base: &str, token: &str, timeout: Duration) -> Result<Self, RelayError> {
        let mut headers = HeaderMap::new();
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| RelayError::Config("GITHUB_TOKEN is not a valid header value".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        Ok(Self {
            http: http::build_client(headers, timeout)?,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, RelayError> {
        Self::new(
            &config.github_api_url,
            &config.github_token,
            config.request_timeout(),
        )
    }

    /// Start a GET against a path relative to the API base.
    pub(crate) fn get_path(&self, path: &str) -> RequestBuilder {
        self.http.get(format!("{}{}", self.api_base, path))
    }

    /// Start a GET against an absolute URL handed out by the API.
    pub(crate) fn get_url(&self, url: &str) -> RequestBuilder {
        self.http.get(url)
    }

    pub(crate) async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<Response, RelayError> {
        http::send(operation, request, cancel).await
    }
}
