use reqwest::StatusCode;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use gh2ntfy_common::error::RelayError;

use crate::client::GitHubClient;

const OPERATION: &str = "resolve subject link";

#[derive(Deserialize)]
struct SubjectDetail {
    #[serde(default)]
    html_url: Option<String>,
}

impl GitHubClient {
    /// Look up the browser link for a notification subject.
    ///
    /// Returns `Ok(None)` on 404, which GitHub sends when the token lacks the
    /// `repo` scope for a private subject.
    pub async fn resolve(
        &self,
        subject_url: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, RelayError> {
        let response = self
            .send(OPERATION, self.get_url(subject_url), cancel)
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::debug!(subject_url, "Subject not visible to token, forwarding without link");
                return Ok(None);
            }
            status if !status.is_success() => {
                return Err(RelayError::Protocol {
                    operation: OPERATION,
                    status: status.as_u16(),
                });
            }
            _ => {}
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RelayError::transport(OPERATION, e))?;
        let detail: SubjectDetail = serde_json::from_slice(&body)
            .map_err(|e| RelayError::decode(OPERATION, e.to_string()))?;

        Ok(detail.html_url.filter(|url| !url.is_empty()))
    }
}
