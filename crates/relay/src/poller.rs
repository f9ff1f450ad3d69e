use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use gh2ntfy_common::config::AppConfig;
use gh2ntfy_common::error::RelayError;
use gh2ntfy_common::types::{Cursor, ForwardRequest, Notification, PollResult};
use gh2ntfy_github::GitHubClient;
use gh2ntfy_notifier::NtfyForwarder;

/// Where notifications come from.
pub trait NotificationSource {
    /// Fetch notifications newer than `cursor`.
    fn fetch(
        &self,
        cursor: &Cursor,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<PollResult, RelayError>> + Send;

    /// Resolve a subject reference to a browser link. `Ok(None)` means no link is available.
    fn resolve_link(
        &self,
        subject_url: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Option<String>, RelayError>> + Send;
}

/// Where notifications go.
pub trait PushSink {
    fn push(
        &self,
        request: &ForwardRequest,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), RelayError>> + Send;
}

impl NotificationSource for GitHubClient {
    async fn fetch(
        &self,
        cursor: &Cursor,
        cancel: &CancellationToken,
    ) -> Result<PollResult, RelayError> {
        self.poll(cursor, cancel).await
    }

    async fn resolve_link(
        &self,
        subject_url: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, RelayError> {
        self.resolve(subject_url, cancel).await
    }
}

impl PushSink for NtfyForwarder {
    async fn push(
        &self,
        request: &ForwardRequest,
        cancel: &CancellationToken,
    ) -> Result<(), RelayError> {
        self.forward(request, cancel).await
    }
}

/// Polls a notification source and relays every item to a push sink.
pub struct NotificationPoller<S, P> {
    source: S,
    sink: P,
    retry_delay: Duration,
}

impl NotificationPoller<GitHubClient, NtfyForwarder> {
    pub fn from_config(config: &AppConfig) -> Result<Self, RelayError> {
        Ok(Self::new(
            GitHubClient::from_config(config)?,
            NtfyForwarder::from_config(config)?,
            config.retry_delay(),
        ))
    }
}

impl<S, P> NotificationPoller<S, P>
where
    S: NotificationSource,
    P: PushSink,
{
    pub fn new(source: S, sink: P, retry_delay: Duration) -> Self {
        Self {
            source,
            sink,
            retry_delay,
        }
    }

    /// Run the poll → dispatch → sleep loop until `cancel` fires.
    ///
    /// The cursor lives only inside this call. It advances after every
    /// successful poll (304 included) and is left alone when a poll fails, so
    /// the retry asks for the same window again.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            retry_delay_secs = self.retry_delay.as_secs(),
            "Listening for notifications..."
        );

        let mut cursor = Cursor::default();

        loop {
            let result = match self.source.fetch(&cursor, &cancel).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(error = %e, cursor = %cursor, "Failed to fetch notifications");
                    if cancel.is_cancelled() {
                        break;
                    }
                    if !e.is_retryable() {
                        tracing::error!(error = %e, "Poll failed permanently, stopping");
                        break;
                    }

                    tracing::info!(
                        retry_in_secs = self.retry_delay.as_secs(),
                        "Will attempt again"
                    );
                    if !sleep_or_cancel(self.retry_delay, &cancel).await {
                        break;
                    }
                    continue;
                }
            };

            let started = Instant::now();

            let forwarded = self.dispatch(&result.notifications, &cancel).await;
            if forwarded > 0 {
                tracing::info!(count = forwarded, "Forwarded {} notification(s)", forwarded);
            }

            cursor.advance(result.cursor.as_deref());

            let wait = result.poll_interval.saturating_sub(started.elapsed());
            tracing::debug!(
                changed = result.changed,
                next_poll_in_ms = wait.as_millis() as u64,
                cursor = %cursor,
                "Poll cycle complete"
            );

            if !sleep_or_cancel(wait, &cancel).await {
                break;
            }
        }

        tracing::info!("Notification poller stopped");
    }

    /// Resolve and forward each notification in order. Returns how many were delivered.
    ///
    /// Link lookup is best effort and a failed push only affects its own item.
    pub async fn dispatch(&self, notifications: &[Notification], cancel: &CancellationToken) -> usize {
        let mut forwarded = 0;

        for notification in notifications {
            if cancel.is_cancelled() {
                break;
            }

            let link = match notification.subject.url.as_deref() {
                Some(subject_url) => match self.source.resolve_link(subject_url, cancel).await {
                    Ok(link) => link,
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            subject_url,
                            "Failed to fetch HTML URL of notification subject"
                        );
                        None
                    }
                },
                None => None,
            };

            if cancel.is_cancelled() {
                break;
            }

            let request = ForwardRequest::new(notification, link);
            match self.sink.push(&request, cancel).await {
                Ok(()) => forwarded += 1,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        repository = %notification.repository.full_name,
                        title = %notification.subject.title,
                        "Failed to forward notification"
                    );
                }
            }
        }

        forwarded
    }
}

/// Wait for `duration` unless cancelled first. Returns `false` on cancellation.
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
