//! gh2ntfy binary entrypoint: relays GitHub notifications to ntfy.

use tracing_subscriber::EnvFilter;

use gh2ntfy_common::config::AppConfig;
use gh2ntfy_relay::poller::NotificationPoller;
use gh2ntfy_relay::shutdown;

const DEFAULT_LOG_FILTER: &str =
    "gh2ntfy=info,gh2ntfy_relay=info,gh2ntfy_github=info,gh2ntfy_notifier=info,gh2ntfy_common=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration; a missing token or destination ends the process here
    let config = AppConfig::from_env()?;
    let poller = NotificationPoller::from_config(&config)?;

    tracing::info!(
        api = %config.github_api_url,
        destination = %config.ntfy_url,
        "gh2ntfy starting..."
    );

    let cancel = tokio_util::sync::CancellationToken::new();
    let signals = shutdown::spawn_signal_listener(cancel.clone());

    poller.run(cancel.clone()).await;

    cancel.cancel();
    if let Err(e) = signals.await {
        tracing::warn!(error = %e, "Signal listener ended abnormally");
    }

    tracing::info!("gh2ntfy stopped.");
    Ok(())
}
