//! Change notification delivery
//!
//! Changes detected by a cycle are handed to a [`Notifier`]. Delivery failures
//! are the sink's own concern: the driver logs them and moves on, they never
//! feed back into the detection cycle.

use serde_json::json;
use tracing::info;

use crate::checker::VersionChange;
use crate::config::SOURCE_URL;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Webhook returned status: {0}")]
    Status(reqwest::StatusCode),
}

/// Consumer of detected version changes
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one change notification
    async fn notify(&self, change: &VersionChange) -> Result<(), NotifyError>;
}

/// Posts each change as an embed to a Discord webhook
pub struct DiscordNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("vanced-watch/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to create HTTP client"),
            webhook_url: webhook_url.to_string(),
        }
    }
}

/// Webhook payload for one change: a green embed with the old and new
/// versions and the download link
fn embed_payload(change: &VersionChange) -> serde_json::Value {
    let old_version = if change.old.version.is_empty() {
        "unknown"
    } else {
        &change.old.version
    };

    json!({
        "embeds": [{
            "title": format!("{} update", change.new.name),
            "description": format!("A new version of {} is available!", change.new.name),
            "color": 0x2ECC71,
            "fields": [
                { "name": "Previous version", "value": old_version, "inline": true },
                { "name": "New version", "value": change.new.version, "inline": true },
                { "name": "Download", "value": SOURCE_URL, "inline": false },
            ],
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }]
    })
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, change: &VersionChange) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&embed_payload(change))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status));
        }

        info!("Delivered notification for {}", change.new.name);
        Ok(())
    }
}

/// Fallback sink that only writes changes to the log, used when no webhook
/// is configured
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, change: &VersionChange) -> Result<(), NotifyError> {
        info!("Update available: {} -> {}", change.old, change.new);
        Ok(())
    }
}
