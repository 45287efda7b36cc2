//! Error alerting through a Slack-compatible incoming webhook.
//!
//! Delivery is fire-and-forget: [`Alerter::notify`] spawns the request and
//! returns immediately, and delivery failures are logged inside the task.

use serde::Serialize;

/// Webhook alert sender. Without a webhook URL it only logs.
#[derive(Debug, Clone)]
pub struct Alerter {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    text: &'a str,
}

impl Alerter {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.filter(|url| !url.trim().is_empty()),
        }
    }

    /// Alerter that never sends anything.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Send `text` in the background. Must be called from a tokio runtime.
    pub fn notify(&self, text: String) {
        let Some(url) = self.webhook_url.clone() else {
            tracing::debug!("alert webhook not configured, dropping alert");
            return;
        };

        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = send(&client, &url, &text).await {
                tracing::warn!(error = %e, "failed to deliver alert");
            }
        });
    }
}

async fn send(client: &reqwest::Client, url: &str, text: &str) -> Result<(), reqwest::Error> {
    client
        .post(url)
        .json(&WebhookMessage { text })
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

/// Alert text for an unhandled request failure.
pub fn format_request_alert(method: &str, uri: &str, user_id: Option<i32>, detail: &str) -> String {
    let actor = match user_id {
        Some(id) => format!("uid:{id}"),
        None => "no user".to_string(),
    };
    format!("[ERROR] [{method}] {uri} {actor}\n[CONTENT] {detail}")
}
