//! Best-effort session announcements over a chat webhook.
//!
//! Forwarders push messages into a bounded queue and move on; one task
//! drains the queue and does the HTTP work. A slow or dead endpoint costs
//! dropped announcements, never forwarding latency.

use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use warden_dns_application::ports::SessionNotifier;

#[derive(Clone)]
pub struct WebhookNotifier {
    tx: Option<mpsc::Sender<String>>,
}

impl WebhookNotifier {
    /// Spawn the delivery task and return the sending side. An empty URL
    /// yields a disabled notifier that drops everything.
    pub fn spawn(webhook_url: &str, queue_capacity: usize) -> Self {
        if webhook_url.is_empty() {
            return Self::disabled();
        }

        let (tx, rx) = mpsc::channel(queue_capacity);
        info!(capacity = queue_capacity, "Session announcements enabled");
        tokio::spawn(deliver_loop(webhook_url.to_string(), rx));

        Self { tx: Some(tx) }
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }
}

impl SessionNotifier for WebhookNotifier {
    fn announce(&self, message: String) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.try_send(message).is_err() {
            debug!("Announcement queue full, dropping message");
        }
    }
}

async fn deliver_loop(url: String, mut rx: mpsc::Receiver<String>) {
    let client = reqwest::Client::new();

    while let Some(message) = rx.recv().await {
        let payload = json!({ "content": message });

        match client.post(&url).json(&payload).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "Webhook rejected announcement");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Webhook delivery failed");
            }
        }
    }
}
