use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyConfig {
    /// Webhook URL session announcements are POSTed to. Empty disables
    /// notification entirely.
    #[serde(default)]
    pub webhook_url: String,

    /// Pending announcements beyond this are dropped, never queued on the
    /// forwarding path.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl NotifyConfig {
    pub fn enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }
}

fn default_queue_capacity() -> usize {
    64
}
