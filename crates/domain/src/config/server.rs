use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Label identifying this listener instance; recorded on every source
    /// it touches and included in session announcements.
    #[serde(default = "default_label")]
    pub label: String,

    /// Ceiling on concurrently in-flight UDP datagrams. The receive loop
    /// waits for a free slot once the ceiling is reached.
    #[serde(default = "default_max_inflight")]
    pub max_inflight: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            label: default_label(),
            max_inflight: default_max_inflight(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    53
}

fn default_label() -> String {
    "warden-dns".to_string()
}

fn default_max_inflight() -> usize {
    512
}
