use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// host:port of the resolver queries are relayed to. Resolved once at
    /// startup; both transports forward to the same address.
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

fn default_address() -> String {
    "1.1.1.1:53".to_string()
}
