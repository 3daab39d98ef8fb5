//! TCP and UDP forwarders.
//!
//! Both transports make the same per-flow decision: ask admission control
//! about the source address, then either answer REFUSED locally or relay
//! the traffic to the upstream resolver.

pub mod tcp;
pub mod udp;

pub use tcp::TcpForwarder;
pub use udp::UdpForwarder;

use std::net::SocketAddr;
use std::sync::Arc;
use warden_dns_application::ports::SessionNotifier;
use warden_dns_application::CheckAdmissionUseCase;

/// Largest DNS message either forwarder will buffer (with headroom).
pub const MAX_DNS_PACKET_SIZE: usize = 4096;

/// Dependencies shared by both forwarders.
#[derive(Clone)]
pub struct ForwarderContext {
    pub admission: Arc<CheckAdmissionUseCase>,
    pub notifier: Arc<dyn SessionNotifier>,
    pub upstream_addr: SocketAddr,
    /// Listener label used in session announcements.
    pub label: Arc<str>,
}
