//! UDP forwarder.
//!
//! One shared socket, one receive loop. Each datagram is copied out of the
//! reusable receive buffer, then handled by its own task: blocked sources
//! get a local REFUSED, everyone else gets an independent round trip to the
//! upstream resolver over a fresh ephemeral socket.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};
use warden_dns_domain::wire;

use super::{ForwarderContext, MAX_DNS_PACKET_SIZE};

/// How long a forwarded query waits for the upstream reply before the
/// datagram is silently dropped.
const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct UdpForwarder {
    socket: Arc<UdpSocket>,
    ctx: ForwarderContext,
    max_inflight: usize,
    reply_timeout: Duration,
}

impl UdpForwarder {
    pub async fn bind(
        addr: SocketAddr,
        ctx: ForwarderContext,
        max_inflight: usize,
    ) -> io::Result<Self> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        Ok(Self {
            socket,
            ctx,
            max_inflight,
            reply_timeout: REPLY_TIMEOUT,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Override the upstream reply deadline.
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Receive loop; one task per datagram, at most `max_inflight` of them
    /// at once. When the ceiling is reached the loop waits for a slot
    /// instead of spawning, so a flood backs up into the socket buffer
    /// rather than into ephemeral sockets.
    pub async fn run(self) {
        match self.socket.local_addr() {
            Ok(addr) => {
                info!(addr = %addr, upstream = %self.ctx.upstream_addr, "UDP forwarding started")
            }
            Err(_) => info!(upstream = %self.ctx.upstream_addr, "UDP forwarding started"),
        }

        let inflight = Arc::new(Semaphore::new(self.max_inflight));
        let mut buf = [0u8; MAX_DNS_PACKET_SIZE];

        loop {
            let (len, src) = match self.socket.recv_from(&mut buf).await {
                Ok(r) => r,
                Err(e) => {
                    error!(error = %e, "UDP recv failed");
                    continue;
                }
            };

            // The buffer is reused by the next recv; the task gets its own
            // copy of the datagram.
            let query = buf[..len].to_vec();

            let Ok(permit) = inflight.clone().acquire_owned().await else {
                // Semaphore is never closed.
                break;
            };

            let socket = self.socket.clone();
            let ctx = self.ctx.clone();
            let reply_timeout = self.reply_timeout;
            tokio::spawn(async move {
                handle_datagram(socket, query, src, ctx, reply_timeout).await;
                drop(permit);
            });
        }
    }
}

async fn handle_datagram(
    socket: Arc<UdpSocket>,
    query: Vec<u8>,
    src: SocketAddr,
    ctx: ForwarderContext,
    reply_timeout: Duration,
) {
    if ctx.admission.execute(src.ip()).await {
        info!(ip = %src.ip(), "Refusing UDP query from blocked source");
        // A datagram too short to carry a header is dropped silently.
        if let Some(refusal) = wire::build_refusal(&query) {
            if let Err(e) = socket.send_to(&refusal, src).await {
                error!(error = %e, "UDP refusal send failed");
            }
        }
        return;
    }

    let bind_any = if ctx.upstream_addr.is_ipv4() {
        "0.0.0.0:0"
    } else {
        "[::]:0"
    };
    let upstream = match UdpSocket::bind(bind_any).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "UDP upstream socket failed");
            return;
        }
    };

    if let Err(e) = upstream.send_to(&query, ctx.upstream_addr).await {
        error!(error = %e, upstream = %ctx.upstream_addr, "UDP forward failed");
        return;
    }

    info!(client = %src, upstream = %ctx.upstream_addr, "UDP session opened");
    ctx.notifier.announce(format!(
        "UDP session: {} -> {} -> {}",
        src, ctx.label, ctx.upstream_addr
    ));

    let mut reply = [0u8; MAX_DNS_PACKET_SIZE];
    match tokio::time::timeout(reply_timeout, upstream.recv_from(&mut reply)).await {
        Ok(Ok((n, _))) => {
            if let Err(e) = socket.send_to(&reply[..n], src).await {
                error!(error = %e, "UDP relay send failed");
            }
        }
        Ok(Err(e)) => {
            debug!(error = %e, "UDP upstream read failed");
        }
        Err(_) => {
            debug!(client = %src, "No upstream reply within deadline, dropping");
        }
    }
}
