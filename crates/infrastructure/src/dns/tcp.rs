//! TCP forwarder.
//!
//! Every accepted connection is admission-checked once. Blocked sources get
//! a single framed REFUSED exchange; everyone else is bridged byte-for-byte
//! to the upstream resolver with no framing enforcement.

use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};
use warden_dns_domain::wire;

use super::{ForwarderContext, MAX_DNS_PACKET_SIZE};

pub struct TcpForwarder {
    listener: TcpListener,
    ctx: ForwarderContext,
}

impl TcpForwarder {
    pub async fn bind(addr: SocketAddr, ctx: ForwarderContext) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, ctx })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop; one task per connection. Accept errors are scoped to
    /// the failed attempt.
    pub async fn run(self) {
        match self.listener.local_addr() {
            Ok(addr) => {
                info!(addr = %addr, upstream = %self.ctx.upstream_addr, "TCP forwarding started")
            }
            Err(_) => info!(upstream = %self.ctx.upstream_addr, "TCP forwarding started"),
        }

        loop {
            match self.listener.accept().await {
                Ok((client, peer)) => {
                    let ctx = self.ctx.clone();
                    tokio::spawn(async move {
                        handle_connection(client, peer, ctx).await;
                    });
                }
                Err(e) => {
                    error!(error = %e, "TCP accept failed");
                }
            }
        }
    }
}

async fn handle_connection(mut client: TcpStream, peer: SocketAddr, ctx: ForwarderContext) {
    if ctx.admission.execute(peer.ip()).await {
        info!(ip = %peer.ip(), "Refusing TCP query from blocked source");
        if let Err(e) = refuse_one_query(&mut client).await {
            debug!(error = %e, "TCP refusal aborted");
        }
        return;
    }

    let mut upstream = match TcpStream::connect(ctx.upstream_addr).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, upstream = %ctx.upstream_addr, "Upstream TCP dial failed");
            return;
        }
    };

    info!(client = %peer, upstream = %ctx.upstream_addr, "TCP session bridged");
    ctx.notifier.announce(format!(
        "TCP session: {} -> {} -> {}",
        peer, ctx.label, ctx.upstream_addr
    ));

    // Byte-level bridge; either side closing or failing tears down both.
    if let Err(e) = tokio::io::copy_bidirectional(&mut client, &mut upstream).await {
        debug!(error = %e, "TCP bridge closed with error");
    }
}

/// One framed exchange on the refusal path: read the length-prefixed query,
/// answer REFUSED, and let the connection close. An oversized frame or a
/// query too short to carry a header gets no response at all.
async fn refuse_one_query(client: &mut TcpStream) -> io::Result<()> {
    let mut len_buf = [0u8; 2];
    client.read_exact(&mut len_buf).await?;
    let msg_len = u16::from_be_bytes(len_buf) as usize;

    if msg_len > MAX_DNS_PACKET_SIZE {
        debug!(declared = msg_len, "TCP query exceeds buffer, dropping connection");
        return Ok(());
    }

    let mut query = vec![0u8; msg_len];
    client.read_exact(&mut query).await?;

    let Some(refusal) = wire::build_refusal(&query) else {
        return Ok(());
    };

    client.write_all(&(refusal.len() as u16).to_be_bytes()).await?;
    client.write_all(&refusal).await?;
    Ok(())
}
