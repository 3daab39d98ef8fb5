use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use warden_dns_application::ports::ReputationRepository;
use warden_dns_application::CheckAdmissionUseCase;
use warden_dns_domain::wire::HEADER_LEN;
use warden_dns_infrastructure::database::create_pool;
use warden_dns_infrastructure::dns::{ForwarderContext, TcpForwarder, UdpForwarder};
use warden_dns_infrastructure::notify::WebhookNotifier;
use warden_dns_infrastructure::repositories::SqliteReputationRepository;

async fn test_ctx(
    upstream_addr: SocketAddr,
) -> (Arc<SqliteReputationRepository>, ForwarderContext) {
    let pool = create_pool("sqlite::memory:", 1).await.unwrap();
    let repo = Arc::new(SqliteReputationRepository::new(pool, "test-listener"));
    let ctx = ForwarderContext {
        admission: Arc::new(CheckAdmissionUseCase::new(repo.clone())),
        notifier: Arc::new(WebhookNotifier::disabled()),
        upstream_addr,
        label: Arc::from("test-listener"),
    };
    (repo, ctx)
}

fn query_packet(id: u16) -> Vec<u8> {
    let mut q = vec![0u8; HEADER_LEN];
    q[0] = (id >> 8) as u8;
    q[1] = id as u8;
    q[2] = 0x01;
    q[5] = 0x01;
    q
}

fn assert_is_refusal(response: &[u8], query: &[u8]) {
    assert_eq!(response.len(), query.len());
    assert_eq!(&response[0..2], &query[0..2], "transaction id must match");
    assert_eq!(response[2] & 0x80, 0x80, "QR bit must be set");
    assert_eq!(response[3] & 0x0f, 5, "RCODE must be REFUSED");
    assert_eq!(&response[4..12], &[0u8; 8], "section counts must be zero");
}

/// Upstream stand-in that answers every framed TCP query with `reply`.
async fn spawn_tcp_upstream(reply: Vec<u8>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut conn, _)) = listener.accept().await else {
                break;
            };
            let reply = reply.clone();
            tokio::spawn(async move {
                let mut len_buf = [0u8; 2];
                if conn.read_exact(&mut len_buf).await.is_err() {
                    return;
                }
                let len = u16::from_be_bytes(len_buf) as usize;
                let mut query = vec![0u8; len];
                if conn.read_exact(&mut query).await.is_err() {
                    return;
                }
                let _ = conn.write_all(&(reply.len() as u16).to_be_bytes()).await;
                let _ = conn.write_all(&reply).await;
            });
        }
    });
    addr
}

/// Upstream stand-in for UDP; `reply = None` simulates an upstream that
/// never answers.
async fn spawn_udp_upstream(reply: Option<Vec<u8>>) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    tokio::spawn(async move {
        let mut buf = [0u8; 4096];
        loop {
            let Ok((_, from)) = socket.recv_from(&mut buf).await else {
                break;
            };
            if let Some(reply) = &reply {
                let _ = socket.send_to(reply, from).await;
            }
        }
    });
    addr
}

#[tokio::test]
async fn test_blocked_tcp_client_receives_framed_refusal() {
    // Refusal path never dials upstream; the address just has to parse.
    let (repo, ctx) = test_ctx("127.0.0.1:9".parse().unwrap()).await;
    repo.block("127.0.0.1".parse().unwrap(), Some("test".to_string()))
        .await
        .unwrap();

    let forwarder = TcpForwarder::bind("127.0.0.1:0".parse().unwrap(), ctx)
        .await
        .unwrap();
    let addr = forwarder.local_addr().unwrap();
    tokio::spawn(forwarder.run());

    let mut client = TcpStream::connect(addr).await.unwrap();
    let query = query_packet(0xbeef);
    client
        .write_all(&(query.len() as u16).to_be_bytes())
        .await
        .unwrap();
    client.write_all(&query).await.unwrap();

    let mut len_buf = [0u8; 2];
    client.read_exact(&mut len_buf).await.unwrap();
    assert_eq!(u16::from_be_bytes(len_buf) as usize, query.len());
    let mut response = vec![0u8; query.len()];
    client.read_exact(&mut response).await.unwrap();
    assert_is_refusal(&response, &query);

    // One exchange only, then the connection closes.
    let n = client.read(&mut [0u8; 1]).await.unwrap();
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_allowed_tcp_client_is_bridged_to_upstream() {
    let mut reply = query_packet(0x1234);
    reply[2] |= 0x80;
    let upstream_addr = spawn_tcp_upstream(reply.clone()).await;
    let (_repo, ctx) = test_ctx(upstream_addr).await;

    let forwarder = TcpForwarder::bind("127.0.0.1:0".parse().unwrap(), ctx)
        .await
        .unwrap();
    let addr = forwarder.local_addr().unwrap();
    tokio::spawn(forwarder.run());

    let mut client = TcpStream::connect(addr).await.unwrap();
    let query = query_packet(0x1234);
    client
        .write_all(&(query.len() as u16).to_be_bytes())
        .await
        .unwrap();
    client.write_all(&query).await.unwrap();

    let mut len_buf = [0u8; 2];
    client.read_exact(&mut len_buf).await.unwrap();
    let mut received = vec![0u8; u16::from_be_bytes(len_buf) as usize];
    client.read_exact(&mut received).await.unwrap();

    assert_eq!(received, reply);
}

#[tokio::test]
async fn test_allowed_udp_client_receives_upstream_reply_verbatim() {
    let mut reply = query_packet(0x5678);
    reply[2] |= 0x80;
    reply.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
    let upstream_addr = spawn_udp_upstream(Some(reply.clone())).await;
    let (_repo, ctx) = test_ctx(upstream_addr).await;

    let forwarder = UdpForwarder::bind("127.0.0.1:0".parse().unwrap(), ctx, 16)
        .await
        .unwrap();
    let addr = forwarder.local_addr().unwrap();
    tokio::spawn(forwarder.run());

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(&query_packet(0x5678), addr).await.unwrap();

    let mut buf = [0u8; 4096];
    let (n, from) = tokio::time::timeout(Duration::from_secs(2), client.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(from, addr, "reply must come from the shared socket");
    assert_eq!(&buf[..n], &reply[..]);
}

#[tokio::test]
async fn test_blocked_udp_client_receives_refusal() {
    let upstream_addr = spawn_udp_upstream(None).await;
    let (repo, ctx) = test_ctx(upstream_addr).await;
    repo.block("127.0.0.1".parse().unwrap(), None).await.unwrap();

    let forwarder = UdpForwarder::bind("127.0.0.1:0".parse().unwrap(), ctx, 16)
        .await
        .unwrap();
    let addr = forwarder.local_addr().unwrap();
    tokio::spawn(forwarder.run());

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let query = query_packet(0x4242);
    client.send_to(&query, addr).await.unwrap();

    let mut buf = [0u8; 4096];
    let (n, _) = tokio::time::timeout(Duration::from_secs(2), client.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();

    assert_is_refusal(&buf[..n], &query);
}

#[tokio::test]
async fn test_silent_upstream_means_no_udp_reply() {
    let upstream_addr = spawn_udp_upstream(None).await;
    let (_repo, ctx) = test_ctx(upstream_addr).await;

    let forwarder = UdpForwarder::bind("127.0.0.1:0".parse().unwrap(), ctx, 16)
        .await
        .unwrap()
        .with_reply_timeout(Duration::from_millis(200));
    let addr = forwarder.local_addr().unwrap();
    tokio::spawn(forwarder.run());

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(&query_packet(0x7777), addr).await.unwrap();

    let mut buf = [0u8; 4096];
    let result =
        tokio::time::timeout(Duration::from_millis(600), client.recv_from(&mut buf)).await;
    assert!(result.is_err(), "client must receive nothing on timeout");
}

#[tokio::test]
async fn test_short_datagram_from_blocked_source_is_dropped() {
    let upstream_addr = spawn_udp_upstream(None).await;
    let (repo, ctx) = test_ctx(upstream_addr).await;
    repo.block("127.0.0.1".parse().unwrap(), None).await.unwrap();

    let forwarder = UdpForwarder::bind("127.0.0.1:0".parse().unwrap(), ctx, 16)
        .await
        .unwrap();
    let addr = forwarder.local_addr().unwrap();
    tokio::spawn(forwarder.run());

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(&[0u8; 5], addr).await.unwrap();

    let mut buf = [0u8; 4096];
    let result =
        tokio::time::timeout(Duration::from_millis(300), client.recv_from(&mut buf)).await;
    assert!(result.is_err(), "malformed datagram must get no response");
}

#[tokio::test]
async fn test_udp_forwarder_survives_a_burst_past_the_ceiling() {
    let mut reply = query_packet(0);
    reply[2] |= 0x80;
    let upstream_addr = spawn_udp_upstream(Some(reply)).await;
    let (_repo, ctx) = test_ctx(upstream_addr).await;

    // Ceiling of 2 with a burst of 10: everything still gets answered,
    // just not all at once.
    let forwarder = UdpForwarder::bind("127.0.0.1:0".parse().unwrap(), ctx, 2)
        .await
        .unwrap();
    let addr = forwarder.local_addr().unwrap();
    tokio::spawn(forwarder.run());

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    for id in 0..10u16 {
        client.send_to(&query_packet(id), addr).await.unwrap();
    }

    let mut buf = [0u8; 4096];
    for _ in 0..10 {
        tokio::time::timeout(Duration::from_secs(3), client.recv_from(&mut buf))
            .await
            .expect("burst datagram went unanswered")
            .unwrap();
    }
}
