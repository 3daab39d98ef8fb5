use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};
use warden_dns_application::ports::SessionNotifier;
use warden_dns_application::CheckAdmissionUseCase;
use warden_dns_domain::Config;
use warden_dns_infrastructure::dns::{ForwarderContext, TcpForwarder, UdpForwarder};
use warden_dns_infrastructure::notify::WebhookNotifier;
use warden_dns_infrastructure::repositories::SqliteReputationRepository;

use crate::bootstrap;
use crate::commands::EXIT_FAILURE;

/// Bring up both forwarders and run until the process is killed.
pub async fn run(config: &Config) -> ExitCode {
    if let Err(message) = check_privileges(config) {
        eprintln!("{message}");
        return ExitCode::from(EXIT_FAILURE);
    }

    let local = format!("{}:{}", config.server.bind_address, config.server.port);
    let local_addr: SocketAddr = match local.parse() {
        Ok(addr) => addr,
        Err(_) => {
            eprintln!("Invalid bind address: {local}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    // One resolution at startup; both transports forward to the same
    // address for the life of the process.
    let upstream_addr = match tokio::net::lookup_host(config.upstream.address.as_str()).await {
        Ok(mut addrs) => match addrs.next() {
            Some(addr) => addr,
            None => {
                eprintln!(
                    "Upstream {} resolved to no addresses",
                    config.upstream.address
                );
                return ExitCode::from(EXIT_FAILURE);
            }
        },
        Err(e) => {
            eprintln!("Cannot resolve upstream {}: {e}", config.upstream.address);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let database_url = format!("sqlite:{}", config.database.path);
    let pool = match bootstrap::init_database(&database_url, config.database.max_connections).await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to open reputation database: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let repo = Arc::new(SqliteReputationRepository::new(pool, &config.server.label));
    let notifier: Arc<dyn SessionNotifier> = Arc::new(WebhookNotifier::spawn(
        &config.notify.webhook_url,
        config.notify.queue_capacity,
    ));

    let ctx = ForwarderContext {
        admission: Arc::new(CheckAdmissionUseCase::new(repo)),
        notifier,
        upstream_addr,
        label: Arc::from(config.server.label.as_str()),
    };

    info!(
        listener = %local_addr,
        upstream = %upstream_addr,
        label = %config.server.label,
        "Starting warden-dns v{}",
        env!("CARGO_PKG_VERSION")
    );

    // A transport that cannot bind is logged and skipped; the other keeps
    // serving.
    let mut transports = JoinSet::new();

    match TcpForwarder::bind(local_addr, ctx.clone()).await {
        Ok(forwarder) => {
            transports.spawn(forwarder.run());
        }
        Err(e) => error!(error = %e, addr = %local_addr, "TCP listener failed to bind"),
    }

    match UdpForwarder::bind(local_addr, ctx, config.server.max_inflight).await {
        Ok(forwarder) => {
            transports.spawn(forwarder.run());
        }
        Err(e) => error!(error = %e, addr = %local_addr, "UDP listener failed to bind"),
    }

    if transports.is_empty() {
        error!("Both listeners failed to bind, nothing to serve");
        return ExitCode::from(EXIT_FAILURE);
    }

    while transports.join_next().await.is_some() {}
    ExitCode::SUCCESS
}

fn check_privileges(config: &Config) -> Result<(), String> {
    #[cfg(unix)]
    if config.server.port < 1024 && unsafe { libc::geteuid() } != 0 {
        return Err(format!(
            "Binding port {} requires root; run with sudo or configure a higher port",
            config.server.port
        ));
    }

    #[cfg(not(unix))]
    let _ = config;

    Ok(())
}
