mod database;

pub use database::init_database;

use tracing_subscriber::EnvFilter;
use warden_dns_domain::Config;

/// Initialize the tracing subscriber from the configured level. RUST_LOG
/// still wins when set.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
