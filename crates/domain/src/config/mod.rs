mod database;
mod errors;
mod logging;
mod notify;
mod root;
mod server;
mod upstream;

pub use database::DatabaseConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use notify::NotifyConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use upstream::UpstreamConfig;
