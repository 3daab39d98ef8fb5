use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::process::ExitCode;
use warden_dns_domain::{CliOverrides, Config, SortField};

mod bootstrap;
mod commands;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "warden-dns")]
#[command(version)]
#[command(about = "Reputation-gated DNS forwarding proxy")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// Listener port
    #[arg(short, long)]
    port: Option<u16>,

    /// Upstream resolver (host:port)
    #[arg(short, long)]
    upstream: Option<String>,

    /// Database path
    #[arg(long)]
    database: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the forwarding proxy (the default)
    Run,
    /// Block a source IP, with an optional reason
    Ban {
        ip: IpAddr,
        /// Free-text reason stored with the record
        reason: Vec<String>,
    },
    /// Lift the block on a source IP
    Unban { ip: IpAddr },
    /// Remove a source record entirely
    Delete { ip: IpAddr },
    /// Show the record for one source IP
    Show { ip: IpAddr },
    /// List records ordered by a field, most recent first
    Recent {
        #[arg(value_enum)]
        field: SortFieldArg,
        #[arg(default_value_t = 20)]
        limit: u32,
    },
    /// Create the config file if needed and open it in $EDITOR
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortFieldArg {
    Id,
    Ip,
    #[value(alias = "hits")]
    HitCount,
    LastSeen,
    Blocked,
}

impl From<SortFieldArg> for SortField {
    fn from(arg: SortFieldArg) -> Self {
        match arg {
            SortFieldArg::Id => SortField::Id,
            SortFieldArg::Ip => SortField::Ip,
            SortFieldArg::HitCount => SortField::HitCount,
            SortFieldArg::LastSeen => SortField::LastSeen,
            SortFieldArg::Blocked => SortField::Blocked,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        bind_address: cli.bind.clone(),
        port: cli.port,
        upstream: cli.upstream.clone(),
        database_path: cli.database.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = match Config::load(cli.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::from(commands::EXIT_FAILURE);
        }
    };

    bootstrap::init_logging(&config);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => server::run(&config).await,
        Command::Ban { ip, reason } => commands::ban(&config, ip, reason).await,
        Command::Unban { ip } => commands::unban(&config, ip).await,
        Command::Delete { ip } => commands::delete(&config, ip).await,
        Command::Show { ip } => commands::show(&config, ip).await,
        Command::Recent { field, limit } => commands::recent(&config, field.into(), limit).await,
        Command::Config => commands::edit_config(cli.config.as_deref(), &config),
    }
}
